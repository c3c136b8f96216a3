//! Bounded seek retry with exponential backoff.
//!
//! Running out of retries is never an error: the caller gets an outcome
//! saying whether the source still holds an older frame to render with.

use std::time::Duration;

use reframe_common::config::SeekDefaults;

use crate::media::MediaSource;

/// Retry limits for media seeks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeekPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub attempt_timeout: Duration,
}

impl Default for SeekPolicy {
    fn default() -> Self {
        Self::from_defaults(&SeekDefaults::default())
    }
}

impl SeekPolicy {
    pub fn from_defaults(defaults: &SeekDefaults) -> Self {
        Self {
            max_attempts: defaults.max_attempts,
            base_delay: Duration::from_millis(defaults.base_delay_ms),
            max_delay: Duration::from_millis(defaults.max_delay_ms),
            attempt_timeout: Duration::from_millis(defaults.attempt_timeout_ms),
        }
    }

    /// Backoff after failed attempt number `attempt` (1-based):
    /// `base * 2^(attempt - 1)`, capped at `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay
            .checked_mul(1u32 << exponent)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// How a seek ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SeekOutcome {
    /// The source is at the requested time.
    Settled { attempts: u32 },
    /// Every attempt failed; the source still holds an earlier frame.
    Degraded { attempts: u32, error: String },
    /// Every attempt failed and there is no frame at all.
    Failed { attempts: u32, error: String },
}

impl SeekOutcome {
    pub fn is_settled(&self) -> bool {
        matches!(self, SeekOutcome::Settled { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            SeekOutcome::Settled { attempts }
            | SeekOutcome::Degraded { attempts, .. }
            | SeekOutcome::Failed { attempts, .. } => *attempts,
        }
    }
}

/// Seek `source` to `target_us`, retrying per `policy`.
///
/// Each attempt is bounded by `policy.attempt_timeout`; an attempt that
/// runs over counts as a failure.
pub async fn seek_with_retry(
    source: &mut dyn MediaSource,
    target_us: f64,
    policy: &SeekPolicy,
) -> SeekOutcome {
    let max_attempts = policy.attempts();
    let mut last_error = String::new();

    for attempt in 1..=max_attempts {
        match tokio::time::timeout(policy.attempt_timeout, source.seek(target_us)).await {
            Ok(Ok(())) => {
                if attempt > 1 {
                    tracing::debug!(target_us, attempt, "Seek settled after retry");
                }
                return SeekOutcome::Settled { attempts: attempt };
            }
            Ok(Err(e)) => last_error = e.to_string(),
            Err(_) => {
                last_error = format!("Seek timed out after {:?}", policy.attempt_timeout);
            }
        }

        if attempt < max_attempts {
            let delay = policy.delay_for(attempt);
            tracing::debug!(target_us, attempt, ?delay, error = %last_error, "Seek failed; retrying");
            tokio::time::sleep(delay).await;
        }
    }

    if source.current_frame().is_some() {
        tracing::warn!(
            target_us,
            attempts = max_attempts,
            held_us = ?source.position_us(),
            error = %last_error,
            "Seek failed; rendering with previous frame"
        );
        SeekOutcome::Degraded {
            attempts: max_attempts,
            error: last_error,
        }
    } else {
        tracing::warn!(target_us, attempts = max_attempts, error = %last_error, "Seek failed; no frame available");
        SeekOutcome::Failed {
            attempts: max_attempts,
            error: last_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedSource;

    fn fast_policy(max_attempts: u32) -> SeekPolicy {
        SeekPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
            attempt_timeout: Duration::from_millis(500),
        }
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = SeekPolicy {
            max_attempts: 10,
            base_delay: Duration::from_millis(50),
            max_delay: Duration::from_millis(400),
            attempt_timeout: Duration::from_secs(1),
        };
        assert_eq!(policy.delay_for(1), Duration::from_millis(50));
        assert_eq!(policy.delay_for(2), Duration::from_millis(100));
        assert_eq!(policy.delay_for(3), Duration::from_millis(200));
        assert_eq!(policy.delay_for(4), Duration::from_millis(400));
        assert_eq!(policy.delay_for(9), Duration::from_millis(400));
        assert_eq!(policy.delay_for(u32::MAX), Duration::from_millis(400));
    }

    #[test]
    fn test_policy_from_defaults() {
        let policy = SeekPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay, Duration::from_millis(50));
        assert_eq!(policy.attempt_timeout, Duration::from_millis(2000));
    }

    #[tokio::test]
    async fn test_settles_first_try() {
        let mut source = ScriptedSource::new(2, 2);
        let outcome = seek_with_retry(&mut source, 1_000.0, &fast_policy(3)).await;
        assert_eq!(outcome, SeekOutcome::Settled { attempts: 1 });
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let mut source = ScriptedSource::new(2, 2).failing(2);
        let outcome = seek_with_retry(&mut source, 1_000.0, &fast_policy(3)).await;
        assert_eq!(outcome, SeekOutcome::Settled { attempts: 3 });
        assert_eq!(source.seeks.len(), 3);
    }

    #[tokio::test]
    async fn test_exhausted_without_frame_fails() {
        let mut source = ScriptedSource::new(2, 2).failing(10);
        let outcome = seek_with_retry(&mut source, 1_000.0, &fast_policy(3)).await;
        assert!(matches!(outcome, SeekOutcome::Failed { attempts: 3, .. }));
    }

    #[tokio::test]
    async fn test_exhausted_with_frame_degrades() {
        let mut source = ScriptedSource::new(2, 2);
        seek_with_retry(&mut source, 0.0, &fast_policy(1)).await;
        source.failures = 5;
        let outcome = seek_with_retry(&mut source, 5_000_000.0, &fast_policy(2)).await;
        assert!(matches!(outcome, SeekOutcome::Degraded { attempts: 2, .. }));
        assert_eq!(source.position_us(), Some(0.0));
    }

    #[tokio::test]
    async fn test_slow_attempt_times_out() {
        let mut source = ScriptedSource::new(2, 2).slow(Duration::from_millis(200));
        let policy = SeekPolicy {
            attempt_timeout: Duration::from_millis(10),
            ..fast_policy(2)
        };
        let outcome = seek_with_retry(&mut source, 0.0, &policy).await;
        match outcome {
            SeekOutcome::Failed { attempts, error } => {
                assert_eq!(attempts, 2);
                assert!(error.contains("timed out"));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_zero_attempts_still_tries_once() {
        let mut source = ScriptedSource::new(2, 2);
        let outcome = seek_with_retry(&mut source, 0.0, &fast_policy(0)).await;
        assert_eq!(outcome.attempts(), 1);
        assert!(outcome.is_settled());
    }
}
