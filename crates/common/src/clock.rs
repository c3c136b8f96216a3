//! Clock and timing utilities.
//!
//! Every timeline in Reframe is expressed in microseconds. This module
//! provides:
//! - Conversions between microseconds and seconds
//! - The nominal frame interval for a frame rate
//! - A playback clock that maps wall time onto the export timeline
//! - A pacer that throttles preview rendering to a target rate

use std::time::Instant;

/// Microseconds in one second.
pub const MICROS_PER_SEC: f64 = 1_000_000.0;

/// Convert microseconds to seconds.
pub fn us_to_secs(us: f64) -> f64 {
    us / MICROS_PER_SEC
}

/// Convert seconds to microseconds.
pub fn secs_to_us(secs: f64) -> f64 {
    secs * MICROS_PER_SEC
}

/// Nominal duration of one frame at `fps`, in microseconds.
///
/// Returns `None` for a zero frame rate.
pub fn frame_interval_us(fps: u32) -> Option<f64> {
    (fps > 0).then(|| MICROS_PER_SEC / fps as f64)
}

/// A monotonic playback clock positioned on the export timeline.
///
/// The clock only advances while playing. Pausing freezes the position and
/// seeking moves it without changing the play state.
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    /// Export-timeline position at `anchor` (microseconds).
    anchor_position_us: f64,

    /// Instant the clock last (re)started playing; `None` while paused.
    anchor: Option<Instant>,

    /// Upper bound for the position (export duration).
    duration_us: f64,
}

impl PlaybackClock {
    /// Create a paused clock at position zero.
    pub fn new(duration_us: f64) -> Self {
        Self {
            anchor_position_us: 0.0,
            anchor: None,
            duration_us: sanitize_duration(duration_us),
        }
    }

    /// Start or resume playback at `now`.
    pub fn play_at(&mut self, now: Instant) {
        if self.anchor.is_none() {
            self.anchor = Some(now);
        }
    }

    /// Start or resume playback.
    pub fn play(&mut self) {
        self.play_at(Instant::now());
    }

    /// Pause playback at `now`, freezing the current position.
    pub fn pause_at(&mut self, now: Instant) {
        self.anchor_position_us = self.position_at(now);
        self.anchor = None;
    }

    /// Pause playback.
    pub fn pause(&mut self) {
        self.pause_at(Instant::now());
    }

    /// Move the playhead to `position_us` (clamped to the timeline).
    pub fn seek_at(&mut self, position_us: f64, now: Instant) {
        self.anchor_position_us = self.clamp(position_us);
        if self.anchor.is_some() {
            self.anchor = Some(now);
        }
    }

    /// Move the playhead to `position_us`.
    pub fn seek(&mut self, position_us: f64) {
        self.seek_at(position_us, Instant::now());
    }

    /// Update the timeline length, e.g. after a trim or cut edit.
    pub fn set_duration(&mut self, duration_us: f64, now: Instant) {
        let position = self.position_at(now);
        self.duration_us = sanitize_duration(duration_us);
        self.seek_at(position, now);
    }

    /// Whether the clock is advancing.
    pub fn is_playing(&self) -> bool {
        self.anchor.is_some()
    }

    /// Whether playback has reached the end of the timeline.
    pub fn is_finished_at(&self, now: Instant) -> bool {
        self.position_at(now) >= self.duration_us
    }

    /// Export-timeline position at `now` (microseconds).
    pub fn position_at(&self, now: Instant) -> f64 {
        match self.anchor {
            Some(anchor) => {
                let elapsed = now.saturating_duration_since(anchor).as_secs_f64();
                self.clamp(self.anchor_position_us + secs_to_us(elapsed))
            }
            None => self.anchor_position_us,
        }
    }

    /// Current export-timeline position (microseconds).
    pub fn position_us(&self) -> f64 {
        self.position_at(Instant::now())
    }

    /// Timeline length (microseconds).
    pub fn duration_us(&self) -> f64 {
        self.duration_us
    }

    fn clamp(&self, position_us: f64) -> f64 {
        if position_us.is_finite() {
            position_us.clamp(0.0, self.duration_us)
        } else {
            0.0
        }
    }
}

fn sanitize_duration(duration_us: f64) -> f64 {
    if duration_us.is_finite() {
        duration_us.max(0.0)
    } else {
        0.0
    }
}

/// Frame pacer for the preview loop.
///
/// The host calls into the pipeline once per animation frame; the pacer
/// drops calls that arrive faster than the target frame rate.
#[derive(Debug)]
pub struct FramePacer {
    target_interval_us: u64,
    last_tick_us: Option<u64>,
}

impl FramePacer {
    /// Create a pacer targeting the given frame rate.
    pub fn new(target_fps: u32) -> Self {
        Self {
            target_interval_us: 1_000_000 / target_fps.max(1) as u64,
            last_tick_us: None,
        }
    }

    /// Check if enough time has passed for the next frame.
    /// Returns true and updates internal state if ready.
    /// The first call always returns true.
    pub fn should_tick(&mut self, current_us: u64) -> bool {
        match self.last_tick_us {
            None => {
                self.last_tick_us = Some(current_us);
                true
            }
            Some(last) if current_us >= last + self.target_interval_us => {
                self.last_tick_us = Some(current_us);
                true
            }
            _ => false,
        }
    }

    /// Forget the last tick, e.g. after a seek.
    pub fn reset(&mut self) {
        self.last_tick_us = None;
    }

    /// Target interval in microseconds.
    pub fn interval_us(&self) -> u64 {
        self.target_interval_us
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_us_secs_conversion() {
        assert!((us_to_secs(1_500_000.0) - 1.5).abs() < 1e-12);
        assert_eq!(secs_to_us(2.0), 2_000_000.0);
    }

    #[test]
    fn test_frame_interval() {
        assert_eq!(frame_interval_us(25), Some(40_000.0));
        assert_eq!(frame_interval_us(0), None);
    }

    #[test]
    fn test_playback_clock_advances_only_while_playing() {
        let start = Instant::now();
        let mut clock = PlaybackClock::new(10_000_000.0);
        assert_eq!(clock.position_at(start + Duration::from_secs(1)), 0.0);

        clock.play_at(start);
        let pos = clock.position_at(start + Duration::from_millis(500));
        assert!((pos - 500_000.0).abs() < 1.0);

        clock.pause_at(start + Duration::from_secs(2));
        let frozen = clock.position_at(start + Duration::from_secs(5));
        assert!((frozen - 2_000_000.0).abs() < 1.0);
    }

    #[test]
    fn test_playback_clock_clamps_to_duration() {
        let start = Instant::now();
        let mut clock = PlaybackClock::new(1_000_000.0);
        clock.play_at(start);
        assert_eq!(clock.position_at(start + Duration::from_secs(3)), 1_000_000.0);
        assert!(clock.is_finished_at(start + Duration::from_secs(3)));

        clock.seek_at(-50.0, start);
        assert_eq!(clock.position_at(start), 0.0);
        clock.seek_at(f64::NAN, start);
        assert_eq!(clock.position_at(start), 0.0);
    }

    #[test]
    fn test_set_duration_keeps_playhead_in_range() {
        let start = Instant::now();
        let mut clock = PlaybackClock::new(8_000_000.0);
        clock.seek_at(6_000_000.0, start);
        clock.set_duration(4_000_000.0, start);
        assert_eq!(clock.position_at(start), 4_000_000.0);
    }

    #[test]
    fn test_frame_pacer() {
        let mut pacer = FramePacer::new(60);
        assert!(pacer.should_tick(0)); // first tick always fires
        assert!(!pacer.should_tick(1_000)); // 1ms later, too soon
        assert!(pacer.should_tick(17_000)); // ~17ms later, should fire (60Hz ~ 16.67ms)
        pacer.reset();
        assert!(pacer.should_tick(17_500));
    }
}
