//! Keyframe merge and viewport interpolation.
//!
//! Auto keyframes come from analysis; manual keyframes come from the user
//! and replace any auto keyframe close to them in time. The merged list
//! is sampled with piecewise-linear interpolation.

use reframe_project_model::track::Keyframe;
use reframe_project_model::viewport::Viewport;

use crate::transform::sanitize_viewport;

/// Window within which a manual keyframe replaces an auto keyframe.
pub const DEFAULT_MERGE_TOLERANCE_US: u64 = 100_000;

/// Merge auto and manual keyframes into one list sorted by timestamp.
///
/// An auto keyframe is dropped when any manual keyframe lies within
/// `tolerance_us` of it (inclusive). Manual keyframes are always kept,
/// even when close to each other. Equal timestamps keep auto entries
/// before manual ones.
pub fn merge_keyframes(auto: &[Keyframe], manual: &[Keyframe], tolerance_us: u64) -> Vec<Keyframe> {
    let mut manual_times: Vec<u64> = manual.iter().map(|k| k.timestamp_us).collect();
    manual_times.sort_unstable();

    let overridden = |t: u64| -> bool {
        // Nearest manual timestamps on either side of `t`.
        let idx = manual_times.partition_point(|&m| m < t);
        let after = manual_times.get(idx).map(|&m| m - t);
        let before = idx.checked_sub(1).map(|i| t - manual_times[i]);
        after.into_iter().chain(before).any(|d| d <= tolerance_us)
    };

    let mut merged: Vec<Keyframe> = auto
        .iter()
        .filter(|k| !overridden(k.timestamp_us))
        .cloned()
        .chain(manual.iter().cloned())
        .collect();
    merged.sort_by_key(|k| k.timestamp_us);
    merged
}

/// Viewport at time `t_us` over a list of keyframes sorted by timestamp.
///
/// No keyframes yields the identity; times outside the list clamp to the
/// boundary keyframe; otherwise zoom and center are interpolated linearly
/// between the bracketing pair. Invalid keyframe viewports are treated as
/// the identity.
pub fn interpolate_viewport(keyframes: &[Keyframe], t_us: f64) -> Viewport {
    let (first, last) = match (keyframes.first(), keyframes.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Viewport::IDENTITY,
    };
    if keyframes.len() == 1 || t_us.is_nan() || t_us <= first.timestamp_us as f64 {
        return sanitize_viewport(&first.viewport());
    }
    if t_us >= last.timestamp_us as f64 {
        return sanitize_viewport(&last.viewport());
    }

    // First keyframe strictly after t; the pair below brackets t with t0 < t1.
    let next = keyframes.partition_point(|k| k.timestamp_us as f64 <= t_us);
    let a = &keyframes[next - 1];
    let b = &keyframes[next];
    let t0 = a.timestamp_us as f64;
    let t1 = b.timestamp_us as f64;
    let progress = (t_us - t0) / (t1 - t0);

    Viewport::lerp(
        &sanitize_viewport(&a.viewport()),
        &sanitize_viewport(&b.viewport()),
        progress,
    )
}

/// A merged keyframe list ready for per-frame sampling.
#[derive(Debug, Clone, Default)]
pub struct ViewportTrack {
    keyframes: Vec<Keyframe>,
}

impl ViewportTrack {
    /// Merge with the default tolerance.
    pub fn new(auto: &[Keyframe], manual: &[Keyframe]) -> Self {
        Self::with_tolerance(auto, manual, DEFAULT_MERGE_TOLERANCE_US)
    }

    pub fn with_tolerance(auto: &[Keyframe], manual: &[Keyframe], tolerance_us: u64) -> Self {
        Self {
            keyframes: merge_keyframes(auto, manual, tolerance_us),
        }
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Viewport at source time `t_us`.
    pub fn viewport_at(&self, t_us: f64) -> Viewport {
        interpolate_viewport(&self.keyframes, t_us)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reframe_project_model::track::KeyframeSource;
    use reframe_project_model::viewport::NormalizedCoord;

    fn auto(id: &str, t: u64, zoom: f64) -> Keyframe {
        Keyframe::auto(id, t, NormalizedCoord::CENTER, zoom)
    }

    fn manual(id: &str, t: u64, zoom: f64) -> Keyframe {
        Keyframe::manual(id, t, NormalizedCoord::CENTER, zoom)
    }

    fn ids(keyframes: &[Keyframe]) -> Vec<&str> {
        keyframes.iter().map(|k| k.id.as_str()).collect()
    }

    #[test]
    fn test_manual_overrides_nearby_auto() {
        let merged = merge_keyframes(
            &[auto("a1", 1_000_000, 1.0), auto("a2", 2_000_000, 2.0)],
            &[manual("m1", 1_050_000, 3.0)],
            DEFAULT_MERGE_TOLERANCE_US,
        );
        assert_eq!(ids(&merged), vec!["m1", "a2"]);
    }

    #[test]
    fn test_tolerance_is_inclusive() {
        let merged = merge_keyframes(
            &[auto("a", 1_000_000, 1.0), auto("b", 1_300_000, 1.0)],
            &[manual("m", 1_100_000, 2.0)],
            100_000,
        );
        assert_eq!(ids(&merged), vec!["m", "b"]);
    }

    #[test]
    fn test_auto_before_and_after_manual_both_overridden() {
        let merged = merge_keyframes(
            &[auto("a", 950_000, 1.0), auto("b", 1_080_000, 1.0)],
            &[manual("m", 1_000_000, 2.0)],
            DEFAULT_MERGE_TOLERANCE_US,
        );
        assert_eq!(ids(&merged), vec!["m"]);
    }

    #[test]
    fn test_close_manual_keyframes_both_kept() {
        let merged = merge_keyframes(
            &[],
            &[manual("m2", 1_050_000, 2.0), manual("m1", 1_000_000, 1.5)],
            DEFAULT_MERGE_TOLERANCE_US,
        );
        assert_eq!(ids(&merged), vec!["m1", "m2"]);
        assert!(merged.iter().all(|k| k.source == KeyframeSource::Manual));
    }

    #[test]
    fn test_interpolate_empty_is_identity() {
        assert_eq!(interpolate_viewport(&[], 5.0), Viewport::IDENTITY);
    }

    #[test]
    fn test_interpolate_single_keyframe() {
        let kf = Keyframe::auto("k", 500, NormalizedCoord::new(0.2, 0.3), 2.0);
        let vp = interpolate_viewport(std::slice::from_ref(&kf), 0.0);
        assert_eq!(vp, kf.viewport());
        assert_eq!(interpolate_viewport(&[kf.clone()], 1e9), kf.viewport());
    }

    #[test]
    fn test_interpolate_clamps_and_lerps() {
        let keyframes = vec![
            Keyframe::auto("a", 1_000_000, NormalizedCoord::new(0.2, 0.2), 1.0),
            Keyframe::auto("b", 3_000_000, NormalizedCoord::new(0.6, 0.8), 3.0),
        ];
        assert_eq!(interpolate_viewport(&keyframes, 0.0).zoom, 1.0);
        assert_eq!(interpolate_viewport(&keyframes, 9e6).zoom, 3.0);

        let mid = interpolate_viewport(&keyframes, 2_000_000.0);
        assert!((mid.zoom - 2.0).abs() < 1e-12);
        assert!((mid.center.x - 0.4).abs() < 1e-12);
        assert!((mid.center.y - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_keyframe_viewport_is_identity() {
        let keyframes = vec![Keyframe::auto("bad", 0, NormalizedCoord::new(2.0, 0.5), 2.0)];
        assert_eq!(interpolate_viewport(&keyframes, 0.0), Viewport::IDENTITY);
    }

    #[test]
    fn test_track_samples_merged_keyframes() {
        let track = ViewportTrack::new(&[auto("a", 0, 1.0)], &[manual("m", 1_000_000, 2.0)]);
        assert_eq!(track.keyframes().len(), 2);
        assert!((track.viewport_at(500_000.0).zoom - 1.5).abs() < 1e-12);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use reframe_project_model::viewport::NormalizedCoord;

    fn keyframe_list() -> impl Strategy<Value = Vec<Keyframe>> {
        prop::collection::vec((0u64..10_000_000, 0.0f64..=1.0, 0.0f64..=1.0, 1.0f64..=8.0), 1..12)
            .prop_map(|raw| {
                let mut keyframes: Vec<Keyframe> = raw
                    .into_iter()
                    .enumerate()
                    .map(|(i, (t, x, y, z))| {
                        Keyframe::auto(format!("k{i}"), t, NormalizedCoord::new(x, y), z)
                    })
                    .collect();
                keyframes.sort_by_key(|k| k.timestamp_us);
                keyframes.dedup_by_key(|k| k.timestamp_us);
                keyframes
            })
    }

    proptest! {
        #[test]
        fn prop_interpolation_hits_keyframes(keyframes in keyframe_list()) {
            for kf in &keyframes {
                let vp = interpolate_viewport(&keyframes, kf.timestamp_us as f64);
                prop_assert!((vp.zoom - kf.zoom_level).abs() < 1e-9);
                prop_assert!((vp.center.x - kf.position.x).abs() < 1e-9);
            }
        }

        #[test]
        fn prop_interpolation_continuous_at_keyframes(keyframes in keyframe_list()) {
            for kf in &keyframes {
                let t = kf.timestamp_us as f64;
                let before = interpolate_viewport(&keyframes, t - 1e-6);
                let after = interpolate_viewport(&keyframes, t + 1e-6);
                prop_assert!((before.zoom - kf.zoom_level).abs() < 1e-4);
                prop_assert!((after.zoom - kf.zoom_level).abs() < 1e-4);
            }
        }

        #[test]
        fn prop_merge_is_sorted_and_keeps_manual(
            auto_ts in prop::collection::vec(0u64..5_000_000, 0..10),
            manual_ts in prop::collection::vec(0u64..5_000_000, 0..10),
        ) {
            let auto: Vec<_> = auto_ts.iter().map(|&t| Keyframe::auto("a", t, NormalizedCoord::CENTER, 1.0)).collect();
            let manual: Vec<_> = manual_ts.iter().map(|&t| Keyframe::manual("m", t, NormalizedCoord::CENTER, 2.0)).collect();
            let merged = merge_keyframes(&auto, &manual, DEFAULT_MERGE_TOLERANCE_US);
            prop_assert!(merged.windows(2).all(|w| w[0].timestamp_us <= w[1].timestamp_us));
            prop_assert_eq!(merged.iter().filter(|k| k.id == "m").count(), manual.len());
            for kept in merged.iter().filter(|k| k.id == "a") {
                prop_assert!(manual_ts.iter().all(|&m| m.abs_diff(kept.timestamp_us) > DEFAULT_MERGE_TOLERANCE_US));
            }
        }
    }
}
