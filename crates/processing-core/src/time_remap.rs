//! Export ↔ source time remapping.
//!
//! The export timeline starts at zero and is contiguous. It is derived from
//! the trimmed source timeline by removing cut ranges and rescaling speed
//! ramp regions. [`TimeMap`] walks the source once and records the
//! resulting piecewise-linear segments; every query is answered from them.
//!
//! Rules applied while walking:
//! - ranges with `start >= end` are ignored (cuts and ramps alike);
//! - overlapping cuts are handled independently (their union is removed);
//! - where ramps overlap, the first ramp in the list sets the speed;
//! - ramp speeds are clamped to `[0.25, 4.0]`.

use serde::Serialize;

use reframe_common::clock::MICROS_PER_SEC;
use reframe_project_model::edit::EditState;
use reframe_project_model::timing::{SpeedRamp, TimeRange, TimestampUs};

/// Ramps faster than this have their audio muted.
pub const AUDIO_MUTE_ABOVE_SPEED: f64 = 2.0;

/// One uncut stretch of source time played at a constant speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemapSegment {
    pub source_start_us: TimestampUs,
    pub source_end_us: TimestampUs,
    pub speed: f64,
    pub export_start_us: f64,
    pub export_end_us: f64,
}

impl RemapSegment {
    pub fn export_duration_us(&self) -> f64 {
        self.export_end_us - self.export_start_us
    }
}

/// Precomputed mapping between the export and source timelines.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeMap {
    trim: TimeRange,
    segments: Vec<RemapSegment>,
}

impl TimeMap {
    /// Walk `[in_point, out_point)` and build the segment table.
    pub fn new(trim: TimeRange, cuts: &[TimeRange], ramps: &[SpeedRamp]) -> Self {
        let cuts: Vec<TimeRange> = cuts.iter().copied().filter(TimeRange::is_valid).collect();
        let ramps: Vec<SpeedRamp> = ramps
            .iter()
            .copied()
            .filter(|r| r.range.is_valid())
            .collect();

        let mut segments = Vec::new();
        let mut export_us = 0.0;
        let mut t = trim.start_us;
        let out = trim.end_us;

        while t < out {
            // Skip the furthest-reaching cut covering `t`.
            if let Some(cut_end) = cuts
                .iter()
                .filter(|c| c.start_us <= t && t < c.end_us)
                .map(|c| c.end_us)
                .max()
            {
                t = cut_end;
                continue;
            }

            let next = cuts
                .iter()
                .map(|c| c.start_us)
                .chain(ramps.iter().flat_map(|r| [r.range.start_us, r.range.end_us]))
                .filter(|&b| b > t)
                .fold(out, u64::min);

            let speed = ramps
                .iter()
                .find(|r| r.range.start_us <= t && t < r.range.end_us)
                .map(SpeedRamp::effective_speed)
                .unwrap_or(1.0);

            let export_end = export_us + (next - t) as f64 / speed;
            segments.push(RemapSegment {
                source_start_us: t,
                source_end_us: next,
                speed,
                export_start_us: export_us,
                export_end_us: export_end,
            });
            export_us = export_end;
            t = next;
        }

        tracing::trace!(
            in_us = trim.start_us,
            out_us = trim.end_us,
            segments = segments.len(),
            export_us,
            "Built time map"
        );

        Self { trim, segments }
    }

    /// Time map for the current edit decisions.
    pub fn from_edit(edit: &EditState) -> Self {
        Self::new(edit.trim, &edit.cuts, &edit.speed_ramps)
    }

    pub fn trim(&self) -> TimeRange {
        self.trim
    }

    pub fn segments(&self) -> &[RemapSegment] {
        &self.segments
    }

    /// Length of the export timeline in microseconds.
    pub fn export_duration_us(&self) -> f64 {
        self.segments.last().map(|s| s.export_end_us).unwrap_or(0.0)
    }

    /// Source time shown at export time `export_us`.
    ///
    /// Landing exactly on a segment boundary resolves to the start of the
    /// following segment, so a cut is never returned. The result never
    /// exceeds the out point; invalid or negative input is treated as zero.
    pub fn to_source_time(&self, export_us: f64) -> f64 {
        let export_us = if export_us.is_finite() {
            export_us.max(0.0)
        } else {
            0.0
        };
        let out = self.trim.end_us as f64;

        let idx = self
            .segments
            .partition_point(|s| s.export_end_us <= export_us);
        let Some(seg) = self.segments.get(idx) else {
            return out;
        };
        let source = seg.source_start_us as f64 + (export_us - seg.export_start_us) * seg.speed;
        if source < seg.source_end_us as f64 {
            return source.min(out);
        }
        // Rounded onto the segment end: resolve like an exact boundary.
        self.segments
            .get(idx + 1)
            .map(|next| next.source_start_us as f64)
            .unwrap_or(out)
    }

    /// Export time at which source time `source_us` is shown.
    ///
    /// Source times inside a cut map to the export position of the cut;
    /// times before the in point map to zero and times past the out point
    /// to the export duration.
    pub fn to_export_time(&self, source_us: f64) -> f64 {
        if source_us.is_nan() {
            return 0.0;
        }
        let idx = self
            .segments
            .partition_point(|s| (s.source_end_us as f64) <= source_us);
        match self.segments.get(idx) {
            Some(seg) if source_us <= seg.source_start_us as f64 => seg.export_start_us,
            Some(seg) => {
                seg.export_start_us + (source_us - seg.source_start_us as f64) / seg.speed
            }
            None => self.export_duration_us(),
        }
    }

    /// Build the frame schedule at `fps`.
    ///
    /// Frame `i` sits at export time `i * 1e6 / fps`; frames continue while
    /// that time does not exceed the export duration. A zero frame rate
    /// yields no frames.
    pub fn frame_schedule(&self, fps: u32) -> Vec<FrameTiming> {
        if fps == 0 {
            return Vec::new();
        }
        let duration = self.export_duration_us();

        let mut frames = Vec::new();
        for index in 0u64.. {
            // Multiply before dividing so whole seconds land exactly.
            let export_us = index as f64 * MICROS_PER_SEC / fps as f64;
            if export_us > duration {
                break;
            }
            frames.push(FrameTiming {
                index,
                export_us,
                source_us: self.to_source_time(export_us),
            });
        }
        frames
    }
}

/// One entry of the export schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameTiming {
    pub index: u64,
    pub export_us: f64,
    pub source_us: f64,
}

/// How audio plays back in a region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AudioPolicy {
    pub muted: bool,
    /// Rate handed to the audio path; meaningless when muted.
    pub playback_rate: f64,
}

impl AudioPolicy {
    /// Policy for a region playing at `speed`.
    pub fn for_speed(speed: f64) -> Self {
        Self {
            muted: speed > AUDIO_MUTE_ABOVE_SPEED,
            playback_rate: speed,
        }
    }
}

/// Length of the export timeline for a trim, cuts, and ramps.
pub fn export_duration(
    in_point: TimestampUs,
    out_point: TimestampUs,
    cuts: &[TimeRange],
    ramps: &[SpeedRamp],
) -> f64 {
    TimeMap::new(TimeRange::new(in_point, out_point), cuts, ramps).export_duration_us()
}

/// Source time shown at `export_us`; see [`TimeMap::to_source_time`].
pub fn to_source_time(
    export_us: f64,
    in_point: TimestampUs,
    out_point: TimestampUs,
    cuts: &[TimeRange],
    ramps: &[SpeedRamp],
) -> f64 {
    TimeMap::new(TimeRange::new(in_point, out_point), cuts, ramps).to_source_time(export_us)
}

/// Export time for `source_us`; see [`TimeMap::to_export_time`].
pub fn to_export_time(
    source_us: f64,
    in_point: TimestampUs,
    out_point: TimestampUs,
    cuts: &[TimeRange],
    ramps: &[SpeedRamp],
) -> f64 {
    TimeMap::new(TimeRange::new(in_point, out_point), cuts, ramps).to_export_time(source_us)
}

/// Whether `t_us` falls inside any valid cut.
pub fn is_in_cut(t_us: f64, cuts: &[TimeRange]) -> bool {
    cuts.iter().any(|c| c.contains(t_us))
}

/// Playback speed at source time `t_us`: the first ramp containing it, or 1.0.
pub fn speed_at(t_us: f64, ramps: &[SpeedRamp]) -> f64 {
    ramps
        .iter()
        .find(|r| r.range.contains(t_us))
        .map(SpeedRamp::effective_speed)
        .unwrap_or(1.0)
}

/// Audio policy at source time `t_us`.
pub fn audio_policy_at(t_us: f64, ramps: &[SpeedRamp]) -> AudioPolicy {
    AudioPolicy::for_speed(speed_at(t_us, ramps))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEC: u64 = 1_000_000;

    fn range(a: u64, b: u64) -> TimeRange {
        TimeRange::new(a, b)
    }

    fn ramp(a: u64, b: u64, speed: f64) -> SpeedRamp {
        SpeedRamp::new(range(a, b), speed)
    }

    #[test]
    fn test_plain_trim() {
        assert_eq!(export_duration(2 * SEC, 5 * SEC, &[], &[]), 3e6);
        assert_eq!(to_source_time(1e6, 2 * SEC, 5 * SEC, &[], &[]), 3e6);
    }

    #[test]
    fn test_single_cut() {
        let cuts = [range(2 * SEC, 4 * SEC)];
        assert_eq!(export_duration(0, 10 * SEC, &cuts, &[]), 8e6);
        assert_eq!(to_source_time(2e6, 0, 10 * SEC, &cuts, &[]), 4e6);
        assert_eq!(to_source_time(1.5e6, 0, 10 * SEC, &cuts, &[]), 1.5e6);
        assert_eq!(to_source_time(3e6, 0, 10 * SEC, &cuts, &[]), 5e6);
    }

    #[test]
    fn test_ramp_scales_duration() {
        let ramps = [ramp(2 * SEC, 4 * SEC, 2.0)];
        assert_eq!(export_duration(0, 10 * SEC, &[], &ramps), 9e6);
        assert_eq!(to_source_time(2.5e6, 0, 10 * SEC, &[], &ramps), 3e6);
        assert_eq!(to_source_time(3e6, 0, 10 * SEC, &[], &ramps), 4e6);
    }

    #[test]
    fn test_slow_ramp() {
        let ramps = [ramp(0, 2 * SEC, 0.5)];
        assert_eq!(export_duration(0, 4 * SEC, &[], &ramps), 6e6);
        assert_eq!(to_source_time(2e6, 0, 4 * SEC, &[], &ramps), 1e6);
    }

    #[test]
    fn test_cut_at_in_point_is_skipped() {
        let cuts = [range(0, SEC)];
        assert_eq!(to_source_time(0.0, 0, 5 * SEC, &cuts, &[]), 1e6);
    }

    #[test]
    fn test_overlapping_and_adjacent_cuts() {
        let cuts = [range(SEC, 3 * SEC), range(2 * SEC, 4 * SEC), range(4 * SEC, 5 * SEC)];
        assert_eq!(export_duration(0, 10 * SEC, &cuts, &[]), 6e6);
        assert_eq!(to_source_time(1e6, 0, 10 * SEC, &cuts, &[]), 5e6);
    }

    #[test]
    fn test_cut_extending_past_out_point() {
        let cuts = [range(8 * SEC, 20 * SEC)];
        let map = TimeMap::new(range(0, 10 * SEC), &cuts, &[]);
        assert_eq!(map.export_duration_us(), 8e6);
        assert_eq!(map.to_source_time(8e6), 10e6);
    }

    #[test]
    fn test_first_overlapping_ramp_wins() {
        let ramps = [ramp(0, 2 * SEC, 2.0), ramp(SEC, 3 * SEC, 0.5)];
        // [0,1) @2 + [1,2) @2 + [2,3) @0.5 + [3,4) @1
        assert_eq!(export_duration(0, 4 * SEC, &[], &ramps), 4e6);
        assert_eq!(speed_at(1.5e6, &ramps), 2.0);
        assert_eq!(speed_at(2.5e6, &ramps), 0.5);
    }

    #[test]
    fn test_ramp_speed_clamped() {
        let ramps = [ramp(0, 4 * SEC, 100.0)];
        assert_eq!(export_duration(0, 4 * SEC, &[], &ramps), 1e6);
    }

    #[test]
    fn test_invalid_ranges_ignored() {
        let cuts = [range(3 * SEC, 2 * SEC), range(5 * SEC, 5 * SEC)];
        let ramps = [ramp(4 * SEC, SEC, 2.0)];
        assert_eq!(export_duration(0, 10 * SEC, &cuts, &ramps), 10e6);
        assert!(!is_in_cut(2.5e6, &cuts));
    }

    #[test]
    fn test_degenerate_trim() {
        assert_eq!(export_duration(5 * SEC, 5 * SEC, &[], &[]), 0.0);
        assert_eq!(export_duration(6 * SEC, 2 * SEC, &[], &[]), 0.0);
        assert_eq!(to_source_time(1e6, 6 * SEC, 2 * SEC, &[], &[]), 2e6);
    }

    #[test]
    fn test_output_clamped_to_out_point() {
        assert_eq!(to_source_time(99e6, 0, 10 * SEC, &[], &[]), 10e6);
    }

    #[test]
    fn test_invalid_export_time_treated_as_zero() {
        assert_eq!(to_source_time(f64::NAN, SEC, 3 * SEC, &[], &[]), 1e6);
        assert_eq!(to_source_time(-5.0, SEC, 3 * SEC, &[], &[]), 1e6);
    }

    #[test]
    fn test_to_export_time() {
        let cuts = [range(2 * SEC, 4 * SEC)];
        let ramps = [ramp(6 * SEC, 8 * SEC, 2.0)];
        let map = TimeMap::new(range(0, 10 * SEC), &cuts, &ramps);
        assert_eq!(map.to_export_time(1e6), 1e6);
        assert_eq!(map.to_export_time(3e6), 2e6);
        assert_eq!(map.to_export_time(5e6), 3e6);
        assert_eq!(map.to_export_time(7e6), 4.5e6);
        assert_eq!(map.to_export_time(99e6), map.export_duration_us());
        assert_eq!(map.to_export_time(-1.0), 0.0);
    }

    #[test]
    fn test_audio_policy() {
        let ramps = [ramp(0, SEC, 2.0), ramp(SEC, 2 * SEC, 2.5)];
        assert_eq!(
            audio_policy_at(0.5e6, &ramps),
            AudioPolicy { muted: false, playback_rate: 2.0 }
        );
        assert!(audio_policy_at(1.5e6, &ramps).muted);
        assert_eq!(audio_policy_at(5e6, &ramps).playback_rate, 1.0);
    }

    #[test]
    fn test_frame_schedule_includes_final_frame() {
        let map = TimeMap::new(range(0, SEC), &[], &[]);
        let frames = map.frame_schedule(10);
        assert_eq!(frames.len(), 11);
        assert_eq!(frames[10].export_us, 1e6);
        assert_eq!(frames[10].source_us, 1e6);
    }

    #[test]
    fn test_frame_schedule_reaches_out_point_at_common_rates() {
        let map = TimeMap::new(range(0, SEC), &[], &[]);
        for fps in [24, 25, 30, 50, 60] {
            let frames = map.frame_schedule(fps);
            assert_eq!(frames.len(), fps as usize + 1, "fps {fps}");
            let last = frames[fps as usize];
            assert_eq!(last.export_us, 1e6, "fps {fps}");
            assert_eq!(last.source_us, 1e6, "fps {fps}");
        }
    }

    #[test]
    fn test_frame_schedule_maps_through_cuts() {
        let map = TimeMap::new(range(0, 4 * SEC), &[range(SEC, 3 * SEC)], &[]);
        let frames = map.frame_schedule(1);
        let sources: Vec<f64> = frames.iter().map(|f| f.source_us).collect();
        assert_eq!(sources, vec![0.0, 3e6, 4e6]);
    }

    #[test]
    fn test_zero_fps_schedule_is_empty() {
        let map = TimeMap::new(range(0, SEC), &[], &[]);
        assert!(map.frame_schedule(0).is_empty());
    }
}
