//! Source-timeline ranges: trims, cuts, and speed ramps.

use serde::{Deserialize, Serialize};

/// Timestamp in microseconds on the source timeline.
pub type TimestampUs = u64;

/// A half-open source-time range `[start_us, end_us)`.
///
/// A range is only meaningful when `start_us < end_us`; inverted or empty
/// ranges are tolerated in data and ignored by the remapping code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub start_us: TimestampUs,
    pub end_us: TimestampUs,
}

impl TimeRange {
    pub fn new(start_us: TimestampUs, end_us: TimestampUs) -> Self {
        Self { start_us, end_us }
    }

    /// `start < end`.
    pub fn is_valid(&self) -> bool {
        self.start_us < self.end_us
    }

    /// Length in microseconds; zero for invalid ranges.
    pub fn duration_us(&self) -> u64 {
        self.end_us.saturating_sub(self.start_us)
    }

    /// Half-open containment test on a fractional timestamp.
    pub fn contains(&self, t_us: f64) -> bool {
        self.is_valid() && t_us >= self.start_us as f64 && t_us < self.end_us as f64
    }

    /// Whether two valid ranges share any instant.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.is_valid()
            && other.is_valid()
            && self.start_us < other.end_us
            && other.start_us < self.end_us
    }
}

/// A source-time region played at a non-default rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedRamp {
    pub range: TimeRange,
    /// Playback rate; 2.0 plays the region twice as fast.
    pub speed: f64,
}

impl SpeedRamp {
    /// Slowest supported rate.
    pub const MIN_SPEED: f64 = 0.25;
    /// Fastest supported rate.
    pub const MAX_SPEED: f64 = 4.0;

    pub fn new(range: TimeRange, speed: f64) -> Self {
        Self { range, speed }
    }

    /// The rate actually used for remapping.
    ///
    /// Clamped to `[MIN_SPEED, MAX_SPEED]`; non-finite rates play at 1.0.
    pub fn effective_speed(&self) -> f64 {
        if self.speed.is_finite() {
            self.speed.clamp(Self::MIN_SPEED, Self::MAX_SPEED)
        } else {
            1.0
        }
    }
}
