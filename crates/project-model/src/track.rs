//! Timestamped samples: camera keyframes, transient effects, and the
//! cursor visibility track.
//!
//! Auto keyframes, effects, and cursor samples are produced by the analysis
//! engine and never mutated here. Manual keyframes are owned by the edit
//! state.

use serde::{Deserialize, Serialize};

use crate::timing::TimestampUs;
use crate::viewport::{NormalizedCoord, Viewport};

/// Who authored a keyframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum KeyframeSource {
    /// Generated by analysis; replaceable.
    #[default]
    Auto,
    /// Authored by the user; authoritative.
    Manual,
}

/// A timestamped viewport sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub id: String,

    #[serde(rename = "t")]
    pub timestamp_us: TimestampUs,

    /// Viewport center (normalized).
    pub position: NormalizedCoord,

    pub zoom_level: f64,

    #[serde(default)]
    pub source: KeyframeSource,
}

impl Keyframe {
    /// Create an analysis-generated keyframe.
    pub fn auto(
        id: impl Into<String>,
        timestamp_us: TimestampUs,
        position: NormalizedCoord,
        zoom_level: f64,
    ) -> Self {
        Self {
            id: id.into(),
            timestamp_us,
            position,
            zoom_level,
            source: KeyframeSource::Auto,
        }
    }

    /// Create a user-authored keyframe.
    pub fn manual(
        id: impl Into<String>,
        timestamp_us: TimestampUs,
        position: NormalizedCoord,
        zoom_level: f64,
    ) -> Self {
        Self {
            id: id.into(),
            timestamp_us,
            position,
            zoom_level,
            source: KeyframeSource::Manual,
        }
    }

    /// The viewport this keyframe describes.
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.position, self.zoom_level)
    }
}

/// Kind of transient overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectType {
    /// Primary-button click: a single expanding ring.
    Click,
    /// Double click: two staggered rings.
    DoubleClick,
    /// Secondary-button click: a ring in the accent color.
    RightClick,
}

/// A transient, time-bounded overlay.
///
/// Active during `[timestamp_us, timestamp_us + duration_us)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    #[serde(rename = "t")]
    pub timestamp_us: TimestampUs,

    /// May be zero or negative in malformed data; such effects are never
    /// active and animate as fully faded.
    pub duration_us: i64,

    pub effect_type: EffectType,

    pub position: NormalizedCoord,
}

impl Effect {
    pub fn new(
        timestamp_us: TimestampUs,
        duration_us: i64,
        effect_type: EffectType,
        position: NormalizedCoord,
    ) -> Self {
        Self {
            timestamp_us,
            duration_us,
            effect_type,
            position,
        }
    }

    /// Exclusive end of the active window, in microseconds.
    pub fn end_us(&self) -> f64 {
        self.timestamp_us as f64 + self.duration_us as f64
    }
}

/// Cursor visibility as judged by analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorState {
    Visible,
    Hidden,
    /// Position reconstructed rather than observed; see `confidence`.
    Inferred,
}

/// One sample of the cursor track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CursorTrackPoint {
    #[serde(rename = "t")]
    pub timestamp_us: TimestampUs,

    pub position: NormalizedCoord,

    pub state: CursorState,

    /// Analysis confidence in `[0, 100]`.
    #[serde(default = "full_confidence")]
    pub confidence: u8,
}

fn full_confidence() -> u8 {
    100
}

impl CursorTrackPoint {
    pub fn new(
        timestamp_us: TimestampUs,
        position: NormalizedCoord,
        state: CursorState,
        confidence: u8,
    ) -> Self {
        Self {
            timestamp_us,
            position,
            state,
            confidence,
        }
    }

    /// A directly observed sample.
    pub fn visible(timestamp_us: TimestampUs, x: f64, y: f64) -> Self {
        Self::new(
            timestamp_us,
            NormalizedCoord::new(x, y),
            CursorState::Visible,
            100,
        )
    }
}
