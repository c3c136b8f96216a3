//! Cursor interpolation over the analysed cursor track.
//!
//! Position is interpolated between samples. Visibility is discrete and is
//! taken from the earlier sample of the bracketing pair.

use reframe_project_model::track::{CursorState, CursorTrackPoint};
use reframe_project_model::viewport::NormalizedCoord;

/// Confidence at or above which an inferred cursor is drawn fully opaque.
pub const INFERRED_CONFIDENCE_THRESHOLD: u8 = 70;

/// Cursor position and visibility at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorSample {
    pub position: NormalizedCoord,
    pub opacity: f64,
    pub visible: bool,
}

impl CursorSample {
    fn from_point(point: &CursorTrackPoint, position: NormalizedCoord) -> Self {
        let opacity = cursor_opacity(point.state, point.confidence);
        Self {
            position,
            opacity,
            visible: opacity > 0.0,
        }
    }
}

/// Opacity for a cursor state.
///
/// Inferred cursors below the confidence threshold fade to
/// `confidence / 100`; there is no ramp above it.
pub fn cursor_opacity(state: CursorState, confidence: u8) -> f64 {
    match state {
        CursorState::Hidden => 0.0,
        CursorState::Visible => 1.0,
        CursorState::Inferred if confidence >= INFERRED_CONFIDENCE_THRESHOLD => 1.0,
        CursorState::Inferred => f64::from(confidence) / 100.0,
    }
}

/// Cursor at `t_us` over a track sorted by timestamp.
pub fn interpolate_cursor(track: &[CursorTrackPoint], t_us: f64) -> Option<CursorSample> {
    let first = track.first()?;
    let last = track.last()?;

    if track.len() == 1 || t_us.is_nan() || t_us <= first.timestamp_us as f64 {
        return Some(CursorSample::from_point(first, first.position));
    }
    if t_us >= last.timestamp_us as f64 {
        return Some(CursorSample::from_point(last, last.position));
    }

    let next = track.partition_point(|p| p.timestamp_us as f64 <= t_us);
    let a = &track[next - 1];
    let b = &track[next];
    let progress = (t_us - a.timestamp_us as f64) / (b.timestamp_us as f64 - a.timestamp_us as f64);

    Some(CursorSample::from_point(
        a,
        NormalizedCoord::lerp(&a.position, &b.position, progress),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opacity_table() {
        assert_eq!(cursor_opacity(CursorState::Hidden, 100), 0.0);
        assert_eq!(cursor_opacity(CursorState::Visible, 0), 1.0);
        assert_eq!(cursor_opacity(CursorState::Inferred, 69), 0.69);
        assert_eq!(cursor_opacity(CursorState::Inferred, 70), 1.0);
        assert_eq!(cursor_opacity(CursorState::Inferred, 0), 0.0);
    }

    #[test]
    fn test_empty_track() {
        assert!(interpolate_cursor(&[], 0.0).is_none());
    }

    #[test]
    fn test_single_point_verbatim() {
        let p = CursorTrackPoint::new(
            100,
            NormalizedCoord::new(0.3, 0.4),
            CursorState::Inferred,
            50,
        );
        let s = interpolate_cursor(&[p], 5_000.0).unwrap();
        assert_eq!(s.position, p.position);
        assert_eq!(s.opacity, 0.5);
        assert!(s.visible);
    }

    #[test]
    fn test_interpolates_position_between_samples() {
        let track = vec![
            CursorTrackPoint::visible(0, 0.0, 0.0),
            CursorTrackPoint::visible(1_000, 1.0, 0.5),
        ];
        let s = interpolate_cursor(&track, 250.0).unwrap();
        assert!((s.position.x - 0.25).abs() < 1e-12);
        assert!((s.position.y - 0.125).abs() < 1e-12);
    }

    #[test]
    fn test_clamps_outside_track() {
        let track = vec![
            CursorTrackPoint::visible(1_000, 0.1, 0.1),
            CursorTrackPoint::visible(2_000, 0.9, 0.9),
        ];
        assert_eq!(interpolate_cursor(&track, 0.0).unwrap().position.x, 0.1);
        assert_eq!(interpolate_cursor(&track, 9_000.0).unwrap().position.x, 0.9);
    }

    #[test]
    fn test_state_taken_from_earlier_sample() {
        let track = vec![
            CursorTrackPoint::visible(0, 0.0, 0.0),
            CursorTrackPoint::new(1_000, NormalizedCoord::new(1.0, 1.0), CursorState::Hidden, 100),
        ];
        let s = interpolate_cursor(&track, 999.0).unwrap();
        assert_eq!(s.opacity, 1.0);
        let s = interpolate_cursor(&track, 1_000.0).unwrap();
        assert_eq!(s.opacity, 0.0);
        assert!(!s.visible);
    }
}
