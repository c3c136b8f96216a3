//! Effect activation and click-ring animation.

use reframe_project_model::style::{EffectStyle, Rgba};
use reframe_project_model::track::{Effect, EffectType};
use reframe_project_model::viewport::NormalizedCoord;

/// Surface height at which style sizes are specified.
pub const REFERENCE_HEIGHT: f64 = 1080.0;

/// Effects active at `t_us`: `start <= t < start + duration`.
pub fn active_effects(effects: &[Effect], t_us: f64) -> Vec<&Effect> {
    effects.iter().filter(|e| is_active(e, t_us)).collect()
}

/// Half-open window test; zero or negative durations are never active.
pub fn is_active(effect: &Effect, t_us: f64) -> bool {
    effect.duration_us > 0 && effect.timestamp_us as f64 <= t_us && t_us < effect.end_us()
}

/// Animation progress in `[0, 1]` for a window of `duration_us` starting
/// at `start_us`. Degenerate windows are fully progressed.
pub fn progress(start_us: f64, duration_us: f64, t_us: f64) -> f64 {
    if duration_us.is_nan() || duration_us <= 0.0 {
        return 1.0;
    }
    let p = (t_us - start_us) / duration_us;
    if p.is_nan() {
        1.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

/// One expanding, fading ring ready to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickRing {
    /// Ring center in source coordinates.
    pub position: NormalizedCoord,
    /// Radius in surface pixels.
    pub radius: f64,
    pub opacity: f64,
    /// Stroke width in surface pixels.
    pub stroke_width: f64,
    pub color: Rgba,
}

/// Radius and opacity of a ring at `progress`, before surface scaling.
pub fn ring_shape(style: &EffectStyle, progress: f64) -> (f64, f64) {
    let radius = style.start_radius + (style.end_radius - style.start_radius) * progress;
    let opacity = style.start_opacity * (1.0 - progress);
    (radius, opacity)
}

/// Rings for `effect` at `t_us` on a surface `surface_height` pixels tall.
///
/// Clicks and right clicks draw one ring; double clicks add a second ring
/// starting a third of the way through the window. Nothing is returned
/// outside the active window.
pub fn click_rings(
    effect: &Effect,
    t_us: f64,
    style: &EffectStyle,
    surface_height: f64,
) -> Vec<ClickRing> {
    if !is_active(effect, t_us) {
        return Vec::new();
    }

    let scale = surface_height / REFERENCE_HEIGHT;
    let color = match effect.effect_type {
        EffectType::RightClick => style.accent_color,
        EffectType::Click | EffectType::DoubleClick => style.color,
    };
    let start = effect.timestamp_us as f64;
    let duration = effect.duration_us as f64;

    let ring = |progress: f64| {
        let (radius, opacity) = ring_shape(style, progress);
        ClickRing {
            position: effect.position,
            radius: radius * scale,
            opacity,
            stroke_width: style.stroke_width * scale,
            color,
        }
    };

    let mut rings = vec![ring(progress(start, duration, t_us))];
    if effect.effect_type == EffectType::DoubleClick {
        let delay = duration / 3.0;
        if t_us >= start + delay {
            rings.push(ring(progress(start + delay, duration - delay, t_us)));
        }
    }
    rings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn click(t: u64, duration: i64) -> Effect {
        Effect::new(t, duration, EffectType::Click, NormalizedCoord::CENTER)
    }

    #[test]
    fn test_half_open_window() {
        let e = click(1_000, 500);
        assert!(!is_active(&e, 999.0));
        assert!(is_active(&e, 1_000.0));
        assert!(is_active(&e, 1_499.0));
        assert!(!is_active(&e, 1_500.0));
    }

    #[test]
    fn test_active_effects_filters() {
        let effects = vec![click(0, 100), click(50, 100), click(200, 10)];
        let active = active_effects(&effects, 75.0);
        assert_eq!(active.len(), 2);
        assert!(active_effects(&effects, f64::NAN).is_empty());
    }

    #[test]
    fn test_degenerate_duration_is_faded() {
        assert_eq!(progress(10.0, 0.0, 10.0), 1.0);
        assert_eq!(progress(10.0, -5.0, 0.0), 1.0);
        assert!(!is_active(&click(10, 0), 10.0));
    }

    #[test]
    fn test_progress_clamped() {
        assert_eq!(progress(0.0, 100.0, -50.0), 0.0);
        assert_eq!(progress(0.0, 100.0, 50.0), 0.5);
        assert_eq!(progress(0.0, 100.0, 500.0), 1.0);
    }

    #[test]
    fn test_ring_animation() {
        let style = EffectStyle::default();
        let (radius, opacity) = ring_shape(&style, 0.0);
        assert_eq!(radius, style.start_radius);
        assert_eq!(opacity, style.start_opacity);
        let (radius, opacity) = ring_shape(&style, 1.0);
        assert_eq!(radius, style.end_radius);
        assert_eq!(opacity, 0.0);
    }

    #[test]
    fn test_ring_scales_with_surface_height() {
        let style = EffectStyle::default();
        let e = click(0, 1_000);
        let at_1080 = click_rings(&e, 0.0, &style, 1080.0);
        let at_540 = click_rings(&e, 0.0, &style, 540.0);
        assert_eq!(at_1080[0].radius, style.start_radius);
        assert_eq!(at_540[0].radius, style.start_radius / 2.0);
        assert_eq!(at_540[0].stroke_width, style.stroke_width / 2.0);
    }

    #[test]
    fn test_double_click_adds_delayed_ring() {
        let style = EffectStyle::default();
        let e = Effect::new(0, 900, EffectType::DoubleClick, NormalizedCoord::CENTER);
        assert_eq!(click_rings(&e, 100.0, &style, 1080.0).len(), 1);
        let rings = click_rings(&e, 300.0, &style, 1080.0);
        assert_eq!(rings.len(), 2);
        assert_eq!(rings[1].radius, style.start_radius);
        assert!(rings[0].radius > rings[1].radius);
    }

    #[test]
    fn test_right_click_uses_accent() {
        let style = EffectStyle::default();
        let e = Effect::new(0, 100, EffectType::RightClick, NormalizedCoord::CENTER);
        assert_eq!(click_rings(&e, 0.0, &style, 1080.0)[0].color, style.accent_color);
    }

    #[test]
    fn test_no_rings_outside_window() {
        let style = EffectStyle::default();
        assert!(click_rings(&click(0, 100), 100.0, &style, 1080.0).is_empty());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_boundaries_exact(start in 0u64..1_000_000_000, duration in 1i64..10_000_000) {
            let e = Effect::new(start, duration, EffectType::Click, NormalizedCoord::CENTER);
            prop_assert!(is_active(&e, start as f64));
            prop_assert!(!is_active(&e, start as f64 + duration as f64));
        }

        #[test]
        fn prop_ring_opacity_bounded(t in -1e6f64..2e6, duration in -10i64..1_000_000) {
            let style = EffectStyle::default();
            let p = progress(0.0, duration as f64, t);
            let (_, opacity) = ring_shape(&style, p);
            prop_assert!((0.0..=style.start_opacity).contains(&opacity));
        }
    }
}
