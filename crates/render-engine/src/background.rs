//! Canvas background: solid fills and angle-parameterized gradients.

use tiny_skia::{GradientStop, LinearGradient, Paint, Pixmap, Point, Rect, SpreadMode, Transform};

use reframe_project_model::style::{self, BackgroundConfig, BackgroundFill, Rgba};

use crate::paint::skia_color;

/// Fallback used for unknown preset ids.
pub const NEUTRAL_BACKGROUND: Rgba = Rgba::rgb(0x2b, 0x2b, 0x2e);

/// Ids accepted by [`background_preset`].
pub const PRESET_IDS: &[&str] = &["dusk", "ocean", "forest", "sunset", "midnight", "mono"];

/// Resolve a gradient preset id. Unknown ids give a neutral solid fill.
pub fn background_preset(id: &str) -> BackgroundFill {
    let gradient = |angle_deg: f64, colors: &[(f64, Rgba)]| BackgroundFill::LinearGradient {
        angle_deg,
        stops: colors
            .iter()
            .map(|&(offset, color)| style::GradientStop::new(offset, color))
            .collect(),
    };

    match id {
        "dusk" => gradient(
            135.0,
            &[
                (0.0, Rgba::rgb(0x41, 0x2e, 0x8c)),
                (0.55, Rgba::rgb(0xb0, 0x3a, 0x8a)),
                (1.0, Rgba::rgb(0xf2, 0x7a, 0x5e)),
            ],
        ),
        "ocean" => gradient(
            90.0,
            &[
                (0.0, Rgba::rgb(0x0f, 0x4c, 0x81)),
                (1.0, Rgba::rgb(0x2a, 0xb7, 0xca)),
            ],
        ),
        "forest" => gradient(
            45.0,
            &[
                (0.0, Rgba::rgb(0x13, 0x4e, 0x3a)),
                (1.0, Rgba::rgb(0x7b, 0xc0, 0x6b)),
            ],
        ),
        "sunset" => gradient(
            160.0,
            &[
                (0.0, Rgba::rgb(0xff, 0x7e, 0x5f)),
                (0.5, Rgba::rgb(0xfe, 0xb4, 0x7b)),
                (1.0, Rgba::rgb(0xff, 0xe2, 0x9a)),
            ],
        ),
        "midnight" => gradient(
            90.0,
            &[
                (0.0, Rgba::rgb(0x0b, 0x10, 0x26)),
                (1.0, Rgba::rgb(0x23, 0x2b, 0x55)),
            ],
        ),
        "mono" => gradient(
            90.0,
            &[
                (0.0, Rgba::rgb(0x3a, 0x3a, 0x3c)),
                (1.0, Rgba::rgb(0x1c, 0x1c, 0x1e)),
            ],
        ),
        _ => BackgroundFill::Solid {
            color: NEUTRAL_BACKGROUND,
        },
    }
}

/// The fill a background config resolves to: custom, then preset, then
/// the neutral solid.
pub fn resolve_fill(config: &BackgroundConfig) -> BackgroundFill {
    if let Some(custom) = &config.custom {
        return custom.clone();
    }
    match config.gradient_id.as_deref() {
        Some(id) => background_preset(id),
        None => BackgroundFill::Solid {
            color: NEUTRAL_BACKGROUND,
        },
    }
}

/// Gradient line endpoints for `angle_deg` across a `width` x `height` box.
///
/// The line passes through the center and is long enough that the first
/// and last stops land exactly on opposite corners.
pub fn gradient_line(angle_deg: f64, width: f64, height: f64) -> ((f64, f64), (f64, f64)) {
    let angle = if angle_deg.is_finite() { angle_deg } else { 0.0 }.to_radians();
    let (dx, dy) = (angle.cos(), angle.sin());
    let half = (width / 2.0 * dx).abs() + (height / 2.0 * dy).abs();
    let (cx, cy) = (width / 2.0, height / 2.0);
    ((cx - dx * half, cy - dy * half), (cx + dx * half, cy + dy * half))
}

/// Paint `fill` over the whole pixmap.
pub fn draw_background(pixmap: &mut Pixmap, fill: &BackgroundFill) {
    let (width, height) = (pixmap.width() as f32, pixmap.height() as f32);
    let Some(rect) = Rect::from_xywh(0.0, 0.0, width, height) else {
        return;
    };

    let mut paint = Paint::default();
    match fill {
        BackgroundFill::Solid { color } => {
            pixmap.fill(skia_color(*color, 1.0));
            return;
        }
        BackgroundFill::LinearGradient { angle_deg, stops } => {
            let mut sorted: Vec<_> = stops.iter().filter(|s| s.offset.is_finite()).collect();
            sorted.sort_by(|a, b| a.offset.total_cmp(&b.offset));
            match sorted.as_slice() {
                [] => return,
                [only] => {
                    pixmap.fill(skia_color(only.color, 1.0));
                    return;
                }
                _ => {}
            }

            let ((x0, y0), (x1, y1)) = gradient_line(*angle_deg, width as f64, height as f64);
            let skia_stops = sorted
                .iter()
                .map(|s| GradientStop::new(s.offset.clamp(0.0, 1.0) as f32, skia_color(s.color, 1.0)))
                .collect();
            let shader = LinearGradient::new(
                Point::from_xy(x0 as f32, y0 as f32),
                Point::from_xy(x1 as f32, y1 as f32),
                skia_stops,
                SpreadMode::Pad,
                Transform::identity(),
            );
            match shader {
                Some(shader) => paint.shader = shader,
                None => {
                    tracing::debug!(angle_deg, "Degenerate gradient; using first stop");
                    pixmap.fill(skia_color(sorted[0].color, 1.0));
                    return;
                }
            }
        }
    }
    pixmap.fill_rect(rect, &paint, Transform::identity(), None);
}
