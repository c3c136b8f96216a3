//! Effect rings and the synthetic cursor, drawn above the screen content.
//!
//! Both are positioned through the same viewport mapping as the screen
//! crop, so they stay on the point they annotate while the view zooms.

use tiny_skia::{Path, PathBuilder, Pixmap};

use reframe_processing_core::cursor::CursorSample;
use reframe_processing_core::effects::{click_rings, ClickRing};
use reframe_processing_core::transform::to_canvas_point_in;
use reframe_project_model::style::{CursorStyle, EffectStyle};
use reframe_project_model::track::Effect;
use reframe_project_model::viewport::{CanvasPoint, PixelRect, Viewport};

use crate::paint::{fill, skia_color, stroke, Shape};

/// Cursor arrow outline in reference pixels, tip at the origin.
const ARROW: [(f32, f32); 7] = [
    (0.0, 0.0),
    (0.0, 22.0),
    (5.5, 17.0),
    (9.5, 26.0),
    (13.0, 24.5),
    (9.0, 16.0),
    (16.0, 16.0),
];

/// Draw the click rings for every effect in `effects` at `source_us`.
///
/// Returns how many rings were drawn.
pub fn draw_effects(
    pixmap: &mut Pixmap,
    effects: &[Effect],
    source_us: f64,
    style: &EffectStyle,
    viewport: &Viewport,
    content: &PixelRect,
) -> usize {
    if !style.enabled {
        return 0;
    }
    let height = pixmap.height() as f64;
    let mut drawn = 0;
    for effect in effects {
        for ring in click_rings(effect, source_us, style, height) {
            if draw_ring(pixmap, &ring, viewport, content) {
                drawn += 1;
            }
        }
    }
    drawn
}

fn draw_ring(pixmap: &mut Pixmap, ring: &ClickRing, viewport: &Viewport, content: &PixelRect) -> bool {
    if !ring.position.is_valid() || ring.opacity.is_nan() || ring.opacity <= 0.0 {
        return false;
    }
    if ring.radius.is_nan() || ring.radius <= 0.0 {
        return false;
    }
    let center = to_canvas_point_in(&ring.position, viewport, content);
    let rect = PixelRect::new(
        center.x - ring.radius,
        center.y - ring.radius,
        ring.radius * 2.0,
        ring.radius * 2.0,
    );
    let Some(path) = (Shape::Ellipse { rect }).path() else {
        return false;
    };
    stroke(pixmap, &path, skia_color(ring.color, ring.opacity), ring.stroke_width);
    true
}

/// Arrow path with its tip at `tip`, scaled by `size`.
pub fn cursor_path(tip: CanvasPoint, size: f64) -> Option<Path> {
    if !size.is_finite() || size <= 0.0 {
        return None;
    }
    let (x, y, s) = (tip.x as f32, tip.y as f32, size as f32);
    let mut pb = PathBuilder::new();
    let mut points = ARROW.iter();
    let &(x0, y0) = points.next()?;
    pb.move_to(x + x0 * s, y + y0 * s);
    for &(px, py) in points {
        pb.line_to(x + px * s, y + py * s);
    }
    pb.close();
    pb.finish()
}

/// Draw the cursor. Returns `false` when nothing was drawn.
pub fn draw_cursor(
    pixmap: &mut Pixmap,
    cursor: Option<&CursorSample>,
    style: &CursorStyle,
    viewport: &Viewport,
    content: &PixelRect,
    scale: f64,
) -> bool {
    let Some(cursor) = cursor else {
        return false;
    };
    if !style.enabled || !cursor.visible || !cursor.position.is_valid() {
        return false;
    }
    if cursor.opacity.is_nan() || cursor.opacity <= 0.0 {
        return false;
    }
    let tip = to_canvas_point_in(&cursor.position, viewport, content);
    let Some(path) = cursor_path(tip, style.scale * scale) else {
        return false;
    };
    fill(pixmap, &path, skia_color(style.fill, cursor.opacity), None);
    stroke(
        pixmap,
        &path,
        skia_color(style.outline, cursor.opacity),
        1.5 * style.scale * scale,
    );
    true
}
