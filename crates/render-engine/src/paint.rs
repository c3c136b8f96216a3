//! Shape, color, and mask helpers shared by the layer renderers.
//!
//! Every helper takes its transform and clip mask as arguments and keeps
//! no drawing state, so nothing set up for one layer can reach the next.

use tiny_skia::{Color, FillRule, Mask, Paint, Path, PathBuilder, Pixmap, Rect, Stroke, Transform};

use reframe_project_model::style::{Rgba, ShadowConfig};
use reframe_project_model::viewport::PixelRect;

/// Number of stacked layers used to approximate a soft shadow edge.
const SHADOW_STEPS: usize = 10;

/// Bezier handle length for a quarter circle.
const KAPPA: f32 = 0.552_284_8;

/// Convert a style color, scaling its alpha by `opacity`.
pub fn skia_color(color: Rgba, opacity: f64) -> Color {
    let c = color.with_opacity(opacity);
    Color::from_rgba8(c.r, c.g, c.b, c.a)
}

/// Convert a rect; `None` unless it has positive, finite size.
pub fn skia_rect(rect: &PixelRect) -> Option<Rect> {
    if !(rect.width > 0.0 && rect.height > 0.0) {
        return None;
    }
    Rect::from_xywh(
        rect.x as f32,
        rect.y as f32,
        rect.width as f32,
        rect.height as f32,
    )
}

/// A closed shape in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    RoundedRect { rect: PixelRect, radius: f64 },
    Ellipse { rect: PixelRect },
}

impl Shape {
    pub fn bounds(&self) -> PixelRect {
        match self {
            Shape::RoundedRect { rect, .. } | Shape::Ellipse { rect } => *rect,
        }
    }

    /// Grow by `amount` on every side, keeping corners concentric.
    pub fn expanded(&self, amount: f64) -> Shape {
        let grow = |r: &PixelRect| {
            PixelRect::new(
                r.x - amount,
                r.y - amount,
                r.width + 2.0 * amount,
                r.height + 2.0 * amount,
            )
        };
        match self {
            Shape::RoundedRect { rect, radius } => Shape::RoundedRect {
                rect: grow(rect),
                radius: (radius + amount).max(0.0),
            },
            Shape::Ellipse { rect } => Shape::Ellipse { rect: grow(rect) },
        }
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Shape {
        let shift = |r: &PixelRect| PixelRect::new(r.x + dx, r.y + dy, r.width, r.height);
        match self {
            Shape::RoundedRect { rect, radius } => Shape::RoundedRect {
                rect: shift(rect),
                radius: *radius,
            },
            Shape::Ellipse { rect } => Shape::Ellipse { rect: shift(rect) },
        }
    }

    /// Build the path; `None` for empty or non-finite geometry.
    pub fn path(&self) -> Option<Path> {
        match self {
            Shape::RoundedRect { rect, radius } => rounded_rect_path(rect, *radius),
            Shape::Ellipse { rect } => PathBuilder::from_oval(skia_rect(rect)?),
        }
    }
}

/// Rounded rectangle path; the radius is clamped to half the short side.
pub fn rounded_rect_path(rect: &PixelRect, radius: f64) -> Option<Path> {
    let bounds = skia_rect(rect)?;
    let r = radius.max(0.0).min(rect.width.min(rect.height) / 2.0) as f32;
    if r <= 0.0 {
        return Some(PathBuilder::from_rect(bounds));
    }

    let (l, t, rt, b) = (bounds.left(), bounds.top(), bounds.right(), bounds.bottom());
    let k = r * KAPPA;
    let mut pb = PathBuilder::new();
    pb.move_to(l + r, t);
    pb.line_to(rt - r, t);
    pb.cubic_to(rt - r + k, t, rt, t + r - k, rt, t + r);
    pb.line_to(rt, b - r);
    pb.cubic_to(rt, b - r + k, rt - r + k, b, rt - r, b);
    pb.line_to(l + r, b);
    pb.cubic_to(l + r - k, b, l, b - r + k, l, b - r);
    pb.line_to(l, t + r);
    pb.cubic_to(l, t + r - k, l + r - k, t, l + r, t);
    pb.close();
    pb.finish()
}

/// Fill `path` with a solid color.
pub fn fill(pixmap: &mut Pixmap, path: &Path, color: Color, mask: Option<&Mask>) {
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    pixmap.fill_path(path, &paint, FillRule::Winding, Transform::identity(), mask);
}

/// Stroke `path` with a solid color.
pub fn stroke(pixmap: &mut Pixmap, path: &Path, color: Color, width: f64) {
    if width.is_nan() || width <= 0.0 {
        return;
    }
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    let stroke = Stroke {
        width: width as f32,
        ..Stroke::default()
    };
    pixmap.stroke_path(path, &paint, &stroke, Transform::identity(), None);
}

/// A coverage mask of `shape` the size of `pixmap`.
pub fn clip_mask(pixmap: &Pixmap, shape: &Shape) -> Option<Mask> {
    let path = shape.path()?;
    let mut mask = Mask::new(pixmap.width(), pixmap.height())?;
    mask.fill_path(&path, FillRule::Winding, true, Transform::identity());
    Some(mask)
}

/// Draw a soft drop shadow behind `shape`.
///
/// The edge is built from stacked, progressively larger copies of the
/// shape at low alpha, which fades out over `blur` pixels.
pub fn draw_shadow(pixmap: &mut Pixmap, shape: &Shape, shadow: &ShadowConfig, scale: f64) {
    if !shadow.enabled || shadow.opacity.is_nan() || shadow.opacity <= 0.0 {
        return;
    }
    let blur = (shadow.blur * scale).max(0.0);
    let base = shape.offset(0.0, shadow.offset_y * scale);
    let step_opacity = shadow.opacity.min(1.0) / SHADOW_STEPS as f64;
    let color = skia_color(Rgba::rgb(0, 0, 0), step_opacity);

    for step in 0..SHADOW_STEPS {
        let spread = blur * (1.0 - step as f64 / SHADOW_STEPS as f64);
        if let Some(path) = base.expanded(spread).path() {
            fill(pixmap, &path, color, None);
        }
    }
}
