//! Picture-in-picture camera bubble.

use image::RgbaImage;
use imageproc::filter::gaussian_blur_f32;
use tiny_skia::{FilterQuality, IntRect, IntSize, Mask, Pixmap, PixmapPaint, PixmapRef, Transform};

use reframe_project_model::style::{BubbleShape, CameraBubbleConfig};
use reframe_project_model::viewport::{PixelRect, Size};

use crate::paint::{clip_mask, draw_shadow, skia_color, stroke, Shape};

/// Height-to-width ratio of a rounded-rect bubble.
const RECT_BUBBLE_RATIO: f64 = 0.75;

/// Bubble bounds on `surface` in pixels.
///
/// Width is `size` (clamped to `[min_size, max_size]`) times the smaller
/// surface side; `position` places it within the space left over after
/// margins. The result always lies inside the surface.
pub fn bubble_rect(surface: Size, config: &CameraBubbleConfig, scale: f64) -> PixelRect {
    if !surface.is_drawable() {
        return PixelRect::new(0.0, 0.0, 0.0, 0.0);
    }
    let finite_or = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };
    let lo = finite_or(config.min_size, 0.1).max(0.0);
    let hi = finite_or(config.max_size, 0.5).max(lo);
    let size = finite_or(config.size, 0.25).clamp(lo, hi);

    let ratio = match config.shape {
        BubbleShape::Circle => 1.0,
        BubbleShape::RoundedRect => RECT_BUBBLE_RATIO,
    };
    let width = (size * surface.min_side())
        .min(surface.width)
        .min(surface.height / ratio);
    let height = width * ratio;

    let margin = (finite_or(config.margin, 0.0) * scale).max(0.0);
    let margin_x = margin.min((surface.width - width) / 2.0);
    let margin_y = margin.min((surface.height - height) / 2.0);
    let px = finite_or(config.position.x, 1.0).clamp(0.0, 1.0);
    let py = finite_or(config.position.y, 1.0).clamp(0.0, 1.0);

    PixelRect::new(
        margin_x + px * (surface.width - width - 2.0 * margin_x),
        margin_y + py * (surface.height - height - 2.0 * margin_y),
        width,
        height,
    )
}

/// Shape of the bubble at `rect`.
pub fn bubble_shape(rect: PixelRect, config: &CameraBubbleConfig, scale: f64) -> Shape {
    match config.shape {
        BubbleShape::Circle => Shape::Ellipse { rect },
        BubbleShape::RoundedRect => Shape::RoundedRect {
            rect,
            radius: (config.corner_radius * scale).max(0.0),
        },
    }
}

/// Draw the camera bubble. Nothing is drawn without a camera frame or when
/// the bubble is disabled.
pub fn draw_camera_bubble(
    pixmap: &mut Pixmap,
    config: &CameraBubbleConfig,
    frame: Option<PixmapRef<'_>>,
    scale: f64,
) -> bool {
    let Some(frame) = frame else {
        return false;
    };
    if !config.enabled {
        return false;
    }
    let surface = Size::new(pixmap.width() as f64, pixmap.height() as f64);
    let rect = bubble_rect(surface, config, scale);
    let shape = bubble_shape(rect, config, scale);
    let Some(mask) = clip_mask(pixmap, &shape) else {
        return false;
    };

    draw_shadow(pixmap, &shape, &config.shadow, scale);

    let sigma = config.background_blur * scale;
    if sigma.is_finite() && sigma > 0.0 {
        blur_region(pixmap, &rect, sigma as f32, &mask);
    }

    if let Some(transform) = aspect_fill(&rect, frame.width(), frame.height()) {
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        pixmap.draw_pixmap(0, 0, frame, &paint, transform, Some(&mask));
    }

    let border = config.border.width * scale;
    if border > 0.0 {
        if let Some(path) = shape.path() {
            stroke(pixmap, &path, skia_color(config.border.color, 1.0), border);
        }
    }
    true
}

/// Transform scaling a `width` x `height` frame to cover `rect`, centered.
pub fn aspect_fill(rect: &PixelRect, width: u32, height: u32) -> Option<Transform> {
    if width == 0 || height == 0 || rect.width <= 0.0 || rect.height <= 0.0 {
        return None;
    }
    let (w, h) = (width as f64, height as f64);
    let s = (rect.width / w).max(rect.height / h);
    let tx = rect.x + (rect.width - w * s) / 2.0;
    let ty = rect.y + (rect.height - h * s) / 2.0;
    Some(Transform::from_row(
        s as f32, 0.0, 0.0, s as f32, tx as f32, ty as f32,
    ))
}

/// Blur what is already on `pixmap` under `rect`, inside `mask`.
fn blur_region(pixmap: &mut Pixmap, rect: &PixelRect, sigma: f32, mask: &Mask) {
    let x = rect.x.floor().max(0.0) as i32;
    let y = rect.y.floor().max(0.0) as i32;
    let right = (rect.right().ceil() as i64).min(pixmap.width() as i64);
    let bottom = (rect.bottom().ceil() as i64).min(pixmap.height() as i64);
    if right <= x as i64 || bottom <= y as i64 {
        return;
    }
    let (w, h) = ((right - x as i64) as u32, (bottom - y as i64) as u32);
    let Some(area) = IntRect::from_xywh(x, y, w, h) else {
        return;
    };
    let Some(region) = pixmap.clone_rect(area) else {
        return;
    };
    let Some(image) = RgbaImage::from_raw(w, h, region.data().to_vec()) else {
        return;
    };
    let blurred = gaussian_blur_f32(&image, sigma);
    let Some(size) = IntSize::from_wh(w, h) else {
        return;
    };
    let Some(blurred) = Pixmap::from_vec(blurred.into_raw(), size) else {
        return;
    };
    pixmap.draw_pixmap(
        x,
        y,
        blurred.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        Some(mask),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use reframe_project_model::viewport::NormalizedCoord;
    use tiny_skia::Color;

    fn surface() -> Size {
        Size::new(1920.0, 1080.0)
    }

    #[test]
    fn test_default_bubble_bottom_right() {
        let config = CameraBubbleConfig::default();
        let rect = bubble_rect(surface(), &config, 1.0);
        assert!((rect.width - 270.0).abs() < 1e-9);
        assert!((rect.right() - (1920.0 - 32.0)).abs() < 1e-9);
        assert!((rect.bottom() - (1080.0 - 32.0)).abs() < 1e-9);
    }

    #[test]
    fn test_size_clamped_to_bounds() {
        let config = CameraBubbleConfig {
            size: 5.0,
            ..CameraBubbleConfig::default()
        };
        let rect = bubble_rect(surface(), &config, 1.0);
        assert!((rect.width - 540.0).abs() < 1e-9);
    }

    #[test]
    fn test_rounded_rect_is_four_by_three() {
        let config = CameraBubbleConfig {
            shape: BubbleShape::RoundedRect,
            position: NormalizedCoord::new(0.0, 0.0),
            ..CameraBubbleConfig::default()
        };
        let rect = bubble_rect(surface(), &config, 1.0);
        assert!((rect.height / rect.width - 0.75).abs() < 1e-9);
        assert_eq!((rect.x, rect.y), (32.0, 32.0));
    }

    #[test]
    fn test_aspect_fill_covers_rect() {
        let rect = PixelRect::new(10.0, 10.0, 100.0, 100.0);
        let t = aspect_fill(&rect, 200, 100).unwrap();
        assert!((t.sx - 1.0).abs() < 1e-6);
        assert!((t.tx - (10.0 - 50.0)).abs() < 1e-6);
        assert!(aspect_fill(&rect, 0, 100).is_none());
    }

    #[test]
    fn test_no_frame_skips_layer() {
        let mut pixmap = Pixmap::new(64, 64).unwrap();
        assert!(!draw_camera_bubble(&mut pixmap, &CameraBubbleConfig::default(), None, 1.0));
        assert!(pixmap.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_bubble_draws_camera_inside_circle() {
        let mut pixmap = Pixmap::new(200, 200).unwrap();
        let mut camera = Pixmap::new(40, 30).unwrap();
        camera.fill(Color::from_rgba8(0, 200, 0, 255));
        let config = CameraBubbleConfig {
            position: NormalizedCoord::new(0.5, 0.5),
            size: 0.5,
            margin: 0.0,
            shadow: Default::default(),
            border: Default::default(),
            ..CameraBubbleConfig::default()
        };
        assert!(draw_camera_bubble(&mut pixmap, &config, Some(camera.as_ref()), 1.0));
        let center = pixmap.pixel(100, 100).unwrap();
        assert_eq!((center.green(), center.alpha()), (200, 255));
        // Outside the circle but inside its bounding box.
        assert_eq!(pixmap.pixel(52, 52).unwrap().green(), 0);
    }

    #[test]
    fn test_background_blur_softens_edges() {
        let mut pixmap = Pixmap::new(100, 100).unwrap();
        let mut paint = tiny_skia::Paint::default();
        paint.set_color(Color::WHITE);
        let half = tiny_skia::Rect::from_xywh(0.0, 0.0, 50.0, 100.0).unwrap();
        pixmap.fill_rect(half, &paint, Transform::identity(), None);
        let rect = PixelRect::new(0.0, 0.0, 100.0, 100.0);
        let mask = clip_mask(&pixmap, &Shape::RoundedRect { rect, radius: 0.0 }).unwrap();
        blur_region(&mut pixmap, &rect, 4.0, &mask);
        let edge = pixmap.pixel(50, 50).unwrap().alpha();
        assert!(edge > 0 && edge < 255);
    }
}
