//! The screen layer: the visible crop of the source frame, drawn into the
//! content rect with rounded corners and a drop shadow.

use tiny_skia::{FilterQuality, Pixmap, PixmapPaint, PixmapRef, Transform};

use reframe_processing_core::transform::source_rect;
use reframe_project_model::style::{DeviceFrame, Rgba, ScreenFrameConfig};
use reframe_project_model::viewport::{Size, Viewport};

use crate::device::content_corner_radius;
use crate::layout::ContentLayout;
use crate::paint::{clip_mask, draw_shadow, fill, skia_color, Shape};

/// Shape the screen content is clipped to.
pub fn content_shape(layout: &ContentLayout, screen: &ScreenFrameConfig) -> Shape {
    let radius = if screen.enabled {
        content_corner_radius(layout.device_frame, screen.corner_radius, layout.scale)
    } else {
        0.0
    };
    Shape::RoundedRect {
        rect: layout.content,
        radius,
    }
}

/// Transform mapping source pixels so that the viewport's crop rect lands
/// exactly on the content rect.
pub fn crop_transform(viewport: &Viewport, source: Size, layout: &ContentLayout) -> Option<Transform> {
    let crop = source_rect(viewport, source);
    if crop.width <= 0.0 || crop.height <= 0.0 {
        return None;
    }
    let content = &layout.content;
    let sx = content.width / crop.width;
    let sy = content.height / crop.height;
    Some(Transform::from_row(
        sx as f32,
        0.0,
        0.0,
        sy as f32,
        (content.x - crop.x * sx) as f32,
        (content.y - crop.y * sy) as f32,
    ))
}

/// Draw the screen layer.
///
/// Without a frame the content area is filled black. The shadow is drawn
/// here only when no device frame carries its own.
pub fn draw_screen(
    pixmap: &mut Pixmap,
    layout: &ContentLayout,
    screen: &ScreenFrameConfig,
    frame: Option<PixmapRef<'_>>,
    viewport: &Viewport,
) {
    let shape = content_shape(layout, screen);
    if screen.enabled && layout.device_frame == DeviceFrame::None {
        draw_shadow(pixmap, &shape, &screen.shadow, layout.scale);
    }

    let Some(mask) = clip_mask(pixmap, &shape) else {
        return;
    };
    if let Some(path) = shape.path() {
        fill(pixmap, &path, skia_color(Rgba::rgb(0, 0, 0), 1.0), None);
    }

    let Some(frame) = frame else {
        return;
    };
    let source = Size::new(frame.width() as f64, frame.height() as f64);
    let Some(transform) = crop_transform(viewport, source, layout) else {
        return;
    };
    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    pixmap.draw_pixmap(0, 0, frame, &paint, transform, Some(&mask));
}
