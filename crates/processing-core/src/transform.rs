//! Viewport transform.
//!
//! Maps a viewport onto a crop rectangle of the source frame, and maps
//! normalized source coordinates through that same crop onto the output
//! surface. Both directions share [`visible_window`], so overlays stay
//! registered with the video under any zoom/pan.

use reframe_project_model::viewport::{
    CanvasPoint, NormalizedCoord, PixelRect, Size, Viewport,
};

/// Replace an invalid viewport with the identity and clamp zoom into
/// `[Viewport::MIN_ZOOM, Viewport::MAX_ZOOM]`.
pub fn sanitize_viewport(viewport: &Viewport) -> Viewport {
    if !viewport.is_valid() {
        return Viewport::IDENTITY;
    }
    Viewport {
        center: viewport.center,
        zoom: viewport.zoom.clamp(Viewport::MIN_ZOOM, Viewport::MAX_ZOOM),
    }
}

/// The visible part of the source in normalized units.
///
/// Width and height are `1 / zoom`; the origin is clamped so the window
/// never leaves `[0, 1]²`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleWindow {
    pub left: f64,
    pub top: f64,
    pub extent: f64,
}

/// Compute the normalized window shown for `viewport`.
pub fn visible_window(viewport: &Viewport) -> VisibleWindow {
    let viewport = sanitize_viewport(viewport);
    let extent = 1.0 / viewport.zoom;
    let max_origin = 1.0 - extent;
    VisibleWindow {
        left: (viewport.center.x - extent / 2.0).clamp(0.0, max_origin),
        top: (viewport.center.y - extent / 2.0).clamp(0.0, max_origin),
        extent,
    }
}

/// Crop rectangle of the source frame for `viewport`, in source pixels.
///
/// Width and height are `source / zoom`; the rect always lies inside
/// `[0, width] x [0, height]`. A non-drawable source yields an empty rect.
pub fn source_rect(viewport: &Viewport, source: Size) -> PixelRect {
    if !source.is_drawable() {
        return PixelRect::new(0.0, 0.0, 0.0, 0.0);
    }
    let viewport = sanitize_viewport(viewport);
    let width = source.width / viewport.zoom;
    let height = source.height / viewport.zoom;
    let x = viewport.center.x * source.width - width / 2.0;
    let y = viewport.center.y * source.height - height / 2.0;
    PixelRect::new(
        x.clamp(0.0, source.width - width),
        y.clamp(0.0, source.height - height),
        width,
        height,
    )
}

/// Map a normalized source coordinate onto a surface of `surface` pixels.
///
/// Points outside the visible window land outside the surface; nothing is
/// clamped, so overlays slide off-canvas together with the video.
pub fn to_canvas_point(coord: &NormalizedCoord, viewport: &Viewport, surface: Size) -> CanvasPoint {
    to_canvas_point_in(coord, viewport, &PixelRect::from_size(surface))
}

/// Like [`to_canvas_point`], but relative to the rect the source is drawn
/// into (e.g. a letterboxed content area).
pub fn to_canvas_point_in(
    coord: &NormalizedCoord,
    viewport: &Viewport,
    content: &PixelRect,
) -> CanvasPoint {
    let window = visible_window(viewport);
    CanvasPoint::new(
        content.x + (coord.x - window.left) / window.extent * content.width,
        content.y + (coord.y - window.top) / window.extent * content.height,
    )
}

/// Scale from source pixels to content pixels at `viewport`.
///
/// Used to size overlays that live in source space (e.g. a cursor that
/// grows with zoom).
pub fn content_scale(viewport: &Viewport, source: Size, content: &PixelRect) -> f64 {
    let crop = source_rect(viewport, source);
    if crop.width <= 0.0 {
        return 0.0;
    }
    content.width / crop.width
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_source_rect_contained(
            cx in 0.0f64..=1.0,
            cy in 0.0f64..=1.0,
            zoom in 1.0f64..=16.0,
            sw in 1.0f64..8000.0,
            sh in 1.0f64..8000.0,
        ) {
            let vp = Viewport::new(NormalizedCoord::new(cx, cy), zoom);
            let rect = source_rect(&vp, Size::new(sw, sh));
            prop_assert!((rect.width - sw / zoom).abs() < 1e-6);
            prop_assert!((rect.height - sh / zoom).abs() < 1e-6);
            prop_assert!(PixelRect::new(0.0, 0.0, sw, sh).contains_rect(&rect));
        }

        #[test]
        fn prop_sanitize_always_valid(
            cx in prop::num::f64::ANY,
            cy in prop::num::f64::ANY,
            zoom in prop::num::f64::ANY,
        ) {
            let vp = sanitize_viewport(&Viewport::new(NormalizedCoord::new(cx, cy), zoom));
            prop_assert!(vp.is_valid());
            prop_assert!(vp.zoom >= Viewport::MIN_ZOOM && vp.zoom <= Viewport::MAX_ZOOM);
        }
    }
}
