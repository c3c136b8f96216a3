//! Viewport and geometry types for camera framing.
//!
//! Source positions are normalized to `[0.0, 1.0]` relative to the source
//! frame. Pixel-space types (`Size`, `PixelRect`, `CanvasPoint`) describe
//! the output surface.

use serde::{Deserialize, Serialize};

/// A normalized position on the source frame.
///
/// `(0.0, 0.0)` is top-left, `(1.0, 1.0)` is bottom-right. Values coming
/// from analysis or user input may be NaN or out of range and have to be
/// checked with [`NormalizedCoord::is_valid`] before use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedCoord {
    pub x: f64,
    pub y: f64,
}

impl NormalizedCoord {
    /// Center of the frame.
    pub const CENTER: NormalizedCoord = NormalizedCoord { x: 0.5, y: 0.5 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Both components are finite and inside `[0, 1]`.
    pub fn is_valid(&self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &NormalizedCoord) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Linear interpolation between two points (unclamped `t`).
    pub fn lerp(a: &NormalizedCoord, b: &NormalizedCoord, t: f64) -> NormalizedCoord {
        NormalizedCoord {
            x: a.x + (b.x - a.x) * t,
            y: a.y + (b.y - a.y) * t,
        }
    }
}

impl Default for NormalizedCoord {
    fn default() -> Self {
        Self::CENTER
    }
}

/// The zoom/pan window applied to the source frame.
///
/// A zoom of `2.0` shows half the source width and height around `center`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Window center (normalized).
    pub center: NormalizedCoord,
    /// Magnification factor (1.0 = whole frame).
    pub zoom: f64,
}

impl Viewport {
    /// Whole frame, no zoom.
    pub const IDENTITY: Viewport = Viewport {
        center: NormalizedCoord::CENTER,
        zoom: 1.0,
    };

    /// Smallest zoom that still fits inside the source.
    pub const MIN_ZOOM: f64 = 1.0;

    /// Largest supported zoom.
    pub const MAX_ZOOM: f64 = 16.0;

    pub fn new(center: NormalizedCoord, zoom: f64) -> Self {
        Self { center, zoom }
    }

    /// Zoom is finite and positive and the center lies within the frame.
    pub fn is_valid(&self) -> bool {
        self.zoom.is_finite() && self.zoom > 0.0 && self.center.is_valid()
    }

    /// Interpolate center and zoom independently (unclamped `t`).
    pub fn lerp(a: &Viewport, b: &Viewport, t: f64) -> Viewport {
        Viewport {
            center: NormalizedCoord::lerp(&a.center, &b.center, t),
            zoom: a.zoom + (b.zoom - a.zoom) * t,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both dimensions are finite and strictly positive.
    pub fn is_drawable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Width divided by height.
    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }

    /// The smaller of the two dimensions.
    pub fn min_side(&self) -> f64 {
        self.width.min(self.height)
    }
}

/// An axis-aligned rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle at the origin covering `size`.
    pub fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn center(&self) -> CanvasPoint {
        CanvasPoint::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Shrink by `amount` on every side; never produces negative size.
    pub fn inset(&self, amount: f64) -> PixelRect {
        let dx = amount.min(self.width / 2.0);
        let dy = amount.min(self.height / 2.0);
        PixelRect::new(
            self.x + dx,
            self.y + dy,
            self.width - 2.0 * dx,
            self.height - 2.0 * dy,
        )
    }

    /// Largest rectangle with aspect `aspect` centered inside `self`.
    pub fn fit_aspect(&self, aspect: f64) -> PixelRect {
        if !aspect.is_finite() || aspect <= 0.0 || self.height <= 0.0 {
            return *self;
        }
        let (width, height) = if self.width / self.height > aspect {
            (self.height * aspect, self.height)
        } else {
            (self.width, self.width / aspect)
        };
        PixelRect::new(
            self.x + (self.width - width) / 2.0,
            self.y + (self.height - height) / 2.0,
            width,
            height,
        )
    }

    /// Whether `inner` lies within `self` (with a small tolerance).
    pub fn contains_rect(&self, inner: &PixelRect) -> bool {
        const EPS: f64 = 1e-9;
        inner.x >= self.x - EPS
            && inner.y >= self.y - EPS
            && inner.right() <= self.right() + EPS
            && inner.bottom() <= self.bottom() + EPS
    }
}

/// A point on the output surface, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasPoint {
    pub x: f64,
    pub y: f64,
}

impl CanvasPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}
