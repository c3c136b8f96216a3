//! Where the source content sits on the output surface.
//!
//! The source is letterboxed into the surface minus screen-frame padding
//! and minus whatever the device chrome reserves around it. Overlays are
//! positioned relative to the resulting content rect.

use reframe_processing_core::effects::REFERENCE_HEIGHT;
use reframe_project_model::style::{CompositorConfig, DeviceFrame};
use reframe_project_model::viewport::{PixelRect, Size};

/// Browser title bar height, in reference pixels.
pub const BROWSER_BAR_HEIGHT: f64 = 40.0;
/// Browser window corner radius, in reference pixels.
pub const BROWSER_CORNER_RADIUS: f64 = 12.0;
/// Laptop bezel thickness, in reference pixels.
pub const LAPTOP_BEZEL: f64 = 18.0;
/// Laptop base height, in reference pixels.
pub const LAPTOP_BASE_HEIGHT: f64 = 26.0;

/// Space reserved around the content on each side.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Insets {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Insets {
    /// Chrome reservation for a device frame at `scale`.
    pub fn for_device(frame: DeviceFrame, scale: f64) -> Self {
        match frame {
            DeviceFrame::None => Self::default(),
            DeviceFrame::Browser => Self {
                top: BROWSER_BAR_HEIGHT * scale,
                ..Self::default()
            },
            DeviceFrame::Laptop => {
                let bezel = LAPTOP_BEZEL * scale;
                Self {
                    top: bezel,
                    right: bezel,
                    bottom: bezel + LAPTOP_BASE_HEIGHT * scale,
                    left: bezel,
                }
            }
        }
    }

    fn shrink(&self, rect: &PixelRect) -> PixelRect {
        PixelRect::new(
            rect.x + self.left,
            rect.y + self.top,
            (rect.width - self.left - self.right).max(0.0),
            (rect.height - self.top - self.bottom).max(0.0),
        )
    }

    fn grow(&self, rect: &PixelRect) -> PixelRect {
        PixelRect::new(
            rect.x - self.left,
            rect.y - self.top,
            rect.width + self.left + self.right,
            rect.height + self.top + self.bottom,
        )
    }
}

/// Resolved placement for one surface size and style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentLayout {
    pub surface: Size,
    /// Surface height relative to the reference height; style sizes are
    /// multiplied by this.
    pub scale: f64,
    /// Where the visible source window is drawn.
    pub content: PixelRect,
    /// Outer bounds of the device chrome, when a device frame is shown.
    pub device: Option<PixelRect>,
    pub device_frame: DeviceFrame,
}

impl ContentLayout {
    /// Lay out a source of aspect `source_aspect` on `surface`.
    ///
    /// Padding applies only while the screen frame is enabled. An invalid
    /// aspect falls back to the surface aspect.
    pub fn compute(surface: Size, source_aspect: f64, config: &CompositorConfig) -> Self {
        let scale = reference_scale(surface);
        let padding = if config.screen.enabled {
            (config.screen.padding * scale).max(0.0)
        } else {
            0.0
        };
        let insets = Insets::for_device(config.device_frame, scale);

        let area = PixelRect::from_size(surface).inset(padding);
        let available = insets.shrink(&area);
        let aspect = if source_aspect.is_finite() && source_aspect > 0.0 {
            source_aspect
        } else {
            surface.aspect()
        };
        let content = available.fit_aspect(aspect);

        let device = match config.device_frame {
            DeviceFrame::None => None,
            DeviceFrame::Browser | DeviceFrame::Laptop => Some(insets.grow(&content)),
        };

        Self {
            surface,
            scale,
            content,
            device,
            device_frame: config.device_frame,
        }
    }
}

/// `surface.height / 1080`, or 1.0 for a non-drawable surface.
pub fn reference_scale(surface: Size) -> f64 {
    if surface.is_drawable() {
        surface.height / REFERENCE_HEIGHT
    } else {
        1.0
    }
}
