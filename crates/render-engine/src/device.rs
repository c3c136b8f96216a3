//! Device chrome drawn around the screen content.

use tiny_skia::{PathBuilder, Pixmap};

use reframe_project_model::style::{DeviceFrame, Rgba, ShadowConfig};
use reframe_project_model::viewport::PixelRect;

use crate::layout::{ContentLayout, BROWSER_BAR_HEIGHT, BROWSER_CORNER_RADIUS, LAPTOP_BEZEL};
use crate::paint::{draw_shadow, fill, skia_color, Shape};

const BROWSER_WINDOW: Rgba = Rgba::rgb(0xec, 0xec, 0xef);
const BROWSER_ADDRESS_BAR: Rgba = Rgba::rgb(0xff, 0xff, 0xff);
const TRAFFIC_LIGHTS: [Rgba; 3] = [
    Rgba::rgb(0xff, 0x5f, 0x57),
    Rgba::rgb(0xfe, 0xbc, 0x2e),
    Rgba::rgb(0x28, 0xc8, 0x40),
];
const LAPTOP_BEZEL_COLOR: Rgba = Rgba::rgb(0x1d, 0x1d, 0x1f);
const LAPTOP_BASE_COLOR: Rgba = Rgba::rgb(0xc7, 0xc8, 0xcc);
const LAPTOP_CORNER_RADIUS: f64 = 18.0;

/// Corner radius the screen content is clipped to, in surface pixels.
pub fn content_corner_radius(frame: DeviceFrame, screen_radius: f64, scale: f64) -> f64 {
    match frame {
        DeviceFrame::None => (screen_radius * scale).max(0.0),
        // The title bar covers the top corners; only the bottom ones show.
        DeviceFrame::Browser => BROWSER_CORNER_RADIUS * scale,
        DeviceFrame::Laptop => 0.0,
    }
}

/// Draw the device frame for `layout`, including its shadow.
///
/// Returns `false` when the layout has no device frame.
pub fn draw_device_frame(pixmap: &mut Pixmap, layout: &ContentLayout, shadow: &ShadowConfig) -> bool {
    let Some(device) = layout.device else {
        return false;
    };
    match layout.device_frame {
        DeviceFrame::None => return false,
        DeviceFrame::Browser => draw_browser(pixmap, &device, layout.scale, shadow),
        DeviceFrame::Laptop => draw_laptop(pixmap, &device, &layout.content, layout.scale, shadow),
    }
    true
}

fn draw_browser(pixmap: &mut Pixmap, device: &PixelRect, scale: f64, shadow: &ShadowConfig) {
    let window = Shape::RoundedRect {
        rect: *device,
        radius: BROWSER_CORNER_RADIUS * scale,
    };
    draw_shadow(pixmap, &window, shadow, scale);
    if let Some(path) = window.path() {
        fill(pixmap, &path, skia_color(BROWSER_WINDOW, 1.0), None);
    }

    let bar = BROWSER_BAR_HEIGHT * scale;
    let dot = 12.0 * scale;
    let cy = device.y + bar / 2.0;
    for (i, color) in TRAFFIC_LIGHTS.iter().enumerate() {
        let cx = device.x + 20.0 * scale + i as f64 * 20.0 * scale;
        let rect = PixelRect::new(cx - dot / 2.0, cy - dot / 2.0, dot, dot);
        if let Some(path) = (Shape::Ellipse { rect }).path() {
            fill(pixmap, &path, skia_color(*color, 1.0), None);
        }
    }

    let address_x = device.x + 90.0 * scale;
    let address_w = (device.width - 180.0 * scale).max(0.0);
    let address_h = bar * 0.6;
    let address = Shape::RoundedRect {
        rect: PixelRect::new(address_x, cy - address_h / 2.0, address_w, address_h),
        radius: address_h / 2.0,
    };
    if let Some(path) = address.path() {
        fill(pixmap, &path, skia_color(BROWSER_ADDRESS_BAR, 1.0), None);
    }
}

fn draw_laptop(
    pixmap: &mut Pixmap,
    device: &PixelRect,
    content: &PixelRect,
    scale: f64,
    shadow: &ShadowConfig,
) {
    let bezel = LAPTOP_BEZEL * scale;
    // Lid: the device rect minus the base strip.
    let lid = PixelRect::new(
        device.x,
        device.y,
        device.width,
        content.bottom() + bezel - device.y,
    );
    let lid_shape = Shape::RoundedRect {
        rect: lid,
        radius: LAPTOP_CORNER_RADIUS * scale,
    };
    draw_shadow(pixmap, &lid_shape, shadow, scale);
    if let Some(path) = lid_shape.path() {
        fill(pixmap, &path, skia_color(LAPTOP_BEZEL_COLOR, 1.0), None);
    }

    // Base: a trapezoid a little wider than the lid.
    let overhang = bezel * 2.0;
    let (top, bottom) = (lid.bottom() as f32, device.bottom() as f32);
    let (left, right) = (device.x as f32, device.right() as f32);
    let wide = overhang as f32;
    let mut pb = PathBuilder::new();
    pb.move_to(left, top);
    pb.line_to(right, top);
    pb.line_to(right + wide, bottom);
    pb.line_to(left - wide, bottom);
    pb.close();
    if let Some(path) = pb.finish() {
        fill(pixmap, &path, skia_color(LAPTOP_BASE_COLOR, 1.0), None);
    }
}
