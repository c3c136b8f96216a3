//! Visual styling for the compositor.
//!
//! [`CompositorConfig`] is rebuilt by the editing session whenever style
//! settings change and treated as immutable for the duration of a render
//! call. Every section deserializes with defaults so partial documents load.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::viewport::NormalizedCoord;

/// An sRGB color with straight (non-premultiplied) alpha.
///
/// Serialized as a hex string: `#rrggbb` or `#rrggbbaa`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a: if hex.len() == 8 { channel(6)? } else { 255 },
        })
    }

    /// The same color with alpha scaled by `factor` in `[0, 1]`.
    pub fn with_opacity(self, factor: f64) -> Self {
        let factor = if factor.is_finite() {
            factor.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            a: (self.a as f64 * factor).round() as u8,
            ..self
        }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(
                f,
                "#{:02x}{:02x}{:02x}{:02x}",
                self.r, self.g, self.b, self.a
            )
        }
    }
}

impl TryFrom<String> for Rgba {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgba::from_hex(&value).ok_or_else(|| format!("invalid hex color: {value:?}"))
    }
}

impl From<Rgba> for String {
    fn from(value: Rgba) -> Self {
        value.to_string()
    }
}

/// Everything the compositor needs to style one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CompositorConfig {
    pub background: BackgroundConfig,
    pub device_frame: DeviceFrame,
    pub screen: ScreenFrameConfig,
    pub effects: EffectStyle,
    pub cursor: CursorStyle,
    pub camera: CameraBubbleConfig,
}

/// Canvas background.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    pub enabled: bool,
    /// Named gradient preset; ignored when `custom` is set.
    pub gradient_id: Option<String>,
    /// Explicit fill overriding the preset.
    pub custom: Option<BackgroundFill>,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            gradient_id: Some("dusk".to_string()),
            custom: None,
        }
    }
}

/// A background fill spanning the whole surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackgroundFill {
    Solid {
        color: Rgba,
    },
    LinearGradient {
        /// Direction in degrees; 0 runs left-to-right, 90 top-to-bottom.
        angle_deg: f64,
        stops: Vec<GradientStop>,
    },
}

/// A color stop at `offset` in `[0, 1]` along the gradient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub offset: f64,
    pub color: Rgba,
}

impl GradientStop {
    pub fn new(offset: f64, color: Rgba) -> Self {
        Self { offset, color }
    }
}

/// Decoration drawn behind the screen content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeviceFrame {
    #[default]
    None,
    /// Browser window chrome with a title bar above the content.
    Browser,
    /// Laptop bezel around the content and a base below it.
    Laptop,
}

/// A soft drop shadow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    pub enabled: bool,
    /// Spread of the soft edge, in reference pixels.
    pub blur: f64,
    /// Vertical offset, in reference pixels.
    pub offset_y: f64,
    /// Peak opacity in `[0, 1]`.
    pub opacity: f64,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            blur: 40.0,
            offset_y: 12.0,
            opacity: 0.45,
        }
    }
}

/// The rounded "screen" holding the source video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenFrameConfig {
    pub enabled: bool,
    /// Space between the surface edge and the content, in reference pixels.
    pub padding: f64,
    /// Corner radius, in reference pixels.
    pub corner_radius: f64,
    pub shadow: ShadowConfig,
}

impl Default for ScreenFrameConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            padding: 64.0,
            corner_radius: 16.0,
            shadow: ShadowConfig::default(),
        }
    }
}

/// Click-ring appearance, sized against a 1080px-tall reference surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectStyle {
    pub enabled: bool,
    pub start_radius: f64,
    pub end_radius: f64,
    pub start_opacity: f64,
    pub stroke_width: f64,
    pub color: Rgba,
    /// Used for right clicks.
    pub accent_color: Rgba,
}

impl Default for EffectStyle {
    fn default() -> Self {
        Self {
            enabled: true,
            start_radius: 12.0,
            end_radius: 48.0,
            start_opacity: 0.8,
            stroke_width: 4.0,
            color: Rgba::rgb(255, 255, 255),
            accent_color: Rgba::rgb(255, 149, 0),
        }
    }
}

/// Synthetic cursor appearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorStyle {
    pub enabled: bool,
    /// Multiplier on the reference cursor height.
    pub scale: f64,
    pub fill: Rgba,
    pub outline: Rgba,
}

impl Default for CursorStyle {
    fn default() -> Self {
        Self {
            enabled: true,
            scale: 1.0,
            fill: Rgba::rgb(20, 20, 20),
            outline: Rgba::rgb(255, 255, 255),
        }
    }
}

/// Shape of the camera bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BubbleShape {
    #[default]
    Circle,
    /// Rounded rectangle with height = 0.75 × width.
    RoundedRect,
}

/// Border around the camera bubble.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BorderConfig {
    /// Stroke width in reference pixels; zero disables the border.
    pub width: f64,
    pub color: Rgba,
}

impl Default for BorderConfig {
    fn default() -> Self {
        Self {
            width: 4.0,
            color: Rgba::rgb(255, 255, 255),
        }
    }
}

/// Picture-in-picture camera overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraBubbleConfig {
    pub enabled: bool,
    /// Placement within the free space: `(0, 0)` top-left, `(1, 1)` bottom-right.
    pub position: NormalizedCoord,
    /// Bubble width as a fraction of the smaller surface dimension.
    pub size: f64,
    pub min_size: f64,
    pub max_size: f64,
    /// Distance kept from the surface edge, in reference pixels.
    pub margin: f64,
    pub shape: BubbleShape,
    /// Corner radius for `RoundedRect`, in reference pixels.
    pub corner_radius: f64,
    pub border: BorderConfig,
    pub shadow: ShadowConfig,
    /// Gaussian sigma for blurring what lies behind the bubble, in reference
    /// pixels; zero disables it.
    pub background_blur: f64,
}

impl Default for CameraBubbleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            position: NormalizedCoord::new(1.0, 1.0),
            size: 0.25,
            min_size: 0.1,
            max_size: 0.5,
            margin: 32.0,
            shape: BubbleShape::Circle,
            corner_radius: 24.0,
            border: BorderConfig::default(),
            shadow: ShadowConfig {
                blur: 24.0,
                offset_y: 8.0,
                ..ShadowConfig::default()
            },
            background_blur: 0.0,
        }
    }
}
