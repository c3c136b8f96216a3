//! Frame compositor: draws every layer of one output frame in fixed order.
//!
//! Layers are drawn bottom to top:
//! background, device frame, screen, effects, cursor, camera bubble.
//! Each layer builds its own masks and transforms and passes them to the
//! draw call explicitly, so nothing carries over between layers.

use tiny_skia::{Pixmap, PixmapRef};

use reframe_common::{ReframeError, ReframeResult};
use reframe_processing_core::scene::SceneSample;
use reframe_processing_core::transform::sanitize_viewport;
use reframe_project_model::style::CompositorConfig;
use reframe_project_model::viewport::Size;

use crate::background::{draw_background, resolve_fill};
use crate::camera::draw_camera_bubble;
use crate::device::draw_device_frame;
use crate::layout::ContentLayout;
use crate::overlays::{draw_cursor, draw_effects};
use crate::screen::draw_screen;

/// One compositor layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Background,
    DeviceFrame,
    Screen,
    Effects,
    Cursor,
    CameraBubble,
}

impl Layer {
    /// Every layer in draw order.
    pub const ORDER: [Layer; 6] = [
        Layer::Background,
        Layer::DeviceFrame,
        Layer::Screen,
        Layer::Effects,
        Layer::Cursor,
        Layer::CameraBubble,
    ];
}

/// Media and scene state for one frame.
#[derive(Clone, Copy)]
pub struct FrameInputs<'a> {
    /// Current screen frame, if the source has produced one.
    pub screen: Option<PixmapRef<'a>>,
    /// Current camera frame, if there is a camera source.
    pub camera: Option<PixmapRef<'a>>,
    pub scene: &'a SceneSample,
}

/// Renders frames at a fixed output size.
#[derive(Debug, Clone)]
pub struct Compositor {
    config: CompositorConfig,
    width: u32,
    height: u32,
    layout: ContentLayout,
}

impl Compositor {
    /// Create a compositor for `width` x `height` output of a `source`-sized
    /// screen recording.
    pub fn new(config: CompositorConfig, width: u32, height: u32, source: Size) -> ReframeResult<Self> {
        if width == 0 || height == 0 {
            return Err(ReframeError::render(format!(
                "Invalid output size {width}x{height}"
            )));
        }
        let surface = Size::new(width as f64, height as f64);
        let layout = ContentLayout::compute(surface, source.aspect(), &config);
        tracing::debug!(
            width,
            height,
            content_w = layout.content.width,
            content_h = layout.content.height,
            "Compositor layout"
        );
        Ok(Self {
            config,
            width,
            height,
            layout,
        })
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    pub fn layout(&self) -> &ContentLayout {
        &self.layout
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Render a new frame.
    pub fn render(&self, inputs: &FrameInputs<'_>) -> ReframeResult<Pixmap> {
        let mut pixmap = Pixmap::new(self.width, self.height)
            .ok_or_else(|| ReframeError::render("Failed to allocate frame"))?;
        self.render_into(&mut pixmap, inputs);
        Ok(pixmap)
    }

    /// Render into an existing pixmap of the compositor's size, replacing its
    /// contents. Returns the layers that drew something, in order.
    pub fn render_into(&self, pixmap: &mut Pixmap, inputs: &FrameInputs<'_>) -> Vec<Layer> {
        pixmap.fill(tiny_skia::Color::TRANSPARENT);
        let scene = inputs.scene;
        let viewport = sanitize_viewport(&scene.viewport);
        let layout = &self.layout;
        let mut drawn = Vec::with_capacity(Layer::ORDER.len());

        for layer in Layer::ORDER {
            let visible = match layer {
                Layer::Background => {
                    if self.config.background.enabled {
                        draw_background(pixmap, &resolve_fill(&self.config.background));
                        true
                    } else {
                        false
                    }
                }
                Layer::DeviceFrame => {
                    draw_device_frame(pixmap, layout, &self.config.screen.shadow)
                }
                Layer::Screen => {
                    draw_screen(pixmap, layout, &self.config.screen, inputs.screen, &viewport);
                    true
                }
                Layer::Effects => {
                    draw_effects(
                        pixmap,
                        &scene.effects,
                        scene.source_us,
                        &self.config.effects,
                        &viewport,
                        &layout.content,
                    ) > 0
                }
                Layer::Cursor => draw_cursor(
                    pixmap,
                    scene.cursor.as_ref(),
                    &self.config.cursor,
                    &viewport,
                    &layout.content,
                    layout.scale,
                ),
                Layer::CameraBubble => {
                    draw_camera_bubble(pixmap, &self.config.camera, inputs.camera, layout.scale)
                }
            };
            if visible {
                drawn.push(layer);
            }
        }
        drawn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reframe_processing_core::cursor::CursorSample;
    use reframe_processing_core::time_remap::AudioPolicy;
    use reframe_project_model::style::DeviceFrame;
    use reframe_project_model::track::{Effect, EffectType};
    use reframe_project_model::viewport::{NormalizedCoord, Viewport};
    use tiny_skia::Color;

    fn scene() -> SceneSample {
        SceneSample {
            export_us: 0.0,
            source_us: 0.0,
            viewport: Viewport::IDENTITY,
            effects: vec![Effect::new(0, 500_000, EffectType::Click, NormalizedCoord::new(0.3, 0.3))],
            cursor: Some(CursorSample {
                position: NormalizedCoord::new(0.6, 0.6),
                opacity: 1.0,
                visible: true,
            }),
            audio: AudioPolicy::for_speed(1.0),
        }
    }

    fn solid(width: u32, height: u32, color: Color) -> Pixmap {
        let mut p = Pixmap::new(width, height).unwrap();
        p.fill(color);
        p
    }

    #[test]
    fn test_rejects_empty_output() {
        assert!(Compositor::new(CompositorConfig::default(), 0, 10, Size::new(1.0, 1.0)).is_err());
    }

    #[test]
    fn test_all_layers_in_order() {
        let mut config = CompositorConfig::default();
        config.device_frame = DeviceFrame::Browser;
        let compositor = Compositor::new(config, 320, 180, Size::new(1920.0, 1080.0)).unwrap();
        let screen = solid(64, 36, Color::from_rgba8(0, 0, 255, 255));
        let camera = solid(16, 16, Color::from_rgba8(0, 255, 0, 255));
        let scene = scene();
        let inputs = FrameInputs {
            screen: Some(screen.as_ref()),
            camera: Some(camera.as_ref()),
            scene: &scene,
        };
        let mut pixmap = Pixmap::new(320, 180).unwrap();
        assert_eq!(compositor.render_into(&mut pixmap, &inputs), Layer::ORDER.to_vec());
    }

    #[test]
    fn test_toggled_layers_are_skipped() {
        let mut config = CompositorConfig::default();
        config.background.enabled = false;
        config.effects.enabled = false;
        config.cursor.enabled = false;
        let compositor = Compositor::new(config, 64, 64, Size::new(64.0, 64.0)).unwrap();
        let scene = scene();
        let inputs = FrameInputs {
            screen: None,
            camera: None,
            scene: &scene,
        };
        let mut pixmap = Pixmap::new(64, 64).unwrap();
        assert_eq!(compositor.render_into(&mut pixmap, &inputs), vec![Layer::Screen]);
    }

    #[test]
    fn test_camera_drawn_over_screen() {
        let mut config = CompositorConfig::default();
        config.screen.padding = 0.0;
        config.camera.position = NormalizedCoord::new(0.5, 0.5);
        config.camera.margin = 0.0;
        config.camera.border.width = 0.0;
        config.effects.enabled = false;
        config.cursor.enabled = false;
        let compositor = Compositor::new(config, 100, 100, Size::new(100.0, 100.0)).unwrap();
        let screen = solid(100, 100, Color::from_rgba8(0, 0, 255, 255));
        let camera = solid(10, 10, Color::from_rgba8(255, 0, 0, 255));
        let scene = scene();
        let frame = compositor
            .render(&FrameInputs {
                screen: Some(screen.as_ref()),
                camera: Some(camera.as_ref()),
                scene: &scene,
            })
            .unwrap();
        let center = frame.pixel(50, 50).unwrap();
        assert_eq!((center.red(), center.blue()), (255, 0));
        let corner = frame.pixel(5, 5).unwrap();
        assert_eq!(corner.blue(), 255);
    }

    #[test]
    fn test_render_is_deterministic() {
        let compositor =
            Compositor::new(CompositorConfig::default(), 96, 54, Size::new(1920.0, 1080.0)).unwrap();
        let screen = solid(32, 18, Color::from_rgba8(40, 80, 120, 255));
        let scene = scene();
        let inputs = FrameInputs {
            screen: Some(screen.as_ref()),
            camera: None,
            scene: &scene,
        };
        let a = compositor.render(&inputs).unwrap();
        let b = compositor.render(&inputs).unwrap();
        assert_eq!(a.data(), b.data());
    }
}
