//! Live preview driver.
//!
//! The host calls [`PreviewRenderer::tick`] once per animation frame with
//! whatever media frames it currently has. The renderer never waits on
//! media: it draws the scene at the clock's export time and tells the host
//! which source time to seek to next.

use std::sync::Arc;
use std::time::Instant;

use tiny_skia::{Pixmap, PixmapRef};

use reframe_common::clock::{FramePacer, PlaybackClock};
use reframe_common::ReframeResult;
use reframe_processing_core::scene::{SceneSample, SceneSampler};
use reframe_project_model::analysis::AnalysisTracks;
use reframe_project_model::edit::EditState;
use reframe_project_model::viewport::Size;

use crate::compositor::{Compositor, FrameInputs};

/// One rendered preview frame.
pub struct PreviewFrame {
    pub pixmap: Pixmap,
    pub sample: SceneSample,
    /// Source time the media should be seeked to for this frame.
    pub requested_source_us: f64,
}

pub struct PreviewRenderer {
    sampler: SceneSampler,
    analysis: Arc<AnalysisTracks>,
    compositor: Compositor,
    source: Size,
    clock: PlaybackClock,
    pacer: FramePacer,
    origin: Instant,
}

impl PreviewRenderer {
    pub fn new(
        edit: Arc<EditState>,
        analysis: Arc<AnalysisTracks>,
        width: u32,
        height: u32,
        fps: u32,
        source: Size,
    ) -> ReframeResult<Self> {
        let compositor = Compositor::new(edit.style.clone(), width, height, source)?;
        let sampler = SceneSampler::new(edit, analysis.clone());
        let clock = PlaybackClock::new(sampler.export_duration_us());
        Ok(Self {
            sampler,
            analysis,
            compositor,
            source,
            clock,
            pacer: FramePacer::new(fps),
            origin: Instant::now(),
        })
    }

    /// Swap in a new edit snapshot. The playhead keeps its export position,
    /// clamped to the new duration.
    pub fn update_snapshot(&mut self, edit: Arc<EditState>, now: Instant) -> ReframeResult<()> {
        if *edit == *self.sampler.edit() {
            return Ok(());
        }
        if edit.style != *self.compositor.config() {
            let (width, height) = self.compositor.size();
            self.compositor = Compositor::new(edit.style.clone(), width, height, self.source)?;
        }
        self.sampler = SceneSampler::new(edit, self.analysis.clone());
        self.clock.set_duration(self.sampler.export_duration_us(), now);
        self.pacer.reset();
        tracing::debug!(
            version = self.sampler.edit().version,
            duration_us = self.sampler.export_duration_us(),
            "Preview snapshot updated"
        );
        Ok(())
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    /// Play, pause, or seek the preview.
    pub fn clock_mut(&mut self) -> &mut PlaybackClock {
        self.pacer.reset();
        &mut self.clock
    }

    pub fn sampler(&self) -> &SceneSampler {
        &self.sampler
    }

    /// Render the scene at an export time with the given media frames.
    pub fn render_at(
        &self,
        export_us: f64,
        screen: Option<PixmapRef<'_>>,
        camera: Option<PixmapRef<'_>>,
    ) -> ReframeResult<PreviewFrame> {
        let sample = self.sampler.sample(export_us);
        let pixmap = self.compositor.render(&FrameInputs {
            screen,
            camera,
            scene: &sample,
        })?;
        Ok(PreviewFrame {
            pixmap,
            requested_source_us: sample.source_us,
            sample,
        })
    }

    /// Render the frame for `now` if the pacer allows one.
    pub fn tick(
        &mut self,
        now: Instant,
        screen: Option<PixmapRef<'_>>,
        camera: Option<PixmapRef<'_>>,
    ) -> ReframeResult<Option<PreviewFrame>> {
        let wall_us = now.saturating_duration_since(self.origin).as_micros() as u64;
        if !self.pacer.should_tick(wall_us) {
            return Ok(None);
        }
        let export_us = self.clock.position_at(now);
        self.render_at(export_us, screen, camera).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use reframe_project_model::timing::TimeRange;

    fn renderer() -> PreviewRenderer {
        let edit = EditState::new(10_000_000);
        PreviewRenderer::new(
            Arc::new(edit),
            Arc::new(AnalysisTracks::default()),
            64,
            36,
            30,
            Size::new(1920.0, 1080.0),
        )
        .unwrap()
    }

    #[test]
    fn test_paused_preview_renders_at_playhead() {
        let mut preview = renderer();
        let now = Instant::now();
        preview.clock_mut().seek_at(2_500_000.0, now);
        let frame = preview.tick(now, None, None).unwrap().unwrap();
        assert_eq!(frame.sample.export_us, 2_500_000.0);
        assert_eq!(frame.requested_source_us, 2_500_000.0);
        assert_eq!((frame.pixmap.width(), frame.pixmap.height()), (64, 36));
    }

    #[test]
    fn test_pacer_drops_fast_ticks() {
        let mut preview = renderer();
        let now = Instant::now() + Duration::from_millis(5);
        assert!(preview.tick(now, None, None).unwrap().is_some());
        assert!(preview
            .tick(now + Duration::from_millis(5), None, None)
            .unwrap()
            .is_none());
        assert!(preview
            .tick(now + Duration::from_millis(40), None, None)
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_playing_clock_advances_export_time() {
        let mut preview = renderer();
        let start = Instant::now();
        preview.clock_mut().play_at(start);
        let later = start + Duration::from_millis(500);
        let frame = preview.tick(later, None, None).unwrap().unwrap();
        assert!((frame.sample.export_us - 500_000.0).abs() < 1.0);
    }

    #[test]
    fn test_snapshot_update_remaps_through_new_cut() {
        let mut preview = renderer();
        let now = Instant::now();
        preview.clock_mut().seek_at(3_000_000.0, now);

        let mut edit = EditState::new(10_000_000);
        edit.cuts.push(TimeRange::new(1_000_000, 2_000_000));
        edit.version = 1;
        preview.update_snapshot(Arc::new(edit), now).unwrap();

        assert_eq!(preview.clock().duration_us(), 9_000_000.0);
        let frame = preview.render_at(preview.clock().position_at(now), None, None).unwrap();
        assert_eq!(frame.requested_source_us, 4_000_000.0);
    }

    #[test]
    fn test_shrinking_snapshot_clamps_playhead() {
        let mut preview = renderer();
        let now = Instant::now();
        preview.clock_mut().seek_at(9_500_000.0, now);
        let mut edit = EditState::new(10_000_000);
        edit.cuts.push(TimeRange::new(0, 5_000_000));
        edit.version = 1;
        preview.update_snapshot(Arc::new(edit), now).unwrap();
        assert_eq!(preview.clock().position_at(now), 5_000_000.0);
    }
}
