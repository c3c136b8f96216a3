//! Per-frame sampling of the whole pipeline.
//!
//! A [`SceneSampler`] is built from one snapshot of the edit state and the
//! analysis tracks. For each export time it resolves the source time and
//! everything the compositor needs at that instant.

use std::sync::Arc;

use reframe_project_model::analysis::AnalysisTracks;
use reframe_project_model::edit::EditState;
use reframe_project_model::track::Effect;
use reframe_project_model::viewport::Viewport;

use crate::cursor::{interpolate_cursor, CursorSample};
use crate::effects::active_effects;
use crate::keyframes::ViewportTrack;
use crate::time_remap::{audio_policy_at, AudioPolicy, FrameTiming, TimeMap};

/// Everything that varies over time for one output frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSample {
    pub export_us: f64,
    pub source_us: f64,
    pub viewport: Viewport,
    pub effects: Vec<Effect>,
    pub cursor: Option<CursorSample>,
    pub audio: AudioPolicy,
}

/// Samples viewport, effects, cursor, and audio policy over export time.
#[derive(Debug, Clone)]
pub struct SceneSampler {
    edit: Arc<EditState>,
    analysis: Arc<AnalysisTracks>,
    viewports: ViewportTrack,
    time_map: TimeMap,
}

impl SceneSampler {
    pub fn new(edit: Arc<EditState>, analysis: Arc<AnalysisTracks>) -> Self {
        let viewports = ViewportTrack::new(&analysis.auto_keyframes, &edit.manual_keyframes);
        let time_map = TimeMap::from_edit(&edit);
        Self {
            edit,
            analysis,
            viewports,
            time_map,
        }
    }

    pub fn edit(&self) -> &EditState {
        &self.edit
    }

    pub fn time_map(&self) -> &TimeMap {
        &self.time_map
    }

    pub fn viewports(&self) -> &ViewportTrack {
        &self.viewports
    }

    pub fn export_duration_us(&self) -> f64 {
        self.time_map.export_duration_us()
    }

    /// Frame schedule at `fps` for this snapshot.
    pub fn schedule(&self, fps: u32) -> Vec<FrameTiming> {
        self.time_map.frame_schedule(fps)
    }

    /// Sample the scene at an export time.
    pub fn sample(&self, export_us: f64) -> SceneSample {
        let source_us = self.time_map.to_source_time(export_us);
        self.sample_at(export_us, source_us)
    }

    /// Sample at a scheduled frame.
    pub fn sample_frame(&self, frame: &FrameTiming) -> SceneSample {
        self.sample_at(frame.export_us, frame.source_us)
    }

    fn sample_at(&self, export_us: f64, source_us: f64) -> SceneSample {
        SceneSample {
            export_us,
            source_us,
            viewport: self.viewports.viewport_at(source_us),
            effects: active_effects(&self.analysis.effects, source_us)
                .into_iter()
                .cloned()
                .collect(),
            cursor: interpolate_cursor(&self.analysis.cursor, source_us),
            audio: audio_policy_at(source_us, &self.edit.speed_ramps),
        }
    }
}
