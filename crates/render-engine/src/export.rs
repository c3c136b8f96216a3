//! Export loop: seek, composite, and write every scheduled frame.
//!
//! Frames are processed strictly in schedule order. Each frame seeks the
//! screen (and camera) source to the frame's source time with retry, then
//! renders with whatever the sources hold. Seek failures are counted and
//! reported, never fatal. A sink error aborts the export.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tiny_skia::Pixmap;

use reframe_common::{ReframeError, ReframeResult};
use reframe_processing_core::scene::SceneSampler;
use reframe_project_model::analysis::AnalysisTracks;
use reframe_project_model::edit::EditState;
use reframe_project_model::project::LoadedProject;
use reframe_project_model::viewport::Size;

use crate::compositor::{Compositor, FrameInputs};
use crate::media::{FrameSink, MediaSources};
use crate::seek::{seek_with_retry, SeekOutcome, SeekPolicy};

/// An export job ready to be rendered.
#[derive(Debug, Clone)]
pub struct ExportJob {
    /// Edit snapshot the whole export renders from.
    pub edit: Arc<EditState>,

    pub analysis: Arc<AnalysisTracks>,

    /// Output size in pixels.
    pub width: u32,
    pub height: u32,

    /// Output frame rate.
    pub fps: u32,

    pub seek: SeekPolicy,
}

impl ExportJob {
    /// Job for a project's current edit state and export settings.
    pub fn from_project(project: &LoadedProject, seek: SeekPolicy) -> Self {
        Self {
            edit: Arc::new(project.edit.clone()),
            analysis: Arc::new(project.analysis.clone()),
            width: project.project.export.width,
            height: project.project.export.height,
            fps: project.project.export.fps,
            seek,
        }
    }
}

/// Progress callback for export rendering.
pub type ProgressCallback = Box<dyn Fn(ExportProgress) + Send>;

/// Export progress report.
#[derive(Debug, Clone)]
pub struct ExportProgress {
    /// Current progress [0.0, 1.0].
    pub progress: f64,

    /// Frames rendered so far.
    pub frames_rendered: u64,

    /// Total frames to render.
    pub total_frames: u64,

    /// Estimated time remaining in seconds.
    pub eta_secs: f64,

    /// Current stage.
    pub stage: ExportStage,
}

/// Stages of the export process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportStage {
    Preparing,
    Rendering,
    Finalizing,
    Complete,
    /// Stopped between frames by the stop flag.
    Stopped,
    Failed,
}

/// Summary of a finished (or stopped) export.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExportReport {
    pub frames_rendered: u64,
    pub total_frames: u64,
    pub export_duration_us: f64,
    /// Seeks that failed but had an earlier frame to fall back on.
    pub degraded_seeks: u64,
    /// Seeks that failed with no frame at all.
    pub failed_seeks: u64,
    pub warnings: Vec<String>,
    pub stopped: bool,
}

impl ExportReport {
    fn record_seek(&mut self, label: &str, frame_index: u64, target_us: f64, outcome: &SeekOutcome) {
        match outcome {
            SeekOutcome::Settled { .. } => {}
            SeekOutcome::Degraded { error, .. } => {
                self.degraded_seeks += 1;
                self.warnings.push(format!(
                    "frame {frame_index}: {label} seek to {target_us:.0}us degraded ({error})"
                ));
            }
            SeekOutcome::Failed { error, .. } => {
                self.failed_seeks += 1;
                self.warnings.push(format!(
                    "frame {frame_index}: {label} seek to {target_us:.0}us failed ({error})"
                ));
            }
        }
    }
}

fn progress_report(
    frames_rendered: u64,
    total_frames: u64,
    elapsed_secs: f64,
    stage: ExportStage,
) -> ExportProgress {
    let progress = if total_frames == 0 {
        0.0
    } else {
        (frames_rendered as f64 / total_frames as f64).clamp(0.0, 1.0)
    };
    let eta_secs = if progress > 0.0 {
        (elapsed_secs / progress) - elapsed_secs
    } else {
        0.0
    }
    .max(0.0);

    ExportProgress {
        progress,
        frames_rendered,
        total_frames,
        eta_secs,
        stage,
    }
}

/// Render every frame of `job` into `sink`.
///
/// `stop` is checked between frames; setting it ends the export early
/// with `stopped` set in the report. An in-flight seek is left to finish
/// or time out.
pub async fn export_frames(
    job: &ExportJob,
    sources: &mut MediaSources,
    sink: &mut dyn FrameSink,
    progress: Option<ProgressCallback>,
    stop: Arc<AtomicBool>,
) -> ReframeResult<ExportReport> {
    let notify = |p: ExportProgress| {
        if let Some(cb) = &progress {
            cb(p);
        }
    };
    notify(progress_report(0, 0, 0.0, ExportStage::Preparing));

    if job.fps == 0 {
        notify(progress_report(0, 0, 0.0, ExportStage::Failed));
        return Err(ReframeError::config("Export fps must be greater than zero"));
    }

    let sampler = SceneSampler::new(job.edit.clone(), job.analysis.clone());
    let schedule = sampler.schedule(job.fps);
    let total_frames = schedule.len() as u64;

    let (source_w, source_h) = sources.screen.dimensions();
    let compositor = match Compositor::new(
        job.edit.style.clone(),
        job.width,
        job.height,
        Size::new(source_w as f64, source_h as f64),
    ) {
        Ok(c) => c,
        Err(e) => {
            notify(progress_report(0, total_frames, 0.0, ExportStage::Failed));
            return Err(e);
        }
    };
    let mut frame = Pixmap::new(job.width, job.height)
        .ok_or_else(|| ReframeError::render("Failed to allocate frame"))?;

    tracing::info!(
        width = job.width,
        height = job.height,
        fps = job.fps,
        total_frames,
        export_duration_us = sampler.export_duration_us(),
        edit_version = job.edit.version,
        "Starting export"
    );

    let mut report = ExportReport {
        total_frames,
        export_duration_us: sampler.export_duration_us(),
        ..ExportReport::default()
    };
    let started = Instant::now();

    for timing in &schedule {
        if stop.load(Ordering::Relaxed) {
            tracing::info!(
                frames_rendered = report.frames_rendered,
                total_frames,
                "Export stopped"
            );
            report.stopped = true;
            break;
        }

        let outcome = seek_with_retry(&mut *sources.screen, timing.source_us, &job.seek).await;
        report.record_seek("screen", timing.index, timing.source_us, &outcome);
        if let Some(camera) = sources.camera.as_mut() {
            let outcome = seek_with_retry(&mut **camera, timing.source_us, &job.seek).await;
            report.record_seek("camera", timing.index, timing.source_us, &outcome);
        }

        let scene = sampler.sample_frame(timing);
        let inputs = FrameInputs {
            screen: sources.screen.current_frame(),
            camera: sources.camera.as_deref().and_then(|c| c.current_frame()),
            scene: &scene,
        };
        compositor.render_into(&mut frame, &inputs);

        if let Err(e) = sink.write_frame(timing.index, &frame).await {
            tracing::error!(frame = timing.index, error = %e, "Failed to write frame");
            notify(progress_report(
                report.frames_rendered,
                total_frames,
                started.elapsed().as_secs_f64(),
                ExportStage::Failed,
            ));
            return Err(e);
        }
        report.frames_rendered += 1;

        notify(progress_report(
            report.frames_rendered,
            total_frames,
            started.elapsed().as_secs_f64(),
            ExportStage::Rendering,
        ));
    }

    notify(progress_report(
        report.frames_rendered,
        total_frames,
        started.elapsed().as_secs_f64(),
        ExportStage::Finalizing,
    ));
    sink.finish().await?;

    let stage = if report.stopped {
        ExportStage::Stopped
    } else {
        ExportStage::Complete
    };
    notify(progress_report(
        report.frames_rendered,
        total_frames,
        started.elapsed().as_secs_f64(),
        stage,
    ));

    tracing::info!(
        frames_rendered = report.frames_rendered,
        degraded_seeks = report.degraded_seeks,
        failed_seeks = report.failed_seeks,
        elapsed_secs = started.elapsed().as_secs_f64(),
        "Export finished"
    );
    Ok(report)
}
