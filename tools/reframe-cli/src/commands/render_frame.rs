//! Render a single frame to PNG.

use std::path::PathBuf;
use std::sync::Arc;

use reframe_common::config::AppConfig;
use reframe_processing_core::scene::SceneSampler;
use reframe_project_model::viewport::Size;
use reframe_render_engine::compositor::{Compositor, FrameInputs};
use reframe_render_engine::media::open_sources;
use reframe_render_engine::seek::{seek_with_retry, SeekOutcome, SeekPolicy};

use super::{fmt_secs, load_project, secs_to_timestamp};

pub async fn run(
    path: PathBuf,
    at_secs: f64,
    output: Option<PathBuf>,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let project = load_project(&path)?;
    let export_us = secs_to_timestamp(at_secs)? as f64;

    let sampler = SceneSampler::new(
        Arc::new(project.edit.clone()),
        Arc::new(project.analysis.clone()),
    );
    let scene = sampler.sample(export_us);
    println!(
        "Export {} → source {} (zoom {:.2}, {} active effects)",
        fmt_secs(scene.export_us),
        fmt_secs(scene.source_us),
        scene.viewport.zoom,
        scene.effects.len()
    );

    let mut sources = open_sources(&project).await?;
    let policy = SeekPolicy::from_defaults(&config.seek);
    let outcome = seek_with_retry(&mut *sources.screen, scene.source_us, &policy).await;
    if let SeekOutcome::Failed { error, .. } = &outcome {
        anyhow::bail!("Screen seek failed: {error}");
    }
    if let Some(camera) = sources.camera.as_mut() {
        let outcome = seek_with_retry(&mut **camera, scene.source_us, &policy).await;
        if !outcome.is_settled() {
            tracing::warn!(?outcome, "Camera frame unavailable");
        }
    }

    let (source_w, source_h) = sources.screen.dimensions();
    let export = &project.project.export;
    let compositor = Compositor::new(
        project.edit.style.clone(),
        export.width,
        export.height,
        Size::new(source_w as f64, source_h as f64),
    )?;
    let frame = compositor.render(&FrameInputs {
        screen: sources.screen.current_frame(),
        camera: sources.camera.as_deref().and_then(|c| c.current_frame()),
        scene: &scene,
    })?;

    let output_path = output.unwrap_or_else(|| {
        path.join("exports")
            .join(format!("frame_{}ms.png", (export_us / 1000.0).round() as u64))
    });
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    frame
        .save_png(&output_path)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", output_path.display()))?;

    println!("Frame written: {}", output_path.display());
    Ok(())
}
