//! Initialize a new Reframe project.

use std::path::{Path, PathBuf};

use reframe_project_model::project::{MediaKind, MediaRef};
use reframe_project_model::{EditState, LoadedProject};
use reframe_render_engine::media::{ImageSequenceSource, MediaSource, StillImageSource};

use super::{fmt_secs, secs_to_timestamp};

pub struct InitArgs {
    pub name: String,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub screen: Option<PathBuf>,
    pub camera: Option<PathBuf>,
    pub sequence_fps: f64,
    pub still_secs: f64,
}

pub async fn run(args: InitArgs) -> anyhow::Result<()> {
    let project_dir = args.output.join(&args.name);
    println!("Creating project '{}' at {}", args.name, project_dir.display());

    let mut project =
        LoadedProject::create(&project_dir, &args.name, args.width, args.height, args.fps)
            .map_err(|e| anyhow::anyhow!("Failed to create project: {e}"))?;

    if let Some(screen) = &args.screen {
        let media = probe_media(screen, args.sequence_fps, args.still_secs).await?;
        project.edit = EditState::new(media.duration_us);
        project.project.sources.screen = Some(media);
    }
    if let Some(camera) = &args.camera {
        project.project.sources.camera =
            Some(probe_media(camera, args.sequence_fps, args.still_secs).await?);
    }
    project
        .save()
        .map_err(|e| anyhow::anyhow!("Failed to save project: {e}"))?;

    println!("Project created successfully:");
    println!("  Directory: {}", project.root.display());
    println!(
        "  Output: {}x{} @ {}fps",
        args.width, args.height, args.fps
    );
    if let Some(screen) = &project.project.sources.screen {
        println!(
            "  Screen: {} ({}x{}, {})",
            screen.path,
            screen.width,
            screen.height,
            fmt_secs(screen.duration_us as f64)
        );
    }
    if let Some(camera) = &project.project.sources.camera {
        println!("  Camera: {} ({}x{})", camera.path, camera.width, camera.height);
    }
    println!();
    println!("Directory structure:");
    println!("  {}/", args.name);
    println!("  ├── sources/     (screen and camera media)");
    println!("  ├── meta/        (project.json, analysis.json, edit.json, history.json)");
    println!("  └── exports/     (rendered output)");

    Ok(())
}

/// Build a media reference for a PNG file or a directory of PNG frames.
async fn probe_media(path: &Path, sequence_fps: f64, still_secs: f64) -> anyhow::Result<MediaRef> {
    let path = std::fs::canonicalize(path)
        .map_err(|e| anyhow::anyhow!("Cannot open media {}: {e}", path.display()))?;

    if path.is_dir() {
        let source = ImageSequenceSource::open(&path, sequence_fps).await?;
        let (width, height) = source.dimensions();
        let duration_us = secs_to_timestamp(source.frame_count() as f64 / sequence_fps)?;
        Ok(MediaRef {
            path: path.display().to_string(),
            kind: MediaKind::ImageSequence { fps: sequence_fps },
            width,
            height,
            duration_us,
        })
    } else {
        let source = StillImageSource::load(&path).await?;
        let (width, height) = source.dimensions();
        Ok(MediaRef {
            path: path.display().to_string(),
            kind: MediaKind::Still,
            width,
            height,
            duration_us: secs_to_timestamp(still_secs)?,
        })
    }
}
