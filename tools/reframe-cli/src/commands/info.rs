//! Show project information.

use std::path::PathBuf;

use reframe_processing_core::time_remap::TimeMap;
use reframe_project_model::project::MediaRef;

use super::{fmt_secs, load_project};

fn describe(media: &MediaRef) -> String {
    format!(
        "{} ({}x{}, {}, {:?})",
        media.path,
        media.width,
        media.height,
        fmt_secs(media.duration_us as f64),
        media.kind
    )
}

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let project = load_project(&path)?;
    let p = &project.project;

    println!("Project: {}", p.name);
    println!("  ID: {}", p.id);
    println!("  Created: {}", p.created_at);
    println!("  Modified: {}", p.modified_at);
    println!();

    println!("Sources:");
    match &p.sources.screen {
        Some(screen) => println!("  Screen: {}", describe(screen)),
        None => println!("  Screen: (none)"),
    }
    if let Some(camera) = &p.sources.camera {
        println!("  Camera: {}", describe(camera));
    }
    for problem in project.validate_sources() {
        println!("  ! {problem}");
    }
    println!();

    let edit = &project.edit;
    let map = TimeMap::from_edit(edit);
    println!("Timeline (edit version {}):", edit.version);
    println!(
        "  Trim: {} → {}",
        fmt_secs(edit.trim.start_us as f64),
        fmt_secs(edit.trim.end_us as f64)
    );
    println!("  Cuts: {}", edit.cuts.len());
    for cut in &edit.cuts {
        println!(
            "    [{}, {})",
            fmt_secs(cut.start_us as f64),
            fmt_secs(cut.end_us as f64)
        );
    }
    println!("  Speed ramps: {}", edit.speed_ramps.len());
    for ramp in &edit.speed_ramps {
        println!(
            "    [{}, {}) x{}",
            fmt_secs(ramp.range.start_us as f64),
            fmt_secs(ramp.range.end_us as f64),
            ramp.speed
        );
    }
    println!("  Segments: {}", map.segments().len());
    println!("  Export duration: {}", fmt_secs(map.export_duration_us()));
    println!();

    let analysis = &project.analysis;
    println!("Analysis:");
    println!("  Cursor samples: {}", analysis.cursor.len());
    println!("  Auto keyframes: {}", analysis.auto_keyframes.len());
    println!("  Manual keyframes: {}", edit.manual_keyframes.len());
    println!("  Effects: {}", analysis.effects.len());
    println!();

    let session = project.session();
    println!("History:");
    println!("  Entries: {}", session.history().len());
    println!("  Can undo: {}", session.can_undo());
    println!("  Can redo: {}", session.can_redo());
    println!();

    println!("Export settings:");
    println!(
        "  Output: {}x{} @ {}fps",
        p.export.width, p.export.height, p.export.fps
    );
    println!("  Device frame: {:?}", edit.style.device_frame);

    Ok(())
}
