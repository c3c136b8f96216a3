//! Print the export frame schedule.

use std::path::PathBuf;

use serde::Serialize;

use reframe_processing_core::time_remap::{audio_policy_at, AudioPolicy, FrameTiming, TimeMap};

use super::{fmt_secs, load_project};

#[derive(Serialize)]
struct ScheduleRow {
    #[serde(flatten)]
    timing: FrameTiming,
    audio: AudioPolicy,
}

pub fn run(path: PathBuf, fps: Option<u32>, limit: Option<usize>, json: bool) -> anyhow::Result<()> {
    let project = load_project(&path)?;
    let fps = fps.unwrap_or(project.project.export.fps);
    if fps == 0 {
        anyhow::bail!("FPS must be greater than zero");
    }

    let map = TimeMap::from_edit(&project.edit);
    let schedule = map.frame_schedule(fps);
    let total = schedule.len();
    let rows: Vec<ScheduleRow> = schedule
        .into_iter()
        .take(limit.unwrap_or(usize::MAX))
        .map(|timing| ScheduleRow {
            timing,
            audio: audio_policy_at(timing.source_us, &project.edit.speed_ramps),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!(
        "{total} frames @ {fps}fps, export duration {}",
        fmt_secs(map.export_duration_us())
    );
    println!("{:>7}  {:>10}  {:>10}  {:>6}  audio", "frame", "export", "source", "rate");
    for row in &rows {
        let audio = if row.audio.muted { "muted" } else { "on" };
        println!(
            "{:>7}  {:>10}  {:>10}  {:>5.2}x  {audio}",
            row.timing.index,
            fmt_secs(row.timing.export_us),
            fmt_secs(row.timing.source_us),
            row.audio.playback_rate,
        );
    }
    if rows.len() < total {
        println!("... {} more", total - rows.len());
    }
    Ok(())
}
