//! Timeline edits and history navigation.
//!
//! Every command loads the project, goes through an editing session so the
//! change lands in the undo history, and saves everything back.

use std::path::PathBuf;

use reframe_processing_core::time_remap::TimeMap;
use reframe_project_model::edit::{EditAction, EditSession};
use reframe_project_model::timing::{SpeedRamp, TimeRange};
use reframe_project_model::LoadedProject;

use super::{fmt_secs, load_project, secs_to_timestamp};

fn range(start: f64, end: f64) -> anyhow::Result<TimeRange> {
    let range = TimeRange::new(secs_to_timestamp(start)?, secs_to_timestamp(end)?);
    if !range.is_valid() {
        anyhow::bail!("Range start must be before its end");
    }
    Ok(range)
}

fn save(mut project: LoadedProject, session: &EditSession) -> anyhow::Result<()> {
    project.absorb_session(session);
    project
        .save()
        .map_err(|e| anyhow::anyhow!("Failed to save project: {e}"))?;
    let map = TimeMap::from_edit(session.state());
    println!(
        "  Export duration: {} (edit version {})",
        fmt_secs(map.export_duration_us()),
        session.state().version
    );
    Ok(())
}

fn commit(path: PathBuf, action: EditAction) -> anyhow::Result<()> {
    let project = load_project(&path)?;
    let mut session = project.session();
    let label = action.label();
    if !session.commit(action) {
        anyhow::bail!("Edit '{label}' did not apply");
    }
    println!("Applied: {label}");
    save(project, &session)
}

pub fn trim(path: PathBuf, start: f64, end: f64) -> anyhow::Result<()> {
    let after = range(start, end)?;
    let before = load_project(&path)?.edit.trim;
    commit(path, EditAction::SetTrim { before, after })
}

pub fn cut(path: PathBuf, start: f64, end: f64) -> anyhow::Result<()> {
    commit(path, EditAction::AddCut { cut: range(start, end)? })
}

pub fn speed_ramp(path: PathBuf, start: f64, end: f64, speed: f64) -> anyhow::Result<()> {
    if !speed.is_finite() || speed <= 0.0 {
        anyhow::bail!("Speed must be a positive number");
    }
    let ramp = SpeedRamp::new(range(start, end)?, speed);
    commit(path, EditAction::AddSpeedRamp { ramp })
}

pub fn undo(path: PathBuf) -> anyhow::Result<()> {
    let project = load_project(&path)?;
    let mut session = project.session();
    match session.undo() {
        Some(action) => {
            println!("Undid: {}", action.label());
            save(project, &session)
        }
        None => {
            println!("Nothing to undo");
            Ok(())
        }
    }
}

pub fn redo(path: PathBuf) -> anyhow::Result<()> {
    let project = load_project(&path)?;
    let mut session = project.session();
    match session.redo() {
        Some(action) => {
            println!("Redid: {}", action.label());
            save(project, &session)
        }
        None => {
            println!("Nothing to redo");
            Ok(())
        }
    }
}
