pub mod edit;
pub mod export;
pub mod info;
pub mod init;
pub mod render_frame;
pub mod schedule;

use std::path::Path;

use reframe_project_model::timing::TimestampUs;
use reframe_project_model::LoadedProject;

pub(crate) fn load_project(path: &Path) -> anyhow::Result<LoadedProject> {
    LoadedProject::load(path).map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))
}

/// Seconds from the command line to a microsecond timestamp.
pub(crate) fn secs_to_timestamp(secs: f64) -> anyhow::Result<TimestampUs> {
    if !secs.is_finite() || secs < 0.0 {
        anyhow::bail!("Invalid time {secs}s: must be a non-negative number");
    }
    Ok(reframe_common::clock::secs_to_us(secs).round() as TimestampUs)
}

pub(crate) fn fmt_secs(us: f64) -> String {
    format!("{:.3}s", reframe_common::clock::us_to_secs(us))
}
