//! Export a project as a PNG frame sequence.

use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use reframe_common::config::AppConfig;
use reframe_render_engine::export::{export_frames, ExportJob, ExportProgress, ExportStage};
use reframe_render_engine::media::{open_sources, PngSequenceSink};
use reframe_render_engine::seek::SeekPolicy;

use super::{fmt_secs, load_project};

pub async fn run(
    path: PathBuf,
    output: Option<PathBuf>,
    width: Option<u32>,
    height: Option<u32>,
    fps: Option<u32>,
    config: &AppConfig,
) -> anyhow::Result<()> {
    println!("Exporting project at: {}", path.display());

    let project = load_project(&path)?;
    for problem in project.validate_sources() {
        println!("  ! {problem}");
    }

    let mut job = ExportJob::from_project(&project, SeekPolicy::from_defaults(&config.seek));
    job.width = width.unwrap_or(job.width);
    job.height = height.unwrap_or(job.height);
    job.fps = fps.unwrap_or(job.fps);

    let output_dir = output.unwrap_or_else(|| path.join("exports").join("frames"));
    println!("  Output: {}", output_dir.display());
    println!("  Resolution: {}x{} @ {}fps", job.width, job.height, job.fps);

    let mut sources = open_sources(&project).await?;
    let mut sink = PngSequenceSink::create(&output_dir).await?;

    let stop = Arc::new(AtomicBool::new(false));
    let stop_on_signal = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received; stopping after the current frame");
            stop_on_signal.store(true, Ordering::Relaxed);
        }
    });

    let progress_cb: Box<dyn Fn(ExportProgress) + Send> = Box::new(|p| {
        if p.stage == ExportStage::Rendering {
            print!(
                "\r  Progress: {:.1}% ({}/{} frames, ETA: {:.0}s)  ",
                p.progress * 100.0,
                p.frames_rendered,
                p.total_frames,
                p.eta_secs,
            );
            let _ = std::io::stdout().flush();
        }
    });

    let report = match export_frames(&job, &mut sources, &mut sink, Some(progress_cb), stop).await
    {
        Ok(report) => report,
        Err(e) => {
            println!("\nExport failed: {e}");
            return Err(e.into());
        }
    };

    println!();
    if report.stopped {
        println!(
            "Export stopped: {}/{} frames",
            report.frames_rendered, report.total_frames
        );
    } else {
        println!(
            "Export complete: {} frames ({}) in {}",
            report.frames_rendered,
            fmt_secs(report.export_duration_us),
            output_dir.display()
        );
    }
    if report.degraded_seeks + report.failed_seeks > 0 {
        println!(
            "  Seek problems: {} degraded, {} failed",
            report.degraded_seeks, report.failed_seeks
        );
        for warning in report.warnings.iter().take(10) {
            println!("    {warning}");
        }
    }

    let report_path = output_dir.join("report.json");
    std::fs::write(&report_path, serde_json::to_string_pretty(&report)?)?;
    println!("  Report: {}", report_path.display());
    Ok(())
}
