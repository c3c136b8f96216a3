//! Reframe CLI: create, edit, inspect, and export projects.
//!
//! Usage:
//!   reframe init <NAME>              Create a new project
//!   reframe info <PATH>              Show project information
//!   reframe schedule <PATH>          Print the export frame schedule
//!   reframe render-frame <PATH>      Render one frame to PNG
//!   reframe export <PATH>            Export a PNG frame sequence
//!   reframe trim|cut|speed-ramp      Edit the timeline
//!   reframe undo|redo <PATH>         Step through edit history

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use reframe_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "reframe",
    about = "Zoom, trim, and restyle screen recordings",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new project
    Init {
        /// Project name
        name: String,

        /// Parent directory (defaults to the configured projects directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output width (defaults to config)
        #[arg(long)]
        width: Option<u32>,

        /// Output height (defaults to config)
        #[arg(long)]
        height: Option<u32>,

        /// Output FPS (defaults to config)
        #[arg(long)]
        fps: Option<u32>,

        /// Screen media: a PNG file or a directory of PNG frames
        #[arg(long)]
        screen: Option<PathBuf>,

        /// Camera media: a PNG file or a directory of PNG frames
        #[arg(long)]
        camera: Option<PathBuf>,

        /// Frame rate of PNG frame directories
        #[arg(long, default_value = "30")]
        sequence_fps: f64,

        /// Duration given to a still image, in seconds
        #[arg(long, default_value = "10")]
        still_secs: f64,
    },

    /// Show project information
    Info {
        /// Path to the project directory
        path: PathBuf,
    },

    /// Print the export frame schedule with source times and audio policy
    Schedule {
        /// Path to the project directory
        path: PathBuf,

        /// Frame rate (defaults to the project's export FPS)
        #[arg(long)]
        fps: Option<u32>,

        /// Print at most this many frames
        #[arg(long)]
        limit: Option<usize>,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Render a single frame at an export time
    RenderFrame {
        /// Path to the project directory
        path: PathBuf,

        /// Export time in seconds
        #[arg(long, default_value = "0")]
        at: f64,

        /// Output PNG path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export the project as a PNG frame sequence
    Export {
        /// Path to the project directory
        path: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output width (defaults to the project's export settings)
        #[arg(long)]
        width: Option<u32>,

        /// Output height (defaults to the project's export settings)
        #[arg(long)]
        height: Option<u32>,

        /// Output FPS (defaults to the project's export settings)
        #[arg(long)]
        fps: Option<u32>,
    },

    /// Set the in and out points
    Trim {
        /// Path to the project directory
        path: PathBuf,

        /// In point in seconds
        start: f64,

        /// Out point in seconds
        end: f64,
    },

    /// Remove a source range from the export
    Cut {
        /// Path to the project directory
        path: PathBuf,

        /// Cut start in seconds
        start: f64,

        /// Cut end in seconds
        end: f64,
    },

    /// Play a source range at a different speed
    SpeedRamp {
        /// Path to the project directory
        path: PathBuf,

        /// Ramp start in seconds
        start: f64,

        /// Ramp end in seconds
        end: f64,

        /// Playback speed (0.25 to 4.0)
        speed: f64,
    },

    /// Undo the last edit
    Undo {
        /// Path to the project directory
        path: PathBuf,
    },

    /// Redo the last undone edit
    Redo {
        /// Path to the project directory
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load();
    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    reframe_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Init {
            name,
            output,
            width,
            height,
            fps,
            screen,
            camera,
            sequence_fps,
            still_secs,
        } => {
            commands::init::run(commands::init::InitArgs {
                name,
                output: output.unwrap_or_else(|| config.projects_dir.clone()),
                width: width.unwrap_or(config.render.width),
                height: height.unwrap_or(config.render.height),
                fps: fps.unwrap_or(config.render.fps),
                screen,
                camera,
                sequence_fps,
                still_secs,
            })
            .await
        }
        Commands::Info { path } => commands::info::run(path),
        Commands::Schedule {
            path,
            fps,
            limit,
            json,
        } => commands::schedule::run(path, fps, limit, json),
        Commands::RenderFrame { path, at, output } => {
            commands::render_frame::run(path, at, output, &config).await
        }
        Commands::Export {
            path,
            output,
            width,
            height,
            fps,
        } => commands::export::run(path, output, width, height, fps, &config).await,
        Commands::Trim { path, start, end } => commands::edit::trim(path, start, end),
        Commands::Cut { path, start, end } => commands::edit::cut(path, start, end),
        Commands::SpeedRamp {
            path,
            start,
            end,
            speed,
        } => commands::edit::speed_ramp(path, start, end, speed),
        Commands::Undo { path } => commands::edit::undo(path),
        Commands::Redo { path } => commands::edit::redo(path),
    }
}
