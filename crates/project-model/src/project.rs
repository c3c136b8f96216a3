//! Project metadata and on-disk layout.
//!
//! A project directory ties together source media, analysis output, the
//! edit state, and its undo history:
//!
//! ```text
//! <root>/
//!   sources/            screen and camera media
//!   meta/project.json   metadata, source references, export settings
//!   meta/analysis.json  analysis tracks (read-only input)
//!   meta/analysis.jsonl same tracks as a record stream, used when
//!                       analysis.json is absent
//!   meta/edit.json      edit state
//!   meta/history.json   undo history
//!   exports/            rendered output
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisTracks;
use crate::edit::{EditSession, EditState};
use crate::history::HistorySnapshot;
use crate::timing::TimestampUs;

/// Top-level project file (`project.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Schema version.
    pub version: String,

    /// Human-readable project name.
    pub name: String,

    /// Unique project identifier (UUID).
    pub id: String,

    /// Creation timestamp (ISO 8601).
    pub created_at: String,

    /// Last modified timestamp (ISO 8601).
    pub modified_at: String,

    /// Source media.
    pub sources: Sources,

    /// Output settings.
    pub export: ExportSettings,
}

/// References to source media (paths relative to project root).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sources {
    /// Screen capture.
    pub screen: Option<MediaRef>,

    /// Camera capture shown in the bubble.
    pub camera: Option<MediaRef>,
}

/// How a media reference is stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MediaKind {
    /// A single PNG shown for the whole duration.
    Still,
    /// A directory of numbered PNG frames at a fixed rate.
    ImageSequence { fps: f64 },
}

/// Reference to a media source with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRef {
    /// Relative path from project root.
    pub path: String,

    #[serde(flatten)]
    pub kind: MediaKind,

    /// Pixel dimensions.
    pub width: u32,
    pub height: u32,

    /// Duration in microseconds.
    pub duration_us: TimestampUs,
}

/// Output settings used by preview and export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl Project {
    /// Create a new project with defaults.
    pub fn new(name: impl Into<String>, width: u32, height: u32, fps: u32) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            version: "1.0".to_string(),
            name: name.into(),
            id: uuid_v4(),
            created_at: now.clone(),
            modified_at: now,
            sources: Sources::default(),
            export: ExportSettings { width, height, fps },
        }
    }

    /// Duration of the screen source, or zero when there is none.
    pub fn source_duration_us(&self) -> TimestampUs {
        self.sources
            .screen
            .as_ref()
            .map(|s| s.duration_us)
            .unwrap_or(0)
    }
}

/// The complete in-memory representation of a loaded project.
#[derive(Debug, Clone)]
pub struct LoadedProject {
    /// Filesystem path to the project directory.
    pub root: PathBuf,

    /// Project metadata.
    pub project: Project,

    /// Analysis output.
    pub analysis: AnalysisTracks,

    /// Current edit decisions.
    pub edit: EditState,

    /// Persisted undo history.
    pub history: HistorySnapshot,
}

impl LoadedProject {
    /// Load a project from a directory.
    ///
    /// Missing analysis, edit, or history files fall back to empty defaults.
    /// Analysis is read from `analysis.json`, or from an `analysis.jsonl`
    /// stream when no JSON document exists; either way tracks come back
    /// sorted by timestamp.
    pub fn load(root: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let root = root.as_ref().to_path_buf();
        let meta = root.join("meta");

        let project: Project = read_json(&meta.join("project.json"))?;
        let analysis = read_analysis(&meta)?;
        let edit = match read_optional_json(&meta.join("edit.json"))? {
            Some(edit) => edit,
            None => EditState::new(project.source_duration_us()),
        };
        let history: HistorySnapshot = read_json_or_default(&meta.join("history.json"))?;

        tracing::debug!(
            root = %root.display(),
            edit_version = edit.version,
            history_len = history.actions.len(),
            "Project loaded"
        );
        Ok(Self {
            root,
            project,
            analysis,
            edit,
            history,
        })
    }

    /// Save every metadata file to disk.
    pub fn save(&self) -> Result<(), ProjectError> {
        let meta_dir = self.root.join("meta");
        std::fs::create_dir_all(&meta_dir).map_err(|e| ProjectError::IoError {
            path: meta_dir.clone(),
            source: e,
        })?;

        write_json(&meta_dir.join("project.json"), &self.project)?;
        write_json(&meta_dir.join("analysis.json"), &self.analysis)?;
        write_json(&meta_dir.join("edit.json"), &self.edit)?;
        write_json(&meta_dir.join("history.json"), &self.history)?;
        tracing::debug!(root = %self.root.display(), "Project saved");
        Ok(())
    }

    /// Create a new project on disk with the standard directory structure.
    pub fn create(
        root: impl AsRef<Path>,
        name: impl Into<String>,
        width: u32,
        height: u32,
        fps: u32,
    ) -> Result<Self, ProjectError> {
        let root = root.as_ref().to_path_buf();

        for subdir in &["sources", "meta", "exports"] {
            std::fs::create_dir_all(root.join(subdir)).map_err(|e| ProjectError::IoError {
                path: root.join(subdir),
                source: e,
            })?;
        }

        let project = Project::new(name, width, height, fps);
        let edit = EditState::new(project.source_duration_us());
        let loaded = Self {
            root,
            project,
            analysis: AnalysisTracks::default(),
            edit,
            history: HistorySnapshot::default(),
        };
        loaded.save()?;
        Ok(loaded)
    }

    /// Start an editing session over the loaded state.
    pub fn session(&self) -> EditSession {
        EditSession::restore(self.edit.clone(), self.history.clone())
    }

    /// Store a session's state and history back into the project.
    pub fn absorb_session(&mut self, session: &EditSession) {
        self.edit = session.state().clone();
        self.history = session.history().snapshot();
        self.project.modified_at = chrono::Utc::now().to_rfc3339();
    }

    /// Absolute path of a project-relative media reference.
    pub fn media_path(&self, media: &MediaRef) -> PathBuf {
        self.root.join(&media.path)
    }

    /// Validate that all referenced source files exist.
    pub fn validate_sources(&self) -> Vec<String> {
        let mut errors = vec![];

        let check = |media: &Option<MediaRef>, label: &str, errors: &mut Vec<String>| {
            if let Some(m) = media {
                if !self.media_path(m).exists() {
                    errors.push(format!("{label} source missing: {}", m.path));
                }
            }
        };

        check(&self.project.sources.screen, "Screen", &mut errors);
        check(&self.project.sources.camera, "Camera", &mut errors);

        if self.project.sources.screen.is_none() {
            errors.push("Project has no screen source".to_string());
        }

        errors
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ProjectError> {
    let content = std::fs::read_to_string(path).map_err(|e| ProjectError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&content).map_err(|e| ProjectError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

fn read_optional_json<T: serde::de::DeserializeOwned>(
    path: &Path,
) -> Result<Option<T>, ProjectError> {
    if path.exists() {
        read_json(path).map(Some)
    } else {
        Ok(None)
    }
}

fn read_analysis(meta: &Path) -> Result<AnalysisTracks, ProjectError> {
    if let Some(mut tracks) = read_optional_json::<AnalysisTracks>(&meta.join("analysis.json"))? {
        tracks.normalize();
        return Ok(tracks);
    }

    let stream = meta.join("analysis.jsonl");
    if !stream.exists() {
        return Ok(AnalysisTracks::default());
    }
    let content = std::fs::read_to_string(&stream).map_err(|e| ProjectError::IoError {
        path: stream.clone(),
        source: e,
    })?;
    AnalysisTracks::from_jsonl(&content).map_err(|e| ProjectError::ParseError {
        path: stream,
        source: e,
    })
}

fn read_json_or_default<T: serde::de::DeserializeOwned + Default>(
    path: &Path,
) -> Result<T, ProjectError> {
    Ok(read_optional_json(path)?.unwrap_or_default())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ProjectError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| ProjectError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    std::fs::write(path, json).map_err(|e| ProjectError::IoError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Errors that can occur when working with projects.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid project: {message}")]
    ValidationError { message: String },
}

/// Generate a simple UUID v4 from the system clock.
fn uuid_v4() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!(
        "{:08x}-{:04x}-4{:03x}-{:04x}-{:012x}",
        (seed & 0xFFFFFFFF) as u32,
        ((seed >> 32) & 0xFFFF) as u16,
        ((seed >> 48) & 0x0FFF) as u16,
        (((seed >> 60) & 0x3F) | 0x80) as u16,
        (seed >> 76) & 0xFFFFFFFFFFFF,
    )
}
