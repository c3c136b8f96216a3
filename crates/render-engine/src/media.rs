//! Media source and frame sink contracts, with PNG-backed implementations.
//!
//! A [`MediaSource`] is seeked to a source time and then exposes whatever
//! frame it currently holds. A failed seek leaves the previous frame in
//! place, which is what lets the export loop degrade instead of abort.

use std::path::{Path, PathBuf};

use tiny_skia::{Pixmap, PixmapRef};

use reframe_common::clock::MICROS_PER_SEC;
use reframe_common::{ReframeError, ReframeResult};
use reframe_project_model::project::{LoadedProject, MediaKind, MediaRef};

/// A seekable source of video frames.
#[async_trait::async_trait]
pub trait MediaSource: Send + Sync {
    /// Frame size in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Source time of the frame currently held, if any seek has settled.
    fn position_us(&self) -> Option<f64>;

    /// Move to `t_us`. On error the previously held frame is kept.
    async fn seek(&mut self, t_us: f64) -> ReframeResult<()>;

    /// The frame currently held.
    fn current_frame(&self) -> Option<PixmapRef<'_>>;
}

/// Receives rendered frames in order.
#[async_trait::async_trait]
pub trait FrameSink: Send {
    async fn write_frame(&mut self, index: u64, frame: &Pixmap) -> ReframeResult<()>;

    /// Called once after the last frame.
    async fn finish(&mut self) -> ReframeResult<()>;
}

/// Screen and optional camera source for one project.
pub struct MediaSources {
    pub screen: Box<dyn MediaSource>,
    pub camera: Option<Box<dyn MediaSource>>,
}

async fn read_png(path: &Path) -> ReframeResult<Pixmap> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ReframeError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ReframeError::Io(e)
        }
    })?;
    Pixmap::decode_png(&bytes)
        .map_err(|e| ReframeError::media(format!("Failed to decode {}: {e}", path.display())))
}

/// A single image shown at every time.
pub struct StillImageSource {
    frame: Pixmap,
    position_us: Option<f64>,
}

impl StillImageSource {
    pub fn new(frame: Pixmap) -> Self {
        Self {
            frame,
            position_us: None,
        }
    }

    pub async fn load(path: impl AsRef<Path>) -> ReframeResult<Self> {
        Ok(Self::new(read_png(path.as_ref()).await?))
    }
}

#[async_trait::async_trait]
impl MediaSource for StillImageSource {
    fn dimensions(&self) -> (u32, u32) {
        (self.frame.width(), self.frame.height())
    }

    fn position_us(&self) -> Option<f64> {
        self.position_us
    }

    async fn seek(&mut self, t_us: f64) -> ReframeResult<()> {
        if !t_us.is_finite() {
            return Err(ReframeError::seek(t_us, "Non-finite seek target"));
        }
        self.position_us = Some(t_us);
        Ok(())
    }

    fn current_frame(&self) -> Option<PixmapRef<'_>> {
        Some(self.frame.as_ref())
    }
}

/// A directory of PNG frames played back at a fixed rate.
///
/// Frames are ordered by file name. Seeking to `t` selects frame
/// `floor(t * fps)`, clamped to the available frames.
pub struct ImageSequenceSource {
    frames: Vec<PathBuf>,
    fps: f64,
    dimensions: (u32, u32),
    current: Option<(usize, Pixmap)>,
    position_us: Option<f64>,
}

impl ImageSequenceSource {
    pub async fn open(dir: impl AsRef<Path>, fps: f64) -> ReframeResult<Self> {
        let dir = dir.as_ref();
        if !fps.is_finite() || fps <= 0.0 {
            return Err(ReframeError::media(format!("Invalid sequence fps {fps}")));
        }

        let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ReframeError::FileNotFound {
                    path: dir.to_path_buf(),
                }
            } else {
                ReframeError::Io(e)
            }
        })?;
        let mut frames = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("png")) {
                frames.push(path);
            }
        }
        frames.sort();

        let Some(first) = frames.first() else {
            return Err(ReframeError::media(format!(
                "No PNG frames in {}",
                dir.display()
            )));
        };
        let first_frame = read_png(first).await?;
        let dimensions = (first_frame.width(), first_frame.height());
        tracing::debug!(dir = %dir.display(), frames = frames.len(), fps, "Opened image sequence");

        Ok(Self {
            frames,
            fps,
            dimensions,
            current: Some((0, first_frame)),
            position_us: None,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Frame index shown at `t_us`.
    pub fn frame_index_at(&self, t_us: f64) -> usize {
        let raw = (t_us.max(0.0) * self.fps / MICROS_PER_SEC).floor();
        (raw as usize).min(self.frames.len().saturating_sub(1))
    }
}

#[async_trait::async_trait]
impl MediaSource for ImageSequenceSource {
    fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    fn position_us(&self) -> Option<f64> {
        self.position_us
    }

    async fn seek(&mut self, t_us: f64) -> ReframeResult<()> {
        if !t_us.is_finite() {
            return Err(ReframeError::seek(t_us, "Non-finite seek target"));
        }
        let index = self.frame_index_at(t_us);
        let loaded = matches!(&self.current, Some((i, _)) if *i == index);
        if !loaded {
            let frame = read_png(&self.frames[index])
                .await
                .map_err(|e| ReframeError::seek(t_us, e.to_string()))?;
            self.current = Some((index, frame));
        }
        self.position_us = Some(t_us);
        Ok(())
    }

    fn current_frame(&self) -> Option<PixmapRef<'_>> {
        self.current.as_ref().map(|(_, frame)| frame.as_ref())
    }
}

/// Open a project media reference.
pub async fn open_media(root: &Path, media: &MediaRef) -> ReframeResult<Box<dyn MediaSource>> {
    let path = root.join(&media.path);
    match media.kind {
        MediaKind::Still => Ok(Box::new(StillImageSource::load(&path).await?)),
        MediaKind::ImageSequence { fps } => {
            Ok(Box::new(ImageSequenceSource::open(&path, fps).await?))
        }
    }
}

/// Open the screen and camera sources of a project.
pub async fn open_sources(project: &LoadedProject) -> ReframeResult<MediaSources> {
    let sources = &project.project.sources;
    let screen = sources
        .screen
        .as_ref()
        .ok_or_else(|| ReframeError::project("Project has no screen source"))?;
    let screen = open_media(&project.root, screen).await?;
    let camera = match &sources.camera {
        Some(camera) => Some(open_media(&project.root, camera).await?),
        None => None,
    };
    Ok(MediaSources { screen, camera })
}

/// Writes frames as `frame_000000.png`, `frame_000001.png`, ...
pub struct PngSequenceSink {
    dir: PathBuf,
    written: u64,
}

impl PngSequenceSink {
    pub async fn create(dir: impl AsRef<Path>) -> ReframeResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir, written: 0 })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn frames_written(&self) -> u64 {
        self.written
    }

    pub fn frame_path(&self, index: u64) -> PathBuf {
        self.dir.join(format!("frame_{index:06}.png"))
    }
}

#[async_trait::async_trait]
impl FrameSink for PngSequenceSink {
    async fn write_frame(&mut self, index: u64, frame: &Pixmap) -> ReframeResult<()> {
        let bytes = frame
            .encode_png()
            .map_err(|e| ReframeError::render(format!("PNG encode failed: {e}")))?;
        tokio::fs::write(self.frame_path(index), bytes).await?;
        self.written += 1;
        Ok(())
    }

    async fn finish(&mut self) -> ReframeResult<()> {
        tracing::info!(dir = %self.dir.display(), frames = self.written, "PNG sequence written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiny_skia::Color;

    fn solid(value: u8) -> Pixmap {
        let mut p = Pixmap::new(4, 2).unwrap();
        p.fill(Color::from_rgba8(value, value, value, 255));
        p
    }

    async fn write_sequence(dir: &Path, count: u8) {
        let _ = tokio::fs::remove_dir_all(dir).await;
        let mut sink = PngSequenceSink::create(dir).await.unwrap();
        for i in 0..count {
            sink.write_frame(i as u64, &solid(i * 10)).await.unwrap();
        }
        sink.finish().await.unwrap();
    }

    #[tokio::test]
    async fn test_still_source_always_has_frame() {
        let mut source = StillImageSource::new(solid(7));
        assert_eq!(source.dimensions(), (4, 2));
        assert!(source.position_us().is_none());
        source.seek(1_000.0).await.unwrap();
        assert_eq!(source.position_us(), Some(1_000.0));
        assert!(source.seek(f64::NAN).await.is_err());
        assert_eq!(source.current_frame().unwrap().pixel(0, 0).unwrap().red(), 7);
    }

    #[tokio::test]
    async fn test_sequence_seek_selects_floor_frame() {
        let dir = std::env::temp_dir().join("reframe_test_sequence_seek");
        write_sequence(&dir, 5).await;

        let mut source = ImageSequenceSource::open(&dir, 10.0).await.unwrap();
        assert_eq!(source.frame_count(), 5);
        assert_eq!(source.dimensions(), (4, 2));

        source.seek(250_000.0).await.unwrap();
        assert_eq!(source.current_frame().unwrap().pixel(0, 0).unwrap().red(), 20);

        // Past the end holds the last frame.
        source.seek(9_000_000.0).await.unwrap();
        assert_eq!(source.current_frame().unwrap().pixel(0, 0).unwrap().red(), 40);

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn test_missing_sequence_is_file_not_found() {
        let dir = std::env::temp_dir().join("reframe_test_sequence_missing");
        let _ = tokio::fs::remove_dir_all(&dir).await;
        let err = ImageSequenceSource::open(&dir, 30.0).await.err().unwrap();
        assert!(matches!(err, ReframeError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn test_sink_names_frames() {
        let dir = std::env::temp_dir().join("reframe_test_sink_names");
        write_sequence(&dir, 2).await;
        assert!(dir.join("frame_000000.png").exists());
        assert!(dir.join("frame_000001.png").exists());
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
