//! In-memory media for tests.

use std::time::Duration;

use tiny_skia::{Color, Pixmap, PixmapRef};

use reframe_common::{ReframeError, ReframeResult};

use crate::media::{FrameSink, MediaSource};

/// A source whose frame color encodes the last settled seek target.
///
/// The first `failures` seeks fail; each seek can be made to take `delay`.
pub struct ScriptedSource {
    pub width: u32,
    pub height: u32,
    pub failures: u32,
    pub delay: Duration,
    pub seeks: Vec<f64>,
    frame: Option<Pixmap>,
    position_us: Option<f64>,
}

impl ScriptedSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            failures: 0,
            delay: Duration::ZERO,
            seeks: Vec::new(),
            frame: None,
            position_us: None,
        }
    }

    pub fn failing(mut self, failures: u32) -> Self {
        self.failures = failures;
        self
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait::async_trait]
impl MediaSource for ScriptedSource {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn position_us(&self) -> Option<f64> {
        self.position_us
    }

    async fn seek(&mut self, t_us: f64) -> ReframeResult<()> {
        self.seeks.push(t_us);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.failures > 0 {
            self.failures -= 1;
            return Err(ReframeError::seek(t_us, "scripted failure"));
        }
        let mut frame = Pixmap::new(self.width, self.height)
            .ok_or_else(|| ReframeError::media("bad test frame size"))?;
        let shade = ((t_us / 1_000_000.0) as u64 % 256) as u8;
        frame.fill(Color::from_rgba8(shade, 0, 0, 255));
        self.frame = Some(frame);
        self.position_us = Some(t_us);
        Ok(())
    }

    fn current_frame(&self) -> Option<PixmapRef<'_>> {
        self.frame.as_ref().map(|f| f.as_ref())
    }
}

/// Collects frames in memory.
#[derive(Default)]
pub struct MemorySink {
    pub frames: Vec<(u64, Pixmap)>,
    pub finished: bool,
}

#[async_trait::async_trait]
impl FrameSink for MemorySink {
    async fn write_frame(&mut self, index: u64, frame: &Pixmap) -> ReframeResult<()> {
        self.frames.push((index, frame.clone()));
        Ok(())
    }

    async fn finish(&mut self) -> ReframeResult<()> {
        self.finished = true;
        Ok(())
    }
}
