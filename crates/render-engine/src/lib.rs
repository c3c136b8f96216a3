//! Reframe Render Engine
//!
//! Draws output frames from source media and an edit snapshot, for both
//! live preview and deterministic export.
//!
//! # Pipeline Architecture
//!
//! ```text
//! edit snapshot ──┐
//!                 ├── SceneSampler (time remap, viewport, effects, cursor)
//! analysis ───────┘         │
//!                           ▼
//! screen source ──── seek ──┤
//!                           ├── Compositor
//! camera source ──── seek ──┘   background → device frame → screen
//!                               → effects → cursor → camera bubble
//!                                      │
//!                         ┌────────────┴────────────┐
//!                         ▼                         ▼
//!                  PreviewRenderer            export_frames
//!                  (clock-driven)             → FrameSink
//! ```

pub mod background;
pub mod camera;
pub mod compositor;
pub mod device;
pub mod export;
pub mod layout;
pub mod media;
pub mod overlays;
pub mod paint;
pub mod preview;
pub mod screen;
pub mod seek;

#[cfg(test)]
mod testing;

pub use compositor::{Compositor, FrameInputs, Layer};
pub use export::*;
pub use layout::ContentLayout;
pub use media::{
    open_media, open_sources, FrameSink, ImageSequenceSource, MediaSource, MediaSources,
    PngSequenceSink, StillImageSource,
};
pub use preview::{PreviewFrame, PreviewRenderer};
pub use seek::{seek_with_retry, SeekOutcome, SeekPolicy};
