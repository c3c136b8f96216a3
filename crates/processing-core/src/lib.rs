//! Reframe Processing Core
//!
//! The pure per-frame math of the editor pipeline:
//! - **Transform:** Viewport to crop rect, normalized points to canvas
//! - **Keyframes:** Auto/manual merge and viewport interpolation
//! - **Effects:** Half-open activation and click-ring animation
//! - **Cursor:** Position interpolation and visibility
//! - **Time Remap:** Export ↔ source time under trim, cuts, and speed ramps
//! - **Scene:** All of the above sampled together for one output frame
//!
//! This crate is pure computation: no I/O and no errors. Invalid input
//! resolves to safe defaults.

pub mod cursor;
pub mod effects;
pub mod keyframes;
pub mod scene;
pub mod time_remap;
pub mod transform;

pub use cursor::{cursor_opacity, interpolate_cursor, CursorSample};
pub use effects::{active_effects, click_rings, ClickRing};
pub use keyframes::{interpolate_viewport, merge_keyframes, ViewportTrack};
pub use scene::{SceneSample, SceneSampler};
pub use time_remap::{
    audio_policy_at, export_duration, is_in_cut, speed_at, to_export_time, to_source_time,
    AudioPolicy, FrameTiming, TimeMap,
};
pub use transform::{sanitize_viewport, source_rect, to_canvas_point, to_canvas_point_in};
