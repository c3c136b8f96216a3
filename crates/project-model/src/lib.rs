//! Reframe Project Model
//!
//! Defines the core data contracts for Reframe projects:
//! - **Geometry:** Normalized source coordinates, viewports, pixel rects
//! - **Tracks:** Keyframes, effects, and cursor samples from analysis
//! - **Timing:** Trim/cut ranges and speed ramps on the source timeline
//! - **Style:** Compositor configuration
//! - **Editing:** Edit state, reversible actions, and bounded undo history
//! - **Project:** Top-level metadata and on-disk persistence
//!
//! All timestamps are microseconds on the source timeline. Positions are
//! normalized to `[0.0, 1.0]` relative to the source frame.

pub mod analysis;
pub mod edit;
pub mod history;
pub mod project;
pub mod style;
pub mod timing;
pub mod track;
pub mod viewport;

pub use analysis::*;
pub use edit::*;
pub use history::*;
pub use project::*;
pub use style::*;
pub use timing::*;
pub use track::*;
pub use viewport::*;
