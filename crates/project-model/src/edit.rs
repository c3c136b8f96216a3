//! Edit state, reversible edit actions, and the editing session.
//!
//! The session is the only writer of [`EditState`]. Renderers receive an
//! `Arc<EditState>` snapshot per frame and never observe a half-applied edit.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::history::{HistorySnapshot, UndoManager, DEFAULT_HISTORY_CAPACITY};
use crate::style::CompositorConfig;
use crate::timing::{SpeedRamp, TimeRange, TimestampUs};
use crate::track::Keyframe;

/// All user-editable decisions for one recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditState {
    /// Incremented on every change.
    #[serde(default)]
    pub version: u64,

    /// In/out points on the source timeline.
    pub trim: TimeRange,

    /// Source ranges removed from the export.
    #[serde(default)]
    pub cuts: Vec<TimeRange>,

    #[serde(default)]
    pub speed_ramps: Vec<SpeedRamp>,

    /// User-authored keyframes, sorted by timestamp.
    #[serde(default)]
    pub manual_keyframes: Vec<Keyframe>,

    #[serde(default)]
    pub style: CompositorConfig,
}

/// A committed edit with enough data to reverse it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum EditAction {
    AddKeyframe { keyframe: Keyframe },
    UpdateKeyframe { before: Keyframe, after: Keyframe },
    DeleteKeyframe { keyframe: Keyframe },
    SetTrim { before: TimeRange, after: TimeRange },
    AddCut { cut: TimeRange },
    RemoveCut { cut: TimeRange },
    AddSpeedRamp { ramp: SpeedRamp },
    UpdateSpeedRamp { before: SpeedRamp, after: SpeedRamp },
    RemoveSpeedRamp { ramp: SpeedRamp },
}

impl EditAction {
    /// The action that undoes this one.
    pub fn inverse(&self) -> EditAction {
        match self {
            EditAction::AddKeyframe { keyframe } => EditAction::DeleteKeyframe {
                keyframe: keyframe.clone(),
            },
            EditAction::UpdateKeyframe { before, after } => EditAction::UpdateKeyframe {
                before: after.clone(),
                after: before.clone(),
            },
            EditAction::DeleteKeyframe { keyframe } => EditAction::AddKeyframe {
                keyframe: keyframe.clone(),
            },
            EditAction::SetTrim { before, after } => EditAction::SetTrim {
                before: *after,
                after: *before,
            },
            EditAction::AddCut { cut } => EditAction::RemoveCut { cut: *cut },
            EditAction::RemoveCut { cut } => EditAction::AddCut { cut: *cut },
            EditAction::AddSpeedRamp { ramp } => EditAction::RemoveSpeedRamp { ramp: *ramp },
            EditAction::UpdateSpeedRamp { before, after } => EditAction::UpdateSpeedRamp {
                before: *after,
                after: *before,
            },
            EditAction::RemoveSpeedRamp { ramp } => EditAction::AddSpeedRamp { ramp: *ramp },
        }
    }

    /// Short label for UI menus and logs.
    pub fn label(&self) -> &'static str {
        match self {
            EditAction::AddKeyframe { .. } => "Add keyframe",
            EditAction::UpdateKeyframe { .. } => "Move keyframe",
            EditAction::DeleteKeyframe { .. } => "Delete keyframe",
            EditAction::SetTrim { .. } => "Trim",
            EditAction::AddCut { .. } => "Cut",
            EditAction::RemoveCut { .. } => "Remove cut",
            EditAction::AddSpeedRamp { .. } => "Add speed ramp",
            EditAction::UpdateSpeedRamp { .. } => "Change speed",
            EditAction::RemoveSpeedRamp { .. } => "Remove speed ramp",
        }
    }
}

impl EditState {
    /// Fresh state trimmed to the whole source.
    pub fn new(source_duration_us: TimestampUs) -> Self {
        Self {
            version: 0,
            trim: TimeRange::new(0, source_duration_us),
            cuts: Vec::new(),
            speed_ramps: Vec::new(),
            manual_keyframes: Vec::new(),
            style: CompositorConfig::default(),
        }
    }

    /// Apply an action. Returns `false` when its target no longer exists
    /// (for example, deleting a keyframe that was already removed); the
    /// state is left untouched in that case.
    pub fn apply(&mut self, action: &EditAction) -> bool {
        let changed = match action {
            EditAction::AddKeyframe { keyframe } => {
                self.manual_keyframes.push(keyframe.clone());
                self.manual_keyframes.sort_by_key(|k| k.timestamp_us);
                true
            }
            EditAction::UpdateKeyframe { before, after } => {
                match self.manual_keyframes.iter_mut().find(|k| k.id == before.id) {
                    Some(slot) => {
                        *slot = after.clone();
                        self.manual_keyframes.sort_by_key(|k| k.timestamp_us);
                        true
                    }
                    None => false,
                }
            }
            EditAction::DeleteKeyframe { keyframe } => {
                remove_first(&mut self.manual_keyframes, |k| k.id == keyframe.id)
            }
            EditAction::SetTrim { after, .. } => {
                self.trim = *after;
                true
            }
            EditAction::AddCut { cut } => {
                self.cuts.push(*cut);
                true
            }
            EditAction::RemoveCut { cut } => remove_first(&mut self.cuts, |c| c == cut),
            EditAction::AddSpeedRamp { ramp } => {
                self.speed_ramps.push(*ramp);
                true
            }
            EditAction::UpdateSpeedRamp { before, after } => {
                match self.speed_ramps.iter_mut().find(|r| **r == *before) {
                    Some(slot) => {
                        *slot = *after;
                        true
                    }
                    None => false,
                }
            }
            EditAction::RemoveSpeedRamp { ramp } => {
                remove_first(&mut self.speed_ramps, |r| r == ramp)
            }
        };

        if changed {
            self.version += 1;
        }
        changed
    }

    /// Revert a previously applied action.
    pub fn revert(&mut self, action: &EditAction) -> bool {
        self.apply(&action.inverse())
    }

    /// Replace the styling (not recorded in history).
    pub fn set_style(&mut self, style: CompositorConfig) {
        self.style = style;
        self.version += 1;
    }
}

fn remove_first<T>(items: &mut Vec<T>, pred: impl Fn(&T) -> bool) -> bool {
    match items.iter().position(pred) {
        Some(index) => {
            items.remove(index);
            true
        }
        None => false,
    }
}

/// The single writer of edit state, paired with its undo history.
#[derive(Debug, Clone)]
pub struct EditSession {
    state: Arc<EditState>,
    history: UndoManager,
}

impl EditSession {
    /// Start a session with an empty history.
    pub fn new(state: EditState) -> Self {
        Self::with_history(state, UndoManager::new(DEFAULT_HISTORY_CAPACITY))
    }

    /// Resume a session with restored history.
    pub fn with_history(state: EditState, history: UndoManager) -> Self {
        Self {
            state: Arc::new(state),
            history,
        }
    }

    /// Resume from persisted data.
    pub fn restore(state: EditState, snapshot: HistorySnapshot) -> Self {
        Self::with_history(
            state,
            UndoManager::restore(snapshot, DEFAULT_HISTORY_CAPACITY),
        )
    }

    /// Immutable view of the current state for one render pass.
    pub fn snapshot(&self) -> Arc<EditState> {
        Arc::clone(&self.state)
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn history(&self) -> &UndoManager {
        &self.history
    }

    /// Apply and record an action. Actions that change nothing are not
    /// recorded.
    pub fn commit(&mut self, action: EditAction) -> bool {
        let applied = Arc::make_mut(&mut self.state).apply(&action);
        if applied {
            self.history.push(action);
        }
        applied
    }

    /// Revert the most recent action.
    ///
    /// The history cursor moves even when the action no longer matches the
    /// state (a history restored against a different edit file); that case
    /// is logged and the state is left as is.
    pub fn undo(&mut self) -> Option<EditAction> {
        let action = self.history.undo()?.clone();
        if !Arc::make_mut(&mut self.state).revert(&action) {
            tracing::warn!(action = action.label(), "Undo target not found; state unchanged");
        }
        Some(action)
    }

    /// Re-apply the most recently undone action.
    pub fn redo(&mut self) -> Option<EditAction> {
        let action = self.history.redo()?.clone();
        if !Arc::make_mut(&mut self.state).apply(&action) {
            tracing::warn!(action = action.label(), "Redo target not found; state unchanged");
        }
        Some(action)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Replace the styling without recording history.
    pub fn set_style(&mut self, style: CompositorConfig) {
        Arc::make_mut(&mut self.state).set_style(style);
    }
}
