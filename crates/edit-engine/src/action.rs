//! Reversible buffer edits.
//!
//! An [`Action`] is a recorded edit that can be applied to a [`Buffer`] and undone again. The
//! primitive actions are insertions and erasures; a [`CompositeAction`] groups several into one
//! undo step and doubles as the "replace" action. An empty composite is the non-modifying marker
//! that hard undo and redo step over.

use std::fmt;

use crate::buffer::Buffer;
use crate::region::{Region, clamp};

/// Insert `value` at `point`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertAction {
    point: usize,
    value: String,
    len: usize,
}

impl InsertAction {
    /// Insertion point (clamped when the action was built).
    pub fn point(&self) -> usize {
        self.point
    }

    /// Inserted text.
    pub fn value(&self) -> &str {
        &self.value
    }

    fn apply(&self, buffer: &mut Buffer) {
        buffer.insert(self.point, &self.value);
    }

    fn undo(&self, buffer: &mut Buffer) {
        buffer.erase(self.point, self.len);
    }
}

/// Erase the text covered by `region`.
///
/// The region is clipped and the removed text captured when the action is applied, not when it is
/// built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EraseAction {
    region: Region,
    removed: String,
}

impl EraseAction {
    /// The erased region (clipped to the buffer once applied).
    pub fn region(&self) -> Region {
        self.region
    }

    /// Text removed by the last application.
    pub fn removed(&self) -> &str {
        &self.removed
    }

    fn apply(&mut self, buffer: &mut Buffer) {
        self.region = self.region.clip(Region::new(0, buffer.size()));
        self.removed = buffer.substr(self.region);
        buffer.erase(self.region.begin(), self.region.size());
    }

    fn undo(&self, buffer: &mut Buffer) {
        buffer.insert(self.region.begin(), &self.removed);
    }
}

/// An ordered group of actions applied front to back and undone back to front.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompositeAction {
    actions: Vec<Action>,
}

impl CompositeAction {
    /// Create an empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an action without applying it.
    pub fn push(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Append an action and apply it immediately.
    pub fn push_applied(&mut self, mut action: Action, buffer: &mut Buffer) {
        action.apply(buffer);
        self.actions.push(action);
    }

    /// Number of grouped actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// `true` for an empty group.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// The grouped actions in application order.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    fn apply(&mut self, buffer: &mut Buffer) {
        for action in &mut self.actions {
            action.apply(buffer);
        }
    }

    fn undo(&mut self, buffer: &mut Buffer) {
        for action in self.actions.iter_mut().rev() {
            action.undo(buffer);
        }
    }
}

impl From<Vec<Action>> for CompositeAction {
    fn from(actions: Vec<Action>) -> Self {
        Self { actions }
    }
}

/// A reversible edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Text insertion.
    Insert(InsertAction),
    /// Text erasure.
    Erase(EraseAction),
    /// Ordered group of actions.
    Composite(CompositeAction),
}

impl Action {
    /// Insert `value` at `point`, clamped to `buffer`'s current size.
    pub fn insert(buffer: &Buffer, point: usize, value: impl Into<String>) -> Self {
        let value = value.into();
        Action::Insert(InsertAction {
            point: point.min(buffer.size()),
            len: value.chars().count(),
            value,
        })
    }

    /// Erase `region`.
    pub fn erase(region: Region) -> Self {
        Action::Erase(EraseAction {
            region,
            removed: String::new(),
        })
    }

    /// Replace the text in `region` with `value`.
    ///
    /// Built as an erase followed by an insert at the region start, clamped to where that start
    /// will lie once the erase has run.
    pub fn replace(buffer: &Buffer, region: Region, value: impl Into<String>) -> Self {
        let value = value.into();
        let point = clamp(
            0,
            buffer.size().saturating_sub(region.size()),
            region.begin(),
        );
        Action::composite(vec![
            Action::erase(region),
            Action::Insert(InsertAction {
                point,
                len: value.chars().count(),
                value,
            }),
        ])
    }

    /// Group `actions` into one step.
    pub fn composite(actions: Vec<Action>) -> Self {
        Action::Composite(actions.into())
    }

    /// An empty group, recorded to mark a non-modifying step in the history.
    pub fn noop() -> Self {
        Action::Composite(CompositeAction::new())
    }

    /// `false` only for an empty group.
    pub fn is_modifying(&self) -> bool {
        !matches!(self, Action::Composite(group) if group.is_empty())
    }

    /// Perform the edit.
    pub fn apply(&mut self, buffer: &mut Buffer) {
        match self {
            Action::Insert(action) => action.apply(buffer),
            Action::Erase(action) => action.apply(buffer),
            Action::Composite(action) => action.apply(buffer),
        }
    }

    /// Revert the edit. Only meaningful right after [`apply`](Self::apply) (or a redo of it).
    pub fn undo(&mut self, buffer: &mut Buffer) {
        match self {
            Action::Insert(action) => action.undo(buffer),
            Action::Erase(action) => action.undo(buffer),
            Action::Composite(action) => action.undo(buffer),
        }
    }
}

impl From<CompositeAction> for Action {
    fn from(group: CompositeAction) -> Self {
        Action::Composite(group)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Insert(action) => write!(f, "insert {} {:?}", action.point, action.value),
            Action::Erase(action) => write!(f, "erase {}", action.region),
            Action::Composite(group) => {
                write!(f, "{} actions:", group.len())?;
                for action in &group.actions {
                    write!(f, "\n\t{action}")?;
                }
                Ok(())
            }
        }
    }
}
