//! Linear undo/redo history.
//!
//! [`UndoStack`] stores committed [`Action`]s in order together with a cursor (`position`): entries
//! before it are applied, entries from it onwards form the redo tail. Adding a new action discards
//! the redo tail, so the history never branches.
//!
//! Two granularities are supported. *Soft* undo/redo moves over exactly one entry. *Hard*
//! undo/redo skips non-modifying entries (see [`Action::is_modifying`]) and stops at the nearest
//! entry that actually changed the text.
//!
//! Several entries can be collapsed into one with [`UndoStack::glue_from`], which is how commands
//! made of many small edits become a single undo step.

use crate::action::Action;
use crate::buffer::Buffer;

/// Edit history with a movable cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoStack {
    actions: Vec<Action>,
    position: usize,
    mark: usize,
    /// Position at which the history matches the last saved state.
    clean_index: Option<usize>,
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoStack {
    /// Create an empty, clean history.
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
            position: 0,
            mark: 0,
            clean_index: Some(0),
        }
    }

    /// Record `action`, which the caller has already applied.
    ///
    /// The redo tail is discarded first. With `increment == false` the entry is stored past the
    /// cursor: it can be redone, but the next `add` discards it like any other redo entry.
    pub fn add(&mut self, action: Action, increment: bool) {
        self.truncate_redo();
        self.actions.push(action);
        if increment {
            self.position += 1;
        }
    }

    fn truncate_redo(&mut self) {
        if self.position == self.actions.len() {
            return;
        }
        if let Some(clean) = self.clean_index
            && clean > self.position
        {
            self.clean_index = None;
        }
        tracing::trace!(
            discarded = self.actions.len() - self.position,
            "discarding redo history"
        );
        self.actions.truncate(self.position);
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Number of entries currently applied.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Every recorded entry, oldest first.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// `true` if an entry can be undone.
    pub fn can_undo(&self) -> bool {
        self.position > 0
    }

    /// `true` if an entry can be redone.
    pub fn can_redo(&self) -> bool {
        self.position < self.actions.len()
    }

    /// Remember the current position as the start of a future glue.
    pub fn set_mark(&mut self) {
        self.mark = self.position;
    }

    /// The position recorded by [`set_mark`](Self::set_mark).
    pub fn mark(&self) -> usize {
        self.mark
    }

    /// Record the current position as matching the saved state.
    pub fn mark_clean(&mut self) {
        self.clean_index = Some(self.position);
    }

    /// `true` when the history sits at the saved state.
    pub fn is_clean(&self) -> bool {
        self.clean_index == Some(self.position)
    }

    /// Locate an entry relative to the cursor.
    ///
    /// For `relative <= 0` the walk goes backward from `position - 1` and yields the index of the
    /// `(|relative| + 1)`-th counted entry. For `relative >= 1` it goes forward from `position`
    /// and yields the index just past the `relative`-th counted entry. With `modifying_only`,
    /// non-modifying entries are not counted. Returns `None` when the walk runs off either end.
    pub fn index(&self, relative: isize, modifying_only: bool) -> Option<usize> {
        let counted = |i: &usize| !modifying_only || self.actions[*i].is_modifying();
        if relative <= 0 {
            (0..self.position)
                .rev()
                .filter(counted)
                .nth(relative.unsigned_abs())
        } else {
            (self.position..self.actions.len())
                .filter(counted)
                .nth(relative.unsigned_abs() - 1)
                .map(|i| i + 1)
                .filter(|&past| past < self.actions.len())
        }
    }

    /// Undo back to the previous entry (`hard == false`) or the previous modifying entry.
    pub fn undo(&mut self, buffer: &mut Buffer, hard: bool) {
        let target = self.index(0, hard).unwrap_or(0);
        while self.position > target {
            self.position -= 1;
            tracing::debug!(position = self.position, action = %self.actions[self.position], "undo");
            self.actions[self.position].undo(buffer);
        }
    }

    /// Redo the next entry (`hard == false`) or up to and including the next modifying entry.
    pub fn redo(&mut self, buffer: &mut Buffer, hard: bool) {
        let target = self.index(1, hard).unwrap_or(self.actions.len());
        while self.position < target {
            tracing::debug!(position = self.position, action = %self.actions[self.position], "redo");
            self.actions[self.position].apply(buffer);
            self.position += 1;
        }
    }

    /// Collapse the entries in `mark..position` into a single composite entry.
    ///
    /// The redo tail is discarded and the cursor ends up just past the new entry. A `mark` at or
    /// past the cursor leaves the history untouched.
    pub fn glue_from(&mut self, mark: usize) {
        if mark >= self.position {
            tracing::debug!(mark, position = self.position, "nothing to glue");
            return;
        }

        let position = self.position;
        self.clean_index = match self.clean_index {
            Some(clean) if clean == position => Some(mark + 1),
            Some(clean) if clean > mark => None,
            other => other,
        };

        self.actions.truncate(position);
        let glued: Vec<Action> = self.actions.drain(mark..).collect();
        tracing::trace!(mark, count = glued.len(), "glued history entries");
        self.actions.push(Action::composite(glued));
        self.position = mark + 1;
    }

    /// [`glue_from`](Self::glue_from) the position recorded by [`set_mark`](Self::set_mark).
    pub fn glue_from_mark(&mut self) {
        self.glue_from(self.mark);
    }
}
