use crate::model::config::DEFAULT_HISTORY_LIMIT;
use crate::model::task::{Task, TaskId};

/// A deep copy of the session state taken before a mutation.
///
/// Owns its forest outright; later edits to the live tree never reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    tasks: Vec<Task>,
    cursor: Option<TaskId>,
    previous: Option<TaskId>,
}

impl Snapshot {
    pub fn capture(tasks: &[Task], cursor: Option<&TaskId>, previous: Option<&TaskId>) -> Self {
        Snapshot {
            tasks: tasks.to_vec(),
            cursor: cursor.cloned(),
            previous: previous.cloned(),
        }
    }

    pub fn into_parts(self) -> (Vec<Task>, Option<TaskId>, Option<TaskId>) {
        (self.tasks, self.cursor, self.previous)
    }
}

/// Linear undo/redo history of whole-session snapshots, each stack capped
/// at `limit` entries (oldest evicted first).
#[derive(Debug, Clone)]
pub struct History {
    undo: Vec<Snapshot>,
    redo: Vec<Snapshot>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    pub fn new(limit: usize) -> Self {
        History {
            undo: Vec::new(),
            redo: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Record the state as it was before a mutation. Clears the redo stack.
    pub fn record(&mut self, before: Snapshot) {
        push_capped(&mut self.undo, before, self.limit);
        self.redo.clear();
    }

    /// Step back one entry. `current` is the live state, which moves onto
    /// the redo stack. Returns the state to restore, or `None` (and leaves
    /// both stacks untouched) when there is nothing to undo.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let restored = self.undo.pop()?;
        push_capped(&mut self.redo, current, self.limit);
        Some(restored)
    }

    /// Mirror of [`History::undo`].
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let restored = self.redo.pop()?;
        push_capped(&mut self.undo, current, self.limit);
        Some(restored)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }
}

fn push_capped(stack: &mut Vec<Snapshot>, snapshot: Snapshot, limit: usize) {
    stack.push(snapshot);
    if stack.len() > limit {
        stack.drain(..stack.len() - limit);
    }
}
