use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable task identifier. Assigned once when a task is created and carried
/// unchanged through moves, edits, undo and redo.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// A fresh random identifier (UUID v4)
    pub fn generate() -> Self {
        TaskId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        TaskId(s.to_string())
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        TaskId(s)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Task status, ordered `Todo < Active < Done`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Todo,
    Active,
    Done,
}

impl TaskStatus {
    /// Todo → Active → Done, saturating at Done
    pub fn forward(self) -> TaskStatus {
        match self {
            TaskStatus::Todo => TaskStatus::Active,
            TaskStatus::Active | TaskStatus::Done => TaskStatus::Done,
        }
    }

    /// Done → Active → Todo, saturating at Todo
    pub fn backward(self) -> TaskStatus {
        match self {
            TaskStatus::Done => TaskStatus::Active,
            TaskStatus::Active | TaskStatus::Todo => TaskStatus::Todo,
        }
    }

    /// Integer code used by the file format (0=todo, 1=active, 2=done)
    pub fn code(self) -> u8 {
        match self {
            TaskStatus::Todo => 0,
            TaskStatus::Active => 1,
            TaskStatus::Done => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<TaskStatus> {
        match code {
            0 => Some(TaskStatus::Todo),
            1 => Some(TaskStatus::Active),
            2 => Some(TaskStatus::Done),
            _ => None,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Todo => write!(f, "todo"),
            TaskStatus::Active => write!(f, "active"),
            TaskStatus::Done => write!(f, "done"),
        }
    }
}

/// A node in the task forest. Children are owned exclusively and their
/// order is the display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub status: TaskStatus,
    pub subtasks: Vec<Task>,
}

impl Task {
    /// Create a task with a freshly generated ID and no subtasks
    pub fn new(title: impl Into<String>, status: TaskStatus) -> Self {
        Task::with_id(TaskId::generate(), title, status)
    }

    /// Create a task with a known ID (used when loading from storage)
    pub fn with_id(id: impl Into<TaskId>, title: impl Into<String>, status: TaskStatus) -> Self {
        Task {
            id: id.into(),
            title: title.into(),
            status,
            subtasks: Vec::new(),
        }
    }

    pub fn with_subtasks(mut self, subtasks: Vec<Task>) -> Self {
        self.subtasks = subtasks;
        self
    }

    /// Number of tasks in this subtree, including `self`
    pub fn subtree_len(&self) -> usize {
        1 + self.subtasks.iter().map(Task::subtree_len).sum::<usize>()
    }
}
