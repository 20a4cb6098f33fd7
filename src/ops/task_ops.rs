use tracing::debug;

use crate::model::task::{Task, TaskId, TaskStatus};
use crate::ops::tree::{self, Direction};

/// Reasons a structural edit or status change was refused.
///
/// Every variant means "nothing changed": operations check their
/// preconditions before touching the forest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("task not found: {0}")]
    NotFound(TaskId),
    #[error("task is already first in its container")]
    AlreadyFirst,
    #[error("task is already last in its container")]
    AlreadyLast,
    #[error("task is already at the top level")]
    TopLevel,
    #[error("value is unchanged")]
    Unchanged,
    #[error("no task selected")]
    NoSelection,
}

// ---------------------------------------------------------------------------
// Status transitions
// ---------------------------------------------------------------------------

/// Step the status of `id` forward or backward.
///
/// Returns the new status, or `Unchanged` at the Todo floor / Done ceiling.
pub fn change_status(
    tasks: &mut [Task],
    id: &TaskId,
    direction: Direction,
) -> Result<TaskStatus, EditError> {
    let task = tree::find_task_mut(tasks, id).ok_or_else(|| EditError::NotFound(id.clone()))?;
    let next = match direction {
        Direction::Forward => task.status.forward(),
        Direction::Backward => task.status.backward(),
    };
    if next == task.status {
        return Err(EditError::Unchanged);
    }
    task.status = next;
    Ok(next)
}

/// Replace the title of `id`. Refused when the text is identical.
pub fn set_title(tasks: &mut [Task], id: &TaskId, title: &str) -> Result<(), EditError> {
    let task = tree::find_task_mut(tasks, id).ok_or_else(|| EditError::NotFound(id.clone()))?;
    if task.title == title {
        return Err(EditError::Unchanged);
    }
    task.title = title.to_string();
    Ok(())
}

// ---------------------------------------------------------------------------
// Create / delete
// ---------------------------------------------------------------------------

/// Insert a new empty Todo task immediately after `anchor` in the same
/// container. Appends at the top level when `anchor` is absent or unknown.
pub fn create_sibling(tasks: &mut Vec<Task>, anchor: Option<&TaskId>) -> TaskId {
    let task = Task::new("", TaskStatus::Todo);
    let new_id = task.id.clone();
    match anchor.and_then(|id| tree::find_path(tasks, id)) {
        Some(path) => {
            let (index, parent_path) = split_path(&path);
            tree::container_at_mut(tasks, parent_path).insert(index + 1, task);
        }
        None => tasks.push(task),
    }
    new_id
}

/// Append a new empty Todo task to the end of `anchor`'s subtasks.
/// Appends at the top level when `anchor` is absent or unknown.
pub fn create_child(tasks: &mut Vec<Task>, anchor: Option<&TaskId>) -> TaskId {
    let task = Task::new("", TaskStatus::Todo);
    let new_id = task.id.clone();
    match anchor.and_then(|id| tree::find_task_mut(tasks, id)) {
        Some(parent) => parent.subtasks.push(task),
        None => tasks.push(task),
    }
    new_id
}

/// Insert a new empty Todo task one level up: immediately after `anchor`'s
/// parent, in the parent's own container. A top-level (or unknown) anchor
/// appends at the end of the top level.
pub fn create_aunt_uncle(tasks: &mut Vec<Task>, anchor: Option<&TaskId>) -> TaskId {
    let task = Task::new("", TaskStatus::Todo);
    let new_id = task.id.clone();
    match anchor.and_then(|id| tree::find_path(tasks, id)) {
        Some(path) if path.len() >= 2 => {
            let parent_path = &path[..path.len() - 1];
            let (parent_index, grandparent_path) = split_path(parent_path);
            tree::container_at_mut(tasks, grandparent_path).insert(parent_index + 1, task);
        }
        _ => tasks.push(task),
    }
    new_id
}

/// Remove `id` and its whole subtree, returning the removed task.
pub fn remove_task(tasks: &mut Vec<Task>, id: &TaskId) -> Result<Task, EditError> {
    let path = tree::find_path(tasks, id).ok_or_else(|| EditError::NotFound(id.clone()))?;
    let (index, parent_path) = split_path(&path);
    Ok(tree::container_at_mut(tasks, parent_path).remove(index))
}

/// Where the cursor lands after a deletion: `previous` if it still exists,
/// otherwise the first task in pre-order, otherwise nothing.
pub fn cursor_after_delete(tasks: &[Task], previous: Option<&TaskId>) -> Option<TaskId> {
    if let Some(prev) = previous
        && tree::contains(tasks, prev)
    {
        return Some(prev.clone());
    }
    tasks.first().map(|t| t.id.clone())
}

// ---------------------------------------------------------------------------
// Reordering and reparenting
// ---------------------------------------------------------------------------

/// Swap `id` with its neighbour in the same container.
pub fn move_task(tasks: &mut Vec<Task>, id: &TaskId, direction: Direction) -> Result<(), EditError> {
    let path = tree::find_path(tasks, id).ok_or_else(|| EditError::NotFound(id.clone()))?;
    let (index, parent_path) = split_path(&path);
    let siblings = tree::container_at_mut(tasks, parent_path);
    let target = match direction {
        Direction::Backward => index.checked_sub(1).ok_or(EditError::AlreadyFirst)?,
        Direction::Forward => {
            if index + 1 >= siblings.len() {
                return Err(EditError::AlreadyLast);
            }
            index + 1
        }
    };
    siblings.swap(index, target);
    debug!(task = %id, ?direction, "moved task");
    Ok(())
}

/// Make `id` the last child of its previous sibling.
pub fn indent(tasks: &mut Vec<Task>, id: &TaskId) -> Result<(), EditError> {
    let path = tree::find_path(tasks, id).ok_or_else(|| EditError::NotFound(id.clone()))?;
    let (index, parent_path) = split_path(&path);
    if index == 0 {
        return Err(EditError::AlreadyFirst);
    }
    let siblings = tree::container_at_mut(tasks, parent_path);
    let task = siblings.remove(index);
    siblings[index - 1].subtasks.push(task);
    Ok(())
}

/// Move `id` out of its parent to sit immediately after that parent.
pub fn unindent(tasks: &mut Vec<Task>, id: &TaskId) -> Result<(), EditError> {
    let path = tree::find_path(tasks, id).ok_or_else(|| EditError::NotFound(id.clone()))?;
    if path.len() < 2 {
        return Err(EditError::TopLevel);
    }
    let (index, parent_path) = split_path(&path);
    let task = tree::container_at_mut(tasks, parent_path).remove(index);
    let (parent_index, grandparent_path) = split_path(parent_path);
    tree::container_at_mut(tasks, grandparent_path).insert(parent_index + 1, task);
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Split a non-empty path into (index in container, path to container owner).
fn split_path(path: &[usize]) -> (usize, &[usize]) {
    match path.split_last() {
        Some((&index, rest)) => (index, rest),
        None => (0, path),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
