//! Read-only traversal of the task forest.
//!
//! Tasks are stored as owned child lists with no back-references. Parent and
//! position are recomputed by scanning, which keeps every edit a plain `Vec`
//! operation at interactive list sizes.

use crate::model::task::{Task, TaskId};

/// Step direction used by navigation, status changes and reordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Previous task / lower status / towards the top
    Backward,
    /// Next task / higher status / towards the bottom
    Forward,
}

impl Direction {
    /// Map a signed step (`-1` / `+1`) to a direction. Zero has no direction.
    pub fn from_step(step: i32) -> Option<Direction> {
        match step.signum() {
            -1 => Some(Direction::Backward),
            1 => Some(Direction::Forward),
            _ => None,
        }
    }
}

/// Where a task sits: its parent (None = top level) and index in that container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub parent: Option<TaskId>,
    pub index: usize,
}

/// Visit every task in pre-order: parents before children, siblings in stored order.
pub fn for_each_task(tasks: &[Task], f: &mut dyn FnMut(&Task)) {
    for task in tasks {
        f(task);
        for_each_task(&task.subtasks, f);
    }
}

/// Find a task by ID anywhere in the forest (pre-order, first match).
pub fn find_task<'a>(tasks: &'a [Task], id: &TaskId) -> Option<&'a Task> {
    for task in tasks {
        if &task.id == id {
            return Some(task);
        }
        if let Some(t) = find_task(&task.subtasks, id) {
            return Some(t);
        }
    }
    None
}

/// Find a task by ID anywhere in the forest, mutable.
pub fn find_task_mut<'a>(tasks: &'a mut [Task], id: &TaskId) -> Option<&'a mut Task> {
    for task in tasks.iter_mut() {
        if &task.id == id {
            return Some(task);
        }
        if let Some(t) = find_task_mut(&mut task.subtasks, id) {
            return Some(t);
        }
    }
    None
}

pub fn contains(tasks: &[Task], id: &TaskId) -> bool {
    find_task(tasks, id).is_some()
}

/// All task IDs in pre-order. This sequence is the visual order of the list.
pub fn all_ids_in_order(tasks: &[Task]) -> Vec<TaskId> {
    let mut ids = Vec::new();
    for_each_task(tasks, &mut |task| ids.push(task.id.clone()));
    ids
}

/// Total number of tasks in the forest
pub fn count(tasks: &[Task]) -> usize {
    tasks.iter().map(Task::subtree_len).sum()
}

/// Index path from the root list to the task: `[i]` for a top-level task,
/// `[i, j]` for child `j` of top-level task `i`, and so on.
pub fn find_path(tasks: &[Task], id: &TaskId) -> Option<Vec<usize>> {
    for (i, task) in tasks.iter().enumerate() {
        if &task.id == id {
            return Some(vec![i]);
        }
        if let Some(mut rest) = find_path(&task.subtasks, id) {
            rest.insert(0, i);
            return Some(rest);
        }
    }
    None
}

/// Parent and index of a task. `None` if the ID does not exist.
pub fn find_parent(tasks: &[Task], id: &TaskId) -> Option<Location> {
    if let Some(index) = tasks.iter().position(|t| &t.id == id) {
        return Some(Location {
            parent: None,
            index,
        });
    }
    find_parent_nested(tasks, id)
}

fn find_parent_nested(tasks: &[Task], id: &TaskId) -> Option<Location> {
    for task in tasks {
        if let Some(index) = task.subtasks.iter().position(|t| &t.id == id) {
            return Some(Location {
                parent: Some(task.id.clone()),
                index,
            });
        }
        if let Some(loc) = find_parent_nested(&task.subtasks, id) {
            return Some(loc);
        }
    }
    None
}

/// The container list reached by following `path` from the root.
/// Panics if `path` does not describe existing tasks.
pub fn container_at<'a>(tasks: &'a [Task], path: &[usize]) -> &'a [Task] {
    let mut list = tasks;
    for &i in path {
        list = &list[i].subtasks;
    }
    list
}

/// Mutable variant of [`container_at`].
pub fn container_at_mut<'a>(tasks: &'a mut Vec<Task>, path: &[usize]) -> &'a mut Vec<Task> {
    let mut list = tasks;
    for &i in path {
        list = &mut list[i].subtasks;
    }
    list
}

/// The task immediately before or after `id` in pre-order. Returns `id`
/// itself at either end of the list, or when `id` is not in the forest.
pub fn adjacent_id(tasks: &[Task], id: &TaskId, direction: Direction) -> TaskId {
    let ids = all_ids_in_order(tasks);
    let Some(pos) = ids.iter().position(|t| t == id) else {
        return id.clone();
    };
    let target = match direction {
        Direction::Backward => pos.checked_sub(1),
        Direction::Forward => Some(pos + 1).filter(|&p| p < ids.len()),
    };
    match target {
        Some(p) => ids[p].clone(),
        None => id.clone(),
    }
}

/// Ancestor IDs of a task, nearest first. Empty for top-level or unknown tasks.
pub fn parent_chain(tasks: &[Task], id: &TaskId) -> Vec<TaskId> {
    let Some(path) = find_path(tasks, id) else {
        return Vec::new();
    };
    let mut chain = Vec::with_capacity(path.len().saturating_sub(1));
    let mut list = tasks;
    for &i in &path[..path.len() - 1] {
        chain.push(list[i].id.clone());
        list = &list[i].subtasks;
    }
    chain.reverse();
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::TaskStatus;
    use pretty_assertions::assert_eq;

    fn id(s: &str) -> TaskId {
        TaskId::from(s)
    }

    fn ids(list: &[&str]) -> Vec<TaskId> {
        list.iter().map(|s| id(s)).collect()
    }

    /// a
    /// b
    ///   b1
    ///     b1x
    ///   b2
    /// c
    fn sample_forest() -> Vec<Task> {
        vec![
            Task::with_id("a", "Alpha", TaskStatus::Todo),
            Task::with_id("b", "Bravo", TaskStatus::Active).with_subtasks(vec![
                Task::with_id("b1", "Bravo one", TaskStatus::Todo)
                    .with_subtasks(vec![Task::with_id("b1x", "Deep", TaskStatus::Done)]),
                Task::with_id("b2", "Bravo two", TaskStatus::Todo),
            ]),
            Task::with_id("c", "Charlie", TaskStatus::Done),
        ]
    }

    #[test]
    fn preorder_lists_parents_before_children() {
        let tasks = sample_forest();
        assert_eq!(
            all_ids_in_order(&tasks),
            ids(&["a", "b", "b1", "b1x", "b2", "c"])
        );
    }

    #[test]
    fn preorder_is_stable() {
        let tasks = sample_forest();
        assert_eq!(all_ids_in_order(&tasks), all_ids_in_order(&tasks));
    }

    #[test]
    fn preorder_of_empty_forest_is_empty() {
        assert!(all_ids_in_order(&[]).is_empty());
        assert_eq!(count(&[]), 0);
    }

    #[test]
    fn count_includes_nested_tasks() {
        assert_eq!(count(&sample_forest()), 6);
    }

    #[test]
    fn find_task_at_any_depth() {
        let tasks = sample_forest();
        assert_eq!(find_task(&tasks, &id("a")).unwrap().title, "Alpha");
        assert_eq!(find_task(&tasks, &id("b1x")).unwrap().title, "Deep");
        assert!(find_task(&tasks, &id("zzz")).is_none());
    }

    #[test]
    fn find_task_mut_edits_in_place() {
        let mut tasks = sample_forest();
        find_task_mut(&mut tasks, &id("b2")).unwrap().title = "Renamed".into();
        assert_eq!(tasks[1].subtasks[1].title, "Renamed");
    }

    #[test]
    fn find_parent_top_level() {
        let tasks = sample_forest();
        assert_eq!(
            find_parent(&tasks, &id("c")),
            Some(Location {
                parent: None,
                index: 2
            })
        );
    }

    #[test]
    fn find_parent_nested() {
        let tasks = sample_forest();
        assert_eq!(
            find_parent(&tasks, &id("b2")),
            Some(Location {
                parent: Some(id("b")),
                index: 1
            })
        );
        assert_eq!(
            find_parent(&tasks, &id("b1x")),
            Some(Location {
                parent: Some(id("b1")),
                index: 0
            })
        );
    }

    #[test]
    fn find_parent_missing() {
        assert_eq!(find_parent(&sample_forest(), &id("nope")), None);
    }

    #[test]
    fn find_path_follows_indices() {
        let tasks = sample_forest();
        assert_eq!(find_path(&tasks, &id("a")), Some(vec![0]));
        assert_eq!(find_path(&tasks, &id("b1x")), Some(vec![1, 0, 0]));
        assert_eq!(find_path(&tasks, &id("nope")), None);
        assert_eq!(container_at(&tasks, &[1, 0])[0].id, id("b1x"));
    }

    #[test]
    fn adjacent_moves_through_preorder() {
        let tasks = sample_forest();
        assert_eq!(adjacent_id(&tasks, &id("b"), Direction::Forward), id("b1"));
        assert_eq!(adjacent_id(&tasks, &id("b1x"), Direction::Forward), id("b2"));
        assert_eq!(adjacent_id(&tasks, &id("c"), Direction::Backward), id("b2"));
    }

    #[test]
    fn adjacent_stays_put_at_boundaries() {
        let tasks = sample_forest();
        assert_eq!(adjacent_id(&tasks, &id("a"), Direction::Backward), id("a"));
        assert_eq!(adjacent_id(&tasks, &id("c"), Direction::Forward), id("c"));
        assert_eq!(
            adjacent_id(&tasks, &id("ghost"), Direction::Forward),
            id("ghost")
        );
    }

    #[test]
    fn parent_chain_nearest_first() {
        let tasks = sample_forest();
        assert_eq!(parent_chain(&tasks, &id("b1x")), ids(&["b1", "b"]));
        assert_eq!(parent_chain(&tasks, &id("b2")), ids(&["b"]));
        assert!(parent_chain(&tasks, &id("a")).is_empty());
        assert!(parent_chain(&tasks, &id("ghost")).is_empty());
    }

    #[test]
    fn direction_from_step() {
        assert_eq!(Direction::from_step(-1), Some(Direction::Backward));
        assert_eq!(Direction::from_step(1), Some(Direction::Forward));
        assert_eq!(Direction::from_step(0), None);
    }
}
