use std::io;
use std::time::Duration;

use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{debug, info, warn};

use crate::io::clipboard::Clipboard;
use crate::io::store::Persistence;
use crate::model::config::Config;
use crate::model::task::{Task, TaskId};
use crate::ops::task_ops::{self, EditError};
use crate::ops::tree::{self, Direction};

use super::input;
use super::render;
use super::theme::Theme;
use super::undo::{History, Snapshot};

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// Editing the selected task's title in `edit_buffer`
    Edit,
}

/// Result of a command: whether the forest or session changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Changed,
    Unchanged,
}

impl Outcome {
    pub fn is_changed(self) -> bool {
        self == Outcome::Changed
    }
}

/// One visible row: a task and its nesting depth (0 = root)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatItem {
    pub id: TaskId,
    pub depth: usize,
}

/// Session state for one open task list
pub struct App {
    pub tasks: Vec<Task>,
    /// Selected task; `None` only when the forest is empty
    pub cursor: Option<TaskId>,
    /// Where the cursor returns when a freshly created task is abandoned
    pub previous: Option<TaskId>,
    pub history: History,
    pub mode: Mode,
    pub edit_buffer: String,
    /// Byte offset into `edit_buffer`
    pub edit_cursor: usize,
    pub status_message: Option<String>,
    pub error_message: Option<String>,
    pub show_help: bool,
    pub should_quit: bool,
    pub theme: Theme,
    /// Shown in the header, e.g. "tasks (global)"
    pub list_name: Option<String>,
    /// First visible row
    pub scroll_offset: usize,
    store: Option<Box<dyn Persistence>>,
    clipboard: Box<dyn Clipboard>,
    autosave: bool,
    /// Changes held back because autosave is off
    unsaved: bool,
}

impl App {
    pub fn new(
        tasks: Vec<Task>,
        store: Option<Box<dyn Persistence>>,
        clipboard: Box<dyn Clipboard>,
        config: &Config,
    ) -> Self {
        let cursor = tasks.first().map(|t| t.id.clone());
        App {
            tasks,
            cursor,
            previous: None,
            history: History::new(config.history.limit),
            mode: Mode::Navigate,
            edit_buffer: String::new(),
            edit_cursor: 0,
            status_message: None,
            error_message: None,
            show_help: false,
            should_quit: false,
            theme: Theme::from_config(&config.ui),
            list_name: None,
            scroll_offset: 0,
            store,
            clipboard,
            autosave: config.storage.autosave,
            unsaved: false,
        }
    }

    /// Load the forest from `store`. A failed load starts an empty session
    /// with the failure shown; the store stays attached so the next save
    /// writes a fresh file (after backing up the unreadable one).
    pub fn open(
        mut store: Box<dyn Persistence>,
        clipboard: Box<dyn Clipboard>,
        config: &Config,
    ) -> Self {
        match store.load() {
            Ok(tasks) => {
                info!(tasks = tree::count(&tasks), "loaded task list");
                App::new(tasks, Some(store), clipboard, config)
            }
            Err(e) => {
                warn!(error = %e, "failed to load task list");
                let mut app = App::new(Vec::new(), Some(store), clipboard, config);
                app.error_message = Some(format!("Failed to load tasks: {e}"));
                app
            }
        }
    }

    pub fn with_list_name(mut self, name: impl Into<String>) -> Self {
        self.list_name = Some(name.into());
        self
    }

    /// The selected task, if the cursor resolves
    pub fn selected(&self) -> Option<&Task> {
        self.cursor
            .as_ref()
            .and_then(|id| tree::find_task(&self.tasks, id))
    }

    pub fn selected_id(&self) -> Result<TaskId, EditError> {
        self.cursor.clone().ok_or(EditError::NoSelection)
    }

    /// Every task in display order with its depth
    pub fn flat_items(&self) -> Vec<FlatItem> {
        let mut items = Vec::with_capacity(tree::count(&self.tasks));
        flatten(&self.tasks, 0, &mut items);
        items
    }

    /// Row index of the cursor within `flat_items`
    pub fn cursor_row(&self) -> Option<usize> {
        let cursor = self.cursor.as_ref()?;
        self.flat_items().iter().position(|item| &item.id == cursor)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.tasks, self.cursor.as_ref(), self.previous.as_ref())
    }

    fn restore(&mut self, snapshot: Snapshot) {
        let (tasks, cursor, previous) = snapshot.into_parts();
        self.tasks = tasks;
        self.cursor = cursor;
        self.previous = previous;
    }

    // -----------------------------------------------------------------------
    // Mutation plumbing
    // -----------------------------------------------------------------------

    /// Run a forest mutation as one undoable step.
    ///
    /// The snapshot is taken before `op` runs and only recorded when `op`
    /// succeeds, so a rejected edit leaves both stacks untouched. `op` must
    /// not modify anything when it returns an error.
    fn mutate<F>(&mut self, label: &str, op: F) -> Outcome
    where
        F: FnOnce(&mut App) -> Result<(), EditError>,
    {
        let before = self.snapshot();
        match op(self) {
            Ok(()) => {
                debug!(command = label, "applied");
                self.history.record(before);
                self.persist();
                Outcome::Changed
            }
            Err(e) => {
                debug!(command = label, reason = %e, "no-op");
                Outcome::Unchanged
            }
        }
    }

    /// Hand the forest to the store after a change. With autosave off the
    /// change is only marked; `save_now` or quitting writes it.
    fn persist(&mut self) {
        if self.autosave {
            self.write_store();
        } else if self.store.is_some() {
            self.unsaved = true;
        }
    }

    /// Failures are shown but the in-memory state is kept; the next
    /// successful save clears the error.
    fn write_store(&mut self) -> bool {
        let Some(store) = self.store.as_mut() else {
            return false;
        };
        match store.save(&self.tasks) {
            Ok(()) => {
                self.error_message = None;
                self.unsaved = false;
                true
            }
            Err(e) => {
                warn!(error = %e, "save failed");
                self.error_message = Some(format!("Save failed: {e}"));
                false
            }
        }
    }

    /// Save regardless of the autosave setting
    pub fn save_now(&mut self) -> Outcome {
        if self.write_store() {
            info!(tasks = tree::count(&self.tasks), "saved task list");
            self.status_message = Some("Saved".into());
            Outcome::Changed
        } else {
            Outcome::Unchanged
        }
    }

    /// End the session, first writing changes autosave held back. If that
    /// write fails the session stays open with the error shown, and a
    /// second quit leaves without saving.
    pub fn quit(&mut self) -> Outcome {
        if self.unsaved && !self.write_store() {
            self.unsaved = false;
            return Outcome::Changed;
        }
        self.should_quit = true;
        Outcome::Changed
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Move the cursor one row in display order. Not recorded in history.
    pub fn navigate(&mut self, direction: Direction) -> Outcome {
        let Some(cursor) = self.cursor.as_ref() else {
            return Outcome::Unchanged;
        };
        let next = tree::adjacent_id(&self.tasks, cursor, direction);
        if &next == cursor {
            return Outcome::Unchanged;
        }
        self.cursor = Some(next);
        Outcome::Changed
    }

    pub fn change_status(&mut self, direction: Direction) -> Outcome {
        self.mutate("change_status", |app| {
            let id = app.selected_id()?;
            task_ops::change_status(&mut app.tasks, &id, direction).map(|_| ())
        })
    }

    pub fn move_task(&mut self, direction: Direction) -> Outcome {
        self.mutate("move_task", |app| {
            let id = app.selected_id()?;
            task_ops::move_task(&mut app.tasks, &id, direction)
        })
    }

    pub fn indent(&mut self) -> Outcome {
        self.mutate("indent", |app| {
            let id = app.selected_id()?;
            task_ops::indent(&mut app.tasks, &id)
        })
    }

    pub fn unindent(&mut self) -> Outcome {
        self.mutate("unindent", |app| {
            let id = app.selected_id()?;
            task_ops::unindent(&mut app.tasks, &id)
        })
    }

    pub fn create_sibling(&mut self) -> Outcome {
        self.create("create_sibling", task_ops::create_sibling)
    }

    pub fn create_child(&mut self) -> Outcome {
        self.create("create_child", task_ops::create_child)
    }

    pub fn create_aunt_uncle(&mut self) -> Outcome {
        self.create("create_aunt_uncle", task_ops::create_aunt_uncle)
    }

    /// Insert an empty task, select it, and open it for editing.
    /// The old cursor is remembered so cancelling returns to it.
    fn create(
        &mut self,
        label: &str,
        insert: fn(&mut Vec<Task>, Option<&TaskId>) -> TaskId,
    ) -> Outcome {
        let outcome = self.mutate(label, |app| {
            let new_id = insert(&mut app.tasks, app.cursor.as_ref());
            app.previous = app.cursor.take();
            app.cursor = Some(new_id);
            Ok(())
        });
        self.enter_edit(String::new());
        outcome
    }

    /// `previous` is consumed by every delete, including a refused one.
    pub fn delete_selected(&mut self) -> Outcome {
        let outcome = self.mutate("delete", |app| {
            let id = app.selected_id()?;
            task_ops::remove_task(&mut app.tasks, &id)?;
            app.cursor = task_ops::cursor_after_delete(&app.tasks, app.previous.as_ref());
            app.previous = None;
            Ok(())
        });
        self.previous = None;
        outcome
    }

    // -----------------------------------------------------------------------
    // Title editing
    // -----------------------------------------------------------------------

    fn enter_edit(&mut self, text: String) {
        self.edit_cursor = text.len();
        self.edit_buffer = text;
        self.mode = Mode::Edit;
    }

    fn leave_edit(&mut self) {
        self.mode = Mode::Navigate;
        self.edit_buffer.clear();
        self.edit_cursor = 0;
    }

    /// Open the selected task's title in the editor. Does not touch the forest.
    pub fn begin_edit(&mut self) -> Outcome {
        let Some(title) = self.selected().map(|t| t.title.clone()) else {
            return Outcome::Unchanged;
        };
        self.enter_edit(title);
        Outcome::Changed
    }

    /// Write `text` as the selected task's title
    pub fn commit_edit(&mut self, text: &str) -> Outcome {
        self.leave_edit();
        self.mutate("commit_edit", |app| {
            let id = app.selected_id()?;
            task_ops::set_title(&mut app.tasks, &id, text)
        })
    }

    pub fn commit_edit_buffer(&mut self) -> Outcome {
        let text = std::mem::take(&mut self.edit_buffer);
        self.commit_edit(&text)
    }

    /// Leave the editor without saving. A task whose title is still empty
    /// is deleted, returning the cursor to where it was before creation.
    pub fn cancel_edit(&mut self) -> Outcome {
        self.leave_edit();
        let abandoned = self.selected().is_some_and(|t| t.title.is_empty());
        if abandoned {
            self.delete_selected()
        } else {
            Outcome::Unchanged
        }
    }

    pub fn commit_and_create_sibling(&mut self) -> Outcome {
        let committed = self.commit_edit_buffer();
        let created = self.create_sibling();
        combine(committed, created)
    }

    pub fn commit_and_create_aunt_uncle(&mut self) -> Outcome {
        let committed = self.commit_edit_buffer();
        let created = self.create_aunt_uncle();
        combine(committed, created)
    }

    // -----------------------------------------------------------------------
    // History
    // -----------------------------------------------------------------------

    pub fn undo(&mut self) -> Outcome {
        if !self.history.can_undo() {
            debug!(command = "undo", "nothing to undo");
            return Outcome::Unchanged;
        }
        let current = self.snapshot();
        let Some(snapshot) = self.history.undo(current) else {
            return Outcome::Unchanged;
        };
        self.restore(snapshot);
        debug!(command = "undo", remaining = self.history.undo_len(), "applied");
        self.persist();
        Outcome::Changed
    }

    pub fn redo(&mut self) -> Outcome {
        if !self.history.can_redo() {
            debug!(command = "redo", "nothing to redo");
            return Outcome::Unchanged;
        }
        let current = self.snapshot();
        let Some(snapshot) = self.history.redo(current) else {
            return Outcome::Unchanged;
        };
        self.restore(snapshot);
        debug!(command = "redo", remaining = self.history.redo_len(), "applied");
        self.persist();
        Outcome::Changed
    }

    // -----------------------------------------------------------------------
    // Clipboard
    // -----------------------------------------------------------------------

    pub fn copy_selected(&mut self) -> Outcome {
        let Some(title) = self.selected().map(|t| t.title.clone()) else {
            self.status_message = Some("No task selected to copy".into());
            return Outcome::Unchanged;
        };
        match self.clipboard.write_text(&title) {
            Ok(()) => {
                self.status_message = Some("Task copied to clipboard".into());
                self.error_message = None;
            }
            Err(e) => {
                warn!(error = %e, "clipboard write failed");
                self.error_message = Some(format!("Failed to copy to clipboard: {e}"));
            }
        }
        Outcome::Unchanged
    }

    /// Create a task from the clipboard text, below the selection or as its
    /// last subtask. Blank clipboard content only sets a status message.
    pub fn paste(&mut self, as_child: bool) -> Outcome {
        let text = match self.clipboard.read_text() {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!(error = %e, "clipboard read failed");
                self.error_message = Some(format!("Failed to read from clipboard: {e}"));
                return Outcome::Unchanged;
            }
        };
        if text.is_empty() {
            self.status_message = Some("Clipboard is empty".into());
            return Outcome::Unchanged;
        }

        let insert = if as_child {
            task_ops::create_child
        } else {
            task_ops::create_sibling
        };
        self.error_message = None;
        let outcome = self.mutate("paste", |app| {
            let new_id = insert(&mut app.tasks, app.cursor.as_ref());
            if let Some(task) = tree::find_task_mut(&mut app.tasks, &new_id) {
                task.title = text;
            }
            app.previous = app.cursor.take();
            app.cursor = Some(new_id);
            Ok(())
        });
        self.status_message = Some(
            if as_child {
                "Subtask pasted from clipboard"
            } else {
                "Task pasted from clipboard"
            }
            .into(),
        );
        outcome
    }

    pub fn dismiss_error(&mut self) -> Outcome {
        if self.error_message.take().is_some() {
            Outcome::Changed
        } else {
            Outcome::Unchanged
        }
    }
}

fn combine(a: Outcome, b: Outcome) -> Outcome {
    if a.is_changed() || b.is_changed() {
        Outcome::Changed
    } else {
        Outcome::Unchanged
    }
}

fn flatten(tasks: &[Task], depth: usize, items: &mut Vec<FlatItem>) {
    for task in tasks {
        items.push(FlatItem {
            id: task.id.clone(),
            depth,
        });
        flatten(&task.subtasks, depth + 1, items);
    }
}

/// Run the TUI until the user quits
pub fn run(app: &mut App) -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Restore the terminal if anything panics
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableBracketedPaste, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    input::handle_key(app, key);
                }
                Event::Paste(text) => input::handle_paste(app, &text),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::io::clipboard::MemoryClipboard;
    use crate::io::store::MemoryStore;
    use crate::model::task::TaskStatus;
    use crate::tui::command_actions::Action;

    fn id(s: &str) -> TaskId {
        TaskId::from(s)
    }

    fn sample() -> Vec<Task> {
        vec![
            Task::with_id("a", "Groceries", TaskStatus::Todo),
            Task::with_id("b", "Taxes", TaskStatus::Active).with_subtasks(vec![
                Task::with_id("b1", "Find receipts", TaskStatus::Done),
                Task::with_id("b2", "File return", TaskStatus::Todo),
            ]),
            Task::with_id("c", "Call plumber", TaskStatus::Todo),
        ]
    }

    fn app_with(tasks: Vec<Task>) -> (App, Rc<RefCell<MemoryStore>>, Rc<RefCell<MemoryClipboard>>) {
        let store = Rc::new(RefCell::new(MemoryStore::new(tasks)));
        let clip = Rc::new(RefCell::new(MemoryClipboard::default()));
        let app = App::open(
            Box::new(store.clone()),
            Box::new(clip.clone()),
            &Config::default(),
        );
        (app, store, clip)
    }

    fn titles(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn test_open_selects_first_task() {
        let (app, _, _) = app_with(sample());
        assert_eq!(app.cursor, Some(id("a")));
        assert_eq!(app.mode, Mode::Navigate);
        assert!(app.error_message.is_none());
    }

    #[test]
    fn test_open_empty_has_no_cursor() {
        let (app, _, _) = app_with(Vec::new());
        assert_eq!(app.cursor, None);
        assert!(app.selected().is_none());
    }

    #[test]
    fn test_flat_items_depths() {
        let (app, _, _) = app_with(sample());
        let depths: Vec<(String, usize)> = app
            .flat_items()
            .into_iter()
            .map(|i| (i.id.to_string(), i.depth))
            .collect();
        assert_eq!(
            depths,
            vec![
                ("a".to_string(), 0),
                ("b".to_string(), 0),
                ("b1".to_string(), 1),
                ("b2".to_string(), 1),
                ("c".to_string(), 0),
            ]
        );
    }

    #[test]
    fn test_navigate_walks_preorder_and_stops_at_edges() {
        let (mut app, store, _) = app_with(sample());
        assert_eq!(app.navigate(Direction::Backward), Outcome::Unchanged);
        app.navigate(Direction::Forward);
        app.navigate(Direction::Forward);
        assert_eq!(app.cursor, Some(id("b1")));
        app.navigate(Direction::Forward);
        app.navigate(Direction::Forward);
        assert_eq!(app.cursor, Some(id("c")));
        assert_eq!(app.navigate(Direction::Forward), Outcome::Unchanged);
        assert!(!app.history.can_undo());
        assert_eq!(store.borrow().saves, 0);
    }

    #[test]
    fn test_change_status_records_and_saves() {
        let (mut app, store, _) = app_with(sample());
        assert_eq!(app.change_status(Direction::Forward), Outcome::Changed);
        assert_eq!(app.selected().unwrap().status, TaskStatus::Active);
        assert_eq!(app.history.undo_len(), 1);
        assert_eq!(store.borrow().saves, 1);
        assert_eq!(store.borrow().tasks[0].status, TaskStatus::Active);
    }

    #[test]
    fn test_status_backward_on_todo_is_noop() {
        let (mut app, store, _) = app_with(sample());
        assert_eq!(app.change_status(Direction::Backward), Outcome::Unchanged);
        assert!(!app.history.can_undo());
        assert_eq!(store.borrow().saves, 0);
    }

    #[test]
    fn test_move_first_up_is_noop() {
        let (mut app, _, _) = app_with(sample());
        assert_eq!(app.move_task(Direction::Backward), Outcome::Unchanged);
        assert_eq!(app.move_task(Direction::Forward), Outcome::Changed);
        assert_eq!(titles(&app.tasks), vec!["Taxes", "Groceries", "Call plumber"]);
        assert_eq!(app.cursor, Some(id("a")));
    }

    #[test]
    fn test_create_sibling_enters_edit_and_remembers_previous() {
        let (mut app, _, _) = app_with(sample());
        assert_eq!(app.create_sibling(), Outcome::Changed);
        assert_eq!(app.mode, Mode::Edit);
        assert!(app.edit_buffer.is_empty());
        assert_eq!(app.previous, Some(id("a")));
        let new_id = app.cursor.clone().unwrap();
        assert_eq!(app.tasks[1].id, new_id);
        assert_eq!(app.tasks[1].title, "");
        assert_eq!(app.tasks[1].status, TaskStatus::Todo);
    }

    #[test]
    fn test_create_on_empty_forest() {
        let (mut app, _, _) = app_with(Vec::new());
        app.create_sibling();
        assert_eq!(app.tasks.len(), 1);
        assert_eq!(app.cursor.as_ref(), Some(&app.tasks[0].id));
        assert_eq!(app.previous, None);
    }

    #[test]
    fn test_commit_sets_title_verbatim() {
        let (mut app, store, _) = app_with(sample());
        app.create_child();
        app.edit_buffer = "  Buy eggs ".into();
        assert_eq!(app.commit_edit_buffer(), Outcome::Changed);
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.selected().unwrap().title, "  Buy eggs ");
        assert_eq!(app.tasks[0].subtasks.len(), 1);
        assert_eq!(store.borrow().saves, 2);
    }

    #[test]
    fn test_commit_same_text_is_noop() {
        let (mut app, _, _) = app_with(sample());
        app.begin_edit();
        assert_eq!(app.edit_buffer, "Groceries");
        assert_eq!(app.edit_cursor, "Groceries".len());
        assert_eq!(app.commit_edit_buffer(), Outcome::Unchanged);
        assert!(!app.history.can_undo());
    }

    #[test]
    fn test_cancel_new_task_deletes_it_and_restores_cursor() {
        let (mut app, _, _) = app_with(sample());
        app.navigate(Direction::Forward);
        app.navigate(Direction::Forward);
        app.create_sibling();
        assert_eq!(tree::count(&app.tasks), 6);
        assert_eq!(app.cancel_edit(), Outcome::Changed);
        assert_eq!(tree::count(&app.tasks), 5);
        assert_eq!(app.cursor, Some(id("b1")));
        assert_eq!(app.previous, None);
        assert_eq!(app.mode, Mode::Navigate);
    }

    #[test]
    fn test_cancel_existing_title_keeps_task() {
        let (mut app, _, _) = app_with(sample());
        app.begin_edit();
        app.edit_buffer.push_str(" and more");
        assert_eq!(app.cancel_edit(), Outcome::Unchanged);
        assert_eq!(app.tasks[0].title, "Groceries");
    }

    #[test]
    fn test_delete_without_previous_goes_to_first() {
        let (mut app, _, _) = app_with(sample());
        app.navigate(Direction::Forward);
        assert_eq!(app.delete_selected(), Outcome::Changed);
        assert_eq!(titles(&app.tasks), vec!["Groceries", "Call plumber"]);
        assert_eq!(app.cursor, Some(id("a")));
    }

    #[test]
    fn test_delete_last_task_empties_cursor() {
        let (mut app, _, _) = app_with(vec![Task::with_id("x", "Only", TaskStatus::Todo)]);
        app.delete_selected();
        assert!(app.tasks.is_empty());
        assert_eq!(app.cursor, None);
        assert_eq!(app.delete_selected(), Outcome::Unchanged);
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let (mut app, store, _) = app_with(sample());
        let original = app.tasks.clone();
        app.change_status(Direction::Forward);
        app.move_task(Direction::Forward);
        let after = app.tasks.clone();

        assert_eq!(app.undo(), Outcome::Changed);
        assert_eq!(app.undo(), Outcome::Changed);
        assert_eq!(app.undo(), Outcome::Unchanged);
        assert_eq!(app.tasks, original);
        assert_eq!(store.borrow().tasks, original);

        app.redo();
        app.redo();
        assert_eq!(app.tasks, after);
        assert_eq!(app.redo(), Outcome::Unchanged);
    }

    #[test]
    fn test_new_mutation_clears_redo() {
        let (mut app, _, _) = app_with(sample());
        app.change_status(Direction::Forward);
        app.undo();
        assert!(app.history.can_redo());
        app.navigate(Direction::Forward);
        assert_eq!(app.indent(), Outcome::Changed);
        assert!(!app.history.can_redo());
    }

    #[test]
    fn test_save_failure_keeps_mutation_and_shows_error() {
        let (mut app, store, _) = app_with(sample());
        store.borrow_mut().fail_with = Some("disk full".into());
        app.change_status(Direction::Forward);
        assert_eq!(app.tasks[0].status, TaskStatus::Active);
        let err = app.error_message.clone().unwrap();
        assert!(err.starts_with("Save failed:"), "{err}");
        assert!(err.contains("disk full"));

        store.borrow_mut().fail_with = None;
        app.change_status(Direction::Forward);
        assert!(app.error_message.is_none());
        assert_eq!(store.borrow().tasks[0].status, TaskStatus::Done);
    }

    fn app_without_autosave(tasks: Vec<Task>) -> (App, Rc<RefCell<MemoryStore>>) {
        let store = Rc::new(RefCell::new(MemoryStore::new(tasks)));
        let mut config = Config::default();
        config.storage.autosave = false;
        let app = App::open(
            Box::new(store.clone()),
            Box::new(MemoryClipboard::default()),
            &config,
        );
        (app, store)
    }

    #[test]
    fn test_autosave_off_skips_store() {
        let (mut app, store) = app_without_autosave(sample());
        app.change_status(Direction::Forward);
        assert_eq!(store.borrow().saves, 0);
        assert_eq!(app.save_now(), Outcome::Changed);
        assert_eq!(store.borrow().saves, 1);
        assert_eq!(app.status_message.as_deref(), Some("Saved"));
    }

    #[test]
    fn test_quit_writes_held_back_changes() {
        let (mut app, store) = app_without_autosave(vec![Task::with_id(
            "a",
            "Groceries",
            TaskStatus::Todo,
        )]);
        app.execute(Action::ChangeStatus(Direction::Forward));
        app.execute(Action::Quit);
        assert!(app.should_quit);
        assert_eq!(store.borrow().saves, 1);
        assert_eq!(store.borrow().tasks[0].status, TaskStatus::Active);
    }

    #[test]
    fn test_quit_without_changes_does_not_save() {
        let (mut app, store) = app_without_autosave(sample());
        app.navigate(Direction::Forward);
        app.quit();
        assert!(app.should_quit);
        assert_eq!(store.borrow().saves, 0);
    }

    #[test]
    fn test_quit_stays_open_when_final_save_fails() {
        let (mut app, store) = app_without_autosave(sample());
        app.change_status(Direction::Forward);
        store.borrow_mut().fail_with = Some("read-only file system".into());
        app.quit();
        assert!(!app.should_quit);
        assert!(app.error_message.as_deref().unwrap().starts_with("Save failed:"));
        app.quit();
        assert!(app.should_quit);
    }

    #[test]
    fn test_refused_delete_still_clears_previous() {
        let (mut app, _, _) = app_with(sample());
        app.previous = Some(id("a"));
        app.cursor = Some(id("ghost"));
        assert_eq!(app.delete_selected(), Outcome::Unchanged);
        assert_eq!(app.previous, None);
        assert_eq!(app.tasks, sample());
        assert!(!app.history.can_undo());
    }

    #[test]
    fn test_copy_writes_title() {
        let (mut app, _, clip) = app_with(sample());
        app.copy_selected();
        assert_eq!(clip.borrow().contents, "Groceries");
        assert_eq!(app.status_message.as_deref(), Some("Task copied to clipboard"));
        assert!(!app.history.can_undo());
    }

    #[test]
    fn test_copy_with_nothing_selected() {
        let (mut app, _, clip) = app_with(Vec::new());
        app.copy_selected();
        assert_eq!(clip.borrow().contents, "");
        assert_eq!(app.status_message.as_deref(), Some("No task selected to copy"));
    }

    #[test]
    fn test_paste_creates_trimmed_sibling_in_one_step() {
        let (mut app, store, clip) = app_with(sample());
        clip.borrow_mut().contents = "  Book dentist \n".into();
        assert_eq!(app.paste(false), Outcome::Changed);
        assert_eq!(app.tasks[1].title, "Book dentist");
        assert_eq!(app.cursor.as_ref(), Some(&app.tasks[1].id));
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.history.undo_len(), 1);
        assert_eq!(store.borrow().saves, 1);
        assert_eq!(app.status_message.as_deref(), Some("Task pasted from clipboard"));

        app.undo();
        assert_eq!(tree::count(&app.tasks), 5);
        assert_eq!(app.cursor, Some(id("a")));
    }

    #[test]
    fn test_paste_as_child() {
        let (mut app, _, clip) = app_with(sample());
        app.navigate(Direction::Forward);
        clip.borrow_mut().contents = "Pay balance".into();
        app.paste(true);
        assert_eq!(app.tasks[1].subtasks.len(), 3);
        assert_eq!(app.tasks[1].subtasks[2].title, "Pay balance");
        assert_eq!(
            app.status_message.as_deref(),
            Some("Subtask pasted from clipboard")
        );
    }

    #[test]
    fn test_paste_blank_is_noop_with_message() {
        let (mut app, _, clip) = app_with(sample());
        clip.borrow_mut().contents = " \n\t".into();
        assert_eq!(app.paste(false), Outcome::Unchanged);
        assert_eq!(tree::count(&app.tasks), 5);
        assert!(!app.history.can_undo());
        assert_eq!(app.status_message.as_deref(), Some("Clipboard is empty"));
        assert!(app.error_message.is_none());
    }

    #[test]
    fn test_load_failure_starts_empty_with_message() {
        struct Broken;
        impl Persistence for Broken {
            fn load(&mut self) -> Result<Vec<Task>, crate::io::store::StoreError> {
                Err(crate::io::store::StoreError::NotFound("/nowhere.dot".into()))
            }
            fn save(&mut self, _: &[Task]) -> Result<(), crate::io::store::StoreError> {
                Ok(())
            }
        }
        let app = App::open(
            Box::new(Broken),
            Box::new(MemoryClipboard::default()),
            &Config::default(),
        );
        assert!(app.tasks.is_empty());
        let err = app.error_message.unwrap();
        assert!(err.starts_with("Failed to load tasks:"), "{err}");
    }

    #[test]
    fn test_dismiss_error() {
        let (mut app, _, _) = app_with(sample());
        assert_eq!(app.dismiss_error(), Outcome::Unchanged);
        app.error_message = Some("boom".into());
        assert_eq!(app.dismiss_error(), Outcome::Changed);
        assert!(app.error_message.is_none());
    }
}
