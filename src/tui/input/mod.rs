mod edit;
mod navigate;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, Mode};

pub use edit::edit_key_action;
pub use navigate::navigate_action;

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }
    app.status_message = None;

    let key = normalize_key(key);

    // Help overlay intercepts everything except close and quit
    if app.show_help {
        match key.code {
            KeyCode::Char('?') | KeyCode::Esc => app.show_help = false,
            KeyCode::Char('q') => {
                app.quit();
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.quit();
            }
            _ => {}
        }
        return;
    }

    match app.mode {
        Mode::Navigate => navigate::handle_navigate(app, key),
        Mode::Edit => edit::handle_edit(app, key),
    }
}

/// Handle a bracketed paste event. Only active in Edit mode: the text is
/// inserted at the cursor with line breaks flattened to spaces.
pub fn handle_paste(app: &mut App, text: &str) {
    if app.mode != Mode::Edit || text.is_empty() {
        return;
    }
    let clean = text.replace("\r\n", " ").replace(['\n', '\r'], " ");
    edit::insert_str(app, &clean);
}

/// Uppercase shifted letters and map shifted symbols so bindings can match
/// on the character alone.
fn normalize_key(mut key: KeyEvent) -> KeyEvent {
    if let KeyCode::Char(c) = key.code
        && key.modifiers.contains(KeyModifiers::SHIFT)
    {
        if c.is_ascii_lowercase() {
            key.code = KeyCode::Char(c.to_ascii_uppercase());
        } else if c == '/' {
            key.code = KeyCode::Char('?');
            key.modifiers.remove(KeyModifiers::SHIFT);
        }
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::{Task, TaskStatus};
    use crate::tui::render::test_helpers::app_with_tasks;

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn press_mod(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
        handle_key(app, KeyEvent::new(code, modifiers));
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_normalize_shift_letter() {
        let key = normalize_key(KeyEvent::new(KeyCode::Char('n'), KeyModifiers::SHIFT));
        assert_eq!(key.code, KeyCode::Char('N'));
        let key = normalize_key(KeyEvent::new(KeyCode::Char('/'), KeyModifiers::SHIFT));
        assert_eq!(key.code, KeyCode::Char('?'));
        assert!(!key.modifiers.contains(KeyModifiers::SHIFT));
    }

    #[test]
    fn test_create_type_and_commit() {
        let mut app = app_with_tasks(Vec::new());
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.mode, Mode::Edit);
        type_str(&mut app, "Buy milk");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.tasks.len(), 1);
        assert_eq!(app.tasks[0].title, "Buy milk");
    }

    #[test]
    fn test_shift_enter_chains_new_task() {
        let mut app = app_with_tasks(Vec::new());
        press(&mut app, KeyCode::Char('n'));
        type_str(&mut app, "First");
        press_mod(&mut app, KeyCode::Enter, KeyModifiers::SHIFT);
        type_str(&mut app, "Second");
        press(&mut app, KeyCode::Enter);
        let titles: Vec<&str> = app.tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second"]);
    }

    #[test]
    fn test_escape_abandons_new_task() {
        let mut app = app_with_tasks(vec![Task::with_id("a", "Keep", TaskStatus::Todo)]);
        press(&mut app, KeyCode::Char('N'));
        assert_eq!(app.tasks[0].subtasks.len(), 1);
        press(&mut app, KeyCode::Esc);
        assert!(app.tasks[0].subtasks.is_empty());
        assert_eq!(app.cursor.as_ref().map(|c| c.as_str()), Some("a"));
    }

    #[test]
    fn test_help_overlay_swallows_keys() {
        let mut app = app_with_tasks(vec![Task::with_id("a", "Keep", TaskStatus::Todo)]);
        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.tasks.len(), 1);
        press(&mut app, KeyCode::Esc);
        assert!(!app.show_help);
    }

    #[test]
    fn test_keypress_clears_status_message() {
        let mut app = app_with_tasks(vec![Task::with_id("a", "Keep", TaskStatus::Todo)]);
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.status_message.as_deref(), Some("Task copied to clipboard"));
        press(&mut app, KeyCode::Char('j'));
        assert!(app.status_message.is_none());
    }

    #[test]
    fn test_paste_event_flattens_newlines() {
        let mut app = app_with_tasks(vec![Task::with_id("a", "Call", TaskStatus::Todo)]);
        handle_paste(&mut app, " ignored");
        assert_eq!(app.tasks[0].title, "Call");
        press(&mut app, KeyCode::Enter);
        handle_paste(&mut app, " the\r\nbank");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.tasks[0].title, "Call the bank");
    }

    #[test]
    fn test_ctrl_c_quits_from_edit_and_drops_empty_task() {
        let mut app = app_with_tasks(Vec::new());
        press(&mut app, KeyCode::Char('n'));
        press_mod(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(app.should_quit);
        assert!(app.tasks.is_empty());
    }
}
