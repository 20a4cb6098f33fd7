use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::App;
use crate::tui::command_actions::Action;
use crate::util::unicode::{
    self, next_grapheme_boundary, prev_grapheme_boundary, word_boundary_left, word_boundary_right,
};

/// Keys that finish or chain an edit. The buffer is committed by the caller.
pub fn edit_key_action(key: KeyEvent) -> Option<Action> {
    let m = key.modifiers;
    match key.code {
        KeyCode::Enter if m.contains(KeyModifiers::CONTROL) => {
            Some(Action::CommitAndCreateAuntUncle)
        }
        KeyCode::Char('o') if m.contains(KeyModifiers::CONTROL) => {
            Some(Action::CommitAndCreateAuntUncle)
        }
        KeyCode::Enter if m.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) => {
            Some(Action::CommitAndCreateSibling)
        }
        KeyCode::Enter => Some(Action::CommitEdit(String::new())),
        KeyCode::Esc => Some(Action::CancelEdit),
        _ => None,
    }
}

pub(super) fn handle_edit(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.cancel_edit();
        app.quit();
        return;
    }

    if let Some(action) = edit_key_action(key) {
        let action = match action {
            Action::CommitEdit(_) => Action::CommitEdit(std::mem::take(&mut app.edit_buffer)),
            other => other,
        };
        app.execute(action);
        return;
    }

    match (key.modifiers, key.code) {
        // Word movement (Alt or Ctrl+arrow)
        (m, KeyCode::Left) if m.intersects(KeyModifiers::ALT | KeyModifiers::CONTROL) => {
            app.edit_cursor = word_boundary_left(&app.edit_buffer, app.edit_cursor);
        }
        (m, KeyCode::Right) if m.intersects(KeyModifiers::ALT | KeyModifiers::CONTROL) => {
            app.edit_cursor = word_boundary_right(&app.edit_buffer, app.edit_cursor);
        }
        (_, KeyCode::Left) => {
            if let Some(prev) = prev_grapheme_boundary(&app.edit_buffer, app.edit_cursor) {
                app.edit_cursor = prev;
            }
        }
        (_, KeyCode::Right) => {
            if let Some(next) = next_grapheme_boundary(&app.edit_buffer, app.edit_cursor) {
                app.edit_cursor = next;
            }
        }
        (_, KeyCode::Home) => app.edit_cursor = 0,
        (_, KeyCode::End) => app.edit_cursor = app.edit_buffer.len(),
        (m, KeyCode::Char('a')) if m.contains(KeyModifiers::CONTROL) => app.edit_cursor = 0,
        (m, KeyCode::Char('e')) if m.contains(KeyModifiers::CONTROL) => {
            app.edit_cursor = app.edit_buffer.len();
        }

        // Word backspace (Alt or Ctrl), and readline's ctrl+w
        (m, KeyCode::Backspace) if m.intersects(KeyModifiers::ALT | KeyModifiers::CONTROL) => {
            delete_word_left(app);
        }
        (m, KeyCode::Char('w')) if m.contains(KeyModifiers::CONTROL) => delete_word_left(app),
        (_, KeyCode::Backspace) => {
            if let Some(prev) = prev_grapheme_boundary(&app.edit_buffer, app.edit_cursor) {
                app.edit_buffer.drain(prev..app.edit_cursor);
                app.edit_cursor = prev;
            }
        }
        (_, KeyCode::Delete) => {
            if let Some(next) = next_grapheme_boundary(&app.edit_buffer, app.edit_cursor) {
                app.edit_buffer.drain(app.edit_cursor..next);
            }
        }
        // Kill to start / end of line
        (m, KeyCode::Char('u')) if m.contains(KeyModifiers::CONTROL) => {
            app.edit_buffer.drain(..app.edit_cursor);
            app.edit_cursor = 0;
        }
        (m, KeyCode::Char('k')) if m.contains(KeyModifiers::CONTROL) => {
            app.edit_buffer.truncate(app.edit_cursor);
        }

        (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => {
            let mut tmp = [0u8; 4];
            insert_str(app, c.encode_utf8(&mut tmp));
        }
        _ => {}
    }
}

/// Insert at the cursor and move the cursor past the inserted text
pub(super) fn insert_str(app: &mut App, text: &str) {
    let at = app.edit_cursor.min(app.edit_buffer.len());
    app.edit_buffer.insert_str(at, text);
    app.edit_cursor = at + text.len();
}

fn delete_word_left(app: &mut App) {
    let start = unicode::word_boundary_left(&app.edit_buffer, app.edit_cursor);
    app.edit_buffer.drain(start..app.edit_cursor);
    app.edit_cursor = start;
}
