use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::ops::tree::Direction;
use crate::tui::app::App;
use crate::tui::command_actions::Action;

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    if let Some(action) = navigate_action(key) {
        app.execute(action);
    }
}

/// Map a key in navigate mode to a command
pub fn navigate_action(key: KeyEvent) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);

    let action = match (key.code, ctrl) {
        // Reordering and nesting
        (KeyCode::Up | KeyCode::Char('k'), true) => Action::MoveTask(Direction::Backward),
        (KeyCode::Down | KeyCode::Char('j'), true) => Action::MoveTask(Direction::Forward),
        (KeyCode::Right | KeyCode::Char('l'), true) => Action::Indent,
        (KeyCode::Left | KeyCode::Char('h'), true) => Action::Unindent,
        (KeyCode::Char('n'), true) => Action::CreateAuntUncle,
        (KeyCode::Enter, true) => Action::CreateAuntUncle,
        (KeyCode::Char('c'), true) => Action::Quit,
        (KeyCode::Char('s'), true) => Action::Save,

        // Cursor and status
        (KeyCode::Up | KeyCode::Char('k'), false) => Action::Navigate(Direction::Backward),
        (KeyCode::Down | KeyCode::Char('j'), false) => Action::Navigate(Direction::Forward),
        (KeyCode::Left | KeyCode::Char('h'), false) => Action::ChangeStatus(Direction::Backward),
        (KeyCode::Right | KeyCode::Char('l'), false) => Action::ChangeStatus(Direction::Forward),

        (KeyCode::Char('n'), false) => Action::CreateSibling,
        (KeyCode::Char('N'), false) => Action::CreateChild,
        (KeyCode::Enter, false) if shift => Action::CreateChild,
        (KeyCode::Enter, false) => Action::BeginEdit,
        (KeyCode::Char('d'), false) => Action::DeleteSelected,
        (KeyCode::Char('u'), false) => Action::Undo,
        (KeyCode::Char('r'), false) => Action::Redo,
        (KeyCode::Char('y'), false) => Action::Copy,
        (KeyCode::Char('p'), false) => Action::Paste,
        (KeyCode::Char('P'), false) => Action::PasteAsChild,
        (KeyCode::Char('?'), false) => Action::ToggleHelp,
        (KeyCode::Esc, false) => Action::DismissError,
        (KeyCode::Char('q'), false) => Action::Quit,
        _ => return None,
    };
    Some(action)
}
