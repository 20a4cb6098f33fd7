use crate::ops::tree::Direction;
use crate::tui::app::{App, Mode, Outcome};

/// A logical command, independent of the key that triggered it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Navigate(Direction),
    ChangeStatus(Direction),
    MoveTask(Direction),
    Indent,
    Unindent,
    CreateSibling,
    CreateChild,
    CreateAuntUncle,
    DeleteSelected,
    BeginEdit,
    CommitEdit(String),
    CancelEdit,
    /// Commit the edit buffer, then open a new task below
    CommitAndCreateSibling,
    /// Commit the edit buffer, then open a new task in the parent
    CommitAndCreateAuntUncle,
    Undo,
    Redo,
    Copy,
    Paste,
    PasteAsChild,
    ToggleHelp,
    DismissError,
    Save,
    Quit,
}

impl App {
    /// Dispatch one command to completion
    pub fn execute(&mut self, action: Action) -> Outcome {
        match action {
            Action::Navigate(dir) => self.navigate(dir),
            Action::ChangeStatus(dir) => self.change_status(dir),
            Action::MoveTask(dir) => self.move_task(dir),
            Action::Indent => self.indent(),
            Action::Unindent => self.unindent(),
            Action::CreateSibling => self.create_sibling(),
            Action::CreateChild => self.create_child(),
            Action::CreateAuntUncle => self.create_aunt_uncle(),
            Action::DeleteSelected => self.delete_selected(),
            Action::BeginEdit => self.begin_edit(),
            Action::CommitEdit(text) => self.commit_edit(&text),
            Action::CancelEdit => self.cancel_edit(),
            Action::CommitAndCreateSibling => self.commit_and_create_sibling(),
            Action::CommitAndCreateAuntUncle => self.commit_and_create_aunt_uncle(),
            Action::Undo => self.undo(),
            Action::Redo => self.redo(),
            Action::Copy => self.copy_selected(),
            Action::Paste => self.paste(false),
            Action::PasteAsChild => self.paste(true),
            Action::ToggleHelp => {
                self.show_help = !self.show_help;
                Outcome::Changed
            }
            Action::DismissError => self.dismiss_error(),
            Action::Save => self.save_now(),
            Action::Quit => self.quit(),
        }
    }
}

// ---------------------------------------------------------------------------
// Help table
// ---------------------------------------------------------------------------

/// Grouping used to order the help overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ActionCategory {
    Navigate,
    Status,
    Move,
    Create,
    Edit,
    History,
    Clipboard,
    System,
}

impl ActionCategory {
    pub fn title(self) -> &'static str {
        match self {
            ActionCategory::Navigate => "Navigate",
            ActionCategory::Status => "Status",
            ActionCategory::Move => "Move",
            ActionCategory::Create => "Create",
            ActionCategory::Edit => "Edit",
            ActionCategory::History => "History",
            ActionCategory::Clipboard => "Clipboard",
            ActionCategory::System => "System",
        }
    }
}

/// One line of the help overlay
#[derive(Debug, Clone, Copy)]
pub struct KeyHelp {
    pub id: &'static str,
    pub keys: &'static str,
    pub label: &'static str,
    pub modes: &'static [Mode],
    pub category: ActionCategory,
}

const NAV: &[Mode] = &[Mode::Navigate];
const EDIT: &[Mode] = &[Mode::Edit];

#[rustfmt::skip]
const KEY_HELP: &[KeyHelp] = &[
    KeyHelp { id: "nav_up", keys: "↑/k", label: "move up", modes: NAV, category: ActionCategory::Navigate },
    KeyHelp { id: "nav_down", keys: "↓/j", label: "move down", modes: NAV, category: ActionCategory::Navigate },
    KeyHelp { id: "status_back", keys: "←/h", label: "status back", modes: NAV, category: ActionCategory::Status },
    KeyHelp { id: "status_fwd", keys: "→/l", label: "status forward", modes: NAV, category: ActionCategory::Status },
    KeyHelp { id: "move_up", keys: "ctrl+↑/k", label: "move task up", modes: NAV, category: ActionCategory::Move },
    KeyHelp { id: "move_down", keys: "ctrl+↓/j", label: "move task down", modes: NAV, category: ActionCategory::Move },
    KeyHelp { id: "indent", keys: "ctrl+→/l", label: "indent task", modes: NAV, category: ActionCategory::Move },
    KeyHelp { id: "unindent", keys: "ctrl+←/h", label: "unindent task", modes: NAV, category: ActionCategory::Move },
    KeyHelp { id: "new_below", keys: "n", label: "new task below", modes: NAV, category: ActionCategory::Create },
    KeyHelp { id: "new_child", keys: "N", label: "new subtask", modes: NAV, category: ActionCategory::Create },
    KeyHelp { id: "new_parent", keys: "ctrl+n", label: "new task in parent", modes: NAV, category: ActionCategory::Create },
    KeyHelp { id: "edit", keys: "↵", label: "edit task", modes: NAV, category: ActionCategory::Edit },
    KeyHelp { id: "delete", keys: "d", label: "delete task", modes: NAV, category: ActionCategory::Edit },
    KeyHelp { id: "commit", keys: "↵", label: "save", modes: EDIT, category: ActionCategory::Edit },
    KeyHelp { id: "cancel", keys: "esc", label: "cancel", modes: EDIT, category: ActionCategory::Edit },
    KeyHelp { id: "commit_below", keys: "shift+↵/alt+↵", label: "save & new task below", modes: EDIT, category: ActionCategory::Edit },
    KeyHelp { id: "commit_parent", keys: "ctrl+↵/ctrl+o", label: "save & new task in parent", modes: EDIT, category: ActionCategory::Edit },
    KeyHelp { id: "delete_word", keys: "ctrl+w", label: "delete word", modes: EDIT, category: ActionCategory::Edit },
    KeyHelp { id: "clear_line", keys: "ctrl+u", label: "clear to start", modes: EDIT, category: ActionCategory::Edit },
    KeyHelp { id: "undo", keys: "u", label: "undo", modes: NAV, category: ActionCategory::History },
    KeyHelp { id: "redo", keys: "r", label: "redo", modes: NAV, category: ActionCategory::History },
    KeyHelp { id: "copy", keys: "y", label: "copy title", modes: NAV, category: ActionCategory::Clipboard },
    KeyHelp { id: "paste", keys: "p", label: "paste as task below", modes: NAV, category: ActionCategory::Clipboard },
    KeyHelp { id: "paste_child", keys: "P", label: "paste as subtask", modes: NAV, category: ActionCategory::Clipboard },
    KeyHelp { id: "dismiss", keys: "esc", label: "dismiss error", modes: NAV, category: ActionCategory::System },
    KeyHelp { id: "help", keys: "?", label: "toggle help", modes: NAV, category: ActionCategory::System },
    KeyHelp { id: "save", keys: "ctrl+s", label: "save now", modes: NAV, category: ActionCategory::System },
    KeyHelp { id: "quit", keys: "q/ctrl+c", label: "quit", modes: NAV, category: ActionCategory::System },
    KeyHelp { id: "quit_editing", keys: "ctrl+c", label: "quit", modes: EDIT, category: ActionCategory::System },
];

/// Help lines available in `mode`, grouped by category
pub fn help_for_mode(mode: Mode) -> Vec<&'static KeyHelp> {
    let mut entries: Vec<&KeyHelp> = KEY_HELP.iter().filter(|h| h.modes.contains(&mode)).collect();
    entries.sort_by_key(|h| h.category);
    entries
}
