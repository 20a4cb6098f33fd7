pub mod help_overlay;
pub mod status_row;
pub mod task_view;

#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use super::app::App;

pub const HEADER_TITLE: &str = "Task Manager";

/// Main render function, dispatches to sub-renderers
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    // Layout: header | blank | task list | status row
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(frame, app, chunks[0]);
    task_view::render_task_view(frame, app, chunks[2]);
    status_row::render_status_row(frame, app, chunks[3]);

    if app.show_help {
        help_overlay::render_help_overlay(frame, app, frame.area());
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = match &app.list_name {
        Some(name) => format!("{HEADER_TITLE} - {name}"),
        None => HEADER_TITLE.to_string(),
    };
    let style = Style::default()
        .fg(app.theme.header)
        .bg(app.theme.background)
        .add_modifier(Modifier::BOLD);
    let line = Line::from(Span::styled(title, style));
    frame.render_widget(Paragraph::new(line), area);
}
