use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, Mode};
use crate::util::unicode::{display_width, truncate_to_width};

/// Render the status row (bottom of screen): an error if one is pending,
/// otherwise the last status message and a key hint.
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let line = if let Some(err) = &app.error_message {
        let text = format!("ERROR: {err} (Press ESC to dismiss)");
        Line::from(Span::styled(
            truncate_to_width(&text, width),
            Style::default()
                .fg(app.theme.error)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ))
    } else {
        let hint = match app.mode {
            Mode::Navigate => "? help",
            Mode::Edit => "\u{21B5} save  esc cancel",
        };
        let mut spans = Vec::new();
        if let Some(msg) = &app.status_message {
            spans.push(Span::styled(
                truncate_to_width(msg, width),
                Style::default().fg(app.theme.status).bg(bg),
            ));
        }
        let content_width: usize = spans.iter().map(|s| display_width(&s.content)).sum();
        let hint_width = display_width(hint);
        if content_width + hint_width < width {
            let padding = width - content_width - hint_width;
            spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
            spans.push(Span::styled(hint, Style::default().fg(app.theme.dim).bg(bg)));
        }
        Line::from(spans)
    };

    let paragraph = Paragraph::new(line).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;

    fn draw(app: &App, w: u16) -> String {
        render_to_string(w, 1, |frame, area| render_status_row(frame, app, area))
    }

    #[test]
    fn test_idle_shows_help_hint() {
        let app = app_with_tasks(Vec::new());
        let out = draw(&app, 20);
        assert_eq!(out, format!("{}? help", " ".repeat(14)));
    }

    #[test]
    fn test_status_message_left_hint_right() {
        let mut app = app_with_tasks(Vec::new());
        app.status_message = Some("Clipboard is empty".into());
        let out = draw(&app, 30);
        assert!(out.starts_with("Clipboard is empty"));
        assert!(out.ends_with("? help"));
    }

    #[test]
    fn test_error_replaces_status() {
        let mut app = app_with_tasks(Vec::new());
        app.status_message = Some("Task copied to clipboard".into());
        app.error_message = Some("Save failed: disk full".into());
        let out = draw(&app, TERM_W);
        assert_eq!(out, "ERROR: Save failed: disk full (Press ESC to dismiss)");
    }

    #[test]
    fn test_edit_mode_hint() {
        let mut app = app_with_tasks(Vec::new());
        app.create_sibling();
        let out = draw(&app, 30);
        assert!(out.ends_with("\u{21B5} save  esc cancel"));
    }
}
