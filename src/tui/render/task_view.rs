use std::collections::HashSet;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::task::{Task, TaskId, TaskStatus};
use crate::ops::tree;
use crate::tui::app::{App, Mode};
use crate::util::unicode::{display_width, next_grapheme_boundary, truncate_to_width};

pub const EMPTY_MESSAGE: &str =
    "No tasks yet. Press 'n' to create your first task, or 'q' to quit.";

const CURSOR_MARK: &str = "\u{2590} ";
const CONNECTOR: &str = "\u{2570} ";

/// Bullet for each task status
fn status_bullet(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Todo => "\u{25CB} ",
        TaskStatus::Active => "\u{25CE} ",
        TaskStatus::Done => "\u{25C9} ",
    }
}

/// Render the task list content area
pub fn render_task_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;
    if app.tasks.is_empty() {
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                EMPTY_MESSAGE,
                Style::default()
                    .fg(app.theme.dim)
                    .bg(bg)
                    .add_modifier(Modifier::ITALIC),
            )),
        ];
        frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), area);
        return;
    }

    let visible_height = area.height as usize;
    if let Some(row) = app.cursor_row() {
        app.scroll_offset = scroll_to_show(app.scroll_offset, row, visible_height);
    }
    let scroll = app.scroll_offset;
    let app: &App = app;

    let mut rows = Vec::new();
    collect_rows(&app.tasks, 0, &mut rows);

    let ancestors: HashSet<TaskId> = match &app.cursor {
        Some(id) => tree::parent_chain(&app.tasks, id).into_iter().collect(),
        None => HashSet::new(),
    };

    let width = area.width as usize;
    let lines: Vec<Line> = rows
        .iter()
        .skip(scroll)
        .take(visible_height)
        .map(|(task, depth)| {
            let selected = app.cursor.as_ref() == Some(&task.id);
            let row = RowInfo {
                depth: *depth,
                selected,
                ancestor: ancestors.contains(&task.id),
            };
            render_task_line(app, task, &row, width)
        })
        .collect();

    let paragraph = Paragraph::new(lines).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

/// New scroll offset that keeps `row` inside a window of `height` rows
pub fn scroll_to_show(offset: usize, row: usize, height: usize) -> usize {
    if height == 0 {
        return row;
    }
    if row < offset {
        row
    } else if row >= offset + height {
        row + 1 - height
    } else {
        offset
    }
}

fn collect_rows<'a>(tasks: &'a [Task], depth: usize, rows: &mut Vec<(&'a Task, usize)>) {
    for task in tasks {
        rows.push((task, depth));
        collect_rows(&task.subtasks, depth + 1, rows);
    }
}

struct RowInfo {
    depth: usize,
    selected: bool,
    ancestor: bool,
}

fn render_task_line<'a>(app: &App, task: &Task, row: &RowInfo, width: usize) -> Line<'a> {
    let theme = &app.theme;
    let bg = theme.background;
    let editing = app.mode == Mode::Edit;
    let mut spans: Vec<Span> = Vec::new();

    if row.selected {
        spans.push(Span::styled(CURSOR_MARK, Style::default().fg(theme.cursor).bg(bg)));
    } else {
        spans.push(Span::styled("  ", Style::default().bg(bg)));
    }

    if row.depth > 0 {
        let indent = format!("{}{}", "  ".repeat(row.depth - 1), CONNECTOR);
        spans.push(Span::styled(indent, Style::default().fg(theme.dim).bg(bg)));
    }

    let mut bullet_style = Style::default().fg(theme.status_color(task.status)).bg(bg);
    if editing && !row.selected {
        bullet_style = bullet_style.fg(theme.dim);
    }
    spans.push(Span::styled(status_bullet(task.status), bullet_style));

    let used: usize = spans.iter().map(|s| display_width(&s.content)).sum();
    let available = width.saturating_sub(used);

    if editing && row.selected {
        spans.extend(edit_spans(app, available));
        return Line::from(spans);
    }

    let mut style = Style::default().fg(theme.status_color(task.status)).bg(bg);
    match task.status {
        TaskStatus::Done => style = style.add_modifier(Modifier::CROSSED_OUT),
        TaskStatus::Todo if row.ancestor => style = style.fg(theme.text_bright),
        _ => {}
    }
    if row.ancestor {
        style = style.add_modifier(Modifier::BOLD);
    }
    if row.selected {
        style = style.add_modifier(Modifier::UNDERLINED);
    }
    if editing {
        style = style.fg(theme.dim);
    }
    spans.push(Span::styled(truncate_to_width(&task.title, available), style));
    Line::from(spans)
}

/// The edit buffer with a block cursor, scrolled so the cursor stays visible
fn edit_spans<'a>(app: &App, available: usize) -> Vec<Span<'a>> {
    let bg = app.theme.background;
    let text_style = Style::default().fg(app.theme.text_bright).bg(bg);
    let cursor_style = text_style.add_modifier(Modifier::REVERSED);
    let buffer = app.edit_buffer.as_str();
    let cursor = app.edit_cursor.min(buffer.len());

    // Drop leading graphemes until the cursor cell fits
    let mut start = 0;
    while available > 0 && display_width(&buffer[start..cursor]) >= available {
        match next_grapheme_boundary(buffer, start) {
            Some(next) if next <= cursor => start = next,
            _ => break,
        }
    }

    let before = &buffer[start..cursor];
    let (under, after) = match next_grapheme_boundary(buffer, cursor) {
        Some(next) => (&buffer[cursor..next], &buffer[next..]),
        None => (" ", ""),
    };
    let room = available.saturating_sub(display_width(before) + display_width(under));
    vec![
        Span::styled(before.to_string(), text_style),
        Span::styled(under.to_string(), cursor_style),
        Span::styled(truncate_to_width(after, room), text_style),
    ]
}
