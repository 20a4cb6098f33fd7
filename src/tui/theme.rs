use ratatui::style::Color;

use crate::model::config::UiConfig;
use crate::model::task::TaskStatus;

/// Parsed color theme for the TUI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    /// Ancestors of the selected task
    pub text_bright: Color,
    pub dim: Color,
    pub active: Color,
    pub done: Color,
    /// The `▐` marker on the selected row
    pub cursor: Color,
    pub error: Color,
    pub header: Color,
    pub status: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: Color::Reset,
            text: Color::Rgb(0xC8, 0xC8, 0xC8),
            text_bright: Color::Rgb(0xFF, 0xFF, 0xFF),
            dim: Color::Rgb(0x80, 0x80, 0x80),
            active: Color::Rgb(0x44, 0xFF, 0x88),
            done: Color::Rgb(0x80, 0x80, 0x80),
            cursor: Color::Rgb(0xFF, 0x44, 0x44),
            error: Color::Rgb(0xFF, 0x44, 0x44),
            header: Color::Rgb(0x44, 0xDD, 0xFF),
            status: Color::Rgb(0xFF, 0xD7, 0x00),
        }
    }
}

/// Parse a hex color string like "#FF4444" into an RGB Color
fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

impl Theme {
    /// Build a theme from `[ui.colors]`. Unknown slots and malformed
    /// values are ignored.
    pub fn from_config(ui: &UiConfig) -> Self {
        let mut theme = Theme::default();
        for (key, value) in &ui.colors {
            let Some(color) = parse_hex_color(value) else {
                continue;
            };
            match key.as_str() {
                "background" => theme.background = color,
                "text" => theme.text = color,
                "text_bright" => theme.text_bright = color,
                "dim" => theme.dim = color,
                "active" => theme.active = color,
                "done" => theme.done = color,
                "cursor" => theme.cursor = color,
                "error" => theme.error = color,
                "header" => theme.header = color,
                "status" => theme.status = color,
                _ => {}
            }
        }
        theme
    }

    /// Title color for a task status
    pub fn status_color(&self, status: TaskStatus) -> Color {
        match status {
            TaskStatus::Todo => self.text,
            TaskStatus::Active => self.active,
            TaskStatus::Done => self.done,
        }
    }
}
