//! Grapheme-aware helpers for task titles: terminal width, truncation and
//! cursor movement inside the title editor. Byte offsets passed in must
//! lie on char boundaries.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

const TAB_WIDTH: usize = 4;
const ELLIPSIS: char = '\u{2026}';

fn is_blank(grapheme: &str) -> bool {
    grapheme.chars().all(char::is_whitespace)
}

fn grapheme_width(g: &str) -> usize {
    if g == "\t" {
        TAB_WIDTH
    } else {
        UnicodeWidthStr::width(g)
    }
}

/// Width of `s` in terminal cells
pub fn display_width(s: &str) -> usize {
    s.graphemes(true).map(grapheme_width).sum()
}

/// Cells occupied by `s[..byte_offset]`, i.e. the on-screen column of a
/// cursor at that offset.
pub fn byte_offset_to_display_col(s: &str, byte_offset: usize) -> usize {
    display_width(&s[..byte_offset.min(s.len())])
}

/// Cut `s` to at most `max_cells`, ending with `…` when anything was dropped.
/// Wide characters are never split.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    if max_cells == 0 {
        return String::new();
    }
    let budget = max_cells - 1;
    let mut used = 0;
    let mut out = String::new();
    for g in s.graphemes(true) {
        let w = grapheme_width(g);
        if used + w > budget {
            break;
        }
        used += w;
        out.push_str(g);
    }
    out.push(ELLIPSIS);
    out
}

/// Offset of the grapheme after the one at `byte_offset`; `None` at the end.
pub fn next_grapheme_boundary(s: &str, byte_offset: usize) -> Option<usize> {
    let rest = s.get(byte_offset..).filter(|r| !r.is_empty())?;
    let first = rest.graphemes(true).next().map_or(0, str::len);
    Some(byte_offset + first)
}

/// Offset of the grapheme before `byte_offset`; `None` at the start.
pub fn prev_grapheme_boundary(s: &str, byte_offset: usize) -> Option<usize> {
    if byte_offset == 0 {
        return None;
    }
    s[..byte_offset]
        .grapheme_indices(true)
        .next_back()
        .map(|(i, _)| i)
}

/// Start of the word at or before `byte_offset`, skipping any blanks
/// immediately to the left first.
pub fn word_boundary_left(s: &str, byte_offset: usize) -> usize {
    let graphemes: Vec<(usize, &str)> = s[..byte_offset].grapheme_indices(true).collect();
    let mut idx = graphemes.len();
    while idx > 0 && is_blank(graphemes[idx - 1].1) {
        idx -= 1;
    }
    while idx > 0 && !is_blank(graphemes[idx - 1].1) {
        idx -= 1;
    }
    graphemes.get(idx).map_or(0, |(i, _)| *i)
}

/// Start of the next word after `byte_offset`, or the end of `s`.
pub fn word_boundary_right(s: &str, byte_offset: usize) -> usize {
    let mut in_word = true;
    for (i, g) in s[byte_offset..].grapheme_indices(true) {
        let blank = is_blank(g);
        if in_word && blank {
            in_word = false;
        } else if !in_word && !blank {
            return byte_offset + i;
        }
    }
    s.len()
}
