//! Pure text measuring and row layout for the description and list panes.
//!
//! Every character takes one column except East-Asian wide forms, which take
//! two. A wide character never straddles a row boundary.

use unicode_width::UnicodeWidthChar;

pub(crate) const ELLIPSIS: char = '…';

/// Display columns of one character: 2 for wide forms, 1 otherwise.
pub(crate) fn char_columns(c: char) -> usize {
    if c.width() == Some(2) { 2 } else { 1 }
}

pub(crate) fn display_width(text: &str) -> usize {
    text.chars().map(char_columns).sum()
}

/// Break one logical line into rows of at most `width` columns.
///
/// An empty line still takes one row. A character wider than the whole
/// pane gets a row of its own.
pub(crate) fn layout_line(line: &str, width: usize) -> Vec<String> {
    let mut rows = Vec::new();
    let mut row = String::new();
    let mut used = 0;

    for c in line.chars() {
        let columns = char_columns(c);
        if used + columns > width && !row.is_empty() {
            rows.push(std::mem::take(&mut row));
            used = 0;
        }
        row.push(c);
        used += columns;
    }
    if !row.is_empty() || rows.is_empty() {
        rows.push(row);
    }
    rows
}

/// Lay out all lines; the result's length is the content height.
pub(crate) fn layout_lines(lines: &[String], width: usize) -> Vec<String> {
    lines.iter().flat_map(|line| layout_line(line, width)).collect()
}

/// Cut `text` to `width` columns, ending in `…` when something was cut.
pub(crate) fn truncate(text: &str, width: usize) -> String {
    if display_width(text) <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let columns = char_columns(c);
        if used + columns > width - 1 {
            break;
        }
        out.push(c);
        used += columns;
    }
    out.push(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_characters_take_two_columns() {
        assert_eq!(display_width("abc"), 3);
        assert_eq!(display_width("対抗呪文"), 8);
        assert_eq!(display_width("Æther"), 5);
    }

    #[test]
    fn empty_line_takes_one_row() {
        assert_eq!(layout_line("", 10), vec![""]);
    }

    #[test]
    fn exact_fit_takes_one_row() {
        assert_eq!(layout_line("abcde", 5), vec!["abcde"]);
        assert_eq!(layout_line("abcdef", 5), vec!["abcde", "f"]);
    }

    #[test]
    fn wide_character_moves_to_next_row() {
        // 5 columns: "ab" (2) + "対" (2) = 4, next "抗" would straddle.
        assert_eq!(layout_line("ab対抗", 5), vec!["ab対", "抗"]);
    }

    #[test]
    fn content_height_sums_rows() {
        let lines = vec!["0123456789".to_string(), String::new(), "対抗呪文".to_string()];
        assert_eq!(layout_lines(&lines, 4).len(), 3 + 1 + 2);
    }

    #[test]
    fn narrow_pane_still_makes_progress() {
        assert_eq!(layout_line("対抗", 1), vec!["対", "抗"]);
    }

    #[test]
    fn truncate_adds_ellipsis() {
        assert_eq!(truncate("Lightning Bolt", 20), "Lightning Bolt");
        assert_eq!(truncate("Lightning Bolt", 8), "Lightni…");
        assert_eq!(display_width(&truncate("対抗呪文", 5)), 5);
        assert_eq!(truncate("abc", 0), "");
    }
}
