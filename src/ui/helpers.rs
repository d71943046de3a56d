use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Cursor position after `prefix` and `value_len` characters on line `row` of
/// `inner`. Long values pin the cursor to the last column instead of
/// overflowing.
pub(crate) fn cursor_position(
    inner: Rect,
    prefix: &str,
    value_len: usize,
    row: usize,
) -> (u16, u16) {
    let offset = prefix.chars().count().saturating_add(value_len);
    let offset = u16::try_from(offset).unwrap_or(u16::MAX);
    let last_col = inner.right().saturating_sub(1).max(inner.x);
    let x = inner.x.saturating_add(offset).min(last_col);

    let row = u16::try_from(row).unwrap_or(u16::MAX);
    let last_row = inner.bottom().saturating_sub(1).max(inner.y);
    let y = inner.y.saturating_add(row).min(last_row);

    (x, y)
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}
