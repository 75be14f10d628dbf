//! Signal list and status bar.
//!
//! Rows are painted cell by cell, newest signal on the line just above the
//! status bar, so filter highlights land on exact columns.

use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;

use otelview_core::dashboard::{Dashboard, StatusMode};

use super::popup;
use super::styles;

/// Columns reserved for the heartbeat at the left of the status bar.
const LEGEND_START: u16 = 4;

pub fn render(frame: &mut Frame, dashboard: &Dashboard) {
    let area = frame.area();
    if area.height == 0 || area.width == 0 {
        return;
    }

    draw_rows(frame.buffer_mut(), area, dashboard);
    let cursor = draw_status_bar(frame.buffer_mut(), area, dashboard);
    if let Some(col) = cursor {
        frame.set_cursor_position((area.x + col, area.bottom() - 1));
    }

    if let Some(lists) = dashboard.popup() {
        popup::draw(frame, area, lists);
    }
}

fn draw_rows(buf: &mut Buffer, area: Rect, dashboard: &Dashboard) {
    let rows = area.height.saturating_sub(1);
    let history = dashboard.history();

    // i-th newest signal on the i-th row counted up from the status bar.
    for (i, y) in (0..rows).rev().enumerate() {
        let summary = history.get(i).map(|s| s.summary()).unwrap_or("");
        let style = if dashboard.cursor() == Some(i) {
            styles::selection()
        } else {
            styles::row()
        };
        let mask = dashboard.filter().highlight(summary, usize::from(area.width));
        draw_row(buf, area, area.y + y, summary, style, &mask);
    }
}

fn draw_row(buf: &mut Buffer, area: Rect, y: u16, text: &str, style: Style, mask: &[bool]) {
    let mut chars = text.chars();
    for col in 0..area.width {
        let ch = chars.next().unwrap_or(' ');
        let cell_style = if mask.get(usize::from(col)).copied().unwrap_or(false) {
            styles::selection()
        } else {
            style
        };
        if let Some(cell) = buf.cell_mut((area.x + col, y)) {
            cell.set_char(ch).set_style(cell_style);
        }
    }
}

/// Legend entries as (key, label) pairs for the current mode.
fn legend(dashboard: &Dashboard) -> Vec<(&'static str, String)> {
    let filter = dashboard.filter();
    let filter_label = if filter.is_empty() {
        "filter".to_string()
    } else {
        format!("filter [{}]", filter.as_str())
    };

    match dashboard.status_mode() {
        StatusMode::Browse => vec![
            ("↑↓", "select".to_string()),
            ("Enter", "details".to_string()),
            ("Esc", "exit".to_string()),
            ("Shift+F", "follow".to_string()),
            ("/", filter_label),
        ],
        StatusMode::Following => vec![
            ("↑↓", "stop & select".to_string()),
            ("Esc", "stop following".to_string()),
            ("/", filter_label),
        ],
        StatusMode::Editing => vec![("Find", filter.as_str().to_string())],
    }
}

/// Draw the bottom line. Returns the text cursor column while the filter is
/// being edited.
fn draw_status_bar(buf: &mut Buffer, area: Rect, dashboard: &Dashboard) -> Option<u16> {
    let y = area.bottom() - 1;
    let status = styles::status();

    let glyph = dashboard.heartbeat().glyph().unwrap_or(" ");
    for (col, symbol) in [" ", glyph, glyph, " "].into_iter().enumerate() {
        put(buf, area, col as u16, y, symbol, status);
    }

    let mut col = LEGEND_START;
    for (key, label) in legend(dashboard) {
        col = put_text(buf, area, col, y, &format!(" {key} "), styles::status_key());
        col = put_text(buf, area, col, y, &format!(" {label}  "), status);
    }
    let end = col;
    while col < area.width {
        put(buf, area, col, y, " ", status);
        col += 1;
    }

    (dashboard.status_mode() == StatusMode::Editing).then(|| end.saturating_sub(2))
}

fn put(buf: &mut Buffer, area: Rect, col: u16, y: u16, symbol: &str, style: Style) {
    if col >= area.width {
        return;
    }
    if let Some(cell) = buf.cell_mut((area.x + col, y)) {
        cell.set_symbol(symbol).set_style(style);
    }
}

/// Write `text` one char per column, clipped at the right edge. Returns the
/// column after the text as if nothing had been clipped.
fn put_text(buf: &mut Buffer, area: Rect, col: u16, y: u16, text: &str, style: Style) -> u16 {
    let mut next = col;
    let mut tmp = [0u8; 4];
    for ch in text.chars() {
        put(buf, area, next, y, ch.encode_utf8(&mut tmp), style);
        next = next.saturating_add(1);
    }
    next
}
