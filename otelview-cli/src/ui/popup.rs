//! Detail popup listing every property of the selected signal.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use otelview_core::dashboard::PopupFrame;
use otelview_core::props::PropertyList;

use super::styles;

pub fn draw(frame: &mut Frame, area: Rect, lists: &[PropertyList]) {
    let PopupFrame { x, y, width, height } = PopupFrame::centered(area.width, area.height);
    let rect = Rect::new(area.x + x, area.y + y, width, height);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::popup_frame())
        .style(styles::popup_text());

    frame.render_widget(Clear, rect);
    frame.render_widget(Paragraph::new(lines(lists)).block(block), rect);
}

/// One section per list: a `+ Label` header, `| name: value` rows and a
/// blank separator. Long lines are clipped by the frame, never wrapped.
fn lines(lists: &[PropertyList]) -> Vec<Line<'static>> {
    let mut out = vec![Line::raw("")];
    for list in lists {
        out.push(Line::raw(format!(" + {}", list.label())));
        for row in list.rows() {
            out.push(Line::raw(format!(" | {}: {}", row.name, row.value)));
        }
        out.push(Line::raw(""));
    }
    out
}
