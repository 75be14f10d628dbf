//! Dashboard state machine.
//!
//! All input (keys, accepted signals, resizes) funnels through [`reduce`],
//! which mutates the [`Dashboard`] and tells the caller whether to redraw
//! or exit. The dashboard owns the history buffer; nothing else writes it.

use std::sync::Arc;

use crate::filter::SubstringFilter;
use crate::heartbeat::Heartbeat;
use crate::history::HistoryBuffer;
use crate::props::PropertyList;
use crate::signal::Signal;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    EditingFilter,
}

/// Keys the dashboard understands, already decoded from the terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Enter,
    Esc,
    Backspace,
    Char(char),
    /// Ctrl+C
    Interrupt,
}

#[derive(Clone, Debug)]
pub enum DashboardEvent {
    Key(Key),
    Signal(Signal),
    Resize { width: u16, height: u16 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reaction {
    Idle,
    Redraw,
    Exit,
}

/// Which legend the status bar shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusMode {
    Browse,
    Following,
    Editing,
}

#[derive(Debug)]
pub struct Dashboard {
    history: HistoryBuffer,
    /// Index into the newest-first view; `None` when nothing is selected.
    cursor: Option<usize>,
    follow: bool,
    filter: SubstringFilter,
    mode: InputMode,
    popup: Option<Vec<PropertyList>>,
    width: u16,
    height: u16,
    pulse: Arc<Heartbeat>,
}

pub fn reduce(dashboard: &mut Dashboard, event: DashboardEvent) -> Reaction {
    match event {
        DashboardEvent::Key(key) => dashboard.handle_key(key),
        DashboardEvent::Signal(signal) => dashboard.accept(signal),
        DashboardEvent::Resize { width, height } => dashboard.resize(width, height),
    }
}

impl Dashboard {
    pub fn new(
        history: HistoryBuffer,
        filter: SubstringFilter,
        (width, height): (u16, u16),
        pulse: Arc<Heartbeat>,
    ) -> Self {
        Self {
            history,
            cursor: None,
            follow: true,
            filter,
            mode: InputMode::Normal,
            popup: None,
            width,
            height,
            pulse,
        }
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn is_following(&self) -> bool {
        self.follow
    }

    pub fn filter(&self) -> &SubstringFilter {
        &self.filter
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn popup(&self) -> Option<&[PropertyList]> {
        self.popup.as_deref()
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn heartbeat(&self) -> &Heartbeat {
        &self.pulse
    }

    /// Rows available for signals; the status bar takes the last line.
    pub fn viewport_rows(&self) -> usize {
        usize::from(self.height.saturating_sub(1))
    }

    pub fn status_mode(&self) -> StatusMode {
        if self.mode == InputMode::EditingFilter {
            StatusMode::Editing
        } else if self.follow {
            StatusMode::Following
        } else {
            StatusMode::Browse
        }
    }

    /// Highest selectable index, `None` when nothing is selectable.
    fn max_cursor(&self) -> Option<usize> {
        self.history
            .len()
            .min(self.viewport_rows())
            .checked_sub(1)
    }

    fn handle_key(&mut self, key: Key) -> Reaction {
        if key == Key::Interrupt {
            return Reaction::Exit;
        }
        // An open popup swallows everything except Escape.
        if self.popup.is_some() {
            return match key {
                Key::Esc => self.escape(),
                _ => Reaction::Idle,
            };
        }

        match key {
            Key::Up => self.move_up(),
            Key::Down => self.move_down(),
            Key::Esc => self.escape(),
            Key::Enter => self.confirm(),
            Key::Backspace => {
                if self.mode == InputMode::EditingFilter && self.filter.pop() {
                    Reaction::Redraw
                } else {
                    Reaction::Idle
                }
            }
            Key::Char(c) if self.mode == InputMode::EditingFilter => {
                if c.is_control() {
                    return Reaction::Idle;
                }
                self.filter.push(c);
                Reaction::Redraw
            }
            Key::Char('F') if !self.follow => {
                self.follow = true;
                self.cursor = None;
                Reaction::Redraw
            }
            Key::Char('/') => {
                self.mode = InputMode::EditingFilter;
                Reaction::Redraw
            }
            Key::Char(_) | Key::Interrupt => Reaction::Idle,
        }
    }

    /// Towards older entries.
    fn move_up(&mut self) -> Reaction {
        self.follow = false;
        self.cursor = match (self.cursor, self.max_cursor()) {
            (_, None) => None,
            (None, Some(_)) => Some(0),
            (Some(c), Some(max)) => Some((c + 1).min(max)),
        };
        Reaction::Redraw
    }

    /// Towards the newest entry.
    fn move_down(&mut self) -> Reaction {
        self.follow = false;
        self.cursor = match (self.cursor, self.max_cursor()) {
            (_, None) => None,
            (Some(c), Some(max)) => Some(c.saturating_sub(1).min(max)),
            (None, Some(_)) => Some(0),
        };
        Reaction::Redraw
    }

    fn escape(&mut self) -> Reaction {
        if self.mode == InputMode::EditingFilter {
            self.mode = InputMode::Normal;
            Reaction::Redraw
        } else if self.follow {
            self.follow = false;
            self.cursor = None;
            Reaction::Redraw
        } else if self.popup.is_some() {
            self.popup = None;
            Reaction::Redraw
        } else {
            Reaction::Exit
        }
    }

    fn confirm(&mut self) -> Reaction {
        if self.mode == InputMode::EditingFilter {
            self.mode = InputMode::Normal;
            return Reaction::Redraw;
        }
        match self.cursor.and_then(|i| self.history.get(i)) {
            Some(signal) => {
                self.popup = Some(signal.properties().to_vec());
                Reaction::Redraw
            }
            None => Reaction::Idle,
        }
    }

    /// Filtering only applies to arriving signals, never retroactively.
    fn accept(&mut self, signal: Signal) -> Reaction {
        self.pulse.tick();
        if self.follow && self.filter.matches(&signal) {
            self.history.append(signal);
            Reaction::Redraw
        } else {
            Reaction::Idle
        }
    }

    fn resize(&mut self, width: u16, height: u16) -> Reaction {
        if (width, height) == (self.width, self.height) {
            return Reaction::Idle;
        }
        self.width = width;
        self.height = height;
        self.cursor = match (self.cursor, self.max_cursor()) {
            (Some(c), Some(max)) => Some(c.min(max)),
            _ => None,
        };
        Reaction::Redraw
    }
}

/// Screen rectangle of the detail popup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PopupFrame {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl PopupFrame {
    /// Centered box with a margin of 5% of each dimension, at least 2
    /// cells. A terminal too small for the margin gets a full-screen box.
    pub fn centered(width: u16, height: u16) -> Self {
        fn margin(extent: u16) -> u16 {
            let m = (u32::from(extent) * 5 / 100).max(2) as u16;
            if m.saturating_mul(2) > extent { 0 } else { m }
        }
        let (mx, my) = (margin(width), margin(height));
        Self {
            x: mx,
            y: my,
            width: width - 2 * mx,
            height: height - 2 * my,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props::Origin;
    use crate::signal::{SignalKind, Timestamp};

    fn signal(summary: &str) -> Signal {
        let mut props = PropertyList::new(Origin::Record);
        props.add_str("Body", summary);
        Signal::new(SignalKind::Log, Timestamp::UNKNOWN, summary, vec![props])
    }

    fn dashboard(rows: u16) -> Dashboard {
        Dashboard::new(
            HistoryBuffer::new(100),
            SubstringFilter::new(),
            (80, rows + 1),
            Arc::new(Heartbeat::new()),
        )
    }

    fn filled(rows: u16, count: usize) -> Dashboard {
        let mut d = dashboard(rows);
        for i in 0..count {
            reduce(&mut d, DashboardEvent::Signal(signal(&format!("s{i}"))));
        }
        d
    }

    fn key(d: &mut Dashboard, key: Key) -> Reaction {
        reduce(d, DashboardEvent::Key(key))
    }

    #[test]
    fn test_starts_following_without_cursor() {
        let d = dashboard(10);
        assert!(d.is_following());
        assert_eq!(d.cursor(), None);
        assert_eq!(d.status_mode(), StatusMode::Following);
        assert_eq!(d.viewport_rows(), 10);
    }

    #[test]
    fn test_cursor_clamped_to_buffer_length() {
        let mut d = filled(10, 3);
        for _ in 0..10 {
            key(&mut d, Key::Up);
            assert!(d.cursor().unwrap() <= 2);
        }
        assert_eq!(d.cursor(), Some(2));
        assert!(!d.is_following());
    }

    #[test]
    fn test_cursor_clamped_to_viewport() {
        let mut d = filled(2, 3);
        for _ in 0..10 {
            key(&mut d, Key::Up);
            assert!(d.cursor().unwrap() <= 1);
        }
        assert_eq!(d.cursor(), Some(1));
    }

    #[test]
    fn test_move_down_stops_at_newest() {
        let mut d = filled(10, 3);
        key(&mut d, Key::Up);
        key(&mut d, Key::Up);
        assert_eq!(d.cursor(), Some(1));
        key(&mut d, Key::Down);
        key(&mut d, Key::Down);
        key(&mut d, Key::Down);
        assert_eq!(d.cursor(), Some(0));
        assert!(!d.is_following());
    }

    #[test]
    fn test_moving_on_empty_buffer_selects_nothing() {
        let mut d = dashboard(10);
        assert_eq!(key(&mut d, Key::Up), Reaction::Redraw);
        assert_eq!(d.cursor(), None);
        assert!(!d.is_following());
        assert_eq!(key(&mut d, Key::Enter), Reaction::Idle);
        assert!(d.popup().is_none());
    }

    #[test]
    fn test_resume_follow() {
        let mut d = filled(10, 3);
        key(&mut d, Key::Up);
        assert_eq!(key(&mut d, Key::Char('F')), Reaction::Redraw);
        assert!(d.is_following());
        assert_eq!(d.cursor(), None);

        // Already following: no-op.
        assert_eq!(key(&mut d, Key::Char('F')), Reaction::Idle);
    }

    #[test]
    fn test_escape_exits_filter_editing_first() {
        let mut d = dashboard(10);
        key(&mut d, Key::Char('/'));
        assert_eq!(d.mode(), InputMode::EditingFilter);
        assert!(d.is_following());

        assert_eq!(key(&mut d, Key::Esc), Reaction::Redraw);
        assert_eq!(d.mode(), InputMode::Normal);
        assert!(d.is_following());
    }

    #[test]
    fn test_escape_stops_following() {
        let mut d = dashboard(10);
        assert_eq!(key(&mut d, Key::Esc), Reaction::Redraw);
        assert!(!d.is_following());
        assert_eq!(d.cursor(), None);
        assert_eq!(d.status_mode(), StatusMode::Browse);
    }

    #[test]
    fn test_escape_closes_popup() {
        let mut d = filled(10, 2);
        key(&mut d, Key::Up);
        assert_eq!(key(&mut d, Key::Enter), Reaction::Redraw);
        assert_eq!(d.popup().unwrap()[0].rows()[0].value, "s1");

        assert_eq!(key(&mut d, Key::Esc), Reaction::Redraw);
        assert!(d.popup().is_none());
    }

    #[test]
    fn test_escape_without_anything_to_undo_exits() {
        let mut d = dashboard(10);
        d.follow = false;
        assert_eq!(key(&mut d, Key::Esc), Reaction::Exit);
    }

    #[test]
    fn test_popup_swallows_keys() {
        let mut d = filled(10, 2);
        key(&mut d, Key::Up);
        key(&mut d, Key::Enter);
        assert_eq!(key(&mut d, Key::Up), Reaction::Idle);
        assert_eq!(key(&mut d, Key::Char('/')), Reaction::Idle);
        assert_eq!(d.cursor(), Some(0));
        assert_eq!(d.mode(), InputMode::Normal);
        assert_eq!(key(&mut d, Key::Interrupt), Reaction::Exit);
    }

    #[test]
    fn test_filter_editing() {
        let mut d = dashboard(10);
        assert_eq!(key(&mut d, Key::Backspace), Reaction::Idle);
        assert_eq!(key(&mut d, Key::Char('x')), Reaction::Idle);

        key(&mut d, Key::Char('/'));
        key(&mut d, Key::Char('e'));
        key(&mut d, Key::Char('r'));
        key(&mut d, Key::Char('\u{7}'));
        key(&mut d, Key::Char('/'));
        key(&mut d, Key::Char('F'));
        assert_eq!(d.filter().as_str(), "er/F");
        assert_eq!(d.status_mode(), StatusMode::Editing);

        key(&mut d, Key::Backspace);
        key(&mut d, Key::Backspace);
        assert_eq!(d.filter().as_str(), "er");

        assert_eq!(key(&mut d, Key::Enter), Reaction::Redraw);
        assert_eq!(d.mode(), InputMode::Normal);
        assert_eq!(d.filter().as_str(), "er");
    }

    #[test]
    fn test_follow_admission_uses_filter() {
        let mut d = dashboard(10);
        let x = || Signal::new(SignalKind::Log, Timestamp::UNKNOWN, "X", vec![]);

        assert_eq!(reduce(&mut d, DashboardEvent::Signal(x())), Reaction::Redraw);
        d.filter = SubstringFilter::with_pattern("X");
        assert_eq!(reduce(&mut d, DashboardEvent::Signal(x())), Reaction::Redraw);
        d.filter = SubstringFilter::with_pattern("Y");
        assert_eq!(reduce(&mut d, DashboardEvent::Signal(x())), Reaction::Idle);

        assert_eq!(d.history().len(), 2);
        assert_eq!(d.heartbeat().received(), 3);
    }

    #[test]
    fn test_not_following_discards_but_ticks() {
        let mut d = dashboard(10);
        key(&mut d, Key::Esc);
        assert_eq!(reduce(&mut d, DashboardEvent::Signal(signal("a"))), Reaction::Idle);
        assert!(d.history().is_empty());
        assert_eq!(d.heartbeat().received(), 1);
    }

    #[test]
    fn test_resize_reclamps_cursor() {
        let mut d = filled(10, 5);
        for _ in 0..5 {
            key(&mut d, Key::Up);
        }
        assert_eq!(d.cursor(), Some(4));

        assert_eq!(
            reduce(&mut d, DashboardEvent::Resize { width: 80, height: 3 }),
            Reaction::Redraw
        );
        assert_eq!(d.cursor(), Some(1));
        assert_eq!(
            reduce(&mut d, DashboardEvent::Resize { width: 80, height: 3 }),
            Reaction::Idle
        );
    }

    #[test]
    fn test_popup_frame() {
        assert_eq!(
            PopupFrame::centered(100, 40),
            PopupFrame { x: 5, y: 2, width: 90, height: 36 }
        );
        assert_eq!(
            PopupFrame::centered(20, 10),
            PopupFrame { x: 2, y: 2, width: 16, height: 6 }
        );
        assert_eq!(
            PopupFrame::centered(3, 3),
            PopupFrame { x: 0, y: 0, width: 3, height: 3 }
        );
    }
}
