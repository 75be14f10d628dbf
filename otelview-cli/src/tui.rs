use std::io;
use std::sync::Arc;

use anyhow::Context;
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures_util::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::{Notify, mpsc};
use tracing::info;

use otelview_core::config::ViewerConfig;
use otelview_core::dashboard::{Dashboard, DashboardEvent, Key, Reaction, reduce};
use otelview_core::filter::SubstringFilter;
use otelview_core::heartbeat::Heartbeat;
use otelview_core::history::HistoryBuffer;
use otelview_core::signal::Signal;

use crate::pulse::spawn_pulse;
use crate::ui;

type Term = Terminal<CrosstermBackend<io::Stdout>>;

fn setup_terminal() -> io::Result<Term> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

fn restore_terminal(mut terminal: Term) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the interactive dashboard until the user exits.
pub async fn run(config: &ViewerConfig, signals: mpsc::Receiver<Signal>) -> anyhow::Result<()> {
    let mut terminal = setup_terminal().context("failed to initialize the terminal")?;
    let result = event_loop(&mut terminal, config, signals).await;
    restore_terminal(terminal).context("failed to restore the terminal")?;
    info!(event = "dashboard_exit");
    result
}

async fn event_loop(
    terminal: &mut Term,
    config: &ViewerConfig,
    mut signals: mpsc::Receiver<Signal>,
) -> anyhow::Result<()> {
    let size = terminal.size()?;
    let heartbeat = Arc::new(Heartbeat::new());
    let redraw = Arc::new(Notify::new());
    spawn_pulse(heartbeat.clone(), redraw.clone());

    let mut dashboard = Dashboard::new(
        HistoryBuffer::new(config.capacity),
        SubstringFilter::with_pattern(config.filter.clone()),
        (size.width, size.height),
        heartbeat,
    );
    let mut events = EventStream::new();
    let mut dirty = true;

    loop {
        if dirty {
            terminal.draw(|frame| ui::render(frame, &dashboard))?;
            dirty = false;
        }

        let reaction = tokio::select! {
            Some(signal) = signals.recv() => reduce(&mut dashboard, DashboardEvent::Signal(signal)),
            maybe_event = events.next() => match maybe_event {
                Some(Ok(event)) => match translate(event) {
                    Some(event) => reduce(&mut dashboard, event),
                    None => Reaction::Idle,
                },
                Some(Err(err)) => return Err(err).context("failed to read terminal input"),
                None => Reaction::Exit,
            },
            _ = redraw.notified() => Reaction::Redraw,
        };

        match reaction {
            Reaction::Exit => return Ok(()),
            Reaction::Redraw => dirty = true,
            Reaction::Idle => {}
        }
    }
}

/// Map a terminal event to a dashboard event. Key releases and repeats are
/// ignored, as are keys the dashboard has no binding for.
fn translate(event: Event) -> Option<DashboardEvent> {
    match event {
        Event::Resize(width, height) => Some(DashboardEvent::Resize { width, height }),
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) => decode_key(code, modifiers).map(DashboardEvent::Key),
        _ => None,
    }
}

fn decode_key(code: KeyCode, modifiers: KeyModifiers) -> Option<Key> {
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    match code {
        KeyCode::Char('c') if ctrl => Some(Key::Interrupt),
        KeyCode::Char(_) if ctrl => None,
        KeyCode::Char(c) => Some(Key::Char(c)),
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Esc => Some(Key::Esc),
        KeyCode::Backspace => Some(Key::Backspace),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyEventState;

    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers, kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind,
            state: KeyEventState::NONE,
        })
    }

    fn pressed(code: KeyCode) -> Option<DashboardEvent> {
        translate(key(code, KeyModifiers::NONE, KeyEventKind::Press))
    }

    fn as_key(event: Option<DashboardEvent>) -> Option<Key> {
        match event {
            Some(DashboardEvent::Key(k)) => Some(k),
            _ => None,
        }
    }

    #[test]
    fn test_ctrl_c_interrupts() {
        let event = translate(key(KeyCode::Char('c'), KeyModifiers::CONTROL, KeyEventKind::Press));
        assert_eq!(as_key(event), Some(Key::Interrupt));
    }

    #[test]
    fn test_other_ctrl_chords_ignored() {
        let event = translate(key(KeyCode::Char('a'), KeyModifiers::CONTROL, KeyEventKind::Press));
        assert!(event.is_none());
    }

    #[test]
    fn test_shifted_char_passes_through() {
        let event = translate(key(KeyCode::Char('F'), KeyModifiers::SHIFT, KeyEventKind::Press));
        assert_eq!(as_key(event), Some(Key::Char('F')));
    }

    #[test]
    fn test_navigation_keys() {
        assert_eq!(as_key(pressed(KeyCode::Up)), Some(Key::Up));
        assert_eq!(as_key(pressed(KeyCode::Down)), Some(Key::Down));
        assert_eq!(as_key(pressed(KeyCode::Enter)), Some(Key::Enter));
        assert_eq!(as_key(pressed(KeyCode::Esc)), Some(Key::Esc));
        assert_eq!(as_key(pressed(KeyCode::Backspace)), Some(Key::Backspace));
        assert!(pressed(KeyCode::Tab).is_none());
    }

    #[test]
    fn test_release_ignored() {
        let event = translate(key(KeyCode::Up, KeyModifiers::NONE, KeyEventKind::Release));
        assert!(event.is_none());
    }

    #[test]
    fn test_resize_forwarded() {
        match translate(Event::Resize(120, 40)) {
            Some(DashboardEvent::Resize { width, height }) => assert_eq!((width, height), (120, 40)),
            other => panic!("unexpected {other:?}"),
        }
    }
}
