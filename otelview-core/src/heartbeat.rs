//! Throughput pulse shown in the bottom-left corner of the dashboard.
//!
//! The dashboard ticks the counter for every received signal; a separate
//! task polls it every [`PULSE_PERIOD`] and advances one animation frame
//! when the count moved. With no traffic the glyph stays put.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

pub const PULSE_PERIOD: Duration = Duration::from_millis(250);

pub const FRAMES: [&str; 10] = ["🭶", "🭷", "🭸", "🭹", "🭺", "🭻", "🭺", "🭹", "🭸", "🭷"];

#[derive(Debug, Default)]
pub struct Heartbeat {
    received: AtomicU64,
    /// 0 until the first beat.
    step: AtomicUsize,
}

impl Heartbeat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    fn advance(&self) {
        self.step.fetch_add(1, Ordering::Relaxed);
    }

    /// Current frame, `None` before anything arrived.
    pub fn glyph(&self) -> Option<&'static str> {
        match self.step.load(Ordering::Relaxed) {
            0 => None,
            step => Some(FRAMES[step % FRAMES.len()]),
        }
    }
}

/// Last-seen counter state for the polling task.
#[derive(Debug, Default)]
pub struct PulseMonitor {
    last_seen: u64,
}

impl PulseMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the animation if the counter moved since the previous poll.
    /// Returns whether a redraw is needed.
    pub fn poll(&mut self, heartbeat: &Heartbeat) -> bool {
        let now = heartbeat.received();
        if now == self.last_seen {
            return false;
        }
        self.last_seen = now;
        heartbeat.advance();
        true
    }
}
