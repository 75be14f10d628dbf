//! Fixed-capacity history of accepted signals, newest first.

use std::collections::VecDeque;

use crate::signal::Signal;

pub const DEFAULT_CAPACITY: usize = 100;

/// Ring of the most recent signals.
///
/// Index 0 is always the most recently appended signal. Once full, each
/// append evicts the oldest entry; survivors keep their relative order.
#[derive(Clone, Debug)]
pub struct HistoryBuffer {
    cap: usize,
    /// Newest at the front.
    entries: VecDeque<Signal>,
    /// Every append ever made, evicted ones included.
    inserted: u64,
}

impl HistoryBuffer {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            entries: VecDeque::with_capacity(cap),
            inserted: 0,
        }
    }

    pub fn append(&mut self, signal: Signal) {
        self.inserted += 1;
        if self.cap == 0 {
            return;
        }
        if self.entries.len() >= self.cap {
            self.entries.pop_back();
        }
        self.entries.push_front(signal);
    }

    /// Drop every entry. The insert counter is left untouched.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// The `i`-th most recent signal, `None` past the end.
    pub fn get(&self, i: usize) -> Option<&Signal> {
        self.entries.get(i)
    }

    pub fn counter(&self) -> u64 {
        self.inserted
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Signal> {
        self.entries.iter()
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
