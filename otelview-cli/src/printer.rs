//! Non-interactive consumer: one stdout line per accepted signal.

use tokio::sync::mpsc;

use otelview_core::filter::SubstringFilter;
use otelview_core::signal::Signal;

pub async fn run(mut signals: mpsc::Receiver<Signal>, filter: SubstringFilter) {
    // Counts every received signal, filtered or not.
    let mut sequence: u64 = 0;
    while let Some(signal) = signals.recv().await {
        sequence += 1;
        if filter.matches(&signal) {
            println!("{}", format_line(sequence, &signal));
        }
    }
}

fn format_line(sequence: u64, signal: &Signal) -> String {
    format!("{}: {} {}", sequence, signal.time().short(), signal.summary())
}
