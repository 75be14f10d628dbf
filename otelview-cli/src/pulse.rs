use std::sync::Arc;

use tokio::sync::Notify;
use tokio::time::{MissedTickBehavior, interval};

use otelview_core::heartbeat::{Heartbeat, PULSE_PERIOD, PulseMonitor};

/// Poll the heartbeat counter every [`PULSE_PERIOD`] and wake the dashboard
/// when the animation advanced.
pub fn spawn_pulse(heartbeat: Arc<Heartbeat>, redraw: Arc<Notify>) {
    tokio::spawn(async move {
        let mut ticker = interval(PULSE_PERIOD);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut monitor = PulseMonitor::new();

        loop {
            ticker.tick().await;
            if monitor.poll(&heartbeat) {
                redraw.notify_one();
            }
        }
    });
}
