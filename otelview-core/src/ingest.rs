use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::normalize::normalize;
use crate::signal::Signal;
use crate::telemetry::Telemetry;

/// Destination for normalized signals.
///
/// Transport bindings hand every decoded tree to [`ingest`], which publishes
/// the resulting signals one by one through a sink. Publishing may wait on a
/// slow consumer; signals are never dropped because a queue is full.
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    async fn publish(&self, signal: Signal);
}

#[async_trait]
impl TelemetrySink for mpsc::Sender<Signal> {
    async fn publish(&self, signal: Signal) {
        if self.send(signal).await.is_err() {
            tracing::debug!(event = "signal_dropped", reason = "dashboard closed");
        }
    }
}

/// Normalize `telemetry` and publish every resulting signal in order.
/// Returns how many signals were produced.
pub async fn ingest<S>(sink: &S, telemetry: &Telemetry) -> usize
where
    S: TelemetrySink + ?Sized,
{
    let signals = normalize(telemetry);
    let produced = signals.len();
    tracing::debug!(event = "ingest", kind = telemetry.kind_label(), signals = produced);
    for signal in signals {
        sink.publish(signal).await;
    }
    produced
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{AnyValue, LogRecord, LogsData, ResourceLogs, ScopeLogs};

    fn two_records() -> Telemetry {
        let record = |body: &str| LogRecord {
            severity_text: "INFO".into(),
            body: AnyValue::string(body),
            ..Default::default()
        };
        Telemetry::Logs(LogsData {
            resource_logs: vec![ResourceLogs {
                scope_logs: vec![ScopeLogs {
                    log_records: vec![record("one"), record("two")],
                    ..Default::default()
                }],
                ..Default::default()
            }],
        })
    }

    #[tokio::test]
    async fn test_ingest_publishes_in_order() {
        let (tx, mut rx) = mpsc::channel(8);
        let produced = ingest(&tx, &two_records()).await;
        assert_eq!(produced, 2);
        assert_eq!(rx.recv().await.unwrap().summary(), "INFO: one");
        assert_eq!(rx.recv().await.unwrap().summary(), "INFO: two");
    }

    #[tokio::test]
    async fn test_full_channel_waits_instead_of_dropping() {
        let (tx, mut rx) = mpsc::channel(1);
        let producer = tokio::spawn(async move { ingest(&tx, &two_records()).await });

        assert_eq!(rx.recv().await.unwrap().summary(), "INFO: one");
        assert_eq!(rx.recv().await.unwrap().summary(), "INFO: two");
        assert_eq!(producer.await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_closed_dashboard_is_not_an_error() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        assert_eq!(ingest(&tx, &two_records()).await, 2);
    }
}
