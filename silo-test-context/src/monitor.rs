use parking_lot::Mutex;
use silo_extract::{Monitor, MonitorContext};
use std::time::Duration;

#[derive(Clone, Debug)]
pub enum RecordedEvent {
    Start(MonitorContext),
    Ok(MonitorContext, Duration),
    Err(MonitorContext, Duration, String),
}

/// In-memory [`Monitor`] that records every event instead of emitting it, so tests can assert
/// on which relations were started/finished and in what order.
#[derive(Default)]
pub struct RecordingMonitor {
    events: Mutex<Vec<RecordedEvent>>,
}

impl RecordingMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().clone()
    }

    pub fn started(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                RecordedEvent::Start(ctx) => Some(ctx.relation_identifier),
                _ => None,
            })
            .collect()
    }
}

impl Monitor for RecordingMonitor {
    fn start(&self, ctx: &MonitorContext) {
        self.events.lock().push(RecordedEvent::Start(ctx.clone()));
    }

    fn finish_ok(&self, ctx: &MonitorContext, elapsed: Duration) {
        self.events.lock().push(RecordedEvent::Ok(ctx.clone(), elapsed));
    }

    fn finish_err(&self, ctx: &MonitorContext, elapsed: Duration, error: &str) {
        self.events
            .lock()
            .push(RecordedEvent::Err(ctx.clone(), elapsed, error.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(id: &str) -> MonitorContext {
        MonitorContext {
            relation_identifier: id.to_string(),
            step: "extract",
            source_name: "www".to_string(),
            destination_bucket: "bucket".to_string(),
            destination_key: "www/r1".to_string(),
            index_current: 1,
            index_total: 1,
        }
    }

    #[test]
    fn records_events_in_call_order() {
        let monitor = RecordingMonitor::new();
        monitor.start(&ctx("www.r1"));
        monitor.finish_ok(&ctx("www.r1"), Duration::from_millis(5));

        assert_eq!(monitor.started(), vec!["www.r1".to_string()]);
        assert_eq!(monitor.events().len(), 2);
    }
}
