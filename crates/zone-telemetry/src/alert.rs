//! Alert sinks for domain events.

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{error, info, trace, warn};

use crate::events::{AlertPriority, DomainEvent};

/// Receiver of domain events.
///
/// Publishing never blocks the engine and never fails it: sinks log their
/// own delivery problems.
pub trait AlertSink: Send + Sync {
    fn publish(&self, event: &DomainEvent);
}

/// Writes each event to the log at a level matching its priority.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    fn publish(&self, event: &DomainEvent) {
        let name = event.name();
        let summary = event.summary();
        match event.priority() {
            AlertPriority::Critical => error!(event = name, at = %event.at, "{summary}"),
            AlertPriority::Warning => warn!(event = name, at = %event.at, "{summary}"),
            AlertPriority::Info => info!(event = name, at = %event.at, "{summary}"),
        }
    }
}

/// Serializes events to JSON on a broadcast channel.
///
/// Any number of subscribers (dashboard, notifier) may attach; events sent
/// with no subscriber are dropped.
#[derive(Debug, Clone)]
pub struct BroadcastAlertSink {
    tx: broadcast::Sender<String>,
}

impl BroadcastAlertSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }
}

impl AlertSink for BroadcastAlertSink {
    fn publish(&self, event: &DomainEvent) {
        match serde_json::to_string(event) {
            Ok(json) => match self.tx.send(json) {
                Ok(n) => trace!(receivers = n, event = event.name(), "Event broadcast"),
                Err(_) => trace!(event = event.name(), "No event subscribers"),
            },
            Err(e) => warn!(error = %e, event = event.name(), "Failed to serialize event"),
        }
    }
}

/// Keeps published events in memory.
#[derive(Debug, Default)]
pub struct MemoryAlertSink {
    events: Mutex<Vec<DomainEvent>>,
}

impl MemoryAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DomainEvent> {
        self.events.lock().clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(DomainEvent::name).collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl AlertSink for MemoryAlertSink {
    fn publish(&self, event: &DomainEvent) {
        self.events.lock().push(event.clone());
    }
}
