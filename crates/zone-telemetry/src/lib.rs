//! Prometheus metrics, structured logging and domain events.
//!
//! Provides observability for the zone engine:
//! - Prometheus metrics for signals, order attempts, positions, risk state
//! - Structured JSON logging with tracing
//! - Timestamped domain events published to alert sinks
//! - End-of-session summary output

pub mod alert;
pub mod daily_stats;
pub mod error;
pub mod events;
pub mod logging;
pub mod metrics;

pub use alert::{AlertSink, BroadcastAlertSink, LogAlertSink, MemoryAlertSink};
pub use daily_stats::{DailyStatsReporter, SessionSummary};
pub use error::{TelemetryError, TelemetryResult};
pub use events::{AlertPriority, DomainEvent, DomainEventKind};
pub use logging::init_logging;
pub use metrics::Metrics;
