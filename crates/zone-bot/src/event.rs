//! Engine input events and output effects.

use chrono::NaiveDate;
use std::time::Duration;
use zone_core::{AttemptId, Instrument, OrderAttempt, Position, Tick};
use zone_executor::{BrokerCommand, BrokerEvent};
use zone_persistence::SessionSnapshot;
use zone_telemetry::DomainEvent;

/// Operator request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorCommand {
    /// Exit the open position at market-crossing limit.
    ManualExit,
    /// Halt trading for the rest of the day.
    Halt { message: String },
    /// Stop the router.
    Shutdown,
}

/// Timer delivered back through the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerKind {
    OrderRetry { attempt_id: AttemptId, seq: u64 },
    /// Zone computation retry for a session date.
    ZoneRetry { date: NaiveDate },
}

/// Everything the engine reacts to, processed one at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Tick(Tick),
    /// Heartbeat for the session clock.
    Clock,
    Timer(TimerKind),
    Broker(BrokerEvent),
    Command(OperatorCommand),
}

impl EngineEvent {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Tick(tick) if tick.instrument.is_index() => "index_tick",
            Self::Tick(_) => "option_tick",
            Self::Clock => "clock",
            Self::Timer(TimerKind::OrderRetry { .. }) => "order_retry",
            Self::Timer(TimerKind::ZoneRetry { .. }) => "zone_retry",
            Self::Broker(_) => "broker",
            Self::Command(_) => "command",
        }
    }
}

impl From<Tick> for EngineEvent {
    fn from(tick: Tick) -> Self {
        Self::Tick(tick)
    }
}

impl From<BrokerEvent> for EngineEvent {
    fn from(event: BrokerEvent) -> Self {
        Self::Broker(event)
    }
}

/// Side effect requested by the engine, executed by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Broker(BrokerCommand),
    Schedule { timer: TimerKind, after: Duration },
    Subscribe(Instrument),
    RecordAttempt { attempt: OrderAttempt, date: NaiveDate },
    RecordTrade { position: Position, date: NaiveDate },
    SaveSnapshot(Box<SessionSnapshot>),
    Publish(DomainEvent),
}
