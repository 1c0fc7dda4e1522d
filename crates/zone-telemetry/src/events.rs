//! Domain events published to alerting and dashboard collaborators.
//!
//! Each event carries a timestamp and a full snapshot of the entity it
//! reports on, so a subscriber never has to query engine state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zone_core::{
    DailyRiskState, EntrySignal, HaltReason, OptionContract, OrderAttempt, Position, ZoneSet,
};

/// Alert priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertPriority {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DomainEventKind {
    ZoneComputed {
        zones: ZoneSet,
        ce_contract: OptionContract,
        pe_contract: OptionContract,
    },
    EntrySignaled {
        signal: EntrySignal,
    },
    OrderFilled {
        attempt: OrderAttempt,
    },
    OrderRejected {
        attempt: OrderAttempt,
    },
    PositionOpened {
        position: Position,
    },
    PositionClosed {
        position: Position,
        risk: DailyRiskState,
    },
    RiskHalted {
        reason: HaltReason,
        risk: DailyRiskState,
    },
    SessionEnded {
        risk: DailyRiskState,
    },
    /// Market data missing or stale when a decision needed it.
    FeedGap {
        feed: String,
        last_seen: Option<DateTime<Utc>>,
    },
}

/// A timestamped domain event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainEvent {
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: DomainEventKind,
}

impl DomainEvent {
    pub fn new(at: DateTime<Utc>, kind: DomainEventKind) -> Self {
        Self { at, kind }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self.kind {
            DomainEventKind::ZoneComputed { .. } => "zone_computed",
            DomainEventKind::EntrySignaled { .. } => "entry_signaled",
            DomainEventKind::OrderFilled { .. } => "order_filled",
            DomainEventKind::OrderRejected { .. } => "order_rejected",
            DomainEventKind::PositionOpened { .. } => "position_opened",
            DomainEventKind::PositionClosed { .. } => "position_closed",
            DomainEventKind::RiskHalted { .. } => "risk_halted",
            DomainEventKind::SessionEnded { .. } => "session_ended",
            DomainEventKind::FeedGap { .. } => "feed_gap",
        }
    }

    #[must_use]
    pub fn priority(&self) -> AlertPriority {
        match &self.kind {
            DomainEventKind::RiskHalted { .. } => AlertPriority::Critical,
            DomainEventKind::OrderRejected { .. } | DomainEventKind::FeedGap { .. } => {
                AlertPriority::Warning
            }
            DomainEventKind::PositionClosed { position, .. }
                if position.realized_pnl().is_some_and(|pnl| pnl.is_sign_negative()) =>
            {
                AlertPriority::Warning
            }
            _ => AlertPriority::Info,
        }
    }

    /// One-line human readable description.
    #[must_use]
    pub fn summary(&self) -> String {
        match &self.kind {
            DomainEventKind::ZoneComputed {
                zones,
                ce_contract,
                pe_contract,
            } => format!(
                "Zones {}/{}/{} ({} / {})",
                zones.upper, zones.middle, zones.lower, ce_contract, pe_contract
            ),
            DomainEventKind::EntrySignaled { signal } => format!(
                "{} entry signal at index {}",
                signal.kind, signal.index_price
            ),
            DomainEventKind::OrderFilled { attempt } => format!(
                "{} {} {} filled at {}",
                attempt.purpose.label(),
                attempt.order_side,
                attempt.contract,
                attempt
                    .fill_price
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "?".to_string())
            ),
            DomainEventKind::OrderRejected { attempt } => format!(
                "{} {} {} rejected: {}",
                attempt.purpose.label(),
                attempt.order_side,
                attempt.contract,
                attempt
                    .reject_reason
                    .as_ref()
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| "unknown".to_string())
            ),
            DomainEventKind::PositionOpened { position } => format!(
                "Opened {} x{} at {} (SL {})",
                position.contract, position.quantity, position.entry_price, position.stop_loss_price
            ),
            DomainEventKind::PositionClosed { position, risk } => format!(
                "Closed {} pnl {} (trades {}, day pnl {})",
                position.contract,
                position
                    .realized_pnl()
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "?".to_string()),
                risk.trade_count,
                risk.realized_pnl
            ),
            DomainEventKind::RiskHalted { reason, .. } => format!("Trading halted: {reason}"),
            DomainEventKind::SessionEnded { risk } => format!(
                "Session ended: {} trades, pnl {}",
                risk.trade_count, risk.realized_pnl
            ),
            DomainEventKind::FeedGap { feed, last_seen } => match last_seen {
                Some(at) => format!("Feed gap on {feed}, last data at {at}"),
                None => format!("Feed gap on {feed}, no data received"),
            },
        }
    }
}
