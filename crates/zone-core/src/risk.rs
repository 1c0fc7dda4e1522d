//! Daily risk state.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason for a day-scoped trading halt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HaltReason {
    /// Realized loss reached `max_daily_loss`.
    MaxDailyLoss { realized_pnl: Decimal, limit: Decimal },
    /// Realized plus unrealized loss reached `emergency_stop_loss`.
    EmergencyStopLoss { mark_to_market: Decimal, limit: Decimal },
    /// Operator request.
    Manual { message: String },
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxDailyLoss {
                realized_pnl,
                limit,
            } => write!(f, "Max daily loss: realized {realized_pnl} <= -{limit}"),
            Self::EmergencyStopLoss {
                mark_to_market,
                limit,
            } => write!(f, "Emergency stop loss: mtm {mark_to_market} <= -{limit}"),
            Self::Manual { message } => write!(f, "Manual halt: {message}"),
        }
    }
}

/// Why new entries are refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntryBlock {
    Halted,
    MaxDailyTrades { trade_count: u32, limit: u32 },
    MaxDailyLoss { realized_pnl: Decimal, limit: Decimal },
    /// Zones could not be computed for the session.
    SessionInitFailed,
    /// Session end reached.
    SessionEnded,
}

impl EntryBlock {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Halted => "halted",
            Self::MaxDailyTrades { .. } => "max_daily_trades",
            Self::MaxDailyLoss { .. } => "max_daily_loss",
            Self::SessionInitFailed => "session_init_failed",
            Self::SessionEnded => "session_ended",
        }
    }
}

impl fmt::Display for EntryBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxDailyTrades { trade_count, limit } => {
                write!(f, "max daily trades reached ({trade_count}/{limit})")
            }
            Self::MaxDailyLoss {
                realized_pnl,
                limit,
            } => write!(f, "daily loss limit reached ({realized_pnl} <= -{limit})"),
            other => f.write_str(other.label()),
        }
    }
}

/// Per-day risk counters. Reset at session start, monotone during the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRiskState {
    pub date: Option<NaiveDate>,
    pub trade_count: u32,
    pub realized_pnl: Decimal,
    pub halted: bool,
    pub halt_reason: Option<HaltReason>,
    pub halted_at: Option<DateTime<Utc>>,
    /// Day-scoped block that is not a halt (session init failure, session end).
    pub entry_block: Option<EntryBlock>,
}

impl DailyRiskState {
    pub fn new(date: Option<NaiveDate>) -> Self {
        Self {
            date,
            trade_count: 0,
            realized_pnl: Decimal::ZERO,
            halted: false,
            halt_reason: None,
            halted_at: None,
            entry_block: None,
        }
    }
}

impl Default for DailyRiskState {
    fn default() -> Self {
        Self::new(None)
    }
}
