//! Journal record types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use zone_core::{ExitReason, OptionKind, OrderAttempt, Position, Price};

/// Record written to a daily journal file.
pub trait JournalRecord: Serialize {
    /// File name prefix, e.g. `trades` for `trades_2024-01-18.jsonl`.
    const PREFIX: &'static str;

    /// Session date the record belongs to.
    fn session_date(&self) -> NaiveDate;
}

/// A closed position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub session_date: NaiveDate,
    pub position_id: String,
    pub symbol: String,
    pub side: OptionKind,
    pub strike: u32,
    pub quantity: u32,
    pub entry_price: Price,
    pub exit_price: Price,
    pub stop_loss_price: Price,
    pub peak_profit: Decimal,
    pub realized_pnl: Decimal,
    pub exit_reason: ExitReason,
    pub opened_at: DateTime<Utc>,
    pub closed_at: DateTime<Utc>,
}

impl TradeRecord {
    /// Build from a closed position. `None` while the position is open.
    pub fn from_position(position: &Position, session_date: NaiveDate) -> Option<Self> {
        let exit = position.exit.as_ref()?;
        Some(Self {
            session_date,
            position_id: position.id.to_string(),
            symbol: position.contract.symbol.clone(),
            side: position.side,
            strike: position.strike.value(),
            quantity: position.quantity,
            entry_price: position.entry_price,
            exit_price: exit.price,
            stop_loss_price: position.stop_loss_price,
            peak_profit: position.peak_profit,
            realized_pnl: exit.realized_pnl,
            exit_reason: exit.reason,
            opened_at: position.opened_at,
            closed_at: exit.closed_at,
        })
    }
}

impl JournalRecord for TradeRecord {
    const PREFIX: &'static str = "trades";

    fn session_date(&self) -> NaiveDate {
        self.session_date
    }
}

/// One order attempt state change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAttemptRecord {
    pub session_date: NaiveDate,
    pub attempt: OrderAttempt,
}

impl OrderAttemptRecord {
    pub fn new(attempt: OrderAttempt, session_date: NaiveDate) -> Self {
        Self {
            session_date,
            attempt,
        }
    }
}

impl JournalRecord for OrderAttemptRecord {
    const PREFIX: &'static str = "orders";

    fn session_date(&self) -> NaiveDate {
        self.session_date
    }
}
