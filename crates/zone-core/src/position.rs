//! Open option position.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{AttemptId, ExitReason, OptionContract, OptionKind, Price, Strike};

/// Position identifier. Taken from the entry attempt that opened it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionId(String);

impl PositionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&AttemptId> for PositionId {
    fn from(id: &AttemptId) -> Self {
        Self(id.as_str().to_string())
    }
}

impl fmt::Display for PositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionStatus {
    Open,
    /// Exit order working at the broker.
    Exiting,
    Closed,
}

/// Exit details, set when the exit fill is confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionExit {
    pub reason: ExitReason,
    pub price: Price,
    pub closed_at: DateTime<Utc>,
    pub realized_pnl: Decimal,
}

/// A long option position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub contract: OptionContract,
    pub side: OptionKind,
    pub strike: Strike,
    pub entry_price: Price,
    pub quantity: u32,
    pub stop_loss_price: Price,
    /// Highest unrealized profit per unit observed so far.
    pub peak_profit: Decimal,
    pub last_price: Price,
    pub opened_at: DateTime<Utc>,
    pub status: PositionStatus,
    pub exit: Option<PositionExit>,
}

impl Position {
    /// Signed unrealized profit per unit at `ltp`.
    #[must_use]
    pub fn unrealized_per_unit(&self, ltp: Price) -> Decimal {
        ltp.inner() - self.entry_price.inner()
    }

    /// Signed unrealized P&L for the whole quantity at `ltp`.
    #[must_use]
    pub fn unrealized_pnl(&self, ltp: Price) -> Decimal {
        self.unrealized_per_unit(ltp) * Decimal::from(self.quantity)
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        !matches!(self.status, PositionStatus::Closed)
    }

    /// Realized P&L once closed.
    #[must_use]
    pub fn realized_pnl(&self) -> Option<Decimal> {
        self.exit.as_ref().map(|e| e.realized_pnl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use rust_decimal_macros::dec;

    #[test]
    fn test_unrealized_pnl() {
        let expiry = NaiveDate::from_ymd_opt(2024, 1, 18).unwrap();
        let contract = OptionContract::new("NIFTY", expiry, OptionKind::Ce, Strike(25000));
        let pos = Position {
            id: PositionId::new("zt_1_abcd"),
            side: contract.kind,
            strike: contract.strike,
            contract,
            entry_price: Price::new(dec!(51)),
            quantity: 2,
            stop_loss_price: Price::new(dec!(48.5)),
            peak_profit: Decimal::ZERO,
            last_price: Price::new(dec!(51)),
            opened_at: Utc.with_ymd_and_hms(2024, 1, 18, 4, 0, 0).unwrap(),
            status: PositionStatus::Open,
            exit: None,
        };
        assert_eq!(pos.unrealized_per_unit(Price::new(dec!(61))), dec!(10));
        assert_eq!(pos.unrealized_pnl(Price::new(dec!(48.5))), dec!(-5));
        assert!(pos.is_open());
        assert_eq!(pos.realized_pnl(), None);
    }
}
