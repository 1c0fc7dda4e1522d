//! Market data ticks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{OptionContract, Price};

/// Instrument a tick refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Instrument {
    /// The underlying index (e.g. `NIFTY 50`).
    Index { symbol: String },
    /// A tradable option contract.
    Option { contract: OptionContract },
}

impl Instrument {
    pub fn index(symbol: impl Into<String>) -> Self {
        Self::Index {
            symbol: symbol.into(),
        }
    }

    #[must_use]
    pub fn is_index(&self) -> bool {
        matches!(self, Self::Index { .. })
    }

    #[must_use]
    pub fn contract(&self) -> Option<&OptionContract> {
        match self {
            Self::Option { contract } => Some(contract),
            Self::Index { .. } => None,
        }
    }

    #[must_use]
    pub fn symbol(&self) -> &str {
        match self {
            Self::Index { symbol } => symbol,
            Self::Option { contract } => &contract.symbol,
        }
    }
}

impl From<OptionContract> for Instrument {
    fn from(contract: OptionContract) -> Self {
        Self::Option { contract }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A last-traded-price observation. Immutable once produced by the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tick {
    pub instrument: Instrument,
    pub price: Price,
    pub timestamp: DateTime<Utc>,
}

impl Tick {
    pub fn new(instrument: Instrument, price: Price, timestamp: DateTime<Utc>) -> Self {
        Self {
            instrument,
            price,
            timestamp,
        }
    }

    /// Age of the tick at `now`, in milliseconds. Future ticks have age 0.
    #[must_use]
    pub fn age_ms(&self, now: DateTime<Utc>) -> i64 {
        (now - self.timestamp).num_milliseconds().max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{OptionKind, Strike};
    use chrono::{NaiveDate, TimeZone};
    use rust_decimal_macros::dec;

    #[test]
    fn test_tick_json_shape() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 18, 3, 46, 0).unwrap();
        let tick = Tick::new(Instrument::index("NIFTY 50"), Price::new(dec!(25000)), ts);
        let json = serde_json::to_string(&tick).unwrap();
        assert!(json.contains("\"type\":\"index\""));

        let back: Tick = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tick);
    }

    #[test]
    fn test_instrument_accessors() {
        let expiry = NaiveDate::from_ymd_opt(2024, 1, 18).unwrap();
        let contract = OptionContract::new("NIFTY", expiry, OptionKind::Ce, Strike(25000));
        let inst = Instrument::from(contract.clone());
        assert!(!inst.is_index());
        assert_eq!(inst.contract(), Some(&contract));
        assert_eq!(inst.symbol(), "NIFTY24011825000CE");
    }

    #[test]
    fn test_tick_age() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 18, 3, 46, 0).unwrap();
        let tick = Tick::new(Instrument::index("NIFTY 50"), Price::new(dec!(25000)), ts);
        assert_eq!(tick.age_ms(ts + chrono::Duration::seconds(2)), 2000);
        assert_eq!(tick.age_ms(ts - chrono::Duration::seconds(2)), 0);
    }
}
