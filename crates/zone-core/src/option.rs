//! Index option contracts and strike selection.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, Result};
use crate::Price;

/// Option kind. A CE entry is taken on an upper-zone break, a PE entry on a
/// lower-zone break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionKind {
    #[serde(rename = "CE")]
    Ce,
    #[serde(rename = "PE")]
    Pe,
}

impl OptionKind {
    /// Returns the other kind.
    #[must_use]
    pub fn opposite(&self) -> Self {
        match self {
            Self::Ce => Self::Pe,
            Self::Pe => Self::Ce,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ce => "CE",
            Self::Pe => "PE",
        }
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strike price in whole index points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Strike(pub u32);

impl Strike {
    #[inline]
    pub fn value(&self) -> u32 {
        self.0
    }

    #[inline]
    pub fn as_price(&self) -> Price {
        Price::new(Decimal::from(self.0))
    }
}

impl fmt::Display for Strike {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strike nearest to the index level, on a `step` grid.
///
/// Midpoints round away from zero, so 25025 with step 50 gives 25050.
pub fn atm_strike(index: Price, step: u32) -> Result<Strike> {
    if step == 0 {
        return Err(CoreError::InvalidStrike("strike step must be positive".into()));
    }
    let step_dec = Decimal::from(step);
    let rounded = (index.inner() / step_dec)
        .round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
        * step_dec;
    rounded
        .to_u32()
        .map(Strike)
        .ok_or_else(|| CoreError::InvalidStrike(format!("index {index} out of range")))
}

/// Strike to trade for `kind`, given the index level.
///
/// Starts from the ATM strike. When the ATM strike is further out of the
/// money than `min_atm_distance` (above the index for CE, below it for PE),
/// the strike moves one step into the money.
pub fn select_strike(
    kind: OptionKind,
    index: Price,
    step: u32,
    min_atm_distance: Decimal,
) -> Result<Strike> {
    let atm = atm_strike(index, step)?;
    let otm_points = match kind {
        OptionKind::Ce => atm.as_price().inner() - index.inner(),
        OptionKind::Pe => index.inner() - atm.as_price().inner(),
    };
    if otm_points <= min_atm_distance {
        return Ok(atm);
    }
    let shifted = match kind {
        OptionKind::Ce => atm.0.checked_sub(step),
        OptionKind::Pe => atm.0.checked_add(step),
    };
    shifted
        .map(Strike)
        .ok_or_else(|| CoreError::InvalidStrike(format!("cannot shift strike {atm}")))
}

/// A tradable index option.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OptionContract {
    pub underlying: String,
    pub expiry: NaiveDate,
    pub kind: OptionKind,
    pub strike: Strike,
    /// Broker trading symbol, e.g. `NIFTY24011825000CE`.
    pub symbol: String,
}

impl OptionContract {
    pub fn new(underlying: &str, expiry: NaiveDate, kind: OptionKind, strike: Strike) -> Self {
        let symbol = format!(
            "{}{}{}{}",
            underlying,
            expiry.format("%y%m%d"),
            strike,
            kind.as_str()
        );
        Self {
            underlying: underlying.to_string(),
            expiry,
            kind,
            strike,
            symbol,
        }
    }
}

impl fmt::Display for OptionContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol)
    }
}
