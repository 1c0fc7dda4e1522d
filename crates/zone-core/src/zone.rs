//! Daily zone boundaries and entry gates.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{OptionKind, Price, Strike};

/// Zone boundaries computed once per session from the index LTP.
///
/// Immutable after computation: `upper - middle == middle - lower == offset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneSet {
    pub date: NaiveDate,
    pub upper: Price,
    pub middle: Price,
    pub lower: Price,
    /// ATM strike of the index at computation time.
    pub atm_strike: Strike,
    pub computed_at: DateTime<Utc>,
}

impl ZoneSet {
    /// Zone width from the middle to either boundary.
    #[must_use]
    pub fn offset(&self) -> Decimal {
        self.upper.inner() - self.middle.inner()
    }

    /// True if `price` is at or above the upper boundary.
    #[must_use]
    pub fn breaks_upper(&self, price: Price) -> bool {
        price >= self.upper
    }

    /// True if `price` is at or below the lower boundary.
    #[must_use]
    pub fn breaks_lower(&self, price: Price) -> bool {
        price <= self.lower
    }

    /// True if `price` is within `tolerance` points of the middle.
    #[must_use]
    pub fn touches_middle(&self, price: Price, tolerance: Decimal) -> bool {
        price.distance(self.middle) <= tolerance
    }
}

/// Entry gate flags.
///
/// After an entry on one side both gates close; they reopen only when the
/// index returns to the middle zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateState {
    pub ce_open: bool,
    pub pe_open: bool,
    pub last_touched_middle: bool,
}

impl Default for GateState {
    fn default() -> Self {
        Self {
            ce_open: true,
            pe_open: true,
            last_touched_middle: true,
        }
    }
}

impl GateState {
    #[must_use]
    pub fn is_open(&self, kind: OptionKind) -> bool {
        match kind {
            OptionKind::Ce => self.ce_open,
            OptionKind::Pe => self.pe_open,
        }
    }

    /// Close both gates and clear the middle latch.
    pub fn close_all(&mut self) {
        self.ce_open = false;
        self.pe_open = false;
        self.last_touched_middle = false;
    }

    /// Middle-zone touch: set the latch and reopen both gates.
    pub fn touch_middle(&mut self) {
        self.last_touched_middle = true;
        self.ce_open = true;
        self.pe_open = true;
    }
}
