//! Daily zone boundaries and gate state.
//!
//! Zones are computed once per session from the index LTP and never change
//! afterwards. The tracker also owns the gate flags that the signal detector
//! opens and closes.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};
use zone_core::{atm_strike, GateState, Price, ZoneSet};

use crate::error::{DetectorError, DetectorResult};

/// Zone boundaries derived from one index level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneLevels {
    pub upper: Price,
    pub middle: Price,
    pub lower: Price,
}

/// Compute zone boundaries around the index LTP.
///
/// Pure: `upper = ltp + offset`, `middle = ltp`, `lower = ltp - offset`.
#[must_use]
pub fn compute_zones(index_ltp: Price, offset: Decimal) -> ZoneLevels {
    ZoneLevels {
        upper: index_ltp.offset(offset),
        middle: index_ltp,
        lower: index_ltp.offset(-offset),
    }
}

/// Zone initialization state for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneInit {
    /// Waiting for the zone computation instant or a valid tick.
    Pending,
    /// Zones computed; signals may be evaluated.
    Ready,
    /// Computation gave up; no entries this session.
    Failed,
}

/// Holds the session's `ZoneSet` and `GateState`.
#[derive(Debug)]
pub struct ZoneTracker {
    offset: Decimal,
    zones: Option<ZoneSet>,
    gate: GateState,
    init: ZoneInit,
}

impl ZoneTracker {
    pub fn new(offset: Decimal) -> Self {
        Self {
            offset,
            zones: None,
            gate: GateState::default(),
            init: ZoneInit::Pending,
        }
    }

    /// Compute the session zones from the index LTP.
    ///
    /// Resets the gates to all-open. Fails if zones already exist for the
    /// session, since a `ZoneSet` is immutable once published.
    pub fn initialize(
        &mut self,
        index_ltp: Price,
        strike_step: u32,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> DetectorResult<&ZoneSet> {
        if let Some(existing) = &self.zones {
            return Err(DetectorError::InvalidState(format!(
                "zones already computed for {} at {}",
                existing.date, existing.computed_at
            )));
        }
        if !index_ltp.is_positive() {
            return Err(DetectorError::DataUnavailable(format!(
                "invalid index LTP {index_ltp}"
            )));
        }

        let levels = compute_zones(index_ltp, self.offset);
        let zones = ZoneSet {
            date,
            upper: levels.upper,
            middle: levels.middle,
            lower: levels.lower,
            atm_strike: atm_strike(index_ltp, strike_step)?,
            computed_at: now,
        };

        info!(
            %date,
            upper = %zones.upper,
            middle = %zones.middle,
            lower = %zones.lower,
            atm_strike = %zones.atm_strike,
            "Zones computed"
        );

        self.gate = GateState::default();
        self.init = ZoneInit::Ready;
        Ok(self.zones.insert(zones))
    }

    /// Give up on zone computation for the session (fail-closed).
    pub fn mark_failed(&mut self, reason: &str) {
        if self.init != ZoneInit::Failed {
            warn!(reason, "Zone computation failed, entries blocked for the session");
        }
        self.init = ZoneInit::Failed;
    }

    /// Reload persisted session state after a restart.
    pub fn restore(&mut self, zones: ZoneSet, gate: GateState) {
        info!(
            date = %zones.date,
            middle = %zones.middle,
            ce_open = gate.ce_open,
            pe_open = gate.pe_open,
            "Zones restored"
        );
        self.zones = Some(zones);
        self.gate = gate;
        self.init = ZoneInit::Ready;
    }

    /// Clear everything for a new session.
    pub fn reset(&mut self) {
        self.zones = None;
        self.gate = GateState::default();
        self.init = ZoneInit::Pending;
    }

    #[must_use]
    pub fn zones(&self) -> Option<&ZoneSet> {
        self.zones.as_ref()
    }

    #[must_use]
    pub fn gate(&self) -> GateState {
        self.gate
    }

    pub(crate) fn gate_mut(&mut self) -> &mut GateState {
        &mut self.gate
    }

    #[must_use]
    pub fn init_state(&self) -> ZoneInit {
        self.init
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.init == ZoneInit::Ready && self.zones.is_some()
    }

    #[must_use]
    pub fn offset(&self) -> Decimal {
        self.offset
    }
}
