//! Zone-break signal detection.
//!
//! Evaluates each index tick against the session zones:
//! - middle touch: reopen both gates
//! - price >= upper with CE gate open: ENTRY(CE), close both gates
//! - price <= lower with PE gate open: ENTRY(PE), close both gates
//!
//! Only the latest tick is used; a gap that jumps across the middle band
//! without a tick inside it does not reopen the gates.

use rust_decimal::Decimal;
use tracing::{debug, info};
use zone_core::{EntrySignal, OptionKind, Tick};
use zone_telemetry::Metrics;

use crate::zone_tracker::ZoneTracker;

/// Result of evaluating one index tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectorOutcome {
    pub signal: Option<EntrySignal>,
    /// Gate flags changed and should be persisted.
    pub gate_changed: bool,
}

/// Turns index ticks into gated entry signals.
#[derive(Debug, Clone)]
pub struct SignalDetector {
    middle_touch_tolerance: Decimal,
}

impl SignalDetector {
    pub fn new(middle_touch_tolerance: Decimal) -> Self {
        Self {
            middle_touch_tolerance,
        }
    }

    /// Evaluate an index tick.
    ///
    /// `open_position` is the kind of the currently open position, if any.
    /// While a position is open, crossings are no-ops for entry and the gates
    /// are left untouched; middle touches are still recorded.
    pub fn on_index_tick(
        &self,
        tracker: &mut ZoneTracker,
        tick: &Tick,
        open_position: Option<OptionKind>,
    ) -> DetectorOutcome {
        let mut outcome = DetectorOutcome::default();
        let Some(zones) = tracker.zones().cloned() else {
            return outcome;
        };
        if !tracker.is_ready() {
            return outcome;
        }
        let price = tick.price;

        if zones.touches_middle(price, self.middle_touch_tolerance) {
            let gate = tracker.gate_mut();
            if !(gate.ce_open && gate.pe_open && gate.last_touched_middle) {
                gate.touch_middle();
                outcome.gate_changed = true;
                Metrics::middle_touch();
                debug!(%price, middle = %zones.middle, "Middle zone touched, gates reopened");
            }
            return outcome;
        }

        let kind = if zones.breaks_upper(price) {
            OptionKind::Ce
        } else if zones.breaks_lower(price) {
            OptionKind::Pe
        } else {
            return outcome;
        };

        if let Some(open) = open_position {
            debug!(%price, side = %kind, open = %open, "Zone crossed with position open, ignored");
            return outcome;
        }

        let gate = tracker.gate_mut();
        if !gate.is_open(kind) {
            return outcome;
        }
        gate.close_all();
        outcome.gate_changed = true;

        let boundary = match kind {
            OptionKind::Ce => zones.upper,
            OptionKind::Pe => zones.lower,
        };

        Metrics::zone_signal(kind.as_str());
        info!(
            side = %kind,
            %price,
            %boundary,
            middle = %zones.middle,
            "Zone break detected"
        );

        outcome.signal = Some(EntrySignal {
            kind,
            index_price: price,
            boundary,
            detected_at: tick.timestamp,
        });
        outcome
    }

    /// Record an entry fill: both gates close again, so reopening requires a
    /// middle touch after the fill.
    pub fn on_entry_filled(&self, tracker: &mut ZoneTracker, kind: OptionKind) -> bool {
        let gate = tracker.gate_mut();
        let before = *gate;
        gate.close_all();
        debug!(side = %kind, "Entry filled, gates closed until middle touch");
        before != *gate
    }

    #[must_use]
    pub fn middle_touch_tolerance(&self) -> Decimal {
        self.middle_touch_tolerance
    }
}
