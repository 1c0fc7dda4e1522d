//! End-of-session statistics.
//!
//! Combines the day's risk counters with metric deltas since the session
//! started and writes a summary to the log.

use crate::metrics::{
    ENTRY_SUPPRESSED_TOTAL, MIDDLE_TOUCH_TOTAL, ORDER_ATTEMPTS_TOTAL, ORDER_RETRIES_TOTAL,
    ZONE_SIGNALS_TOTAL,
};
use chrono::{DateTime, NaiveDate, Utc};
use prometheus::core::Collector;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;
use zone_core::DailyRiskState;

/// Counter values at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct CounterSnapshot {
    signals_ce: f64,
    signals_pe: f64,
    middle_touches: f64,
    suppressed: f64,
    filled: f64,
    rejected: f64,
    cancelled: f64,
    retries: f64,
}

impl CounterSnapshot {
    fn capture() -> Self {
        Self {
            signals_ce: ZONE_SIGNALS_TOTAL.with_label_values(&["CE"]).get(),
            signals_pe: ZONE_SIGNALS_TOTAL.with_label_values(&["PE"]).get(),
            middle_touches: MIDDLE_TOUCH_TOTAL.get(),
            suppressed: sum_counter_vec(&ENTRY_SUPPRESSED_TOTAL),
            filled: sum_outcome(&ORDER_ATTEMPTS_TOTAL, "filled"),
            rejected: sum_outcome(&ORDER_ATTEMPTS_TOTAL, "rejected"),
            cancelled: sum_outcome(&ORDER_ATTEMPTS_TOTAL, "cancelled"),
            retries: sum_counter_vec(&ORDER_RETRIES_TOTAL),
        }
    }
}

/// Sum a counter over all label combinations.
fn sum_counter_vec(counter: &prometheus::CounterVec) -> f64 {
    counter
        .collect()
        .iter()
        .flat_map(|mf| mf.get_metric().iter())
        .map(|m| m.get_counter().get_value())
        .sum()
}

/// Sum order attempts with the given outcome over all purposes.
fn sum_outcome(counter: &prometheus::CounterVec, outcome: &str) -> f64 {
    counter
        .collect()
        .iter()
        .flat_map(|mf| mf.get_metric().iter())
        .filter(|m| {
            m.get_label()
                .iter()
                .any(|pair| pair.get_name() == "outcome" && pair.get_value() == outcome)
        })
        .map(|m| m.get_counter().get_value())
        .sum()
}

/// Summary of one trading session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub date: Option<NaiveDate>,
    pub trade_count: u32,
    pub realized_pnl: Decimal,
    pub halted: bool,
    pub signals_ce: u64,
    pub signals_pe: u64,
    pub middle_touches: u64,
    pub entries_suppressed: u64,
    pub attempts_filled: u64,
    pub attempts_rejected: u64,
    pub attempts_cancelled: u64,
    pub retries: u64,
}

/// Session statistics reporter.
pub struct DailyStatsReporter {
    start_time: DateTime<Utc>,
    baseline: CounterSnapshot,
}

impl DailyStatsReporter {
    /// Create a reporter whose counters start now.
    pub fn new(start_time: DateTime<Utc>) -> Self {
        Self {
            start_time,
            baseline: CounterSnapshot::capture(),
        }
    }

    /// Restart the counting window (new session).
    pub fn reset(&mut self, start_time: DateTime<Utc>) {
        self.start_time = start_time;
        self.baseline = CounterSnapshot::capture();
    }

    /// Build the summary for the session so far.
    pub fn summary(&self, risk: &DailyRiskState) -> SessionSummary {
        let now = CounterSnapshot::capture();
        let delta = |cur: f64, base: f64| (cur - base).max(0.0) as u64;

        SessionSummary {
            date: risk.date,
            trade_count: risk.trade_count,
            realized_pnl: risk.realized_pnl,
            halted: risk.halted,
            signals_ce: delta(now.signals_ce, self.baseline.signals_ce),
            signals_pe: delta(now.signals_pe, self.baseline.signals_pe),
            middle_touches: delta(now.middle_touches, self.baseline.middle_touches),
            entries_suppressed: delta(now.suppressed, self.baseline.suppressed),
            attempts_filled: delta(now.filled, self.baseline.filled),
            attempts_rejected: delta(now.rejected, self.baseline.rejected),
            attempts_cancelled: delta(now.cancelled, self.baseline.cancelled),
            retries: delta(now.retries, self.baseline.retries),
        }
    }

    /// Output the session summary to logs.
    pub fn output_daily_summary(&self, risk: &DailyRiskState, now: DateTime<Utc>) {
        let s = self.summary(risk);
        let duration = now - self.start_time;
        let hours = duration.num_hours();
        let minutes = duration.num_minutes() % 60;

        info!("========== Session Summary ==========");
        info!(
            "Period: {} ({} hours {} minutes)",
            self.start_time.format("%Y-%m-%d %H:%M:%S UTC"),
            hours,
            minutes
        );
        info!(
            "  Trades: {}  Realized P&L: {}  Halted: {}",
            s.trade_count, s.realized_pnl, s.halted
        );
        info!(
            "  Signals: {} (CE: {}, PE: {}), middle touches: {}, suppressed: {}",
            s.signals_ce + s.signals_pe,
            s.signals_ce,
            s.signals_pe,
            s.middle_touches,
            s.entries_suppressed
        );
        info!(
            "  Attempts: filled {}, rejected {}, cancelled {}, retries {}",
            s.attempts_filled, s.attempts_rejected, s.attempts_cancelled, s.retries
        );
        info!("=====================================");
    }
}
