//! Prometheus metrics for the zone engine.
//!
//! Observability only: nothing in the engine reads these values to make a
//! decision.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. If registration fails,
//! it indicates a fatal configuration error (e.g., duplicate metric names)
//! that should cause an immediate crash at startup rather than silent failure.
//! These panics only occur during static initialization, never at runtime.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter, register_counter_vec, register_gauge, register_histogram_vec,
    register_int_gauge, Counter, CounterVec, Gauge, HistogramVec, IntGauge,
};

// ============================================================================
// Signals
// ============================================================================

/// Zone breaks that produced an entry signal.
/// Labels: side (CE/PE)
pub static ZONE_SIGNALS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "zone_signals_total",
        "Total zone-break entry signals",
        &["side"]
    )
    .unwrap()
});

/// Middle-zone touches that reopened the gates.
pub static MIDDLE_TOUCH_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "zone_middle_touch_total",
        "Middle-zone touches that reopened the entry gates"
    )
    .unwrap()
});

/// Entry signals refused before reaching the order controller.
/// Labels: reason
pub static ENTRY_SUPPRESSED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "zone_entry_suppressed_total",
        "Entry signals suppressed by risk or position state",
        &["reason"]
    )
    .unwrap()
});

/// Sessions whose zones could not be computed.
pub static ZONE_INIT_FAILURES_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "zone_init_failures_total",
        "Sessions failed closed because zones could not be computed"
    )
    .unwrap()
});

// ============================================================================
// Orders
// ============================================================================

/// Order attempts reaching a terminal state.
/// Labels: purpose (entry/exit), outcome (filled/rejected/cancelled)
pub static ORDER_ATTEMPTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "zone_order_attempts_total",
        "Order attempts by terminal outcome",
        &["purpose", "outcome"]
    )
    .unwrap()
});

/// Re-prices sent through modifyOrder.
pub static ORDER_RETRIES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "zone_order_retries_total",
        "Order re-price retries",
        &["purpose"]
    )
    .unwrap()
});

/// Broker callbacks ignored as duplicates or stale.
pub static DUPLICATE_CALLBACKS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "zone_duplicate_callbacks_total",
        "Broker callbacks ignored as duplicates",
        &["kind"]
    )
    .unwrap()
});

/// Failed broker calls (timeouts, transport errors).
pub static BROKER_CALL_FAILURES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "zone_broker_call_failures_total",
        "Broker calls that failed or timed out",
        &["op"]
    )
    .unwrap()
});

/// Broker call latency in milliseconds.
pub static BROKER_CALL_LATENCY_MS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "zone_broker_call_latency_ms",
        "Broker call round-trip latency in milliseconds",
        &["op"],
        vec![5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 3000.0]
    )
    .unwrap()
});

// ============================================================================
// Positions and Risk
// ============================================================================

/// Closed positions.
/// Labels: reason (stop_loss/session_flatten/risk_halt/manual)
pub static POSITIONS_CLOSED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "zone_positions_closed_total",
        "Closed positions by exit reason",
        &["reason"]
    )
    .unwrap()
});

/// Realized P&L per trade in option points.
pub static TRADE_PNL_POINTS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "zone_trade_pnl_points",
        "Realized P&L per closed trade in option points",
        &["side", "reason"],
        vec![-20.0, -10.0, -5.0, -2.5, 0.0, 2.5, 5.0, 10.0, 20.0, 40.0, 80.0]
    )
    .unwrap()
});

/// Current stop-loss price of the open position (0 when flat).
pub static STOP_LOSS_LEVEL: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!(
        "zone_stop_loss_level",
        "Stop-loss price of the open position"
    )
    .unwrap()
});

/// Realized P&L for the current day.
pub static DAILY_REALIZED_PNL: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!("zone_daily_realized_pnl", "Realized P&L for the day").unwrap()
});

/// Closed trades for the current day.
pub static DAILY_TRADE_COUNT: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("zone_daily_trade_count", "Closed trades for the day").unwrap()
});

/// Risk halt state (1 = halted).
pub static RISK_HALTED: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!("zone_risk_halted", "Daily risk halt state (1=halted)").unwrap()
});

// ============================================================================
// Feed and Event Loop
// ============================================================================

/// Feed gaps (missing or stale data when needed).
/// Labels: source (index/option)
pub static FEED_GAPS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "zone_feed_gaps_total",
        "Missing or stale market data when required",
        &["source"]
    )
    .unwrap()
});

/// Events processed by the engine.
/// Labels: kind (tick/clock/timer/broker/command)
pub static EVENTS_PROCESSED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "zone_events_processed_total",
        "Events processed by the engine",
        &["kind"]
    )
    .unwrap()
});

/// Metrics facade for easy access.
pub struct Metrics;

impl Metrics {
    /// Record a zone-break signal.
    pub fn zone_signal(side: &str) {
        ZONE_SIGNALS_TOTAL.with_label_values(&[side]).inc();
    }

    /// Record a middle-zone touch that reopened the gates.
    pub fn middle_touch() {
        MIDDLE_TOUCH_TOTAL.inc();
    }

    /// Record a suppressed entry.
    pub fn entry_suppressed(reason: &str) {
        ENTRY_SUPPRESSED_TOTAL.with_label_values(&[reason]).inc();
    }

    /// Record a session failed closed.
    pub fn zone_init_failed() {
        ZONE_INIT_FAILURES_TOTAL.inc();
    }

    /// Record a terminal order attempt.
    pub fn order_attempt(purpose: &str, outcome: &str) {
        ORDER_ATTEMPTS_TOTAL
            .with_label_values(&[purpose, outcome])
            .inc();
    }

    /// Record a re-price retry.
    pub fn order_retry(purpose: &str) {
        ORDER_RETRIES_TOTAL.with_label_values(&[purpose]).inc();
    }

    /// Record an ignored duplicate callback.
    pub fn duplicate_callback(kind: &str) {
        DUPLICATE_CALLBACKS_TOTAL.with_label_values(&[kind]).inc();
    }

    /// Record a failed broker call.
    pub fn broker_call_failed(op: &str) {
        BROKER_CALL_FAILURES_TOTAL.with_label_values(&[op]).inc();
    }

    /// Record broker call latency.
    pub fn broker_call_latency(op: &str, latency_ms: f64) {
        BROKER_CALL_LATENCY_MS
            .with_label_values(&[op])
            .observe(latency_ms);
    }

    /// Record a closed position.
    pub fn position_closed(side: &str, reason: &str, pnl_points: f64) {
        POSITIONS_CLOSED_TOTAL.with_label_values(&[reason]).inc();
        TRADE_PNL_POINTS
            .with_label_values(&[side, reason])
            .observe(pnl_points);
    }

    /// Set the open position's stop-loss (0 when flat).
    pub fn stop_loss_level(price: f64) {
        STOP_LOSS_LEVEL.set(price);
    }

    /// Publish the daily risk counters.
    pub fn daily_risk(trade_count: u32, realized_pnl: f64, halted: bool) {
        DAILY_TRADE_COUNT.set(i64::from(trade_count));
        DAILY_REALIZED_PNL.set(realized_pnl);
        RISK_HALTED.set(if halted { 1.0 } else { 0.0 });
    }

    /// Record a feed gap.
    pub fn feed_gap(source: &str) {
        FEED_GAPS_TOTAL.with_label_values(&[source]).inc();
    }

    /// Record a processed engine event.
    pub fn event_processed(kind: &str) {
        EVENTS_PROCESSED_TOTAL.with_label_values(&[kind]).inc();
    }
}
