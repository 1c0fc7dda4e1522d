//! Order attempt state machine.
//!
//! `Idle → Placed ⇄ Modifying → {Filled | Rejected | Cancelled}`
//!
//! At most one attempt is live. A superseding entry (or an exit that must
//! replace a working entry) waits in a single queue slot until the live
//! attempt is terminal. Cancellation is cooperative: it takes effect on the
//! broker's confirmation, and a fill that races it wins.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, trace, warn};
use zone_core::{
    AttemptId, AttemptPurpose, AttemptState, BrokerOrderId, ExitReason, OptionContract,
    OrderAttempt, OrderSide, Price, RejectReason,
};
use zone_telemetry::Metrics;

use crate::command::{
    AttemptEvent, BrokerCommand, BrokerEvent, ControllerOutput, OrderCommand, OrderRequest,
};
use crate::config::OrderConfig;
use crate::error::ExecutorError;

/// Orphan callbacks kept while waiting for placement acknowledgements.
const MAX_ORPHAN_CALLBACKS: usize = 256;

/// Broker call currently outstanding for the live attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BrokerOp {
    Place,
    Modify,
    Cancel,
}

/// The live attempt plus controller-side bookkeeping.
#[derive(Debug)]
struct Working {
    attempt: OrderAttempt,
    inflight: Option<BrokerOp>,
    timer_seq: u64,
    /// Price sent in the outstanding modify.
    pending_limit: Option<Price>,
    /// Re-placement after a rate-limit reject waits for the backoff timer.
    replace_pending: bool,
    /// A broker call failed in transport.
    call_failed: bool,
}

impl Working {
    fn new(attempt: OrderAttempt) -> Self {
        Self {
            attempt,
            inflight: None,
            timer_seq: 0,
            pending_limit: None,
            replace_pending: false,
            call_failed: false,
        }
    }
}

/// Latest option LTP and when it arrived.
#[derive(Debug, Clone, Copy)]
struct Quote {
    price: Price,
    at: DateTime<Utc>,
}

/// Order waiting for the live attempt to finish.
#[derive(Debug, Clone)]
struct QueuedOrder {
    id: AttemptId,
    purpose: AttemptPurpose,
    contract: OptionContract,
    order_side: OrderSide,
    quantity: u32,
}

/// Submission decision, taken before mutating.
enum Admission {
    Start,
    Absorb(AttemptId),
    Supersede,
}

/// Per-attempt placement, retry, supersede and cancellation.
#[derive(Debug)]
pub struct OrderController {
    config: OrderConfig,
    live: Option<Working>,
    queued: Option<QueuedOrder>,
    archive: HashMap<AttemptId, OrderAttempt>,
    by_broker_id: HashMap<BrokerOrderId, AttemptId>,
    orphans: HashMap<BrokerOrderId, Vec<BrokerEvent>>,
    quotes: HashMap<String, Quote>,
    next_seq: u64,
}

impl OrderController {
    pub fn new(config: OrderConfig) -> Self {
        Self {
            config,
            live: None,
            queued: None,
            archive: HashMap::new(),
            by_broker_id: HashMap::new(),
            orphans: HashMap::new(),
            quotes: HashMap::new(),
            next_seq: 0,
        }
    }

    // ========================================================================
    // Submissions
    // ========================================================================

    /// Buy `contract` for a new entry signal.
    ///
    /// A same-side signal while that side is working is absorbed. An
    /// opposite-side signal cancels the working entry and queues the new
    /// one behind it.
    pub fn submit_entry(
        &mut self,
        contract: OptionContract,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> ControllerOutput {
        let mut out = ControllerOutput::default();
        let kind = contract.kind;

        let admission = match (&self.live, &self.queued) {
            (_, Some(q)) if q.purpose.is_entry() && q.contract.kind == kind => {
                Admission::Absorb(q.id.clone())
            }
            (None, _) => Admission::Start,
            (Some(w), _) if !w.attempt.purpose.is_entry() => {
                warn!(
                    working = %w.attempt.id,
                    side = %kind,
                    "Entry submitted while an exit is working, ignoring"
                );
                Metrics::entry_suppressed("exit_working");
                return out;
            }
            (Some(w), _) if w.attempt.side == kind && !w.attempt.cancel_requested => {
                Admission::Absorb(w.attempt.id.clone())
            }
            (Some(_), _) => Admission::Supersede,
        };

        match admission {
            Admission::Absorb(attempt_id) => {
                debug!(%attempt_id, side = %kind, "Same-side entry absorbed");
                Metrics::entry_suppressed("absorbed");
                out.events.push(AttemptEvent::Absorbed { attempt_id });
            }
            Admission::Start => {
                self.start(
                    AttemptId::new(),
                    AttemptPurpose::Entry,
                    contract,
                    OrderSide::Buy,
                    quantity,
                    now,
                    &mut out,
                );
            }
            Admission::Supersede => {
                let id = AttemptId::new();
                if let Some(w) = self.live.as_mut() {
                    info!(
                        superseded = %w.attempt.id,
                        by = %id,
                        side = %kind,
                        "Opposite-side entry supersedes working attempt"
                    );
                    w.attempt.superseded_by = Some(id.clone());
                }
                self.queued = Some(QueuedOrder {
                    id,
                    purpose: AttemptPurpose::Entry,
                    contract,
                    order_side: OrderSide::Buy,
                    quantity,
                });
                self.request_cancel(now, &mut out);
            }
        }
        out
    }

    /// Sell `contract` to exit the open position.
    ///
    /// Returns the id of the attempt that carries the exit: the working exit
    /// if one exists, otherwise a new attempt. A working entry is cancelled
    /// and the exit queued behind it.
    pub fn submit_exit(
        &mut self,
        contract: OptionContract,
        quantity: u32,
        reason: ExitReason,
        now: DateTime<Utc>,
    ) -> (AttemptId, ControllerOutput) {
        let mut out = ControllerOutput::default();
        let purpose = AttemptPurpose::Exit(reason);

        if let Some(w) = &self.live {
            if !w.attempt.purpose.is_entry() {
                debug!(attempt_id = %w.attempt.id, %reason, "Exit already working");
                return (w.attempt.id.clone(), out);
            }
        }
        if let Some(q) = &self.queued {
            if !q.purpose.is_entry() {
                return (q.id.clone(), out);
            }
        }

        let id = AttemptId::new();
        if let Some(w) = self.live.as_mut() {
            info!(
                superseded = %w.attempt.id,
                by = %id,
                %reason,
                "Exit supersedes working entry"
            );
            w.attempt.superseded_by = Some(id.clone());
            self.queued = Some(QueuedOrder {
                id: id.clone(),
                purpose,
                contract,
                order_side: OrderSide::Sell,
                quantity,
            });
            self.request_cancel(now, &mut out);
        } else {
            self.start(
                id.clone(),
                purpose,
                contract,
                OrderSide::Sell,
                quantity,
                now,
                &mut out,
            );
        }
        (id, out)
    }

    /// Cancel the working entry and drop any queued entry.
    ///
    /// Used at session end and on risk halt. A fill that races the cancel
    /// still wins.
    pub fn cancel_entries(&mut self, now: DateTime<Utc>) -> ControllerOutput {
        let mut out = ControllerOutput::default();
        if self.queued.as_ref().is_some_and(|q| q.purpose.is_entry()) {
            if let Some(q) = self.queued.take() {
                info!(attempt_id = %q.id, "Queued entry dropped");
            }
        }
        if self.live.as_ref().is_some_and(|w| w.attempt.purpose.is_entry()) {
            self.request_cancel(now, &mut out);
        }
        out
    }

    /// Cancel the working exit and drop any queued exit.
    ///
    /// Used once the position is already closed by another exit order.
    pub fn cancel_exits(&mut self, now: DateTime<Utc>) -> ControllerOutput {
        let mut out = ControllerOutput::default();
        if self.queued.as_ref().is_some_and(|q| !q.purpose.is_entry()) {
            if let Some(q) = self.queued.take() {
                info!(attempt_id = %q.id, "Queued exit dropped");
            }
        }
        if self.live.as_ref().is_some_and(|w| !w.attempt.purpose.is_entry()) {
            if let Some(w) = &self.live {
                warn!(attempt_id = %w.attempt.id, "Position already closed, cancelling working exit");
            }
            self.request_cancel(now, &mut out);
        }
        out
    }

    // ========================================================================
    // Market data and timers
    // ========================================================================

    /// Record the latest option LTP. Places a live attempt that was waiting
    /// for a fresh quote.
    pub fn on_quote(
        &mut self,
        contract: &OptionContract,
        ltp: Price,
        now: DateTime<Utc>,
    ) -> ControllerOutput {
        let mut out = ControllerOutput::default();
        self.quotes
            .insert(contract.symbol.clone(), Quote { price: ltp, at: now });

        let waiting = self.live.as_ref().is_some_and(|w| {
            w.attempt.contract.symbol == contract.symbol
                && w.attempt.state == AttemptState::Idle
                && w.attempt.broker_order_id.is_none()
                && w.inflight.is_none()
                && !w.attempt.cancel_requested
                && !w.replace_pending
        });
        if waiting {
            let premium = self.config.initial_order_premium;
            if self.try_place(premium, now, &mut out) {
                self.record(&mut out);
            }
        }
        out
    }

    /// Retry timer expiry.
    ///
    /// Stale timers (older sequence number, or an attempt that is no longer
    /// live) are ignored.
    pub fn on_retry_timer(
        &mut self,
        attempt_id: &AttemptId,
        seq: u64,
        now: DateTime<Utc>,
    ) -> ControllerOutput {
        let mut out = ControllerOutput::default();
        let current = self
            .live
            .as_ref()
            .is_some_and(|w| &w.attempt.id == attempt_id && w.timer_seq == seq);
        if !current {
            trace!(%attempt_id, seq, "Stale retry timer");
            return out;
        }
        let Some(w) = self.live.as_mut() else {
            return out;
        };

        if w.inflight.is_some() {
            // Outstanding call resolves through its own event
            self.schedule_retry(self.config.retry_timeout(), &mut out);
            return out;
        }

        if w.attempt.cancel_requested {
            self.continue_cancel(now, &mut out);
            if self.live.is_some() {
                self.schedule_retry(self.config.retry_timeout(), &mut out);
            }
            return out;
        }

        if w.replace_pending {
            w.replace_pending = false;
            let premium = self.config.initial_order_premium;
            self.try_place(premium, now, &mut out);
            self.record(&mut out);
            self.schedule_retry(self.config.retry_timeout(), &mut out);
            return out;
        }

        if w.attempt.retries_used >= self.config.order_retry_limit {
            self.exhaust(now, &mut out);
            return out;
        }

        w.attempt.retries_used += 1;
        w.attempt.updated_at = now;
        Metrics::order_retry(w.attempt.purpose.label());

        let quote = fresh_quote(&self.quotes, &w.attempt.contract.symbol, now, &self.config);
        let gap = self.config.order_retry_gap;
        match (w.attempt.broker_order_id.clone(), quote) {
            (_, None) => {
                warn!(
                    attempt_id = %w.attempt.id,
                    contract = %w.attempt.contract,
                    retries_used = w.attempt.retries_used,
                    "No fresh option quote, retry consumed"
                );
                Metrics::feed_gap("option_quote");
            }
            (None, Some(_)) => {
                self.try_place(gap, now, &mut out);
            }
            (Some(broker_order_id), Some(ltp)) => {
                let price = aggressive_price(ltp, gap, w.attempt.order_side, self.config.tick_size);
                info!(
                    attempt_id = %w.attempt.id,
                    %broker_order_id,
                    from = %w.attempt.limit_price,
                    to = %price,
                    %ltp,
                    retries_used = w.attempt.retries_used,
                    "Re-pricing unfilled order"
                );
                w.attempt.transition(AttemptState::Modifying, now);
                w.pending_limit = Some(price);
                w.inflight = Some(BrokerOp::Modify);
                out.commands.push(OrderCommand::Broker(BrokerCommand::Modify {
                    attempt_id: w.attempt.id.clone(),
                    broker_order_id,
                    price,
                }));
            }
        }
        self.record(&mut out);
        self.schedule_retry(self.config.retry_timeout(), &mut out);
        out
    }

    // ========================================================================
    // Broker events
    // ========================================================================

    pub fn on_broker_event(&mut self, event: BrokerEvent, now: DateTime<Utc>) -> ControllerOutput {
        let mut out = ControllerOutput::default();
        match event {
            BrokerEvent::Placed {
                attempt_id,
                broker_order_id,
            } => self.on_placed(&attempt_id, broker_order_id, now, &mut out),
            BrokerEvent::PlaceFailed { attempt_id, error } => {
                self.on_place_failed(&attempt_id, error, now, &mut out)
            }
            BrokerEvent::Modified { attempt_id } => {
                if let Some(w) = self.live_mut(&attempt_id) {
                    w.inflight = None;
                    if let Some(price) = w.pending_limit.take() {
                        w.attempt.limit_price = price;
                    }
                    if w.attempt.state == AttemptState::Modifying {
                        w.attempt.transition(AttemptState::Placed, now);
                    }
                    self.record(&mut out);
                    self.continue_cancel(now, &mut out);
                }
            }
            BrokerEvent::ModifyFailed { attempt_id, error } => {
                if let Some(w) = self.live_mut(&attempt_id) {
                    warn!(%attempt_id, error = %error, "Modify failed");
                    Metrics::broker_call_failed("modify");
                    w.inflight = None;
                    w.pending_limit = None;
                    w.call_failed |= error.is_recoverable();
                    if w.attempt.state == AttemptState::Modifying {
                        w.attempt.transition(AttemptState::Placed, now);
                    }
                    self.record(&mut out);
                    self.continue_cancel(now, &mut out);
                }
            }
            BrokerEvent::CancelConfirmed { attempt_id } => {
                if let Some(w) = self.live_mut(&attempt_id) {
                    w.inflight = None;
                    self.finish_cancelled(now, &mut out);
                } else {
                    trace!(%attempt_id, "Cancel confirmation for finished attempt");
                }
            }
            BrokerEvent::CancelFailed { attempt_id, error } => {
                if let Some(w) = self.live_mut(&attempt_id) {
                    // Retried on the next timer; a racing fill may be the cause
                    warn!(%attempt_id, error = %error, "Cancel failed");
                    Metrics::broker_call_failed("cancel");
                    w.inflight = None;
                    w.call_failed |= error.is_recoverable();
                }
            }
            BrokerEvent::Filled { .. } | BrokerEvent::Rejected { .. } => {
                self.on_callback(event, now, &mut out);
            }
        }
        out
    }

    fn on_placed(
        &mut self,
        attempt_id: &AttemptId,
        broker_order_id: BrokerOrderId,
        now: DateTime<Utc>,
        out: &mut ControllerOutput,
    ) {
        self.by_broker_id
            .insert(broker_order_id.clone(), attempt_id.clone());

        let Some(w) = self.live_mut(attempt_id) else {
            if self.archive.contains_key(attempt_id) {
                // Finished locally before the broker acknowledged it
                warn!(
                    %attempt_id,
                    %broker_order_id,
                    "Placement acknowledged for finished attempt, cancelling"
                );
                out.commands.push(OrderCommand::Broker(BrokerCommand::Cancel {
                    attempt_id: attempt_id.clone(),
                    broker_order_id: broker_order_id.clone(),
                }));
            }
            self.replay_orphans(&broker_order_id, now, out);
            return;
        };

        w.inflight = None;
        w.attempt.place_pending = false;
        w.attempt.broker_order_id = Some(broker_order_id.clone());
        if w.attempt.state == AttemptState::Idle {
            w.attempt.transition(AttemptState::Placed, now);
        }
        info!(
            %attempt_id,
            %broker_order_id,
            limit = %w.attempt.limit_price,
            "Order placed"
        );
        self.record(out);

        self.replay_orphans(&broker_order_id, now, out);
        if self.live_mut(attempt_id).is_some() {
            self.continue_cancel(now, out);
        }
    }

    fn on_place_failed(
        &mut self,
        attempt_id: &AttemptId,
        error: ExecutorError,
        now: DateTime<Utc>,
        out: &mut ControllerOutput,
    ) {
        let Some(w) = self.live_mut(attempt_id) else {
            return;
        };
        w.inflight = None;
        w.attempt.place_pending = false;

        match error {
            ExecutorError::Rejected(code) => self.reject_live(&code, now, out),
            error => {
                warn!(%attempt_id, error = %error, "Placement failed, retrying on next timer");
                Metrics::broker_call_failed("place");
                w.call_failed = true;
                self.record(out);
                self.continue_cancel(now, out);
            }
        }
    }

    /// Asynchronous fill or reject, matched by broker order id.
    fn on_callback(&mut self, event: BrokerEvent, now: DateTime<Utc>, out: &mut ControllerOutput) {
        let broker_order_id = match &event {
            BrokerEvent::Filled {
                broker_order_id, ..
            }
            | BrokerEvent::Rejected {
                broker_order_id, ..
            } => broker_order_id.clone(),
            _ => return,
        };

        let Some(attempt_id) = self.by_broker_id.get(&broker_order_id).cloned() else {
            let buffered: usize = self.orphans.values().map(Vec::len).sum();
            if buffered >= MAX_ORPHAN_CALLBACKS {
                warn!(%broker_order_id, kind = event.kind(), "Orphan buffer full, dropping callback");
                return;
            }
            debug!(%broker_order_id, kind = event.kind(), "Callback before placement ack, buffering");
            self.orphans.entry(broker_order_id).or_default().push(event);
            return;
        };

        let is_live = self
            .live
            .as_ref()
            .is_some_and(|w| w.attempt.id == attempt_id);

        match event {
            BrokerEvent::Filled { price, .. } if is_live => self.fill_live(price, now, out),
            BrokerEvent::Filled { price, .. } => self.fill_archived(&attempt_id, price, now, out),
            BrokerEvent::Rejected { reason_code, .. } if is_live => {
                self.reject_live(&reason_code, now, out)
            }
            BrokerEvent::Rejected { reason_code, .. } => {
                let kind = match self.archive.get(&attempt_id).map(|a| a.state) {
                    Some(AttemptState::Filled) => "reject_after_fill",
                    _ => "reject",
                };
                debug!(%attempt_id, %reason_code, kind, "Reject for finished attempt ignored");
                Metrics::duplicate_callback(kind);
            }
            _ => {}
        }
    }

    fn replay_orphans(
        &mut self,
        broker_order_id: &BrokerOrderId,
        now: DateTime<Utc>,
        out: &mut ControllerOutput,
    ) {
        if let Some(events) = self.orphans.remove(broker_order_id) {
            for event in events {
                debug!(%broker_order_id, kind = event.kind(), "Replaying buffered callback");
                self.on_callback(event, now, out);
            }
        }
    }

    fn fill_live(&mut self, price: Price, now: DateTime<Utc>, out: &mut ControllerOutput) {
        let Some(w) = self.live.as_mut() else {
            return;
        };
        w.inflight = None;
        w.pending_limit = None;
        w.attempt.exhausted = false;
        w.attempt.mark_filled(price, now);
        info!(
            attempt_id = %w.attempt.id,
            purpose = w.attempt.purpose.label(),
            contract = %w.attempt.contract,
            %price,
            retries_used = w.attempt.retries_used,
            "Order filled"
        );
        self.finish(now, out);
    }

    fn fill_archived(
        &mut self,
        attempt_id: &AttemptId,
        price: Price,
        now: DateTime<Utc>,
        out: &mut ControllerOutput,
    ) {
        let Some(attempt) = self.archive.get_mut(attempt_id) else {
            return;
        };
        if attempt.state == AttemptState::Filled {
            debug!(%attempt_id, %price, "Duplicate fill ignored");
            Metrics::duplicate_callback("fill");
            return;
        }

        warn!(
            %attempt_id,
            local_state = %attempt.state,
            %price,
            "Fill for finished attempt, reconciling to broker"
        );
        attempt.exhausted = false;
        attempt.mark_filled(price, now);
        Metrics::order_attempt(attempt.purpose.label(), "filled");
        out.commands.push(OrderCommand::Record(attempt.clone()));
        out.events.push(AttemptEvent::Filled {
            attempt: attempt.clone(),
            price,
            reconciled: true,
        });
    }

    fn reject_live(&mut self, code: &str, now: DateTime<Utc>, out: &mut ControllerOutput) {
        let backoff = self.config.rate_limit_backoff();
        let Some(w) = self.live.as_mut() else {
            return;
        };
        let reason = RejectReason::classify(code);

        if reason == RejectReason::RateLimited
            && !w.attempt.rate_limit_replaced
            && !w.attempt.cancel_requested
        {
            warn!(
                attempt_id = %w.attempt.id,
                reason_code = code,
                backoff_ms = backoff.as_millis() as u64,
                "Rate limited, re-placing once after backoff"
            );
            w.attempt.rate_limit_replaced = true;
            w.attempt.broker_order_id = None;
            w.attempt.place_pending = false;
            w.attempt.transition(AttemptState::Idle, now);
            w.inflight = None;
            w.replace_pending = true;
            self.record(out);
            self.schedule_retry(backoff, out);
            return;
        }

        warn!(
            attempt_id = %w.attempt.id,
            purpose = w.attempt.purpose.label(),
            reason_code = code,
            %reason,
            "Order rejected"
        );
        w.inflight = None;
        w.attempt.mark_rejected(reason, now);
        self.finish(now, out);
    }

    // ========================================================================
    // Internals
    // ========================================================================

    #[allow(clippy::too_many_arguments)]
    fn start(
        &mut self,
        id: AttemptId,
        purpose: AttemptPurpose,
        contract: OptionContract,
        order_side: OrderSide,
        quantity: u32,
        now: DateTime<Utc>,
        out: &mut ControllerOutput,
    ) {
        let attempt = OrderAttempt::new(id, purpose, contract, order_side, quantity, now);
        info!(
            attempt_id = %attempt.id,
            purpose = purpose.label(),
            contract = %attempt.contract,
            side = %order_side,
            quantity,
            "Order attempt created"
        );
        self.live = Some(Working::new(attempt));

        let premium = self.config.initial_order_premium;
        if !self.try_place(premium, now, out) {
            if let Some(w) = &self.live {
                warn!(
                    attempt_id = %w.attempt.id,
                    contract = %w.attempt.contract,
                    "No fresh option quote, placement waits for the next tick"
                );
            }
            Metrics::feed_gap("option_quote");
        }
        self.record(out);
        self.schedule_retry(self.config.retry_timeout(), out);
    }

    /// Send a placement priced `offset` through the latest LTP.
    fn try_place(&mut self, offset: Decimal, now: DateTime<Utc>, out: &mut ControllerOutput) -> bool {
        let Some(w) = self.live.as_ref() else {
            return false;
        };
        let Some(ltp) = fresh_quote(&self.quotes, &w.attempt.contract.symbol, now, &self.config)
        else {
            return false;
        };
        let price = aggressive_price(ltp, offset, w.attempt.order_side, self.config.tick_size);

        let Some(w) = self.live.as_mut() else {
            return false;
        };
        w.attempt.limit_price = price;
        w.attempt.place_pending = true;
        w.attempt.updated_at = now;
        w.inflight = Some(BrokerOp::Place);
        debug!(attempt_id = %w.attempt.id, %ltp, limit = %price, "Placing order");
        out.commands.push(OrderCommand::Broker(BrokerCommand::Place {
            request: OrderRequest {
                attempt_id: w.attempt.id.clone(),
                contract: w.attempt.contract.clone(),
                side: w.attempt.order_side,
                quantity: w.attempt.quantity,
                limit_price: price,
            },
        }));
        true
    }

    fn schedule_retry(&mut self, after: std::time::Duration, out: &mut ControllerOutput) {
        let Some(w) = self.live.as_mut() else {
            return;
        };
        self.next_seq += 1;
        w.timer_seq = self.next_seq;
        out.commands.push(OrderCommand::ScheduleRetry {
            attempt_id: w.attempt.id.clone(),
            seq: self.next_seq,
            after,
        });
    }

    fn record(&self, out: &mut ControllerOutput) {
        if let Some(w) = &self.live {
            out.commands.push(OrderCommand::Record(w.attempt.clone()));
        }
    }

    fn live_mut(&mut self, attempt_id: &AttemptId) -> Option<&mut Working> {
        self.live
            .as_mut()
            .filter(|w| &w.attempt.id == attempt_id)
    }

    /// Mark the live attempt for cancellation and send the cancel when
    /// possible.
    fn request_cancel(&mut self, now: DateTime<Utc>, out: &mut ControllerOutput) {
        let Some(w) = self.live.as_mut() else {
            return;
        };
        if !w.attempt.cancel_requested {
            w.attempt.cancel_requested = true;
            w.attempt.updated_at = now;
            debug!(attempt_id = %w.attempt.id, "Cancel requested");
            self.record(out);
        }
        self.continue_cancel(now, out);
    }

    /// Progress a requested cancel once no other call is outstanding.
    fn continue_cancel(&mut self, now: DateTime<Utc>, out: &mut ControllerOutput) {
        let Some(w) = self.live.as_mut() else {
            return;
        };
        if !w.attempt.cancel_requested || w.inflight.is_some() || w.attempt.is_terminal() {
            return;
        }
        match w.attempt.broker_order_id.clone() {
            Some(broker_order_id) => {
                w.inflight = Some(BrokerOp::Cancel);
                out.commands.push(OrderCommand::Broker(BrokerCommand::Cancel {
                    attempt_id: w.attempt.id.clone(),
                    broker_order_id,
                }));
            }
            // Never reached the broker
            None => self.finish_cancelled(now, out),
        }
    }

    /// Retry budget used up: cancel whatever rests at the broker.
    fn exhaust(&mut self, now: DateTime<Utc>, out: &mut ControllerOutput) {
        let Some(w) = self.live.as_mut() else {
            return;
        };
        warn!(
            attempt_id = %w.attempt.id,
            purpose = w.attempt.purpose.label(),
            retries_used = w.attempt.retries_used,
            "Retry limit reached, cancelling"
        );
        w.attempt.exhausted = true;
        self.request_cancel(now, out);
        if self.live.is_some() {
            self.schedule_retry(self.config.retry_timeout(), out);
        }
    }

    /// Cancel took effect: `Cancelled`, or `Rejected` when retries ran out.
    fn finish_cancelled(&mut self, now: DateTime<Utc>, out: &mut ControllerOutput) {
        let has_quote = self.live.as_ref().is_some_and(|w| {
            fresh_quote(&self.quotes, &w.attempt.contract.symbol, now, &self.config).is_some()
        });
        let Some(w) = self.live.as_mut() else {
            return;
        };
        if w.attempt.exhausted {
            let reason = if w.attempt.broker_order_id.is_some() {
                RejectReason::RetriesExhausted
            } else if !has_quote {
                RejectReason::QuoteUnavailable
            } else if w.call_failed {
                RejectReason::BrokerUnreachable
            } else {
                RejectReason::RetriesExhausted
            };
            w.attempt.cancel_requested = false;
            w.attempt.mark_rejected(reason, now);
        } else {
            w.attempt.cancel_requested = false;
            w.attempt.transition(AttemptState::Cancelled, now);
            info!(attempt_id = %w.attempt.id, "Order cancelled");
        }
        self.finish(now, out);
    }

    /// Archive the terminal live attempt and start the queued order.
    fn finish(&mut self, now: DateTime<Utc>, out: &mut ControllerOutput) {
        let Some(w) = self.live.take() else {
            return;
        };
        let attempt = w.attempt;
        Metrics::order_attempt(attempt.purpose.label(), &attempt.state.to_string());
        out.commands.push(OrderCommand::Record(attempt.clone()));

        let event = match attempt.state {
            AttemptState::Filled => AttemptEvent::Filled {
                price: attempt.fill_price.unwrap_or(attempt.limit_price),
                attempt: attempt.clone(),
                reconciled: false,
            },
            AttemptState::Rejected => AttemptEvent::Rejected {
                attempt: attempt.clone(),
            },
            _ => AttemptEvent::Cancelled {
                attempt: attempt.clone(),
            },
        };
        out.events.push(event);

        if attempt.state == AttemptState::Filled
            && self.queued.as_ref().is_some_and(|q| q.purpose.is_entry())
        {
            if let Some(q) = self.queued.take() {
                info!(
                    filled = %attempt.id,
                    dropped = %q.id,
                    "Superseded attempt filled, queued entry dropped"
                );
            }
        }
        self.archive.insert(attempt.id.clone(), attempt);

        if let Some(q) = self.queued.take() {
            self.start(q.id, q.purpose, q.contract, q.order_side, q.quantity, now, out);
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The non-terminal attempt, if any.
    #[must_use]
    pub fn live(&self) -> Option<&OrderAttempt> {
        self.live.as_ref().map(|w| &w.attempt)
    }

    #[must_use]
    pub fn queued_id(&self) -> Option<&AttemptId> {
        self.queued.as_ref().map(|q| &q.id)
    }

    /// Look up an attempt, live or archived.
    #[must_use]
    pub fn attempt(&self, id: &AttemptId) -> Option<&OrderAttempt> {
        self.live()
            .filter(|a| &a.id == id)
            .or_else(|| self.archive.get(id))
    }

    /// No live attempt and nothing queued.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.live.is_none() && self.queued.is_none()
    }

    #[must_use]
    pub fn last_quote(&self, contract: &OptionContract) -> Option<Price> {
        self.quotes.get(&contract.symbol).map(|q| q.price)
    }

    /// When the last quote for `contract` arrived.
    #[must_use]
    pub fn quote_time(&self, contract: &OptionContract) -> Option<DateTime<Utc>> {
        self.quotes.get(&contract.symbol).map(|q| q.at)
    }

    /// A quote for `contract` exists but is older than `max_quote_age_ms`.
    #[must_use]
    pub fn quote_is_stale(&self, contract: &OptionContract, now: DateTime<Utc>) -> bool {
        self.quotes
            .get(&contract.symbol)
            .is_some_and(|q| now - q.at > self.config.max_quote_age())
    }

    #[must_use]
    pub fn config(&self) -> &OrderConfig {
        &self.config
    }

    /// Drop archived attempts and quotes from a previous day.
    ///
    /// Broker id mappings are kept so late callbacks still reconcile.
    pub fn clear_day(&mut self) {
        self.archive
            .retain(|_, a| a.state == AttemptState::Filled);
        self.quotes.clear();
        self.orphans.clear();
    }
}

/// Latest LTP for `symbol` unless it has aged out.
fn fresh_quote(
    quotes: &HashMap<String, Quote>,
    symbol: &str,
    now: DateTime<Utc>,
    config: &OrderConfig,
) -> Option<Price> {
    quotes
        .get(symbol)
        .filter(|q| now - q.at <= config.max_quote_age())
        .map(|q| q.price)
}

/// Limit price that crosses the LTP by `offset`, on the exchange tick.
fn aggressive_price(ltp: Price, offset: Decimal, side: OrderSide, tick: Decimal) -> Price {
    let raw = match side {
        OrderSide::Buy => ltp.offset(offset),
        OrderSide::Sell => ltp.offset(-offset),
    };
    let rounded = raw.round_to_tick(tick);
    if rounded.is_positive() {
        rounded
    } else {
        Price::new(tick)
    }
}
