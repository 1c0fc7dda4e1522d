//! Session engine.
//!
//! Owns the per-session context (zone tracker, signal detector, order
//! controller, position manager, risk governor) and applies one
//! [`EngineEvent`] at a time. The engine never performs I/O: every call
//! returns the [`Effect`]s the runtime must carry out, so the same event
//! sequence always produces the same decisions.

use chrono::{DateTime, NaiveDate, Utc};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use zone_core::{
    select_strike, EntryBlock, EntrySignal, ExitReason, HaltReason, Instrument, OptionContract,
    OptionKind, OrderAttempt, Position, Price, SessionSchedule, Tick, TradingError, ZoneSet,
};
use zone_detector::{SignalDetector, ZoneConfig, ZoneInit, ZoneTracker};
use zone_executor::{AttemptEvent, ControllerOutput, OrderCommand, OrderController};
use zone_persistence::SessionSnapshot;
use zone_position::PositionManager;
use zone_risk::{BookOutcome, RiskGovernor};
use zone_telemetry::{DomainEvent, DomainEventKind, Metrics};

use crate::clock::{ClockTrigger, SessionClock};
use crate::config::{AppConfig, InstrumentConfig};
use crate::event::{Effect, EngineEvent, OperatorCommand, TimerKind};

// ============================================================================
// Session State
// ============================================================================

/// Where the current session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Waiting for zone computation.
    Setup,
    /// Zones published, entries allowed subject to risk.
    Trading,
    /// Session end reached, waiting for the book to go flat.
    Flattening,
    /// Flat after session end; `SessionEnded` published.
    Ended,
}

/// CE and PE contracts fixed at zone computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContracts {
    pub ce: OptionContract,
    pub pe: OptionContract,
}

impl SessionContracts {
    #[must_use]
    pub fn for_kind(&self, kind: OptionKind) -> &OptionContract {
        match kind {
            OptionKind::Ce => &self.ce,
            OptionKind::Pe => &self.pe,
        }
    }
}

/// Effects collected while handling one event. Snapshot requests are
/// coalesced into a single save at the end.
#[derive(Debug, Default)]
struct Outbox {
    effects: Vec<Effect>,
    snapshot: bool,
}

impl Outbox {
    fn push(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    fn publish(&mut self, at: DateTime<Utc>, kind: DomainEventKind) {
        self.effects.push(Effect::Publish(DomainEvent::new(at, kind)));
    }
}

// ============================================================================
// Engine
// ============================================================================

pub struct Engine {
    instrument: InstrumentConfig,
    zone_config: ZoneConfig,
    clock: SessionClock,
    date: Option<NaiveDate>,
    status: SessionStatus,
    tracker: ZoneTracker,
    detector: SignalDetector,
    controller: OrderController,
    positions: PositionManager,
    risk: RiskGovernor,
    contracts: Option<SessionContracts>,
    last_index: Option<Tick>,
    zone_retries: u32,
}

impl Engine {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            instrument: config.instrument.clone(),
            zone_config: config.zones.clone(),
            clock: SessionClock::new(config.session.schedule.clone()),
            date: None,
            status: SessionStatus::Setup,
            tracker: ZoneTracker::new(config.zones.zone_offset),
            detector: SignalDetector::new(config.zones.middle_touch_tolerance),
            controller: OrderController::new(config.orders.clone()),
            positions: PositionManager::new(config.position.clone()),
            risk: RiskGovernor::new(config.risk.clone(), None),
            contracts: None,
            last_index: None,
            zone_retries: 0,
        }
    }

    /// Apply one event and return the effects to execute.
    pub fn handle(&mut self, event: EngineEvent, now: DateTime<Utc>) -> Vec<Effect> {
        let mut out = Outbox::default();
        let kind = event.kind();

        self.advance_clock(now, &mut out);

        match event {
            EngineEvent::Tick(tick) => self.on_tick(tick, now, &mut out),
            EngineEvent::Clock => {}
            EngineEvent::Timer(TimerKind::OrderRetry { attempt_id, seq }) => {
                let output = self.controller.on_retry_timer(&attempt_id, seq, now);
                self.apply_controller(output, now, &mut out);
            }
            EngineEvent::Timer(TimerKind::ZoneRetry { date }) => {
                if self.date == Some(date) {
                    self.try_compute_zones(now, &mut out);
                }
            }
            EngineEvent::Broker(broker_event) => {
                let output = self.controller.on_broker_event(broker_event, now);
                self.apply_controller(output, now, &mut out);
            }
            EngineEvent::Command(command) => self.on_command(command, now, &mut out),
        }

        self.check_session_complete(now, &mut out);
        Metrics::event_processed(kind);

        if out.snapshot {
            out.effects
                .push(Effect::SaveSnapshot(Box::new(self.snapshot(now))));
        }
        out.effects
    }

    /// Reload persisted state after a restart.
    ///
    /// Zones, gates and risk counters are restored only for the same
    /// session date; an open position is restored regardless. A restored
    /// position owed a forced exit (halted day or session flatten) gets
    /// that exit requested again here.
    pub fn restore(&mut self, snapshot: SessionSnapshot, now: DateTime<Utc>) -> Vec<Effect> {
        let mut out = Outbox::default();
        let today = self.schedule().local_date(now);

        if snapshot.date == today {
            self.start_day(today);
            self.risk.restore(snapshot.risk, now);
            if let Some(zones) = snapshot.zones {
                match self.contracts_for(&zones, today) {
                    Ok(contracts) => {
                        self.subscribe_contracts(&contracts, &mut out);
                        self.contracts = Some(contracts);
                    }
                    Err(e) => warn!(error = %e, "Failed to rebuild session contracts"),
                }
                self.tracker.restore(zones, snapshot.gate);
                self.status = SessionStatus::Trading;
            }
            if matches!(self.risk.state().entry_block, Some(EntryBlock::SessionEnded)) {
                self.status = SessionStatus::Flattening;
            }
        } else {
            info!(
                snapshot_date = %snapshot.date,
                %today,
                "Snapshot from a previous session, restoring position only"
            );
        }

        if let Some(position) = snapshot.position {
            out.push(Effect::Subscribe(Instrument::from(position.contract.clone())));
            self.positions.restore(position);

            if self.risk.is_halted() {
                info!("Restored position on a halted day, resuming exit");
                self.request_exit(ExitReason::RiskHalt, now, &mut out);
            } else if self.status == SessionStatus::Flattening {
                info!("Restored position after session end, resuming flatten");
                self.request_exit(ExitReason::SessionFlatten, now, &mut out);
            }
        }
        out.effects
    }

    /// Current session state for persistence.
    #[must_use]
    pub fn snapshot(&self, now: DateTime<Utc>) -> SessionSnapshot {
        SessionSnapshot {
            saved_at: now,
            date: self.date.unwrap_or_else(|| self.schedule().local_date(now)),
            zones: self.tracker.zones().cloned(),
            gate: self.tracker.gate(),
            risk: self.risk.state().clone(),
            position: self.positions.current().cloned(),
        }
    }

    // ========================================================================
    // Session clock
    // ========================================================================

    fn advance_clock(&mut self, now: DateTime<Utc>, out: &mut Outbox) {
        for trigger in self.clock.poll(now) {
            match trigger {
                ClockTrigger::NewDay(date) => {
                    if self.date != Some(date) {
                        self.start_day(date);
                        out.snapshot = true;
                    }
                }
                ClockTrigger::ZoneCalc => {
                    if self.tracker.init_state() == ZoneInit::Pending {
                        self.try_compute_zones(now, out);
                    }
                }
                ClockTrigger::LateStart => {
                    if self.tracker.init_state() == ZoneInit::Pending {
                        let grace = self.schedule().zone_calc_grace_secs;
                        self.session_init_failed(
                            &format!("started more than {grace}s after zone calc time"),
                            now,
                            out,
                        );
                    }
                }
                ClockTrigger::SessionEnd => self.begin_session_end(now, out),
            }
        }
    }

    /// Reset the per-session context. An open position is carried over.
    fn start_day(&mut self, date: NaiveDate) {
        if let Some(previous) = self.date {
            info!(%previous, %date, "Session rollover");
        }
        self.date = Some(date);
        self.status = SessionStatus::Setup;
        self.tracker.reset();
        self.risk.reset(date);
        self.controller.clear_day();
        self.contracts = None;
        self.last_index = None;
        self.zone_retries = 0;
    }

    fn begin_session_end(&mut self, now: DateTime<Utc>, out: &mut Outbox) {
        if matches!(self.status, SessionStatus::Flattening | SessionStatus::Ended) {
            return;
        }
        info!(
            has_position = self.positions.has_position(),
            live_attempt = self.controller.live().is_some(),
            "Session end, flattening"
        );
        self.status = SessionStatus::Flattening;
        self.risk.block_entries(EntryBlock::SessionEnded);

        let output = self.controller.cancel_entries(now);
        self.apply_controller(output, now, out);
        self.request_exit(ExitReason::SessionFlatten, now, out);
        out.snapshot = true;
    }

    /// Publish `SessionEnded` once the book is flat and no order is live.
    fn check_session_complete(&mut self, now: DateTime<Utc>, out: &mut Outbox) {
        if self.status != SessionStatus::Flattening
            || self.positions.has_position()
            || !self.controller.is_idle()
        {
            return;
        }
        self.status = SessionStatus::Ended;
        let risk = self.risk.state().clone();
        info!(
            trade_count = risk.trade_count,
            realized_pnl = %risk.realized_pnl,
            "Session ended flat"
        );
        out.publish(now, DomainEventKind::SessionEnded { risk });
        out.snapshot = true;
    }

    // ========================================================================
    // Zones
    // ========================================================================

    /// Compute zones from the latest valid index tick, or schedule a retry.
    fn try_compute_zones(&mut self, now: DateTime<Utc>, out: &mut Outbox) {
        if self.tracker.init_state() != ZoneInit::Pending {
            return;
        }
        let Some(date) = self.date else {
            return;
        };

        let max_age = i64::try_from(self.zone_config.max_tick_age_ms).unwrap_or(i64::MAX);
        let schedule = self.clock.schedule();
        let valid = self
            .last_index
            .as_ref()
            .filter(|t| schedule.local_date(t.timestamp) == date && t.age_ms(now) <= max_age)
            .map(|t| t.price);

        let Some(index_ltp) = valid else {
            if self.zone_retries >= self.zone_config.zone_retry_limit {
                let reason = format!(
                    "no valid index tick after {} retries",
                    self.zone_retries
                );
                self.session_init_failed(&reason, now, out);
                return;
            }
            self.zone_retries += 1;
            let gap = TradingError::FeedGap("index tick for zone computation".into());
            warn!(
                error = %gap,
                retry = self.zone_retries,
                limit = self.zone_config.zone_retry_limit,
                "Zone computation deferred"
            );
            Metrics::feed_gap("index");
            if self.zone_retries == 1 {
                out.publish(
                    now,
                    DomainEventKind::FeedGap {
                        feed: "index".into(),
                        last_seen: self.last_index.as_ref().map(|t| t.timestamp),
                    },
                );
            }
            out.push(Effect::Schedule {
                timer: TimerKind::ZoneRetry { date },
                after: Duration::from_millis(self.zone_config.zone_retry_interval_ms),
            });
            return;
        };

        let zones = match self
            .tracker
            .initialize(index_ltp, self.instrument.strike_step, date, now)
        {
            Ok(zones) => zones.clone(),
            Err(e) => {
                self.session_init_failed(&e.to_string(), now, out);
                return;
            }
        };
        let contracts = match self.contracts_for(&zones, date) {
            Ok(contracts) => contracts,
            Err(e) => {
                self.session_init_failed(&e.to_string(), now, out);
                return;
            }
        };

        info!(ce = %contracts.ce, pe = %contracts.pe, "Session contracts selected");
        self.subscribe_contracts(&contracts, out);
        out.publish(
            now,
            DomainEventKind::ZoneComputed {
                zones,
                ce_contract: contracts.ce.clone(),
                pe_contract: contracts.pe.clone(),
            },
        );
        self.contracts = Some(contracts);
        if self.status == SessionStatus::Setup {
            self.status = SessionStatus::Trading;
        }
        out.snapshot = true;
    }

    fn contracts_for(
        &self,
        zones: &ZoneSet,
        date: NaiveDate,
    ) -> zone_core::Result<SessionContracts> {
        let step = self.instrument.strike_step;
        let distance = self.zone_config.min_atm_distance;
        let expiry = self.instrument.expiry_for(date);
        let underlying = &self.instrument.underlying;
        let ce = select_strike(OptionKind::Ce, zones.middle, step, distance)?;
        let pe = select_strike(OptionKind::Pe, zones.middle, step, distance)?;
        Ok(SessionContracts {
            ce: OptionContract::new(underlying, expiry, OptionKind::Ce, ce),
            pe: OptionContract::new(underlying, expiry, OptionKind::Pe, pe),
        })
    }

    fn subscribe_contracts(&self, contracts: &SessionContracts, out: &mut Outbox) {
        out.push(Effect::Subscribe(Instrument::from(contracts.ce.clone())));
        out.push(Effect::Subscribe(Instrument::from(contracts.pe.clone())));
    }

    fn session_init_failed(&mut self, reason: &str, now: DateTime<Utc>, out: &mut Outbox) {
        let failure = TradingError::SessionTimeout(reason.to_string());
        error!(error = %failure, at = %now, "Session init failed, entries blocked for the day");
        self.tracker.mark_failed(reason);
        self.risk.block_entries(EntryBlock::SessionInitFailed);
        Metrics::zone_init_failed();
        out.snapshot = true;
    }

    // ========================================================================
    // Market data
    // ========================================================================

    fn on_tick(&mut self, tick: Tick, now: DateTime<Utc>, out: &mut Outbox) {
        match &tick.instrument {
            Instrument::Index { symbol } => {
                if symbol != &self.instrument.index_symbol {
                    debug!(%symbol, "Tick for unknown index ignored");
                    return;
                }
                self.on_index_tick(tick, now, out);
            }
            Instrument::Option { contract } => {
                let contract = contract.clone();
                self.on_option_tick(&contract, tick.price, now, out);
            }
        }
    }

    fn on_index_tick(&mut self, tick: Tick, now: DateTime<Utc>, out: &mut Outbox) {
        self.last_index = Some(tick.clone());

        // Data came back while zone computation is retrying
        if self.zone_retries > 0 && self.tracker.init_state() == ZoneInit::Pending {
            self.try_compute_zones(now, out);
        }

        let outcome =
            self.detector
                .on_index_tick(&mut self.tracker, &tick, self.positions.open_kind());
        if outcome.gate_changed {
            out.snapshot = true;
        }
        if let Some(signal) = outcome.signal {
            self.on_signal(signal, now, out);
        }
    }

    fn on_signal(&mut self, signal: EntrySignal, now: DateTime<Utc>, out: &mut Outbox) {
        let kind = signal.kind;
        out.publish(now, DomainEventKind::EntrySignaled { signal });

        if let Err(block) = self.risk.check_entry() {
            info!(side = %kind, reason = %block, "Entry suppressed by risk governor");
            Metrics::entry_suppressed(block.label());
            return;
        }
        let Some(contract) = self.contracts.as_ref().map(|c| c.for_kind(kind).clone()) else {
            warn!(side = %kind, "No session contract, entry skipped");
            Metrics::entry_suppressed("no_contract");
            return;
        };

        let max_age = i64::try_from(self.zone_config.max_tick_age_ms).unwrap_or(i64::MAX);
        let index_stale = self
            .last_index
            .as_ref()
            .map_or(true, |t| t.age_ms(now) > max_age);
        let gap = if index_stale {
            Some((
                "index",
                "index".to_string(),
                self.last_index.as_ref().map(|t| t.timestamp),
            ))
        } else if self.controller.quote_is_stale(&contract, now) {
            Some((
                "option_quote",
                contract.symbol.clone(),
                self.controller.quote_time(&contract),
            ))
        } else {
            None
        };
        if let Some((source, feed, last_seen)) = gap {
            let err = TradingError::FeedGap(feed.clone());
            warn!(side = %kind, error = %err, "Stale market data, entry skipped");
            Metrics::feed_gap(source);
            Metrics::entry_suppressed("feed_gap");
            out.publish(now, DomainEventKind::FeedGap { feed, last_seen });
            return;
        }

        let output = self
            .controller
            .submit_entry(contract, self.instrument.quantity, now);
        self.apply_controller(output, now, out);
    }

    fn on_option_tick(
        &mut self,
        contract: &OptionContract,
        ltp: Price,
        now: DateTime<Utc>,
        out: &mut Outbox,
    ) {
        let output = self.controller.on_quote(contract, ltp, now);
        self.apply_controller(output, now, out);

        let unrealized = match self.positions.current() {
            Some(pos) if pos.contract.symbol == contract.symbol => pos.unrealized_pnl(ltp),
            _ => return,
        };

        let outcome = self.positions.on_tick(ltp, now);
        if outcome.stop_moved.is_some() {
            out.snapshot = true;
        }

        if let Some(reason) = self.risk.check_mark_to_market(unrealized, now) {
            self.on_halt(reason, now, out);
        }
        if let Some(reason) = outcome.exit {
            self.request_exit(reason, now, out);
        }
    }

    // ========================================================================
    // Orders and positions
    // ========================================================================

    fn request_exit(&mut self, reason: ExitReason, now: DateTime<Utc>, out: &mut Outbox) {
        let Some(request) = self.positions.begin_exit(reason, now) else {
            return;
        };
        let (attempt_id, output) =
            self.controller
                .submit_exit(request.contract, request.quantity, reason, now);
        self.positions.attach_exit_attempt(attempt_id);
        self.apply_controller(output, now, out);
        out.snapshot = true;
    }

    fn apply_controller(&mut self, output: ControllerOutput, now: DateTime<Utc>, out: &mut Outbox) {
        let date = self.date.unwrap_or_else(|| self.schedule().local_date(now));
        for command in output.commands {
            match command {
                OrderCommand::Broker(cmd) => out.push(Effect::Broker(cmd)),
                OrderCommand::ScheduleRetry {
                    attempt_id,
                    seq,
                    after,
                } => out.push(Effect::Schedule {
                    timer: TimerKind::OrderRetry { attempt_id, seq },
                    after,
                }),
                OrderCommand::Record(attempt) => {
                    out.push(Effect::RecordAttempt { attempt, date });
                }
            }
        }
        for event in output.events {
            self.on_attempt_event(event, now, out);
        }
    }

    fn on_attempt_event(&mut self, event: AttemptEvent, now: DateTime<Utc>, out: &mut Outbox) {
        match event {
            AttemptEvent::Filled {
                attempt,
                price,
                reconciled,
            } => {
                out.publish(
                    now,
                    DomainEventKind::OrderFilled {
                        attempt: attempt.clone(),
                    },
                );
                if attempt.purpose.is_entry() {
                    self.on_entry_filled(&attempt, price, reconciled, now, out);
                } else {
                    self.on_exit_filled(price, reconciled, now, out);
                }
            }
            AttemptEvent::Rejected { attempt } => {
                out.publish(
                    now,
                    DomainEventKind::OrderRejected {
                        attempt: attempt.clone(),
                    },
                );
                self.on_attempt_unfilled(&attempt, now, out);
            }
            AttemptEvent::Cancelled { attempt } => {
                self.on_attempt_unfilled(&attempt, now, out);
            }
            AttemptEvent::Absorbed { .. } => {}
        }
    }

    fn on_entry_filled(
        &mut self,
        attempt: &OrderAttempt,
        price: Price,
        reconciled: bool,
        now: DateTime<Utc>,
        out: &mut Outbox,
    ) {
        if self.positions.has_position() {
            // Broker reports a second position the engine cannot hold
            let message = format!("untracked entry fill on {} at {price}", attempt.contract);
            error!(attempt_id = %attempt.id, %message, "Conflicting entry fill");
            self.manual_halt(message, now, out);
            return;
        }

        if self.detector.on_entry_filled(&mut self.tracker, attempt.side) {
            debug!(side = %attempt.side, "Gates closed on entry fill");
        }
        match self.positions.open(attempt, price, now) {
            Ok(position) => {
                let position = position.clone();
                out.publish(now, DomainEventKind::PositionOpened { position });
            }
            Err(e) => {
                error!(attempt_id = %attempt.id, error = %e, "Failed to open position");
                return;
            }
        }
        out.snapshot = true;

        if reconciled {
            // A queued entry may have started behind the attempt that filled
            let output = self.controller.cancel_entries(now);
            self.apply_controller(output, now, out);
        }

        if self.risk.is_halted() {
            self.request_exit(ExitReason::RiskHalt, now, out);
        } else if matches!(self.status, SessionStatus::Flattening | SessionStatus::Ended) {
            self.status = SessionStatus::Flattening;
            self.request_exit(ExitReason::SessionFlatten, now, out);
        }
    }

    fn on_exit_filled(
        &mut self,
        price: Price,
        reconciled: bool,
        now: DateTime<Utc>,
        out: &mut Outbox,
    ) {
        let closed = match self.positions.close(price, now) {
            Ok(closed) => closed,
            Err(e) => {
                // Broker sold more than the engine held
                let message = format!("exit fill at {price} without an open position");
                error!(error = %e, %message, "Unmatched exit fill");
                self.manual_halt(message, now, out);
                return;
            }
        };
        let pnl = closed.realized_pnl().unwrap_or_default();
        let booking = self.risk.book_close(&closed.id, pnl, now);
        let date = self.date.unwrap_or_else(|| self.schedule().local_date(now));

        out.push(Effect::RecordTrade {
            position: closed.clone(),
            date,
        });
        out.publish(
            now,
            DomainEventKind::PositionClosed {
                position: closed,
                risk: self.risk.state().clone(),
            },
        );
        out.snapshot = true;

        if reconciled {
            // The replacement exit is still working against a flat book
            let output = self.controller.cancel_exits(now);
            self.apply_controller(output, now, out);
        }

        if let BookOutcome::Booked { halt: Some(reason) } = booking {
            self.on_halt(reason, now, out);
        }
    }

    fn on_attempt_unfilled(&mut self, attempt: &OrderAttempt, now: DateTime<Utc>, out: &mut Outbox) {
        if attempt.purpose.is_entry() {
            return;
        }
        let owns_exit = self
            .positions
            .current()
            .is_some_and(|p| p.contract.symbol == attempt.contract.symbol);
        if !owns_exit {
            return;
        }
        if let Some(reason) = self.positions.exit_failed(now) {
            warn!(
                attempt_id = %attempt.id,
                %reason,
                state = %attempt.state,
                "Exit ended without a fill, position open again"
            );
            out.snapshot = true;
        }
    }

    // ========================================================================
    // Risk and operator commands
    // ========================================================================

    fn on_halt(&mut self, reason: HaltReason, now: DateTime<Utc>, out: &mut Outbox) {
        let halt = TradingError::RiskHalt(reason.to_string());
        error!(error = %halt, "Trading halted for the day");
        out.publish(
            now,
            DomainEventKind::RiskHalted {
                reason,
                risk: self.risk.state().clone(),
            },
        );
        let output = self.controller.cancel_entries(now);
        self.apply_controller(output, now, out);
        self.request_exit(ExitReason::RiskHalt, now, out);
        out.snapshot = true;
    }

    fn manual_halt(&mut self, message: String, now: DateTime<Utc>, out: &mut Outbox) {
        let reason = HaltReason::Manual { message };
        if self.risk.halt(reason.clone(), now) {
            self.on_halt(reason, now, out);
        }
    }

    fn on_command(&mut self, command: OperatorCommand, now: DateTime<Utc>, out: &mut Outbox) {
        match command {
            OperatorCommand::ManualExit => {
                if self.positions.has_position() {
                    info!("Manual exit requested");
                    self.request_exit(ExitReason::Manual, now, out);
                } else {
                    info!("Manual exit requested with no open position");
                }
            }
            OperatorCommand::Halt { message } => self.manual_halt(message, now, out),
            OperatorCommand::Shutdown => out.snapshot = true,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    fn schedule(&self) -> &SessionSchedule {
        self.clock.schedule()
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    #[must_use]
    pub fn tracker(&self) -> &ZoneTracker {
        &self.tracker
    }

    #[must_use]
    pub fn controller(&self) -> &OrderController {
        &self.controller
    }

    #[must_use]
    pub fn position(&self) -> Option<&Position> {
        self.positions.current()
    }

    #[must_use]
    pub fn risk(&self) -> &RiskGovernor {
        &self.risk
    }

    #[must_use]
    pub fn contracts(&self) -> Option<&SessionContracts> {
        self.contracts.as_ref()
    }
}
