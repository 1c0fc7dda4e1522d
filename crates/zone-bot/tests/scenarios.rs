//! End-to-end session scenarios driven through the engine and the router.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use zone_bot::{
    AppConfig, Application, Effect, Engine, EngineEvent, SessionStatus, TimeSource, TimerKind,
};
use zone_core::{
    AttemptId, BrokerOrderId, ExitReason, HaltReason, Instrument, OptionKind, OrderSide,
    PositionStatus, Price, Tick,
};
use zone_executor::{BrokerCommand, BrokerEvent, GatewayCall, MockGateway, OrderRequest};
use zone_persistence::SnapshotStore;
use zone_telemetry::MemoryAlertSink;

// ============================================================================
// Helpers
// ============================================================================

fn ist(hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
    FixedOffset::east_opt(330 * 60)
        .unwrap()
        .with_ymd_and_hms(2024, 1, 18, hour, min, sec)
        .unwrap()
        .with_timezone(&Utc)
}

fn p(v: Decimal) -> Price {
    Price::new(v)
}

/// Engine plus the broker order ids handed out so far.
struct Session {
    engine: Engine,
    next_order: u32,
}

impl Session {
    fn new(config: AppConfig) -> Self {
        Self {
            engine: Engine::new(&config),
            next_order: 0,
        }
    }

    /// Zones 24997.5 / 25000 / 25002.5 computed at 09:16.
    fn ready() -> Self {
        Self::ready_with(AppConfig::default())
    }

    fn ready_with(config: AppConfig) -> Self {
        let mut session = Self::new(config);
        session.index(dec!(25000), ist(9, 15, 59));
        session.engine.handle(EngineEvent::Clock, ist(9, 16, 0));
        assert_eq!(session.engine.status(), SessionStatus::Trading);
        session
    }

    fn index(&mut self, price: Decimal, at: DateTime<Utc>) -> Vec<Effect> {
        let tick = Tick::new(Instrument::index("NIFTY 50"), p(price), at);
        self.engine.handle(EngineEvent::Tick(tick), at)
    }

    fn option(&mut self, kind: OptionKind, price: Decimal, at: DateTime<Utc>) -> Vec<Effect> {
        let contract = self.engine.contracts().unwrap().for_kind(kind).clone();
        let tick = Tick::new(Instrument::from(contract), p(price), at);
        self.engine.handle(EngineEvent::Tick(tick), at)
    }

    /// Acknowledge a placement, returning the broker order id.
    fn ack(&mut self, request: &OrderRequest, at: DateTime<Utc>) -> BrokerOrderId {
        self.next_order += 1;
        let id = BrokerOrderId::new(format!("B-{}", self.next_order));
        self.broker(
            BrokerEvent::Placed {
                attempt_id: request.attempt_id.clone(),
                broker_order_id: id.clone(),
            },
            at,
        );
        id
    }

    fn fill(&mut self, id: &BrokerOrderId, price: Decimal, at: DateTime<Utc>) -> Vec<Effect> {
        self.broker(
            BrokerEvent::Filled {
                broker_order_id: id.clone(),
                price: p(price),
            },
            at,
        )
    }

    fn broker(&mut self, event: BrokerEvent, at: DateTime<Utc>) -> Vec<Effect> {
        self.engine.handle(EngineEvent::Broker(event), at)
    }

    /// CE entry filled at 51 (quote 50, placed at 50 + 1).
    fn open_ce(&mut self, at: DateTime<Utc>) -> BrokerOrderId {
        self.option(OptionKind::Ce, dec!(50), at);
        let effects = self.index(dec!(25003), at);
        let request = placement(&effects).expect("entry placement");
        let id = self.ack(&request, at);
        self.fill(&id, dec!(51), at);
        assert!(self.engine.position().is_some());
        id
    }
}

fn placement(effects: &[Effect]) -> Option<OrderRequest> {
    effects.iter().find_map(|e| match e {
        Effect::Broker(BrokerCommand::Place { request }) => Some(request.clone()),
        _ => None,
    })
}

fn order_timer(effects: &[Effect]) -> Option<(AttemptId, u64)> {
    effects.iter().rev().find_map(|e| match e {
        Effect::Schedule {
            timer: TimerKind::OrderRetry { attempt_id, seq },
            ..
        } => Some((attempt_id.clone(), *seq)),
        _ => None,
    })
}

fn published(effects: &[Effect]) -> Vec<&'static str> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Publish(event) => Some(event.name()),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_ce_trade_from_signal_to_stop_loss_exit() {
    let mut s = Session::ready();
    let zones = s.engine.tracker().zones().unwrap().clone();
    assert_eq!(zones.upper, p(dec!(25002.5)));
    assert_eq!(zones.middle, p(dec!(25000)));
    assert_eq!(zones.lower, p(dec!(24997.5)));

    s.option(OptionKind::Ce, dec!(50), ist(9, 16, 50));
    let effects = s.index(dec!(25003), ist(9, 17, 0));
    assert_eq!(published(&effects), vec!["entry_signaled"]);
    let entry = placement(&effects).unwrap();
    assert_eq!(entry.side, OrderSide::Buy);
    assert_eq!(entry.limit_price, p(dec!(51)));
    assert_eq!(entry.quantity, 75);
    assert_eq!(entry.contract.symbol, "NIFTY24011825000CE");
    let entry_id = s.ack(&entry, ist(9, 17, 0));

    // Unfilled after the retry timeout: re-priced from the latest LTP
    let (attempt_id, seq) = order_timer(&effects).unwrap();
    let effects = s.engine.handle(
        EngineEvent::Timer(TimerKind::OrderRetry { attempt_id: attempt_id.clone(), seq }),
        ist(9, 17, 1),
    );
    assert!(effects.iter().any(|e| matches!(
        e,
        Effect::Broker(BrokerCommand::Modify { price, .. }) if *price == p(dec!(51))
    )));
    s.broker(BrokerEvent::Modified { attempt_id }, ist(9, 17, 1));

    let effects = s.fill(&entry_id, dec!(51), ist(9, 17, 2));
    assert_eq!(published(&effects), vec!["order_filled", "position_opened"]);
    let position = s.engine.position().unwrap();
    assert_eq!(position.entry_price, p(dec!(51)));
    assert_eq!(position.stop_loss_price, p(dec!(48.5)));
    assert!(!s.engine.tracker().gate().ce_open);

    // +10 locks in break-even
    s.option(OptionKind::Ce, dec!(61), ist(9, 20, 0));
    assert_eq!(s.engine.position().unwrap().stop_loss_price, p(dec!(51)));

    let effects = s.option(OptionKind::Ce, dec!(48.5), ist(9, 25, 0));
    let exit = placement(&effects).unwrap();
    assert_eq!(exit.side, OrderSide::Sell);
    assert_eq!(exit.limit_price, p(dec!(47.5)));
    assert_eq!(s.engine.position().unwrap().status, PositionStatus::Exiting);

    let exit_id = s.ack(&exit, ist(9, 25, 0));
    let effects = s.fill(&exit_id, dec!(48.5), ist(9, 25, 1));
    assert_eq!(published(&effects), vec!["order_filled", "position_closed"]);
    let trade = effects
        .iter()
        .find_map(|e| match e {
            Effect::RecordTrade { position, .. } => Some(position.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(trade.exit.as_ref().unwrap().reason, ExitReason::StopLoss);

    assert!(s.engine.position().is_none());
    let risk = s.engine.risk().state();
    assert_eq!(risk.trade_count, 1);
    assert_eq!(risk.realized_pnl, dec!(-187.5));
}

#[test]
fn test_max_daily_trades_suppresses_entry() {
    let mut config = AppConfig::default();
    config.risk.max_daily_trades = 1;
    let mut s = Session::ready_with(config);

    s.open_ce(ist(9, 17, 0));
    let effects = s.option(OptionKind::Ce, dec!(48), ist(9, 18, 0));
    let exit = placement(&effects).unwrap();
    let exit_id = s.ack(&exit, ist(9, 18, 0));
    s.fill(&exit_id, dec!(48), ist(9, 18, 1));
    assert_eq!(s.engine.risk().state().trade_count, 1);

    // Middle touch reopens the gates, the next break is refused
    s.index(dec!(25000), ist(9, 20, 0));
    let effects = s.index(dec!(25003), ist(9, 21, 0));
    assert_eq!(published(&effects), vec!["entry_signaled"]);
    assert!(placement(&effects).is_none());
    assert!(s.engine.controller().live().is_none());
}

#[test]
fn test_session_end_flattens_before_ending() {
    let mut s = Session::ready();
    s.open_ce(ist(9, 17, 0));
    s.option(OptionKind::Ce, dec!(50), ist(14, 59, 59));

    let effects = s.engine.handle(EngineEvent::Clock, ist(15, 0, 0));
    assert_eq!(s.engine.status(), SessionStatus::Flattening);
    assert!(published(&effects).is_empty());
    let exit = placement(&effects).unwrap();
    assert_eq!(exit.limit_price, p(dec!(49)));

    let exit_id = s.ack(&exit, ist(15, 0, 0));
    let effects = s.fill(&exit_id, dec!(50), ist(15, 0, 1));
    assert_eq!(
        published(&effects),
        vec!["order_filled", "position_closed", "session_ended"]
    );
    assert_eq!(s.engine.status(), SessionStatus::Ended);

    // No entries after the session ended
    s.index(dec!(25000), ist(15, 1, 0));
    let effects = s.index(dec!(25003), ist(15, 2, 0));
    assert!(placement(&effects).is_none());
}

#[test]
fn test_duplicate_fills_counted_once() {
    let mut s = Session::ready();
    let entry_id = s.open_ce(ist(9, 17, 0));
    let position_id = s.engine.position().unwrap().id.clone();

    let effects = s.fill(&entry_id, dec!(51), ist(9, 17, 1));
    assert!(published(&effects).is_empty());
    assert_eq!(s.engine.position().unwrap().id, position_id);

    let effects = s.option(OptionKind::Ce, dec!(48), ist(9, 18, 0));
    let exit_id = s.ack(&placement(&effects).unwrap(), ist(9, 18, 0));
    s.fill(&exit_id, dec!(48), ist(9, 18, 1));
    let effects = s.fill(&exit_id, dec!(48), ist(9, 18, 2));
    assert!(published(&effects).is_empty());

    let risk = s.engine.risk().state();
    assert_eq!(risk.trade_count, 1);
    assert_eq!(risk.realized_pnl, dec!(-225));
}

#[test]
fn test_fill_racing_supersede_wins() {
    let mut s = Session::ready();
    s.option(OptionKind::Ce, dec!(50), ist(9, 17, 0));
    s.option(OptionKind::Pe, dec!(40), ist(9, 17, 0));
    let effects = s.index(dec!(25003), ist(9, 17, 0));
    let ce_entry = placement(&effects).unwrap();
    let ce_order = s.ack(&ce_entry, ist(9, 17, 0));

    // Back through the middle and out the bottom while CE still works
    s.index(dec!(25000), ist(9, 17, 10));
    let effects = s.index(dec!(24997), ist(9, 17, 20));
    assert!(effects.iter().any(|e| matches!(
        e,
        Effect::Broker(BrokerCommand::Cancel { broker_order_id, .. }) if *broker_order_id == ce_order
    )));
    assert!(s.engine.controller().queued_id().is_some());

    // CE fill arrives before the cancel confirmation
    let effects = s.fill(&ce_order, dec!(51), ist(9, 17, 21));
    assert!(placement(&effects).is_none());
    assert_eq!(s.engine.position().unwrap().side, OptionKind::Ce);
    assert!(s.engine.controller().is_idle());

    let effects = s.broker(
        BrokerEvent::CancelConfirmed {
            attempt_id: ce_entry.attempt_id,
        },
        ist(9, 17, 22),
    );
    assert!(published(&effects).is_empty());
    assert_eq!(s.engine.position().unwrap().status, PositionStatus::Open);
}

#[test]
fn test_gates_reopen_only_after_middle_touch() {
    let mut s = Session::ready();
    fn signals(effects: &[Effect]) -> usize {
        published(effects)
            .into_iter()
            .filter(|name| *name == "entry_signaled")
            .count()
    }

    assert_eq!(signals(&s.index(dec!(25003), ist(9, 17, 0))), 1);
    assert_eq!(signals(&s.index(dec!(25004), ist(9, 17, 1))), 0);
    assert_eq!(signals(&s.index(dec!(24997), ist(9, 17, 2))), 0);
    assert_eq!(signals(&s.index(dec!(25001), ist(9, 17, 3))), 0);
    assert_eq!(signals(&s.index(dec!(25003), ist(9, 17, 4))), 0);

    s.index(dec!(25000.3), ist(9, 17, 5));
    assert!(s.engine.tracker().gate().ce_open);
    assert_eq!(signals(&s.index(dec!(24997), ist(9, 17, 6))), 1);
}

#[test]
fn test_emergency_stop_halts_and_flattens() {
    let mut s = Session::ready();
    s.open_ce(ist(9, 17, 0));

    // Gap through the stop: 75 x (30 - 51) = -1575
    let effects = s.option(OptionKind::Ce, dec!(30), ist(9, 30, 0));
    assert!(published(&effects).contains(&"risk_halted"));
    assert!(matches!(
        s.engine.risk().state().halt_reason,
        Some(HaltReason::EmergencyStopLoss { .. })
    ));
    let exit = placement(&effects).unwrap();
    assert_eq!(exit.side, OrderSide::Sell);
    assert_eq!(exit.limit_price, p(dec!(29)));

    let exit_id = s.ack(&exit, ist(9, 30, 0));
    let effects = s.fill(&exit_id, dec!(30), ist(9, 30, 1));
    let closed = effects
        .iter()
        .find_map(|e| match e {
            Effect::RecordTrade { position, .. } => Some(position.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(closed.exit.unwrap().reason, ExitReason::RiskHalt);

    s.index(dec!(25000), ist(9, 31, 0));
    let effects = s.index(dec!(25003), ist(9, 32, 0));
    assert!(placement(&effects).is_none());
}

#[test]
fn test_stale_option_quote_pauses_entry() {
    let mut s = Session::ready();
    s.option(OptionKind::Ce, dec!(50), ist(9, 16, 30));

    let effects = s.index(dec!(25003), ist(9, 17, 10));
    assert_eq!(published(&effects), vec!["entry_signaled", "feed_gap"]);
    assert!(placement(&effects).is_none());
    assert!(s.engine.controller().live().is_none());
}

#[test]
fn test_reconciled_exit_fill_cancels_second_exit() {
    let mut s = Session::ready();
    s.open_ce(ist(9, 17, 0));

    let effects = s.option(OptionKind::Ce, dec!(48), ist(9, 18, 0));
    let first = placement(&effects).unwrap();
    let first_id = s.ack(&first, ist(9, 18, 0));
    let effects = s.broker(
        BrokerEvent::Rejected {
            broker_order_id: first_id.clone(),
            reason_code: "RMS: margin exceeds".into(),
        },
        ist(9, 18, 1),
    );
    assert_eq!(published(&effects), vec!["order_rejected"]);
    assert_eq!(s.engine.position().unwrap().status, PositionStatus::Open);

    let effects = s.option(OptionKind::Ce, dec!(48), ist(9, 18, 5));
    let second = placement(&effects).unwrap();
    let second_id = s.ack(&second, ist(9, 18, 5));

    // The broker filled the first exit after all
    let effects = s.fill(&first_id, dec!(48), ist(9, 18, 6));
    assert_eq!(published(&effects), vec!["order_filled", "position_closed"]);
    assert!(s.engine.position().is_none());
    assert!(effects.iter().any(|e| matches!(
        e,
        Effect::Broker(BrokerCommand::Cancel { broker_order_id, .. }) if *broker_order_id == second_id
    )));
    assert_eq!(s.engine.risk().state().trade_count, 1);

    let effects = s.broker(
        BrokerEvent::CancelConfirmed {
            attempt_id: second.attempt_id,
        },
        ist(9, 18, 7),
    );
    assert!(published(&effects).is_empty());
    assert!(s.engine.controller().is_idle());
    assert!(!s.engine.risk().is_halted());
}

#[test]
fn test_exhausted_flatten_is_requested_again() {
    let mut config = AppConfig::default();
    config.orders.order_retry_limit = 1;
    let mut s = Session::ready_with(config);
    s.open_ce(ist(9, 17, 0));
    s.option(OptionKind::Ce, dec!(50), ist(14, 59, 59));

    let effects = s.engine.handle(EngineEvent::Clock, ist(15, 0, 0));
    let exit = placement(&effects).unwrap();
    s.ack(&exit, ist(15, 0, 0));

    let (attempt_id, seq) = order_timer(&effects).unwrap();
    let effects = s.engine.handle(
        EngineEvent::Timer(TimerKind::OrderRetry { attempt_id: attempt_id.clone(), seq }),
        ist(15, 0, 1),
    );
    assert!(effects
        .iter()
        .any(|e| matches!(e, Effect::Broker(BrokerCommand::Modify { .. }))));
    s.broker(
        BrokerEvent::Modified {
            attempt_id: attempt_id.clone(),
        },
        ist(15, 0, 1),
    );

    // Out of retries: the resting exit is cancelled and reported rejected
    let (_, seq) = order_timer(&effects).unwrap();
    let effects = s.engine.handle(
        EngineEvent::Timer(TimerKind::OrderRetry { attempt_id: attempt_id.clone(), seq }),
        ist(15, 0, 2),
    );
    assert!(effects
        .iter()
        .any(|e| matches!(e, Effect::Broker(BrokerCommand::Cancel { .. }))));
    let effects = s.broker(BrokerEvent::CancelConfirmed { attempt_id }, ist(15, 0, 3));
    assert_eq!(published(&effects), vec!["order_rejected"]);
    assert_eq!(s.engine.position().unwrap().status, PositionStatus::Open);
    assert_eq!(s.engine.status(), SessionStatus::Flattening);

    // The next quote re-requests the flatten
    let effects = s.option(OptionKind::Ce, dec!(49.5), ist(15, 0, 5));
    let retry = placement(&effects).unwrap();
    assert_eq!(retry.side, OrderSide::Sell);
    assert_eq!(retry.limit_price, p(dec!(48.5)));
    assert_eq!(s.engine.position().unwrap().status, PositionStatus::Exiting);
}

// ============================================================================
// Restart
// ============================================================================

fn restart(s: &Session, saved_at: DateTime<Utc>, at: DateTime<Utc>) -> (Session, Vec<Effect>) {
    let snapshot = s.engine.snapshot(saved_at);
    let mut engine = Engine::new(&AppConfig::default());
    let effects = engine.restore(snapshot, at);
    let restarted = Session {
        engine,
        next_order: s.next_order,
    };
    (restarted, effects)
}

#[test]
fn test_restart_during_session_flatten_resumes_exit() {
    let mut s = Session::ready();
    s.open_ce(ist(9, 17, 0));
    s.option(OptionKind::Ce, dec!(50), ist(14, 59, 59));
    let effects = s.engine.handle(EngineEvent::Clock, ist(15, 0, 0));
    let exit = placement(&effects).unwrap();
    s.ack(&exit, ist(15, 0, 0));
    assert_eq!(s.engine.position().unwrap().status, PositionStatus::Exiting);

    let (mut s, _) = restart(&s, ist(15, 0, 0), ist(15, 0, 30));
    assert_eq!(s.engine.status(), SessionStatus::Flattening);
    assert_eq!(s.engine.position().unwrap().status, PositionStatus::Exiting);
    assert!(s.engine.controller().live().is_some());

    let effects = s.option(OptionKind::Ce, dec!(50), ist(15, 0, 31));
    let exit = placement(&effects).unwrap();
    assert_eq!(exit.side, OrderSide::Sell);
    assert_eq!(exit.limit_price, p(dec!(49)));

    let exit_id = s.ack(&exit, ist(15, 0, 31));
    let effects = s.fill(&exit_id, dec!(50), ist(15, 0, 32));
    assert_eq!(
        published(&effects),
        vec!["order_filled", "position_closed", "session_ended"]
    );
    assert_eq!(s.engine.status(), SessionStatus::Ended);
}

#[test]
fn test_restart_after_halt_resumes_exit() {
    let mut s = Session::ready();
    s.open_ce(ist(9, 17, 0));
    let effects = s.option(OptionKind::Ce, dec!(30), ist(9, 30, 0));
    assert!(published(&effects).contains(&"risk_halted"));

    let (mut s, _) = restart(&s, ist(9, 30, 0), ist(9, 31, 0));
    assert!(s.engine.risk().is_halted());
    assert_eq!(s.engine.position().unwrap().status, PositionStatus::Exiting);
    assert!(s.engine.controller().live().is_some());

    let effects = s.option(OptionKind::Ce, dec!(31), ist(9, 31, 5));
    let exit = placement(&effects).unwrap();
    assert_eq!(exit.side, OrderSide::Sell);
    assert_eq!(exit.limit_price, p(dec!(30)));

    let exit_id = s.ack(&exit, ist(9, 31, 5));
    let effects = s.fill(&exit_id, dec!(31), ist(9, 31, 6));
    let closed = effects
        .iter()
        .find_map(|e| match e {
            Effect::RecordTrade { position, .. } => Some(position.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(closed.exit.unwrap().reason, ExitReason::RiskHalt);
    assert!(s.engine.risk().check_entry().is_err());
}

// ============================================================================
// Runtime
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_router_runs_trade_against_mock_gateway() {
    let data_dir = tempfile::tempdir().unwrap();
    let mut config = AppConfig::default();
    config.persistence.data_dir = data_dir.path().to_path_buf();
    let snapshot_path = config.persistence.snapshot_path();

    let mock = Arc::new(MockGateway::new());
    let sink = Arc::new(MemoryAlertSink::new());
    let now: TimeSource = Arc::new(|| ist(9, 16, 0));

    let mut app = Application::with_collaborators(config, mock.clone(), mock.clone())
        .unwrap()
        .with_time_source(now);
    app.add_sink(sink.clone());
    let handle = app.handle();
    let running = tokio::spawn(app.run());

    let index = |price: Decimal| {
        EngineEvent::Tick(Tick::new(Instrument::index("NIFTY 50"), p(price), ist(9, 16, 0)))
    };
    handle.submit(index(dec!(25000))).await.unwrap();
    for _ in 0..50 {
        if sink.names().contains(&"zone_computed") {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(sink.names().contains(&"zone_computed"));

    let ce = zone_core::OptionContract::new(
        "NIFTY",
        chrono::NaiveDate::from_ymd_opt(2024, 1, 18).unwrap(),
        OptionKind::Ce,
        zone_core::Strike(25000),
    );
    handle
        .submit(EngineEvent::Tick(Tick::new(ce.clone().into(), p(dec!(50)), ist(9, 16, 0))))
        .await
        .unwrap();
    handle.submit(index(dec!(25003))).await.unwrap();

    let mut placed = None;
    for _ in 0..50 {
        placed = mock.calls().into_iter().find_map(|c| match c {
            GatewayCall::Place(request) => Some(request),
            _ => None,
        });
        if placed.is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let placed = placed.expect("entry placed through the gateway");
    assert_eq!(placed.contract, ce);
    assert!(mock.calls().contains(&GatewayCall::Subscribe(Instrument::from(ce))));

    // The fill may overtake the placement acknowledgement
    handle
        .submit(EngineEvent::Broker(BrokerEvent::Filled {
            broker_order_id: BrokerOrderId::new("MOCK-1"),
            price: p(dec!(51)),
        }))
        .await
        .unwrap();
    for _ in 0..50 {
        if sink.names().contains(&"position_opened") {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    handle.shutdown().await.unwrap();
    let engine = running.await.unwrap().unwrap();
    let position = engine.position().unwrap();
    assert_eq!(position.entry_price, p(dec!(51)));
    assert_eq!(position.stop_loss_price, p(dec!(48.5)));

    // Shutdown leaves a snapshot carrying the open position
    let snapshot = SnapshotStore::new(snapshot_path).load().unwrap().unwrap();
    assert_eq!(snapshot.position.unwrap().id, position.id);
    assert!(snapshot.zones.is_some());
}
