//! Effect dispatcher.
//!
//! Executes engine effects. Broker calls run on spawned tasks under a
//! timeout and report back through the router as ordinary events, so the
//! engine loop never waits on the network. Persistence and alerting are
//! fire-and-forget.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use zone_core::{DailyRiskState, Instrument};
use zone_executor::{
    BrokerCommand, BrokerEvent, DynBrokerGateway, DynMarketFeed, ExecutorError,
};
use zone_persistence::{OrderAttemptRecord, RecorderHandle, TradeRecord};
use zone_telemetry::{AlertSink, DailyStatsReporter, DomainEvent, DomainEventKind, Metrics};

use crate::event::{Effect, EngineEvent};
use crate::router::RouterHandle;

pub struct EffectDispatcher {
    gateway: DynBrokerGateway,
    feed: DynMarketFeed,
    events: RouterHandle,
    recorder: Option<RecorderHandle>,
    sinks: Vec<Arc<dyn AlertSink>>,
    stats: DailyStatsReporter,
    call_timeout: Duration,
}

impl EffectDispatcher {
    pub fn new(
        gateway: DynBrokerGateway,
        feed: DynMarketFeed,
        events: RouterHandle,
        call_timeout: Duration,
    ) -> Self {
        Self {
            gateway,
            feed,
            events,
            recorder: None,
            sinks: Vec::new(),
            stats: DailyStatsReporter::new(Utc::now()),
            call_timeout,
        }
    }

    #[must_use]
    pub fn with_recorder(mut self, recorder: RecorderHandle) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn add_sink(&mut self, sink: Arc<dyn AlertSink>) {
        self.sinks.push(sink);
    }

    pub fn dispatch(&mut self, effect: Effect) {
        match effect {
            Effect::Broker(command) => self.execute(command),
            Effect::Subscribe(instrument) => self.subscribe(instrument),
            Effect::RecordAttempt { attempt, date } => {
                if let Some(recorder) = &self.recorder {
                    recorder.record_attempt(OrderAttemptRecord::new(attempt, date));
                }
            }
            Effect::RecordTrade { position, date } => {
                if let Some(recorder) = &self.recorder {
                    match TradeRecord::from_position(&position, date) {
                        Some(record) => recorder.record_trade(record),
                        None => warn!(position_id = %position.id, "Trade record for open position skipped"),
                    }
                }
            }
            Effect::SaveSnapshot(snapshot) => {
                if let Some(recorder) = &self.recorder {
                    recorder.save_snapshot(*snapshot);
                }
            }
            Effect::Publish(event) => self.publish(&event),
            Effect::Schedule { timer, .. } => {
                warn!(?timer, "Timer effect reached the dispatcher, ignored");
            }
        }
    }

    /// Run a broker call on its own task and feed the outcome back.
    fn execute(&self, command: BrokerCommand) {
        let gateway = Arc::clone(&self.gateway);
        let events = self.events.clone();
        let timeout = self.call_timeout;

        tokio::spawn(async move {
            let op = command.op();
            let started = Instant::now();
            let call = async {
                match &command {
                    BrokerCommand::Place { request } => {
                        gateway.place_order(request.clone()).await.map(Some)
                    }
                    BrokerCommand::Modify {
                        broker_order_id,
                        price,
                        ..
                    } => gateway
                        .modify_order(broker_order_id.clone(), *price)
                        .await
                        .map(|()| None),
                    BrokerCommand::Cancel {
                        broker_order_id, ..
                    } => gateway
                        .cancel_order(broker_order_id.clone())
                        .await
                        .map(|()| None),
                }
            };
            let result = match tokio::time::timeout(timeout, call).await {
                Ok(result) => result,
                Err(_) => Err(ExecutorError::Timeout(timeout.as_millis() as u64)),
            };
            Metrics::broker_call_latency(op, started.elapsed().as_secs_f64() * 1000.0);
            if let Err(e) = &result {
                warn!(op, attempt_id = %command.attempt_id(), error = %e, "Broker call failed");
                Metrics::broker_call_failed(op);
            }

            let event = BrokerEvent::from_call(&command, result);
            if events.submit(EngineEvent::Broker(event)).await.is_err() {
                debug!(op, "Router stopped before broker call outcome was delivered");
            }
        });
    }

    fn subscribe(&self, instrument: Instrument) {
        let feed = Arc::clone(&self.feed);
        let timeout = self.call_timeout;
        tokio::spawn(async move {
            match tokio::time::timeout(timeout, feed.subscribe(instrument.clone())).await {
                Ok(Ok(())) => debug!(%instrument, "Subscribed"),
                Ok(Err(e)) => warn!(%instrument, error = %e, "Subscription failed"),
                Err(_) => warn!(%instrument, "Subscription timed out"),
            }
        });
    }

    fn publish(&mut self, event: &DomainEvent) {
        for sink in &self.sinks {
            sink.publish(event);
        }
        if let DomainEventKind::SessionEnded { risk } = &event.kind {
            self.stats.output_daily_summary(risk, event.at);
            self.stats.reset(event.at);
        }
    }

    /// Final summary, then flush and stop the recorder.
    pub async fn shutdown(&self, risk: &DailyRiskState, now: DateTime<Utc>) {
        self.stats.output_daily_summary(risk, now);
        if let Some(recorder) = &self.recorder {
            if let Err(e) = recorder.flush().await {
                warn!(error = %e, "Recorder flush failed on shutdown");
            }
            recorder.shutdown().await;
        }
        info!("Effect dispatcher stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use rust_decimal_macros::dec;
    use zone_core::{AttemptId, OptionContract, OptionKind, OrderSide, Price, Strike};
    use zone_executor::{GatewayCall, MockGateway, OrderRequest};
    use zone_telemetry::MemoryAlertSink;

    fn setup(
        mock: Arc<MockGateway>,
        timeout_ms: u64,
    ) -> (EffectDispatcher, tokio::sync::mpsc::Receiver<EngineEvent>) {
        let (handle, rx) = crate::router::channel(16);
        let dispatcher = EffectDispatcher::new(
            mock.clone(),
            mock,
            handle,
            Duration::from_millis(timeout_ms),
        );
        (dispatcher, rx)
    }

    fn place() -> BrokerCommand {
        let expiry = NaiveDate::from_ymd_opt(2024, 1, 18).unwrap();
        BrokerCommand::Place {
            request: OrderRequest {
                attempt_id: AttemptId::from("zt_1_a"),
                contract: OptionContract::new("NIFTY", expiry, OptionKind::Ce, Strike(25000)),
                side: OrderSide::Buy,
                quantity: 75,
                limit_price: Price::new(dec!(51)),
            },
        }
    }

    #[tokio::test]
    async fn test_place_outcome_fed_back() {
        let mock = Arc::new(MockGateway::new());
        let (mut dispatcher, mut rx) = setup(mock.clone(), 1000);

        dispatcher.dispatch(Effect::Broker(place()));
        let event = rx.recv().await.unwrap();
        assert_eq!(
            event,
            EngineEvent::Broker(BrokerEvent::Placed {
                attempt_id: AttemptId::from("zt_1_a"),
                broker_order_id: zone_core::BrokerOrderId::new("MOCK-1"),
            })
        );
        assert!(matches!(mock.calls()[0], GatewayCall::Place(_)));
    }

    #[tokio::test]
    async fn test_failed_call_reported() {
        let mock = Arc::new(MockGateway::new());
        mock.fail_next(ExecutorError::Unreachable("connection reset".into()));
        let (mut dispatcher, mut rx) = setup(mock, 1000);

        dispatcher.dispatch(Effect::Broker(place()));
        match rx.recv().await.unwrap() {
            EngineEvent::Broker(BrokerEvent::PlaceFailed { error, .. }) => {
                assert!(error.is_recoverable());
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_publish_reaches_sinks() {
        let mock = Arc::new(MockGateway::new());
        let (mut dispatcher, _rx) = setup(mock, 1000);
        let sink = Arc::new(MemoryAlertSink::new());
        dispatcher.add_sink(sink.clone());

        let at = Utc.with_ymd_and_hms(2024, 1, 18, 9, 30, 0).unwrap();
        dispatcher.dispatch(Effect::Publish(DomainEvent::new(
            at,
            DomainEventKind::SessionEnded {
                risk: DailyRiskState::default(),
            },
        )));
        assert_eq!(sink.names(), vec!["session_ended"]);
    }
}
