//! Paper broker.
//!
//! Simulated broker for paper mode. Orders rest against the last traded
//! price of their contract and fill at that price once it crosses the
//! limit. Fills are reported back through the router exactly like live
//! broker callbacks.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::{debug, info};
use zone_core::{
    BrokerOrderId, Instrument, OptionContract, OptionKind, OrderSide, Price, Strike, Tick,
};
use zone_executor::{
    BoxFuture, BrokerEvent, BrokerGateway, ExecutorError, ExecutorResult, MarketFeed,
    OrderRequest,
};

use crate::event::EngineEvent;
use crate::router::RouterHandle;

#[derive(Debug, Clone)]
struct RestingOrder {
    symbol: String,
    side: OrderSide,
    limit: Price,
}

impl RestingOrder {
    fn crosses(&self, ltp: Price) -> bool {
        match self.side {
            OrderSide::Buy => ltp <= self.limit,
            OrderSide::Sell => ltp >= self.limit,
        }
    }
}

#[derive(Debug, Default)]
struct PaperState {
    next_id: u64,
    resting: HashMap<BrokerOrderId, RestingOrder>,
    last: HashMap<String, Price>,
    subscriptions: Vec<Instrument>,
}

impl PaperState {
    /// Remove and return the order if the last price fills it.
    fn try_fill(&mut self, id: &BrokerOrderId) -> Option<Price> {
        let order = self.resting.get(id)?;
        let ltp = *self.last.get(&order.symbol)?;
        if order.crosses(ltp) {
            self.resting.remove(id);
            Some(ltp)
        } else {
            None
        }
    }
}

pub struct PaperBroker {
    events: RouterHandle,
    state: Mutex<PaperState>,
}

impl PaperBroker {
    pub fn new(events: RouterHandle) -> Self {
        Self {
            events,
            state: Mutex::new(PaperState::default()),
        }
    }

    /// Update the last price and fill any resting orders it crosses.
    pub fn on_tick(&self, tick: &Tick) {
        let symbol = tick.instrument.symbol().to_string();
        let fills: Vec<(BrokerOrderId, Price)> = {
            let mut state = self.state.lock();
            state.last.insert(symbol.clone(), tick.price);
            let ids: Vec<BrokerOrderId> = state
                .resting
                .iter()
                .filter(|(_, order)| order.symbol == symbol)
                .map(|(id, _)| id.clone())
                .collect();
            ids.into_iter()
                .filter_map(|id| state.try_fill(&id).map(|price| (id, price)))
                .collect()
        };
        for (id, price) in fills {
            self.report_fill(id, price);
        }
    }

    /// Subscribed option contract of `kind`, if any. With several, the one
    /// at `strike` (or the most recent subscription when `strike` is None).
    #[must_use]
    pub fn contract_for(&self, kind: OptionKind, strike: Option<Strike>) -> Option<OptionContract> {
        let state = self.state.lock();
        state
            .subscriptions
            .iter()
            .rev()
            .filter_map(Instrument::contract)
            .find(|c| c.kind == kind && strike.map_or(true, |s| c.strike == s))
            .cloned()
    }

    #[must_use]
    pub fn subscriptions(&self) -> Vec<Instrument> {
        self.state.lock().subscriptions.clone()
    }

    #[must_use]
    pub fn resting_count(&self) -> usize {
        self.state.lock().resting.len()
    }

    fn report_fill(&self, id: BrokerOrderId, price: Price) {
        info!(broker_order_id = %id, %price, "Paper fill");
        self.events.try_submit(EngineEvent::Broker(BrokerEvent::Filled {
            broker_order_id: id,
            price,
        }));
    }
}

impl BrokerGateway for PaperBroker {
    fn place_order(&self, request: OrderRequest) -> BoxFuture<'_, ExecutorResult<BrokerOrderId>> {
        Box::pin(async move {
            let (id, fill) = {
                let mut state = self.state.lock();
                state.next_id += 1;
                let id = BrokerOrderId::new(format!("PAPER-{}", state.next_id));
                state.resting.insert(
                    id.clone(),
                    RestingOrder {
                        symbol: request.contract.symbol.clone(),
                        side: request.side,
                        limit: request.limit_price,
                    },
                );
                let fill = state.try_fill(&id);
                (id, fill)
            };
            debug!(
                broker_order_id = %id,
                attempt_id = %request.attempt_id,
                side = %request.side,
                limit = %request.limit_price,
                "Paper order placed"
            );
            if let Some(price) = fill {
                self.report_fill(id.clone(), price);
            }
            Ok(id)
        })
    }

    fn modify_order(&self, id: BrokerOrderId, price: Price) -> BoxFuture<'_, ExecutorResult<()>> {
        Box::pin(async move {
            let fill = {
                let mut state = self.state.lock();
                let Some(order) = state.resting.get_mut(&id) else {
                    return Err(ExecutorError::Rejected(format!("unknown order {id}")));
                };
                order.limit = price;
                state.try_fill(&id)
            };
            debug!(broker_order_id = %id, %price, "Paper order modified");
            if let Some(fill_price) = fill {
                self.report_fill(id, fill_price);
            }
            Ok(())
        })
    }

    fn cancel_order(&self, id: BrokerOrderId) -> BoxFuture<'_, ExecutorResult<()>> {
        Box::pin(async move {
            match self.state.lock().resting.remove(&id) {
                Some(_) => {
                    debug!(broker_order_id = %id, "Paper order cancelled");
                    Ok(())
                }
                None => Err(ExecutorError::Rejected(format!("unknown order {id}"))),
            }
        })
    }
}

impl MarketFeed for PaperBroker {
    fn subscribe(&self, instrument: Instrument) -> BoxFuture<'_, ExecutorResult<()>> {
        Box::pin(async move {
            let mut state = self.state.lock();
            if !state.subscriptions.contains(&instrument) {
                state.subscriptions.push(instrument);
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;
    use zone_core::AttemptId;

    fn contract(kind: OptionKind) -> OptionContract {
        OptionContract::new(
            "NIFTY",
            NaiveDate::from_ymd_opt(2024, 1, 18).unwrap(),
            kind,
            Strike(25000),
        )
    }

    fn request(side: OrderSide, limit: rust_decimal::Decimal) -> OrderRequest {
        OrderRequest {
            attempt_id: AttemptId::from("zt_1_a"),
            contract: contract(OptionKind::Ce),
            side,
            quantity: 75,
            limit_price: Price::new(limit),
        }
    }

    fn tick(price: rust_decimal::Decimal) -> Tick {
        Tick::new(contract(OptionKind::Ce).into(), Price::new(price), Utc::now())
    }

    #[tokio::test]
    async fn test_buy_fills_when_price_reaches_limit() {
        let (handle, mut rx) = crate::router::channel(8);
        let broker = PaperBroker::new(handle);

        broker.on_tick(&tick(dec!(52)));
        let id = broker.place_order(request(OrderSide::Buy, dec!(51))).await.unwrap();
        assert_eq!(id.as_str(), "PAPER-1");
        assert_eq!(broker.resting_count(), 1);
        assert!(rx.try_recv().is_err());

        broker.on_tick(&tick(dec!(50.5)));
        assert_eq!(
            rx.try_recv().unwrap(),
            EngineEvent::Broker(BrokerEvent::Filled {
                broker_order_id: id,
                price: Price::new(dec!(50.5)),
            })
        );
        assert_eq!(broker.resting_count(), 0);
    }

    #[tokio::test]
    async fn test_marketable_sell_fills_on_place() {
        let (handle, mut rx) = crate::router::channel(8);
        let broker = PaperBroker::new(handle);

        broker.on_tick(&tick(dec!(48.5)));
        broker.place_order(request(OrderSide::Sell, dec!(47.5))).await.unwrap();
        match rx.try_recv().unwrap() {
            EngineEvent::Broker(BrokerEvent::Filled { price, .. }) => {
                assert_eq!(price, Price::new(dec!(48.5)));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_modify_reprices_and_unknown_ids_reject() {
        let (handle, mut rx) = crate::router::channel(8);
        let broker = PaperBroker::new(handle);

        broker.on_tick(&tick(dec!(50)));
        let id = broker.place_order(request(OrderSide::Buy, dec!(49))).await.unwrap();
        assert!(rx.try_recv().is_err());

        broker.modify_order(id.clone(), Price::new(dec!(51))).await.unwrap();
        assert!(matches!(
            rx.try_recv().unwrap(),
            EngineEvent::Broker(BrokerEvent::Filled { .. })
        ));

        let err = broker.cancel_order(id.clone()).await.unwrap_err();
        assert!(matches!(err, ExecutorError::Rejected(_)));
        let err = broker
            .modify_order(BrokerOrderId::new("PAPER-9"), Price::new(dec!(1)))
            .await
            .unwrap_err();
        assert!(!err.is_recoverable());
    }

    #[tokio::test]
    async fn test_subscriptions_resolve_contracts() {
        let (handle, _rx) = crate::router::channel(8);
        let broker = PaperBroker::new(handle);

        broker.subscribe(contract(OptionKind::Ce).into()).await.unwrap();
        broker.subscribe(contract(OptionKind::Pe).into()).await.unwrap();
        broker.subscribe(contract(OptionKind::Pe).into()).await.unwrap();

        assert_eq!(broker.subscriptions().len(), 2);
        assert_eq!(
            broker.contract_for(OptionKind::Pe, None).unwrap().symbol,
            "NIFTY24011825000PE"
        );
        assert!(broker.contract_for(OptionKind::Ce, Some(Strike(25050))).is_none());
    }
}
