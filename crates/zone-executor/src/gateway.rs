//! Broker gateway and market feed traits.
//!
//! Broker connectivity lives outside the engine. These traits are the seam:
//! the paper broker, a live client and the test mock all implement them.

use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use zone_core::{BrokerOrderId, Instrument, Price};

use crate::command::OrderRequest;
use crate::error::{ExecutorError, ExecutorResult};

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Order API of the broker.
///
/// Fills and rejects are not returned here: they arrive later as
/// `BrokerEvent::Filled` / `BrokerEvent::Rejected` callbacks.
pub trait BrokerGateway: Send + Sync {
    /// Place a limit order, returning the broker order id.
    fn place_order(&self, request: OrderRequest) -> BoxFuture<'_, ExecutorResult<BrokerOrderId>>;

    fn modify_order(&self, id: BrokerOrderId, price: Price) -> BoxFuture<'_, ExecutorResult<()>>;

    fn cancel_order(&self, id: BrokerOrderId) -> BoxFuture<'_, ExecutorResult<()>>;
}

/// Market data subscription.
pub trait MarketFeed: Send + Sync {
    fn subscribe(&self, instrument: Instrument) -> BoxFuture<'_, ExecutorResult<()>>;
}

pub type DynBrokerGateway = Arc<dyn BrokerGateway>;
pub type DynMarketFeed = Arc<dyn MarketFeed>;

/// Call recorded by [`MockGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    Place(OrderRequest),
    Modify { id: BrokerOrderId, price: Price },
    Cancel { id: BrokerOrderId },
    Subscribe(Instrument),
}

/// Mock gateway for testing.
///
/// Assigns sequential order ids (`MOCK-1`, `MOCK-2`, ...) and returns
/// `next_error` once if set.
#[derive(Debug, Default)]
pub struct MockGateway {
    calls: Mutex<Vec<GatewayCall>>,
    next_error: Mutex<Option<ExecutorError>>,
    next_id: AtomicU64,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next call with `error`.
    pub fn fail_next(&self, error: ExecutorError) {
        *self.next_error.lock() = Some(error);
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    fn record(&self, call: GatewayCall) -> ExecutorResult<()> {
        self.calls.lock().push(call);
        match self.next_error.lock().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl BrokerGateway for MockGateway {
    fn place_order(&self, request: OrderRequest) -> BoxFuture<'_, ExecutorResult<BrokerOrderId>> {
        Box::pin(async move {
            self.record(GatewayCall::Place(request))?;
            let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(BrokerOrderId::new(format!("MOCK-{n}")))
        })
    }

    fn modify_order(&self, id: BrokerOrderId, price: Price) -> BoxFuture<'_, ExecutorResult<()>> {
        Box::pin(async move { self.record(GatewayCall::Modify { id, price }) })
    }

    fn cancel_order(&self, id: BrokerOrderId) -> BoxFuture<'_, ExecutorResult<()>> {
        Box::pin(async move { self.record(GatewayCall::Cancel { id }) })
    }
}

impl MarketFeed for MockGateway {
    fn subscribe(&self, instrument: Instrument) -> BoxFuture<'_, ExecutorResult<()>> {
        Box::pin(async move { self.record(GatewayCall::Subscribe(instrument)) })
    }
}
