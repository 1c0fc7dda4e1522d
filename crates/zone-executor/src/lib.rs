//! Order execution for the zone engine.
//!
//! Drives every entry and exit through one placement-and-retry protocol:
//! a limit order priced through the option LTP, re-priced from the latest
//! LTP on a timer, bounded by a retry budget.
//!
//! # Key Components
//!
//! - [`OrderController`]: per-attempt state machine (placement, retry,
//!   supersede, cancellation, callback reconciliation)
//! - [`OrderCommand`] / [`BrokerEvent`]: the controller's side effects and
//!   the broker outcomes fed back to it
//! - [`BrokerGateway`] / [`MarketFeed`]: seams to broker connectivity
//! - [`MockGateway`]: recording gateway for tests
//!
//! # Attempt States
//!
//! 1. `Idle`: created, placement not yet acknowledged (or waiting for a quote)
//! 2. `Placed`: resting at the broker
//! 3. `Modifying`: re-price sent
//! 4. `Filled` / `Rejected` / `Cancelled`: terminal, archived

pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod gateway;

pub use command::{
    AttemptEvent, BrokerCommand, BrokerEvent, ControllerOutput, OrderCommand, OrderRequest,
};
pub use config::OrderConfig;
pub use controller::OrderController;
pub use error::{ExecutorError, ExecutorResult};
pub use gateway::{
    BoxFuture, BrokerGateway, DynBrokerGateway, DynMarketFeed, GatewayCall, MarketFeed,
    MockGateway,
};
