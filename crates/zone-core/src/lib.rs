//! Core domain types for the zone options trading engine.
//!
//! This crate provides the fundamental types shared by every component:
//! - `Price`: precision-safe price newtype
//! - `Tick`, `Instrument`, `OptionContract`: market data and contracts
//! - `ZoneSet`, `GateState`: daily zone boundaries and entry gates
//! - `OrderAttempt`, `AttemptState`: order lifecycle records
//! - `Position`, `DailyRiskState`: trading and risk state
//! - `SessionSchedule`: exchange-local session timing
//! - `TradingError`: the engine-level error taxonomy

pub mod decimal;
pub mod error;
pub mod execution;
pub mod option;
pub mod order;
pub mod position;
pub mod risk;
pub mod session;
pub mod signal;
pub mod tick;
pub mod zone;

pub use decimal::Price;
pub use error::{CoreError, Result, TradingError};
pub use option::{atm_strike, select_strike, OptionContract, OptionKind, Strike};
pub use order::{AttemptId, BrokerOrderId, OrderSide};
pub use position::{Position, PositionExit, PositionId, PositionStatus};
pub use risk::{DailyRiskState, EntryBlock, HaltReason};
pub use session::{SessionPhase, SessionSchedule};
pub use signal::EntrySignal;
pub use tick::{Instrument, Tick};
pub use zone::{GateState, ZoneSet};

// Execution types
pub use execution::{AttemptPurpose, AttemptState, ExitReason, OrderAttempt, RejectReason};
