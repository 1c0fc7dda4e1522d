//! Daily risk governor.
//!
//! Gates every entry on the day's trade count, realized P&L and halt state,
//! books each closed position exactly once, and latches a halt when the
//! daily loss limit or the emergency stop-loss is breached.

pub mod config;
pub mod error;
pub mod governor;

pub use config::RiskConfig;
pub use error::{RiskError, RiskResult};
pub use governor::{BookOutcome, HaltLatch, RiskGovernor};
