//! Position management.
//!
//! Holds the single open option position, ratchets its stop-loss up a
//! profit ladder, and turns stop-loss touches, flattens and manual requests
//! into exit requests for the order controller. A position closes only on
//! a confirmed exit fill.
//!
//! # Key Components
//!
//! - [`PositionManager`]: owns the open position and its exit state
//! - [`TrailingLadder`]: profit thresholds and the stop each one locks in
//! - [`ExitRequest`]: request to sell the position
//! - [`ExitState`]: progress of the current exit

pub mod config;
pub mod error;
pub mod exit;
pub mod ladder;
pub mod manager;

pub use config::PositionConfig;
pub use error::{PositionError, PositionResult};
pub use exit::{ExitRequest, ExitState};
pub use ladder::{LadderStep, TrailingLadder};
pub use manager::{PositionManager, StopMove, TickOutcome};
