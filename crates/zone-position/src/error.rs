//! Position error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PositionError {
    #[error("No open position")]
    NoPosition,

    #[error("Position already open: {0}")]
    AlreadyOpen(String),

    #[error("Invalid position state: {0}")]
    InvalidState(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type PositionResult<T> = Result<T, PositionError>;
