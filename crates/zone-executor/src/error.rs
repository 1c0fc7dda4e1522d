//! Executor error types.

use thiserror::Error;

/// Broker call failures and configuration errors.
///
/// Values travel back to the controller inside broker events, so the type
/// is cloneable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutorError {
    #[error("Order rejected: {0}")]
    Rejected(String),

    #[error("Broker unreachable: {0}")]
    Unreachable(String),

    #[error("Broker call timed out after {0}ms")]
    Timeout(u64),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ExecutorError {
    /// Transport failures are retried on the next retry timer. A reject is
    /// an answer from the broker and is classified instead.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Unreachable(_) | Self::Timeout(_))
    }
}

pub type ExecutorResult<T> = Result<T, ExecutorError>;
