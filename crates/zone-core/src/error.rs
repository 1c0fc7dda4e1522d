//! Error types for zone-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Invalid strike: {0}")]
    InvalidStrike(String),

    #[error("Decimal parse error: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Engine-level error taxonomy.
///
/// `FeedGap` and `BrokerUnreachable` are recoverable (bounded retry with a
/// warning). `RetryExhausted` ends a single order attempt. `RiskHalt` and
/// `SessionTimeout` are day-scoped: entries stay blocked until the next
/// session, but the process keeps running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TradingError {
    #[error("Feed gap: {0}")]
    FeedGap(String),

    #[error("Broker rejected order: {reason}")]
    BrokerRejected { reason: String },

    #[error("Broker unreachable: {0}")]
    BrokerUnreachable(String),

    #[error("Order retries exhausted after {retries} attempts")]
    RetryExhausted { retries: u32 },

    #[error("Risk halt: {0}")]
    RiskHalt(String),

    #[error("Session timeout: {0}")]
    SessionTimeout(String),
}

impl TradingError {
    /// Returns true if the condition clears on its own with bounded retry.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::FeedGap(_) | Self::BrokerUnreachable(_))
    }

    /// Returns true if the condition blocks entries for the rest of the day.
    #[must_use]
    pub fn is_day_scoped(&self) -> bool {
        matches!(self, Self::RiskHalt(_) | Self::SessionTimeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(TradingError::FeedGap("index".into()).is_recoverable());
        assert!(TradingError::BrokerUnreachable("timeout".into()).is_recoverable());
        assert!(!TradingError::RetryExhausted { retries: 10 }.is_recoverable());
        assert!(TradingError::RiskHalt("max loss".into()).is_day_scoped());
        assert!(TradingError::SessionTimeout("no tick".into()).is_day_scoped());
        assert!(!TradingError::BrokerRejected {
            reason: "market_closed".into()
        }
        .is_day_scoped());
    }
}
