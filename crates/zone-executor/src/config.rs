//! Order placement and retry configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{ExecutorError, ExecutorResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderConfig {
    /// Points added to the option LTP for the first placement.
    #[serde(default = "default_initial_order_premium")]
    pub initial_order_premium: Decimal,
    /// Points added to the latest LTP on every re-price.
    #[serde(default = "default_order_retry_gap")]
    pub order_retry_gap: Decimal,
    /// How long an order may rest unfilled before it is re-priced.
    #[serde(default = "default_order_retry_timeout_ms")]
    pub order_retry_timeout_ms: u64,
    /// Re-prices allowed per attempt.
    #[serde(default = "default_order_retry_limit")]
    pub order_retry_limit: u32,
    /// Wait before the single re-placement after a rate-limit reject.
    #[serde(default = "default_rate_limit_backoff_ms")]
    pub rate_limit_backoff_ms: u64,
    /// Timeout applied to every broker call.
    #[serde(default = "default_broker_call_timeout_ms")]
    pub broker_call_timeout_ms: u64,
    /// Exchange price tick for option limit prices.
    #[serde(default = "default_tick_size")]
    pub tick_size: Decimal,
    /// Option quotes older than this are treated as missing.
    #[serde(default = "default_max_quote_age_ms")]
    pub max_quote_age_ms: u64,
}

fn default_initial_order_premium() -> Decimal {
    Decimal::ONE
}

fn default_order_retry_gap() -> Decimal {
    Decimal::ONE
}

fn default_order_retry_timeout_ms() -> u64 {
    1000
}

fn default_order_retry_limit() -> u32 {
    10
}

fn default_rate_limit_backoff_ms() -> u64 {
    500
}

fn default_broker_call_timeout_ms() -> u64 {
    3000
}

fn default_tick_size() -> Decimal {
    Decimal::new(5, 2) // 0.05
}

fn default_max_quote_age_ms() -> u64 {
    30_000
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            initial_order_premium: default_initial_order_premium(),
            order_retry_gap: default_order_retry_gap(),
            order_retry_timeout_ms: default_order_retry_timeout_ms(),
            order_retry_limit: default_order_retry_limit(),
            rate_limit_backoff_ms: default_rate_limit_backoff_ms(),
            broker_call_timeout_ms: default_broker_call_timeout_ms(),
            tick_size: default_tick_size(),
            max_quote_age_ms: default_max_quote_age_ms(),
        }
    }
}

impl OrderConfig {
    pub fn validate(&self) -> ExecutorResult<()> {
        if self.initial_order_premium < Decimal::ZERO || self.order_retry_gap < Decimal::ZERO {
            return Err(ExecutorError::ConfigError(
                "initial_order_premium and order_retry_gap must not be negative".into(),
            ));
        }
        if self.order_retry_timeout_ms == 0 {
            return Err(ExecutorError::ConfigError(
                "order_retry_timeout_ms must be positive".into(),
            ));
        }
        if self.broker_call_timeout_ms == 0 {
            return Err(ExecutorError::ConfigError(
                "broker_call_timeout_ms must be positive".into(),
            ));
        }
        if self.max_quote_age_ms == 0 {
            return Err(ExecutorError::ConfigError(
                "max_quote_age_ms must be positive".into(),
            ));
        }
        if self.tick_size <= Decimal::ZERO {
            return Err(ExecutorError::ConfigError(format!(
                "tick_size ({}) must be positive",
                self.tick_size
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn retry_timeout(&self) -> Duration {
        Duration::from_millis(self.order_retry_timeout_ms)
    }

    #[must_use]
    pub fn rate_limit_backoff(&self) -> Duration {
        Duration::from_millis(self.rate_limit_backoff_ms)
    }

    #[must_use]
    pub fn broker_call_timeout(&self) -> Duration {
        Duration::from_millis(self.broker_call_timeout_ms)
    }

    #[must_use]
    pub fn max_quote_age(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(i64::try_from(self.max_quote_age_ms).unwrap_or(i64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = OrderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.retry_timeout(), Duration::from_secs(1));
        assert_eq!(config.order_retry_limit, 10);
        assert_eq!(config.max_quote_age(), chrono::Duration::seconds(30));
    }

    #[test]
    fn test_zero_tick_rejected() {
        let config = OrderConfig {
            tick_size: Decimal::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
