//! Risk limits.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{RiskError, RiskResult};

/// Daily risk limits. Read once at session start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Closed trades allowed per day.
    #[serde(default = "default_max_daily_trades")]
    pub max_daily_trades: u32,
    /// Realized loss (positive number) that halts trading for the day.
    #[serde(default = "default_max_daily_loss")]
    pub max_daily_loss: Decimal,
    /// Realized plus unrealized loss (positive number) that halts trading
    /// and flattens immediately.
    #[serde(default = "default_emergency_stop_loss")]
    pub emergency_stop_loss: Decimal,
}

fn default_max_daily_trades() -> u32 {
    4
}

fn default_max_daily_loss() -> Decimal {
    Decimal::from(500)
}

fn default_emergency_stop_loss() -> Decimal {
    Decimal::from(1000)
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_daily_trades: default_max_daily_trades(),
            max_daily_loss: default_max_daily_loss(),
            emergency_stop_loss: default_emergency_stop_loss(),
        }
    }
}

impl RiskConfig {
    pub fn validate(&self) -> RiskResult<()> {
        if self.max_daily_trades == 0 {
            return Err(RiskError::ConfigError(
                "max_daily_trades must be positive".into(),
            ));
        }
        if self.max_daily_loss <= Decimal::ZERO {
            return Err(RiskError::ConfigError(format!(
                "max_daily_loss ({}) must be positive",
                self.max_daily_loss
            )));
        }
        if self.emergency_stop_loss <= Decimal::ZERO {
            return Err(RiskError::ConfigError(format!(
                "emergency_stop_loss ({}) must be positive",
                self.emergency_stop_loss
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_valid() {
        let config = RiskConfig::default();
        assert_eq!(config.max_daily_trades, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_trades_invalid() {
        let config = RiskConfig {
            max_daily_trades: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
