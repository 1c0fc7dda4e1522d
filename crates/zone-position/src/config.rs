//! Position configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{PositionError, PositionResult};
use crate::ladder::TrailingLadder;

/// Stop-loss configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionConfig {
    /// Initial stop distance below the entry price, in option points.
    #[serde(default = "default_stop_loss")]
    pub stop_loss: Decimal,
    /// Profit ladder for the trailing stop.
    #[serde(default)]
    pub ladder: TrailingLadder,
}

fn default_stop_loss() -> Decimal {
    Decimal::new(25, 1) // 2.5 points
}

impl Default for PositionConfig {
    fn default() -> Self {
        Self {
            stop_loss: default_stop_loss(),
            ladder: TrailingLadder::default(),
        }
    }
}

impl PositionConfig {
    pub fn validate(&self) -> PositionResult<()> {
        if self.stop_loss <= Decimal::ZERO {
            return Err(PositionError::ConfigError(format!(
                "stop_loss ({}) must be positive",
                self.stop_loss
            )));
        }
        self.ladder.validate()
    }
}
