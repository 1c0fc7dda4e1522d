//! Profit-ladder trailing stop-loss.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use zone_core::Price;

use crate::error::{PositionError, PositionResult};

/// One rung: once peak profit reaches `profit`, the stop moves to
/// `entry + lock`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LadderStep {
    pub profit: Decimal,
    pub lock: Decimal,
}

impl LadderStep {
    pub const fn new(profit: Decimal, lock: Decimal) -> Self {
        Self { profit, lock }
    }
}

/// Ordered profit thresholds. The highest rung reached applies; beyond the
/// last rung the stop stays pinned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrailingLadder {
    steps: Vec<LadderStep>,
}

impl Default for TrailingLadder {
    fn default() -> Self {
        Self {
            steps: vec![
                LadderStep::new(Decimal::from(10), Decimal::ZERO),
                LadderStep::new(Decimal::from(20), Decimal::from(10)),
                LadderStep::new(Decimal::from(40), Decimal::from(30)),
                LadderStep::new(Decimal::from(60), Decimal::from(40)),
                LadderStep::new(Decimal::from(80), Decimal::from(50)),
            ],
        }
    }
}

impl TrailingLadder {
    /// Build a ladder, checking that thresholds and locks both increase and
    /// that every lock stays below its threshold.
    pub fn new(steps: Vec<LadderStep>) -> PositionResult<Self> {
        let ladder = Self { steps };
        ladder.validate()?;
        Ok(ladder)
    }

    pub fn validate(&self) -> PositionResult<()> {
        let mut prev: Option<&LadderStep> = None;
        for step in &self.steps {
            if step.profit <= Decimal::ZERO {
                return Err(PositionError::ConfigError(format!(
                    "ladder threshold {} must be positive",
                    step.profit
                )));
            }
            if step.lock >= step.profit {
                return Err(PositionError::ConfigError(format!(
                    "ladder lock {} must be below its threshold {}",
                    step.lock, step.profit
                )));
            }
            if let Some(p) = prev {
                if step.profit <= p.profit || step.lock < p.lock {
                    return Err(PositionError::ConfigError(format!(
                        "ladder must increase: ({}, {}) after ({}, {})",
                        step.profit, step.lock, p.profit, p.lock
                    )));
                }
            }
            prev = Some(step);
        }
        Ok(())
    }

    /// Stop level locked in by `peak_profit`, or `None` below the first rung.
    #[must_use]
    pub fn stop_for(&self, entry: Price, peak_profit: Decimal) -> Option<Price> {
        self.steps
            .iter()
            .rev()
            .find(|step| peak_profit >= step.profit)
            .map(|step| entry.offset(step.lock))
    }

    #[must_use]
    pub fn steps(&self) -> &[LadderStep] {
        &self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn entry() -> Price {
        Price::new(dec!(51))
    }

    #[test]
    fn test_default_ladder_levels() {
        let ladder = TrailingLadder::default();
        assert!(ladder.validate().is_ok());

        assert_eq!(ladder.stop_for(entry(), dec!(9.95)), None);
        assert_eq!(ladder.stop_for(entry(), dec!(10)), Some(Price::new(dec!(51))));
        assert_eq!(ladder.stop_for(entry(), dec!(19)), Some(Price::new(dec!(51))));
        assert_eq!(ladder.stop_for(entry(), dec!(20)), Some(Price::new(dec!(61))));
        assert_eq!(ladder.stop_for(entry(), dec!(40)), Some(Price::new(dec!(81))));
        assert_eq!(ladder.stop_for(entry(), dec!(60)), Some(Price::new(dec!(91))));
        assert_eq!(ladder.stop_for(entry(), dec!(80)), Some(Price::new(dec!(101))));
    }

    #[test]
    fn test_pinned_beyond_last_rung() {
        let ladder = TrailingLadder::default();
        assert_eq!(ladder.stop_for(entry(), dec!(150)), Some(Price::new(dec!(101))));
    }

    #[test]
    fn test_invalid_ladders_rejected() {
        assert!(TrailingLadder::new(vec![LadderStep::new(dec!(10), dec!(10))]).is_err());
        assert!(TrailingLadder::new(vec![
            LadderStep::new(dec!(20), dec!(10)),
            LadderStep::new(dec!(10), dec!(0)),
        ])
        .is_err());
        assert!(TrailingLadder::new(vec![LadderStep::new(dec!(0), dec!(-1))]).is_err());
    }

    #[test]
    fn test_ladder_deserializes_from_list() {
        let json = r#"[{"profit":"5","lock":"0"},{"profit":"15","lock":"5"}]"#;
        let ladder: TrailingLadder = serde_json::from_str(json).unwrap();
        assert_eq!(ladder.steps().len(), 2);
        assert_eq!(ladder.stop_for(entry(), dec!(16)), Some(Price::new(dec!(56))));
    }
}
