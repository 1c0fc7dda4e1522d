//! Risk governor and halt latch.
//!
//! HaltLatch: once triggered, stays triggered until the next session reset.
//! RiskGovernor: owns the day's `DailyRiskState`, gates entries and books
//! closed positions.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{error, info, warn};
use zone_core::{DailyRiskState, EntryBlock, HaltReason, PositionId};
use zone_telemetry::Metrics;

use crate::config::RiskConfig;

// ============================================================================
// HaltLatch
// ============================================================================

/// Day-scoped halt latch.
///
/// The first trigger wins; later triggers keep the original reason.
#[derive(Debug, Default, Clone)]
pub struct HaltLatch {
    reason: Option<HaltReason>,
    triggered_at: Option<DateTime<Utc>>,
}

impl HaltLatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.reason.is_some()
    }

    /// Trigger the latch. Returns true only for the first trigger.
    pub fn trigger(&mut self, reason: HaltReason, now: DateTime<Utc>) -> bool {
        if let Some(existing) = &self.reason {
            warn!(
                new_reason = %reason,
                original = %existing,
                "Halt already triggered, ignoring new trigger"
            );
            return false;
        }
        error!(reason = %reason, "TRADING HALTED");
        self.reason = Some(reason);
        self.triggered_at = Some(now);
        true
    }

    #[must_use]
    pub fn reason(&self) -> Option<&HaltReason> {
        self.reason.as_ref()
    }

    #[must_use]
    pub fn triggered_at(&self) -> Option<DateTime<Utc>> {
        self.triggered_at
    }

    /// Clear the latch. Only done at session reset.
    pub fn reset(&mut self) {
        if let Some(previous) = self.reason.take() {
            info!(previous_reason = %previous, "Halt latch reset");
        }
        self.triggered_at = None;
    }
}

// ============================================================================
// RiskGovernor
// ============================================================================

/// Outcome of booking a closed position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookOutcome {
    /// Counted. `halt` is set if this close triggered a new halt.
    Booked { halt: Option<HaltReason> },
    /// Position already booked; nothing changed.
    Duplicate,
}

/// Enforces daily trade and loss limits.
#[derive(Debug)]
pub struct RiskGovernor {
    config: RiskConfig,
    state: DailyRiskState,
    latch: HaltLatch,
    booked: HashSet<PositionId>,
}

impl RiskGovernor {
    pub fn new(config: RiskConfig, date: Option<NaiveDate>) -> Self {
        Self {
            config,
            state: DailyRiskState::new(date),
            latch: HaltLatch::new(),
            booked: HashSet::new(),
        }
    }

    /// Check whether a new entry may proceed.
    ///
    /// Requires `trade_count < max_daily_trades`,
    /// `realized_pnl > -max_daily_loss`, no halt and no day-scoped block.
    pub fn check_entry(&self) -> Result<(), EntryBlock> {
        if self.latch.is_triggered() {
            return Err(EntryBlock::Halted);
        }
        if let Some(block) = &self.state.entry_block {
            return Err(block.clone());
        }
        if self.state.trade_count >= self.config.max_daily_trades {
            return Err(EntryBlock::MaxDailyTrades {
                trade_count: self.state.trade_count,
                limit: self.config.max_daily_trades,
            });
        }
        if self.state.realized_pnl <= -self.config.max_daily_loss {
            return Err(EntryBlock::MaxDailyLoss {
                realized_pnl: self.state.realized_pnl,
                limit: self.config.max_daily_loss,
            });
        }
        Ok(())
    }

    /// Book a closed position's realized P&L.
    ///
    /// Each position id is counted at most once.
    pub fn book_close(
        &mut self,
        position_id: &PositionId,
        realized_pnl: Decimal,
        now: DateTime<Utc>,
    ) -> BookOutcome {
        if !self.booked.insert(position_id.clone()) {
            warn!(%position_id, "Position close already booked, ignoring");
            Metrics::duplicate_callback("position_close");
            return BookOutcome::Duplicate;
        }

        self.state.trade_count += 1;
        self.state.realized_pnl += realized_pnl;
        self.publish_metrics();

        info!(
            %position_id,
            pnl = %realized_pnl,
            trade_count = self.state.trade_count,
            day_pnl = %self.state.realized_pnl,
            "Trade booked"
        );

        let halt = if self.state.realized_pnl <= -self.config.max_daily_loss {
            let reason = HaltReason::MaxDailyLoss {
                realized_pnl: self.state.realized_pnl,
                limit: self.config.max_daily_loss,
            };
            self.halt(reason.clone(), now).then_some(reason)
        } else if self.state.realized_pnl <= -self.config.emergency_stop_loss {
            let reason = HaltReason::EmergencyStopLoss {
                mark_to_market: self.state.realized_pnl,
                limit: self.config.emergency_stop_loss,
            };
            self.halt(reason.clone(), now).then_some(reason)
        } else {
            None
        };

        BookOutcome::Booked { halt }
    }

    /// Check realized plus unrealized P&L against the emergency stop-loss.
    ///
    /// Returns the halt reason if this call triggered a new halt.
    pub fn check_mark_to_market(
        &mut self,
        unrealized_pnl: Decimal,
        now: DateTime<Utc>,
    ) -> Option<HaltReason> {
        let mtm = self.state.realized_pnl + unrealized_pnl;
        if mtm > -self.config.emergency_stop_loss || self.latch.is_triggered() {
            return None;
        }
        let reason = HaltReason::EmergencyStopLoss {
            mark_to_market: mtm,
            limit: self.config.emergency_stop_loss,
        };
        self.halt(reason.clone(), now).then_some(reason)
    }

    /// Halt trading for the rest of the day. Returns true only the first time.
    pub fn halt(&mut self, reason: HaltReason, now: DateTime<Utc>) -> bool {
        if !self.latch.trigger(reason.clone(), now) {
            return false;
        }
        self.state.halted = true;
        self.state.halt_reason = Some(reason);
        self.state.halted_at = Some(now);
        self.publish_metrics();
        true
    }

    /// Block entries for the rest of the day without halting.
    ///
    /// The first block is kept.
    pub fn block_entries(&mut self, block: EntryBlock) {
        if self.state.entry_block.is_none() {
            info!(reason = %block, "Entries blocked for the session");
            self.state.entry_block = Some(block);
        }
    }

    /// Reset for a new session.
    pub fn reset(&mut self, date: NaiveDate) {
        info!(
            %date,
            previous_trades = self.state.trade_count,
            previous_pnl = %self.state.realized_pnl,
            "Daily risk state reset"
        );
        self.state = DailyRiskState::new(Some(date));
        self.latch.reset();
        self.booked.clear();
        self.publish_metrics();
    }

    /// Reload persisted state after a restart.
    ///
    /// A halt saved without its timestamp is latched at `now`.
    pub fn restore(&mut self, mut state: DailyRiskState, now: DateTime<Utc>) {
        self.latch.reset();
        if let Some(reason) = state.halt_reason.clone() {
            let at = *state.halted_at.get_or_insert(now);
            self.latch.trigger(reason, at);
        }
        info!(
            trade_count = state.trade_count,
            realized_pnl = %state.realized_pnl,
            halted = state.halted,
            "Daily risk state restored"
        );
        self.state = state;
        self.publish_metrics();
    }

    #[must_use]
    pub fn state(&self) -> &DailyRiskState {
        &self.state
    }

    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.latch.is_triggered()
    }

    #[must_use]
    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    fn publish_metrics(&self) {
        Metrics::daily_risk(
            self.state.trade_count,
            self.state.realized_pnl.to_f64().unwrap_or_default(),
            self.state.halted,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 18, 5, 0, 0).unwrap()
    }

    fn governor() -> RiskGovernor {
        RiskGovernor::new(
            RiskConfig {
                max_daily_trades: 2,
                max_daily_loss: dec!(500),
                emergency_stop_loss: dec!(800),
            },
            NaiveDate::from_ymd_opt(2024, 1, 18),
        )
    }

    #[test]
    fn test_latch_first_trigger_wins() {
        let mut latch = HaltLatch::new();
        assert!(!latch.is_triggered());

        assert!(latch.trigger(
            HaltReason::Manual {
                message: "first".into()
            },
            now()
        ));
        assert!(!latch.trigger(
            HaltReason::Manual {
                message: "second".into()
            },
            now()
        ));
        assert_eq!(
            latch.reason(),
            Some(&HaltReason::Manual {
                message: "first".into()
            })
        );

        latch.reset();
        assert!(!latch.is_triggered());
        assert!(latch.triggered_at().is_none());
    }

    #[test]
    fn test_entry_allowed_initially() {
        assert!(governor().check_entry().is_ok());
    }

    #[test]
    fn test_max_trades_blocks_entry() {
        let mut g = governor();
        g.book_close(&PositionId::new("p1"), dec!(5), now());
        assert!(g.check_entry().is_ok());
        g.book_close(&PositionId::new("p2"), dec!(5), now());
        assert_eq!(
            g.check_entry(),
            Err(EntryBlock::MaxDailyTrades {
                trade_count: 2,
                limit: 2
            })
        );
        assert!(!g.is_halted());
    }

    #[test]
    fn test_duplicate_close_booked_once() {
        let mut g = governor();
        let id = PositionId::new("p1");
        assert_eq!(
            g.book_close(&id, dec!(-2.5), now()),
            BookOutcome::Booked { halt: None }
        );
        assert_eq!(g.book_close(&id, dec!(-2.5), now()), BookOutcome::Duplicate);
        assert_eq!(g.state().trade_count, 1);
        assert_eq!(g.state().realized_pnl, dec!(-2.5));
    }

    #[test]
    fn test_daily_loss_halts() {
        let mut g = governor();
        let outcome = g.book_close(&PositionId::new("p1"), dec!(-500), now());
        match outcome {
            BookOutcome::Booked {
                halt: Some(HaltReason::MaxDailyLoss { realized_pnl, .. }),
            } => assert_eq!(realized_pnl, dec!(-500)),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(g.is_halted());
        assert!(g.state().halted);
        assert_eq!(g.check_entry(), Err(EntryBlock::Halted));
    }

    #[test]
    fn test_mark_to_market_emergency_halt_is_idempotent() {
        let mut g = governor();
        g.book_close(&PositionId::new("p1"), dec!(-300), now());

        assert!(g.check_mark_to_market(dec!(-400), now()).is_none());
        let reason = g.check_mark_to_market(dec!(-500), now());
        assert!(matches!(
            reason,
            Some(HaltReason::EmergencyStopLoss { mark_to_market, .. }) if mark_to_market == dec!(-800)
        ));
        assert!(g.check_mark_to_market(dec!(-600), now()).is_none());
        assert!(g.is_halted());
    }

    #[test]
    fn test_block_entries_keeps_first() {
        let mut g = governor();
        g.block_entries(EntryBlock::SessionInitFailed);
        g.block_entries(EntryBlock::SessionEnded);
        assert_eq!(g.check_entry(), Err(EntryBlock::SessionInitFailed));
    }

    #[test]
    fn test_reset_clears_day() {
        let mut g = governor();
        g.book_close(&PositionId::new("p1"), dec!(-500), now());
        g.reset(NaiveDate::from_ymd_opt(2024, 1, 19).unwrap());

        assert!(!g.is_halted());
        assert_eq!(g.state().trade_count, 0);
        assert_eq!(g.state().realized_pnl, Decimal::ZERO);
        assert!(g.check_entry().is_ok());
        // Ids are day-scoped
        assert_eq!(
            g.book_close(&PositionId::new("p1"), dec!(1), now()),
            BookOutcome::Booked { halt: None }
        );
    }

    #[test]
    fn test_restore_relatches_halt() {
        let mut source = governor();
        source.halt(
            HaltReason::Manual {
                message: "operator".into(),
            },
            now(),
        );
        let state = source.state().clone();

        let mut g = governor();
        g.restore(state, now() + chrono::Duration::hours(1));
        assert!(g.is_halted());
        assert_eq!(g.check_entry(), Err(EntryBlock::Halted));
        assert_eq!(g.state().halted_at, Some(now()));
    }

    #[test]
    fn test_restore_without_halt_time_uses_restart_time() {
        let state = DailyRiskState {
            halted: true,
            halt_reason: Some(HaltReason::Manual {
                message: "operator".into(),
            }),
            ..DailyRiskState::new(None)
        };
        let restarted_at = now() + chrono::Duration::minutes(30);

        let mut g = governor();
        g.restore(state, restarted_at);
        assert!(g.is_halted());
        assert_eq!(g.state().halted_at, Some(restarted_at));
    }
}
