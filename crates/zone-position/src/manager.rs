//! Single-position manager with a ratcheting stop-loss.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use zone_core::{
    AttemptId, ExitReason, OptionKind, OrderAttempt, Position, PositionExit, PositionId,
    PositionStatus, Price,
};
use zone_telemetry::Metrics;

use crate::config::PositionConfig;
use crate::error::{PositionError, PositionResult};
use crate::exit::{ExitRequest, ExitState};

/// Stop-loss moved by the ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopMove {
    pub from: Price,
    pub to: Price,
    pub peak_profit: Decimal,
}

/// Result of applying an option tick to the open position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub stop_moved: Option<StopMove>,
    /// Exit that should be requested now.
    pub exit: Option<ExitReason>,
}

/// Owns at most one open position.
#[derive(Debug)]
pub struct PositionManager {
    config: PositionConfig,
    current: Option<Position>,
    exit: ExitState,
}

impl PositionManager {
    pub fn new(config: PositionConfig) -> Self {
        Self {
            config,
            current: None,
            exit: ExitState::NotStarted,
        }
    }

    /// Open a position from a filled entry attempt.
    ///
    /// Initial stop is `fill_price - stop_loss`.
    pub fn open(
        &mut self,
        entry: &OrderAttempt,
        fill_price: Price,
        now: DateTime<Utc>,
    ) -> PositionResult<&Position> {
        if let Some(existing) = &self.current {
            return Err(PositionError::AlreadyOpen(existing.id.to_string()));
        }

        let stop = fill_price.offset(-self.config.stop_loss);
        let position = Position {
            id: PositionId::from(&entry.id),
            contract: entry.contract.clone(),
            side: entry.side,
            strike: entry.strike,
            entry_price: fill_price,
            quantity: entry.quantity,
            stop_loss_price: stop,
            peak_profit: Decimal::ZERO,
            last_price: fill_price,
            opened_at: now,
            status: PositionStatus::Open,
            exit: None,
        };

        info!(
            position_id = %position.id,
            contract = %position.contract,
            entry = %fill_price,
            stop_loss = %stop,
            quantity = position.quantity,
            "Position opened"
        );
        Metrics::stop_loss_level(stop.inner().to_f64().unwrap_or_default());

        self.exit = ExitState::NotStarted;
        Ok(self.current.insert(position))
    }

    /// Apply an option LTP to the open position.
    ///
    /// Raises the stop to the highest ladder level reached (never lowers
    /// it), then reports an exit when the LTP is at or below the stop, or
    /// when a failed forced exit must be retried.
    pub fn on_tick(&mut self, ltp: Price, now: DateTime<Utc>) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        let Some(pos) = self.current.as_mut() else {
            return outcome;
        };

        pos.last_price = ltp;
        let profit = pos.unrealized_per_unit(ltp);
        if profit > pos.peak_profit {
            pos.peak_profit = profit;
        }

        if let Some(locked) = self.config.ladder.stop_for(pos.entry_price, pos.peak_profit) {
            if locked > pos.stop_loss_price {
                let moved = StopMove {
                    from: pos.stop_loss_price,
                    to: locked,
                    peak_profit: pos.peak_profit,
                };
                pos.stop_loss_price = locked;
                info!(
                    position_id = %pos.id,
                    from = %moved.from,
                    to = %moved.to,
                    peak_profit = %moved.peak_profit,
                    %ltp,
                    "Stop-loss raised"
                );
                Metrics::stop_loss_level(locked.inner().to_f64().unwrap_or_default());
                outcome.stop_moved = Some(moved);
            }
        }

        if pos.status != PositionStatus::Open {
            return outcome;
        }

        if ltp <= pos.stop_loss_price {
            info!(
                position_id = %pos.id,
                %ltp,
                stop_loss = %pos.stop_loss_price,
                at = %now,
                "Stop-loss touched"
            );
            outcome.exit = Some(ExitReason::StopLoss);
        } else if let Some(reason) = self.exit.pending_forced() {
            outcome.exit = Some(reason);
        }
        outcome
    }

    /// Start an exit.
    ///
    /// Returns `None` if there is no open position or an exit is already
    /// working.
    pub fn begin_exit(&mut self, reason: ExitReason, now: DateTime<Utc>) -> Option<ExitRequest> {
        let pos = self.current.as_mut()?;
        if pos.status != PositionStatus::Open {
            debug!(
                position_id = %pos.id,
                %reason,
                "Exit already in progress, ignoring duplicate request"
            );
            return None;
        }

        pos.status = PositionStatus::Exiting;
        self.exit = ExitState::InProgress {
            reason,
            attempt_id: None,
            started_at: now,
        };

        info!(position_id = %pos.id, %reason, "Exit requested");
        Some(ExitRequest {
            position_id: pos.id.clone(),
            contract: pos.contract.clone(),
            quantity: pos.quantity,
            reason,
            requested_at: now,
        })
    }

    /// Link the working exit to its order attempt.
    pub fn attach_exit_attempt(&mut self, id: AttemptId) {
        if let ExitState::InProgress { attempt_id, .. } = &mut self.exit {
            *attempt_id = Some(id);
        }
    }

    /// The exit order ended without a fill: the position is open again.
    ///
    /// Forced exits are requested again on the next tick.
    pub fn exit_failed(&mut self, now: DateTime<Utc>) -> Option<ExitReason> {
        let pos = self.current.as_mut()?;
        let reason = self.exit.reason()?;
        pos.status = PositionStatus::Open;
        self.exit = ExitState::Failed {
            reason,
            failed_at: now,
        };
        warn!(
            position_id = %pos.id,
            %reason,
            forced = reason.is_forced(),
            "Exit order failed, position still open"
        );
        Some(reason)
    }

    /// Close the position on a confirmed exit fill.
    pub fn close(&mut self, exit_price: Price, now: DateTime<Utc>) -> PositionResult<Position> {
        let mut pos = self.current.take().ok_or(PositionError::NoPosition)?;
        let reason = self.exit.reason().unwrap_or(ExitReason::Manual);

        let realized_pnl =
            (exit_price.inner() - pos.entry_price.inner()) * Decimal::from(pos.quantity);
        pos.status = PositionStatus::Closed;
        pos.last_price = exit_price;
        pos.exit = Some(PositionExit {
            reason,
            price: exit_price,
            closed_at: now,
            realized_pnl,
        });
        self.exit = ExitState::NotStarted;

        info!(
            position_id = %pos.id,
            contract = %pos.contract,
            entry = %pos.entry_price,
            exit = %exit_price,
            pnl = %realized_pnl,
            %reason,
            "Position closed"
        );
        Metrics::stop_loss_level(0.0);
        Metrics::position_closed(
            pos.side.as_str(),
            reason.as_str(),
            (exit_price.inner() - pos.entry_price.inner())
                .to_f64()
                .unwrap_or_default(),
        );
        Ok(pos)
    }

    /// Reload a persisted open position after a restart.
    ///
    /// An exit that was working at shutdown is dropped and the position
    /// comes back `Open`; the caller re-requests any forced exit.
    pub fn restore(&mut self, mut position: Position) {
        if position.status == PositionStatus::Closed {
            return;
        }
        info!(
            position_id = %position.id,
            contract = %position.contract,
            stop_loss = %position.stop_loss_price,
            "Position restored"
        );
        if position.status == PositionStatus::Exiting {
            position.status = PositionStatus::Open;
        }
        self.exit = ExitState::NotStarted;
        self.current = Some(position);
    }

    #[must_use]
    pub fn current(&self) -> Option<&Position> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn has_position(&self) -> bool {
        self.current.is_some()
    }

    /// Kind of the open position, if any.
    #[must_use]
    pub fn open_kind(&self) -> Option<OptionKind> {
        self.current.as_ref().map(|p| p.side)
    }

    #[must_use]
    pub fn exit_state(&self) -> &ExitState {
        &self.exit
    }
}
