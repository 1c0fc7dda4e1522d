//! Position exit requests and state.
//!
//! An exit is a sell order routed through the order controller. The
//! position stays open until that order is confirmed filled.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zone_core::{AttemptId, ExitReason, OptionContract, PositionId};

/// Request to sell the open position.
///
/// Created by the position manager, executed by the order controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitRequest {
    pub position_id: PositionId,
    pub contract: OptionContract,
    pub quantity: u32,
    pub reason: ExitReason,
    pub requested_at: DateTime<Utc>,
}

/// Progress of the current exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitState {
    /// No exit requested.
    NotStarted,
    /// Exit order working.
    InProgress {
        reason: ExitReason,
        attempt_id: Option<AttemptId>,
        started_at: DateTime<Utc>,
    },
    /// Exit order ended without a fill; the position is open again.
    Failed {
        reason: ExitReason,
        failed_at: DateTime<Utc>,
    },
}

impl ExitState {
    /// Check if an exit order is working.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::InProgress { .. })
    }

    /// Reason of the current or last exit, if any.
    pub fn reason(&self) -> Option<ExitReason> {
        match self {
            Self::NotStarted => None,
            Self::InProgress { reason, .. } | Self::Failed { reason, .. } => Some(*reason),
        }
    }

    /// A forced exit that failed and must be requested again.
    pub fn pending_forced(&self) -> Option<ExitReason> {
        match self {
            Self::Failed { reason, .. } if reason.is_forced() => Some(*reason),
            _ => None,
        }
    }
}
