//! Messages between the order controller, the runtime and the broker.
//!
//! The controller never calls the broker itself. It returns
//! [`OrderCommand`]s; the runtime executes them and feeds the outcomes back
//! as [`BrokerEvent`]s through the ordered event stream.

use std::time::Duration;

use zone_core::{AttemptId, BrokerOrderId, OptionContract, OrderAttempt, OrderSide, Price};

use crate::error::ExecutorError;

/// Limit order sent to the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    /// Sent as the broker order tag.
    pub attempt_id: AttemptId,
    pub contract: OptionContract,
    pub side: OrderSide,
    pub quantity: u32,
    pub limit_price: Price,
}

/// Broker call to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokerCommand {
    Place {
        request: OrderRequest,
    },
    Modify {
        attempt_id: AttemptId,
        broker_order_id: BrokerOrderId,
        price: Price,
    },
    Cancel {
        attempt_id: AttemptId,
        broker_order_id: BrokerOrderId,
    },
}

impl BrokerCommand {
    #[must_use]
    pub fn attempt_id(&self) -> &AttemptId {
        match self {
            Self::Place { request } => &request.attempt_id,
            Self::Modify { attempt_id, .. } | Self::Cancel { attempt_id, .. } => attempt_id,
        }
    }

    /// Operation label for logs and metrics.
    #[must_use]
    pub fn op(&self) -> &'static str {
        match self {
            Self::Place { .. } => "place",
            Self::Modify { .. } => "modify",
            Self::Cancel { .. } => "cancel",
        }
    }
}

/// Side effect requested by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderCommand {
    Broker(BrokerCommand),
    /// Deliver `on_retry_timer(attempt_id, seq)` after `after`.
    ScheduleRetry {
        attempt_id: AttemptId,
        seq: u64,
        after: Duration,
    },
    /// Persist the attempt snapshot.
    Record(OrderAttempt),
}

/// Outcome of a broker call, or an asynchronous broker callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokerEvent {
    Placed {
        attempt_id: AttemptId,
        broker_order_id: BrokerOrderId,
    },
    PlaceFailed {
        attempt_id: AttemptId,
        error: ExecutorError,
    },
    Modified {
        attempt_id: AttemptId,
    },
    ModifyFailed {
        attempt_id: AttemptId,
        error: ExecutorError,
    },
    CancelConfirmed {
        attempt_id: AttemptId,
    },
    CancelFailed {
        attempt_id: AttemptId,
        error: ExecutorError,
    },
    /// `onFilled(orderId, price)`
    Filled {
        broker_order_id: BrokerOrderId,
        price: Price,
    },
    /// `onRejected(orderId, reasonCode)`
    Rejected {
        broker_order_id: BrokerOrderId,
        reason_code: String,
    },
}

impl BrokerEvent {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Placed { .. } => "placed",
            Self::PlaceFailed { .. } => "place_failed",
            Self::Modified { .. } => "modified",
            Self::ModifyFailed { .. } => "modify_failed",
            Self::CancelConfirmed { .. } => "cancel_confirmed",
            Self::CancelFailed { .. } => "cancel_failed",
            Self::Filled { .. } => "filled",
            Self::Rejected { .. } => "rejected",
        }
    }

    /// Build the event reporting the result of `command`.
    pub fn from_call(command: &BrokerCommand, result: Result<Option<BrokerOrderId>, ExecutorError>) -> Self {
        let attempt_id = command.attempt_id().clone();
        match (command, result) {
            (BrokerCommand::Place { .. }, Ok(Some(broker_order_id))) => Self::Placed {
                attempt_id,
                broker_order_id,
            },
            (BrokerCommand::Place { .. }, Ok(None)) => Self::PlaceFailed {
                attempt_id,
                error: ExecutorError::Unreachable("no order id returned".into()),
            },
            (BrokerCommand::Place { .. }, Err(error)) => Self::PlaceFailed { attempt_id, error },
            (BrokerCommand::Modify { .. }, Ok(_)) => Self::Modified { attempt_id },
            (BrokerCommand::Modify { .. }, Err(error)) => Self::ModifyFailed { attempt_id, error },
            (BrokerCommand::Cancel { .. }, Ok(_)) => Self::CancelConfirmed { attempt_id },
            (BrokerCommand::Cancel { .. }, Err(error)) => Self::CancelFailed { attempt_id, error },
        }
    }
}

/// Attempt outcome reported to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptEvent {
    Filled {
        attempt: OrderAttempt,
        price: Price,
        /// The attempt had already finished locally; the broker's fill wins.
        reconciled: bool,
    },
    Rejected {
        attempt: OrderAttempt,
    },
    Cancelled {
        attempt: OrderAttempt,
    },
    /// Submission merged into the attempt already working.
    Absorbed {
        attempt_id: AttemptId,
    },
}

/// Commands and attempt events produced by one controller call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControllerOutput {
    pub commands: Vec<OrderCommand>,
    pub events: Vec<AttemptEvent>,
}

impl ControllerOutput {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.events.is_empty()
    }

    pub fn extend(&mut self, other: ControllerOutput) {
        self.commands.extend(other.commands);
        self.events.extend(other.events);
    }

    /// Broker commands only.
    pub fn broker_commands(&self) -> impl Iterator<Item = &BrokerCommand> {
        self.commands.iter().filter_map(|c| match c {
            OrderCommand::Broker(cmd) => Some(cmd),
            _ => None,
        })
    }
}
