//! Order attempt lifecycle types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{AttemptId, BrokerOrderId, OptionContract, OptionKind, OrderSide, Price, Strike};

// ============================================================================
// Attempt State
// ============================================================================

/// State of an order attempt.
///
/// `Idle → Placed ⇄ Modifying → {Filled | Rejected | Cancelled}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptState {
    /// Created; placement not yet acknowledged by the broker.
    #[default]
    Idle,
    /// Resting at the broker.
    Placed,
    /// Re-price sent, awaiting acknowledgement.
    Modifying,
    /// Completely filled.
    Filled,
    /// Rejected by the broker or retries exhausted.
    Rejected,
    /// Cancelled (superseded or flattened).
    Cancelled,
}

impl AttemptState {
    /// Returns true if the attempt is in a terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Filled | Self::Cancelled | Self::Rejected)
    }

    /// Returns true if an order may be resting at the broker.
    #[must_use]
    pub fn is_working(&self) -> bool {
        matches!(self, Self::Placed | Self::Modifying)
    }
}

impl fmt::Display for AttemptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Placed => "placed",
            Self::Modifying => "modifying",
            Self::Filled => "filled",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Reason an attempt ended in `Rejected`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    InsufficientFunds,
    MarketClosed,
    RateLimited,
    /// Unclassified broker reject, with the raw reason code.
    Unknown(String),
    /// Re-pricing budget used up without a fill.
    RetriesExhausted,
    /// No option quote arrived within the retry budget.
    QuoteUnavailable,
    /// Broker calls kept failing within the retry budget.
    BrokerUnreachable,
}

impl RejectReason {
    /// Classify a broker reason code.
    ///
    /// Matching is case-insensitive on substrings, since brokers phrase the
    /// same condition differently (`RMS:Margin Exceeds`, `insufficient funds`).
    #[must_use]
    pub fn classify(code: &str) -> Self {
        let lower = code.to_ascii_lowercase();
        if lower.contains("insufficient") || lower.contains("margin") || lower.contains("funds") {
            Self::InsufficientFunds
        } else if lower.contains("market closed")
            || lower.contains("market_closed")
            || lower.contains("market is closed")
        {
            Self::MarketClosed
        } else if lower.contains("rate") || lower.contains("too many") || lower.contains("throttl")
        {
            Self::RateLimited
        } else {
            Self::Unknown(code.to_string())
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::InsufficientFunds => "insufficient_funds",
            Self::MarketClosed => "market_closed",
            Self::RateLimited => "rate_limited",
            Self::Unknown(_) => "unknown",
            Self::RetriesExhausted => "retries_exhausted",
            Self::QuoteUnavailable => "quote_unavailable",
            Self::BrokerUnreachable => "broker_unreachable",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(code) => write!(f, "unknown({code})"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Why a position is being exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    /// Option LTP touched the stop-loss.
    StopLoss,
    /// Session end flatten.
    SessionFlatten,
    /// Daily risk halt flatten.
    RiskHalt,
    /// Operator request.
    Manual,
}

impl ExitReason {
    /// Forced exits are re-requested until filled.
    #[must_use]
    pub fn is_forced(&self) -> bool {
        matches!(self, Self::SessionFlatten | Self::RiskHalt)
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StopLoss => "stop_loss",
            Self::SessionFlatten => "session_flatten",
            Self::RiskHalt => "risk_halt",
            Self::Manual => "manual",
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an attempt is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptPurpose {
    Entry,
    Exit(ExitReason),
}

impl AttemptPurpose {
    #[must_use]
    pub fn is_entry(&self) -> bool {
        matches!(self, Self::Entry)
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Entry => "entry",
            Self::Exit(_) => "exit",
        }
    }
}

// ============================================================================
// Order Attempt
// ============================================================================

/// One run of the placement/retry protocol for a single limit order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAttempt {
    pub id: AttemptId,
    pub purpose: AttemptPurpose,
    /// Option kind being traded.
    pub side: OptionKind,
    pub strike: Strike,
    pub contract: OptionContract,
    pub order_side: OrderSide,
    pub quantity: u32,
    pub limit_price: Price,
    pub state: AttemptState,
    pub reject_reason: Option<RejectReason>,
    /// Re-prices and recoverable re-sends consumed so far.
    pub retries_used: u32,
    pub broker_order_id: Option<BrokerOrderId>,
    pub fill_price: Option<Price>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Attempt that replaced this one, if superseded.
    pub superseded_by: Option<AttemptId>,
    /// Placement sent, acknowledgement pending.
    #[serde(default)]
    pub place_pending: bool,
    /// Cancel requested, confirmation pending.
    #[serde(default)]
    pub cancel_requested: bool,
    /// Cancel was requested because retries ran out.
    #[serde(default)]
    pub exhausted: bool,
    /// The single rate-limit re-placement has been used.
    #[serde(default)]
    pub rate_limit_replaced: bool,
}

impl OrderAttempt {
    pub fn new(
        id: AttemptId,
        purpose: AttemptPurpose,
        contract: OptionContract,
        order_side: OrderSide,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            purpose,
            side: contract.kind,
            strike: contract.strike,
            contract,
            order_side,
            quantity,
            limit_price: Price::ZERO,
            state: AttemptState::Idle,
            reject_reason: None,
            retries_used: 0,
            broker_order_id: None,
            fill_price: None,
            created_at: now,
            updated_at: now,
            superseded_by: None,
            place_pending: false,
            cancel_requested: false,
            exhausted: false,
            rate_limit_replaced: false,
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn transition(&mut self, state: AttemptState, now: DateTime<Utc>) {
        self.state = state;
        self.updated_at = now;
    }

    pub fn mark_filled(&mut self, price: Price, now: DateTime<Utc>) {
        self.fill_price = Some(price);
        self.place_pending = false;
        self.cancel_requested = false;
        self.reject_reason = None;
        self.transition(AttemptState::Filled, now);
    }

    pub fn mark_rejected(&mut self, reason: RejectReason, now: DateTime<Utc>) {
        self.reject_reason = Some(reason);
        self.place_pending = false;
        self.transition(AttemptState::Rejected, now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    #[test]
    fn test_attempt_state_terminal() {
        assert!(!AttemptState::Idle.is_terminal());
        assert!(!AttemptState::Placed.is_terminal());
        assert!(!AttemptState::Modifying.is_terminal());
        assert!(AttemptState::Filled.is_terminal());
        assert!(AttemptState::Rejected.is_terminal());
        assert!(AttemptState::Cancelled.is_terminal());
        assert!(AttemptState::Modifying.is_working());
        assert!(!AttemptState::Idle.is_working());
    }

    #[test]
    fn test_reject_classification() {
        assert_eq!(
            RejectReason::classify("RMS:Margin Exceeds"),
            RejectReason::InsufficientFunds
        );
        assert_eq!(
            RejectReason::classify("Market is closed"),
            RejectReason::MarketClosed
        );
        assert_eq!(
            RejectReason::classify("Too many requests"),
            RejectReason::RateLimited
        );
        assert_eq!(
            RejectReason::classify("invalid symbol"),
            RejectReason::Unknown("invalid symbol".into())
        );
    }

    #[test]
    fn test_attempt_json_carries_purpose() {
        let expiry = NaiveDate::from_ymd_opt(2024, 1, 18).unwrap();
        let contract = OptionContract::new("NIFTY", expiry, OptionKind::Pe, Strike(25000));
        let now = Utc.with_ymd_and_hms(2024, 1, 18, 4, 0, 0).unwrap();
        let attempt = OrderAttempt::new(
            AttemptId::from("zt_1_abcd"),
            AttemptPurpose::Exit(ExitReason::StopLoss),
            contract,
            OrderSide::Sell,
            75,
            now,
        );
        let json = serde_json::to_string(&attempt).unwrap();
        assert!(json.contains("\"purpose\":{\"exit\":\"stop_loss\"}"));

        let back: OrderAttempt = serde_json::from_str(&json).unwrap();
        assert_eq!(back, attempt);
    }

    #[test]
    fn test_mark_filled_clears_pending_flags() {
        let expiry = NaiveDate::from_ymd_opt(2024, 1, 18).unwrap();
        let contract = OptionContract::new("NIFTY", expiry, OptionKind::Ce, Strike(25000));
        let now = Utc.with_ymd_and_hms(2024, 1, 18, 4, 0, 0).unwrap();
        let mut attempt = OrderAttempt::new(
            AttemptId::new(),
            AttemptPurpose::Entry,
            contract,
            OrderSide::Buy,
            75,
            now,
        );
        attempt.cancel_requested = true;
        attempt.mark_filled(Price::new(rust_decimal_macros::dec!(51)), now);
        assert_eq!(attempt.state, AttemptState::Filled);
        assert!(!attempt.cancel_requested);
        assert!(attempt.is_terminal());
    }
}
