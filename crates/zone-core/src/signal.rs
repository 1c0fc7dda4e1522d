//! Entry signal emitted on a zone break.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{OptionKind, Price};

/// A zone break that may become an entry order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySignal {
    pub kind: OptionKind,
    /// Index price of the tick that crossed.
    pub index_price: Price,
    /// Boundary that was crossed (upper for CE, lower for PE).
    pub boundary: Price,
    pub detected_at: DateTime<Utc>,
}
