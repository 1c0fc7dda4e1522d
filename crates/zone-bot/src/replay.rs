//! Tick replay for paper mode.
//!
//! Reads a JSON Lines price file and feeds it through the router and the
//! paper broker, one line per interval:
//!
//! ```text
//! {"feed":"index","price":"25003"}
//! {"feed":"option","kind":"CE","price":"50.5"}
//! {"feed":"option","kind":"PE","strike":25000,"price":"41"}
//! ```
//!
//! Option lines resolve against the contracts the engine has subscribed;
//! a line with no matching subscription is skipped. Ticks are stamped at
//! the moment they are replayed.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info, warn};
use zone_core::{Instrument, OptionKind, Price, Strike, Tick};

use crate::error::{AppError, AppResult};
use crate::paper::PaperBroker;
use crate::router::RouterHandle;

/// One line of a replay file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "feed", rename_all = "snake_case")]
pub enum ReplayLine {
    Index {
        price: Price,
    },
    Option {
        kind: OptionKind,
        #[serde(default)]
        strike: Option<Strike>,
        price: Price,
    },
}

#[derive(Debug, Clone)]
pub struct TickReplay {
    lines: Vec<ReplayLine>,
    index_symbol: String,
    interval: Duration,
}

impl TickReplay {
    pub fn new(lines: Vec<ReplayLine>, index_symbol: impl Into<String>, interval: Duration) -> Self {
        Self {
            lines,
            index_symbol: index_symbol.into(),
            interval,
        }
    }

    /// Parse a replay file. Blank lines and `#` comments are ignored.
    pub fn from_file(path: &Path, index_symbol: &str, interval: Duration) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut lines = Vec::new();
        for (n, raw) in content.lines().enumerate() {
            let raw = raw.trim();
            if raw.is_empty() || raw.starts_with('#') {
                continue;
            }
            let line = serde_json::from_str(raw).map_err(|e| AppError::Replay {
                line: n + 1,
                message: e.to_string(),
            })?;
            lines.push(line);
        }
        info!(path = %path.display(), lines = lines.len(), "Replay file loaded");
        Ok(Self::new(lines, index_symbol, interval))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Feed every line, returning how many ticks were delivered.
    pub async fn run(self, router: RouterHandle, paper: Arc<PaperBroker>) -> usize {
        let mut delivered = 0;
        for line in self.lines {
            if !self.interval.is_zero() {
                tokio::time::sleep(self.interval).await;
            }
            let instrument = match line {
                ReplayLine::Index { .. } => Instrument::index(self.index_symbol.clone()),
                ReplayLine::Option { kind, strike, .. } => match paper.contract_for(kind, strike) {
                    Some(contract) => contract.into(),
                    None => {
                        debug!(%kind, ?strike, "No subscribed contract, replay line skipped");
                        continue;
                    }
                },
            };
            let price = match line {
                ReplayLine::Index { price } | ReplayLine::Option { price, .. } => price,
            };
            let tick = Tick::new(instrument, price, Utc::now());

            paper.on_tick(&tick);
            if router.submit(tick.into()).await.is_err() {
                warn!(delivered, "Router stopped during replay");
                return delivered;
            }
            delivered += 1;
        }
        info!(delivered, "Replay finished");
        delivered
    }
}
