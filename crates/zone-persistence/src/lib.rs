//! Trade and order journals, session snapshots.
//!
//! Closed trades and every order attempt state change are appended to daily
//! JSON Lines files; the session snapshot (zones, gates, risk counters, open
//! position) is a single JSON file replaced atomically. All writes go
//! through a fire-and-forget recorder task.

pub mod config;
pub mod error;
pub mod records;
pub mod recorder;
pub mod state_store;
pub mod writer;

pub use config::PersistenceConfig;
pub use error::{PersistenceError, PersistenceResult};
pub use records::{JournalRecord, OrderAttemptRecord, TradeRecord};
pub use recorder::{spawn_recorder, RecorderHandle, RecorderMsg, RecorderTask};
pub use state_store::{SessionSnapshot, SnapshotStore};
pub use writer::JsonLinesWriter;
