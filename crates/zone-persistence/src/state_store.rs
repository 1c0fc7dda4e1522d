//! Session snapshot store.
//!
//! The engine saves zones, gates, risk counters and the open position after
//! every state change that matters for a restart. The file is replaced
//! atomically (write to a temp file, then rename).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zone_core::{DailyRiskState, GateState, Position, ZoneSet};

use crate::error::PersistenceResult;

/// State needed to resume a session after a restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub saved_at: DateTime<Utc>,
    /// Local session date.
    pub date: NaiveDate,
    pub zones: Option<ZoneSet>,
    pub gate: GateState,
    pub risk: DailyRiskState,
    pub position: Option<Position>,
}

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, snapshot: &SessionSnapshot) -> PersistenceResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            serde_json::to_writer_pretty(&mut file, snapshot)?;
            file.write_all(b"\n")?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), date = %snapshot.date, "Session snapshot saved");
        Ok(())
    }

    /// Load the snapshot, `None` if no file exists.
    pub fn load(&self) -> PersistenceResult<Option<SessionSnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&self.path)?;
        let snapshot: SessionSnapshot = serde_json::from_str(&data)?;
        info!(
            path = %self.path.display(),
            date = %snapshot.date,
            has_zones = snapshot.zones.is_some(),
            has_position = snapshot.position.is_some(),
            "Session snapshot loaded"
        );
        Ok(Some(snapshot))
    }
}
