//! Persistence configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Directory for journals and the session snapshot.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Records buffered per journal before a flush.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
    /// Recorder channel capacity. Records sent while full are dropped.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_buffer_size() -> usize {
    1
}

fn default_channel_capacity() -> usize {
    1024
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            buffer_size: default_buffer_size(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl PersistenceConfig {
    /// Path of the session snapshot file.
    #[must_use]
    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join("session_state.json")
    }
}
