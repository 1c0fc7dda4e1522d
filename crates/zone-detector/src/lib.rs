//! Zone tracking and signal detection.
//!
//! Computes the daily zone boundaries from the index LTP at the configured
//! instant and turns subsequent index ticks into gated entry signals:
//! an upper-zone break gives a CE entry, a lower-zone break a PE entry, and
//! both gates stay closed until the index returns to the middle zone.

pub mod config;
pub mod detector;
pub mod error;
pub mod zone_tracker;

pub use config::ZoneConfig;
pub use detector::{DetectorOutcome, SignalDetector};
pub use error::{DetectorError, DetectorResult};
pub use zone_tracker::{compute_zones, ZoneInit, ZoneLevels, ZoneTracker};
