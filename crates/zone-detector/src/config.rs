//! Zone configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Configuration for zone computation and signal detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneConfig {
    /// Distance from the middle to the upper and lower boundaries.
    #[serde(default = "default_zone_offset")]
    pub zone_offset: Decimal,
    /// A tick within this many points of the middle counts as a middle touch.
    /// Zero means exact equality.
    #[serde(default = "default_middle_touch_tolerance")]
    pub middle_touch_tolerance: Decimal,
    /// Maximum points the ATM strike may sit out of the money before the
    /// next in-the-money strike is used instead.
    #[serde(default = "default_min_atm_distance")]
    pub min_atm_distance: Decimal,
    /// Wait between zone computation retries when no valid tick exists.
    #[serde(default = "default_zone_retry_interval_ms")]
    pub zone_retry_interval_ms: u64,
    /// Zone computation retries before the session is failed closed.
    #[serde(default = "default_zone_retry_limit")]
    pub zone_retry_limit: u32,
    /// Oldest index tick accepted for zone computation.
    #[serde(default = "default_max_tick_age_ms")]
    pub max_tick_age_ms: u64,
}

fn default_zone_offset() -> Decimal {
    Decimal::new(25, 1) // 2.5 points
}

fn default_middle_touch_tolerance() -> Decimal {
    Decimal::new(5, 1) // 0.5 points
}

fn default_min_atm_distance() -> Decimal {
    Decimal::from(25) // half a strike step: plain ATM
}

fn default_zone_retry_interval_ms() -> u64 {
    1000
}

fn default_zone_retry_limit() -> u32 {
    10
}

fn default_max_tick_age_ms() -> u64 {
    5000
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            zone_offset: default_zone_offset(),
            middle_touch_tolerance: default_middle_touch_tolerance(),
            min_atm_distance: default_min_atm_distance(),
            zone_retry_interval_ms: default_zone_retry_interval_ms(),
            zone_retry_limit: default_zone_retry_limit(),
            max_tick_age_ms: default_max_tick_age_ms(),
        }
    }
}

impl ZoneConfig {
    /// Validate configuration values.
    ///
    /// The middle band must sit strictly inside the zones, otherwise a single
    /// tick could both reopen the gates and break a boundary.
    pub fn validate(&self) -> Result<(), String> {
        if self.zone_offset <= Decimal::ZERO {
            return Err(format!(
                "zone_offset ({}) must be positive",
                self.zone_offset
            ));
        }
        if self.middle_touch_tolerance.is_sign_negative() {
            return Err(format!(
                "middle_touch_tolerance ({}) must be non-negative",
                self.middle_touch_tolerance
            ));
        }
        if self.middle_touch_tolerance >= self.zone_offset {
            return Err(format!(
                "middle_touch_tolerance ({}) must be less than zone_offset ({})",
                self.middle_touch_tolerance, self.zone_offset
            ));
        }
        if self.min_atm_distance.is_sign_negative() {
            return Err(format!(
                "min_atm_distance ({}) must be non-negative",
                self.min_atm_distance
            ));
        }
        Ok(())
    }
}
