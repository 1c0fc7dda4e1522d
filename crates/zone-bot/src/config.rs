//! Application configuration.
//!
//! Loaded once at start of day from a TOML file, with
//! `ZONEBOT__<SECTION>__<KEY>` environment overrides. Read-only afterwards.

use crate::error::{AppError, AppResult};
use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use zone_core::SessionSchedule;
use zone_detector::ZoneConfig;
use zone_executor::OrderConfig;
use zone_persistence::PersistenceConfig;
use zone_position::PositionConfig;
use zone_risk::RiskConfig;

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "ZONEBOT";

/// Operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Simulated fills against replayed or live ticks.
    #[default]
    Paper,
    /// Real orders through an external broker gateway.
    Live,
}

/// Traded underlying and option contract parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentConfig {
    #[serde(default = "default_underlying")]
    pub underlying: String,
    /// Feed symbol of the index ticks.
    #[serde(default = "default_index_symbol")]
    pub index_symbol: String,
    #[serde(default = "default_strike_step")]
    pub strike_step: u32,
    /// Contracts per order.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Fixed expiry. When unset, the next `expiry_weekday` on or after the
    /// session date is used.
    #[serde(default)]
    pub expiry: Option<NaiveDate>,
    #[serde(default = "default_expiry_weekday")]
    pub expiry_weekday: Weekday,
}

fn default_underlying() -> String {
    "NIFTY".to_string()
}

fn default_index_symbol() -> String {
    "NIFTY 50".to_string()
}

fn default_strike_step() -> u32 {
    50
}

fn default_quantity() -> u32 {
    75
}

fn default_expiry_weekday() -> Weekday {
    Weekday::Thu
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            underlying: default_underlying(),
            index_symbol: default_index_symbol(),
            strike_step: default_strike_step(),
            quantity: default_quantity(),
            expiry: None,
            expiry_weekday: default_expiry_weekday(),
        }
    }
}

impl InstrumentConfig {
    /// Option expiry traded on `session_date`.
    #[must_use]
    pub fn expiry_for(&self, session_date: NaiveDate) -> NaiveDate {
        if let Some(expiry) = self.expiry {
            return expiry;
        }
        let from = session_date.weekday().num_days_from_monday();
        let to = self.expiry_weekday.num_days_from_monday();
        let ahead = (7 + to - from) % 7;
        session_date
            .checked_add_days(Days::new(u64::from(ahead)))
            .unwrap_or(session_date)
    }
}

/// Session schedule plus the heartbeat driving it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(flatten)]
    pub schedule: SessionSchedule,
    #[serde(default = "default_clock_interval_ms")]
    pub clock_interval_ms: u64,
}

fn default_clock_interval_ms() -> u64 {
    1000
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            schedule: SessionSchedule::default(),
            clock_interval_ms: default_clock_interval_ms(),
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn clock_interval(&self) -> Duration {
        Duration::from_millis(self.clock_interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info,zone_bot=debug".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Paper trading input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaperConfig {
    /// JSON Lines tick file. Without one, paper mode waits for ticks pushed
    /// through the router handle.
    #[serde(default)]
    pub replay_file: Option<PathBuf>,
    /// Delay between replayed ticks (ms).
    #[serde(default)]
    pub replay_interval_ms: u64,
}

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub instrument: InstrumentConfig,
    #[serde(default)]
    pub zones: ZoneConfig,
    #[serde(default)]
    pub orders: OrderConfig,
    #[serde(default)]
    pub position: PositionConfig,
    #[serde(default)]
    pub risk: RiskConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub persistence: PersistenceConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub paper: PaperConfig,
}

impl AppConfig {
    /// Load from a TOML file with environment overrides, then validate.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let loaded: Self = config::Config::builder()
            .add_source(config::File::with_name(path).format(config::FileFormat::Toml))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Parse a TOML document without environment overrides.
    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        let parsed: Self = toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        parsed.validate()?;
        Ok(parsed)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.instrument.strike_step == 0 {
            return Err(AppError::Config("instrument.strike_step must be positive".into()));
        }
        if self.instrument.quantity == 0 {
            return Err(AppError::Config("instrument.quantity must be positive".into()));
        }
        self.zones.validate().map_err(AppError::Config)?;
        self.orders.validate()?;
        self.position.validate()?;
        self.risk.validate()?;
        self.session.schedule.validate()?;
        if self.session.clock_interval_ms == 0 {
            return Err(AppError::Config("session.clock_interval_ms must be positive".into()));
        }
        if self.persistence.channel_capacity == 0 {
            return Err(AppError::Config(
                "persistence.channel_capacity must be positive".into(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn is_paper(&self) -> bool {
        self.mode == Mode::Paper
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.mode, Mode::Paper);
        assert_eq!(config.zones.zone_offset, dec!(2.5));
        assert_eq!(config.position.stop_loss, dec!(2.5));
        assert_eq!(config.orders.order_retry_limit, 10);
        assert_eq!(config.session.schedule.utc_offset_minutes, 330);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_str = r#"
mode = "live"

[instrument]
quantity = 50
expiry = "2024-01-25"

[zones]
zone_offset = "5"

[risk]
max_daily_trades = 2

[session]
zone_calc_time = "09:20:00"
clock_interval_ms = 250
"#;
        let config = AppConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.mode, Mode::Live);
        assert_eq!(config.instrument.quantity, 50);
        assert_eq!(config.instrument.underlying, "NIFTY");
        assert_eq!(config.zones.zone_offset, dec!(5));
        assert_eq!(config.risk.max_daily_trades, 2);
        assert_eq!(config.risk.max_daily_loss, dec!(500));
        assert_eq!(
            config.session.schedule.zone_calc_time,
            NaiveTime::from_hms_opt(9, 20, 0).unwrap()
        );
        assert_eq!(config.session.clock_interval(), Duration::from_millis(250));
    }

    #[test]
    fn test_tolerance_not_below_offset_rejected() {
        let toml_str = r#"
[zones]
zone_offset = "1"
middle_touch_tolerance = "1"
"#;
        assert!(AppConfig::from_toml_str(toml_str).is_err());
    }

    #[test]
    fn test_session_order_rejected() {
        let toml_str = r#"
[session]
session_end_time = "09:00:00"
"#;
        assert!(AppConfig::from_toml_str(toml_str).is_err());
    }

    #[test]
    fn test_from_file_with_env_override() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[risk]\nmax_daily_trades = 3\nmax_daily_loss = \"250\"").unwrap();

        std::env::set_var("ZONEBOT__ORDERS__ORDER_RETRY_LIMIT", "4");
        let config = AppConfig::from_file(file.path().to_str().unwrap()).unwrap();
        std::env::remove_var("ZONEBOT__ORDERS__ORDER_RETRY_LIMIT");

        assert_eq!(config.risk.max_daily_trades, 3);
        assert_eq!(config.risk.max_daily_loss, dec!(250));
        assert_eq!(config.orders.order_retry_limit, 4);
    }

    #[test]
    fn test_expiry_defaults_to_next_weekday() {
        let config = InstrumentConfig::default();
        // 2024-01-18 is a Thursday
        let thursday = NaiveDate::from_ymd_opt(2024, 1, 18).unwrap();
        let friday = NaiveDate::from_ymd_opt(2024, 1, 19).unwrap();
        assert_eq!(config.expiry_for(thursday), thursday);
        assert_eq!(
            config.expiry_for(friday),
            NaiveDate::from_ymd_opt(2024, 1, 25).unwrap()
        );

        let fixed = InstrumentConfig {
            expiry: Some(friday),
            ..Default::default()
        };
        assert_eq!(fixed.expiry_for(thursday), friday);
    }

    #[test]
    fn test_config_roundtrips_through_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed = AppConfig::from_toml_str(&toml_str).unwrap();
        assert_eq!(parsed.instrument.index_symbol, "NIFTY 50");
        assert_eq!(parsed.position.ladder, config.position.ladder);
    }
}
