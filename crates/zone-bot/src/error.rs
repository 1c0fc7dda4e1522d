//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("Core error: {0}")]
    Core(#[from] zone_core::CoreError),

    #[error("Detector error: {0}")]
    Detector(#[from] zone_detector::DetectorError),

    #[error("Executor error: {0}")]
    Executor(#[from] zone_executor::ExecutorError),

    #[error("Position error: {0}")]
    Position(#[from] zone_position::PositionError),

    #[error("Risk error: {0}")]
    Risk(#[from] zone_risk::RiskError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] zone_telemetry::TelemetryError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] zone_persistence::PersistenceError),

    #[error("Replay error at line {line}: {message}")]
    Replay { line: usize, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Shutdown requested")]
    Shutdown,
}

pub type AppResult<T> = Result<T, AppError>;
