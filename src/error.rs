//! Error types for the roundwatch orchestration core.
//!
//! Calls that reference an unknown worker are not errors: they are logged and
//! ignored. The variants here cover construction, configuration and lifecycle
//! failures only.

use thiserror::Error;

use crate::constants::RegionKind;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoundwatchError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("Sensor error for {worker} ({region}): {reason}")]
    SensorError {
        worker: String,
        region: RegionKind,
        reason: String,
    },
    #[error("Cache error: {0}")]
    CacheError(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl RoundwatchError {
    pub fn sensor(worker: &str, region: RegionKind, error: &anyhow::Error) -> Self {
        RoundwatchError::SensorError {
            worker: worker.to_string(),
            region,
            reason: format!("{error:#}"),
        }
    }
}

impl From<config::ConfigError> for RoundwatchError {
    fn from(error: config::ConfigError) -> Self {
        RoundwatchError::ConfigurationError(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RoundwatchError>;
