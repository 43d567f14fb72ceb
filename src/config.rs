//! # Configuration
//!
//! Typed configuration for the health monitor, the round coordinator and the
//! shared state cache. Every section has defaults, so components can be built
//! from plain structs; [`OrchestrationConfig::load`] layers an optional TOML
//! file and `ROUNDWATCH__`-prefixed environment variables on top.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use crate::constants::GamePhase;
use crate::error::{Result, RoundwatchError};

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "ROUNDWATCH";

/// Top-level configuration for one control process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestrationConfig {
    /// Statically known worker set
    pub workers: Vec<String>,
    pub health: HealthConfig,
    pub coordinator: CoordinatorConfig,
    pub cache: CacheConfig,
}

impl Default for OrchestrationConfig {
    fn default() -> Self {
        Self {
            workers: Vec::new(),
            health: HealthConfig::default(),
            coordinator: CoordinatorConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl OrchestrationConfig {
    /// Load configuration from defaults, an optional TOML file and the environment.
    ///
    /// Environment keys use `__` as the nesting separator, e.g.
    /// `ROUNDWATCH__HEALTH__HEARTBEAT_TIMEOUT_MS=10000` or
    /// `ROUNDWATCH__WORKERS=table-1,table-2`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(true),
            );
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("workers"),
        );

        let loaded: Self = builder.build()?.try_deserialize()?;
        loaded.validate()?;

        tracing::debug!(
            workers = loaded.workers.len(),
            source = ?path,
            "⚙️ CONFIG: Loaded orchestration configuration"
        );

        Ok(loaded)
    }

    /// Reject configurations the components cannot operate under
    pub fn validate(&self) -> Result<()> {
        if self.workers.is_empty() {
            return Err(RoundwatchError::ConfigurationError(
                "at least one worker must be configured".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for name in &self.workers {
            if name.trim().is_empty() {
                return Err(RoundwatchError::ConfigurationError(
                    "worker names must not be blank".to_string(),
                ));
            }
            if !seen.insert(name.as_str()) {
                return Err(RoundwatchError::ConfigurationError(format!(
                    "duplicate worker name: {name}"
                )));
            }
        }

        self.health.validate()?;
        self.coordinator.validate()?;
        self.cache.validate()?;
        Ok(())
    }
}

/// Heartbeat and recovery thresholds for the health monitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Heartbeat age at which a worker becomes Critical
    pub heartbeat_timeout_ms: u64,
    /// Heartbeat age at which a worker becomes Warning
    pub warning_threshold_ms: u64,
    /// Hard cap on recovery attempts per worker
    pub max_recovery_attempts: u32,
    /// Minimum spacing between recovery attempts
    pub recovery_cooldown_ms: u64,
    /// Weight given to a new cycle-time sample in the moving average
    pub cycle_time_smoothing: f64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            heartbeat_timeout_ms: 30_000,
            warning_threshold_ms: 15_000,
            max_recovery_attempts: 3,
            recovery_cooldown_ms: 30_000,
            cycle_time_smoothing: 0.1,
        }
    }
}

impl HealthConfig {
    pub fn heartbeat_timeout(&self) -> Duration {
        Duration::from_millis(self.heartbeat_timeout_ms)
    }

    pub fn warning_threshold(&self) -> Duration {
        Duration::from_millis(self.warning_threshold_ms)
    }

    pub fn recovery_cooldown(&self) -> Duration {
        Duration::from_millis(self.recovery_cooldown_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.heartbeat_timeout_ms == 0 {
            return Err(RoundwatchError::ConfigurationError(
                "health.heartbeat_timeout_ms must be positive".to_string(),
            ));
        }
        if self.warning_threshold_ms >= self.heartbeat_timeout_ms {
            return Err(RoundwatchError::ConfigurationError(format!(
                "health.warning_threshold_ms ({}) must be below heartbeat_timeout_ms ({})",
                self.warning_threshold_ms, self.heartbeat_timeout_ms
            )));
        }
        if !(self.cycle_time_smoothing > 0.0 && self.cycle_time_smoothing <= 1.0) {
            return Err(RoundwatchError::ConfigurationError(format!(
                "health.cycle_time_smoothing must be in (0, 1], got {}",
                self.cycle_time_smoothing
            )));
        }
        Ok(())
    }
}

/// Synchronization thresholds for the round coordinator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Maximum update spread tolerated while active workers disagree
    pub sync_tolerance_ms: u64,
    /// Longest a round may stay active before a forced resync
    pub round_timeout_ms: u64,
    /// Update age after which a worker is considered stale
    pub stale_threshold_ms: u64,
    /// Maximum distance from the median score for a worker to count as aligned
    pub alignment_tolerance: f64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            sync_tolerance_ms: 2_000,
            round_timeout_ms: 60_000,
            stale_threshold_ms: 5_000,
            alignment_tolerance: 0.5,
        }
    }
}

impl CoordinatorConfig {
    pub fn sync_tolerance(&self) -> Duration {
        Duration::from_millis(self.sync_tolerance_ms)
    }

    pub fn round_timeout(&self) -> Duration {
        Duration::from_millis(self.round_timeout_ms)
    }

    pub fn stale_threshold(&self) -> Duration {
        Duration::from_millis(self.stale_threshold_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.stale_threshold_ms == 0 || self.round_timeout_ms == 0 {
            return Err(RoundwatchError::ConfigurationError(
                "coordinator thresholds must be positive".to_string(),
            ));
        }
        if self.alignment_tolerance <= 0.0 {
            return Err(RoundwatchError::ConfigurationError(
                "coordinator.alignment_tolerance must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Minimum re-read cadence per game phase, in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseIntervals {
    pub unknown_ms: u64,
    pub betting_ms: u64,
    pub loading_ms: u64,
    pub start_ms: u64,
    pub score_low_ms: u64,
    pub score_mid_ms: u64,
    pub score_high_ms: u64,
    pub ended_ms: u64,
}

impl Default for PhaseIntervals {
    fn default() -> Self {
        Self {
            unknown_ms: 500,
            betting_ms: 300,
            loading_ms: 200,
            start_ms: 150,
            score_low_ms: 150,
            score_mid_ms: 200,
            score_high_ms: 300,
            ended_ms: 1_000,
        }
    }
}

impl PhaseIntervals {
    pub fn interval_for(&self, phase: GamePhase) -> Duration {
        let millis = match phase {
            GamePhase::Unknown => self.unknown_ms,
            GamePhase::Betting => self.betting_ms,
            GamePhase::Loading => self.loading_ms,
            GamePhase::Start => self.start_ms,
            GamePhase::ScoreLow => self.score_low_ms,
            GamePhase::ScoreMid => self.score_mid_ms,
            GamePhase::ScoreHigh => self.score_high_ms,
            GamePhase::Ended => self.ended_ms,
        };
        Duration::from_millis(millis)
    }
}

/// Sampling loop settings for the shared state cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Sleep between loop passes
    pub loop_slice_ms: u64,
    /// Pause after a loop-level failure before the next pass
    pub error_backoff_ms: u64,
    /// Join timeout used by callers that stop the cache with defaults
    pub stop_timeout_ms: u64,
    pub phase_intervals: PhaseIntervals,
    /// Case-insensitive fragments that identify a loading screen in the score region
    pub loading_markers: Vec<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            loop_slice_ms: 10,
            error_backoff_ms: 100,
            stop_timeout_ms: 2_000,
            phase_intervals: PhaseIntervals::default(),
            loading_markers: vec!["loading".to_string()],
        }
    }
}

impl CacheConfig {
    pub fn loop_slice(&self) -> Duration {
        Duration::from_millis(self.loop_slice_ms)
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_millis(self.error_backoff_ms)
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.loop_slice_ms == 0 {
            return Err(RoundwatchError::ConfigurationError(
                "cache.loop_slice_ms must be positive".to_string(),
            ));
        }
        if let Some(phase) = GamePhase::ALL
            .iter()
            .find(|phase| self.phase_intervals.interval_for(**phase).is_zero())
        {
            return Err(RoundwatchError::ConfigurationError(format!(
                "cache.phase_intervals for {phase} must be positive"
            )));
        }
        Ok(())
    }
}
