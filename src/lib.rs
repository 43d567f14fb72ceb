#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Roundwatch Core
//!
//! Process-local orchestration core for a fleet of live round monitors.
//!
//! ## Overview
//!
//! Each monitored game table is watched by a worker process. The control
//! process supervises those workers, keeps their round phases aligned, and
//! shares one set of screen sensors between every consumer so no region is
//! read twice in the same cadence.
//!
//! ## Module Organization
//!
//! - [`orchestration`] - Health monitor, round coordinator, process handles and control plane
//! - [`cache`] - Shared state cache with its sampling loop and sensor seam
//! - [`config`] - Layered configuration (TOML file plus `ROUNDWATCH__*` environment)
//! - [`constants`] - Status, round, phase and region enums
//! - [`error`] - Structured error handling
//! - [`logging`] - Tracing subscriber setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use roundwatch::cache::sensor::{ReplayFeed, ReplaySensor, SensorCapability};
//! use roundwatch::config::CacheConfig;
//! use roundwatch::constants::RegionKind;
//! use roundwatch::SharedStateCache;
//!
//! # async fn example() -> roundwatch::Result<()> {
//! let factory = |_worker: &str, _region: RegionKind| -> anyhow::Result<Box<dyn SensorCapability>> {
//!     Ok(ReplaySensor::boxed(ReplayFeed::new()))
//! };
//!
//! let mut cache = SharedStateCache::new(["table-1"], CacheConfig::default(), &factory)?;
//! cache.start()?;
//!
//! if let Some(state) = cache.get_state("table-1") {
//!     println!("table-1 is in phase {}", state.phase);
//! }
//!
//! cache.stop(std::time::Duration::from_secs(2)).await?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod orchestration;

pub use cache::{CacheReader, CacheStats, GameState, SharedStateCache, ShutdownOutcome};
pub use config::{CacheConfig, CoordinatorConfig, HealthConfig, OrchestrationConfig, PhaseIntervals};
pub use constants::{GamePhase, RegionKind, RoundState, WorkerStatus};
pub use error::{Result, RoundwatchError};
pub use orchestration::{
    ChildProcess, ControlChannel, ControlMessage, ControlPlane, Coordinator, HealthMonitor, HeartbeatMetrics,
    ProcessHandle, RoundReport, SupervisionReport,
};
