//! # Shared State Cache
//!
//! One sampling loop owns every sensor for every worker, derives each
//! worker's game phase, and republishes a [`GameState`] snapshot per worker
//! into a concurrent table. Any number of consumers read the table through a
//! [`CacheReader`] without touching a sensor.
//!
//! ## Key Components
//!
//! - [`sensor`] - Sensor capability trait, factory seam and replay backend
//! - [`phase`] - Phase derivation and transition side effects
//! - [`parse`] - Parsers for score, player count and money text
//! - [`state`] - Snapshot and statistics types
//!
//! Each worker is re-sampled no sooner than the interval configured for its
//! current phase. Between passes the loop sleeps one short slice, and it polls
//! the shutdown signal once per pass.

pub mod parse;
pub mod phase;
pub mod sensor;
pub mod state;

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use crate::config::CacheConfig;
use crate::constants::{GamePhase, RegionKind};
use crate::error::{Result, RoundwatchError};

use self::parse::{parse_count, parse_money};
use self::phase::{derive_phase, transition_effects};
use self::sensor::{SensorFactory, WorkerSensors};

pub use self::state::{CacheStats, GameState};

type StateTable = DashMap<String, GameState>;

/// How a call to [`SharedStateCache::stop`] ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// The loop observed the shutdown signal and exited
    Graceful,
    /// The loop missed the join timeout and was aborted
    Forced,
    NotRunning,
}

/// Cheap, cloneable read handle over the published snapshots
#[derive(Debug, Clone)]
pub struct CacheReader {
    table: Arc<StateTable>,
    stats: Arc<Mutex<CacheStats>>,
}

impl CacheReader {
    /// Copy of one worker's latest snapshot
    pub fn get_state(&self, worker: &str) -> Option<GameState> {
        self.table.get(worker).map(|entry| entry.value().clone())
    }

    /// Copies of every worker's latest snapshot
    pub fn get_all_states(&self) -> HashMap<String, GameState> {
        self.table
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    pub fn get_stats(&self) -> CacheStats {
        self.stats.lock().clone()
    }
}

/// Sampling state private to the loop for one worker
#[derive(Debug)]
struct WorkerSampler {
    sensors: WorkerSensors,
    last_read: Option<Instant>,
    phase: GamePhase,
}

impl WorkerSampler {
    fn is_due(&self, now: Instant, config: &CacheConfig) -> bool {
        match self.last_read {
            None => true,
            Some(at) => {
                now.saturating_duration_since(at) >= config.phase_intervals.interval_for(self.phase)
            }
        }
    }

    /// Take one sample and publish the resulting snapshot
    async fn sample(&mut self, table: &StateTable, config: &CacheConfig) -> anyhow::Result<()> {
        let worker = self.sensors.worker().to_string();
        let now = Instant::now();
        self.last_read = Some(now);

        let previous = table
            .get(&worker)
            .map(|entry| entry.value().clone())
            .unwrap_or_else(|| GameState::new(&worker, now));

        let region = RegionKind::score_region_for(previous.score);
        let score = self.sensors.read_score(region).await?;

        let loading_marker = previous.loading_start_time.is_some()
            || (score.is_none()
                && !previous.phase.is_scoring()
                && self.loading_screen_visible(config).await);

        let phase = derive_phase(previous.phase, score, loading_marker);
        let effects = transition_effects(previous.phase, phase);

        let mut next = previous.clone();
        next.timestamp = now;
        next.last_score = previous.score;
        next.score = score;
        next.phase = phase;
        next.same_score_count = match (previous.score, score) {
            (Some(before), Some(after)) if before == after => previous.same_score_count + 1,
            _ => 0,
        };

        if effects.record_loading_duration {
            if let Some(started) = previous.loading_start_time {
                next.loading_duration_ms =
                    Some(now.saturating_duration_since(started).as_millis() as u64);
            }
        }
        if effects.stamp_loading_start {
            next.loading_start_time = Some(now);
        }
        if effects.stamp_round_start {
            next.round_start_time = Some(now);
        }
        if effects.clear_loading_marker {
            next.loading_start_time = None;
        }
        if effects.capture_round_totals {
            self.capture_round_totals(&mut next).await;
        }

        if phase != previous.phase {
            debug!(
                worker = %worker,
                from = %previous.phase,
                to = %phase,
                score = ?score,
                "CACHE: Phase transition"
            );
        }

        self.phase = phase;
        table.insert(worker, next);
        Ok(())
    }

    /// The loading banner spans the widest score region
    async fn loading_screen_visible(&mut self, config: &CacheConfig) -> bool {
        if config.loading_markers.is_empty() {
            return false;
        }
        match self.sensors.read_text(RegionKind::ScoreLarge).await {
            Ok(Some(text)) => {
                let text = text.to_lowercase();
                config
                    .loading_markers
                    .iter()
                    .any(|marker| text.contains(&marker.to_lowercase()))
            }
            Ok(None) => false,
            Err(e) => {
                debug!(worker = %self.sensors.worker(), error = %e, "CACHE: Loading banner read failed");
                false
            }
        }
    }

    /// Read player count and money once per round end. Failures keep prior values.
    async fn capture_round_totals(&mut self, state: &mut GameState) {
        match self.sensors.read_text(RegionKind::Count).await {
            Ok(Some(text)) => match parse_count(&text) {
                Some((left, total)) => {
                    state.players_left = Some(left);
                    state.total_players = Some(total);
                }
                None => debug!(worker = %state.worker, text = %text, "CACHE: Unparseable player count"),
            },
            Ok(None) => {}
            Err(e) => debug!(worker = %state.worker, error = %e, "CACHE: Player count read failed"),
        }

        match self.sensors.read_text(RegionKind::Money).await {
            Ok(Some(text)) => match parse_money(&text) {
                Some(money) => state.total_money = Some(money),
                None => debug!(worker = %state.worker, text = %text, "CACHE: Unparseable money total"),
            },
            Ok(None) => {}
            Err(e) => debug!(worker = %state.worker, error = %e, "CACHE: Money read failed"),
        }
    }
}

/// Single-writer, many-reader cache of sensed game state
#[derive(Debug)]
pub struct SharedStateCache {
    config: CacheConfig,
    worker_names: Vec<String>,
    reader: CacheReader,
    /// Present while stopped; moved into the loop while running
    samplers: Option<Vec<WorkerSampler>>,
    shutdown_tx: watch::Sender<bool>,
    task: Option<JoinHandle<Vec<WorkerSampler>>>,
}

impl SharedStateCache {
    /// Build the cache and every sensor it will own.
    ///
    /// The factory is called once per (worker, region) pair.
    pub fn new<I, S>(worker_names: I, config: CacheConfig, factory: &dyn SensorFactory) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let worker_names: Vec<String> = worker_names
            .into_iter()
            .map(|name| name.as_ref().to_string())
            .collect();

        let now = Instant::now();
        let table = StateTable::new();
        let mut samplers = Vec::with_capacity(worker_names.len());
        for name in &worker_names {
            samplers.push(WorkerSampler {
                sensors: WorkerSensors::build(name, factory)?,
                last_read: None,
                phase: GamePhase::Unknown,
            });
            table.insert(name.clone(), GameState::new(name, now));
        }

        info!(
            "🗄️ CACHE: Created shared state cache for {} workers (slice: {:?})",
            worker_names.len(),
            config.loop_slice()
        );

        let (shutdown_tx, _) = watch::channel(false);
        Ok(Self {
            config,
            worker_names,
            reader: CacheReader {
                table: Arc::new(table),
                stats: Arc::new(Mutex::new(CacheStats::default())),
            },
            samplers: Some(samplers),
            shutdown_tx,
            task: None,
        })
    }

    pub fn worker_names(&self) -> &[String] {
        &self.worker_names
    }

    pub fn reader(&self) -> CacheReader {
        self.reader.clone()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Spawn the sampling loop on the current Tokio runtime
    #[instrument(skip(self), fields(workers = self.worker_names.len()))]
    pub fn start(&mut self) -> Result<()> {
        if self.is_running() {
            return Err(RoundwatchError::InvalidState(
                "Shared state cache is already running".to_string(),
            ));
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            RoundwatchError::InvalidState(format!("Shared state cache needs a Tokio runtime: {e}"))
        })?;
        let samplers = self.samplers.take().ok_or_else(|| {
            RoundwatchError::InvalidState(
                "Sensors were lost when the sampling loop was aborted; rebuild the cache".to_string(),
            )
        })?;

        self.shutdown_tx.send_replace(false);
        {
            let mut stats = self.reader.stats.lock();
            stats.running = true;
            stats.started_at = Some(Utc::now());
        }

        let sampling_loop = SamplingLoop {
            samplers,
            table: self.reader.table.clone(),
            stats: self.reader.stats.clone(),
            config: self.config.clone(),
            shutdown: self.shutdown_tx.subscribe(),
        };
        self.task = Some(runtime.spawn(sampling_loop.run()));

        info!("🚀 CACHE: Sampling loop started");
        Ok(())
    }

    /// Signal the loop to stop and wait up to `timeout` for it to exit.
    ///
    /// A loop that does not exit in time is aborted, and its sensors are
    /// dropped with it.
    #[instrument(skip(self))]
    pub async fn stop(&mut self, timeout: Duration) -> Result<ShutdownOutcome> {
        let Some(mut task) = self.task.take() else {
            return Ok(ShutdownOutcome::NotRunning);
        };

        self.shutdown_tx.send_replace(true);

        let outcome = match tokio::time::timeout(timeout, &mut task).await {
            Ok(Ok(samplers)) => {
                self.samplers = Some(samplers);
                info!("🛑 CACHE: Sampling loop stopped");
                Ok(ShutdownOutcome::Graceful)
            }
            Ok(Err(join_error)) => {
                error!(error = %join_error, "CACHE: Sampling loop terminated abnormally");
                Err(RoundwatchError::CacheError(format!(
                    "sampling loop terminated abnormally: {join_error}"
                )))
            }
            Err(_) => {
                warn!(timeout = ?timeout, "⚠️ CACHE: Sampling loop missed join timeout, aborting");
                task.abort();
                Ok(ShutdownOutcome::Forced)
            }
        };

        self.reader.stats.lock().running = false;
        outcome
    }

    /// [`stop`](Self::stop) with the configured `stop_timeout_ms`.
    pub async fn stop_default(&mut self) -> Result<ShutdownOutcome> {
        let timeout = self.config.stop_timeout();
        self.stop(timeout).await
    }

    pub fn get_state(&self, worker: &str) -> Option<GameState> {
        self.reader.get_state(worker)
    }

    pub fn get_all_states(&self) -> HashMap<String, GameState> {
        self.reader.get_all_states()
    }

    pub fn get_stats(&self) -> CacheStats {
        self.reader.get_stats()
    }
}

impl Drop for SharedStateCache {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            self.shutdown_tx.send_replace(true);
            task.abort();
        }
    }
}

/// Everything the spawned loop owns
struct SamplingLoop {
    samplers: Vec<WorkerSampler>,
    table: Arc<StateTable>,
    stats: Arc<Mutex<CacheStats>>,
    config: CacheConfig,
    shutdown: watch::Receiver<bool>,
}

impl SamplingLoop {
    async fn run(mut self) -> Vec<WorkerSampler> {
        loop {
            if *self.shutdown.borrow() {
                break;
            }

            let pass = AssertUnwindSafe(self.pass()).catch_unwind().await;
            let pause = match pass {
                Ok(()) => self.config.loop_slice(),
                Err(_) => {
                    error!("🚨 CACHE: Sampling pass panicked, backing off");
                    self.stats.lock().record_failure();
                    self.config.error_backoff()
                }
            };

            tokio::select! {
                _ = tokio::time::sleep(pause) => {}
                changed = self.shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!("CACHE: Sampling loop exiting");
        self.samplers
    }

    async fn pass(&mut self) {
        let now = Instant::now();
        for sampler in self.samplers.iter_mut() {
            if !sampler.is_due(now, &self.config) {
                continue;
            }

            let started = Instant::now();
            match sampler.sample(&self.table, &self.config).await {
                Ok(()) => self.stats.lock().record_success(started.elapsed()),
                Err(e) => {
                    self.stats.lock().record_failure();
                    warn!(
                        worker = %sampler.sensors.worker(),
                        error = %e,
                        "CACHE: Sample failed"
                    );
                }
            }
        }
    }
}
