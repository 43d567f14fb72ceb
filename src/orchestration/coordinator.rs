//! # Round Coordinator
//!
//! Tracks the round state reported by each worker and measures how well the
//! workers agree with each other. The worker set is fixed at construction;
//! state only changes through explicit calls.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::CoordinatorConfig;
use crate::constants::{GamePhase, RoundState};

/// Round-sync view of one worker
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerState {
    pub name: String,
    pub round_state: RoundState,
    pub phase: GamePhase,
    pub score: f64,
    pub round_start_time: Option<Instant>,
    pub round_end_time: Option<Instant>,
    pub last_update: Instant,
    pub is_alive: bool,
}

impl WorkerState {
    fn new(name: &str, now: Instant) -> Self {
        Self {
            name: name.to_string(),
            round_state: RoundState::Waiting,
            phase: GamePhase::Unknown,
            score: 0.0,
            round_start_time: None,
            round_end_time: None,
            last_update: now,
            is_alive: true,
        }
    }

    pub fn is_stale(&self, now: Instant, threshold: Duration) -> bool {
        now.saturating_duration_since(self.last_update) > threshold
    }
}

/// Partial state update pushed by a worker; absent fields are left unchanged
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RoundReport {
    pub round_state: Option<RoundState>,
    pub phase: Option<GamePhase>,
    pub score: Option<f64>,
}

/// Serializable projection of a worker's round state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerStateView {
    pub name: String,
    pub round_state: RoundState,
    pub phase: GamePhase,
    pub score: f64,
    pub is_alive: bool,
    pub stale: bool,
    pub seconds_since_update: f64,
    pub round_elapsed_seconds: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoordinatorStats {
    pub total_workers: usize,
    pub active_workers: Vec<String>,
    pub total_rounds: u64,
    pub synchronized_rounds: u64,
    pub desync_events: u64,
    pub sync_quality: f64,
    pub workers: Vec<WorkerStateView>,
}

/// Median of the given values; the mean of the two middle values for even counts
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

#[derive(Debug)]
pub struct Coordinator {
    config: CoordinatorConfig,
    workers: BTreeMap<String, WorkerState>,
    total_rounds: u64,
    synchronized_rounds: u64,
    desync_events: u64,
}

impl Coordinator {
    pub fn new<I, S>(worker_names: I, config: CoordinatorConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let now = Instant::now();
        let workers: BTreeMap<String, WorkerState> = worker_names
            .into_iter()
            .map(|name| {
                let name = name.as_ref();
                (name.to_string(), WorkerState::new(name, now))
            })
            .collect();

        info!(
            "🏗️ COORDINATOR: Tracking {} workers (sync tolerance: {:?}, stale after: {:?})",
            workers.len(),
            config.sync_tolerance(),
            config.stale_threshold()
        );

        Self {
            config,
            workers,
            total_rounds: 0,
            synchronized_rounds: 0,
            desync_events: 0,
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn worker_state(&self, name: &str) -> Option<&WorkerState> {
        self.workers.get(name)
    }

    pub fn update_worker_state(&mut self, name: &str, report: RoundReport) {
        let Some(worker) = self.workers.get_mut(name) else {
            warn!(worker = name, "COORDINATOR: State update from unknown worker ignored");
            return;
        };
        let now = Instant::now();

        if let Some(round_state) = report.round_state {
            let previous = worker.round_state;
            if round_state == RoundState::Active && previous != RoundState::Active {
                worker.round_start_time = Some(now);
                debug!(worker = name, "COORDINATOR: Round started");
            }
            if round_state == RoundState::Ended && previous != RoundState::Ended {
                worker.round_end_time = Some(now);
                self.total_rounds += 1;
                debug!(worker = name, score = worker.score, "COORDINATOR: Round ended");
            }
            worker.round_state = round_state;
        }
        if let Some(phase) = report.phase {
            worker.phase = phase;
        }
        if let Some(score) = report.score {
            worker.score = score;
        }
        worker.last_update = now;
    }

    /// Set the liveness flag. Staleness is tracked separately.
    pub fn mark_worker_alive(&mut self, name: &str, alive: bool) {
        match self.workers.get_mut(name) {
            Some(worker) => {
                if worker.is_alive != alive {
                    info!(worker = name, alive, "COORDINATOR: Worker liveness changed");
                }
                worker.is_alive = alive;
            }
            None => warn!(worker = name, "COORDINATOR: Liveness update for unknown worker ignored"),
        }
    }

    fn active_states(&self, now: Instant) -> impl Iterator<Item = &WorkerState> {
        let threshold = self.config.stale_threshold();
        self.workers
            .values()
            .filter(move |w| w.is_alive && !w.is_stale(now, threshold))
    }

    /// Whether the active workers agree on round state within tolerance.
    ///
    /// Disagreement whose update spread exceeds the tolerance counts as a
    /// desync event.
    pub fn check_synchronization(&mut self) -> bool {
        let now = Instant::now();
        let active: Vec<&WorkerState> = self.active_states(now).collect();

        if active.len() < 2 {
            return true;
        }

        let first = active[0].round_state;
        if active.iter().all(|w| w.round_state == first) {
            return true;
        }

        let newest = active.iter().map(|w| w.last_update).max();
        let oldest = active.iter().map(|w| w.last_update).min();
        let spread = match (newest, oldest) {
            (Some(newest), Some(oldest)) => newest.saturating_duration_since(oldest),
            _ => Duration::ZERO,
        };

        if spread > self.config.sync_tolerance() {
            let states: Vec<String> = active
                .iter()
                .map(|w| format!("{}={}", w.name, w.round_state))
                .collect();
            self.desync_events += 1;
            warn!(
                spread = ?spread,
                states = %states.join(", "),
                desync_events = self.desync_events,
                "🚨 COORDINATOR: Workers out of sync"
            );
            return false;
        }

        true
    }

    /// Per-worker alignment against the median score of the live field
    pub fn get_round_alignment(&self) -> BTreeMap<String, bool> {
        let now = Instant::now();
        let threshold = self.config.stale_threshold();

        let scores: Vec<f64> = self
            .active_states(now)
            .filter(|w| w.score > 0.0)
            .map(|w| w.score)
            .collect();
        let reference = median(&scores).unwrap_or(0.0);

        self.workers
            .values()
            .map(|w| {
                let aligned = w.is_alive
                    && !w.is_stale(now, threshold)
                    && (w.score - reference).abs() < self.config.alignment_tolerance;
                (w.name.clone(), aligned)
            })
            .collect()
    }

    /// True when a round has run past the timeout or most workers have gone stale
    pub fn should_force_sync(&self) -> bool {
        let now = Instant::now();
        let timeout = self.config.round_timeout();

        if let Some(worker) = self.workers.values().find(|w| {
            matches!(w.round_state, RoundState::Active | RoundState::Ending)
                && w.round_start_time
                    .is_some_and(|start| now.saturating_duration_since(start) > timeout)
        }) {
            warn!(
                worker = %worker.name,
                timeout = ?timeout,
                "COORDINATOR: Round exceeded timeout, forcing sync"
            );
            return true;
        }

        let threshold = self.config.stale_threshold();
        let stale = self
            .workers
            .values()
            .filter(|w| w.is_stale(now, threshold))
            .count();
        if stale * 2 > self.workers.len() {
            warn!(
                stale,
                total = self.workers.len(),
                "COORDINATOR: Majority of workers stale, forcing sync"
            );
            return true;
        }

        false
    }

    pub fn reset_round_states(&mut self) {
        for worker in self.workers.values_mut() {
            worker.round_state = RoundState::Waiting;
            worker.score = 0.0;
            worker.round_start_time = None;
            worker.round_end_time = None;
        }
        self.synchronized_rounds += 1;
        info!(
            synchronized_rounds = self.synchronized_rounds,
            "🔄 COORDINATOR: Round states reset"
        );
    }

    pub fn get_active_workers(&self) -> Vec<String> {
        self.active_states(Instant::now())
            .map(|w| w.name.clone())
            .collect()
    }

    pub fn get_sync_quality(&self) -> f64 {
        if self.total_rounds == 0 {
            return 1.0;
        }
        (1.0 - self.desync_events as f64 / self.total_rounds as f64).max(0.0)
    }

    pub fn get_stats(&self) -> CoordinatorStats {
        let now = Instant::now();
        let threshold = self.config.stale_threshold();

        let workers = self
            .workers
            .values()
            .map(|w| WorkerStateView {
                name: w.name.clone(),
                round_state: w.round_state,
                phase: w.phase,
                score: w.score,
                is_alive: w.is_alive,
                stale: w.is_stale(now, threshold),
                seconds_since_update: now.saturating_duration_since(w.last_update).as_secs_f64(),
                round_elapsed_seconds: w
                    .round_start_time
                    .map(|start| now.saturating_duration_since(start).as_secs_f64()),
            })
            .collect();

        CoordinatorStats {
            total_workers: self.workers.len(),
            active_workers: self.get_active_workers(),
            total_rounds: self.total_rounds,
            synchronized_rounds: self.synchronized_rounds,
            desync_events: self.desync_events,
            sync_quality: self.get_sync_quality(),
            workers,
        }
    }
}
