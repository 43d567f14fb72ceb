//! # Control Plane
//!
//! Worker processes never touch the health monitor or coordinator directly;
//! they push [`ControlMessage`]s into a bounded channel and the control plane
//! applies them in arrival order. The supervisor polls with
//! [`ControlPlane::tick`] and decides what to respawn.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::{mpsc, Notify};
use tracing::{debug, info};

use crate::cache::GameState;
use crate::config::{CoordinatorConfig, HealthConfig, OrchestrationConfig};
use crate::constants::WorkerStatus;

use super::coordinator::{Coordinator, RoundReport};
use super::health::{HealthMonitor, HeartbeatMetrics};

/// Default capacity of the worker-to-control channel
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Messages pushed by worker processes
#[derive(Debug, Clone, PartialEq)]
pub enum ControlMessage {
    Heartbeat {
        worker: String,
        metrics: HeartbeatMetrics,
    },
    RoundUpdate {
        worker: String,
        report: RoundReport,
    },
    Liveness {
        worker: String,
        alive: bool,
    },
}

impl ControlMessage {
    pub fn worker(&self) -> &str {
        match self {
            ControlMessage::Heartbeat { worker, .. }
            | ControlMessage::RoundUpdate { worker, .. }
            | ControlMessage::Liveness { worker, .. } => worker,
        }
    }

    /// Round update derived from a cache snapshot.
    ///
    /// An absent score leaves the coordinator's last score untouched.
    pub fn from_snapshot(state: &GameState) -> Self {
        ControlMessage::RoundUpdate {
            worker: state.worker.clone(),
            report: RoundReport {
                round_state: Some(state.round_state()),
                phase: Some(state.phase),
                score: state.score,
            },
        }
    }
}

/// Result of one supervisory poll
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupervisionReport {
    pub statuses: BTreeMap<String, WorkerStatus>,
    pub unhealthy: Vec<String>,
    /// Workers the supervisor may respawn now
    pub recovery_candidates: Vec<String>,
    pub synchronized: bool,
    pub force_sync: bool,
    pub alignment: BTreeMap<String, bool>,
}

/// Owns the health monitor and coordinator for one control process
#[derive(Debug, Clone)]
pub struct ControlPlane {
    health: Arc<RwLock<HealthMonitor>>,
    coordinator: Arc<RwLock<Coordinator>>,
    /// Weak so that [`run`](Self::run) ends once every worker sender is gone
    sender: mpsc::WeakSender<ControlMessage>,
    shutdown: Arc<Notify>,
}

/// Handles returned alongside a new [`ControlPlane`]
pub type ControlChannel = (mpsc::Sender<ControlMessage>, mpsc::Receiver<ControlMessage>);

impl ControlPlane {
    pub fn new<I, S>(
        workers: I,
        health_config: HealthConfig,
        coordinator_config: CoordinatorConfig,
        channel_capacity: usize,
    ) -> (Self, ControlChannel)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let (sender, receiver) = mpsc::channel(channel_capacity.max(1));
        let plane = Self {
            health: Arc::new(RwLock::new(HealthMonitor::new(health_config))),
            coordinator: Arc::new(RwLock::new(Coordinator::new(workers, coordinator_config))),
            sender: sender.downgrade(),
            shutdown: Arc::new(Notify::new()),
        };
        (plane, (sender, receiver))
    }

    pub fn from_config(config: &OrchestrationConfig) -> (Self, ControlChannel) {
        Self::new(
            &config.workers,
            config.health.clone(),
            config.coordinator.clone(),
            DEFAULT_CHANNEL_CAPACITY,
        )
    }

    /// Another sender for a worker process, while any sender is still alive.
    ///
    /// Returns `None` once every sender has been dropped and the channel is closed.
    pub fn sender(&self) -> Option<mpsc::Sender<ControlMessage>> {
        self.sender.upgrade()
    }

    pub fn apply(&self, message: ControlMessage) {
        match message {
            ControlMessage::Heartbeat { worker, metrics } => {
                self.health.write().update_heartbeat(&worker, metrics);
            }
            ControlMessage::RoundUpdate { worker, report } => {
                self.coordinator.write().update_worker_state(&worker, report);
            }
            ControlMessage::Liveness { worker, alive } => {
                self.coordinator.write().mark_worker_alive(&worker, alive);
            }
        }
    }

    /// Apply messages until every sender is dropped or [`shutdown`](Self::shutdown) is called.
    ///
    /// Returns the number of messages applied.
    pub async fn run(&self, mut inbox: mpsc::Receiver<ControlMessage>) -> u64 {
        info!("📬 CONTROL: Message loop started");
        let mut applied = 0u64;

        loop {
            tokio::select! {
                message = inbox.recv() => match message {
                    Some(message) => {
                        debug!(worker = message.worker(), "CONTROL: Applying message");
                        self.apply(message);
                        applied += 1;
                    }
                    None => {
                        info!("CONTROL: All senders closed");
                        break;
                    }
                },
                _ = self.shutdown.notified() => {
                    info!("CONTROL: Shutdown requested");
                    break;
                }
            }
        }

        info!(applied, "CONTROL: Message loop stopped");
        applied
    }

    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }

    /// One supervisory poll.
    ///
    /// Runs the health check (advancing failure counters), propagates dead
    /// processes to the coordinator's liveness flags, and evaluates
    /// synchronization. Recovery is only proposed, never executed.
    pub fn tick(&self) -> SupervisionReport {
        let (statuses, unhealthy, recovery_candidates) = {
            let mut health = self.health.write();
            let statuses: BTreeMap<String, WorkerStatus> = health.check_health().into_iter().collect();
            let unhealthy = health.get_unhealthy_workers();
            let candidates = statuses
                .keys()
                .filter(|name| health.should_recover_worker(name))
                .cloned()
                .collect::<Vec<_>>();
            (statuses, unhealthy, candidates)
        };

        let mut coordinator = self.coordinator.write();
        for (name, status) in &statuses {
            if coordinator.worker_state(name).is_some() {
                coordinator.mark_worker_alive(name, *status != WorkerStatus::Dead);
            }
        }

        let synchronized = coordinator.check_synchronization();
        let force_sync = coordinator.should_force_sync();
        let alignment = coordinator.get_round_alignment();

        SupervisionReport {
            statuses,
            unhealthy,
            recovery_candidates,
            synchronized,
            force_sync,
            alignment,
        }
    }

    /// Combined health and coordinator statistics for dashboards
    pub fn status_report(&self) -> serde_json::Value {
        let health = self.health.read().get_stats();
        let coordinator = self.coordinator.read().get_stats();
        serde_json::json!({
            "health": health,
            "coordinator": coordinator,
        })
    }

    pub fn with_health<R>(&self, f: impl FnOnce(&mut HealthMonitor) -> R) -> R {
        f(&mut self.health.write())
    }

    pub fn with_coordinator<R>(&self, f: impl FnOnce(&mut Coordinator) -> R) -> R {
        f(&mut self.coordinator.write())
    }
}
