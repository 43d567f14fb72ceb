//! # Worker Health Monitoring
//!
//! Tracks liveness, heartbeat age and cycle performance for every registered
//! worker, and decides when a worker should be recovered. Recovery itself is
//! executed by the supervisor; this module only records attempts and outcomes.
//!
//! [`HealthMonitor::check_health`] is a poll-and-update operation: every call
//! that finds a worker past its heartbeat timeout advances that worker's
//! failure counters.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::config::HealthConfig;
use crate::constants::WorkerStatus;

use super::process::ProcessHandle;

/// Metrics a worker reports alongside its heartbeat
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HeartbeatMetrics {
    /// Duration of the worker's last processing cycle
    pub cycle_time: Option<Duration>,
    pub cpu_percent: Option<f64>,
    pub memory_mb: Option<f64>,
}

impl HeartbeatMetrics {
    pub fn with_cycle_time(cycle_time: Duration) -> Self {
        Self {
            cycle_time: Some(cycle_time),
            ..Self::default()
        }
    }
}

/// Health record for one worker
#[derive(Debug, Clone)]
pub struct WorkerHealth {
    pub name: String,
    pub process: Arc<dyn ProcessHandle>,
    pub status: WorkerStatus,
    pub last_heartbeat: Option<Instant>,
    pub consecutive_failures: u32,
    pub total_failures: u32,
    pub recovery_attempts: u32,
    /// Exponential moving average of cycle time, in seconds
    pub avg_cycle_time: Option<f64>,
    /// Most recent cycle time, in seconds
    pub last_cycle_time: Option<f64>,
    pub cycles_completed: u64,
    pub cpu_percent: f64,
    pub memory_mb: f64,
    pub start_time: Instant,
    pub last_recovery: Option<Instant>,
}

impl WorkerHealth {
    fn new(name: &str, process: Arc<dyn ProcessHandle>, now: Instant) -> Self {
        Self {
            name: name.to_string(),
            process,
            status: WorkerStatus::Healthy,
            last_heartbeat: None,
            consecutive_failures: 0,
            total_failures: 0,
            recovery_attempts: 0,
            avg_cycle_time: None,
            last_cycle_time: None,
            cycles_completed: 0,
            cpu_percent: 0.0,
            memory_mb: 0.0,
            start_time: now,
            last_recovery: None,
        }
    }

    /// Time since the last heartbeat, or since start when none has arrived
    pub fn heartbeat_age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_heartbeat.unwrap_or(self.start_time))
    }

    fn within_cooldown(&self, now: Instant, cooldown: Duration) -> bool {
        self.last_recovery
            .is_some_and(|at| now.saturating_duration_since(at) < cooldown)
    }
}

/// Aggregate health counts and recovery outcomes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthStats {
    pub total_workers: usize,
    pub healthy: usize,
    pub warning: usize,
    pub critical: usize,
    pub dead: usize,
    pub recovering: usize,
    pub total_recoveries: u64,
    pub failed_recoveries: u64,
    pub recovery_success_rate: f64,
    pub generated_at: DateTime<Utc>,
}

/// Point-in-time view of one worker's health record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerDetails {
    pub name: String,
    pub pid: Option<u32>,
    pub status: WorkerStatus,
    pub alive: bool,
    pub heartbeat_age_seconds: Option<f64>,
    pub consecutive_failures: u32,
    pub total_failures: u32,
    pub recovery_attempts: u32,
    pub avg_cycle_time_seconds: Option<f64>,
    pub last_cycle_time_seconds: Option<f64>,
    pub cycles_completed: u64,
    pub cpu_percent: f64,
    pub memory_mb: f64,
    pub uptime_seconds: f64,
    pub seconds_since_last_recovery: Option<f64>,
}

/// Health monitor for the worker set of one control process
#[derive(Debug)]
pub struct HealthMonitor {
    config: HealthConfig,
    workers: HashMap<String, WorkerHealth>,
    total_recoveries: u64,
    failed_recoveries: u64,
}

impl HealthMonitor {
    pub fn new(config: HealthConfig) -> Self {
        info!(
            "🏥 HEALTH: Creating health monitor (timeout: {:?}, warning: {:?}, max recoveries: {})",
            config.heartbeat_timeout(),
            config.warning_threshold(),
            config.max_recovery_attempts
        );

        Self {
            config,
            workers: HashMap::new(),
            total_recoveries: 0,
            failed_recoveries: 0,
        }
    }

    pub fn config(&self) -> &HealthConfig {
        &self.config
    }

    /// Start tracking a worker. Re-registering replaces the previous record.
    pub fn register_worker(&mut self, name: &str, process: Arc<dyn ProcessHandle>) {
        let record = WorkerHealth::new(name, process, Instant::now());
        if self.workers.insert(name.to_string(), record).is_some() {
            info!(worker = name, "HEALTH: Worker re-registered, previous record replaced");
        } else {
            info!(worker = name, "HEALTH: Worker registered");
        }
    }

    /// Stop tracking a worker, handing its process back to the caller
    pub fn unregister_worker(&mut self, name: &str) -> Option<Arc<dyn ProcessHandle>> {
        match self.workers.remove(name) {
            Some(record) => {
                info!(worker = name, "HEALTH: Worker unregistered");
                Some(record.process)
            }
            None => {
                warn!(worker = name, "HEALTH: Unregister requested for unknown worker");
                None
            }
        }
    }

    pub fn update_heartbeat(&mut self, name: &str, metrics: HeartbeatMetrics) {
        let Some(worker) = self.workers.get_mut(name) else {
            warn!(worker = name, "HEALTH: Heartbeat from unknown worker ignored");
            return;
        };

        worker.last_heartbeat = Some(Instant::now());
        worker.cycles_completed += 1;

        if let Some(cycle_time) = metrics.cycle_time {
            let sample = cycle_time.as_secs_f64();
            let weight = self.config.cycle_time_smoothing;
            worker.avg_cycle_time = Some(match worker.avg_cycle_time {
                None => sample,
                Some(avg) => avg * (1.0 - weight) + sample * weight,
            });
            worker.last_cycle_time = Some(sample);
        }
        if let Some(cpu) = metrics.cpu_percent {
            worker.cpu_percent = cpu;
        }
        if let Some(memory) = metrics.memory_mb {
            worker.memory_mb = memory;
        }

        if worker.consecutive_failures > 0 {
            info!(
                worker = name,
                failures = worker.consecutive_failures,
                "✅ HEALTH: Worker heartbeat resumed"
            );
            worker.consecutive_failures = 0;
        }
    }

    /// Re-evaluate every worker's status and return the new statuses.
    ///
    /// Workers past their heartbeat timeout have their failure counters
    /// incremented on every call.
    pub fn check_health(&mut self) -> HashMap<String, WorkerStatus> {
        let now = Instant::now();
        let mut statuses = HashMap::with_capacity(self.workers.len());

        for (name, worker) in self.workers.iter_mut() {
            let previous = worker.status;
            let status = Self::evaluate(&self.config, worker, now);
            worker.status = status;

            if status != previous {
                match status {
                    WorkerStatus::Critical | WorkerStatus::Dead => error!(
                        worker = %name,
                        from = %previous,
                        to = %status,
                        consecutive_failures = worker.consecutive_failures,
                        "🚨 HEALTH: Worker became unhealthy"
                    ),
                    WorkerStatus::Warning => warn!(
                        worker = %name,
                        from = %previous,
                        heartbeat_age = ?worker.heartbeat_age(now),
                        "⚠️ HEALTH: Worker degraded"
                    ),
                    WorkerStatus::Healthy | WorkerStatus::Recovering => info!(
                        worker = %name,
                        from = %previous,
                        to = %status,
                        "HEALTH: Worker status changed"
                    ),
                }
            }

            statuses.insert(name.clone(), status);
        }

        statuses
    }

    fn evaluate(config: &HealthConfig, worker: &mut WorkerHealth, now: Instant) -> WorkerStatus {
        if !worker.process.is_alive() {
            return WorkerStatus::Dead;
        }

        if worker.status == WorkerStatus::Recovering
            && worker.within_cooldown(now, config.recovery_cooldown())
        {
            return WorkerStatus::Recovering;
        }

        let age = worker.heartbeat_age(now);

        // Startup grace: silence only counts once it reaches the timeout
        if worker.last_heartbeat.is_none() && age < config.heartbeat_timeout() {
            return WorkerStatus::Healthy;
        }

        if age >= config.heartbeat_timeout() {
            worker.consecutive_failures += 1;
            worker.total_failures += 1;
            WorkerStatus::Critical
        } else if age >= config.warning_threshold() || worker.consecutive_failures > 0 {
            WorkerStatus::Warning
        } else {
            WorkerStatus::Healthy
        }
    }

    /// Workers whose last evaluated status is Critical or Dead
    pub fn get_unhealthy_workers(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .workers
            .values()
            .filter(|w| w.status.is_unhealthy())
            .map(|w| w.name.clone())
            .collect();
        names.sort();
        names
    }

    pub fn should_recover_worker(&self, name: &str) -> bool {
        let Some(worker) = self.workers.get(name) else {
            return false;
        };

        if worker.status == WorkerStatus::Recovering {
            return false;
        }
        if worker.recovery_attempts >= self.config.max_recovery_attempts {
            debug!(
                worker = name,
                attempts = worker.recovery_attempts,
                "HEALTH: Recovery attempts exhausted"
            );
            return false;
        }
        if worker.within_cooldown(Instant::now(), self.config.recovery_cooldown()) {
            return false;
        }

        worker.status.is_unhealthy()
    }

    /// Record that the supervisor is recovering a worker.
    ///
    /// Returns false, without recording anything, for unknown workers or once
    /// the attempt cap is reached.
    pub fn mark_recovering(&mut self, name: &str) -> bool {
        let Some(worker) = self.workers.get_mut(name) else {
            warn!(worker = name, "HEALTH: Recovery requested for unknown worker");
            return false;
        };

        if worker.recovery_attempts >= self.config.max_recovery_attempts {
            warn!(
                worker = name,
                attempts = worker.recovery_attempts,
                "HEALTH: Recovery refused, attempt cap reached"
            );
            return false;
        }

        worker.status = WorkerStatus::Recovering;
        worker.recovery_attempts += 1;
        worker.last_recovery = Some(Instant::now());
        self.total_recoveries += 1;

        info!(
            worker = name,
            attempt = worker.recovery_attempts,
            max = self.config.max_recovery_attempts,
            "🔄 HEALTH: Worker recovery started"
        );
        true
    }

    pub fn mark_recovery_success(&mut self, name: &str, process: Arc<dyn ProcessHandle>) {
        let Some(worker) = self.workers.get_mut(name) else {
            warn!(worker = name, "HEALTH: Recovery success reported for unknown worker");
            return;
        };

        worker.process = process;
        worker.status = WorkerStatus::Healthy;
        worker.start_time = Instant::now();
        worker.last_heartbeat = None;
        worker.consecutive_failures = 0;

        info!(
            worker = name,
            pid = ?worker.process.pid(),
            "✅ HEALTH: Worker recovered"
        );
    }

    /// Count a failed recovery.
    ///
    /// The worker keeps its Recovering status until the cooldown elapses, after
    /// which `check_health` evaluates it normally again.
    pub fn mark_recovery_failure(&mut self, name: &str) {
        let Some(worker) = self.workers.get(name) else {
            warn!(worker = name, "HEALTH: Recovery failure reported for unknown worker");
            return;
        };
        let attempt = worker.recovery_attempts;
        self.failed_recoveries += 1;
        warn!(
            worker = name,
            attempt,
            failed_recoveries = self.failed_recoveries,
            "❌ HEALTH: Worker recovery failed"
        );
    }

    pub fn get_stats(&self) -> HealthStats {
        let count = |status: WorkerStatus| self.workers.values().filter(|w| w.status == status).count();

        let recovery_success_rate = if self.total_recoveries == 0 {
            1.0
        } else {
            self.total_recoveries.saturating_sub(self.failed_recoveries) as f64
                / self.total_recoveries as f64
        };

        HealthStats {
            total_workers: self.workers.len(),
            healthy: count(WorkerStatus::Healthy),
            warning: count(WorkerStatus::Warning),
            critical: count(WorkerStatus::Critical),
            dead: count(WorkerStatus::Dead),
            recovering: count(WorkerStatus::Recovering),
            total_recoveries: self.total_recoveries,
            failed_recoveries: self.failed_recoveries,
            recovery_success_rate,
            generated_at: Utc::now(),
        }
    }

    pub fn get_worker_details(&self, name: &str) -> Option<WorkerDetails> {
        let worker = self.workers.get(name)?;
        let now = Instant::now();

        Some(WorkerDetails {
            name: worker.name.clone(),
            pid: worker.process.pid(),
            status: worker.status,
            alive: worker.process.is_alive(),
            heartbeat_age_seconds: worker
                .last_heartbeat
                .map(|at| now.saturating_duration_since(at).as_secs_f64()),
            consecutive_failures: worker.consecutive_failures,
            total_failures: worker.total_failures,
            recovery_attempts: worker.recovery_attempts,
            avg_cycle_time_seconds: worker.avg_cycle_time,
            last_cycle_time_seconds: worker.last_cycle_time,
            cycles_completed: worker.cycles_completed,
            cpu_percent: worker.cpu_percent,
            memory_mb: worker.memory_mb,
            uptime_seconds: now.saturating_duration_since(worker.start_time).as_secs_f64(),
            seconds_since_last_recovery: worker
                .last_recovery
                .map(|at| now.saturating_duration_since(at).as_secs_f64()),
        })
    }

    /// Raw record access for supervisors and tests
    pub fn worker(&self, name: &str) -> Option<&WorkerHealth> {
        self.workers.get(name)
    }

    pub fn worker_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.workers.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::time::advance;

    #[derive(Debug)]
    struct FakeProcess {
        pid: u32,
        alive: AtomicBool,
    }

    impl FakeProcess {
        fn spawn(pid: u32) -> Arc<Self> {
            Arc::new(Self {
                pid,
                alive: AtomicBool::new(true),
            })
        }
    }

    impl ProcessHandle for FakeProcess {
        fn pid(&self) -> Option<u32> {
            Some(self.pid)
        }
        fn is_alive(&self) -> bool {
            self.alive.load(Ordering::SeqCst)
        }
        fn terminate(&self) {
            self.alive.store(false, Ordering::SeqCst);
        }
        fn join(&self, _timeout: Duration) -> bool {
            !self.is_alive()
        }
    }

    fn test_config() -> HealthConfig {
        HealthConfig {
            heartbeat_timeout_ms: 10_000,
            warning_threshold_ms: 5_000,
            max_recovery_attempts: 2,
            recovery_cooldown_ms: 3_000,
            cycle_time_smoothing: 0.1,
        }
    }

    fn monitor_with(names: &[&str]) -> (HealthMonitor, Vec<Arc<FakeProcess>>) {
        let mut monitor = HealthMonitor::new(test_config());
        let processes: Vec<_> = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let process = FakeProcess::spawn(1000 + i as u32);
                monitor.register_worker(name, process.clone());
                process
            })
            .collect();
        (monitor, processes)
    }

    #[tokio::test(start_paused = true)]
    async fn test_registration_starts_healthy() {
        let (monitor, _) = monitor_with(&["A"]);
        let record = monitor.worker("A").unwrap();
        assert_eq!(record.status, WorkerStatus::Healthy);
        assert!(record.last_heartbeat.is_none());
        assert_eq!(record.cycles_completed, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reregistration_overwrites_record() {
        let (mut monitor, _) = monitor_with(&["A"]);
        monitor.update_heartbeat("A", HeartbeatMetrics::default());
        monitor.register_worker("A", FakeProcess::spawn(77));

        let record = monitor.worker("A").unwrap();
        assert_eq!(record.cycles_completed, 0);
        assert_eq!(record.process.pid(), Some(77));
        assert_eq!(monitor.worker_names(), vec!["A".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_updates_metrics_and_ema() {
        let (mut monitor, _) = monitor_with(&["A"]);

        monitor.update_heartbeat(
            "A",
            HeartbeatMetrics {
                cycle_time: Some(Duration::from_millis(200)),
                cpu_percent: Some(12.5),
                memory_mb: Some(256.0),
            },
        );
        let record = monitor.worker("A").unwrap();
        assert_eq!(record.avg_cycle_time, Some(0.2));
        assert_eq!(record.cpu_percent, 12.5);
        assert_eq!(record.memory_mb, 256.0);

        monitor.update_heartbeat("A", HeartbeatMetrics::with_cycle_time(Duration::from_millis(400)));
        let record = monitor.worker("A").unwrap();
        let expected = 0.2 * 0.9 + 0.4 * 0.1;
        assert!((record.avg_cycle_time.unwrap() - expected).abs() < 1e-12);
        assert_eq!(record.last_cycle_time, Some(0.4));
        assert_eq!(record.cycles_completed, 2);
        // Absent metrics leave previous values in place
        assert_eq!(record.cpu_percent, 12.5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_for_unknown_worker_is_noop() {
        let (mut monitor, _) = monitor_with(&["A"]);
        monitor.update_heartbeat("ghost", HeartbeatMetrics::default());
        assert!(monitor.worker("ghost").is_none());
        assert_eq!(monitor.get_stats().total_workers, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovery_failure_for_unknown_worker_is_noop() {
        let (mut monitor, _) = monitor_with(&["A"]);
        assert!(monitor.mark_recovering("A"));
        monitor.mark_recovery_failure("ghost");

        let stats = monitor.get_stats();
        assert_eq!(stats.failed_recoveries, 0);
        assert_eq!(stats.recovery_success_rate, 1.0);
        assert_eq!(monitor.worker("A").unwrap().status, WorkerStatus::Recovering);
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_resets_consecutive_failures() {
        let (mut monitor, _) = monitor_with(&["A"]);
        advance(Duration::from_secs(11)).await;
        monitor.check_health();
        monitor.check_health();
        assert_eq!(monitor.worker("A").unwrap().consecutive_failures, 2);

        monitor.update_heartbeat("A", HeartbeatMetrics::default());
        let record = monitor.worker("A").unwrap();
        assert_eq!(record.consecutive_failures, 0);
        assert_eq!(record.total_failures, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_check_health_state_machine() {
        let (mut monitor, processes) = monitor_with(&["A", "B"]);
        monitor.update_heartbeat("A", HeartbeatMetrics::default());
        monitor.update_heartbeat("B", HeartbeatMetrics::default());

        let statuses = monitor.check_health();
        assert_eq!(statuses["A"], WorkerStatus::Healthy);

        advance(Duration::from_secs(5)).await;
        assert_eq!(monitor.check_health()["A"], WorkerStatus::Warning);

        advance(Duration::from_secs(5)).await;
        let statuses = monitor.check_health();
        assert_eq!(statuses["A"], WorkerStatus::Critical);
        assert_eq!(monitor.worker("A").unwrap().consecutive_failures, 1);

        // Polling again advances the counters
        monitor.check_health();
        assert_eq!(monitor.worker("A").unwrap().total_failures, 2);

        processes[1].terminate();
        assert_eq!(monitor.check_health()["B"], WorkerStatus::Dead);
        assert_eq!(monitor.get_unhealthy_workers(), vec!["A".to_string(), "B".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_heartbeat_after_failures_restores_healthy() {
        let (mut monitor, _) = monitor_with(&["A"]);
        advance(Duration::from_secs(10)).await;
        assert_eq!(monitor.check_health()["A"], WorkerStatus::Critical);

        monitor.update_heartbeat("A", HeartbeatMetrics::default());
        assert_eq!(monitor.check_health()["A"], WorkerStatus::Healthy);
    }

    #[tokio::test(start_paused = true)]
    async fn test_startup_grace_skips_warning() {
        let (mut monitor, _) = monitor_with(&["A"]);
        advance(Duration::from_secs(7)).await;
        assert_eq!(monitor.check_health()["A"], WorkerStatus::Healthy);
        advance(Duration::from_secs(3)).await;
        assert_eq!(monitor.check_health()["A"], WorkerStatus::Critical);
    }

    #[tokio::test(start_paused = true)]
    async fn test_should_recover_rules() {
        let (mut monitor, _) = monitor_with(&["A"]);
        assert!(!monitor.should_recover_worker("unknown"));
        assert!(!monitor.should_recover_worker("A"));

        advance(Duration::from_secs(10)).await;
        monitor.check_health();
        assert!(monitor.should_recover_worker("A"));

        assert!(monitor.mark_recovering("A"));
        assert!(!monitor.should_recover_worker("A"));

        // Still inside cooldown: check_health keeps it Recovering
        advance(Duration::from_secs(1)).await;
        assert_eq!(monitor.check_health()["A"], WorkerStatus::Recovering);

        // Failure leaves status alone; cooldown expiry re-exposes the worker
        monitor.mark_recovery_failure("A");
        assert_eq!(monitor.worker("A").unwrap().status, WorkerStatus::Recovering);
        advance(Duration::from_secs(3)).await;
        assert_eq!(monitor.check_health()["A"], WorkerStatus::Critical);
        assert!(monitor.should_recover_worker("A"));

        assert!(monitor.mark_recovering("A"));
        monitor.mark_recovery_failure("A");
        advance(Duration::from_secs(3)).await;
        monitor.check_health();

        // Cap of two attempts reached
        assert!(!monitor.should_recover_worker("A"));
        assert!(!monitor.mark_recovering("A"));
        assert_eq!(monitor.worker("A").unwrap().recovery_attempts, 2);
        assert_eq!(monitor.get_unhealthy_workers(), vec!["A".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovery_success_replaces_process() {
        let (mut monitor, processes) = monitor_with(&["A"]);
        monitor.update_heartbeat("A", HeartbeatMetrics::default());
        processes[0].terminate();
        assert_eq!(monitor.check_health()["A"], WorkerStatus::Dead);

        assert!(monitor.mark_recovering("A"));
        monitor.mark_recovery_success("A", FakeProcess::spawn(4242));

        let record = monitor.worker("A").unwrap();
        assert_eq!(record.status, WorkerStatus::Healthy);
        assert!(record.last_heartbeat.is_none());
        assert_eq!(record.consecutive_failures, 0);
        assert_eq!(record.process.pid(), Some(4242));
        assert_eq!(monitor.check_health()["A"], WorkerStatus::Healthy);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stats_and_success_rate() {
        let (mut monitor, _) = monitor_with(&["A", "B", "C"]);
        let stats = monitor.get_stats();
        assert_eq!(stats.total_workers, 3);
        assert_eq!(stats.healthy, 3);
        assert_eq!(stats.recovery_success_rate, 1.0);

        advance(Duration::from_secs(10)).await;
        monitor.check_health();
        monitor.mark_recovering("A");
        monitor.mark_recovering("B");
        monitor.mark_recovery_failure("B");

        let stats = monitor.get_stats();
        assert_eq!(stats.recovering, 2);
        assert_eq!(stats.critical, 1);
        assert_eq!(stats.total_recoveries, 2);
        assert_eq!(stats.failed_recoveries, 1);
        assert!((stats.recovery_success_rate - 0.5).abs() < f64::EPSILON);
    }

    #[tokio::test(start_paused = true)]
    async fn test_worker_details_and_unregister() {
        let (mut monitor, _) = monitor_with(&["A"]);
        monitor.update_heartbeat("A", HeartbeatMetrics::with_cycle_time(Duration::from_millis(50)));
        advance(Duration::from_secs(2)).await;

        let details = monitor.get_worker_details("A").unwrap();
        assert_eq!(details.pid, Some(1000));
        assert!(details.alive);
        assert_eq!(details.heartbeat_age_seconds, Some(2.0));
        assert_eq!(details.cycles_completed, 1);
        assert!(details.seconds_since_last_recovery.is_none());
        assert!(monitor.get_worker_details("ghost").is_none());

        assert!(monitor.unregister_worker("A").is_some());
        assert!(monitor.unregister_worker("A").is_none());
        assert!(monitor.get_worker_details("A").is_none());
    }
}
