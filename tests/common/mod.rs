#![allow(dead_code)]

pub mod strategies;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use roundwatch::cache::sensor::{ReplayFeed, ReplaySensor, SensorCapability};
use roundwatch::{HealthConfig, ProcessHandle, RegionKind};

/// Worker process stand-in whose liveness the test controls
#[derive(Debug)]
pub struct FakeProcess {
    pid: u32,
    alive: AtomicBool,
}

impl FakeProcess {
    pub fn new(pid: u32) -> Arc<Self> {
        Arc::new(Self {
            pid,
            alive: AtomicBool::new(true),
        })
    }

    pub fn kill(&self) {
        self.alive.store(false, Ordering::SeqCst);
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
        self.kill();
    }

    fn join(&self, _timeout: Duration) -> bool {
        !self.is_alive()
    }
}

/// Scripted readings for every region of one table
#[derive(Debug, Clone, Default)]
pub struct TableFeeds {
    pub small: ReplayFeed,
    pub medium: ReplayFeed,
    pub large: ReplayFeed,
    pub count: ReplayFeed,
    pub money: ReplayFeed,
}

impl TableFeeds {
    pub fn feed(&self, region: RegionKind) -> ReplayFeed {
        match region {
            RegionKind::ScoreSmall => self.small.clone(),
            RegionKind::ScoreMedium => self.medium.clone(),
            RegionKind::ScoreLarge => self.large.clone(),
            RegionKind::Count => self.count.clone(),
            RegionKind::Money => self.money.clone(),
        }
    }
}

/// Replay backends for a fixed set of tables
#[derive(Debug, Clone, Default)]
pub struct ReplayRig {
    tables: HashMap<String, TableFeeds>,
}

impl ReplayRig {
    pub fn new(workers: &[&str]) -> Self {
        Self {
            tables: workers
                .iter()
                .map(|name| (name.to_string(), TableFeeds::default()))
                .collect(),
        }
    }

    pub fn table(&self, worker: &str) -> &TableFeeds {
        &self.tables[worker]
    }

    pub fn factory(
        &self,
    ) -> impl Fn(&str, RegionKind) -> anyhow::Result<Box<dyn SensorCapability>> + Send + Sync {
        let tables = self.tables.clone();
        move |worker: &str, region: RegionKind| {
            let table = tables
                .get(worker)
                .ok_or_else(|| anyhow::anyhow!("no replay feeds for {worker}"))?;
            Ok(ReplaySensor::boxed(table.feed(region)))
        }
    }
}

pub fn fast_health_config() -> HealthConfig {
    HealthConfig {
        heartbeat_timeout_ms: 10_000,
        warning_threshold_ms: 5_000,
        max_recovery_attempts: 2,
        recovery_cooldown_ms: 3_000,
        ..HealthConfig::default()
    }
}
