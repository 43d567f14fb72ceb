//! Published per-worker snapshot and sampling statistics.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;

use crate::constants::{GamePhase, RoundState};

/// Latest sensed state of one worker's game.
///
/// Only the sampling loop writes these; readers always receive a copy.
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub worker: String,
    pub score: Option<f64>,
    pub phase: GamePhase,
    pub players_left: Option<u32>,
    pub total_players: Option<u32>,
    pub total_money: Option<f64>,
    /// When this snapshot was produced
    pub timestamp: Instant,
    /// Score from the previous sample
    pub last_score: Option<f64>,
    /// Consecutive samples that repeated the previous score
    pub same_score_count: u32,
    pub round_start_time: Option<Instant>,
    pub loading_start_time: Option<Instant>,
    pub loading_duration_ms: Option<u64>,
}

impl GameState {
    pub fn new(worker: &str, now: Instant) -> Self {
        Self {
            worker: worker.to_string(),
            score: None,
            phase: GamePhase::Unknown,
            players_left: None,
            total_players: None,
            total_money: None,
            timestamp: now,
            last_score: None,
            same_score_count: 0,
            round_start_time: None,
            loading_start_time: None,
            loading_duration_ms: None,
        }
    }

    pub fn round_state(&self) -> RoundState {
        RoundState::from_phase(self.phase)
    }

    pub fn is_round_active(&self) -> bool {
        self.phase.is_scoring()
    }

    /// Time since this snapshot was produced
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.timestamp)
    }

    pub fn loading_duration(&self) -> Option<Duration> {
        self.loading_duration_ms.map(Duration::from_millis)
    }
}

/// Running counters for the sampling loop
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    pub running: bool,
    pub total_samples: u64,
    pub successful_samples: u64,
    pub failed_samples: u64,
    /// Mean latency of successful samples, in milliseconds
    pub avg_latency_ms: f64,
    pub started_at: Option<DateTime<Utc>>,
}

impl CacheStats {
    pub fn record_success(&mut self, latency: Duration) {
        self.total_samples += 1;
        self.successful_samples += 1;
        let n = self.successful_samples as f64;
        let latency_ms = latency.as_secs_f64() * 1000.0;
        self.avg_latency_ms = (self.avg_latency_ms * (n - 1.0) + latency_ms) / n;
    }

    pub fn record_failure(&mut self) {
        self.total_samples += 1;
        self.failed_samples += 1;
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_samples == 0 {
            return 1.0;
        }
        self.successful_samples as f64 / self.total_samples as f64
    }
}
