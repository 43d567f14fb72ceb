//! # System Constants and Enumerations
//!
//! Closed enumerations for worker health, round state, game phase and sensor
//! regions. Every transition table in the crate matches on these exhaustively.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Health status of a monitored worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    Healthy,
    Warning,
    Critical,
    Dead,
    Recovering,
}

impl WorkerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerStatus::Healthy => "healthy",
            WorkerStatus::Warning => "warning",
            WorkerStatus::Critical => "critical",
            WorkerStatus::Dead => "dead",
            WorkerStatus::Recovering => "recovering",
        }
    }

    /// Critical and Dead workers are candidates for recovery
    pub fn is_unhealthy(&self) -> bool {
        matches!(self, WorkerStatus::Critical | WorkerStatus::Dead)
    }
}

impl fmt::Display for WorkerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Round lifecycle as reported by a worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundState {
    Waiting,
    Active,
    Ending,
    Ended,
}

impl RoundState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundState::Waiting => "waiting",
            RoundState::Active => "active",
            RoundState::Ending => "ending",
            RoundState::Ended => "ended",
        }
    }

    /// Project a sensed game phase onto the round lifecycle.
    ///
    /// `Ending` is never produced here; only a worker can report it explicitly.
    pub fn from_phase(phase: GamePhase) -> Self {
        match phase {
            GamePhase::Unknown | GamePhase::Betting | GamePhase::Loading => RoundState::Waiting,
            GamePhase::Start | GamePhase::ScoreLow | GamePhase::ScoreMid | GamePhase::ScoreHigh => {
                RoundState::Active
            }
            GamePhase::Ended => RoundState::Ended,
        }
    }
}

impl fmt::Display for RoundState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inferred lifecycle stage of the current round, ordered by progression
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    #[default]
    Unknown,
    Betting,
    Loading,
    Start,
    ScoreLow,
    ScoreMid,
    ScoreHigh,
    Ended,
}

impl GamePhase {
    pub const ALL: [GamePhase; 8] = [
        GamePhase::Unknown,
        GamePhase::Betting,
        GamePhase::Loading,
        GamePhase::Start,
        GamePhase::ScoreLow,
        GamePhase::ScoreMid,
        GamePhase::ScoreHigh,
        GamePhase::Ended,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Unknown => "unknown",
            GamePhase::Betting => "betting",
            GamePhase::Loading => "loading",
            GamePhase::Start => "start",
            GamePhase::ScoreLow => "score_low",
            GamePhase::ScoreMid => "score_mid",
            GamePhase::ScoreHigh => "score_high",
            GamePhase::Ended => "ended",
        }
    }

    /// Phases in which a live score is on screen
    pub fn is_scoring(&self) -> bool {
        matches!(
            self,
            GamePhase::Start | GamePhase::ScoreLow | GamePhase::ScoreMid | GamePhase::ScoreHigh
        )
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Screen regions a worker reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    ScoreSmall,
    ScoreMedium,
    ScoreLarge,
    Count,
    Money,
}

impl RegionKind {
    pub const ALL: [RegionKind; 5] = [
        RegionKind::ScoreSmall,
        RegionKind::ScoreMedium,
        RegionKind::ScoreLarge,
        RegionKind::Count,
        RegionKind::Money,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RegionKind::ScoreSmall => "score_small",
            RegionKind::ScoreMedium => "score_medium",
            RegionKind::ScoreLarge => "score_large",
            RegionKind::Count => "count",
            RegionKind::Money => "money",
        }
    }

    /// Pick the score region wide enough for a number of this magnitude.
    ///
    /// Larger numbers occupy more screen width; an absent score reads from the
    /// small region.
    pub fn score_region_for(previous_score: Option<f64>) -> Self {
        match previous_score {
            Some(score) if score >= 100.0 => RegionKind::ScoreLarge,
            Some(score) if score >= 10.0 => RegionKind::ScoreMedium,
            _ => RegionKind::ScoreSmall,
        }
    }
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
