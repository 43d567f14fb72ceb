//! Game phase derivation.
//!
//! The phase is a pure function of the previous phase and the newest score
//! reading. Transition side effects are described by [`TransitionEffects`] so
//! the sampler applies them without re-deriving the rules.

use crate::constants::GamePhase;

/// Score shown at the instant a round begins
pub const START_SCORE: f64 = 1.0;

const SCORE_EPSILON: f64 = 1e-9;

/// Derive the next phase from the previous phase and a fresh score reading.
///
/// `loading_marker` is set while a loading screen has been seen and no
/// scoring phase has been entered since.
pub fn derive_phase(previous: GamePhase, score: Option<f64>, loading_marker: bool) -> GamePhase {
    match score {
        None if previous.is_scoring() => GamePhase::Ended,
        None if loading_marker => GamePhase::Loading,
        None => GamePhase::Betting,
        Some(score) if (score - START_SCORE).abs() < SCORE_EPSILON => GamePhase::Start,
        Some(score) if score < 10.0 => GamePhase::ScoreLow,
        Some(score) if score < 100.0 => GamePhase::ScoreMid,
        Some(_) => GamePhase::ScoreHigh,
    }
}

/// Side effects the sampler applies when moving between two phases
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitionEffects {
    /// Loading -> Start: record how long the loading screen lasted
    pub record_loading_duration: bool,
    pub stamp_loading_start: bool,
    pub stamp_round_start: bool,
    pub clear_loading_marker: bool,
    /// Entering Ended: read the player count and money regions once
    pub capture_round_totals: bool,
}

pub fn transition_effects(from: GamePhase, to: GamePhase) -> TransitionEffects {
    TransitionEffects {
        record_loading_duration: from == GamePhase::Loading && to == GamePhase::Start,
        stamp_loading_start: to == GamePhase::Loading && from != GamePhase::Loading,
        stamp_round_start: matches!(from, GamePhase::Betting | GamePhase::Loading)
            && matches!(to, GamePhase::Start | GamePhase::ScoreLow),
        clear_loading_marker: to.is_scoring(),
        capture_round_totals: to == GamePhase::Ended && from != GamePhase::Ended,
    }
}
