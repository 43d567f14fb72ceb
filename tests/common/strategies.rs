use proptest::prelude::*;
use roundwatch::GamePhase;

/// Strategy for any game phase
pub fn game_phase_strategy() -> impl Strategy<Value = GamePhase> {
    prop::sample::select(GamePhase::ALL.to_vec())
}

/// Strategy for scores as they appear on screen (two decimals, 1.00 and up)
pub fn score_strategy() -> impl Strategy<Value = f64> {
    (100u64..1_000_000).prop_map(|cents| cents as f64 / 100.0)
}

/// Strategy for optional score readings, absent roughly a quarter of the time
pub fn score_reading_strategy() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        1 => Just(None),
        3 => score_strategy().prop_map(Some),
    ]
}

/// Strategy for cycle times in seconds
pub fn cycle_time_strategy() -> impl Strategy<Value = f64> {
    0.001f64..30.0
}

/// Strategy for money amounts in cents
pub fn money_cents_strategy() -> impl Strategy<Value = u64> {
    0u64..10_000_000_000
}

/// Render an amount in cents with thousands separators, e.g. `12,345.60`
pub fn format_money(cents: u64) -> String {
    let whole = (cents / 100).to_string();
    let mut grouped = String::new();
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("{grouped}.{:02}", cents % 100)
}
