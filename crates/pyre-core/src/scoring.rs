//! Star rating for a finished run.
//!
//! A successful run earns one star, plus one for a short program and one
//! for a short walk. Failed or unfinished runs earn none.

use pyre_types::{GameState, RunMetrics, StarThresholds};

/// Stars earned by a successful run, in `1..=3`.
pub fn stars(metrics: &RunMetrics, thresholds: &StarThresholds) -> u8 {
    let mut stars: u8 = 1;
    if metrics.instruction_count <= thresholds.max_lines_for_extra_star {
        stars = stars.saturating_add(1);
    }
    if metrics.step_count <= thresholds.max_steps_for_extra_star {
        stars = stars.saturating_add(1);
    }
    stars.clamp(1, 3)
}

/// Stars for a run that ended in `state`; zero unless it succeeded.
pub fn score(state: GameState, metrics: &RunMetrics, thresholds: &StarThresholds) -> u8 {
    match state {
        GameState::Succeeded => stars(metrics, thresholds),
        GameState::Playing | GameState::Failed => 0,
    }
}
