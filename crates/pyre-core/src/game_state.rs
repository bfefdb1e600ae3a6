//! The level outcome: playing, succeeded or failed.
//!
//! Both end states are terminal for the session. Only
//! [`GameStateMachine::reset`] (a level reload) returns to `Playing`.

use pyre_agents::AgentRoster;
use pyre_types::GameState;
use tracing::info;

/// Tracks the outcome of the current level attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GameStateMachine {
    /// Current state.
    state: GameState,
}

impl GameStateMachine {
    /// Start in `Playing`.
    pub const fn new() -> Self {
        Self {
            state: GameState::Playing,
        }
    }

    /// The current state.
    pub const fn state(&self) -> GameState {
        self.state
    }

    /// Whether the level is still being played.
    pub const fn is_playing(&self) -> bool {
        matches!(self.state, GameState::Playing)
    }

    /// Move to `next` if still playing. Returns `true` if the state changed.
    pub fn transition(&mut self, next: GameState) -> bool {
        if !self.is_playing() || next == GameState::Playing {
            return false;
        }
        info!(from = ?self.state, to = ?next, "Game state changed");
        self.state = next;
        true
    }

    /// Derive the outcome from the roster and apply it.
    ///
    /// Any death fails the level. Otherwise the level succeeds once every
    /// priest is alive and has arrived. Returns the new state if it changed.
    pub fn evaluate(&mut self, roster: &AgentRoster) -> Option<GameState> {
        let next = if roster.any_dead() {
            GameState::Failed
        } else if roster.all_alive_and_arrived() {
            GameState::Succeeded
        } else {
            return None;
        };
        self.transition(next).then_some(next)
    }

    /// Back to `Playing` for a level reload.
    pub const fn reset(&mut self) {
        self.state = GameState::Playing;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pyre_types::{AgentId, AgentSpec, GridPos};
    use pyre_world::Grid;

    use super::*;

    fn roster(n: u32) -> AgentRoster {
        let grid = Grid::new(8, 8).unwrap();
        let specs: Vec<AgentSpec> = (1..=n)
            .map(|i| AgentSpec {
                id: AgentId(i),
                start: GridPos::new(1, 1),
                goal: None,
            })
            .collect();
        AgentRoster::from_specs(&specs, &grid).unwrap()
    }

    #[test]
    fn terminal_states_do_not_revert() {
        let mut game = GameStateMachine::new();
        assert!(game.transition(GameState::Failed));
        assert!(!game.transition(GameState::Succeeded));
        assert!(!game.transition(GameState::Playing));
        assert_eq!(game.state(), GameState::Failed);
        game.reset();
        assert!(game.is_playing());
    }

    #[test]
    fn death_fails_and_full_arrival_succeeds() {
        let mut r = roster(2);
        let mut game = GameStateMachine::new();
        assert_eq!(game.evaluate(&r), None);

        r.get_mut(AgentId(1)).unwrap().arrived = true;
        assert_eq!(game.evaluate(&r), None);
        r.get_mut(AgentId(2)).unwrap().arrived = true;
        assert_eq!(game.evaluate(&r), Some(GameState::Succeeded));

        r.get_mut(AgentId(2)).unwrap().alive = false;
        assert_eq!(game.evaluate(&r), None);
        assert_eq!(game.state(), GameState::Succeeded);
    }

    #[test]
    fn empty_roster_keeps_playing() {
        let mut game = GameStateMachine::new();
        assert_eq!(game.evaluate(&roster(0)), None);
        assert!(game.is_playing());
    }
}
