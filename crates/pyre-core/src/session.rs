//! One level session: grid, priests, outcome and engine in one owner.
//!
//! A [`Session`] is built once per level load and can run any number of
//! programs while the level is still being played. [`Session::reset`]
//! reloads the level in place.

use pyre_agents::{AgentError, AgentRoster};
use pyre_types::{AgentId, GameState, RunMetrics, RunState, StarThresholds};
use pyre_world::{Grid, LevelLayout, WorldError};
use tracing::info;

use crate::config::TimingConfig;
use crate::engine::{Engine, StepContext, StepReport};
use crate::game_state::GameStateMachine;
use crate::program::InstructionList;
use crate::scoring;

/// Errors that can occur when building a session from a layout.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The grid could not be built.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// The roster could not be built.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },
}

/// The level-scoped owner of all run state.
#[derive(Debug, Clone)]
pub struct Session {
    /// Level name from the layout.
    name: String,
    /// The map.
    grid: Grid,
    /// The priests.
    roster: AgentRoster,
    /// The level outcome.
    game: GameStateMachine,
    /// The scheduler.
    engine: Engine,
    /// Scoring thresholds from the layout.
    stars: StarThresholds,
}

impl Session {
    /// Load a level.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::World`] if the grid cannot be built or
    /// [`SessionError::Agent`] if the priests cannot be placed.
    pub fn new(layout: &LevelLayout, timing: TimingConfig) -> Result<Self, SessionError> {
        let grid = Grid::from_layout(layout)?;
        let roster = AgentRoster::from_specs(&layout.agents, &grid)?;

        info!(
            level = %layout.name,
            width = layout.width,
            height = layout.height,
            priests = roster.len(),
            objectives = grid.objectives_remaining(),
            "Level loaded"
        );

        Ok(Self {
            name: layout.name.clone(),
            grid,
            roster,
            game: GameStateMachine::new(),
            engine: Engine::new(timing),
            stars: layout.stars,
        })
    }

    // -----------------------------------------------------------------------
    // Driving
    // -----------------------------------------------------------------------

    /// Start running `program`.
    ///
    /// Returns `false` without side effects if a run is in progress or the
    /// level has already been won or lost.
    pub fn run_sequence(&mut self, program: &InstructionList) -> bool {
        self.engine.start(program, &self.roster, &self.game)
    }

    /// Execute one block of the current run.
    pub fn step(&mut self) -> StepReport {
        let mut ctx = StepContext {
            grid: &mut self.grid,
            roster: &mut self.roster,
            game: &mut self.game,
        };
        self.engine.step(&mut ctx)
    }

    /// Stop the current run. Returns `true` if one was in progress.
    pub fn stop(&mut self) -> bool {
        self.engine.stop()
    }

    /// Reload the level: priests to their starts, triggerables restored,
    /// outcome back to `Playing`, engine `Idle`.
    pub fn reset(&mut self) {
        self.grid.reset();
        self.roster.reset();
        self.game.reset();
        self.engine.reset();
        info!(level = %self.name, "Level reset");
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Level name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Counters of the current (or last) run.
    pub const fn metrics(&self) -> RunMetrics {
        self.engine.metrics()
    }

    /// The level outcome.
    pub const fn game_state(&self) -> GameState {
        self.game.state()
    }

    /// The engine lifecycle state.
    pub const fn run_state(&self) -> RunState {
        self.engine.run_state()
    }

    /// Whether a run is in progress.
    pub const fn is_running(&self) -> bool {
        matches!(self.engine.run_state(), RunState::Running)
    }

    /// Priests eligible for the next dispatch.
    pub fn active_agents(&self) -> &[AgentId] {
        self.engine.active()
    }

    /// The map.
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The priests.
    pub const fn roster(&self) -> &AgentRoster {
        &self.roster
    }

    /// The engine.
    pub const fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Scoring thresholds of this level.
    pub const fn star_thresholds(&self) -> StarThresholds {
        self.stars
    }

    /// Stars earned so far; zero unless the level has been won.
    pub fn stars(&self) -> u8 {
        scoring::score(self.game.state(), &self.engine.metrics(), &self.stars)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pyre_types::{AgentSpec, Command, Direction, GridPos};

    use super::*;

    fn layout() -> LevelLayout {
        let mut layout = LevelLayout::empty(6, 6);
        layout.agents = vec![AgentSpec {
            id: AgentId(1),
            start: GridPos::new(1, 1),
            goal: Some(GridPos::new(3, 1)),
        }];
        layout.stars.max_lines_for_extra_star = 1;
        layout
    }

    #[test]
    fn bad_layouts_are_rejected() {
        let mut bad = layout();
        bad.width = 0;
        assert!(matches!(
            Session::new(&bad, TimingConfig::default()),
            Err(SessionError::World { .. })
        ));

        let mut bad = layout();
        bad.agents.push(bad.agents.first().cloned().unwrap());
        assert!(matches!(
            Session::new(&bad, TimingConfig::default()),
            Err(SessionError::Agent { .. })
        ));
    }

    #[test]
    fn win_scores_and_reset_reloads() {
        let mut session = Session::new(&layout(), TimingConfig::default()).unwrap();
        assert_eq!(session.run_state(), RunState::Idle);
        let program: InstructionList = vec![
            Command::Move(Direction::Right),
            Command::Move(Direction::Right),
        ]
        .into();
        assert!(session.run_sequence(&program));
        assert!(session.is_running());
        while !session.step().is_finished() {}
        assert!(!session.is_running());

        assert_eq!(session.game_state(), GameState::Succeeded);
        assert_eq!(session.metrics().step_count, 2);
        assert_eq!(session.metrics().instruction_count, 2);
        // Two blocks exceed the one-line threshold.
        assert_eq!(session.stars(), 2);
        assert!(!session.run_sequence(&program));

        session.reset();
        assert_eq!(session.game_state(), GameState::Playing);
        assert_eq!(session.run_state(), RunState::Idle);
        assert_eq!(
            session.roster().get(AgentId(1)).unwrap().position,
            GridPos::new(1, 1)
        );
        assert_eq!(session.stars(), 0);
        assert!(session.run_sequence(&program));
    }
}
