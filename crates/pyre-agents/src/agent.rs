//! Priest state and the roster that orders them.
//!
//! The [`AgentRoster`] fixes the resolution order for the whole run: the
//! order priests appear in the level layout. Every cohort the engine
//! dispatches to is resolved in this order, which is what makes collision
//! outcomes deterministic.

use std::collections::BTreeSet;

use pyre_types::{AgentId, AgentSpec, GridPos};
use pyre_world::Grid;
use tracing::debug;

use crate::error::AgentError;

/// One priest on the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    /// Identifier from the layout.
    pub id: AgentId,
    /// Current cell. Updated at the start of a move.
    pub position: GridPos,
    /// Designated goal cell, if any.
    pub goal: Option<GridPos>,
    /// Cleared on death, never set again within a run.
    pub alive: bool,
    /// Standing on its goal.
    pub arrived: bool,
    /// A command is still resolving.
    pub busy: bool,
    /// Start cell, restored by [`Self::reset`].
    start: GridPos,
}

impl Agent {
    /// Place a priest at its start cell.
    pub const fn from_spec(spec: &AgentSpec) -> Self {
        Self {
            id: spec.id,
            position: spec.start,
            goal: spec.goal,
            alive: true,
            arrived: false,
            busy: false,
            start: spec.start,
        }
    }

    /// The cell this priest started on.
    pub const fn start(&self) -> GridPos {
        self.start
    }

    /// Whether standing on `pos` counts as arrival.
    ///
    /// With a designated goal only that cell counts; without one, any goal
    /// cell does.
    pub fn is_goal_for(&self, pos: GridPos, grid: &Grid) -> bool {
        match self.goal {
            Some(goal) => goal == pos,
            None => grid.is_goal(pos),
        }
    }

    /// Whether the priest has arrived and is still standing on its goal.
    ///
    /// Finished priests are skipped by the dispatcher.
    pub fn is_finished(&self, grid: &Grid) -> bool {
        self.alive && self.arrived && self.is_goal_for(self.position, grid)
    }

    /// Put the priest back on its start cell, alive and idle.
    pub const fn reset(&mut self) {
        self.position = self.start;
        self.alive = true;
        self.arrived = false;
        self.busy = false;
    }
}

/// All priests of a level in resolution order.
#[derive(Debug, Clone, Default)]
pub struct AgentRoster {
    /// Priests in layout order.
    agents: Vec<Agent>,
}

impl AgentRoster {
    /// Build a roster from layout entries, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::DuplicateAgent`] if two entries share an id, or
    /// [`AgentError::StartOutOfBounds`] if a start cell is off the grid.
    pub fn from_specs(specs: &[AgentSpec], grid: &Grid) -> Result<Self, AgentError> {
        let mut seen = BTreeSet::new();
        let mut agents = Vec::with_capacity(specs.len());

        for spec in specs {
            if !seen.insert(spec.id) {
                return Err(AgentError::DuplicateAgent(spec.id));
            }
            if !grid.in_bounds(spec.start) {
                return Err(AgentError::StartOutOfBounds {
                    agent: spec.id,
                    pos: spec.start,
                });
            }
            agents.push(Agent::from_spec(spec));
        }

        debug!(count = agents.len(), "Roster built");
        Ok(Self { agents })
    }

    /// Number of priests.
    pub const fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the roster is empty.
    pub const fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Iterate in roster order.
    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    /// All ids in roster order.
    pub fn ids(&self) -> Vec<AgentId> {
        self.agents.iter().map(|a| a.id).collect()
    }

    /// Look up a priest.
    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    /// Look up a priest mutably.
    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|a| a.id == id)
    }

    /// Position of `id` in resolution order.
    pub fn index_of(&self, id: AgentId) -> Option<usize> {
        self.agents.iter().position(|a| a.id == id)
    }

    /// The first living priest on `pos`, ignoring `excluding`.
    pub fn alive_at(&self, pos: GridPos, excluding: Option<AgentId>) -> Option<AgentId> {
        self.agents
            .iter()
            .find(|a| a.alive && a.position == pos && Some(a.id) != excluding)
            .map(|a| a.id)
    }

    /// Sort ids into roster order and drop duplicates and unknown ids.
    pub fn in_roster_order(&self, ids: impl IntoIterator<Item = AgentId>) -> Vec<AgentId> {
        let wanted: BTreeSet<AgentId> = ids.into_iter().collect();
        self.agents
            .iter()
            .map(|a| a.id)
            .filter(|id| wanted.contains(id))
            .collect()
    }

    /// Whether every priest is alive and has arrived. An empty roster never
    /// satisfies this.
    pub fn all_alive_and_arrived(&self) -> bool {
        !self.agents.is_empty() && self.agents.iter().all(|a| a.alive && a.arrived)
    }

    /// Whether any priest has died.
    pub fn any_dead(&self) -> bool {
        self.agents.iter().any(|a| !a.alive)
    }

    /// Put every priest back on its start cell.
    pub fn reset(&mut self) {
        for agent in &mut self.agents {
            agent.reset();
        }
    }
}
