//! Error types for the `pyre-agents` crate.
//!
//! Gameplay outcomes such as deaths and blocked moves are not errors; they
//! are reported as events. These variants cover caller mistakes only.

use pyre_types::{AgentId, Command, GridPos};

/// Errors that can occur while building a roster or dispatching commands.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// No priest with the given id is on the roster.
    #[error("agent not found: {0}")]
    AgentNotFound(AgentId),

    /// Two priests in a layout share an id.
    #[error("duplicate agent id: {0}")]
    DuplicateAgent(AgentId),

    /// A structural or empty block was dispatched to priests.
    #[error("command {command:?} cannot be dispatched to agents")]
    NotAnAgentCommand {
        /// The rejected command.
        command: Command,
    },

    /// A priest starts outside the grid.
    #[error("agent {agent} starts out of bounds at {pos}")]
    StartOutOfBounds {
        /// The priest.
        agent: AgentId,
        /// Its configured start cell.
        pos: GridPos,
    },
}
