//! Events emitted by the engine while a program runs.
//!
//! The renderer consumes these to animate priests and tiles: a move carries
//! its start and end cell, and the step that produced it carries the
//! nominal duration. Nothing in the engine waits on the renderer.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{DeathCause, GameState, RunState};
use crate::ids::AgentId;
use crate::structs::GridPos;

/// Something observable that happened during a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "type")]
pub enum RunEvent {
    /// A priest changed cell.
    AgentMoved {
        /// The priest.
        agent: AgentId,
        /// Cell before the move.
        from: GridPos,
        /// Cell after the move.
        to: GridPos,
    },
    /// A move was rejected because the target is impassable.
    MoveBlocked {
        /// The priest.
        agent: AgentId,
        /// The rejected target cell.
        target: GridPos,
    },
    /// A priest cast at a cell.
    AgentCast {
        /// The caster.
        agent: AgentId,
        /// The targeted cell.
        target: GridPos,
    },
    /// A fire pit was lit or a chest opened.
    Armed {
        /// Cell of the triggerable.
        pos: GridPos,
    },
    /// A priest died.
    AgentDied {
        /// The victim.
        agent: AgentId,
        /// Where it died.
        pos: GridPos,
        /// What killed it.
        cause: DeathCause,
        /// The priest responsible, for collisions and casts.
        by: Option<AgentId>,
    },
    /// A priest stepped onto its goal.
    AgentArrived {
        /// The priest.
        agent: AgentId,
        /// The goal cell.
        pos: GridPos,
    },
    /// The control flow jumped back to a loop start.
    LoopJumped {
        /// Index of the `LoopEnd` block.
        from: u32,
        /// Index of the matching `LoopStart` block.
        to: u32,
    },
    /// An `IfStart` split the active set.
    BranchOpened {
        /// Index of the `IfStart` block.
        index: u32,
        /// Priests on the true path.
        true_count: u32,
        /// Priests on the false path.
        false_count: u32,
    },
    /// An `EndIf` merged the active set back.
    BranchClosed {
        /// Index of the `EndIf` block.
        index: u32,
        /// Size of the restored active set.
        active_count: u32,
    },
    /// The level outcome changed.
    GameStateChanged {
        /// The new state.
        state: GameState,
    },
    /// The engine lifecycle changed.
    RunStateChanged {
        /// The new state.
        state: RunState,
    },
}

impl RunEvent {
    /// The priest this event is about, if any.
    pub const fn agent(&self) -> Option<AgentId> {
        match self {
            Self::AgentMoved { agent, .. }
            | Self::MoveBlocked { agent, .. }
            | Self::AgentCast { agent, .. }
            | Self::AgentDied { agent, .. }
            | Self::AgentArrived { agent, .. } => Some(*agent),
            Self::Armed { .. }
            | Self::LoopJumped { .. }
            | Self::BranchOpened { .. }
            | Self::BranchClosed { .. }
            | Self::GameStateChanged { .. }
            | Self::RunStateChanged { .. } => None,
        }
    }
}
