//! Enumeration types for the Pyre engine.
//!
//! Directions, grid cell kinds, condition operands, and the two state
//! machines (game outcome and run lifecycle) that the UI listens to.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::structs::GridOffset;

// ---------------------------------------------------------------------------
// Directions
// ---------------------------------------------------------------------------

/// One of the eight compass directions a command can target.
///
/// The grid's Y axis grows upwards, so [`Direction::Up`] is `(0, +1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Direction {
    /// `(0, +1)`
    Up,
    /// `(0, -1)`
    Down,
    /// `(-1, 0)`
    Left,
    /// `(+1, 0)`
    Right,
    /// `(-1, +1)`
    LeftUp,
    /// `(+1, +1)`
    RightUp,
    /// `(-1, -1)`
    LeftDown,
    /// `(+1, -1)`
    RightDown,
}

impl Direction {
    /// All eight directions, orthogonal ones first.
    pub const ALL: [Self; 8] = [
        Self::Up,
        Self::Down,
        Self::Left,
        Self::Right,
        Self::LeftUp,
        Self::RightUp,
        Self::LeftDown,
        Self::RightDown,
    ];

    /// The unit offset this direction moves by.
    pub const fn offset(self) -> GridOffset {
        match self {
            Self::Up => GridOffset::new(0, 1),
            Self::Down => GridOffset::new(0, -1),
            Self::Left => GridOffset::new(-1, 0),
            Self::Right => GridOffset::new(1, 0),
            Self::LeftUp => GridOffset::new(-1, 1),
            Self::RightUp => GridOffset::new(1, 1),
            Self::LeftDown => GridOffset::new(-1, -1),
            Self::RightDown => GridOffset::new(1, -1),
        }
    }
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// The static type of a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum CellType {
    /// Walkable floor.
    #[default]
    SafePath,
    /// Impassable, except on the outer border of the map.
    Wall,
    /// Deadly on entry (cliff, pit).
    Hazard,
    /// Holds a fire pit that is only deadly once lit.
    TriggerableHazard,
    /// A priest's destination.
    Goal,
}

/// What kind of object a triggerable is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum TriggerableKind {
    /// A fire pit. Lit fire pits burn whoever walks in.
    FirePit,
    /// A chest, usually sitting on a priest's goal cell.
    Chest,
}

// ---------------------------------------------------------------------------
// Conditions
// ---------------------------------------------------------------------------

/// Comparison used by an `IfStart` condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ConditionOperator {
    /// The observed target equals the expected one.
    #[default]
    Equals,
    /// The observed target differs from the expected one.
    NotEquals,
}

/// What a condition expects to find in the inspected cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum TargetType {
    /// Nothing notable.
    Floor,
    /// A fire pit, lit or not.
    #[default]
    Fire,
    /// A chest.
    Chest,
    /// Another living priest.
    Priest,
    /// A wall, border walls included.
    Wall,
}

// ---------------------------------------------------------------------------
// State machines
// ---------------------------------------------------------------------------

/// Overall outcome of the level.
///
/// `Succeeded` and `Failed` are terminal for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum GameState {
    /// The level is still in progress.
    #[default]
    Playing,
    /// Every priest is alive and standing on its goal.
    Succeeded,
    /// A priest died.
    Failed,
}

impl GameState {
    /// Whether the state can no longer change.
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Playing)
    }
}

/// Lifecycle of the execution engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum RunState {
    /// No run has been started yet.
    #[default]
    Idle,
    /// A program is being executed.
    Running,
    /// The last run completed or was aborted.
    Finished,
}

/// Why a priest died.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum DeathCause {
    /// Walked into a hazard or a lit fire pit.
    Hazard,
    /// Another priest walked into its cell.
    Collision,
    /// Another priest cast at it.
    Cast,
}

impl core::fmt::Display for DeathCause {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Hazard => write!(f, "hazard"),
            Self::Collision => write!(f, "collision"),
            Self::Cast => write!(f, "cast"),
        }
    }
}
