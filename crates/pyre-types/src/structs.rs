//! Plain data structs shared across the workspace.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{Direction, TriggerableKind};
use crate::ids::AgentId;

/// A cell coordinate on the grid. `(0, 0)` is the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GridPos {
    /// Column.
    pub x: i32,
    /// Row, growing upwards.
    pub y: i32,
}

impl GridPos {
    /// Create a coordinate.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The coordinate shifted by `offset`, or `None` on integer overflow.
    pub const fn offset_by(self, offset: GridOffset) -> Option<Self> {
        let Some(x) = self.x.checked_add(offset.dx) else {
            return None;
        };
        let Some(y) = self.y.checked_add(offset.dy) else {
            return None;
        };
        Some(Self { x, y })
    }

    /// The neighbouring coordinate in `dir`.
    pub const fn step(self, dir: Direction) -> Option<Self> {
        self.offset_by(dir.offset())
    }
}

impl core::fmt::Display for GridPos {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A relative displacement between two cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GridOffset {
    /// Horizontal displacement.
    pub dx: i32,
    /// Vertical displacement.
    pub dy: i32,
}

impl GridOffset {
    /// Create an offset.
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }
}

impl From<Direction> for GridOffset {
    fn from(dir: Direction) -> Self {
        dir.offset()
    }
}

/// How a priest is placed in a level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgentSpec {
    /// Author-assigned identifier. Roster order follows layout order.
    pub id: AgentId,
    /// Starting cell.
    pub start: GridPos,
    /// The goal cell this priest must reach, if any.
    #[serde(default)]
    pub goal: Option<GridPos>,
}

/// How a fire pit or chest is placed in a level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TriggerableSpec {
    /// Cell the object sits on.
    pub pos: GridPos,
    /// Fire pit or chest.
    pub kind: TriggerableKind,
    /// Starts lit/open.
    #[serde(default)]
    pub armed: bool,
    /// Pure trap: never counts as an objective and is never opened by
    /// arrival.
    #[serde(default)]
    pub trap: bool,
}

/// Metrics accumulated over one run and consumed by scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RunMetrics {
    /// One per priest per movement command that changed its position.
    pub step_count: u32,
    /// Length of the instruction list when the run started.
    pub instruction_count: u32,
    /// Engine steps executed, structural ones included.
    pub ticks: u64,
    /// Loop jumps taken.
    pub loop_jumps: u32,
}

/// Per-level thresholds for the two bonus stars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StarThresholds {
    /// A program with at most this many blocks earns a star.
    #[serde(default = "default_star_threshold")]
    pub max_lines_for_extra_star: u32,
    /// A run with at most this many steps earns a star.
    #[serde(default = "default_star_threshold")]
    pub max_steps_for_extra_star: u32,
}

impl Default for StarThresholds {
    fn default() -> Self {
        Self {
            max_lines_for_extra_star: default_star_threshold(),
            max_steps_for_extra_star: default_star_threshold(),
        }
    }
}

const fn default_star_threshold() -> u32 {
    999
}
