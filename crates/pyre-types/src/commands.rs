//! Command blocks and the conditions attached to `IfStart` blocks.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{ConditionOperator, Direction, TargetType};
use crate::structs::GridOffset;

/// Condition evaluated per priest by an `IfStart` block.
///
/// The inspected cell is the priest's position plus `offset`; a zero offset
/// inspects the priest's own cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Condition {
    /// Relative cell to inspect.
    #[serde(default)]
    pub offset: GridOffset,
    /// How the observed target is compared to `target`.
    #[serde(default)]
    pub operator: ConditionOperator,
    /// Expected target type.
    #[serde(default)]
    pub target: TargetType,
}

impl Condition {
    /// Condition "the cell in `dir` equals `target`".
    pub const fn looking(dir: Direction, target: TargetType) -> Self {
        Self {
            offset: dir.offset(),
            operator: ConditionOperator::Equals,
            target,
        }
    }

    /// The same condition with the operator inverted.
    #[must_use]
    pub const fn negated(self) -> Self {
        let operator = match self.operator {
            ConditionOperator::Equals => ConditionOperator::NotEquals,
            ConditionOperator::NotEquals => ConditionOperator::Equals,
        };
        Self { operator, ..self }
    }

    /// Apply the operator to an observed target type.
    pub fn holds_for(&self, observed: TargetType) -> bool {
        match self.operator {
            ConditionOperator::Equals => observed == self.target,
            ConditionOperator::NotEquals => observed != self.target,
        }
    }
}

/// One entry of an instruction list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Command {
    /// Empty block.
    #[default]
    NoOp,
    /// Step one cell.
    Move(Direction),
    /// Light whatever is in the adjacent cell.
    Cast(Direction),
    /// Jump target of the matching `LoopEnd`.
    LoopStart,
    /// Jumps back to the matching `LoopStart`.
    LoopEnd,
    /// Opens a branch scope.
    IfStart(Condition),
    /// Switches to the false branch of the innermost scope.
    Else,
    /// Closes the innermost scope.
    EndIf,
}

impl Command {
    /// Whether this is a control-flow marker rather than an agent command.
    pub const fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::LoopStart | Self::LoopEnd | Self::IfStart(_) | Self::Else | Self::EndIf
        )
    }

    /// Whether this command is dispatched to priests.
    pub const fn is_agent_command(&self) -> bool {
        matches!(self, Self::Move(_) | Self::Cast(_))
    }

    /// Short label as shown on the block.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::NoOp => "NONE",
            Self::Move(_) => "MOVE",
            Self::Cast(_) => "CAST",
            Self::LoopStart => "LOOP",
            Self::LoopEnd => "JUMP",
            Self::IfStart(_) => "IF",
            Self::Else => "ELSE",
            Self::EndIf => "END IF",
        }
    }
}
