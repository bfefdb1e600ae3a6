//! What a priest sees when an `IfStart` asks about a neighbouring cell.

use pyre_agents::{Agent, AgentRoster};
use pyre_types::{AgentId, CellType, Condition, GridPos, TargetType, TriggerableKind};
use pyre_world::Grid;

/// Classify the contents of `pos` as seen by `observer`.
///
/// Priority: chest, fire pit, wall, another living priest, floor. Cells
/// outside the map read as floor.
pub fn classify_target(
    pos: GridPos,
    grid: &Grid,
    roster: &AgentRoster,
    observer: Option<AgentId>,
) -> TargetType {
    match grid.triggerable_at(pos).map(|t| t.kind) {
        Some(TriggerableKind::Chest) => return TargetType::Chest,
        Some(TriggerableKind::FirePit) => return TargetType::Fire,
        None => {}
    }
    if grid.cell_type(pos) == Some(CellType::Wall) {
        return TargetType::Wall;
    }
    if roster.alive_at(pos, observer).is_some() {
        return TargetType::Priest;
    }
    TargetType::Floor
}

/// Evaluate `condition` for one priest.
pub fn evaluate(condition: &Condition, agent: &Agent, grid: &Grid, roster: &AgentRoster) -> bool {
    let observed = agent
        .position
        .offset_by(condition.offset)
        .map_or(TargetType::Floor, |pos| {
            classify_target(pos, grid, roster, Some(agent.id))
        });
    condition.holds_for(observed)
}
