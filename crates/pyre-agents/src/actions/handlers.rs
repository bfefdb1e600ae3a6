//! Execution logic for each command phase.
//!
//! A move is split in two: [`begin_move`] checks passability and updates
//! the logical position at once, [`settle_move`] runs the post-move checks
//! after every priest of the cohort has started. A cast resolves entirely
//! in [`begin_cast`].

use pyre_types::{AgentId, DeathCause, Direction, RunEvent};
use pyre_world::Grid;
use tracing::debug;

use crate::actions::CohortOutcome;
use crate::agent::AgentRoster;
use crate::death::kill;

/// Start a move. Returns `true` if the priest changed cell.
///
/// An impassable target leaves the priest where it is and idle.
pub fn begin_move(
    roster: &mut AgentRoster,
    id: AgentId,
    dir: Direction,
    grid: &Grid,
    out: &mut CohortOutcome,
) -> bool {
    let Some(agent) = roster.get_mut(id) else {
        return false;
    };
    agent.busy = true;

    let from = agent.position;
    let Some(to) = from.step(dir).filter(|t| grid.is_passable(*t)) else {
        agent.busy = false;
        let target = from.step(dir).unwrap_or(from);
        debug!(agent = %id, %from, %target, "Move blocked");
        out.events.push(RunEvent::MoveBlocked { agent: id, target });
        return false;
    };

    agent.position = to;
    agent.arrived = false;
    out.events.push(RunEvent::AgentMoved {
        agent: id,
        from,
        to,
    });
    true
}

/// Finish a move: hazard, collision, then goal.
///
/// The mover dies on a hazardous cell. Otherwise any other living priest
/// on the cell dies and the mover survives. A surviving mover on its goal
/// arrives and opens a dormant, non-trap chest there.
pub fn settle_move(roster: &mut AgentRoster, id: AgentId, grid: &mut Grid, out: &mut CohortOutcome) {
    let Some(pos) = roster.get(id).filter(|a| a.alive).map(|a| a.position) else {
        return;
    };

    if grid.is_hazardous(pos) {
        if let Some(record) = roster
            .get_mut(id)
            .and_then(|a| kill(a, DeathCause::Hazard, None))
        {
            out.record_death(record);
        }
        return;
    }

    while let Some(victim) = roster.alive_at(pos, Some(id)) {
        let Some(record) = roster
            .get_mut(victim)
            .and_then(|a| kill(a, DeathCause::Collision, Some(id)))
        else {
            break;
        };
        out.record_death(record);
    }

    let Some(agent) = roster.get_mut(id) else {
        return;
    };
    agent.busy = false;
    if agent.arrived || !agent.is_goal_for(pos, grid) {
        return;
    }
    agent.arrived = true;
    debug!(agent = %id, %pos, "Priest reached its goal");
    out.events.push(RunEvent::AgentArrived { agent: id, pos });

    let opens_chest = grid.triggerable_at(pos).is_some_and(|t| !t.trap);
    if opens_chest && grid.arm(pos) {
        out.events.push(RunEvent::Armed { pos });
    }
}

/// Cast at the neighbouring cell in `dir`.
///
/// Lights a dormant fire pit or opens a chest there, and kills any living
/// priest standing on it. The caster never moves.
pub fn begin_cast(
    roster: &mut AgentRoster,
    id: AgentId,
    dir: Direction,
    grid: &mut Grid,
    out: &mut CohortOutcome,
) {
    let Some(origin) = roster.get_mut(id).map(|a| {
        a.busy = true;
        a.position
    }) else {
        return;
    };

    if let Some(target) = origin.step(dir) {
        out.events.push(RunEvent::AgentCast { agent: id, target });
        if grid.arm(target) {
            out.events.push(RunEvent::Armed { pos: target });
        }
        while let Some(victim) = roster.alive_at(target, Some(id)) {
            let Some(record) = roster
                .get_mut(victim)
                .and_then(|a| kill(a, DeathCause::Cast, Some(id)))
            else {
                break;
            };
            out.record_death(record);
        }
    }

    if let Some(agent) = roster.get_mut(id) {
        agent.busy = false;
    }
}
