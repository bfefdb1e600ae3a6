//! Command resolution for a cohort of priests.
//!
//! One lockstep step hands the same command to every priest of the active
//! cohort. Resolution runs in two phases, both in roster order:
//!
//! 1. **Begin**: every priest starts its command. Moves check passability
//!    and update the logical position immediately; casts resolve fully.
//! 2. **Settle**: every priest that moved and is still alive runs the
//!    post-move checks (hazard, collision, goal).
//!
//! A stationary occupant is therefore killed by whoever walks in, and when
//! two priests walk into the same cell the earlier one settles first and
//! survives.
//!
//! # Submodules
//!
//! - [`handlers`] -- Per-phase logic for moves and casts.

pub mod handlers;

use pyre_types::{AgentId, Command, RunEvent};
use pyre_world::Grid;
use tracing::debug;

use crate::agent::AgentRoster;
use crate::death::DeathRecord;
use crate::error::AgentError;

/// Everything that happened while resolving one command for a cohort.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CohortOutcome {
    /// Priests whose position changed, in roster order.
    pub moved: Vec<AgentId>,
    /// Deaths in the order they happened.
    pub deaths: Vec<DeathRecord>,
    /// Events in the order they happened.
    pub events: Vec<RunEvent>,
}

impl CohortOutcome {
    /// Number of priests that changed cell; each one counts as a step.
    pub fn step_count(&self) -> u32 {
        u32::try_from(self.moved.len()).unwrap_or(u32::MAX)
    }

    pub(crate) fn record_death(&mut self, record: DeathRecord) {
        self.events.push(record.event());
        self.deaths.push(record);
    }
}

/// Resolve `command` for every priest in `cohort`.
///
/// The cohort is reordered into roster order and deduplicated. Dead priests
/// are skipped.
///
/// # Errors
///
/// Returns [`AgentError::NotAnAgentCommand`] for `NoOp` and structural
/// blocks, or [`AgentError::AgentNotFound`] if an id is not on the roster.
/// Nothing is mutated when an error is returned.
pub fn resolve_cohort(
    roster: &mut AgentRoster,
    cohort: &[AgentId],
    command: Command,
    grid: &mut Grid,
) -> Result<CohortOutcome, AgentError> {
    if !command.is_agent_command() {
        return Err(AgentError::NotAnAgentCommand { command });
    }
    if let Some(missing) = cohort.iter().find(|id| roster.get(**id).is_none()) {
        return Err(AgentError::AgentNotFound(*missing));
    }

    let order = roster.in_roster_order(cohort.iter().copied());
    let mut out = CohortOutcome::default();
    let mut moved = Vec::new();

    // Begin
    for &id in &order {
        let Some(agent) = roster.get_mut(id) else {
            continue;
        };
        if !agent.alive {
            continue;
        }
        if agent.busy {
            debug!(agent = %id, "Clearing unfinished command");
            agent.busy = false;
        }
        match command {
            Command::Move(dir) => {
                if handlers::begin_move(roster, id, dir, grid, &mut out) {
                    moved.push(id);
                }
            }
            Command::Cast(dir) => handlers::begin_cast(roster, id, dir, grid, &mut out),
            _ => {}
        }
    }

    // Settle
    for &id in &moved {
        handlers::settle_move(roster, id, grid, &mut out);
    }

    out.moved = moved;
    Ok(out)
}

/// Resolve `command` for a single priest.
///
/// # Errors
///
/// Same as [`resolve_cohort`].
pub fn apply_command(
    roster: &mut AgentRoster,
    id: AgentId,
    command: Command,
    grid: &mut Grid,
) -> Result<CohortOutcome, AgentError> {
    resolve_cohort(roster, &[id], command, grid)
}
