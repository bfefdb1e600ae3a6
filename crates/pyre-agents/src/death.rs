//! Priest death.
//!
//! Death is terminal for the rest of the run. Killing a priest that is
//! already dead changes nothing and produces no record, so a death can
//! only ever raise the fail signal once.

use pyre_types::{AgentId, DeathCause, GridPos, RunEvent};
use tracing::info;

use crate::agent::Agent;

/// What happened when a priest died.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeathRecord {
    /// The victim.
    pub agent: AgentId,
    /// Where it died.
    pub pos: GridPos,
    /// What killed it.
    pub cause: DeathCause,
    /// The priest responsible, for collisions and casts.
    pub by: Option<AgentId>,
}

impl DeathRecord {
    /// The event announcing this death.
    pub const fn event(&self) -> RunEvent {
        RunEvent::AgentDied {
            agent: self.agent,
            pos: self.pos,
            cause: self.cause,
            by: self.by,
        }
    }
}

/// Kill `agent`.
///
/// Returns `None` if it was already dead.
pub fn kill(agent: &mut Agent, cause: DeathCause, by: Option<AgentId>) -> Option<DeathRecord> {
    if !agent.alive {
        return None;
    }
    agent.alive = false;
    agent.busy = false;

    info!(
        agent = %agent.id,
        pos = %agent.position,
        %cause,
        by = ?by,
        "Priest died"
    );

    Some(DeathRecord {
        agent: agent.id,
        pos: agent.position,
        cause,
        by,
    })
}
