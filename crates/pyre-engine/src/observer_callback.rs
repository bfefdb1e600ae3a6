//! Step observer that narrates a run and keeps its event trail.
//!
//! Every event is logged at debug level; deaths and level outcomes are
//! logged at info so a default log level shows how the run went.

use pyre_core::{EventLog, Session, StepObserver, StepReport};
use pyre_types::{Command, RunEvent};
use tracing::{debug, info};

/// Observer used by the binary for the report.
#[derive(Debug, Default)]
pub struct ReportCallback {
    log: EventLog,
    steps: u64,
}

impl ReportCallback {
    /// Create an empty callback.
    pub const fn new() -> Self {
        Self {
            log: EventLog::new(),
            steps: 0,
        }
    }

    /// Number of steps observed.
    pub const fn steps(&self) -> u64 {
        self.steps
    }

    /// Take the recorded events.
    pub fn into_events(self) -> Vec<RunEvent> {
        self.log.into_events()
    }
}

impl StepObserver for ReportCallback {
    fn on_step(&mut self, report: &StepReport, session: &Session) {
        self.steps = self.steps.saturating_add(1);
        debug!(
            index = ?report.index,
            command = report.command.as_ref().map(Command::label),
            steps_taken = report.steps_taken,
            active = session.active_agents().len(),
            "Step"
        );

        for event in &report.events {
            match event {
                RunEvent::AgentDied {
                    agent, pos, cause, ..
                } => info!(%agent, %pos, %cause, "Priest lost"),
                RunEvent::GameStateChanged { state } => info!(?state, "Level outcome"),
                other => debug!(event = ?other, "Event"),
            }
        }

        self.log.on_step(report, session);
    }
}
