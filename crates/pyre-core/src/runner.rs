//! Driving loop for one program run with run controls.
//!
//! [`run_program`] wraps [`Session::step`] and adds the control plane
//! around it:
//!
//! - **Pacing**: sleeps the nominal delay of each step, scaled by the
//!   current speed, unless realtime playback is off
//! - **Pause/resume**: the loop halts before the next step until resumed
//! - **Operator stop**: ends the run after the current step
//! - **Bounded runs**: ends the run after `max_ticks` engine steps, which
//!   is what ends a program that loops forever

use std::sync::Arc;

use chrono::{DateTime, Utc};
use pyre_types::{GameState, RunEvent, RunId, RunMetrics, RunState};
use serde::Serialize;
use tracing::{debug, info};

use crate::engine::StepReport;
use crate::operator::{EndReason, RunControl};
use crate::program::InstructionList;
use crate::session::Session;

/// Errors that can occur when driving a run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A run is already in progress on this session.
    #[error("a run is already in progress")]
    AlreadyRunning,

    /// The level has already been won or lost.
    #[error("level is over ({state:?}), reset it before running again")]
    GameOver {
        /// The terminal level state.
        state: GameState,
    },
}

/// Result of a driven run.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    /// Identifier of this run.
    pub run_id: RunId,
    /// Why the run ended.
    pub end_reason: EndReason,
    /// Counters at the end of the run.
    pub metrics: RunMetrics,
    /// Level outcome at the end of the run.
    pub game_state: GameState,
    /// Stars earned; zero unless the level was won.
    pub stars: u8,
    /// Wall-clock start.
    pub started_at: DateTime<Utc>,
    /// Wall-clock end.
    pub finished_at: DateTime<Utc>,
}

/// Callback invoked after each engine step.
///
/// Implementations can render the board, record events, or drive the
/// shared [`RunControl`].
pub trait StepObserver: Send {
    /// Called after each step with its report and the session after it.
    fn on_step(&mut self, report: &StepReport, session: &Session);
}

/// An observer that ignores every step.
pub struct NoOpObserver;

impl StepObserver for NoOpObserver {
    fn on_step(&mut self, _report: &StepReport, _session: &Session) {}
}

/// An observer that records every event in order.
#[derive(Debug, Default)]
pub struct EventLog {
    /// Events recorded so far.
    events: Vec<RunEvent>,
}

impl EventLog {
    /// Create an empty log.
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Events recorded so far.
    pub fn events(&self) -> &[RunEvent] {
        &self.events
    }

    /// Take the recorded events.
    pub fn into_events(self) -> Vec<RunEvent> {
        self.events
    }
}

impl StepObserver for EventLog {
    fn on_step(&mut self, report: &StepReport, _session: &Session) {
        self.events.extend(report.events.iter().cloned());
    }
}

/// Run `program` on `session` until it finishes or is stopped.
///
/// # Errors
///
/// Returns [`RunnerError::AlreadyRunning`] if the session is mid-run, or
/// [`RunnerError::GameOver`] if the level has already been won or lost.
/// Nothing is executed in either case.
pub async fn run_program(
    session: &mut Session,
    program: &InstructionList,
    control: &Arc<RunControl>,
    observer: &mut dyn StepObserver,
) -> Result<RunResult, RunnerError> {
    if !session.run_sequence(program) {
        return Err(if session.run_state() == RunState::Running {
            RunnerError::AlreadyRunning
        } else {
            RunnerError::GameOver {
                state: session.game_state(),
            }
        });
    }

    let run_id = RunId::new();
    let started_at = Utc::now();
    info!(
        %run_id,
        level = session.name(),
        blocks = program.len(),
        max_ticks = control.max_ticks(),
        speed_percent = control.speed_percent(),
        realtime = control.is_realtime(),
        "Run starting"
    );

    let end_reason = loop {
        // --- Check pause ---
        if control.is_paused() {
            info!(%run_id, "Run paused, waiting for resume...");
            control.wait_if_paused().await;
            info!(%run_id, "Run resumed");
        }

        // --- Check stop request (before step) ---
        if control.is_stop_requested() {
            info!(%run_id, "Operator stop requested");
            break halt(session, observer, EndReason::OperatorStop);
        }

        // --- Check step bound (before step) ---
        if control.tick_limit_reached(session.metrics().ticks) {
            info!(
                %run_id,
                ticks = session.metrics().ticks,
                max_ticks = control.max_ticks(),
                "Tick limit reached"
            );
            break halt(session, observer, EndReason::MaxTicksReached);
        }

        // --- Execute step ---
        let report = session.step();

        // --- Notify observer ---
        observer.on_step(&report, session);

        if report.is_finished() {
            break EndReason::Completed;
        }

        // --- Sleep for the step's duration ---
        if control.is_realtime() {
            let delay = control.scale(report.delay);
            if !delay.is_zero() {
                debug!(?delay, "Pacing");
                tokio::time::sleep(delay).await;
            }
        }
    };

    Ok(RunResult {
        run_id,
        end_reason,
        metrics: session.metrics(),
        game_state: session.game_state(),
        stars: session.stars(),
        started_at,
        finished_at: Utc::now(),
    })
}

/// Stop the engine and hand the closing events to the observer.
fn halt(session: &mut Session, observer: &mut dyn StepObserver, reason: EndReason) -> EndReason {
    if session.stop() {
        let report = session.step();
        observer.on_step(&report, session);
    }
    reason
}

/// Log the end of a driven run.
pub fn log_run_end(result: &RunResult) {
    let elapsed_ms = result
        .finished_at
        .signed_duration_since(result.started_at)
        .num_milliseconds();
    info!(
        run_id = %result.run_id,
        reason = ?result.end_reason,
        game_state = ?result.game_state,
        steps = result.metrics.step_count,
        blocks = result.metrics.instruction_count,
        ticks = result.metrics.ticks,
        loop_jumps = result.metrics.loop_jumps,
        stars = result.stars,
        elapsed_ms,
        "Run ended"
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pyre_types::{AgentId, AgentSpec, Command, Direction, GridPos};
    use pyre_world::LevelLayout;

    use super::*;
    use crate::config::{RunConfig, TimingConfig};

    fn session() -> Session {
        let mut layout = LevelLayout::empty(8, 8);
        layout.agents = vec![AgentSpec {
            id: AgentId(1),
            start: GridPos::new(1, 1),
            goal: Some(GridPos::new(3, 1)),
        }];
        Session::new(&layout, TimingConfig::default()).unwrap()
    }

    fn control(max_ticks: u64) -> Arc<RunControl> {
        Arc::new(RunControl::new(&RunConfig {
            max_ticks,
            realtime: false,
            ..RunConfig::default()
        }))
    }

    fn forever() -> InstructionList {
        vec![
            Command::LoopStart,
            Command::Move(Direction::Up),
            Command::Move(Direction::Down),
            Command::LoopEnd,
        ]
        .into()
    }

    #[tokio::test]
    async fn completes_and_scores() {
        let mut session = session();
        let program: InstructionList = vec![
            Command::Move(Direction::Right),
            Command::Move(Direction::Right),
        ]
        .into();
        let mut log = EventLog::new();

        let result = run_program(&mut session, &program, &control(0), &mut log)
            .await
            .unwrap();

        assert_eq!(result.end_reason, EndReason::Completed);
        assert_eq!(result.game_state, GameState::Succeeded);
        assert_eq!(result.stars, 3);
        assert_eq!(result.metrics.step_count, 2);
        assert!(result.started_at <= result.finished_at);
        assert_eq!(
            log.events().first(),
            Some(&RunEvent::RunStateChanged {
                state: RunState::Running
            })
        );
        assert_eq!(
            log.events().last(),
            Some(&RunEvent::RunStateChanged {
                state: RunState::Finished
            })
        );
    }

    #[tokio::test]
    async fn bounded_by_max_ticks() {
        let mut session = session();
        let result = run_program(&mut session, &forever(), &control(25), &mut NoOpObserver)
            .await
            .unwrap();

        assert_eq!(result.end_reason, EndReason::MaxTicksReached);
        assert_eq!(result.metrics.ticks, 25);
        assert_eq!(result.game_state, GameState::Playing);
        assert_eq!(result.stars, 0);
        assert_eq!(session.run_state(), RunState::Finished);
    }

    #[tokio::test]
    async fn operator_stop_before_first_step() {
        let mut session = session();
        let control = control(0);
        control.request_stop();
        let mut log = EventLog::new();

        let result = run_program(&mut session, &forever(), &control, &mut log)
            .await
            .unwrap();

        assert_eq!(result.end_reason, EndReason::OperatorStop);
        assert_eq!(result.metrics.ticks, 0);
        assert_eq!(
            log.into_events(),
            vec![
                RunEvent::RunStateChanged {
                    state: RunState::Running
                },
                RunEvent::RunStateChanged {
                    state: RunState::Finished
                },
            ]
        );
    }

    #[tokio::test]
    async fn finished_level_refuses_new_runs() {
        let mut session = session();
        let program: InstructionList = vec![
            Command::Move(Direction::Right),
            Command::Move(Direction::Right),
        ]
        .into();
        run_program(&mut session, &program, &control(0), &mut NoOpObserver)
            .await
            .unwrap();

        let err = run_program(&mut session, &program, &control(0), &mut NoOpObserver)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RunnerError::GameOver {
                state: GameState::Succeeded
            }
        ));
    }

    #[tokio::test]
    async fn mid_run_session_refuses_a_second_driver() {
        let mut session = session();
        assert!(session.run_sequence(&forever()));
        let err = run_program(&mut session, &forever(), &control(0), &mut NoOpObserver)
            .await
            .unwrap_err();
        assert!(matches!(err, RunnerError::AlreadyRunning));
    }
}
