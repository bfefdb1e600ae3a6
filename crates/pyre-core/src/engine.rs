//! The lockstep scheduler that walks an instruction list.
//!
//! One call to [`Engine::step`] executes exactly one block:
//!
//! 1. **Abort check**: if the level has already been won or lost, the run
//!    finishes without executing anything else.
//! 2. **Structural blocks**: `LoopEnd`, `IfStart`, `Else` and `EndIf` update
//!    the instruction pointer, the active set and the scope stack.
//! 3. **Dispatch**: `Move` and `Cast` go to every active priest that is
//!    alive and has not finished, resolved together by
//!    [`pyre_agents::resolve_cohort`]. The level outcome is re-evaluated
//!    right after.
//! 4. **Finish**: reaching the end of the list or ending the level moves
//!    the engine to `Finished`.
//!
//! The engine never sleeps. Each [`StepReport`] carries the nominal delay
//! of its step; the driver decides whether and how long to wait.

use std::time::Duration;

use pyre_agents::{AgentRoster, resolve_cohort};
use pyre_types::{AgentId, Command, Condition, GameState, RunEvent, RunMetrics, RunState};
use pyre_world::Grid;
use tracing::{debug, info, warn};

use crate::condition;
use crate::config::TimingConfig;
use crate::control_flow::{BranchScope, ScopeStack, find_matching_loop_start};
use crate::game_state::GameStateMachine;
use crate::program::InstructionList;

/// The level state a step acts on.
#[derive(Debug)]
pub struct StepContext<'a> {
    /// The map; arming mutates it.
    pub grid: &'a mut Grid,
    /// The priests.
    pub roster: &'a mut AgentRoster,
    /// The level outcome.
    pub game: &'a mut GameStateMachine,
}

/// What one engine step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    /// Index of the block executed, if any.
    pub index: Option<usize>,
    /// The block executed, if any.
    pub command: Option<Command>,
    /// Events in the order they happened.
    pub events: Vec<RunEvent>,
    /// Nominal duration of this step.
    pub delay: Duration,
    /// Priests that changed cell during this step.
    pub steps_taken: u32,
    /// Engine state after the step.
    pub run_state: RunState,
    /// Level outcome after the step.
    pub game_state: GameState,
}

impl StepReport {
    const fn empty(run_state: RunState, game_state: GameState) -> Self {
        Self {
            index: None,
            command: None,
            events: Vec::new(),
            delay: Duration::ZERO,
            steps_taken: 0,
            run_state,
            game_state,
        }
    }

    /// Whether the run is over after this step.
    pub const fn is_finished(&self) -> bool {
        matches!(self.run_state, RunState::Finished)
    }
}

/// Run-scoped execution state.
#[derive(Debug, Clone)]
pub struct Engine {
    /// Nominal step durations.
    timing: TimingConfig,
    /// Snapshot taken when the run started.
    program: InstructionList,
    /// Index of the next block.
    pointer: usize,
    /// Priests eligible for the next dispatch.
    active: Vec<AgentId>,
    /// Open branch scopes.
    scopes: ScopeStack,
    /// Lifecycle.
    run_state: RunState,
    /// Counters for the current run.
    metrics: RunMetrics,
    /// Events raised outside [`Self::step`], flushed into the next report.
    pending: Vec<RunEvent>,
}

impl Engine {
    /// Create an idle engine.
    pub const fn new(timing: TimingConfig) -> Self {
        Self {
            timing,
            program: InstructionList::new(),
            pointer: 0,
            active: Vec::new(),
            scopes: ScopeStack::new(),
            run_state: RunState::Idle,
            metrics: RunMetrics {
                step_count: 0,
                instruction_count: 0,
                ticks: 0,
                loop_jumps: 0,
            },
            pending: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Current lifecycle state.
    pub const fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Counters for the current (or last) run.
    pub const fn metrics(&self) -> RunMetrics {
        self.metrics
    }

    /// Index of the next block.
    pub const fn pointer(&self) -> usize {
        self.pointer
    }

    /// Priests eligible for the next dispatch, in roster order.
    pub fn active(&self) -> &[AgentId] {
        &self.active
    }

    /// Number of open branch scopes.
    pub const fn scope_depth(&self) -> usize {
        self.scopes.depth()
    }

    /// Nominal step durations.
    pub const fn timing(&self) -> TimingConfig {
        self.timing
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Start a run of `program`.
    ///
    /// Refused while a run is in progress or once the level is over.
    /// Returns `true` if the run started.
    pub fn start(
        &mut self,
        program: &InstructionList,
        roster: &AgentRoster,
        game: &GameStateMachine,
    ) -> bool {
        if self.run_state == RunState::Running {
            debug!("Run already in progress, request ignored");
            return false;
        }
        if !game.is_playing() {
            debug!(state = ?game.state(), "Level is over, request ignored");
            return false;
        }

        for diagnostic in program.validate() {
            warn!(%diagnostic, "Malformed program, block will be skipped");
        }

        self.program = program.clone();
        self.pointer = 0;
        self.active = roster.iter().filter(|a| a.alive).map(|a| a.id).collect();
        self.scopes.clear();
        self.metrics = RunMetrics {
            instruction_count: u32::try_from(program.len()).unwrap_or(u32::MAX),
            ..RunMetrics::default()
        };
        self.run_state = RunState::Running;
        self.pending.push(RunEvent::RunStateChanged {
            state: RunState::Running,
        });

        info!(
            blocks = program.len(),
            priests = self.active.len(),
            "Run started"
        );
        true
    }

    /// Stop the current run. Already applied state stands.
    ///
    /// Returns `true` if a run was in progress.
    pub fn stop(&mut self) -> bool {
        if self.run_state != RunState::Running {
            return false;
        }
        self.run_state = RunState::Finished;
        self.pending.push(RunEvent::RunStateChanged {
            state: RunState::Finished,
        });
        info!(
            pointer = self.pointer,
            steps = self.metrics.step_count,
            ticks = self.metrics.ticks,
            "Run stopped"
        );
        true
    }

    /// Back to `Idle` with empty state.
    pub fn reset(&mut self) {
        *self = Self::new(self.timing);
    }

    fn finish(&mut self, report: &mut StepReport) {
        self.run_state = RunState::Finished;
        report.events.push(RunEvent::RunStateChanged {
            state: RunState::Finished,
        });
        info!(
            steps = self.metrics.step_count,
            blocks = self.metrics.instruction_count,
            ticks = self.metrics.ticks,
            loop_jumps = self.metrics.loop_jumps,
            "Run finished"
        );
    }

    // -----------------------------------------------------------------------
    // Step
    // -----------------------------------------------------------------------

    /// Execute one block.
    ///
    /// Outside a run this only flushes pending lifecycle events.
    pub fn step(&mut self, ctx: &mut StepContext<'_>) -> StepReport {
        let mut report = StepReport::empty(self.run_state, ctx.game.state());
        report.events.append(&mut self.pending);
        if self.run_state != RunState::Running {
            return report;
        }

        self.metrics.ticks = self.metrics.ticks.saturating_add(1);

        if !ctx.game.is_playing() {
            debug!(state = ?ctx.game.state(), "Level over, aborting run");
            self.finish(&mut report);
            report.run_state = self.run_state;
            return report;
        }

        let Some(command) = self.program.get(self.pointer) else {
            self.finish(&mut report);
            report.run_state = self.run_state;
            return report;
        };

        let index = self.pointer;
        report.index = Some(index);
        report.command = Some(command);
        let mut next = index.saturating_add(1);

        match command {
            Command::NoOp | Command::LoopStart => {}
            Command::LoopEnd => {
                if let Some(start) = find_matching_loop_start(self.program.as_slice(), index) {
                    next = start.saturating_add(1);
                    self.metrics.loop_jumps = self.metrics.loop_jumps.saturating_add(1);
                    report.events.push(RunEvent::LoopJumped {
                        from: block_number(index),
                        to: block_number(start),
                    });
                    report.delay = self.timing.loop_delay();
                } else {
                    warn!(index, "Loop end without loop start ignored");
                }
            }
            Command::IfStart(condition) => {
                self.open_branch(index, &condition, ctx, &mut report);
                report.delay = self.timing.loop_delay();
            }
            Command::Else => {
                if self.switch_branch() {
                    report.delay = self.timing.loop_delay();
                } else {
                    warn!(index, "Else outside an if ignored");
                }
            }
            Command::EndIf => self.close_branch(index, ctx, &mut report),
            Command::Move(_) | Command::Cast(_) => {
                if self.dispatch(command, ctx, &mut report) > 0 {
                    report.delay = self.timing.step_duration();
                }
            }
        }

        self.pointer = next;
        if !ctx.game.is_playing() || self.pointer >= self.program.len() {
            self.finish(&mut report);
        }

        report.run_state = self.run_state;
        report.game_state = ctx.game.state();
        report
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// Offer `command` to the active priests. Returns the cohort size.
    fn dispatch(
        &mut self,
        command: Command,
        ctx: &mut StepContext<'_>,
        report: &mut StepReport,
    ) -> usize {
        let mut cohort = Vec::with_capacity(self.active.len());
        for &id in &self.active {
            let Some(agent) = ctx.roster.get(id) else {
                continue;
            };
            if !agent.alive {
                continue;
            }
            if agent.is_finished(ctx.grid) {
                debug!(agent = %id, "Priest finished, skipped");
                continue;
            }
            cohort.push(id);
        }

        match resolve_cohort(ctx.roster, &cohort, command, ctx.grid) {
            Ok(outcome) => {
                let steps = outcome.step_count();
                self.metrics.step_count = self.metrics.step_count.saturating_add(steps);
                report.steps_taken = steps;
                report.events.extend(outcome.events);
                debug!(
                    command = command.label(),
                    cohort = cohort.len(),
                    steps,
                    deaths = outcome.deaths.len(),
                    "Command dispatched"
                );
            }
            Err(err) => warn!(%err, "Dispatch rejected"),
        }

        if let Some(state) = ctx.game.evaluate(ctx.roster) {
            report.events.push(RunEvent::GameStateChanged { state });
        }
        cohort.len()
    }

    // -----------------------------------------------------------------------
    // Branches
    // -----------------------------------------------------------------------

    fn open_branch(
        &mut self,
        index: usize,
        condition: &Condition,
        ctx: &StepContext<'_>,
        report: &mut StepReport,
    ) {
        let mut scope = BranchScope {
            if_index: index,
            ..BranchScope::default()
        };

        for &id in &self.active {
            let Some(agent) = ctx.roster.get(id) else {
                continue;
            };
            if !agent.alive {
                continue;
            }
            if agent.is_finished(ctx.grid) {
                scope.parked.push(id);
            } else if condition::evaluate(condition, agent, ctx.grid, ctx.roster) {
                scope.true_group.push(id);
            } else {
                scope.false_group.push(id);
            }
        }

        debug!(
            index,
            true_group = scope.true_group.len(),
            false_group = scope.false_group.len(),
            parked = scope.parked.len(),
            "Branch opened"
        );
        report.events.push(RunEvent::BranchOpened {
            index: block_number(index),
            true_count: group_size(&scope.true_group),
            false_count: group_size(&scope.false_group),
        });

        self.active.clone_from(&scope.true_group);
        self.scopes.push(scope);
    }

    fn switch_branch(&mut self) -> bool {
        let Some(scope) = self.scopes.innermost() else {
            return false;
        };
        self.active.clone_from(&scope.false_group);
        true
    }

    fn close_branch(&mut self, index: usize, ctx: &StepContext<'_>, report: &mut StepReport) {
        let Some(scope) = self.scopes.pop() else {
            warn!(index, "End if outside an if ignored");
            return;
        };

        self.active = ctx
            .roster
            .in_roster_order(scope.members())
            .into_iter()
            .filter(|id| ctx.roster.get(*id).is_some_and(|a| a.alive))
            .collect();

        debug!(index, opened_at = scope.if_index, active = self.active.len(), "Branch closed");
        report.events.push(RunEvent::BranchClosed {
            index: block_number(index),
            active_count: group_size(&self.active),
        });
    }
}

fn block_number(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX)
}

fn group_size(group: &[AgentId]) -> u32 {
    u32::try_from(group.len()).unwrap_or(u32::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pyre_types::{AgentSpec, Direction, GridPos, TargetType, TriggerableKind, TriggerableSpec};
    use pyre_world::LevelLayout;

    use super::*;

    struct Fixture {
        grid: Grid,
        roster: AgentRoster,
        game: GameStateMachine,
        engine: Engine,
    }

    impl Fixture {
        fn new(layout: &LevelLayout) -> Self {
            let grid = Grid::from_layout(layout).unwrap();
            let roster = AgentRoster::from_specs(&layout.agents, &grid).unwrap();
            Self {
                grid,
                roster,
                game: GameStateMachine::new(),
                engine: Engine::new(TimingConfig::default()),
            }
        }

        fn start(&mut self, commands: Vec<Command>) -> bool {
            self.engine
                .start(&InstructionList::from(commands), &self.roster, &self.game)
        }

        fn step(&mut self) -> StepReport {
            let mut ctx = StepContext {
                grid: &mut self.grid,
                roster: &mut self.roster,
                game: &mut self.game,
            };
            self.engine.step(&mut ctx)
        }
    }

    fn priests(positions: &[(i32, i32)]) -> LevelLayout {
        let mut layout = LevelLayout::empty(8, 8);
        layout.agents = positions
            .iter()
            .zip(1_u32..)
            .map(|(&(x, y), id)| AgentSpec {
                id: AgentId(id),
                start: GridPos::new(x, y),
                goal: None,
            })
            .collect();
        layout
    }

    #[test]
    fn delays_follow_block_kind() {
        let mut f = Fixture::new(&priests(&[(2, 2)]));
        assert!(f.start(vec![
            Command::NoOp,
            Command::IfStart(Condition::default()),
            Command::Else,
            Command::EndIf,
            Command::Move(Direction::Up),
        ]));
        let delays: Vec<u64> = (0..5)
            .map(|_| u64::try_from(f.step().delay.as_millis()).unwrap())
            .collect();
        assert_eq!(delays, vec![0, 100, 100, 0, 800]);
        assert_eq!(f.engine.run_state(), RunState::Finished);
    }

    #[test]
    fn dispatch_to_an_empty_branch_costs_no_time() {
        // No fire under the priest, so the true branch is empty.
        let mut f = Fixture::new(&priests(&[(2, 2)]));
        assert!(f.start(vec![
            Command::IfStart(Condition::default()),
            Command::Move(Direction::Up),
            Command::Else,
            Command::Move(Direction::Up),
            Command::EndIf,
        ]));
        f.step();
        let empty = f.step();
        assert_eq!(empty.delay, Duration::ZERO);
        assert_eq!(empty.steps_taken, 0);
        f.step();
        let taken = f.step();
        assert_eq!(taken.delay, Duration::from_millis(800));
        assert_eq!(taken.steps_taken, 1);
    }

    #[test]
    fn first_report_announces_the_run() {
        let mut f = Fixture::new(&priests(&[(2, 2)]));
        assert!(f.start(vec![Command::NoOp]));
        let report = f.step();
        assert_eq!(
            report.events.first(),
            Some(&RunEvent::RunStateChanged {
                state: RunState::Running
            })
        );
        assert!(report.is_finished());
    }

    #[test]
    fn loop_jump_resumes_after_loop_start() {
        let mut f = Fixture::new(&priests(&[(2, 1)]));
        f.start(vec![
            Command::LoopStart,
            Command::Move(Direction::Up),
            Command::LoopEnd,
        ]);
        let indices: Vec<Option<usize>> = (0..6).map(|_| f.step().index).collect();
        assert_eq!(
            indices,
            vec![Some(0), Some(1), Some(2), Some(1), Some(2), Some(1)]
        );
        assert_eq!(f.engine.metrics().loop_jumps, 2);
        assert_eq!(f.engine.metrics().step_count, 3);
    }

    #[test]
    fn unmatched_markers_are_noops() {
        let mut f = Fixture::new(&priests(&[(2, 2)]));
        f.start(vec![
            Command::LoopEnd,
            Command::Else,
            Command::EndIf,
            Command::Move(Direction::Right),
        ]);
        for _ in 0..3 {
            let report = f.step();
            assert_eq!(report.delay, Duration::ZERO);
            assert_eq!(f.engine.active(), &[AgentId(1)]);
        }
        f.step();
        assert_eq!(f.roster.get(AgentId(1)).unwrap().position, GridPos::new(3, 2));
    }

    #[test]
    fn nested_branches_restore_each_level() {
        // Fire above priest 1 only; a wall right of priest 2 only.
        let mut layout = priests(&[(2, 2), (5, 2), (2, 5)]);
        layout.walls = vec!["6,2".to_owned()];
        layout.triggerables = vec![TriggerableSpec {
            pos: GridPos::new(2, 3),
            kind: TriggerableKind::FirePit,
            armed: false,
            trap: false,
        }];
        let mut f = Fixture::new(&layout);
        f.start(vec![
            Command::IfStart(Condition::looking(Direction::Up, TargetType::Fire).negated()),
            Command::IfStart(Condition::looking(Direction::Right, TargetType::Wall)),
            Command::NoOp,
            Command::EndIf,
            Command::NoOp,
            Command::EndIf,
        ]);

        f.step();
        assert_eq!(f.engine.active(), &[AgentId(2), AgentId(3)]);
        f.step();
        assert_eq!(f.engine.active(), &[AgentId(2)]);
        assert_eq!(f.engine.scope_depth(), 2);
        f.step();
        f.step();
        assert_eq!(f.engine.active(), &[AgentId(2), AgentId(3)]);
        f.step();
        f.step();
        assert_eq!(f.engine.active(), &[AgentId(1), AgentId(2), AgentId(3)]);
        assert_eq!(f.engine.scope_depth(), 0);
    }

    #[test]
    fn rerun_is_refused_while_running_and_after_failure() {
        let mut layout = priests(&[(2, 2)]);
        layout.hazards = vec!["2,3".to_owned()];
        let mut f = Fixture::new(&layout);
        assert!(f.start(vec![Command::Move(Direction::Up), Command::NoOp]));
        assert!(!f.start(vec![Command::NoOp]));

        let report = f.step();
        assert_eq!(report.game_state, GameState::Failed);
        assert!(report.is_finished());
        assert!(report.events.contains(&RunEvent::GameStateChanged {
            state: GameState::Failed
        }));
        assert!(!f.start(vec![Command::NoOp]));
    }

    #[test]
    fn stop_keeps_applied_state() {
        let mut f = Fixture::new(&priests(&[(2, 2)]));
        f.start(vec![
            Command::Move(Direction::Up),
            Command::Move(Direction::Up),
        ]);
        f.step();
        assert!(f.engine.stop());
        assert!(!f.engine.stop());
        let report = f.step();
        assert_eq!(report.index, None);
        assert_eq!(
            report.events,
            vec![RunEvent::RunStateChanged {
                state: RunState::Finished
            }]
        );
        assert_eq!(f.roster.get(AgentId(1)).unwrap().position, GridPos::new(2, 3));
        assert_eq!(f.engine.metrics().step_count, 1);

        // A finished engine accepts a new run.
        assert!(f.start(vec![Command::Move(Direction::Down)]));
        f.step();
        assert_eq!(f.roster.get(AgentId(1)).unwrap().position, GridPos::new(2, 2));
        assert_eq!(f.engine.metrics().step_count, 1);
    }
}
