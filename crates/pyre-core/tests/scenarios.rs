//! End-to-end level scenarios run through [`Session`] and [`run_program`].
//!
//! Every run here uses `realtime: false`, so the driver never sleeps and
//! the tests finish instantly.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use pyre_agents::kill;
use pyre_core::{
    EndReason, EventLog, InstructionList, NoOpObserver, RunConfig, RunControl, Session,
    StepObserver, StepReport, TimingConfig, run_program,
};
use pyre_types::{
    AgentId, AgentSpec, Command, Condition, DeathCause, Direction, GameState, GridPos, RunEvent,
    TargetType, TriggerableKind, TriggerableSpec,
};
use pyre_world::LevelLayout;

// =============================================================================
// Helpers
// =============================================================================

fn level(priests: &[(i32, i32)]) -> LevelLayout {
    let mut layout = LevelLayout::empty(10, 10);
    layout.agents = priests
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

fn session(layout: &LevelLayout) -> Session {
    Session::new(layout, TimingConfig::default()).unwrap()
}

fn control() -> Arc<RunControl> {
    Arc::new(RunControl::new(&RunConfig {
        realtime: false,
        ..RunConfig::default()
    }))
}

fn position(session: &Session, id: u32) -> GridPos {
    session.roster().get(AgentId(id)).unwrap().position
}

fn alive(session: &Session, id: u32) -> bool {
    session.roster().get(AgentId(id)).unwrap().alive
}

async fn run(session: &mut Session, commands: Vec<Command>) -> pyre_core::RunResult {
    run_program(
        session,
        &InstructionList::from(commands),
        &control(),
        &mut NoOpObserver,
    )
    .await
    .unwrap()
}

/// Requests a stop once a given number of blocks of one kind have run.
struct StopAfter {
    control: Arc<RunControl>,
    command: Command,
    remaining: u32,
}

impl StepObserver for StopAfter {
    fn on_step(&mut self, report: &StepReport, _session: &Session) {
        if report.command == Some(self.command) {
            self.remaining = self.remaining.saturating_sub(1);
            if self.remaining == 0 {
                self.control.request_stop();
            }
        }
    }
}

// =============================================================================
// Movement
// =============================================================================

#[tokio::test]
async fn blocked_second_move_keeps_position_and_step_count() {
    let mut layout = level(&[(1, 1)]);
    layout.walls = vec!["3,1".to_owned()];
    let mut s = session(&layout);

    let result = run(
        &mut s,
        vec![Command::Move(Direction::Right), Command::Move(Direction::Right)],
    )
    .await;

    assert_eq!(position(&s, 1), GridPos::new(2, 1));
    assert!(alive(&s, 1));
    assert_eq!(result.metrics.step_count, 1);
    assert_eq!(result.metrics.instruction_count, 2);
    assert_eq!(result.end_reason, EndReason::Completed);
    assert_eq!(result.game_state, GameState::Playing);
}

#[tokio::test]
async fn walking_into_a_hazard_fails_the_level() {
    let mut layout = level(&[(2, 2)]);
    layout.hazards = vec!["2,3".to_owned()];
    let mut s = session(&layout);
    let mut log = EventLog::new();

    let result = run_program(
        &mut s,
        &InstructionList::from(vec![
            Command::Move(Direction::Up),
            Command::Move(Direction::Up),
        ]),
        &control(),
        &mut log,
    )
    .await
    .unwrap();

    assert!(!alive(&s, 1));
    assert_eq!(result.game_state, GameState::Failed);
    assert_eq!(result.stars, 0);
    // The second move never runs.
    assert_eq!(result.metrics.ticks, 1);
    assert!(log.events().contains(&RunEvent::AgentDied {
        agent: AgentId(1),
        pos: GridPos::new(2, 3),
        cause: DeathCause::Hazard,
        by: None,
    }));
}

#[tokio::test]
async fn lit_fire_pit_is_deadly_and_unlit_is_not() {
    let mut layout = level(&[(2, 2), (6, 2)]);
    layout.triggerables = vec![
        TriggerableSpec {
            pos: GridPos::new(2, 3),
            kind: TriggerableKind::FirePit,
            armed: false,
            trap: false,
        },
        TriggerableSpec {
            pos: GridPos::new(6, 4),
            kind: TriggerableKind::FirePit,
            armed: true,
            trap: false,
        },
    ];
    let mut s = session(&layout);

    let result = run(&mut s, vec![Command::Move(Direction::Up)]).await;
    assert!(alive(&s, 1));
    assert!(alive(&s, 2));
    assert_eq!(result.game_state, GameState::Playing);

    let result = run(&mut s, vec![Command::Move(Direction::Up)]).await;
    assert!(alive(&s, 1));
    assert!(!alive(&s, 2));
    assert_eq!(result.game_state, GameState::Failed);
}

// =============================================================================
// Collisions
// =============================================================================

#[tokio::test]
async fn same_cell_collision_keeps_the_earlier_priest() {
    let mut s = session(&level(&[(3, 3), (3, 3)]));
    let result = run(&mut s, vec![Command::Move(Direction::Right)]).await;

    assert!(alive(&s, 1));
    assert!(!alive(&s, 2));
    assert_eq!(position(&s, 1), GridPos::new(4, 3));
    assert_eq!(result.game_state, GameState::Failed);
}

#[tokio::test]
async fn mover_survives_and_occupant_dies() {
    let mut layout = level(&[(4, 3), (3, 3)]);
    layout.walls = vec!["5,3".to_owned()];
    let mut s = session(&layout);

    let result = run(&mut s, vec![Command::Move(Direction::Right)]).await;

    // Priest 1 is blocked by the wall; priest 2 walks into it.
    assert!(!alive(&s, 1));
    assert!(alive(&s, 2));
    assert_eq!(position(&s, 2), GridPos::new(4, 3));
    assert_eq!(result.metrics.step_count, 1);
    assert_eq!(result.game_state, GameState::Failed);
}

#[tokio::test]
async fn casting_at_a_priest_kills_it() {
    let mut s = session(&level(&[(3, 3), (4, 3)]));
    let result = run(&mut s, vec![Command::Cast(Direction::Right)]).await;
    assert!(!alive(&s, 2));
    assert_eq!(result.game_state, GameState::Failed);
}

// =============================================================================
// Loops and stopping
// =============================================================================

#[tokio::test]
async fn endless_loop_stopped_after_three_passes() {
    let mut s = session(&level(&[(2, 1)]));
    let control = control();
    let mut observer = StopAfter {
        control: Arc::clone(&control),
        command: Command::Move(Direction::Up),
        remaining: 3,
    };

    let result = run_program(
        &mut s,
        &InstructionList::from(vec![
            Command::LoopStart,
            Command::Move(Direction::Up),
            Command::LoopEnd,
        ]),
        &control,
        &mut observer,
    )
    .await
    .unwrap();

    assert_eq!(result.end_reason, EndReason::OperatorStop);
    assert_eq!(position(&s, 1), GridPos::new(2, 4));
    assert_eq!(result.metrics.step_count, 3);
    assert_eq!(result.metrics.loop_jumps, 2);
}

#[tokio::test]
async fn endless_loop_blocked_midway_counts_only_real_moves() {
    let mut layout = level(&[(2, 1)]);
    layout.walls = vec!["2,3".to_owned()];
    let mut s = session(&layout);
    let control = control();
    let mut observer = StopAfter {
        control: Arc::clone(&control),
        command: Command::Move(Direction::Up),
        remaining: 3,
    };

    let result = run_program(
        &mut s,
        &InstructionList::from(vec![
            Command::LoopStart,
            Command::Move(Direction::Up),
            Command::LoopEnd,
        ]),
        &control,
        &mut observer,
    )
    .await
    .unwrap();

    assert_eq!(result.end_reason, EndReason::OperatorStop);
    assert_eq!(position(&s, 1), GridPos::new(2, 2));
    assert_eq!(result.metrics.step_count, 1);
}

#[tokio::test]
async fn step_bound_ends_an_endless_loop() {
    let mut s = session(&level(&[(2, 2)]));
    let control = Arc::new(RunControl::new(&RunConfig {
        max_ticks: 100,
        realtime: false,
        ..RunConfig::default()
    }));
    let result = run_program(
        &mut s,
        &InstructionList::from(vec![Command::LoopStart, Command::NoOp, Command::LoopEnd]),
        &control,
        &mut NoOpObserver,
    )
    .await
    .unwrap();
    assert_eq!(result.end_reason, EndReason::MaxTicksReached);
    assert_eq!(result.metrics.ticks, 100);
}

// =============================================================================
// Branches
// =============================================================================

#[tokio::test]
async fn if_else_splits_then_merges() {
    // Priest A has a fire pit above it; priest B does not.
    let mut layout = level(&[(2, 4), (6, 4)]);
    layout.triggerables = vec![TriggerableSpec {
        pos: GridPos::new(2, 5),
        kind: TriggerableKind::FirePit,
        armed: false,
        trap: false,
    }];
    let mut s = session(&layout);

    run(
        &mut s,
        vec![
            Command::IfStart(Condition::looking(Direction::Up, TargetType::Fire)),
            Command::Move(Direction::Up),
            Command::Else,
            Command::Move(Direction::Down),
            Command::EndIf,
            Command::Move(Direction::Right),
        ],
    )
    .await;

    assert_eq!(position(&s, 1), GridPos::new(3, 5));
    assert_eq!(position(&s, 2), GridPos::new(7, 3));
    assert_eq!(s.metrics().step_count, 4);
}

// =============================================================================
// Outcome
// =============================================================================

#[tokio::test]
async fn all_priests_arriving_wins_and_scores() {
    let mut layout = level(&[(1, 1), (1, 3)]);
    layout.agents[0].goal = Some(GridPos::new(3, 1));
    layout.agents[1].goal = Some(GridPos::new(4, 3));
    layout.stars.max_lines_for_extra_star = 3;
    layout.stars.max_steps_for_extra_star = 5;
    let mut s = session(&layout);

    let result = run(
        &mut s,
        vec![
            Command::LoopStart,
            Command::Move(Direction::Right),
            Command::LoopEnd,
        ],
    )
    .await;

    // Priest 1 parks on its goal after two moves; priest 2 walks on.
    assert_eq!(position(&s, 1), GridPos::new(3, 1));
    assert_eq!(position(&s, 2), GridPos::new(4, 3));
    assert_eq!(result.game_state, GameState::Succeeded);
    assert_eq!(result.end_reason, EndReason::Completed);
    assert_eq!(result.metrics.step_count, 5);
    assert_eq!(result.stars, 3);
}

#[tokio::test]
async fn partial_arrival_keeps_playing() {
    let mut layout = level(&[(1, 1), (1, 5)]);
    layout.agents[0].goal = Some(GridPos::new(2, 1));
    let mut s = session(&layout);

    run(&mut s, vec![Command::Move(Direction::Right)]).await;
    assert!(s.roster().get(AgentId(1)).unwrap().arrived);
    assert_eq!(s.game_state(), GameState::Playing);
}

#[test]
fn killing_twice_raises_one_death() {
    let s = session(&level(&[(2, 2)]));
    let mut roster = s.roster().clone();
    let agent = roster.get_mut(AgentId(1)).unwrap();
    assert!(kill(agent, DeathCause::Hazard, None).is_some());
    let snapshot = agent.clone();
    assert!(kill(agent, DeathCause::Collision, Some(AgentId(9))).is_none());
    assert_eq!(*agent, snapshot);
    assert!(roster.any_dead());
}

#[tokio::test]
async fn reset_allows_a_retry_after_failure() {
    let mut layout = level(&[(2, 2)]);
    layout.hazards = vec!["3,2".to_owned()];
    let mut s = session(&layout);

    let result = run(&mut s, vec![Command::Move(Direction::Right)]).await;
    assert_eq!(result.game_state, GameState::Failed);
    assert!(!s.run_sequence(&InstructionList::from(vec![Command::NoOp])));

    s.reset();
    let result = run(&mut s, vec![Command::Move(Direction::Up)]).await;
    assert_eq!(result.game_state, GameState::Playing);
    assert_eq!(position(&s, 1), GridPos::new(2, 3));
}
