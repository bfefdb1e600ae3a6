//! Instruction lists, control flow and the lockstep engine for Pyre.
//!
//! This crate turns a list of blocks into moves: it owns the instruction
//! pointer, loop matching, branch scopes, the level outcome, scoring, and
//! the async driver that paces a run in real time.
//!
//! # Modules
//!
//! - [`condition`] -- Target classification and branch condition checks.
//! - [`config`] -- Configuration loading from `pyre-config.yaml` and level
//!   layouts from YAML.
//! - [`control_flow`] -- Loop matching and the branch scope stack.
//! - [`engine`] -- The [`Engine`] that executes one block per step.
//! - [`game_state`] -- The level outcome state machine.
//! - [`operator`] -- [`RunControl`], the shared pause/stop/speed state.
//! - [`program`] -- [`InstructionList`] and structural validation.
//! - [`runner`] -- [`run_program`], the paced driving loop.
//! - [`scoring`] -- Star rating.
//! - [`session`] -- [`Session`], the owner of one loaded level.
//!
//! [`Engine`]: engine::Engine
//! [`RunControl`]: operator::RunControl
//! [`InstructionList`]: program::InstructionList
//! [`run_program`]: runner::run_program
//! [`Session`]: session::Session

pub mod condition;
pub mod config;
pub mod control_flow;
pub mod engine;
pub mod game_state;
pub mod operator;
pub mod program;
pub mod runner;
pub mod scoring;
pub mod session;

pub use config::{PyreConfig, RunConfig, TimingConfig};
pub use engine::{Engine, StepContext, StepReport};
pub use game_state::GameStateMachine;
pub use operator::{EndReason, RunControl};
pub use program::{InstructionList, ProgramDiagnostic, ProgramError};
pub use runner::{EventLog, NoOpObserver, RunResult, RunnerError, StepObserver, run_program};
pub use session::{Session, SessionError};
