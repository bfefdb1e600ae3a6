//! Priest state, roster and command resolution for the Pyre engine.
//!
//! This crate holds the logic layer for priests: everything that changes a
//! priest's position or life without knowing about instruction lists. It
//! sits between `pyre-world` (the grid it queries and arms) and
//! `pyre-core` (the engine that decides who receives which command).
//!
//! # Modules
//!
//! - [`actions`] -- Two-phase resolution of moves and casts for a cohort.
//! - [`agent`] -- [`Agent`] state and the ordered [`AgentRoster`].
//! - [`death`] -- Idempotent death and the records it produces.
//! - [`error`] -- Error types for roster and dispatch mistakes ([`AgentError`]).

pub mod actions;
pub mod agent;
pub mod death;
pub mod error;

// Re-export primary types at crate root for convenience.
pub use actions::{CohortOutcome, apply_command, resolve_cohort};
pub use agent::{Agent, AgentRoster};
pub use death::{DeathRecord, kill};
pub use error::AgentError;
