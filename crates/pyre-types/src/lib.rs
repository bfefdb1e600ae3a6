//! Shared type definitions for the Pyre command-block engine.
//!
//! This crate is the single source of truth for the data that flows between
//! the grid, the priests, the execution engine and the front end. Types
//! defined here flow downstream to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Agent and run identifiers
//! - [`enums`] -- Directions, cell types, condition operands, state machines
//! - [`structs`] -- Coordinates, level placement specs, run metrics, star
//!   thresholds
//! - [`commands`] -- Command blocks and `IfStart` conditions
//! - [`events`] -- Events emitted while a program runs

pub mod commands;
pub mod enums;
pub mod events;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use commands::{Command, Condition};
pub use enums::{
    CellType, ConditionOperator, DeathCause, Direction, GameState, RunState, TargetType,
    TriggerableKind,
};
pub use events::RunEvent;
pub use ids::{AgentId, RunId};
pub use structs::{
    AgentSpec, GridOffset, GridPos, RunMetrics, StarThresholds, TriggerableSpec,
};

#[cfg(test)]
mod tests {
    //! Binding generation for the front end.

    #[test]
    fn export_bindings() {
        // ts-rs writes the files under `bindings/` relative to the crate
        // root when `export_all` runs.
        use ts_rs::TS;

        let _ = crate::ids::AgentId::export_all();
        let _ = crate::ids::RunId::export_all();

        let _ = crate::enums::Direction::export_all();
        let _ = crate::enums::CellType::export_all();
        let _ = crate::enums::TriggerableKind::export_all();
        let _ = crate::enums::ConditionOperator::export_all();
        let _ = crate::enums::TargetType::export_all();
        let _ = crate::enums::GameState::export_all();
        let _ = crate::enums::RunState::export_all();
        let _ = crate::enums::DeathCause::export_all();

        let _ = crate::structs::GridPos::export_all();
        let _ = crate::structs::GridOffset::export_all();
        let _ = crate::structs::AgentSpec::export_all();
        let _ = crate::structs::TriggerableSpec::export_all();
        let _ = crate::structs::RunMetrics::export_all();
        let _ = crate::structs::StarThresholds::export_all();

        let _ = crate::commands::Condition::export_all();
        let _ = crate::commands::Command::export_all();
        let _ = crate::events::RunEvent::export_all();
    }
}
