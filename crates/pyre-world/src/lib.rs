//! Grid model, fire pits and chests, and level layouts for the Pyre engine.
//!
//! This crate models the static world the priests walk on: a rectangular
//! grid of typed cells, the triggerable objects sitting on some of them,
//! and the layout description a level is built from.
//!
//! # Modules
//!
//! - [`error`] -- Error types for grid construction.
//! - [`grid`] -- [`Grid`]: passability, hazard and goal queries, arming.
//! - [`layout`] -- [`LevelLayout`] and the `"X,Y"` range syntax.
//! - [`triggerable`] -- Runtime state of fire pits and chests.

pub mod error;
pub mod grid;
pub mod layout;
pub mod triggerable;

// Re-export primary types at crate root.
pub use error::WorldError;
pub use grid::Grid;
pub use layout::{CellRange, LevelLayout, parse_range};
pub use triggerable::Triggerable;
