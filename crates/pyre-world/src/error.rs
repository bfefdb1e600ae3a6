//! Error types for the `pyre-world` crate.
//!
//! Grid queries are total and never fail; only building a grid from a
//! layout does.

use pyre_types::GridPos;

/// Errors that can occur while building or editing a grid.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The requested grid size is empty or does not fit in `i32`.
    #[error("invalid grid dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// A range string could not be parsed.
    #[error("invalid range {range:?}: {reason}")]
    InvalidRange {
        /// The offending string.
        range: String,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// A range string parsed but reaches outside the grid.
    #[error("range {range:?} is out of map bounds")]
    RangeOutOfBounds {
        /// The offending string.
        range: String,
    },

    /// A coordinate lies outside the grid.
    #[error("position {0} is out of bounds")]
    OutOfBounds(GridPos),

    /// Two triggerables were placed on the same cell.
    #[error("duplicate triggerable at {0}")]
    DuplicateTriggerable(GridPos),

    /// Arithmetic overflow while computing a cell index.
    #[error("arithmetic overflow in grid calculation")]
    ArithmeticOverflow,
}
