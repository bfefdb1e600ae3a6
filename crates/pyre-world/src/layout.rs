//! Level layout descriptions and the cell-range syntax they use.
//!
//! Walls and hazards are painted in batches with range strings of the form
//! `"X,Y"`, where each part is either a single index `N` or an inclusive
//! span `A:B`. `"2:4,5"` covers `(2,5)`, `(3,5)` and `(4,5)`. Reversed
//! spans such as `"4:2"` are normalized.

use pyre_types::{AgentSpec, GridPos, StarThresholds, TriggerableSpec};
use serde::{Deserialize, Serialize};

use crate::error::WorldError;

/// A complete level: grid size, painted cells, objects and priests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelLayout {
    /// Display name.
    #[serde(default = "default_level_name")]
    pub name: String,
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
    /// Paint the outer ring as (walkable) walls.
    #[serde(default = "default_true")]
    pub border_walls: bool,
    /// Interior wall ranges.
    #[serde(default)]
    pub walls: Vec<String>,
    /// Deadly cell ranges.
    #[serde(default)]
    pub hazards: Vec<String>,
    /// Fire pits and chests.
    #[serde(default)]
    pub triggerables: Vec<TriggerableSpec>,
    /// Priests, in roster order.
    #[serde(default)]
    pub agents: Vec<AgentSpec>,
    /// Star thresholds for scoring.
    #[serde(default)]
    pub stars: StarThresholds,
}

impl LevelLayout {
    /// An empty level of the given size with border walls and nothing else.
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            name: default_level_name(),
            width,
            height,
            border_walls: true,
            walls: Vec::new(),
            hazards: Vec::new(),
            triggerables: Vec::new(),
            agents: Vec::new(),
            stars: StarThresholds::default(),
        }
    }
}

/// An inclusive rectangle of cells parsed from a range string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    /// First column.
    pub x_start: i32,
    /// Last column.
    pub x_end: i32,
    /// First row.
    pub y_start: i32,
    /// Last row.
    pub y_end: i32,
}

impl CellRange {
    /// Whether the whole rectangle lies inside a `width` x `height` grid.
    pub const fn fits(&self, width: i32, height: i32) -> bool {
        self.x_start >= 0 && self.x_end < width && self.y_start >= 0 && self.y_end < height
    }

    /// Every cell of the rectangle, column by column.
    pub fn cells(&self) -> impl Iterator<Item = GridPos> + '_ {
        (self.x_start..=self.x_end)
            .flat_map(move |x| (self.y_start..=self.y_end).map(move |y| GridPos::new(x, y)))
    }
}

/// Parse a range string such as `"2:4,5:5"`.
///
/// # Errors
///
/// Returns [`WorldError::InvalidRange`] if the string does not have exactly
/// two comma-separated parts or a bound is not an integer.
pub fn parse_range(range: &str) -> Result<CellRange, WorldError> {
    let invalid = |reason| WorldError::InvalidRange {
        range: range.to_owned(),
        reason,
    };

    let mut parts = range.split(',');
    let (Some(x_part), Some(y_part), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid("expected two comma-separated parts"));
    };

    let (x_start, x_end) = parse_span(x_part).ok_or_else(|| invalid("bad column span"))?;
    let (y_start, y_end) = parse_span(y_part).ok_or_else(|| invalid("bad row span"))?;

    Ok(CellRange {
        x_start,
        x_end,
        y_start,
        y_end,
    })
}

/// Parse `N` or `A:B` into an ordered inclusive pair.
fn parse_span(part: &str) -> Option<(i32, i32)> {
    let mut bounds = part.split(':');
    let first = bounds.next()?.trim().parse::<i32>().ok()?;
    let second = match bounds.next() {
        Some(b) => b.trim().parse::<i32>().ok()?,
        None => first,
    };
    if bounds.next().is_some() {
        return None;
    }
    Some((first.min(second), first.max(second)))
}

fn default_level_name() -> String {
    "Untitled".to_owned()
}

const fn default_true() -> bool {
    true
}
