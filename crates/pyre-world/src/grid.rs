//! The grid model: cell types, fire pits and chests.
//!
//! The [`Grid`] answers the three questions the priests ask on every step
//! (can I enter, will it kill me, is it a goal) and owns the only mutable
//! world state of a run: which triggerables have been armed. All queries
//! are total over integer coordinates; anything outside the map is simply
//! not passable.
//!
//! Cells are stored row-major in a flat vector.

use std::collections::BTreeMap;

use pyre_types::{CellType, GridPos, TriggerableSpec};
use tracing::{debug, warn};

use crate::error::WorldError;
use crate::layout::{LevelLayout, parse_range};
use crate::triggerable::Triggerable;

/// A rectangular map of cells plus the triggerables placed on it.
#[derive(Debug, Clone)]
pub struct Grid {
    /// Number of columns.
    width: i32,
    /// Number of rows.
    height: i32,
    /// Row-major cell types, `width * height` entries.
    cells: Vec<CellType>,
    /// Fire pits and chests by position.
    triggerables: BTreeMap<GridPos, Triggerable>,
}

impl Grid {
    /// Create a grid of `SafePath` cells.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidDimensions`] if either side is zero or
    /// does not fit in `i32`.
    pub fn new(width: u32, height: u32) -> Result<Self, WorldError> {
        let invalid = || WorldError::InvalidDimensions { width, height };
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        let w = i32::try_from(width).ok().ok_or_else(invalid)?;
        let h = i32::try_from(height).ok().ok_or_else(invalid)?;
        let len = usize::try_from(width)
            .ok()
            .zip(usize::try_from(height).ok())
            .and_then(|(w, h)| w.checked_mul(h))
            .ok_or(WorldError::ArithmeticOverflow)?;

        Ok(Self {
            width: w,
            height: h,
            cells: vec![CellType::SafePath; len],
            triggerables: BTreeMap::new(),
        })
    }

    /// Build a grid from a level layout.
    ///
    /// Painting order: border ring, wall ranges, hazard ranges, priest
    /// goals, triggerables. A triggerable on a goal cell keeps the cell a
    /// goal; anywhere else its cell becomes a `TriggerableHazard`.
    /// Malformed or out-of-bounds ranges and goals are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidDimensions`] for an empty map,
    /// [`WorldError::OutOfBounds`] for a triggerable outside the map, and
    /// [`WorldError::DuplicateTriggerable`] for two objects on one cell.
    pub fn from_layout(layout: &LevelLayout) -> Result<Self, WorldError> {
        let mut grid = Self::new(layout.width, layout.height)?;

        if layout.border_walls {
            grid.paint_border();
        }
        grid.paint_ranges(&layout.walls, CellType::Wall);
        grid.paint_ranges(&layout.hazards, CellType::Hazard);

        for agent in &layout.agents {
            let Some(goal) = agent.goal else {
                continue;
            };
            if grid.set_cell(goal, CellType::Goal).is_err() {
                warn!(agent = %agent.id, %goal, "Goal outside the map, skipped");
            }
        }

        for spec in &layout.triggerables {
            grid.place_triggerable(spec)?;
        }

        debug!(
            width = grid.width,
            height = grid.height,
            triggerables = grid.triggerables.len(),
            objectives = grid.objectives_remaining(),
            "Grid built from layout"
        );
        Ok(grid)
    }

    // -------------------------------------------------------------------
    // Geometry
    // -------------------------------------------------------------------

    /// Number of columns.
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Number of rows.
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Whether `pos` lies on the map.
    pub const fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    /// Whether `pos` lies on the outer ring of the map.
    pub fn is_border(&self, pos: GridPos) -> bool {
        self.in_bounds(pos)
            && (pos.x == 0
                || pos.y == 0
                || Some(pos.x) == self.width.checked_sub(1)
                || Some(pos.y) == self.height.checked_sub(1))
    }

    fn index(&self, pos: GridPos) -> Option<usize> {
        if !self.in_bounds(pos) {
            return None;
        }
        let x = usize::try_from(pos.x).ok()?;
        let y = usize::try_from(pos.y).ok()?;
        let w = usize::try_from(self.width).ok()?;
        y.checked_mul(w)?.checked_add(x)
    }

    // -------------------------------------------------------------------
    // Cells
    // -------------------------------------------------------------------

    /// The type of the cell at `pos`, or `None` outside the map.
    pub fn cell_type(&self, pos: GridPos) -> Option<CellType> {
        self.index(pos).and_then(|i| self.cells.get(i)).copied()
    }

    /// Overwrite the type of one cell.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] if `pos` is outside the map.
    pub fn set_cell(&mut self, pos: GridPos, cell: CellType) -> Result<(), WorldError> {
        if self.paint(pos, cell) {
            Ok(())
        } else {
            Err(WorldError::OutOfBounds(pos))
        }
    }

    /// Overwrite `pos` if it is on the map. Returns whether it was.
    fn paint(&mut self, pos: GridPos, cell: CellType) -> bool {
        if let Some(slot) = self.index(pos).and_then(|i| self.cells.get_mut(i)) {
            *slot = cell;
            true
        } else {
            false
        }
    }

    fn paint_border(&mut self) {
        let last_x = self.width.saturating_sub(1);
        let last_y = self.height.saturating_sub(1);
        for x in 0..self.width {
            self.paint(GridPos::new(x, 0), CellType::Wall);
            self.paint(GridPos::new(x, last_y), CellType::Wall);
        }
        for y in 0..self.height {
            self.paint(GridPos::new(0, y), CellType::Wall);
            self.paint(GridPos::new(last_x, y), CellType::Wall);
        }
    }

    fn paint_ranges(&mut self, ranges: &[String], cell: CellType) {
        for raw in ranges {
            if raw.trim().is_empty() {
                continue;
            }
            let range = match parse_range(raw) {
                Ok(r) => r,
                Err(err) => {
                    warn!(%err, ?cell, "Skipping cell range");
                    continue;
                }
            };
            if !range.fits(self.width, self.height) {
                let err = WorldError::RangeOutOfBounds { range: raw.clone() };
                warn!(%err, ?cell, "Skipping cell range");
                continue;
            }
            for pos in range.cells() {
                self.paint(pos, cell);
            }
        }
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// Whether a priest may enter `pos`.
    ///
    /// Out-of-bounds cells are never passable. Walls block movement except
    /// on the outer border, where they are decorative only.
    pub fn is_passable(&self, pos: GridPos) -> bool {
        match self.cell_type(pos) {
            None => false,
            Some(CellType::Wall) => self.is_border(pos),
            Some(_) => true,
        }
    }

    /// Whether entering `pos` kills a priest.
    pub fn is_hazardous(&self, pos: GridPos) -> bool {
        match self.cell_type(pos) {
            Some(CellType::Hazard) => true,
            Some(CellType::TriggerableHazard) => self
                .triggerables
                .get(&pos)
                .is_some_and(Triggerable::is_armed),
            _ => false,
        }
    }

    /// Whether `pos` is a goal cell.
    pub fn is_goal(&self, pos: GridPos) -> bool {
        self.cell_type(pos) == Some(CellType::Goal)
    }

    // -------------------------------------------------------------------
    // Triggerables
    // -------------------------------------------------------------------

    /// Place a fire pit or chest.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] if the position is outside the
    /// map, or [`WorldError::DuplicateTriggerable`] if the cell is taken.
    pub fn place_triggerable(&mut self, spec: &TriggerableSpec) -> Result<(), WorldError> {
        let pos = spec.pos;
        let current = self.cell_type(pos).ok_or(WorldError::OutOfBounds(pos))?;
        if self.triggerables.contains_key(&pos) {
            return Err(WorldError::DuplicateTriggerable(pos));
        }
        if current != CellType::Goal {
            self.set_cell(pos, CellType::TriggerableHazard)?;
        }
        self.triggerables.insert(pos, Triggerable::from_spec(spec));
        Ok(())
    }

    /// The fire pit or chest at `pos`, if any.
    pub fn triggerable_at(&self, pos: GridPos) -> Option<&Triggerable> {
        self.triggerables.get(&pos)
    }

    /// Iterate over all triggerables by position.
    pub fn triggerables(&self) -> impl Iterator<Item = (&GridPos, &Triggerable)> {
        self.triggerables.iter()
    }

    /// Arm the triggerable at `pos`. Returns `true` if a dormant object was
    /// armed; `false` if there is none or it was already armed.
    pub fn arm(&mut self, pos: GridPos) -> bool {
        let armed = self.triggerables.get_mut(&pos).is_some_and(Triggerable::arm);
        if armed {
            debug!(%pos, remaining = self.objectives_remaining(), "Triggerable armed");
        }
        armed
    }

    /// Number of non-trap triggerables that are still dormant.
    pub fn objectives_remaining(&self) -> u32 {
        let count = self
            .triggerables
            .values()
            .filter(|t| t.is_pending_objective())
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Restore every triggerable to its layout state.
    pub fn reset(&mut self) {
        for t in self.triggerables.values_mut() {
            t.reset();
        }
    }
}
