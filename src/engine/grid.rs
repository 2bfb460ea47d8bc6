//! Grid - Parking grid occupancy
//!
//! Every cell is either empty or marked by exactly one bus. All writes go
//! through `place` / `relocate`, which validate before touching anything so
//! a failed move leaves the grid as it was.

use serde::{Deserialize, Serialize};

use crate::engine::bus::BusId;
use crate::engine::error::EngineError;
use crate::engine::passenger::Color;

/// Grid coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Marker left in a cell by the bus parked there
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    pub bus: BusId,
    pub color: Color,
}

/// Square occupancy grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    cells: Vec<Option<Occupant>>,
}

impl Grid {
    /// Create an empty `size` x `size` grid
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![None; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Resolve signed coordinates to a position, if inside the grid
    pub fn resolve(&self, row: isize, col: isize) -> Result<Position, EngineError> {
        let in_range = |v: isize| v >= 0 && (v as usize) < self.size;
        if in_range(row) && in_range(col) {
            Ok(Position::new(row as usize, col as usize))
        } else {
            Err(EngineError::OutOfBounds { row, col })
        }
    }

    fn index(&self, pos: Position) -> Result<usize, EngineError> {
        if pos.row < self.size && pos.col < self.size {
            Ok(pos.row * self.size + pos.col)
        } else {
            Err(EngineError::OutOfBounds {
                row: pos.row as isize,
                col: pos.col as isize,
            })
        }
    }

    pub fn get(&self, pos: Position) -> Result<Option<Occupant>, EngineError> {
        let idx = self.index(pos)?;
        Ok(self.cells[idx])
    }

    /// True iff `(row, col)` is inside the grid and empty
    pub fn is_free(&self, row: isize, col: isize) -> bool {
        self.resolve(row, col)
            .and_then(|pos| self.get(pos))
            .map(|cell| cell.is_none())
            .unwrap_or(false)
    }

    /// Claim an empty cell
    pub fn place(&mut self, pos: Position, occupant: Occupant) -> Result<(), EngineError> {
        let idx = self.index(pos)?;
        if self.cells[idx].is_some() {
            return Err(EngineError::OccupiedDestination {
                row: pos.row,
                col: pos.col,
            });
        }
        self.cells[idx] = Some(occupant);
        Ok(())
    }

    /// Move `occupant` from `from` to `to`: both cells are checked first, then
    /// the old cell is cleared and the new one claimed.
    pub fn relocate(
        &mut self,
        from: Position,
        to: Position,
        occupant: Occupant,
    ) -> Result<(), EngineError> {
        let from_idx = self.index(from)?;
        let to_idx = self.index(to)?;
        if self.cells[to_idx].is_some() {
            return Err(EngineError::OccupiedDestination {
                row: to.row,
                col: to.col,
            });
        }
        if !self.cells[from_idx].is_some_and(|o| o.bus == occupant.bus) {
            return Err(EngineError::NotOccupant {
                bus: occupant.bus,
                row: from.row,
                col: from.col,
            });
        }
        self.cells[from_idx] = None;
        self.cells[to_idx] = Some(occupant);
        Ok(())
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// Row-major color view for rendering
    pub fn color_rows(&self) -> Vec<Vec<Option<Color>>> {
        self.cells
            .chunks(self.size.max(1))
            .map(|row| row.iter().map(|cell| cell.map(|o| o.color)).collect())
            .collect()
    }
}
