//! Bus - Individual bus state and traversal movement
//!
//! Each bus shuttles between its home cell in the last column and the
//! boarding gate in column 0, one cell per step. The engine drives boarding;
//! this module only knows how to move a bus across the grid.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::engine::error::EngineError;
use crate::engine::grid::{Grid, Occupant, Position};
use crate::engine::passenger::Color;

/// Column where buses pick up passengers
pub const BOARDING_COLUMN: usize = 0;

/// Index of a bus in the roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BusId(pub usize);

impl Display for BusId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a bus is in its out-and-back cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BusPhase {
    Parked,
    MovingOut,
    AtBoardingGate,
    MovingBack,
}

/// Result of a single traversal step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepOutcome {
    /// Nothing moved: the bus is parked, or waits at the gate for boarding
    Idle,
    /// Bus moved one cell
    Advanced { to: Position },
    /// Outbound path blocked; traversal abandoned where the bus stands
    Blocked { at: Position },
    /// Boarding attempted at the gate; the bus now heads home either way
    Boarded { boarded: bool },
    /// Bus is back in its home cell and ready for another move
    Parked { at: Position },
}

impl StepOutcome {
    /// Whether the traversal has ended with this step
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StepOutcome::Idle | StepOutcome::Blocked { .. } | StepOutcome::Parked { .. }
        )
    }
}

/// Complete state for a single bus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bus {
    pub id: BusId,
    pub color: Color,
    /// Seats available in total
    pub capacity: u32,
    /// Passengers on board
    pub boarded: u32,
    /// Current cell
    pub position: Position,
    /// Starting cell, returned to after every traversal
    pub home: Position,
    pub phase: BusPhase,
    /// Set for the whole traversal; blocks re-entrant moves
    pub is_moving: bool,
}

impl Bus {
    /// Create an empty, parked bus at its home cell
    pub fn new(id: BusId, color: Color, capacity: u32, home: Position) -> Self {
        Self {
            id,
            color,
            capacity,
            boarded: 0,
            position: home,
            home,
            phase: BusPhase::Parked,
            is_moving: false,
        }
    }

    pub fn is_full(&self) -> bool {
        self.boarded >= self.capacity
    }

    /// Grid marker for this bus
    pub fn occupant(&self) -> Occupant {
        Occupant {
            bus: self.id,
            color: self.color,
        }
    }

    fn park(&mut self) {
        self.phase = BusPhase::Parked;
        self.is_moving = false;
    }
}

/// Bus movement logic
pub struct Traversal;

impl Traversal {
    /// Advance a moving bus one cell. Handles the `MovingOut` and `MovingBack`
    /// phases only; boarding at the gate belongs to the engine.
    pub fn advance(bus: &mut Bus, grid: &mut Grid) -> Result<StepOutcome, EngineError> {
        match bus.phase {
            BusPhase::Parked => Ok(StepOutcome::Idle),
            // Boarding is driven by the engine; nothing to move here.
            BusPhase::AtBoardingGate => Ok(StepOutcome::Idle),
            BusPhase::MovingOut => Ok(Self::step_out(bus, grid)),
            BusPhase::MovingBack => Self::step_back(bus, grid),
        }
    }

    fn step_out(bus: &mut Bus, grid: &mut Grid) -> StepOutcome {
        let from = bus.position;
        if from.col == BOARDING_COLUMN {
            bus.phase = BusPhase::AtBoardingGate;
            return StepOutcome::Advanced { to: from };
        }

        let to = Position::new(from.row, from.col - 1);
        if grid.relocate(from, to, bus.occupant()).is_err() {
            bus.park();
            return StepOutcome::Blocked { at: from };
        }

        bus.position = to;
        if to.col == BOARDING_COLUMN {
            bus.phase = BusPhase::AtBoardingGate;
        }
        StepOutcome::Advanced { to }
    }

    fn step_back(bus: &mut Bus, grid: &mut Grid) -> Result<StepOutcome, EngineError> {
        let from = bus.position;
        if from.col >= bus.home.col {
            bus.park();
            return Ok(StepOutcome::Parked { at: from });
        }

        let to = Position::new(from.row, from.col + 1);
        grid.relocate(from, to, bus.occupant())?;
        bus.position = to;

        if to == bus.home {
            bus.park();
            Ok(StepOutcome::Parked { at: to })
        } else {
            Ok(StepOutcome::Advanced { to })
        }
    }
}

/// Compact bus state for rendering / IPC transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusSnapshot {
    pub id: BusId,
    pub color: Color,
    pub boarded: u32,
    pub capacity: u32,
    pub row: usize,
    pub col: usize,
    pub phase: BusPhase,
    pub is_moving: bool,
}

impl From<&Bus> for BusSnapshot {
    fn from(bus: &Bus) -> Self {
        Self {
            id: bus.id,
            color: bus.color,
            boarded: bus.boarded,
            capacity: bus.capacity,
            row: bus.position.row,
            col: bus.position.col,
            phase: bus.phase,
            is_moving: bus.is_moving,
        }
    }
}
