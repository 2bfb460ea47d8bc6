//! Error types for the engine
//!
//! Nothing here is fatal. Grid faults are mostly absorbed into booleans by
//! `GameState::can_move_to`; what reaches callers is either retryable or a
//! misuse of the API.

use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::engine::bus::BusId;
use crate::engine::config::{MAX_GRID_SIZE, MAX_QUEUE_LENGTH};

/// Rejected game configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// JSON could not be parsed
    Parse(String),
    GridTooSmall(usize),
    GridTooLarge(usize),
    QueueTooLong(usize),
    EmptyPalette,
    ZeroCapacity,
    NoBuses,
    /// Every bus needs its own row in the home column
    TooManyBuses { buses: usize, rows: usize },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Parse(msg) => write!(f, "invalid config: {}", msg),
            ConfigError::GridTooSmall(size) => {
                write!(f, "grid size {} is too small (minimum 2)", size)
            }
            ConfigError::GridTooLarge(size) => {
                write!(f, "grid size {} is too large (maximum {})", size, MAX_GRID_SIZE)
            }
            ConfigError::QueueTooLong(len) => {
                write!(f, "queue length {} is too long (maximum {})", len, MAX_QUEUE_LENGTH)
            }
            ConfigError::EmptyPalette => f.write_str("palette has no colors"),
            ConfigError::ZeroCapacity => f.write_str("bus capacity must be at least 1"),
            ConfigError::NoBuses => f.write_str("at least one bus per color is required"),
            ConfigError::TooManyBuses { buses, rows } => {
                write!(f, "{} buses do not fit in {} rows", buses, rows)
            }
        }
    }
}

impl Error for ConfigError {}

/// Engine fault
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Target cell lies outside the grid
    OutOfBounds { row: isize, col: isize },
    /// Target cell is held by another bus. Retryable while a bus returns home.
    OccupiedDestination { row: usize, col: usize },
    /// Source cell of a move is not marked by the moving bus
    NotOccupant { bus: BusId, row: usize, col: usize },
    /// Boarding attempted with nobody waiting
    QueueEmpty,
    UnknownBus(BusId),
    /// Reset refused while a bus is mid-traversal
    TraversalInProgress,
    InvalidConfig(ConfigError),
    /// Server has no game loaded
    NoActiveGame,
}

impl EngineError {
    /// Whether repeating the same call later may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EngineError::OccupiedDestination { .. } | EngineError::TraversalInProgress
        )
    }
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::OutOfBounds { row, col } => {
                write!(f, "cell ({}, {}) is outside the grid", row, col)
            }
            EngineError::OccupiedDestination { row, col } => {
                write!(f, "cell ({}, {}) is occupied", row, col)
            }
            EngineError::NotOccupant { bus, row, col } => {
                write!(f, "cell ({}, {}) is not held by bus {}", row, col, bus)
            }
            EngineError::QueueEmpty => f.write_str("passenger queue is empty"),
            EngineError::UnknownBus(id) => write!(f, "no bus with id {}", id),
            EngineError::TraversalInProgress => {
                f.write_str("cannot reset while a bus is moving")
            }
            EngineError::InvalidConfig(e) => write!(f, "{}", e),
            EngineError::NoActiveGame => f.write_str("no game in progress"),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            EngineError::InvalidConfig(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for EngineError {
    fn from(e: ConfigError) -> Self {
        EngineError::InvalidConfig(e)
    }
}
