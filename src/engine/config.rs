//! Config - Game setup parameters
//!
//! Grid dimensions, palette, bus roster shape and passenger count.

use serde::{Deserialize, Serialize};

use crate::engine::error::ConfigError;
use crate::engine::passenger::Color;

/// Largest accepted grid side length
pub const MAX_GRID_SIZE: usize = 64;

/// Most passengers a single game may generate
pub const MAX_QUEUE_LENGTH: usize = 10_000;

/// Game configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Side length of the square parking grid
    pub grid_size: usize,
    /// Colors used for both passengers and buses
    pub palette: Vec<Color>,
    /// Seats per bus
    pub bus_capacity: u32,
    /// Buses created for each palette color
    pub buses_per_color: usize,
    /// Passengers generated per game
    pub queue_length: usize,
    /// Fixed RNG seed (None = seeded from entropy)
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: 8,
            palette: Color::ALL.to_vec(),
            bus_capacity: 4,
            buses_per_color: 1,
            queue_length: 20,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Parse a configuration from JSON, filling missing fields with defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Total number of buses on the grid
    pub fn bus_count(&self) -> usize {
        self.palette.len().saturating_mul(self.buses_per_color)
    }

    /// Column buses rest in between traversals
    pub fn home_column(&self) -> usize {
        self.grid_size.saturating_sub(1)
    }

    /// Check that a game can actually be laid out with these parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size < 2 {
            return Err(ConfigError::GridTooSmall(self.grid_size));
        }
        if self.grid_size > MAX_GRID_SIZE {
            return Err(ConfigError::GridTooLarge(self.grid_size));
        }
        if self.queue_length > MAX_QUEUE_LENGTH {
            return Err(ConfigError::QueueTooLong(self.queue_length));
        }
        if self.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        if self.bus_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.buses_per_color == 0 {
            return Err(ConfigError::NoBuses);
        }
        if self.bus_count() > self.grid_size {
            return Err(ConfigError::TooManyBuses {
                buses: self.bus_count(),
                rows: self.grid_size,
            });
        }
        Ok(())
    }
}
