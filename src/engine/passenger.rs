//! Passenger - Colors, the boarding queue and how it gets filled
//!
//! The queue is strictly FIFO: only the front passenger may ever board.
//! Filling it goes through [`QueueSeeder`] so tests can replace the RNG
//! with a fixed sequence.

use std::collections::VecDeque;
use std::fmt::{Display, Formatter};

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::engine::config::GameConfig;
use crate::engine::error::EngineError;

/// Color shared by passengers and buses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Blue,
    Yellow,
    Green,
}

impl Color {
    /// Classic palette, in bus row order
    pub const ALL: [Color; 4] = [Color::Red, Color::Blue, Color::Yellow, Color::Green];

    pub fn name(self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Blue => "blue",
            Color::Yellow => "yellow",
            Color::Green => "green",
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered line of passengers waiting at the boarding gate
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassengerQueue {
    passengers: VecDeque<Color>,
}

impl PassengerQueue {
    pub fn new(passengers: impl IntoIterator<Item = Color>) -> Self {
        Self {
            passengers: passengers.into_iter().collect(),
        }
    }

    /// Next passenger eligible to board
    pub fn front(&self) -> Option<Color> {
        self.passengers.front().copied()
    }

    /// Front passenger, or `QueueEmpty` once everybody has boarded
    pub fn peek(&self) -> Result<Color, EngineError> {
        self.front().ok_or(EngineError::QueueEmpty)
    }

    /// Remove the front passenger if it matches `color`
    pub fn pop_if(&mut self, color: Color) -> Option<Color> {
        if self.front() == Some(color) {
            self.passengers.pop_front()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.passengers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passengers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Color> + '_ {
        self.passengers.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<Color> {
        self.iter().collect()
    }
}

/// Source of fresh passenger sequences, consulted on every game start and reset
pub trait QueueSeeder: Send {
    fn seed_queue(&mut self, palette: &[Color], len: usize) -> Vec<Color>;
}

/// Draws passengers uniformly from the palette, with replacement
#[derive(Debug, Clone)]
pub struct RandomQueue<R> {
    rng: R,
}

impl<R: Rng + Send> RandomQueue<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomQueue<ChaCha8Rng> {
    /// Seeded from `config.seed`, or from OS entropy when unset
    pub fn from_config(config: &GameConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::new(rng)
    }
}

impl<R: Rng + Send> QueueSeeder for RandomQueue<R> {
    fn seed_queue(&mut self, palette: &[Color], len: usize) -> Vec<Color> {
        (0..len)
            .filter_map(|_| palette.choose(&mut self.rng).copied())
            .collect()
    }
}

/// Replays the same passenger sequence on every reset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedQueue(pub Vec<Color>);

impl QueueSeeder for FixedQueue {
    fn seed_queue(&mut self, _palette: &[Color], _len: usize) -> Vec<Color> {
        self.0.clone()
    }
}
