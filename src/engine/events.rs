//! Events - Hooks for the presentation layer
//!
//! The engine renders nothing and owns no timers. Observers receive a fresh
//! snapshot after every state change plus the two terminal notifications.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::engine::bus::BusSnapshot;
use crate::engine::game_state::GameStatus;
use crate::engine::passenger::Color;

/// Render callback and notification sink
pub trait GameObserver: Send {
    /// Called after every state-affecting operation
    fn on_render(&mut self, _snapshot: &GameSnapshot) {}

    /// The last passenger has boarded
    fn on_cleared(&mut self) {}

    /// The front passenger cannot board any bus
    fn on_stuck(&mut self) {}
}

/// Full game state for rendering / IPC transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub grid_size: usize,
    /// Row-major cell colors, `None` for empty cells
    pub grid: Vec<Vec<Option<Color>>>,
    /// Waiting passengers, front first
    pub queue: Vec<Color>,
    pub buses: Vec<BusSnapshot>,
    pub status: GameStatus,
}

impl GameSnapshot {
    pub fn remaining_passengers(&self) -> usize {
        self.queue.len()
    }
}

/// Notification as recorded by [`EventLog`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Rendered { remaining: usize },
    Cleared,
    Stuck,
}

/// Observer that appends every notification to a shared list
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<GameEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: GameEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }

    /// Copy of everything recorded so far
    pub fn events(&self) -> Vec<GameEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn count(&self, event: &GameEvent) -> usize {
        self.events().iter().filter(|e| *e == event).count()
    }
}

impl GameObserver for EventLog {
    fn on_render(&mut self, snapshot: &GameSnapshot) {
        self.push(GameEvent::Rendered {
            remaining: snapshot.remaining_passengers(),
        });
    }

    fn on_cleared(&mut self) {
        self.push(GameEvent::Cleared);
    }

    fn on_stuck(&mut self) {
        self.push(GameEvent::Stuck);
    }
}
