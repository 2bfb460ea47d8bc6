//! Simulation - Game session server
//!
//! Owns the active game, tracks session state and statistics, and provides
//! the interface the crate-level commands call into.

use serde::{Deserialize, Serialize};

use crate::engine::bus::{BusId, StepOutcome};
use crate::engine::config::GameConfig;
use crate::engine::error::EngineError;
use crate::engine::events::GameSnapshot;
use crate::engine::game_state::{GameState, GameStatus};

/// Session state as seen by the frontend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// No game loaded
    Idle,
    Playing,
    Cleared,
    Stuck,
}

impl From<GameStatus> for SessionState {
    fn from(status: GameStatus) -> Self {
        match status {
            GameStatus::Playing => SessionState::Playing,
            GameStatus::Cleared => SessionState::Cleared,
            GameStatus::Stuck => SessionState::Stuck,
        }
    }
}

/// Server statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStats {
    pub moves_requested: u32,
    pub steps: u32,
    pub passengers_boarded: u32,
    pub failed_boardings: u32,
    pub resets: u32,
    pub remaining_passengers: u32,
    pub session_state: Option<SessionState>,
}

/// Main game server
pub struct GameServer {
    /// Active game (if any)
    game: Option<GameState>,
    stats: ServerStats,
}

impl GameServer {
    /// Create a server with no game loaded
    pub fn new() -> Self {
        Self {
            game: None,
            stats: ServerStats::default(),
        }
    }

    /// Start a new game with the given config, replacing any previous one
    pub fn init_game(&mut self, config: GameConfig) -> Result<(), EngineError> {
        let game = GameState::new(config)?;
        self.load(game);
        Ok(())
    }

    /// Install an already-built game (custom seeder or observers)
    pub fn load(&mut self, game: GameState) {
        self.game = Some(game);
        self.stats = ServerStats::default();
    }

    fn game_mut(&mut self) -> Result<&mut GameState, EngineError> {
        self.game.as_mut().ok_or(EngineError::NoActiveGame)
    }

    /// Start moving a bus; false if it is already on its way
    pub fn request_move(&mut self, bus: BusId) -> Result<bool, EngineError> {
        let started = self.game_mut()?.request_move(bus)?;
        if started {
            self.stats.moves_requested += 1;
        }
        Ok(started)
    }

    /// Advance a bus by one traversal step
    pub fn step(&mut self, bus: BusId) -> Result<StepOutcome, EngineError> {
        let outcome = self.game_mut()?.step_traversal(bus)?;

        match outcome {
            StepOutcome::Idle => {}
            StepOutcome::Boarded { boarded: true } => {
                self.stats.steps += 1;
                self.stats.passengers_boarded += 1;
            }
            StepOutcome::Boarded { boarded: false } => {
                self.stats.steps += 1;
                self.stats.failed_boardings += 1;
            }
            _ => self.stats.steps += 1,
        }
        Ok(outcome)
    }

    /// Reset the active game
    pub fn reset(&mut self) -> Result<(), EngineError> {
        self.game_mut()?.reset()?;
        self.stats.resets += 1;
        Ok(())
    }

    pub fn get_snapshot(&self) -> Option<GameSnapshot> {
        self.game.as_ref().map(GameState::snapshot)
    }

    pub fn get_state(&self) -> SessionState {
        self.game
            .as_ref()
            .map(|g| g.status().into())
            .unwrap_or(SessionState::Idle)
    }

    pub fn get_stats(&self) -> ServerStats {
        ServerStats {
            remaining_passengers: self
                .game
                .as_ref()
                .map(|g| g.remaining_passengers() as u32)
                .unwrap_or(0),
            session_state: Some(self.get_state()),
            ..self.stats.clone()
        }
    }
}

impl Default for GameServer {
    fn default() -> Self {
        Self::new()
    }
}
