//! Engine Module
//!
//! Rules for the Car Jam puzzle: parking grid, passenger queue, bus
//! traversals and boarding. Rendering and timing are left to the caller.

pub mod bus;
pub mod config;
pub mod error;
pub mod events;
pub mod game_state;
pub mod grid;
pub mod passenger;
pub mod simulation;

pub use bus::{Bus, BusId, BusPhase, BusSnapshot, StepOutcome};
pub use config::GameConfig;
pub use error::{ConfigError, EngineError};
pub use events::{EventLog, GameEvent, GameObserver, GameSnapshot};
pub use game_state::{GameState, GameStatus};
pub use grid::{Grid, Position};
pub use passenger::{Color, FixedQueue, PassengerQueue, QueueSeeder, RandomQueue};
pub use simulation::{GameServer, ServerStats, SessionState};
