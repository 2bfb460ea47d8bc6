//! Car Jam - Bus boarding puzzle engine
//!
//! Colored passengers queue to board color-matched buses that shuttle
//! between a parking grid and the boarding gate. This crate holds the game
//! rules; a frontend renders snapshots and drives traversal steps through
//! the commands below.

pub mod engine;

use std::sync::Mutex;

pub use engine::{
    BusId, Color, EngineError, GameConfig, GameObserver, GameServer, GameSnapshot, GameState,
    ServerStats, SessionState, StepOutcome,
};

/// Start a new game, optionally overriding grid size and RNG seed
pub fn new_game(
    server: &Mutex<GameServer>,
    grid_size: Option<usize>,
    seed: Option<u64>,
) -> Result<(), String> {
    let mut server = server.lock().map_err(|e| e.to_string())?;

    let defaults = GameConfig::default();
    let config = GameConfig {
        grid_size: grid_size.unwrap_or(defaults.grid_size),
        seed,
        ..defaults
    };

    server.init_game(config).map_err(|e| e.to_string())?;
    log::info!(
        "Game initialized with {} passengers",
        server.get_stats().remaining_passengers
    );
    Ok(())
}

/// Start a new game from a JSON config
pub fn new_game_from_json(server: &Mutex<GameServer>, json: &str) -> Result<(), String> {
    let config = GameConfig::from_json(json).map_err(|e| e.to_string())?;
    let mut server = server.lock().map_err(|e| e.to_string())?;
    server.init_game(config).map_err(|e| e.to_string())?;
    log::info!("Game initialized from JSON config");
    Ok(())
}

/// Send a bus toward the boarding gate
pub fn request_move(server: &Mutex<GameServer>, bus: usize) -> Result<bool, String> {
    let mut server = server.lock().map_err(|e| e.to_string())?;
    let started = server.request_move(BusId(bus)).map_err(|e| e.to_string())?;
    if started {
        log::info!("Bus {} moving", bus);
    }
    Ok(started)
}

/// Advance a moving bus by one step and return what happened
pub fn step_traversal(server: &Mutex<GameServer>, bus: usize) -> Result<StepOutcome, String> {
    let mut server = server.lock().map_err(|e| e.to_string())?;
    server.step(BusId(bus)).map_err(|e| e.to_string())
}

/// Get current game snapshot without changing anything
pub fn get_snapshot(server: &Mutex<GameServer>) -> Result<Option<GameSnapshot>, String> {
    let server = server.lock().map_err(|e| e.to_string())?;
    Ok(server.get_snapshot())
}

/// Get server statistics
pub fn get_stats(server: &Mutex<GameServer>) -> Result<ServerStats, String> {
    let server = server.lock().map_err(|e| e.to_string())?;
    Ok(server.get_stats())
}

/// Get current session state
pub fn get_session_state(server: &Mutex<GameServer>) -> Result<SessionState, String> {
    let server = server.lock().map_err(|e| e.to_string())?;
    Ok(server.get_state())
}

/// Restart with a fresh passenger queue
pub fn reset_game(server: &Mutex<GameServer>) -> Result<(), String> {
    let mut server = server.lock().map_err(|e| e.to_string())?;
    server.reset().map_err(|e| e.to_string())?;
    log::info!("Game reset");
    Ok(())
}
