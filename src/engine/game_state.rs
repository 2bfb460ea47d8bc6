//! GameState - Grid, passenger queue and bus roster
//!
//! All game rules live here: movement legality, boarding, and cleared/stuck
//! detection. A bus traversal is an explicit state machine advanced by
//! repeated `step_traversal` calls, so the caller decides the pacing.

use serde::{Deserialize, Serialize};

use crate::engine::bus::{Bus, BusId, BusPhase, BusSnapshot, StepOutcome, Traversal};
use crate::engine::config::GameConfig;
use crate::engine::error::EngineError;
use crate::engine::events::{GameObserver, GameSnapshot};
use crate::engine::grid::{Grid, Position};
use crate::engine::passenger::{Color, PassengerQueue, QueueSeeder, RandomQueue};

/// Overall game status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Playing,
    /// Every passenger has boarded
    Cleared,
    /// The front passenger has no bus with a free seat
    Stuck,
}

/// The game engine
pub struct GameState {
    config: GameConfig,
    grid: Grid,
    queue: PassengerQueue,
    buses: Vec<Bus>,
    seeder: Box<dyn QueueSeeder>,
    observers: Vec<Box<dyn GameObserver>>,
}

impl GameState {
    /// Start a game with a randomly generated passenger queue
    pub fn new(config: GameConfig) -> Result<Self, EngineError> {
        let seeder = RandomQueue::from_config(&config);
        Self::with_seeder(config, seeder)
    }

    /// Start a game whose queues come from `seeder`
    pub fn with_seeder(
        config: GameConfig,
        seeder: impl QueueSeeder + 'static,
    ) -> Result<Self, EngineError> {
        config.validate()?;

        let mut state = Self {
            grid: Grid::new(config.grid_size),
            queue: PassengerQueue::default(),
            buses: Vec::with_capacity(config.bus_count()),
            seeder: Box::new(seeder),
            observers: Vec::new(),
            config,
        };
        state.populate()?;

        log::info!(
            "Game started: {} buses, {} passengers",
            state.buses.len(),
            state.queue.len()
        );
        Ok(state)
    }

    /// Lay out a fresh game: empty grid, new queue, buses at their home cells
    fn populate(&mut self) -> Result<(), EngineError> {
        self.grid = Grid::new(self.config.grid_size);
        self.queue = PassengerQueue::new(
            self.seeder
                .seed_queue(&self.config.palette, self.config.queue_length),
        );

        let home_col = self.config.home_column();
        let colors = self
            .config
            .palette
            .iter()
            .flat_map(|&color| std::iter::repeat(color).take(self.config.buses_per_color));

        self.buses.clear();
        for (row, color) in colors.enumerate() {
            let bus = Bus::new(
                BusId(row),
                color,
                self.config.bus_capacity,
                Position::new(row, home_col),
            );
            self.grid.place(bus.home, bus.occupant())?;
            self.buses.push(bus);
        }
        Ok(())
    }

    /// Register a render callback / notification sink
    pub fn subscribe(&mut self, observer: impl GameObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn queue(&self) -> &PassengerQueue {
        &self.queue
    }

    pub fn remaining_passengers(&self) -> usize {
        self.queue.len()
    }

    pub fn buses(&self) -> &[Bus] {
        &self.buses
    }

    pub fn bus(&self, id: BusId) -> Result<&Bus, EngineError> {
        self.buses.get(id.0).ok_or(EngineError::UnknownBus(id))
    }

    /// First bus of `color` that still has a free seat
    pub fn bus_by_color(&self, color: Color) -> Option<&Bus> {
        self.buses
            .iter()
            .find(|bus| bus.color == color && !bus.is_full())
    }

    /// Whether any bus is mid-traversal
    pub fn any_moving(&self) -> bool {
        self.buses.iter().any(|bus| bus.is_moving)
    }

    /// True iff `(row, col)` is inside the grid and unoccupied
    pub fn can_move_to(&self, row: isize, col: isize) -> bool {
        self.grid.is_free(row, col)
    }

    /// True iff passengers remain and none of the buses matching the front
    /// passenger has a free seat
    pub fn is_stuck(&self) -> bool {
        match self.queue.front() {
            None => false,
            Some(front) => !self
                .buses
                .iter()
                .any(|bus| bus.color == front && !bus.is_full()),
        }
    }

    pub fn status(&self) -> GameStatus {
        if self.queue.is_empty() {
            GameStatus::Cleared
        } else if self.is_stuck() {
            GameStatus::Stuck
        } else {
            GameStatus::Playing
        }
    }

    /// Try to board the front passenger onto `id`.
    ///
    /// Returns true only when a passenger actually boarded. A failed attempt
    /// re-evaluates the stuck condition and notifies observers if stuck.
    pub fn board_passengers(&mut self, id: BusId) -> Result<bool, EngineError> {
        self.bus(id)?;
        let boarded = self.board(id);
        if boarded {
            self.render();
        }
        Ok(boarded)
    }

    fn board(&mut self, id: BusId) -> bool {
        let bus = &mut self.buses[id.0];

        if bus.is_full() {
            log::debug!("Bus {} ({}) is full", bus.id, bus.color);
            self.check_stuck();
            return false;
        }

        let front = match self.queue.peek() {
            Ok(front) => front,
            Err(e) => {
                log::debug!("Bus {} ({}) not boarding: {}", bus.id, bus.color, e);
                return false;
            }
        };

        if front == bus.color {
            self.queue.pop_if(front);
            bus.boarded += 1;
            log::debug!(
                "Bus {} ({}) boarded a passenger: {}/{}, {} waiting",
                bus.id,
                bus.color,
                bus.boarded,
                bus.capacity,
                self.queue.len()
            );
            if self.queue.is_empty() {
                log::info!("Passenger queue cleared");
                self.observers.iter_mut().for_each(|o| o.on_cleared());
            }
            return true;
        }

        self.check_stuck();
        false
    }

    fn check_stuck(&mut self) {
        if self.is_stuck() {
            log::info!(
                "Game stuck: no bus can take the {} passenger",
                self.queue.front().map(Color::name).unwrap_or("next")
            );
            self.observers.iter_mut().for_each(|o| o.on_stuck());
        }
    }

    /// Start a traversal for `id`. Returns false if one is already running.
    pub fn request_move(&mut self, id: BusId) -> Result<bool, EngineError> {
        let bus = self
            .buses
            .get_mut(id.0)
            .ok_or(EngineError::UnknownBus(id))?;
        if bus.is_moving {
            return Ok(false);
        }

        bus.is_moving = true;
        bus.phase = BusPhase::MovingOut;
        log::debug!("Bus {} ({}) heading to the gate", bus.id, bus.color);
        self.render();
        Ok(true)
    }

    /// Advance `id` by one step of its traversal.
    ///
    /// A return trip blocked by another bus fails with
    /// `EngineError::OccupiedDestination`; the bus keeps its phase and the
    /// step can be retried once the cell frees up.
    pub fn step_traversal(&mut self, id: BusId) -> Result<StepOutcome, EngineError> {
        let phase = self.bus(id)?.phase;

        let outcome = if phase == BusPhase::AtBoardingGate {
            let boarded = self.board(id);
            self.buses[id.0].phase = BusPhase::MovingBack;
            StepOutcome::Boarded { boarded }
        } else {
            let bus = &mut self.buses[id.0];
            Traversal::advance(bus, &mut self.grid).inspect_err(|e| {
                log::warn!("Bus {} cannot return yet: {}", id, e);
            })?
        };

        log::debug!("Bus {} step: {:?}", id, outcome);
        if outcome != StepOutcome::Idle {
            self.render();
        }
        Ok(outcome)
    }

    /// Request a move and step it until the bus parks. A failed step is
    /// returned as-is and leaves the traversal in progress.
    pub fn run_traversal(&mut self, id: BusId) -> Result<Vec<StepOutcome>, EngineError> {
        self.request_move(id)?;

        let mut outcomes = Vec::new();
        loop {
            let outcome = self.step_traversal(id)?;
            outcomes.push(outcome);
            if outcome.is_terminal() {
                return Ok(outcomes);
            }
        }
    }

    /// Start over with a new passenger queue. Refused while a bus is moving.
    pub fn reset(&mut self) -> Result<(), EngineError> {
        if self.any_moving() {
            log::warn!("Reset refused: traversal in progress");
            return Err(EngineError::TraversalInProgress);
        }

        self.populate()?;
        log::info!("Game reset: {} passengers", self.queue.len());
        self.render();
        Ok(())
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            grid_size: self.grid.size(),
            grid: self.grid.color_rows(),
            queue: self.queue.to_vec(),
            buses: self.buses.iter().map(BusSnapshot::from).collect(),
            status: self.status(),
        }
    }

    fn render(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        self.observers
            .iter_mut()
            .for_each(|o| o.on_render(&snapshot));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::events::{EventLog, GameEvent};
    use crate::engine::grid::Occupant;
    use crate::engine::passenger::FixedQueue;
    use crate::engine::passenger::Color::{Blue, Green, Red, Yellow};

    const RED: BusId = BusId(0);
    const BLUE: BusId = BusId(1);

    fn game(queue: Vec<Color>) -> GameState {
        GameState::with_seeder(GameConfig::default(), FixedQueue(queue)).unwrap()
    }

    fn observed(queue: Vec<Color>) -> (GameState, EventLog) {
        let mut state = game(queue);
        let log = EventLog::new();
        state.subscribe(log.clone());
        (state, log)
    }

    #[test]
    fn test_initial_layout() {
        let state = game(vec![Red]);
        assert_eq!(state.buses().len(), 4);
        for (row, bus) in state.buses().iter().enumerate() {
            assert_eq!(bus.position, Position::new(row, 7));
            assert_eq!(bus.color, Color::ALL[row]);
            assert_eq!(bus.phase, BusPhase::Parked);
        }
        assert_eq!(state.grid().occupied_count(), 4);
    }

    #[test]
    fn test_layout_with_two_buses_per_color() {
        let config = GameConfig { buses_per_color: 2, ..Default::default() };
        let state = GameState::with_seeder(config, FixedQueue(vec![])).unwrap();
        let colors: Vec<Color> = state.buses().iter().map(|b| b.color).collect();
        assert_eq!(colors, vec![Red, Red, Blue, Blue, Yellow, Yellow, Green, Green]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = GameConfig { grid_size: 2, ..Default::default() };
        assert!(matches!(
            GameState::new(config),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_can_move_to() {
        let state = game(vec![Red]);
        assert!(state.can_move_to(0, 6));
        assert!(!state.can_move_to(0, 7));
        assert!(!state.can_move_to(0, -1));
        assert!(!state.can_move_to(8, 0));
        assert!(state.can_move_to(5, 7));
    }

    #[test]
    fn test_board_matching_front() {
        let mut state = game(vec![Red, Blue]);
        assert_eq!(state.board_passengers(BLUE), Ok(false));
        assert_eq!(state.remaining_passengers(), 2);
        assert_eq!(state.board_passengers(RED), Ok(true));
        assert_eq!(state.remaining_passengers(), 1);
        assert_eq!(state.bus(RED).unwrap().boarded, 1);
    }

    #[test]
    fn test_board_on_full_bus_leaves_queue() {
        let mut state = game(vec![Red; 6]);
        for _ in 0..4 {
            assert_eq!(state.board_passengers(RED), Ok(true));
        }
        assert_eq!(state.board_passengers(RED), Ok(false));
        assert_eq!(state.remaining_passengers(), 2);
        assert_eq!(state.bus(RED).unwrap().boarded, 4);
    }

    #[test]
    fn test_board_on_empty_queue_is_silent() {
        let (mut state, log) = observed(vec![]);
        assert_eq!(state.board_passengers(RED), Ok(false));
        assert!(log.events().is_empty());
    }

    #[test]
    fn test_board_unknown_bus() {
        let mut state = game(vec![Red]);
        assert_eq!(
            state.board_passengers(BusId(9)),
            Err(EngineError::UnknownBus(BusId(9)))
        );
    }

    #[test]
    fn test_is_stuck_tracks_front_color() {
        let mut state = game(vec![Red; 5]);
        assert!(!state.is_stuck());
        for _ in 0..4 {
            state.board_passengers(RED).unwrap();
        }
        assert!(state.is_stuck());
        assert_eq!(state.status(), GameStatus::Stuck);
    }

    #[test]
    fn test_is_stuck_false_when_empty() {
        let state = game(vec![]);
        assert!(!state.is_stuck());
        assert_eq!(state.status(), GameStatus::Cleared);
    }

    #[test]
    fn test_stuck_with_second_bus_of_color() {
        let config = GameConfig { buses_per_color: 2, ..Default::default() };
        let mut state = GameState::with_seeder(config, FixedQueue(vec![Red; 6])).unwrap();
        for _ in 0..4 {
            state.board_passengers(BusId(0)).unwrap();
        }
        assert!(!state.is_stuck());
        assert_eq!(state.bus_by_color(Red).map(|b| b.id), Some(BusId(1)));
    }

    #[test]
    fn test_request_move_is_not_reentrant() {
        let mut state = game(vec![Red]);
        assert_eq!(state.request_move(RED), Ok(true));
        assert_eq!(state.request_move(RED), Ok(false));
        assert_eq!(state.bus(RED).unwrap().phase, BusPhase::MovingOut);
    }

    #[test]
    fn test_step_parked_bus_is_idle() {
        let (mut state, log) = observed(vec![Red]);
        assert_eq!(state.step_traversal(RED), Ok(StepOutcome::Idle));
        assert!(log.events().is_empty());
    }

    #[test]
    fn test_full_traversal_boards_and_returns() {
        let mut state = game(vec![Red, Blue]);
        let outcomes = state.run_traversal(RED).unwrap();

        assert_eq!(outcomes.len(), 7 + 1 + 7);
        assert_eq!(outcomes[7], StepOutcome::Boarded { boarded: true });
        assert_eq!(
            outcomes.last(),
            Some(&StepOutcome::Parked { at: Position::new(0, 7) })
        );

        let bus = state.bus(RED).unwrap();
        assert_eq!(bus.position, bus.home);
        assert_eq!(bus.boarded, 1);
        assert!(!bus.is_moving);
        assert_eq!(state.queue().to_vec(), vec![Blue]);
        assert_eq!(state.grid().occupied_count(), 4);
    }

    #[test]
    fn test_failed_boarding_still_returns() {
        let mut state = game(vec![Blue]);
        let outcomes = state.run_traversal(RED).unwrap();
        assert!(outcomes.contains(&StepOutcome::Boarded { boarded: false }));
        assert_eq!(state.bus(RED).unwrap().position, Position::new(0, 7));
        assert_eq!(state.remaining_passengers(), 1);
    }

    #[test]
    fn test_blocked_outbound_stays_put() {
        let mut state = game(vec![Red]);
        let wall = Occupant { bus: BusId(99), color: Green };
        state.grid.place(Position::new(0, 4), wall).unwrap();

        let outcomes = state.run_traversal(RED).unwrap();
        assert_eq!(
            outcomes.last(),
            Some(&StepOutcome::Blocked { at: Position::new(0, 5) })
        );
        let bus = state.bus(RED).unwrap();
        assert_eq!(bus.position, Position::new(0, 5));
        assert_eq!(bus.phase, BusPhase::Parked);
        assert!(!state.can_move_to(0, 5));
        assert!(state.can_move_to(0, 7));

        // A later move picks up from where it stopped
        assert_eq!(state.request_move(RED), Ok(true));
        assert_eq!(
            state.step_traversal(RED),
            Ok(StepOutcome::Blocked { at: Position::new(0, 5) })
        );
    }

    #[test]
    fn test_blocked_return_is_retryable() {
        let mut state = game(vec![Red]);
        state.request_move(RED).unwrap();
        for _ in 0..8 {
            state.step_traversal(RED).unwrap();
        }
        assert_eq!(state.bus(RED).unwrap().phase, BusPhase::MovingBack);

        let intruder = Occupant { bus: BusId(99), color: Green };
        state.grid.place(Position::new(0, 1), intruder).unwrap();
        let err = state.step_traversal(RED).unwrap_err();
        assert_eq!(err, EngineError::OccupiedDestination { row: 0, col: 1 });
        assert!(err.is_retryable());
        assert_eq!(state.bus(RED).unwrap().phase, BusPhase::MovingBack);
        assert_eq!(state.grid().get(Position::new(0, 1)).unwrap(), Some(intruder));

        state.grid.relocate(Position::new(0, 1), Position::new(5, 1), intruder).unwrap();
        assert_eq!(
            state.step_traversal(RED),
            Ok(StepOutcome::Advanced { to: Position::new(0, 1) })
        );
    }

    #[test]
    fn test_cleared_fires_once() {
        let (mut state, log) = observed(vec![Red]);
        state.run_traversal(RED).unwrap();
        state.run_traversal(RED).unwrap();
        assert_eq!(log.count(&GameEvent::Cleared), 1);
        assert_eq!(log.count(&GameEvent::Stuck), 0);
        assert_eq!(state.status(), GameStatus::Cleared);
    }

    #[test]
    fn test_stuck_fires_on_failed_attempt() {
        let (mut state, log) = observed(vec![Red, Red, Red, Red, Red]);
        for _ in 0..4 {
            state.board_passengers(RED).unwrap();
        }
        assert_eq!(log.count(&GameEvent::Stuck), 0);
        state.board_passengers(BLUE).unwrap();
        assert_eq!(log.count(&GameEvent::Stuck), 1);
        state.board_passengers(RED).unwrap();
        assert_eq!(log.count(&GameEvent::Stuck), 2);
    }

    #[test]
    fn test_render_after_each_change() {
        let (mut state, log) = observed(vec![Red]);
        state.request_move(RED).unwrap();
        state.step_traversal(RED).unwrap();
        assert_eq!(
            log.events(),
            vec![
                GameEvent::Rendered { remaining: 1 },
                GameEvent::Rendered { remaining: 1 },
            ]
        );
    }

    #[test]
    fn test_reset_refused_while_moving() {
        let mut state = game(vec![Red]);
        state.request_move(RED).unwrap();
        state.step_traversal(RED).unwrap();
        assert_eq!(state.reset(), Err(EngineError::TraversalInProgress));
        assert_eq!(state.bus(RED).unwrap().position, Position::new(0, 6));
    }

    #[test]
    fn test_reset_restores_layout() {
        let mut state = game(vec![Red, Red]);
        state.run_traversal(RED).unwrap();
        state.reset().unwrap();

        assert_eq!(state.remaining_passengers(), 2);
        assert!(state.buses().iter().all(|b| b.boarded == 0 && b.position == b.home));
        assert_eq!(state.grid().occupied_count(), 4);
    }

    #[test]
    fn test_reset_reseeds_from_rng() {
        let config = GameConfig { seed: Some(11), ..Default::default() };
        let mut state = GameState::new(config.clone()).unwrap();
        let first = state.queue().to_vec();
        state.reset().unwrap();
        assert_eq!(state.remaining_passengers(), config.queue_length);
        assert!(state.queue().iter().all(|c| config.palette.contains(&c)));

        let replay = GameState::new(config).unwrap();
        assert_eq!(replay.queue().to_vec(), first);
    }

    #[test]
    fn test_snapshot_serializes() {
        let state = game(vec![Red, Green]);
        let snapshot = state.snapshot();
        assert_eq!(snapshot.grid[0][7], Some(Red));
        assert_eq!(snapshot.buses.len(), 4);

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: GameSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
