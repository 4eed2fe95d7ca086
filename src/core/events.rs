use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use tracing::{debug, info};
use crate::core::playfield::FallSpeed;
use crate::core::round_state::RoundState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameEvent {
    pub id: Uuid,
    pub event_type: GameEventType,
    pub timestamp: DateTime<Utc>,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEventType {
    GameStarted,
    RoundStarted,
    BlockCaught,
    BlockMissed,
    RangeShifted,
    GameLost,
    GameWon,
    GameRestarted,
    SpeedChanged,
    Custom(String),
}

impl GameEvent {
    pub fn new(event_type: GameEventType, data: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type,
            timestamp: Utc::now(),
            data,
        }
    }

    pub fn game_started(seed: u64, state: &RoundState) -> Self {
        let data = serde_json::json!({
            "seed": seed,
            "x": state.x,
            "rmn": state.rmn,
            "rmx": state.rmx,
            "time_limit": state.time_remaining
        });
        Self::new(GameEventType::GameStarted, data)
    }

    pub fn round_started(state: &RoundState, candidates: &[i32]) -> Self {
        let data = serde_json::json!({
            "round": state.rounds + 1,
            "x": state.x,
            "y": state.y,
            "rmn": state.rmn,
            "rmx": state.rmx,
            "candidates": candidates
        });
        Self::new(GameEventType::RoundStarted, data)
    }

    pub fn block_caught(z: i32, old_x: i32, new_x: i32) -> Self {
        let data = serde_json::json!({
            "z": z,
            "old_x": old_x,
            "new_x": new_x
        });
        Self::new(GameEventType::BlockCaught, data)
    }

    pub fn block_missed(old_x: i32, new_x: i32) -> Self {
        let data = serde_json::json!({
            "old_x": old_x,
            "new_x": new_x
        });
        Self::new(GameEventType::BlockMissed, data)
    }

    pub fn range_shifted(rmn: i32, rmx: i32) -> Self {
        let data = serde_json::json!({
            "rmn": rmn,
            "rmx": rmx
        });
        Self::new(GameEventType::RangeShifted, data)
    }

    pub fn game_lost(state: &RoundState) -> Self {
        let data = serde_json::json!({
            "x": state.x,
            "rmn": state.rmn,
            "rmx": state.rmx,
            "rounds": state.rounds
        });
        Self::new(GameEventType::GameLost, data)
    }

    pub fn game_won(rounds: u32) -> Self {
        let data = serde_json::json!({
            "rounds": rounds
        });
        Self::new(GameEventType::GameWon, data)
    }

    pub fn game_restarted(state: &RoundState) -> Self {
        let data = serde_json::json!({
            "x": state.x,
            "rmn": state.rmn,
            "rmx": state.rmx
        });
        Self::new(GameEventType::GameRestarted, data)
    }

    pub fn speed_changed(speed: FallSpeed) -> Self {
        let data = serde_json::json!({
            "speed": speed,
            "gravity_multiplier": speed.gravity_multiplier()
        });
        Self::new(GameEventType::SpeedChanged, data)
    }

    pub fn custom<S: Into<String>>(event_name: S, data: serde_json::Value) -> Self {
        Self::new(GameEventType::Custom(event_name.into()), data)
    }
}

/// Observer of game state transitions.
pub trait GameEventHandler {
    fn handle_event(&mut self, event: &GameEvent);
}

pub struct EventLogger {
    events: Vec<GameEvent>,
    max_events: usize,
}

impl EventLogger {
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Vec::new(),
            max_events,
        }
    }

    pub fn get_events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn get_events_by_type(&self, event_type: &GameEventType) -> Vec<&GameEvent> {
        self.events
            .iter()
            .filter(|event| std::mem::discriminant(&event.event_type) == std::mem::discriminant(event_type))
            .collect()
    }

    pub fn get_recent_events(&self, count: usize) -> Vec<&GameEvent> {
        self.events.iter().rev().take(count).collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn export_events(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.events)
    }

    pub fn get_event_count(&self) -> usize {
        self.events.len()
    }

    pub fn get_event_count_by_type(&self, event_type: &GameEventType) -> usize {
        self.get_events_by_type(event_type).len()
    }
}

impl Default for EventLogger {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl GameEventHandler for EventLogger {
    fn handle_event(&mut self, event: &GameEvent) {
        self.events.push(event.clone());

        if self.events.len() > self.max_events {
            self.events.remove(0);
        }
    }
}

/// Forwards transitions to the tracing subscriber.
#[derive(Debug, Default)]
pub struct TracingEventHandler;

impl GameEventHandler for TracingEventHandler {
    fn handle_event(&mut self, event: &GameEvent) {
        match &event.event_type {
            GameEventType::GameStarted
            | GameEventType::GameLost
            | GameEventType::GameWon
            | GameEventType::GameRestarted => {
                info!("{:?}: {}", event.event_type, event.data);
            }
            other => debug!("{:?}: {}", other, event.data),
        }
    }
}

pub struct CompositeEventHandler {
    handlers: Vec<Box<dyn GameEventHandler + Send>>,
}

impl CompositeEventHandler {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn add_handler<H: GameEventHandler + Send + 'static>(&mut self, handler: H) {
        self.handlers.push(Box::new(handler));
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for CompositeEventHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl GameEventHandler for CompositeEventHandler {
    fn handle_event(&mut self, event: &GameEvent) {
        for handler in &mut self.handlers {
            handler.handle_event(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn sample_state() -> RoundState {
        RoundState {
            x: 5,
            y: 3,
            rmn: 2,
            rmx: 10,
            rounds: 4,
            time_remaining: 90,
            outcome: None,
        }
    }

    struct Counter(Arc<Mutex<usize>>);

    impl GameEventHandler for Counter {
        fn handle_event(&mut self, _event: &GameEvent) {
            *self.0.lock().unwrap() += 1;
        }
    }

    #[test]
    fn test_round_started_event() {
        let event = GameEvent::round_started(&sample_state(), &[1, 6, 9]);

        assert_eq!(event.event_type, GameEventType::RoundStarted);
        assert_eq!(event.data["round"], 5);
        assert_eq!(event.data["y"], 3);
        assert_eq!(event.data["candidates"], serde_json::json!([1, 6, 9]));
    }

    #[test]
    fn test_speed_changed_event() {
        let event = GameEvent::speed_changed(FallSpeed::Fast);
        assert_eq!(event.data["speed"], "fast");
        assert_eq!(event.data["gravity_multiplier"], 3.0);
    }

    #[test]
    fn test_event_logger_is_bounded() {
        let mut logger = EventLogger::new(3);

        for rounds in 0..4 {
            logger.handle_event(&GameEvent::game_won(rounds));
        }

        assert_eq!(logger.get_event_count(), 3);
        assert_eq!(logger.get_events()[0].data["rounds"], 1);
        assert_eq!(logger.get_recent_events(1)[0].data["rounds"], 3);
    }

    #[test]
    fn test_event_filtering() {
        let mut logger = EventLogger::default();

        logger.handle_event(&GameEvent::game_started(1, &sample_state()));
        logger.handle_event(&GameEvent::block_missed(5, 8));
        logger.handle_event(&GameEvent::block_missed(8, 9));
        logger.handle_event(&GameEvent::custom("note", serde_json::json!({})));

        assert_eq!(logger.get_event_count_by_type(&GameEventType::BlockMissed), 2);
        assert_eq!(logger.get_event_count_by_type(&GameEventType::GameStarted), 1);
        assert_eq!(logger.get_event_count_by_type(&GameEventType::Custom(String::new())), 1);
        assert!(logger.export_events().unwrap().contains("BlockMissed"));
    }

    #[test]
    fn test_composite_event_handler() {
        let seen = Arc::new(Mutex::new(0));
        let mut composite = CompositeEventHandler::new();
        composite.add_handler(Counter(Arc::clone(&seen)));
        composite.add_handler(Counter(Arc::clone(&seen)));
        composite.add_handler(TracingEventHandler);

        composite.handle_event(&GameEvent::game_lost(&sample_state()));

        assert_eq!(composite.len(), 3);
        assert_eq!(*seen.lock().unwrap(), 2);
    }
}
