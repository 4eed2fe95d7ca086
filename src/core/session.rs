//! One play-through as seen by the host.
//!
//! The session is the collaborator around [`RoundEngine`]: it drops the
//! candidates onto the [`Playfield`], turns paddle contact into a
//! [`Selection`], runs the countdown and notifies observers. All of its
//! methods are called from the host's single control flow, which keeps the
//! clock and the player's moves from interleaving.

use chrono::{DateTime, Utc};
use uuid::Uuid;
use tracing::info;

use crate::config::GameConfig;
use crate::core::engine::{RoundEngine, RoundResult};
use crate::core::events::{CompositeEventHandler, EventLogger, GameEvent, GameEventHandler, TracingEventHandler};
use crate::core::playfield::{Direction, FallSpeed, Playfield, Selection};
use crate::core::round_state::{Outcome, RoundState};
use crate::utils::GameResult;

/// A round that just resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundReport {
    pub selection: Selection,
    pub result: RoundResult,
    pub previous_x: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockTick {
    Running(u32),
    Expired,
    /// The game had already ended; the clock no longer runs.
    Stopped,
}

pub struct GameSession {
    id: Uuid,
    seed: u64,
    engine: RoundEngine,
    field: Playfield,
    speed: FallSpeed,
    fall_velocity: f32,
    candidates: Vec<i32>,
    history: EventLogger,
    observers: CompositeEventHandler,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl GameSession {
    pub fn new(config: &GameConfig) -> GameResult<Self> {
        let seed = config.seed.unwrap_or_else(rand::random);
        let engine = RoundEngine::seeded(config.rules(), seed)?;

        let mut observers = CompositeEventHandler::new();
        observers.add_handler(TracingEventHandler);

        let mut session = Self {
            id: Uuid::new_v4(),
            seed,
            engine,
            field: Playfield::new(),
            speed: config.default_speed,
            fall_velocity: config.fall_velocity,
            candidates: Vec::new(),
            history: EventLogger::default(),
            observers,
            started_at: Utc::now(),
            finished_at: None,
        };

        info!("Session {} started with seed {}", session.id, seed);
        let event = GameEvent::game_started(seed, session.engine.state());
        session.emit(event);
        session.start_round();

        Ok(session)
    }

    pub fn subscribe<H: GameEventHandler + Send + 'static>(&mut self, handler: H) {
        self.observers.add_handler(handler);
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn state(&self) -> &RoundState {
        self.engine.state()
    }

    pub fn field(&self) -> &Playfield {
        &self.field
    }

    pub fn candidates(&self) -> &[i32] {
        &self.candidates
    }

    pub fn speed(&self) -> FallSpeed {
        self.speed
    }

    pub fn history(&self) -> &EventLogger {
        &self.history
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// When the outcome was decided; `None` while the game runs.
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Playing time, frozen once the game is over.
    pub fn elapsed_secs(&self) -> i64 {
        let end = self.finished_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_seconds()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.engine.state().outcome
    }

    pub fn move_paddle(&mut self, direction: Direction) {
        if !self.engine.state().is_game_over() {
            self.field.move_paddle(direction);
        }
    }

    pub fn set_speed(&mut self, speed: FallSpeed) {
        if speed != self.speed {
            self.speed = speed;
            self.emit(GameEvent::speed_changed(speed));
        }
    }

    /// Let the blocks fall for one frame and resolve the round on contact.
    pub fn advance_frame(&mut self) -> Option<RoundReport> {
        if self.engine.state().is_game_over() {
            return None;
        }

        let distance = self.fall_velocity * self.speed.gravity_multiplier();
        let selection = self.field.advance(distance)?;

        let previous_x = self.engine.state().x;
        let result = self.engine.resolve(selection);
        let x = self.engine.state().x;

        let event = match selection {
            Selection::Caught(z) => GameEvent::block_caught(z, previous_x, x),
            Selection::Missed => GameEvent::block_missed(previous_x, x),
        };
        self.emit(event);

        match result {
            RoundResult::Survived { range_shifted } => {
                if range_shifted {
                    let state = self.engine.state();
                    let event = GameEvent::range_shifted(state.rmn, state.rmx);
                    self.emit(event);
                }
                self.start_round();
            }
            RoundResult::Lost => {
                self.finished_at = Some(Utc::now());
                let event = GameEvent::game_lost(self.engine.state());
                self.emit(event);
            }
            RoundResult::Ignored => {}
        }

        Some(RoundReport {
            selection,
            result,
            previous_x,
        })
    }

    /// One second of the countdown. The win is declared when it hits zero.
    pub fn tick_clock(&mut self) -> ClockTick {
        if self.engine.state().is_game_over() {
            return ClockTick::Stopped;
        }

        match self.engine.decrement_time() {
            0 => {
                self.engine.declare_win();
                self.finished_at = Some(Utc::now());
                let event = GameEvent::game_won(self.engine.state().rounds);
                self.emit(event);
                ClockTick::Expired
            }
            remaining => ClockTick::Running(remaining),
        }
    }

    /// Start over with the same seed stream and settings.
    pub fn restart(&mut self) {
        self.engine.new_game();
        self.field.reset_paddle();
        self.id = Uuid::new_v4();
        self.started_at = Utc::now();
        self.finished_at = None;

        let event = GameEvent::game_restarted(self.engine.state());
        self.emit(event);
        self.start_round();
    }

    fn start_round(&mut self) {
        self.candidates = self.engine.generate_candidates();
        self.field.spawn(&self.candidates, self.engine.rng_mut());

        let event = GameEvent::round_started(self.engine.state(), &self.candidates);
        self.emit(event);
    }

    fn emit(&mut self, event: GameEvent) {
        self.history.handle_event(&event);
        self.observers.handle_event(&event);
    }
}
