//! Round arithmetic of the game.
//!
//! `RoundEngine` owns the [`RoundState`] and is the only thing that mutates
//! it. Every random draw goes through the engine's RNG, so a seeded engine
//! replays identically for the same sequence of calls.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::core::playfield::Selection;
use crate::core::round_state::{Outcome, RoundState};
use crate::core::rules::Rules;
use crate::utils::{GameError, GameResult};

/// Face of the shift die that moves the bounds.
const RANGE_SHIFT_FACE: u32 = 1;

/// Largest magnitude of `x`, `y`, `rmn` or `rmx` accepted by [`RoundEngine::from_state`].
pub const STATE_LIMIT: i32 = 100_000_000;

/// Saturate a widened value back into the state's integer type.
fn narrow(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// What `update_x` did to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundResult {
    Survived { range_shifted: bool },
    Lost,
    /// The game was already over; nothing changed.
    Ignored,
}

pub struct RoundEngine<R = ChaCha8Rng> {
    state: RoundState,
    rules: Rules,
    rng: R,
}

impl RoundEngine<ChaCha8Rng> {
    pub fn seeded(rules: Rules, seed: u64) -> GameResult<Self> {
        Self::with_rng(rules, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> RoundEngine<R> {
    /// Build an engine and start a fresh game.
    pub fn with_rng(rules: Rules, rng: R) -> GameResult<Self> {
        rules.validate()?;

        let mut engine = Self {
            state: RoundState {
                x: 0,
                y: 0,
                rmn: -1,
                rmx: 1,
                rounds: 0,
                time_remaining: rules.time_limit_secs,
                outcome: None,
            },
            rules,
            rng,
        };
        engine.new_game();
        Ok(engine)
    }

    /// Build an engine around an existing state, e.g. a restored one.
    pub fn from_state(state: RoundState, rules: Rules, rng: R) -> GameResult<Self> {
        rules.validate()?;

        if state.rmn >= state.rmx {
            return Err(GameError::invalid_state(format!(
                "lower bound {} must be below upper bound {}",
                state.rmn, state.rmx
            )));
        }
        if !state.within_magnitude(STATE_LIMIT) {
            return Err(GameError::invalid_state(format!(
                "state values must stay within ±{}",
                STATE_LIMIT
            )));
        }
        if !state.is_game_over() && !state.in_bounds() {
            return Err(GameError::invalid_state(format!(
                "active game has x = {} outside [{}, {}]",
                state.x, state.rmn, state.rmx
            )));
        }

        Ok(Self { state, rules, rng })
    }

    /// Reinitialize to round zero. This is the only way out of a finished game.
    pub fn new_game(&mut self) {
        let x = self.rng.gen_range(self.rules.start_range());

        self.state.x = x;
        self.state.rounds = 0;
        self.state.time_remaining = self.rules.time_limit_secs;
        self.state.outcome = None;
        self.shift_range();
        self.draw_increment();

        info!(
            "New game: x = {}, y = {}, range [{}, {}]",
            self.state.x, self.state.y, self.state.rmn, self.state.rmx
        );
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub(crate) fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Values offered to the player this round, in random order.
    ///
    /// When `x + y` already overshoots `rmx`, one of them is guaranteed to
    /// bring the total back into `[rmn, rmx]`. The rest are decoys drawn
    /// from a range `decoy_spread` wider on each side.
    pub fn generate_candidates(&mut self) -> Vec<i32> {
        let count = self.rng.gen_range(self.rules.candidate_range());
        let mut candidates = Vec::with_capacity(count);

        if self.state.needs_subtraction() {
            let safe = self.rng.gen_range(self.state.safe_range());
            candidates.push(narrow(safe));
        }

        let spread = i64::from(self.rules.decoy_spread);
        let sum = self.state.sum();
        let decoys = (sum - i64::from(self.state.rmx) - spread)..=(sum - i64::from(self.state.rmn) + spread);
        while candidates.len() < count {
            candidates.push(narrow(self.rng.gen_range(decoys.clone())));
        }

        candidates.shuffle(&mut self.rng);

        debug!(
            "Round {} candidates {:?} (x + y = {}, safe {:?})",
            self.state.rounds + 1,
            candidates,
            sum,
            self.state.safe_range()
        );
        candidates
    }

    /// Apply the player's choice: `x <- x + y - z`.
    pub fn update_x(&mut self, z: i32) -> RoundResult {
        if self.state.is_game_over() {
            warn!("update_x({}) called after the game ended; ignoring", z);
            return RoundResult::Ignored;
        }

        let x = self.state.sum() - i64::from(z);
        self.state.x = narrow(x);

        if !(i64::from(self.state.rmn)..=i64::from(self.state.rmx)).contains(&x) {
            info!(
                "x = {} left [{}, {}] after {} rounds",
                x, self.state.rmn, self.state.rmx, self.state.rounds
            );
            self.state.outcome = Some(Outcome::Lost);
            return RoundResult::Lost;
        }

        self.draw_increment();
        self.state.rounds += 1;

        let range_shifted = self.rng.gen_range(1..=self.rules.range_shift_one_in) == RANGE_SHIFT_FACE;
        if range_shifted {
            self.shift_range();
            debug!("Range shifted to [{}, {}]", self.state.rmn, self.state.rmx);
        }

        RoundResult::Survived { range_shifted }
    }

    /// Apply a resolved selection; a miss counts as choosing zero.
    pub fn resolve(&mut self, selection: Selection) -> RoundResult {
        self.update_x(selection.value())
    }

    /// Count one second off the clock. Does nothing once the game is over.
    pub fn decrement_time(&mut self) -> u32 {
        if !self.state.is_game_over() {
            self.state.time_remaining = self.state.time_remaining.saturating_sub(1);
        }
        self.state.time_remaining
    }

    /// Mark an active game as won. Returns false if it had already ended.
    pub fn declare_win(&mut self) -> bool {
        if self.state.is_game_over() {
            return false;
        }

        info!("Game won after {} rounds", self.state.rounds);
        self.state.outcome = Some(Outcome::Won);
        true
    }

    fn shift_range(&mut self) {
        let x = i64::from(self.state.x);
        self.state.rmx = narrow(x + i64::from(self.rng.gen_range(self.rules.margin_range())));
        self.state.rmn = narrow(x - i64::from(self.rng.gen_range(self.rules.margin_range())));
    }

    fn draw_increment(&mut self) {
        let gap = i64::from(self.state.rmx) - i64::from(self.state.x);
        let low = gap - i64::from(self.rules.increment_below);
        let high = gap + i64::from(self.rules.increment_above);
        self.state.y = narrow(self.rng.gen_range(low..=high));
    }
}
