use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use crate::utils::{GameError, GameResult};

/// Largest magnitude any rule value may take.
pub const RULE_LIMIT: i32 = 1_000_000;

/// Tunable constants of the round arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rules {
    pub start_min: i32,
    pub start_max: i32,
    pub margin_min: i32,
    pub margin_max: i32,
    /// `y` is drawn from `[rmx - x - below, rmx - x + above]`.
    pub increment_below: i32,
    pub increment_above: i32,
    pub decoy_spread: i32,
    pub min_candidates: usize,
    pub max_candidates: usize,
    pub range_shift_one_in: u32,
    pub time_limit_secs: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            start_min: 3,
            start_max: 7,
            margin_min: 3,
            margin_max: 7,
            increment_below: 2,
            increment_above: 10,
            decoy_spread: 7,
            min_candidates: 3,
            max_candidates: 5,
            range_shift_one_in: 4,
            time_limit_secs: 120,
        }
    }
}

impl Rules {
    pub fn start_range(&self) -> RangeInclusive<i32> {
        self.start_min..=self.start_max
    }

    pub fn margin_range(&self) -> RangeInclusive<i32> {
        self.margin_min..=self.margin_max
    }

    pub fn candidate_range(&self) -> RangeInclusive<usize> {
        self.min_candidates..=self.max_candidates
    }

    pub fn validate(&self) -> GameResult<()> {
        let values = [
            ("start_min", self.start_min),
            ("start_max", self.start_max),
            ("margin_min", self.margin_min),
            ("margin_max", self.margin_max),
            ("increment_below", self.increment_below),
            ("increment_above", self.increment_above),
            ("decoy_spread", self.decoy_spread),
        ];
        if let Some((name, value)) = values.iter().find(|(_, value)| !(-RULE_LIMIT..=RULE_LIMIT).contains(value)) {
            return Err(GameError::invalid_rules(format!(
                "{} = {} is outside ±{}",
                name, value, RULE_LIMIT
            )));
        }
        if self.start_min > self.start_max {
            return Err(GameError::invalid_rules("start_min must not exceed start_max"));
        }
        // Both margins must be strictly positive or rmn < x < rmx can break.
        if self.margin_min < 1 {
            return Err(GameError::invalid_rules("margin_min must be at least 1"));
        }
        if self.margin_min > self.margin_max {
            return Err(GameError::invalid_rules("margin_min must not exceed margin_max"));
        }
        if self.increment_below < 0 || self.increment_above < 0 {
            return Err(GameError::invalid_rules("increment window must not be negative"));
        }
        if self.decoy_spread < 0 {
            return Err(GameError::invalid_rules("decoy_spread must not be negative"));
        }
        if self.min_candidates == 0 || self.min_candidates > self.max_candidates {
            return Err(GameError::invalid_rules("candidate count range is empty"));
        }
        if self.range_shift_one_in == 0 {
            return Err(GameError::invalid_rules("range_shift_one_in must be at least 1"));
        }
        if self.time_limit_secs == 0 {
            return Err(GameError::invalid_rules("time limit must be greater than 0"));
        }
        Ok(())
    }
}
