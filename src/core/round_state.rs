use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const LOSS_MESSAGE: &str = "Unfortunately you chose the wrong number. Game over! 😢";
pub const WIN_MESSAGE: &str = "Congratulations, you won! 😁🎉";

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Lost,
    Won,
}

impl Outcome {
    pub fn message(&self) -> &'static str {
        match self {
            Outcome::Lost => LOSS_MESSAGE,
            Outcome::Won => WIN_MESSAGE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Active,
    Lost,
    Won,
}

/// Numeric state of one game.
///
/// `x` is the running total the player keeps inside `[rmn, rmx]`, `y` is
/// the increment added this round. Only [`RoundEngine`](crate::core::RoundEngine)
/// mutates it; collaborators get shared references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundState {
    pub x: i32,
    pub y: i32,
    pub rmn: i32,
    pub rmx: i32,
    pub rounds: u32,
    pub time_remaining: u32,
    pub outcome: Option<Outcome>,
}

impl RoundState {
    pub fn is_game_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn outcome_message(&self) -> Option<&'static str> {
        self.outcome.as_ref().map(Outcome::message)
    }

    pub fn phase(&self) -> Phase {
        match self.outcome {
            None => Phase::Active,
            Some(Outcome::Lost) => Phase::Lost,
            Some(Outcome::Won) => Phase::Won,
        }
    }

    /// `x + y`, widened so no choice of `z` can overflow the update.
    pub fn sum(&self) -> i64 {
        i64::from(self.x) + i64::from(self.y)
    }

    /// True when letting every block fall (`z = 0`) would overshoot `rmx`.
    pub fn needs_subtraction(&self) -> bool {
        self.sum() > i64::from(self.rmx)
    }

    /// Values of `z` that keep `x + y - z` inside the current bounds.
    pub fn safe_range(&self) -> RangeInclusive<i64> {
        (self.sum() - i64::from(self.rmx))..=(self.sum() - i64::from(self.rmn))
    }

    pub fn is_safe(&self, z: i32) -> bool {
        self.safe_range().contains(&i64::from(z))
    }

    /// Whether every field stays within `±limit`.
    pub fn within_magnitude(&self, limit: i32) -> bool {
        [self.x, self.y, self.rmn, self.rmx]
            .iter()
            .all(|value| (-limit..=limit).contains(value))
    }

    pub fn in_bounds(&self) -> bool {
        (self.rmn..=self.rmx).contains(&self.x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> RoundState {
        RoundState {
            x: 5,
            y: 3,
            rmn: 2,
            rmx: 10,
            rounds: 0,
            time_remaining: 120,
            outcome: None,
        }
    }

    #[test]
    fn test_safe_range() {
        let state = scenario();
        assert_eq!(state.safe_range(), -2..=6);
        assert!(state.is_safe(0));
        assert!(state.is_safe(6));
        assert!(!state.is_safe(7));
        assert!(!state.needs_subtraction());
    }

    #[test]
    fn test_extreme_values_do_not_overflow() {
        let mut state = scenario();
        state.x = i32::MAX;
        state.y = i32::MAX;

        assert_eq!(state.sum(), 2 * i64::from(i32::MAX));
        assert!(state.needs_subtraction());
        assert!(!state.is_safe(i32::MIN));
        assert!(!state.within_magnitude(1_000));
        assert!(scenario().within_magnitude(10));
    }

    #[test]
    fn test_needs_subtraction() {
        let mut state = scenario();
        state.y = 9;
        assert!(state.needs_subtraction());
        assert!(!state.is_safe(0));
        assert!(state.is_safe(4));
    }

    #[test]
    fn test_phase_and_messages() {
        let mut state = scenario();
        assert_eq!(state.phase(), Phase::Active);
        assert!(state.outcome_message().is_none());

        state.outcome = Some(Outcome::Lost);
        assert!(state.is_game_over());
        assert_eq!(state.phase(), Phase::Lost);
        assert_eq!(state.outcome_message(), Some(LOSS_MESSAGE));

        state.outcome = Some(Outcome::Won);
        assert_eq!(state.phase(), Phase::Won);
        assert_eq!(state.outcome_message(), Some(WIN_MESSAGE));
    }
}
