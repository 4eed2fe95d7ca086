use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const FIELD_WIDTH: i32 = 550;
pub const FIELD_HEIGHT: i32 = 580;
pub const LANES: [i32; 5] = [75, 175, 275, 375, 475];
pub const BLOCK_SIZE: i32 = 50;
pub const SPAWN_HEIGHT: i32 = 535;
pub const PADDLE_WIDTH: i32 = 35;
pub const PADDLE_HEIGHT: i32 = 50;
pub const PADDLE_STEP: i32 = 20;
pub const PADDLE_START: i32 = FIELD_WIDTH / 2;
pub const WRAP_LEFT: i32 = -10;
pub const WRAP_RIGHT: i32 = 560;

/// How a round ended from the player's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Caught(i32),
    /// Nothing was intercepted; equivalent to choosing zero.
    Missed,
}

impl Selection {
    pub fn value(&self) -> i32 {
        match self {
            Selection::Caught(z) => *z,
            Selection::Missed => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallSpeed {
    Slow,
    Medium,
    Fast,
}

impl FallSpeed {
    pub const ALL: [FallSpeed; 3] = [FallSpeed::Slow, FallSpeed::Medium, FallSpeed::Fast];

    pub fn gravity_multiplier(&self) -> f32 {
        match self {
            FallSpeed::Slow => 0.8,
            FallSpeed::Medium => 1.2,
            FallSpeed::Fast => 3.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FallSpeed::Slow => "Slow",
            FallSpeed::Medium => "Medium",
            FallSpeed::Fast => "Fast",
        }
    }
}

impl std::str::FromStr for FallSpeed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "slow" | "1" => Ok(FallSpeed::Slow),
            "medium" | "2" => Ok(FallSpeed::Medium),
            "fast" | "3" => Ok(FallSpeed::Fast),
            other => Err(format!("unknown speed '{}', expected slow, medium or fast", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallingBlock {
    pub value: i32,
    pub lane_x: i32,
}

impl FallingBlock {
    fn overlaps_paddle(&self, paddle_x: i32) -> bool {
        // Strict: touching edges is not a catch.
        (self.lane_x - paddle_x).abs() * 2 < BLOCK_SIZE + PADDLE_WIDTH
    }
}

/// Block and paddle geometry for one round.
#[derive(Debug, Clone)]
pub struct Playfield {
    paddle_x: i32,
    blocks: Vec<FallingBlock>,
    altitude: f32,
}

impl Playfield {
    pub fn new() -> Self {
        Self {
            paddle_x: PADDLE_START,
            blocks: Vec::new(),
            altitude: SPAWN_HEIGHT as f32,
        }
    }

    pub fn paddle_x(&self) -> i32 {
        self.paddle_x
    }

    pub fn blocks(&self) -> &[FallingBlock] {
        &self.blocks
    }

    /// Height of the centre of the falling blocks.
    pub fn altitude(&self) -> f32 {
        self.altitude
    }

    pub fn reset_paddle(&mut self) {
        self.paddle_x = PADDLE_START;
    }

    /// Drop a new set of blocks, each in its own random lane.
    pub fn spawn<R: Rng>(&mut self, values: &[i32], rng: &mut R) {
        if values.len() > LANES.len() {
            warn!("{} candidates but only {} lanes; dropping the extras", values.len(), LANES.len());
        }

        let mut free: Vec<i32> = LANES.to_vec();
        self.blocks = values
            .iter()
            .take(LANES.len())
            .map(|&value| {
                let lane_x = free.remove(rng.gen_range(0..free.len()));
                FallingBlock { value, lane_x }
            })
            .collect();
        self.altitude = SPAWN_HEIGHT as f32;
    }

    pub fn move_paddle(&mut self, direction: Direction) {
        self.paddle_x = match direction {
            Direction::Left if self.paddle_x > WRAP_LEFT => self.paddle_x - PADDLE_STEP,
            Direction::Left => WRAP_RIGHT,
            Direction::Right if self.paddle_x < WRAP_RIGHT => self.paddle_x + PADDLE_STEP,
            Direction::Right => WRAP_LEFT,
        };
    }

    /// The block currently above the paddle, if any.
    pub fn block_above_paddle(&self) -> Option<&FallingBlock> {
        self.blocks.iter().find(|block| block.overlaps_paddle(self.paddle_x))
    }

    /// Let the blocks fall by `distance`. Returns the selection once they
    /// reach the paddle line; the field is then empty until the next spawn.
    pub fn advance(&mut self, distance: f32) -> Option<Selection> {
        if self.blocks.is_empty() {
            return None;
        }

        self.altitude -= distance;
        let contact = (PADDLE_HEIGHT + BLOCK_SIZE / 2) as f32;
        if self.altitude > contact {
            return None;
        }

        let selection = match self.block_above_paddle() {
            Some(block) => Selection::Caught(block.value),
            None => Selection::Missed,
        };
        debug!("Blocks landed with paddle at {}: {:?}", self.paddle_x, selection);

        self.blocks.clear();
        Some(selection)
    }
}

impl Default for Playfield {
    fn default() -> Self {
        Self::new()
    }
}
