pub mod engine;
pub mod events;
pub mod playfield;
pub mod round_state;
pub mod rules;
pub mod session;

pub use engine::{RoundEngine, RoundResult};
pub use events::{GameEvent, GameEventHandler, GameEventType};
pub use playfield::{Direction, FallSpeed, Playfield, Selection};
pub use round_state::{Outcome, Phase, RoundState};
pub use rules::Rules;
pub use session::{ClockTick, GameSession, RoundReport};
