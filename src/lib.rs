pub mod config;
pub mod core;
pub mod tutorial;
pub mod ui;
pub mod utils;

pub use config::Config;
pub use core::{FallSpeed, GameSession, Outcome, RoundEngine, RoundState, Rules, Selection};
pub use ui::GameInterface;

pub type Result<T> = anyhow::Result<T>;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
