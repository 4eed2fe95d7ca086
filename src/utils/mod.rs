pub mod errors;
pub mod record_store;

pub use errors::{GameError, GameResult};
pub use record_store::{RecordStore, RecordSummary, SessionRecord};
