use thiserror::Error;

pub type GameResult<T> = Result<T, GameError>;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Invalid game state: {message}")]
    InvalidState { message: String },

    #[error("Invalid rules: {message}")]
    InvalidRules { message: String },

    #[error("Record store error: {message}")]
    Record { message: String },

    #[error("Record not found: {record_id}")]
    RecordNotFound { record_id: String },

    #[error("Terminal error: {message}")]
    Terminal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
}

impl GameError {
    pub fn invalid_state<S: Into<String>>(message: S) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    pub fn invalid_rules<S: Into<String>>(message: S) -> Self {
        Self::InvalidRules {
            message: message.into(),
        }
    }

    pub fn record<S: Into<String>>(message: S) -> Self {
        Self::Record {
            message: message.into(),
        }
    }

    pub fn record_not_found<S: Into<String>>(record_id: S) -> Self {
        Self::RecordNotFound {
            record_id: record_id.into(),
        }
    }

    pub fn terminal<S: Into<String>>(message: S) -> Self {
        Self::Terminal {
            message: message.into(),
        }
    }

    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = GameError::invalid_state("rmn must be below rmx");
        assert!(matches!(error, GameError::InvalidState { .. }));
        assert_eq!(error.to_string(), "Invalid game state: rmn must be below rmx");
    }

    #[test]
    fn test_record_not_found_error() {
        let error = GameError::record_not_found("abc");
        assert!(matches!(error, GameError::RecordNotFound { .. }));
        assert_eq!(error.to_string(), "Record not found: abc");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let error: GameError = io.into();
        assert!(matches!(error, GameError::Io(_)));
    }
}
