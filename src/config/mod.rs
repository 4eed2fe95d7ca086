use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::core::{FallSpeed, Rules};
use crate::utils::{GameError, GameResult};

/// Prefix for environment overrides, e.g. `QDT_GAME__TIME_LIMIT_SECS=60`.
pub const ENV_PREFIX: &str = "QDT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub game: GameConfig,
    pub ui: UiConfig,
    pub paths: PathConfig,
    pub logging: LoggingConfig,
    pub records: RecordConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Fixed seed for replayable games; random when unset.
    pub seed: Option<u64>,
    pub time_limit_secs: u32,
    pub start_min: i32,
    pub start_max: i32,
    pub margin_min: i32,
    pub margin_max: i32,
    pub range_shift_one_in: u32,
    pub decoy_spread: i32,
    pub default_speed: FallSpeed,
    pub frame_interval_ms: u64,
    /// Field units per frame at a gravity multiplier of 1.0.
    pub fall_velocity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    pub theme: String,
    pub show_info_bar: bool,
    pub show_welcome: bool,
    pub text_width: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathConfig {
    pub records_dir: PathBuf,
    pub logs_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub log_to_file: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordConfig {
    pub max_records: usize,
    pub auto_cleanup: bool,
}

impl Default for Config {
    fn default() -> Self {
        let rules = Rules::default();
        Self {
            game: GameConfig {
                seed: None,
                time_limit_secs: rules.time_limit_secs,
                start_min: rules.start_min,
                start_max: rules.start_max,
                margin_min: rules.margin_min,
                margin_max: rules.margin_max,
                range_shift_one_in: rules.range_shift_one_in,
                decoy_spread: rules.decoy_spread,
                default_speed: FallSpeed::Slow,
                frame_interval_ms: 100,
                fall_velocity: 10.0,
            },
            ui: UiConfig {
                theme: "default".to_string(),
                show_info_bar: true,
                show_welcome: true,
                text_width: 60,
            },
            paths: PathConfig {
                records_dir: PathBuf::from("./data/records"),
                logs_dir: PathBuf::from("./data/logs"),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                log_to_file: true,
            },
            records: RecordConfig {
                max_records: 100,
                auto_cleanup: true,
            },
        }
    }
}

impl GameConfig {
    pub fn rules(&self) -> Rules {
        Rules {
            start_min: self.start_min,
            start_max: self.start_max,
            margin_min: self.margin_min,
            margin_max: self.margin_max,
            decoy_spread: self.decoy_spread,
            range_shift_one_in: self.range_shift_one_in,
            time_limit_secs: self.time_limit_secs,
            ..Rules::default()
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> GameResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            let default_config = Self::default();
            default_config.save_to_file(path)?;
            return Ok(default_config);
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| GameError::configuration(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| GameError::configuration(format!("Failed to parse config file: {}", e)))?;

        Ok(config)
    }

    /// Defaults, then the optional TOML file, then `QDT_` environment variables.
    pub fn load(path: Option<&Path>) -> GameResult<Self> {
        let defaults = ::config::Config::try_from(&Self::default())?;
        let mut builder = ::config::Config::builder().add_source(defaults);

        if let Some(path) = path {
            if !path.exists() {
                Self::default().save_to_file(path)?;
            }
            builder = builder.add_source(
                ::config::File::from(path).format(::config::FileFormat::Toml),
            );
        }

        let config: Config = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> GameResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| GameError::configuration(format!("Failed to create config directory: {}", e)))?;
        }

        let toml_content = toml::to_string_pretty(self)?;

        std::fs::write(path, toml_content)
            .map_err(|e| GameError::configuration(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    pub fn get_records_dir(&self) -> &Path {
        &self.paths.records_dir
    }

    pub fn get_logs_dir(&self) -> &Path {
        &self.paths.logs_dir
    }

    pub fn ensure_directories(&self) -> GameResult<()> {
        for dir in [&self.paths.records_dir, &self.paths.logs_dir] {
            if !dir.exists() {
                std::fs::create_dir_all(dir)
                    .map_err(|e| GameError::configuration(format!("Failed to create directory {:?}: {}", dir, e)))?;
            }
        }

        Ok(())
    }

    pub fn validate(&self) -> GameResult<()> {
        match self.logging.level.as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {}
            _ => return Err(GameError::configuration("Invalid logging level")),
        }

        if self.paths.records_dir.as_os_str().is_empty() {
            return Err(GameError::configuration("Records directory path cannot be empty"));
        }

        self.game.rules().validate()?;

        if self.game.frame_interval_ms == 0 {
            return Err(GameError::configuration("Frame interval must be greater than 0"));
        }
        if !(self.game.fall_velocity > 0.0) {
            return Err(GameError::configuration("Fall velocity must be positive"));
        }
        if self.ui.text_width < 40 {
            return Err(GameError::configuration("Text width must be at least 40"));
        }
        if self.records.max_records == 0 {
            return Err(GameError::configuration("Max records must be greater than 0"));
        }

        Ok(())
    }

    pub fn merge_with_cli(&mut self, cli_config: CliConfig) {
        if cli_config.seed.is_some() {
            self.game.seed = cli_config.seed;
        }
        if let Some(speed) = cli_config.speed {
            self.game.default_speed = speed;
        }
        if let Some(time_limit) = cli_config.time_limit_secs {
            self.game.time_limit_secs = time_limit;
        }
        if let Some(records_dir) = cli_config.records_dir {
            self.paths.records_dir = records_dir;
        }
        if cli_config.debug {
            self.logging.level = "debug".to_string();
        }
        if cli_config.skip_welcome {
            self.ui.show_welcome = false;
        }
    }

    pub fn frame_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.game.frame_interval_ms)
    }
}

// Configuration that can be overridden by CLI arguments
#[derive(Debug, Default)]
pub struct CliConfig {
    pub seed: Option<u64>,
    pub speed: Option<FallSpeed>,
    pub time_limit_secs: Option<u32>,
    pub records_dir: Option<PathBuf>,
    pub debug: bool,
    pub skip_welcome: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.game.time_limit_secs, 120);
        assert_eq!(config.game.default_speed, FallSpeed::Slow);
        assert_eq!(config.ui.theme, "default");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.game.rules(), Rules::default());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.logging.level = "invalid".to_string();
        assert!(config.validate().is_err());

        config = Config::default();
        config.game.margin_min = 0;
        assert!(matches!(config.validate(), Err(GameError::InvalidRules { .. })));

        config = Config::default();
        config.game.fall_velocity = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let mut original_config = Config::default();
        original_config.game.seed = Some(77);
        original_config.save_to_file(&config_path).unwrap();

        let loaded_config = Config::from_file(&config_path).unwrap();

        assert_eq!(original_config, loaded_config);
    }

    #[test]
    fn test_from_file_creates_default() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let config = Config::from_file(&config_path).unwrap();

        assert!(config_path.exists());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_layered_load_reads_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let mut on_disk = Config::default();
        on_disk.game.time_limit_secs = 45;
        on_disk.ui.theme = "dark".to_string();
        on_disk.save_to_file(&config_path).unwrap();

        let config = Config::load(Some(&config_path)).unwrap();

        assert_eq!(config.game.time_limit_secs, 45);
        assert_eq!(config.ui.theme, "dark");
        assert_eq!(config.game.default_speed, FallSpeed::Slow);
    }

    #[test]
    fn test_cli_config_merge() {
        let mut config = Config::default();
        let cli_config = CliConfig {
            seed: Some(9),
            speed: Some(FallSpeed::Fast),
            debug: true,
            skip_welcome: true,
            ..Default::default()
        };

        config.merge_with_cli(cli_config);

        assert_eq!(config.game.seed, Some(9));
        assert_eq!(config.game.default_speed, FallSpeed::Fast);
        assert_eq!(config.logging.level, "debug");
        assert!(!config.ui.show_welcome);
        assert_eq!(config.game.time_limit_secs, 120);
    }
}
