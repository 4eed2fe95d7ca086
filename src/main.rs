use anyhow::{Context, Result};
use clap::Parser;
use quick_decision_trainer::config::CliConfig;
use quick_decision_trainer::{Config, FallSpeed, GameInterface, VERSION};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const LOG_FILE_NAME: &str = "quick-decision-trainer.log";

#[derive(Parser)]
#[command(name = "quick-decision-trainer")]
#[command(about = "Train quick decisions by keeping a number inside shifting limits")]
#[command(version = VERSION)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for a replayable game
    #[arg(long)]
    seed: Option<u64>,

    /// Block speed: slow, medium or fast
    #[arg(long)]
    speed: Option<FallSpeed>,

    /// Seconds to survive before the game is won
    #[arg(short, long = "time-limit")]
    time_limit: Option<u32>,

    /// Go straight to the main menu
    #[arg(long)]
    skip_welcome: bool,
}

impl Cli {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            seed: self.seed,
            speed: self.speed,
            time_limit_secs: self.time_limit,
            records_dir: None,
            debug: self.debug,
            skip_welcome: self.skip_welcome,
        }
    }
}

fn init_logging(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("quick_decision_trainer={},warn", config.logging.level)));

    if config.logging.log_to_file {
        let path = config.get_logs_dir().join(LOG_FILE_NAME);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("failed to open log file {:?}", path))?;

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    config.merge_with_cli(cli.to_cli_config());
    config.validate()?;
    config.ensure_directories()?;

    init_logging(&config)?;
    info!("Starting Quick Decision Trainer v{}", VERSION);

    let mut game_interface = GameInterface::new(config).await?;

    if let Err(e) = game_interface.run().await {
        error!("Game error: {}", e);
        eprintln!("An error occurred: {}", e);
        std::process::exit(1);
    }

    info!("Game session ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["quick-decision-trainer", "--debug"]).unwrap();
        assert!(cli.debug);
        assert!(cli.seed.is_none());
    }

    #[test]
    fn test_cli_game_options() {
        let cli = Cli::try_parse_from([
            "quick-decision-trainer",
            "--seed",
            "42",
            "--speed",
            "fast",
            "--time-limit",
            "30",
            "--skip-welcome",
        ])
        .unwrap();

        let mut config = Config::default();
        config.merge_with_cli(cli.to_cli_config());

        assert_eq!(config.game.seed, Some(42));
        assert_eq!(config.game.default_speed, FallSpeed::Fast);
        assert_eq!(config.game.time_limit_secs, 30);
        assert!(!config.ui.show_welcome);
    }

    #[test]
    fn test_cli_rejects_unknown_speed() {
        assert!(Cli::try_parse_from(["quick-decision-trainer", "--speed", "warp"]).is_err());
    }
}
