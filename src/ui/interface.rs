use console::Term;
use dialoguer::{Confirm, Select};
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

use crate::config::Config;
use crate::core::{ClockTick, FallSpeed, GameSession};
use crate::tutorial::{Tutorial, WELCOME_TEXT};
use crate::ui::input::{command_for, InputCommand, KeyReader};
use crate::ui::{Display, ThemeManager};
use crate::utils::{GameError, GameResult, RecordStore, RecordSummary, SessionRecord};
use tracing::{debug, error, info, warn};

const TITLE: &str = r#"
╔═╗ ┬ ┬┬┌─┐┬┌─  ╔╦╗┌─┐┌─┐┬┌─┐┬┌─┐┌┐┌  ╔╦╗┬─┐┌─┐┬┌┐┌┌─┐┬─┐
║═╬╗│ ││  ├┴┐   ║║├┤ │  │└─┐││ ││││   ║ ├┬┘├─┤││││├┤ ├┬┘
╚═╝╚└─┘┴└─┘┴ ┴  ═╩╝└─┘└─┘┴└─┘┴└─┘┘└┘   ╩ ┴└─┴ ┴┴┘└┘└─┘┴└─
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    Finished,
    Abandoned,
}

pub struct GameInterface {
    display: Display,
    record_store: RecordStore,
    tutorial: Tutorial,
    config: Config,
}

impl GameInterface {
    pub async fn new(config: Config) -> GameResult<Self> {
        info!("Initializing game interface");

        config.ensure_directories()?;

        let theme_manager = ThemeManager::new();
        let mut display = Display::new(theme_manager, config.ui.text_width)
            .map_err(|e| GameError::terminal(format!("Failed to create display: {}", e)))?;

        if !display.set_theme(&config.ui.theme) {
            warn!("Unknown theme '{}', using default", config.ui.theme);
        }

        Ok(Self {
            display,
            record_store: RecordStore::new(config.get_records_dir()),
            tutorial: Tutorial::builtin(),
            config,
        })
    }

    pub async fn run(&mut self) -> GameResult<()> {
        info!("Starting game interface");

        if self.config.ui.show_welcome {
            if let Err(e) = self.show_welcome().await {
                error!("Welcome screen error: {}", e);
            }
        }

        loop {
            match self.show_main_menu().await {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    error!("Main menu error: {}", e);
                    self.display.show_error(&format!("An error occurred: {}", e)).ok();
                    self.display.wait_for_enter().ok();
                }
            }
        }

        self.display.show_message("Thanks for training with us!", "success").ok();
        Ok(())
    }

    pub async fn show_main_menu(&mut self) -> GameResult<bool> {
        self.display.clear_screen().ok();
        self.show_game_title()?;

        let choices = vec![
            "🎮 Play",
            "📖 Tutorial",
            "⏬ Block Speed",
            "📊 Statistics",
            "🎨 Theme",
            "🚪 Exit",
        ];

        let selection = Select::new()
            .with_prompt("What would you like to do?")
            .items(&choices)
            .default(0)
            .interact()
            .map_err(|e| GameError::terminal(format!("Menu selection error: {}", e)))?;

        match selection {
            0 => self.play().await?,
            1 => self.tutorial_menu().await?,
            2 => self.speed_menu().await?,
            3 => self.statistics_menu().await?,
            4 => self.change_theme().await?,
            5 => return Ok(false),
            _ => unreachable!(),
        }

        Ok(true)
    }

    fn show_game_title(&self) -> GameResult<()> {
        self.display.show_title(TITLE)?;
        self.display.show_message(&format!("Version {}", crate::VERSION), "info")?;
        self.display.show_message(
            &format!(
                "Speed: {}   Time limit: {}s",
                self.config.game.default_speed.label(),
                self.config.game.time_limit_secs
            ),
            "info",
        )?;
        println!();
        Ok(())
    }

    async fn show_welcome(&mut self) -> GameResult<()> {
        self.display.clear_screen().ok();
        self.show_game_title()?;
        self.display.show_wrapped_message(WELCOME_TEXT, "tutorial_body")?;
        println!();

        let choices = vec!["📖 Take the tutorial", "🏠 Go to the main menu"];
        let selection = Select::new()
            .with_prompt("Welcome!")
            .items(&choices)
            .default(0)
            .interact()
            .map_err(|e| GameError::terminal(format!("Welcome selection error: {}", e)))?;

        if selection == 0 {
            self.tutorial_menu().await?;
        }
        Ok(())
    }

    async fn tutorial_menu(&mut self) -> GameResult<()> {
        let mut navigator = self.tutorial.navigator();

        while let Some(page) = navigator.current() {
            self.display.clear_screen().ok();
            self.display.show_tutorial_page(page, &navigator.progress())?;

            let mut choices = Vec::new();
            if !navigator.is_last() {
                choices.push("➡️ Next");
            }
            if !navigator.is_first() {
                choices.push("⬅️ Back");
            }
            choices.push("🔙 Close");

            let selection = Select::new()
                .items(&choices)
                .default(0)
                .interact()
                .map_err(|e| GameError::terminal(format!("Tutorial selection error: {}", e)))?;

            match choices[selection] {
                "➡️ Next" => {
                    navigator.next();
                }
                "⬅️ Back" => {
                    navigator.previous();
                }
                _ => break,
            }
        }

        debug!("Tutorial closed on page {}", navigator.progress());
        Ok(())
    }

    async fn speed_menu(&mut self) -> GameResult<()> {
        let labels: Vec<&str> = FallSpeed::ALL.iter().map(|speed| speed.label()).collect();
        let current = FallSpeed::ALL
            .iter()
            .position(|speed| *speed == self.config.game.default_speed)
            .unwrap_or(0);

        let selection = Select::new()
            .with_prompt("How fast should the blocks fall?")
            .items(&labels)
            .default(current)
            .interact()
            .map_err(|e| GameError::configuration(format!("Speed selection error: {}", e)))?;

        self.config.game.default_speed = FallSpeed::ALL[selection];
        info!("Default speed set to {}", labels[selection]);
        Ok(())
    }

    async fn change_theme(&mut self) -> GameResult<()> {
        let themes = self.display.get_available_themes();

        let selection = Select::new()
            .with_prompt("Choose theme")
            .items(&themes)
            .interact()
            .map_err(|e| GameError::configuration(format!("Theme selection error: {}", e)))?;

        let selected_theme = &themes[selection];

        if self.display.set_theme(selected_theme) {
            self.config.ui.theme = selected_theme.clone();
            self.display.show_success(&format!("Theme changed to '{}'", selected_theme))?;
        } else {
            self.display.show_error(&format!("Failed to set theme '{}'", selected_theme))?;
        }

        self.display.wait_for_enter()?;
        Ok(())
    }

    async fn statistics_menu(&mut self) -> GameResult<()> {
        self.display.clear_screen().ok();

        let records = self.record_store.list_records().await?;
        if records.is_empty() {
            self.display.show_info("No finished games yet. Play a round first!")?;
        } else {
            let summary = RecordSummary::from_records(&records);
            self.display.show_records(&records, &summary)?;
        }

        self.display.wait_for_enter()?;
        Ok(())
    }

    /// Play games until the player declines a rematch.
    pub async fn play(&mut self) -> GameResult<()> {
        let mut session = GameSession::new(&self.config.game)?;

        loop {
            let end = self.play_session(&mut session).await?;
            if end == SessionEnd::Abandoned {
                info!("Session {} abandoned after {} rounds", session.id(), session.state().rounds);
                return Ok(());
            }

            self.store_record(&session).await;

            let again = Confirm::new()
                .with_prompt("Play again?")
                .default(true)
                .interact()
                .map_err(|e| GameError::terminal(format!("Confirmation error: {}", e)))?;

            if !again {
                return Ok(());
            }
            session.restart();
        }
    }

    /// Run one game on screen. The key reader is always finished and the
    /// cursor restored, even when drawing fails.
    async fn play_session(&mut self, session: &mut GameSession) -> GameResult<SessionEnd> {
        self.display.clear_screen().ok();
        self.display.hide_cursor().ok();

        let mut keys = KeyReader::spawn(Term::stdout());
        let end = self.drive_session(session, &mut keys).await;

        if let Err(e) = &end {
            error!("Game screen failed: {}", e);
        } else {
            self.display.show_outcome(session.state()).ok();
        }
        self.display.show_info("Press any key to continue...").ok();
        keys.finish().await;
        self.display.show_cursor().ok();

        end
    }

    async fn drive_session(&self, session: &mut GameSession, keys: &mut KeyReader) -> GameResult<SessionEnd> {
        let mut frames = interval(self.config.frame_interval());
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut clock = interval(Duration::from_secs(1));
        clock.tick().await;

        loop {
            tokio::select! {
                _ = frames.tick() => {
                    session.advance_frame();
                    self.display.render_game(session, self.config.ui.show_info_bar)?;
                    if session.state().is_game_over() {
                        return Ok(SessionEnd::Finished);
                    }
                }
                _ = clock.tick() => {
                    match session.tick_clock() {
                        ClockTick::Running(_) => {}
                        ClockTick::Expired | ClockTick::Stopped => {
                            self.display.render_game(session, self.config.ui.show_info_bar)?;
                            return Ok(SessionEnd::Finished);
                        }
                    }
                }
                key = keys.next_key() => {
                    let Some(key) = key else {
                        warn!("Keyboard input unavailable, ending session");
                        return Ok(SessionEnd::Abandoned);
                    };
                    match command_for(&key) {
                        Some(InputCommand::Move(direction)) => session.move_paddle(direction),
                        Some(InputCommand::Speed(speed)) => session.set_speed(speed),
                        Some(InputCommand::Quit) => return Ok(SessionEnd::Abandoned),
                        None => {}
                    }
                }
            }
        }
    }

    async fn store_record(&self, session: &GameSession) {
        let Some(record) = SessionRecord::from_session(session) else {
            return;
        };

        if let Err(e) = self.record_store.save_record(&record).await {
            warn!("Failed to save session record: {}", e);
            self.display.show_warning(&format!("Could not save this game: {}", e)).ok();
            return;
        }

        if self.config.records.auto_cleanup {
            if let Err(e) = self
                .record_store
                .cleanup_old_records(self.config.records.max_records)
                .await
            {
                warn!("Record cleanup failed: {}", e);
            }
        }
    }
}
