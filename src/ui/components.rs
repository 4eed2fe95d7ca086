use console::Term;
use std::io::{self, Write};
use crate::core::playfield::{Playfield, FIELD_HEIGHT, FIELD_WIDTH};
use crate::core::{FallSpeed, GameSession, Outcome, Phase, RoundState};
use crate::tutorial::TutorialPage;
use crate::ui::ThemeManager;
use crate::utils::{RecordSummary, SessionRecord};

/// Field units per terminal column.
pub const CELL_WIDTH: i32 = 10;
/// Field units per terminal row.
pub const ROW_HEIGHT: i32 = 40;
pub const FIELD_COLUMNS: usize = (FIELD_WIDTH / CELL_WIDTH) as usize;
pub const FIELD_ROWS: usize = (FIELD_HEIGHT / ROW_HEIGHT) as usize;

const PADDLE_GLYPH: &str = "▀▀▀▀";
const CONTROLS_HINT: &str = "←/→ move   1/2/3 speed   q quit";

/// Something drawn on one row of the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowItem {
    pub column: usize,
    pub text: String,
    pub highlighted: bool,
}

pub fn column_for(x: i32) -> usize {
    (x.clamp(0, FIELD_WIDTH) / CELL_WIDTH) as usize
}

/// Terminal row of the falling blocks, 0 at the top. Never reaches the
/// paddle row, which is drawn below the last field row.
pub fn row_for(altitude: f32) -> usize {
    let from_top = (FIELD_HEIGHT as f32 - altitude).max(0.0) / ROW_HEIGHT as f32;
    (from_top as usize).min(FIELD_ROWS - 1)
}

pub fn block_label(value: i32) -> String {
    format!("[{:^3}]", value)
}

/// Lay items out left to right, padding the gaps with spaces. Items that
/// would overlap the previous one are pushed right.
pub fn compose_row<F>(items: &[RowItem], style: F) -> String
where
    F: Fn(&str, bool) -> String,
{
    let mut sorted: Vec<&RowItem> = items.iter().collect();
    sorted.sort_by_key(|item| item.column);

    let mut line = String::new();
    let mut cursor = 0;
    for item in sorted {
        if item.column > cursor {
            line.push_str(&" ".repeat(item.column - cursor));
            cursor = item.column;
        }
        line.push_str(&style(&item.text, item.highlighted));
        cursor += item.text.chars().count();
    }
    line
}

pub fn block_items(field: &Playfield) -> Vec<RowItem> {
    let targeted = field.block_above_paddle().map(|block| block.lane_x);
    field
        .blocks()
        .iter()
        .map(|block| {
            let text = block_label(block.value);
            let half = text.chars().count() / 2;
            RowItem {
                column: column_for(block.lane_x).saturating_sub(half),
                text,
                highlighted: Some(block.lane_x) == targeted,
            }
        })
        .collect()
}

pub fn paddle_item(field: &Playfield) -> RowItem {
    RowItem {
        column: column_for(field.paddle_x()).saturating_sub(PADDLE_GLYPH.chars().count() / 2),
        text: PADDLE_GLYPH.to_string(),
        highlighted: false,
    }
}

pub fn equation_line(state: &RoundState) -> String {
    format!(
        " {} + {} - [ z ] = x   |   {} <= x <= {} ",
        state.x, state.y, state.rmn, state.rmx
    )
}

pub fn info_line(state: &RoundState, speed: FallSpeed) -> String {
    format!(
        "Round: {}   Win in: {}s   Speed: {}",
        state.rounds,
        state.time_remaining,
        speed.label()
    )
}

pub struct Display {
    term: Term,
    theme_manager: ThemeManager,
    text_width: usize,
}

impl Display {
    pub fn new(theme_manager: ThemeManager, text_width: usize) -> io::Result<Self> {
        Ok(Self {
            term: Term::stdout(),
            theme_manager,
            text_width,
        })
    }

    pub fn clear_screen(&self) -> io::Result<()> {
        self.term.clear_screen()
    }

    pub fn hide_cursor(&self) -> io::Result<()> {
        self.term.hide_cursor()
    }

    pub fn show_cursor(&self) -> io::Result<()> {
        self.term.show_cursor()
    }

    pub fn show_title(&self, title: &str) -> io::Result<()> {
        let styled_title = self.theme_manager.apply_style(title, "title");
        let border = "═".repeat(self.text_width);
        let styled_border = self.theme_manager.apply_style(&border, "separator");

        writeln!(io::stdout(), "{}", styled_title)?;
        writeln!(io::stdout(), "{}", styled_border)?;
        writeln!(io::stdout())?;

        Ok(())
    }

    /// Redraw the whole game screen in place.
    pub fn render_game(&self, session: &GameSession, show_info_bar: bool) -> io::Result<()> {
        let state = session.state();
        let field = session.field();
        let style_block = |text: &str, highlighted: bool| {
            let style = if highlighted { "block_targeted" } else { "block" };
            self.theme_manager.apply_style(text, style)
        };

        let mut lines = Vec::with_capacity(FIELD_ROWS + 6);
        lines.push(self.theme_manager.apply_style(&equation_line(state), "equation"));
        lines.push(String::new());

        let block_row = row_for(field.altitude());
        let blocks = block_items(field);
        for row in 0..FIELD_ROWS {
            if row == block_row && !blocks.is_empty() {
                lines.push(compose_row(&blocks, &style_block));
            } else {
                lines.push(String::new());
            }
        }

        let paddle = compose_row(&[paddle_item(field)], |text, _| {
            self.theme_manager.apply_style(text, "paddle")
        });
        lines.push(paddle);
        lines.push(self.theme_manager.apply_style(&"─".repeat(FIELD_COLUMNS + 1), "ground"));

        if show_info_bar {
            lines.push(self.theme_manager.apply_style(&info_line(state, session.speed()), "info_bar"));
        }
        lines.push(self.theme_manager.apply_style(CONTROLS_HINT, "separator"));

        self.term.move_cursor_to(0, 0)?;
        for line in &lines {
            self.term.clear_line()?;
            self.term.write_line(line)?;
        }
        self.term.clear_to_end_of_screen()?;
        Ok(())
    }

    pub fn show_outcome(&self, state: &RoundState) -> io::Result<()> {
        writeln!(io::stdout())?;
        match state.outcome_message() {
            Some(message) => {
                let style = if state.phase() == Phase::Won { "success" } else { "error" };
                self.show_message(message, style)?;
            }
            None => self.show_warning("Game abandoned.")?,
        }
        self.show_message(&format!("Rounds survived: {}", state.rounds), "info")?;
        Ok(())
    }

    pub fn show_tutorial_page(&self, page: &TutorialPage, progress: &str) -> io::Result<()> {
        let title = format!("{} ({})", page.title, progress);
        self.show_message(&title, "tutorial_title")?;
        let separator = "─".repeat(self.text_width.min(40));
        self.show_message(&separator, "separator")?;
        self.show_wrapped_text(&page.body, "tutorial_body")?;
        writeln!(io::stdout())?;
        Ok(())
    }

    pub fn show_wrapped_message(&self, text: &str, style: &str) -> io::Result<()> {
        self.show_wrapped_text(text, style)
    }

    pub fn show_records(&self, records: &[SessionRecord], summary: &RecordSummary) -> io::Result<()> {
        self.show_message("📊 Statistics", "tutorial_title")?;
        let separator = "═".repeat(self.text_width.min(50));
        self.show_message(&separator, "separator")?;

        self.show_message(&format!("Games played: {}", summary.games), "info")?;
        self.show_message(
            &format!(
                "Wins: {}   Losses: {}   Win rate: {:.0}%",
                summary.wins,
                summary.losses,
                summary.win_rate() * 100.0
            ),
            "info",
        )?;
        self.show_message(&format!("Most rounds in one game: {}", summary.best_rounds), "info")?;

        if !records.is_empty() {
            writeln!(io::stdout())?;
            self.show_message("Recent games:", "info")?;
            for record in records.iter().take(10) {
                let line = format!(
                    "  {}  {:<4}  {:>3} rounds  {:<6}  {}  seed {}",
                    record.played_at.format("%Y-%m-%d %H:%M"),
                    match record.outcome {
                        Outcome::Won => "won",
                        Outcome::Lost => "lost",
                    },
                    record.rounds,
                    record.speed.label(),
                    record.get_duration_formatted(),
                    record.seed
                );
                self.show_message(&line, "tutorial_body")?;
            }
        }

        self.show_message(&separator, "separator")?;
        Ok(())
    }

    pub fn show_message(&self, message: &str, style: &str) -> io::Result<()> {
        let styled_message = self.theme_manager.apply_style(message, style);
        writeln!(io::stdout(), "{}", styled_message)?;
        Ok(())
    }

    pub fn show_error(&self, error: &str) -> io::Result<()> {
        self.show_message(&format!("❌ {}", error), "error")
    }

    pub fn show_success(&self, message: &str) -> io::Result<()> {
        self.show_message(&format!("✅ {}", message), "success")
    }

    pub fn show_warning(&self, message: &str) -> io::Result<()> {
        self.show_message(&format!("⚠️ {}", message), "warning")
    }

    pub fn show_info(&self, message: &str) -> io::Result<()> {
        self.show_message(&format!("ℹ️ {}", message), "info")
    }

    pub fn wait_for_enter(&self) -> io::Result<()> {
        let styled_prompt = self.theme_manager.apply_style("Press Enter to continue...", "info");
        print!("{}", styled_prompt);
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        Ok(())
    }

    fn show_wrapped_text(&self, text: &str, style: &str) -> io::Result<()> {
        for line in wrap_words(text, self.text_width) {
            let styled_line = self.theme_manager.apply_style(&line, style);
            writeln!(io::stdout(), "{}", styled_line)?;
        }
        Ok(())
    }

    pub fn set_theme(&mut self, theme_name: &str) -> bool {
        self.theme_manager.set_theme(theme_name)
    }

    pub fn get_available_themes(&self) -> Vec<String> {
        self.theme_manager.list_themes()
    }
}

fn wrap_words(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        if !current_line.is_empty() && current_line.len() + word.len() + 1 > width {
            lines.push(std::mem::take(&mut current_line));
        }
        if !current_line.is_empty() {
            current_line.push(' ');
        }
        current_line.push_str(word);
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::playfield::{Direction, SPAWN_HEIGHT};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn plain(text: &str, _highlighted: bool) -> String {
        text.to_string()
    }

    #[test]
    fn test_display_creation() {
        let display = Display::new(ThemeManager::new(), 60);
        assert!(display.is_ok());
    }

    #[test]
    fn test_geometry_mapping() {
        assert_eq!(FIELD_COLUMNS, 55);
        assert_eq!(FIELD_ROWS, 14);
        assert_eq!(column_for(275), 27);
        assert_eq!(column_for(-10), 0);
        assert_eq!(column_for(560), 55);
        assert_eq!(row_for(SPAWN_HEIGHT as f32), 1);
        assert_eq!(row_for(-100.0), FIELD_ROWS - 1);
    }

    #[test]
    fn test_compose_row_pads_and_orders() {
        let items = vec![
            RowItem { column: 8, text: "BB".to_string(), highlighted: false },
            RowItem { column: 2, text: "AA".to_string(), highlighted: true },
        ];

        assert_eq!(compose_row(&items, plain), "  AA    BB");
        assert_eq!(compose_row(&items, |t, h| if h { t.to_lowercase() } else { t.to_string() }), "  aa    BB");
    }

    #[test]
    fn test_compose_row_pushes_overlaps_right() {
        let items = vec![
            RowItem { column: 0, text: "abc".to_string(), highlighted: false },
            RowItem { column: 1, text: "de".to_string(), highlighted: false },
        ];
        assert_eq!(compose_row(&items, plain), "abcde");
    }

    #[test]
    fn test_block_items_highlight_target() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut field = Playfield::new();
        field.spawn(&[2, 4, 6, 8, 10], &mut rng);

        let items = block_items(&field);
        assert_eq!(items.len(), 5);
        // The paddle starts on the middle lane, which always holds a block.
        assert_eq!(items.iter().filter(|item| item.highlighted).count(), 1);

        for _ in 0..13 {
            field.move_paddle(Direction::Left);
        }
        assert!(block_items(&field).iter().all(|item| !item.highlighted));
    }

    #[test]
    fn test_block_label_centering() {
        assert_eq!(block_label(5), "[ 5 ]");
        assert_eq!(block_label(-12), "[-12]");
        assert_eq!(block_label(7).len(), 5);
    }

    #[test]
    fn test_status_lines() {
        let state = RoundState {
            x: 5,
            y: 3,
            rmn: 2,
            rmx: 10,
            rounds: 4,
            time_remaining: 77,
            outcome: None,
        };

        assert_eq!(equation_line(&state), " 5 + 3 - [ z ] = x   |   2 <= x <= 10 ");
        assert_eq!(info_line(&state, FallSpeed::Medium), "Round: 4   Win in: 77s   Speed: Medium");
    }

    #[test]
    fn test_wrap_words() {
        let lines = wrap_words("one two three four", 9);
        assert_eq!(lines, vec!["one two", "three", "four"]);
        assert!(wrap_words("", 10).is_empty());
    }
}
