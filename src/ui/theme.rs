use colored::{Color, Colorize};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub colors: HashMap<String, ColorConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorConfig {
    pub foreground: Option<String>,
    pub background: Option<String>,
    pub style: Vec<String>,
}

impl ColorConfig {
    fn new(foreground: &str, background: Option<&str>, style: &[&str]) -> Self {
        Self {
            foreground: Some(foreground.to_string()),
            background: background.map(str::to_string),
            style: style.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Theme {
    fn from_styles(name: &str, styles: &[(&str, &str, Option<&str>, &[&str])]) -> Self {
        let colors = styles
            .iter()
            .map(|(key, fg, bg, style)| (key.to_string(), ColorConfig::new(fg, *bg, style)))
            .collect();

        Self {
            name: name.to_string(),
            colors,
        }
    }
}

pub struct ThemeManager {
    themes: HashMap<String, Theme>,
    current_theme: String,
}

impl ThemeManager {
    pub fn new() -> Self {
        let mut manager = Self {
            themes: HashMap::new(),
            current_theme: "default".to_string(),
        };

        manager.load_default_themes();
        manager
    }

    pub fn set_theme(&mut self, theme_name: &str) -> bool {
        if self.themes.contains_key(theme_name) {
            self.current_theme = theme_name.to_string();
            true
        } else {
            false
        }
    }

    pub fn current_theme_name(&self) -> &str {
        &self.current_theme
    }

    /// The current theme's entry for a style, else the default theme's.
    fn resolve_style(&self, style_name: &str) -> Option<&ColorConfig> {
        self.themes
            .get(&self.current_theme)
            .and_then(|theme| theme.colors.get(style_name))
            .or_else(|| {
                self.themes
                    .get("default")
                    .and_then(|theme| theme.colors.get(style_name))
            })
    }

    pub fn apply_style(&self, text: &str, style_name: &str) -> String {
        let Some(color_config) = self.resolve_style(style_name) else {
            return text.to_string();
        };

        let mut styled = text.normal();

        if let Some(color) = color_config.foreground.as_deref().and_then(parse_color) {
            styled = styled.color(color);
        }
        if let Some(color) = color_config.background.as_deref().and_then(parse_color) {
            styled = styled.on_color(color);
        }

        for style in &color_config.style {
            styled = match style.as_str() {
                "bold" => styled.bold(),
                "italic" => styled.italic(),
                "underline" => styled.underline(),
                "dimmed" => styled.dimmed(),
                "reversed" => styled.reversed(),
                _ => styled,
            };
        }

        styled.to_string()
    }

    pub fn list_themes(&self) -> Vec<String> {
        let mut names: Vec<String> = self.themes.keys().cloned().collect();
        names.sort();
        names
    }

    fn load_default_themes(&mut self) {
        let default = Theme::from_styles(
            "default",
            &[
                ("title", "cyan", None, &["bold"]),
                ("equation", "white", Some("blue"), &["bold"]),
                ("bounds", "yellow", None, &["bold"]),
                ("block", "black", Some("yellow"), &["bold"]),
                ("block_targeted", "black", Some("green"), &["bold"]),
                ("paddle", "white", None, &["bold"]),
                ("ground", "bright_black", None, &[]),
                ("info_bar", "white", None, &[]),
                ("tutorial_title", "blue", None, &["bold", "underline"]),
                ("tutorial_body", "white", None, &[]),
                ("error", "red", None, &["bold"]),
                ("success", "green", None, &["bold"]),
                ("warning", "yellow", None, &["bold"]),
                ("info", "blue", None, &[]),
                ("separator", "bright_black", None, &["dimmed"]),
            ],
        );

        let dark = Theme::from_styles(
            "dark",
            &[
                ("title", "bright_cyan", None, &["bold"]),
                ("equation", "bright_white", Some("black"), &["bold"]),
                ("bounds", "bright_yellow", None, &["bold"]),
                ("block", "bright_white", Some("magenta"), &["bold"]),
                ("block_targeted", "black", Some("bright_green"), &["bold"]),
                ("paddle", "bright_white", None, &["bold"]),
                ("ground", "white", None, &["dimmed"]),
                ("info_bar", "bright_white", None, &[]),
                ("tutorial_title", "bright_blue", None, &["bold"]),
                ("tutorial_body", "bright_white", None, &[]),
                ("error", "bright_red", None, &["bold"]),
                ("success", "bright_green", None, &["bold"]),
                ("warning", "bright_yellow", None, &["bold"]),
                ("info", "bright_blue", None, &[]),
                ("separator", "white", None, &["dimmed"]),
            ],
        );

        let light = Theme::from_styles(
            "light",
            &[
                ("title", "blue", None, &["bold"]),
                ("equation", "black", Some("cyan"), &["bold"]),
                ("bounds", "magenta", None, &["bold"]),
                ("block", "black", Some("bright_yellow"), &[]),
                ("block_targeted", "black", Some("bright_cyan"), &["bold"]),
                ("paddle", "black", None, &["bold"]),
                ("tutorial_title", "magenta", None, &["bold"]),
                ("tutorial_body", "black", None, &[]),
            ],
        );

        for theme in [default, dark, light] {
            self.themes.insert(theme.name.clone(), theme);
        }
    }
}

impl Default for ThemeManager {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_color(color_name: &str) -> Option<Color> {
    match color_name.to_lowercase().as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "white" => Some(Color::White),
        "bright_black" => Some(Color::BrightBlack),
        "bright_red" => Some(Color::BrightRed),
        "bright_green" => Some(Color::BrightGreen),
        "bright_yellow" => Some(Color::BrightYellow),
        "bright_blue" => Some(Color::BrightBlue),
        "bright_magenta" => Some(Color::BrightMagenta),
        "bright_cyan" => Some(Color::BrightCyan),
        "bright_white" => Some(Color::BrightWhite),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_manager_creation() {
        let manager = ThemeManager::new();
        assert_eq!(manager.current_theme_name(), "default");
        assert_eq!(manager.list_themes(), vec!["dark", "default", "light"]);
    }

    #[test]
    fn test_set_theme() {
        let mut manager = ThemeManager::new();

        assert!(manager.set_theme("dark"));
        assert_eq!(manager.current_theme_name(), "dark");

        assert!(!manager.set_theme("nonexistent"));
        assert_eq!(manager.current_theme_name(), "dark");
    }

    #[test]
    fn test_apply_style() {
        let manager = ThemeManager::new();

        let styled = manager.apply_style("x = 5", "equation");
        assert!(styled.contains("x = 5"));

        let unstyled = manager.apply_style("Test", "nonexistent");
        assert_eq!(unstyled, "Test");
    }

    #[test]
    fn test_partial_theme_falls_back_per_style() {
        let mut manager = ThemeManager::new();
        manager.set_theme("light");

        let error = manager.resolve_style("error").unwrap();
        assert_eq!(error.foreground.as_deref(), Some("red"));

        let paddle = manager.resolve_style("paddle").unwrap();
        assert_eq!(paddle.foreground.as_deref(), Some("black"));

        assert!(manager.resolve_style("nonexistent").is_none());
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("red"), Some(Color::Red));
        assert_eq!(parse_color("RED"), Some(Color::Red));
        assert_eq!(parse_color("bright_green"), Some(Color::BrightGreen));
        assert_eq!(parse_color("invalid"), None);
    }
}
