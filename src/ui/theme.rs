use std::fs;

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

use crate::api::Classification;
use crate::session::SentenceStatus;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeColors {
    pub bg: String,
    pub fg: String,
    pub text_dim: String,
    pub accent: String,
    pub border: String,
    pub border_focused: String,
    pub header_bg: String,
    pub header_fg: String,
    pub bar_filled: String,
    pub bar_empty: String,
    pub current_bg: String,
    pub status_perfect: String,
    pub status_good: String,
    pub status_incorrect: String,
    pub status_skipped: String,
    pub error: String,
}

impl Theme {
    /// Look up `<config_dir>/biteread/themes/<name>.toml`.
    pub fn load(name: &str) -> Option<Self> {
        let path = dirs::config_dir()?
            .join("biteread")
            .join("themes")
            .join(format!("{name}.toml"));
        let content = fs::read_to_string(path).ok()?;
        toml::from_str::<Theme>(&content).ok()
    }

    pub fn load_or_default(name: &str) -> Self {
        Self::load(name).unwrap_or_default()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            colors: ThemeColors::default(),
        }
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            bg: "#f5f5f5".to_string(),
            fg: "#333333".to_string(),
            text_dim: "#999999".to_string(),
            accent: "#007aff".to_string(),
            border: "#e0e0e0".to_string(),
            border_focused: "#007aff".to_string(),
            header_bg: "#ffffff".to_string(),
            header_fg: "#333333".to_string(),
            bar_filled: "#007aff".to_string(),
            bar_empty: "#e0e0e0".to_string(),
            current_bg: "#ffffff".to_string(),
            status_perfect: "#2196f3".to_string(),
            status_good: "#34c759".to_string(),
            status_incorrect: "#ff3b30".to_string(),
            status_skipped: "#8e8e93".to_string(),
            error: "#ff3b30".to_string(),
        }
    }
}

impl ThemeColors {
    pub fn parse_color(hex: &str) -> Color {
        let hex = hex.trim_start_matches('#');
        if hex.len() == 6 {
            if let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            ) {
                return Color::Rgb(r, g, b);
            }
        }
        Color::Reset
    }

    pub fn bg(&self) -> Color { Self::parse_color(&self.bg) }
    pub fn fg(&self) -> Color { Self::parse_color(&self.fg) }
    pub fn text_dim(&self) -> Color { Self::parse_color(&self.text_dim) }
    pub fn accent(&self) -> Color { Self::parse_color(&self.accent) }
    pub fn border(&self) -> Color { Self::parse_color(&self.border) }
    pub fn border_focused(&self) -> Color { Self::parse_color(&self.border_focused) }
    pub fn header_bg(&self) -> Color { Self::parse_color(&self.header_bg) }
    pub fn header_fg(&self) -> Color { Self::parse_color(&self.header_fg) }
    pub fn bar_filled(&self) -> Color { Self::parse_color(&self.bar_filled) }
    pub fn bar_empty(&self) -> Color { Self::parse_color(&self.bar_empty) }
    pub fn current_bg(&self) -> Color { Self::parse_color(&self.current_bg) }
    pub fn error(&self) -> Color { Self::parse_color(&self.error) }

    /// `None` for sentences that have not been touched: no marker is drawn.
    pub fn status(&self, status: SentenceStatus) -> Option<Color> {
        let hex = match status {
            SentenceStatus::Perfect => &self.status_perfect,
            SentenceStatus::Good => &self.status_good,
            SentenceStatus::Incorrect => &self.status_incorrect,
            SentenceStatus::Skipped => &self.status_skipped,
            SentenceStatus::NotAttempted => return None,
        };
        Some(Self::parse_color(hex))
    }

    pub fn classification(&self, classification: Classification) -> Color {
        self.status(classification.into()).unwrap_or(Color::Reset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        assert_eq!(ThemeColors::parse_color("#2196f3"), Color::Rgb(0x21, 0x96, 0xf3));
        assert_eq!(ThemeColors::parse_color("nope"), Color::Reset);
    }

    #[test]
    fn test_partial_theme_file_uses_defaults() {
        let theme: Theme = toml::from_str(
            r##"
name = "dark"
[colors]
bg = "#1e1e2e"
"##,
        )
        .unwrap();
        assert_eq!(theme.colors.bg(), Color::Rgb(0x1e, 0x1e, 0x2e));
        assert_eq!(theme.colors.status_good, "#34c759");
    }

    #[test]
    fn test_untouched_sentence_has_no_marker() {
        let colors = ThemeColors::default();
        assert!(colors.status(SentenceStatus::NotAttempted).is_none());
        assert!(colors.status(SentenceStatus::Skipped).is_some());
    }
}
