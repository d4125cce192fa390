use std::collections::HashMap;

use ratatui::style::Color;
use tracing::debug;

use crate::model::{TaskStatus, UiConfig};

/// Parsed color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    pub highlight: Color,
    pub dim: Color,
    pub red: Color,
    pub yellow: Color,
    pub green: Color,
    pub purple: Color,
    pub selection_bg: Color,
    pub search_match_bg: Color,
    pub search_match_fg: Color,
    /// Per-feature colors
    pub feature_colors: HashMap<String, Color>,
}

impl Default for Theme {
    fn default() -> Self {
        let mut feature_colors = HashMap::new();
        feature_colors.insert("auth".into(), Color::Rgb(0xFF, 0xD7, 0x00));
        feature_colors.insert("ui".into(), Color::Rgb(0x44, 0xDD, 0xFF));
        feature_colors.insert("backend".into(), Color::Rgb(0x44, 0x88, 0xFF));
        feature_colors.insert("bug".into(), Color::Rgb(0xFF, 0x44, 0x44));

        Theme {
            background: Color::Rgb(0x0C, 0x00, 0x1B),
            text: Color::Rgb(0xB0, 0xAA, 0xFF),
            text_bright: Color::Rgb(0xFF, 0xFF, 0xFF),
            highlight: Color::Rgb(0xFB, 0x41, 0x96),
            dim: Color::Rgb(0x7D, 0x78, 0xBF),
            red: Color::Rgb(0xFF, 0x44, 0x44),
            yellow: Color::Rgb(0xFF, 0xD7, 0x00),
            green: Color::Rgb(0x44, 0xFF, 0x88),
            purple: Color::Rgb(0xCC, 0x66, 0xFF),
            selection_bg: Color::Rgb(0x3D, 0x14, 0x38),
            search_match_bg: Color::Rgb(0x40, 0xE0, 0xD0),
            search_match_fg: Color::Rgb(0x0C, 0x00, 0x1B),
            feature_colors,
        }
    }
}

/// Parse a hex color string like "#FF4444" into an RGB Color
fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

impl Theme {
    /// Create a theme from the `[ui]` config, falling back to defaults
    pub fn from_config(ui: &UiConfig) -> Self {
        let mut theme = Theme::default();

        for (key, value) in &ui.colors {
            let Some(color) = parse_hex_color(value) else {
                continue;
            };
            match key.as_str() {
                "background" => theme.background = color,
                "text" => theme.text = color,
                "text_bright" => theme.text_bright = color,
                "highlight" => theme.highlight = color,
                "dim" => theme.dim = color,
                "red" => theme.red = color,
                "yellow" => theme.yellow = color,
                "green" => theme.green = color,
                "purple" => theme.purple = color,
                "selection_bg" => theme.selection_bg = color,
                "search_match_bg" => theme.search_match_bg = color,
                "search_match_fg" => theme.search_match_fg = color,
                other => debug!(key = other, "unknown ui color key ignored"),
            }
        }

        for (feature, value) in &ui.feature_colors {
            if let Some(color) = parse_hex_color(value) {
                theme.feature_colors.insert(feature.clone(), color);
            }
        }

        theme
    }

    /// Color for a feature tag, falling back to purple
    pub fn feature_color(&self, feature: &str) -> Color {
        self.feature_colors.get(feature).copied().unwrap_or(self.purple)
    }

    pub fn status_color(&self, status: TaskStatus) -> Color {
        match status {
            TaskStatus::Todo => self.text,
            TaskStatus::Doing => self.highlight,
            TaskStatus::Review => self.yellow,
            TaskStatus::Done => self.green,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(
            parse_hex_color("#FF4444"),
            Some(Color::Rgb(0xFF, 0x44, 0x44))
        );
        assert_eq!(parse_hex_color("FF4444"), None); // missing #
        assert_eq!(parse_hex_color("#FF44"), None); // too short
        assert_eq!(parse_hex_color("#ZZZZZZ"), None); // invalid hex
    }

    #[test]
    fn test_from_config_overrides() {
        let mut ui = UiConfig::default();
        ui.colors.insert("background".into(), "#000000".into());
        ui.colors.insert("nonsense".into(), "#111111".into());
        ui.colors.insert("cyan".into(), "#222222".into());
        ui.feature_colors.insert("search".into(), "#112233".into());

        let theme = Theme::from_config(&ui);
        assert_eq!(theme.background, Color::Rgb(0, 0, 0));
        assert_eq!(theme.feature_color("search"), Color::Rgb(0x11, 0x22, 0x33));
        // Unchanged defaults still present
        assert_eq!(theme.text, Color::Rgb(0xB0, 0xAA, 0xFF));
    }

    #[test]
    fn test_feature_color_fallback() {
        let theme = Theme::default();
        assert_eq!(theme.feature_color("ui"), Color::Rgb(0x44, 0xDD, 0xFF));
        assert_eq!(theme.feature_color("unknown"), theme.purple);
    }

    #[test]
    fn test_status_color() {
        let theme = Theme::default();
        assert_eq!(theme.status_color(TaskStatus::Doing), theme.highlight);
        assert_eq!(theme.status_color(TaskStatus::Review), theme.yellow);
        assert_eq!(theme.status_color(TaskStatus::Done), theme.green);
    }
}
