//! Theme colors, with optional overrides from the `[theme]` config table

use ratatui::style::Color;

use crate::config::ThemeConfig;

/// Theme colors for the UI
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub accent: Color,       // Focused borders, key hints, button
    pub danger: Color,       // Error line
    pub success: Color,      // Result panel border
    pub text: Color,         // Primary text
    pub text_dim: Color,     // Hints, disabled controls
    pub inactive: Color,     // Unfocused borders
}

impl Default for Theme {
    fn default() -> Self {
        // Catppuccin-inspired
        Self {
            accent: Color::Rgb(250, 179, 135),
            danger: Color::Rgb(243, 139, 168),
            success: Color::Rgb(166, 218, 149),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(147, 153, 178),
            inactive: Color::Rgb(88, 91, 112),
        }
    }
}

impl Theme {
    /// Defaults with any valid overrides applied; bad values are logged and skipped
    pub fn from_config(config: &ThemeConfig) -> Self {
        let base = Self::default();
        Self {
            accent: Self::pick("accent", config.accent.as_deref(), base.accent),
            danger: Self::pick("danger", config.danger.as_deref(), base.danger),
            success: Self::pick("success", config.success.as_deref(), base.success),
            text: Self::pick("text", config.text.as_deref(), base.text),
            text_dim: Self::pick("text_dim", config.text_dim.as_deref(), base.text_dim),
            inactive: Self::pick("inactive", config.inactive.as_deref(), base.inactive),
        }
    }

    fn pick(key: &str, value: Option<&str>, fallback: Color) -> Color {
        match value {
            None => fallback,
            Some(v) => Self::parse_hex_color(v).unwrap_or_else(|| {
                tracing::warn!("Ignoring invalid theme color {} = {:?}", key, v);
                fallback
            }),
        }
    }

    /// Parse a hex color string (#RRGGBB or #RGB)
    fn parse_hex_color(s: &str) -> Option<Color> {
        let s = s.trim().trim_start_matches('#');
        // from_str_radix alone would accept a leading '+'
        if !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        if s.len() == 6 {
            let r = u8::from_str_radix(&s[0..2], 16).ok()?;
            let g = u8::from_str_radix(&s[2..4], 16).ok()?;
            let b = u8::from_str_radix(&s[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        } else if s.len() == 3 {
            let r = u8::from_str_radix(&s[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&s[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&s[2..3], 16).ok()? * 17;
            Some(Color::Rgb(r, g, b))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(Theme::parse_hex_color("#FFC107"), Some(Color::Rgb(255, 193, 7)));
        assert_eq!(Theme::parse_hex_color("fff"), Some(Color::Rgb(255, 255, 255)));
        assert_eq!(Theme::parse_hex_color("#12345"), None);
        assert_eq!(Theme::parse_hex_color("#zzzzzz"), None);
        assert_eq!(Theme::parse_hex_color("#+f+f+f"), None);
        assert_eq!(Theme::parse_hex_color("+f+"), None);
    }

    #[test]
    fn test_overrides_apply_and_bad_values_fall_back() {
        let config = ThemeConfig {
            accent: Some("#000000".to_string()),
            danger: Some("not-a-color".to_string()),
            ..ThemeConfig::default()
        };
        let theme = Theme::from_config(&config);

        assert_eq!(theme.accent, Color::Rgb(0, 0, 0));
        assert_eq!(theme.danger, Theme::default().danger);
        assert_eq!(theme.text, Theme::default().text);
    }
}
