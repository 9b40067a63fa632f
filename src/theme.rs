use crossterm::event::KeyCode;
use crossterm::style::Color;

/// Active color theme. Passed down explicitly; nothing reads it globally.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::Dark
    }
}

/// Branch stroke color for the growth animation.
pub fn branch_color(theme: Theme) -> Color {
    match theme {
        Theme::Light => Color::Rgb { r: 120, g: 120, b: 120 },
        Theme::Dark => Color::Rgb { r: 160, g: 160, b: 160 },
    }
}

/// Heatmap cell color for a quantized activity level (0..=4).
pub fn level_color(theme: Theme, level: u8) -> Color {
    match theme {
        Theme::Light => match level {
            0 => Color::Rgb { r: 235, g: 237, b: 240 },
            1 => Color::Rgb { r: 155, g: 233, b: 168 },
            2 => Color::Rgb { r: 64, g: 196, b: 99 },
            3 => Color::Rgb { r: 48, g: 161, b: 78 },
            _ => Color::Rgb { r: 33, g: 110, b: 57 },
        },
        Theme::Dark => match level {
            0 => Color::Rgb { r: 22, g: 27, b: 34 },
            1 => Color::Rgb { r: 14, g: 68, b: 41 },
            2 => Color::Rgb { r: 0, g: 109, b: 50 },
            3 => Color::Rgb { r: 38, g: 166, b: 65 },
            _ => Color::Rgb { r: 57, g: 211, b: 83 },
        },
    }
}

pub fn text_color(theme: Theme) -> Color {
    match theme {
        Theme::Light => Color::Black,
        Theme::Dark => Color::White,
    }
}

pub fn muted_color(theme: Theme) -> Color {
    match theme {
        Theme::Light => Color::Grey,
        Theme::Dark => Color::DarkGrey,
    }
}

/// Interactive theme state shared by the views.
pub struct ThemeState {
    pub theme: Theme,
}

impl ThemeState {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    /// Handle a theme key. Returns true when the theme changed.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('t') => {
                self.theme = self.theme.toggle();
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_round_trips() {
        assert_eq!(Theme::from_name("light"), Some(Theme::Light));
        assert_eq!(Theme::from_name("DARK"), Some(Theme::Dark));
        assert_eq!(Theme::from_name("sepia"), None);
        assert_eq!(Theme::from_name(Theme::Light.name()), Some(Theme::Light));
    }

    #[test]
    fn toggle_alternates() {
        assert_eq!(Theme::Light.toggle(), Theme::Dark);
        assert_eq!(Theme::Dark.toggle().toggle(), Theme::Dark);
    }

    #[test]
    fn theme_key_toggles_state() {
        let mut state = ThemeState::new(Theme::Dark);
        assert!(state.handle_key(KeyCode::Char('t')));
        assert_eq!(state.theme, Theme::Light);
        assert!(!state.handle_key(KeyCode::Char('x')));
        assert_eq!(state.theme, Theme::Light);
    }

    #[test]
    fn level_colors_are_distinct_within_a_theme() {
        for theme in [Theme::Light, Theme::Dark] {
            let colors: Vec<_> = (0..5).map(|l| level_color(theme, l)).collect();
            for i in 0..colors.len() {
                for j in i + 1..colors.len() {
                    assert_ne!(colors[i], colors[j]);
                }
            }
        }
    }
}
