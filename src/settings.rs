use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::theme::Theme;

/// Persisted preferences. Loading never fails; anything unreadable falls back
/// to defaults. Saving is best-effort.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Active theme, stored under a fixed key and re-applied on start.
    pub theme: Option<String>,
    #[serde(default)]
    pub github: GithubSettings,
    #[serde(default)]
    pub visits: VisitSettings,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GithubSettings {
    /// Default username for the contribution view.
    pub user: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct VisitSettings {
    /// Hit-counter slug override.
    pub slug: Option<String>,
}

impl Settings {
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Ok(content) = toml::to_string(self) {
            let _ = fs::write(&path, content);
        }
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("plumterm")
            .join("config.toml")
    }

    pub fn theme(&self) -> Theme {
        self.theme
            .as_deref()
            .and_then(Theme::from_name)
            .unwrap_or_default()
    }

    /// Remember a theme choice and write it through to disk.
    pub fn persist_theme(&mut self, theme: Theme) {
        self.theme = Some(theme.name().to_string());
        self.save();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_theme_string_falls_back_to_default() {
        let settings = Settings {
            theme: Some("solarized".to_string()),
            ..Default::default()
        };
        assert_eq!(settings.theme(), Theme::default());
    }

    #[test]
    fn stored_theme_is_applied() {
        let settings = Settings {
            theme: Some("light".to_string()),
            ..Default::default()
        };
        assert_eq!(settings.theme(), Theme::Light);
    }

    #[test]
    fn settings_round_trip_through_toml() {
        let mut settings = Settings::default();
        settings.theme = Some("dark".to_string());
        settings.github.user = Some("octocat".to_string());
        let text = toml::to_string(&settings).unwrap();
        let back: Settings = toml::from_str(&text).unwrap();
        assert_eq!(back.theme.as_deref(), Some("dark"));
        assert_eq!(back.github.user.as_deref(), Some("octocat"));
    }
}
