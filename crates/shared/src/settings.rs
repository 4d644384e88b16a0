//! Application settings and their on-disk persistence.
//!
//! Only the theme is a true user preference; the Gemini block and the fixed
//! location are configuration read at startup.

use crate::patent::GeoLocation;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variables consulted for the API key, in order.
pub const API_KEY_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];
/// Environment variable holding a `"lat,lng"` location override.
pub const LOCATION_VAR: &str = "INTELLIPATENT_LOCATION";

const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("No configuration directory available on this platform")]
    NoConfigDir,

    #[error("Settings I/O failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Settings file {} is not valid JSON: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Model names per workload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiModels {
    /// Low-latency structured output (instant summary).
    pub fast: String,
    /// Search- and maps-grounded retrieval.
    pub grounded: String,
    /// Long-form reasoning (deep insights, claim mapping).
    pub reasoning: String,
    pub chat: String,
}

impl Default for GeminiModels {
    fn default() -> Self {
        Self {
            fast: "gemini-flash-lite-latest".into(),
            grounded: "gemini-2.5-flash".into(),
            reasoning: "gemini-2.5-pro".into(),
            chat: "gemini-2.5-flash".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
    pub thinking_budget: u32,
    pub models: GeminiModels,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta/models".into(),
            timeout_secs: 120,
            thinking_budget: 32768,
            models: GeminiModels::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub theme: Theme,
    pub gemini: GeminiSettings,
    /// Fixed location used when no override is set in the environment.
    pub location: Option<GeoLocation>,
}

impl AppSettings {
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        let io_err = |source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, json).map_err(io_err)
    }

    /// Load from the default location, falling back to defaults when the file
    /// is missing or unreadable.
    pub fn load_or_default() -> Self {
        let path = match config_path() {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("{e}; using default settings");
                return Self::default();
            }
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("{e}; using default settings");
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<(), SettingsError> {
        self.save_to(&config_path()?)
    }

    /// API key from settings, else from the environment.
    pub fn api_key(&self) -> Option<String> {
        self.api_key_with(|name| std::env::var(name).ok())
    }

    pub fn api_key_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        if let Some(key) = self.gemini.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
            return Some(key.clone());
        }
        API_KEY_VARS
            .iter()
            .filter_map(|name| lookup(*name))
            .find(|k| !k.trim().is_empty())
    }

    /// Location from the environment override, else from settings.
    pub fn location(&self) -> Option<GeoLocation> {
        self.location_with(|name| std::env::var(name).ok())
    }

    pub fn location_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<GeoLocation> {
        match lookup(LOCATION_VAR) {
            Some(raw) => GeoLocation::parse(&raw).or_else(|| {
                tracing::warn!("Ignoring malformed {LOCATION_VAR}={raw:?}");
                self.location
            }),
            None => self.location,
        }
    }
}

pub fn config_path() -> Result<PathBuf, SettingsError> {
    directories::ProjectDirs::from("com.local", "IntelliPatent", "IntelliPatent")
        .map(|proj| proj.config_dir().join(SETTINGS_FILE))
        .ok_or(SettingsError::NoConfigDir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_roundtrip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let settings = AppSettings {
            theme: Theme::Light,
            ..AppSettings::default()
        };
        settings.save_to(&path).unwrap();

        let loaded = AppSettings::load_from(&path).unwrap();
        assert_eq!(loaded.theme, Theme::Light);
        assert_eq!(loaded.gemini.models.reasoning, "gemini-2.5-pro");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"gemini":{"timeout_secs":30}}"#).unwrap();

        let loaded = AppSettings::load_from(&path).unwrap();
        assert_eq!(loaded.theme, Theme::Dark);
        assert_eq!(loaded.gemini.timeout_secs, 30);
        assert_eq!(loaded.gemini.models.fast, "gemini-flash-lite-latest");
    }

    #[test]
    fn test_corrupt_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = AppSettings::load_from(&path).unwrap_err();
        assert!(matches!(err, SettingsError::Parse { .. }));
    }

    #[test]
    fn test_api_key_precedence() {
        let mut settings = AppSettings::default();
        let env = |name: &str| match name {
            "API_KEY" => Some("from-api-key".to_string()),
            "GEMINI_API_KEY" => Some("  ".to_string()),
            _ => None,
        };
        assert_eq!(settings.api_key_with(env).as_deref(), Some("from-api-key"));

        settings.gemini.api_key = Some("configured".into());
        assert_eq!(settings.api_key_with(env).as_deref(), Some("configured"));
        assert_eq!(AppSettings::default().api_key_with(|_| None), None);
    }

    #[test]
    fn test_location_override() {
        let settings = AppSettings {
            location: Some(GeoLocation {
                latitude: 1.0,
                longitude: 2.0,
            }),
            ..AppSettings::default()
        };

        let from_env = settings.location_with(|_| Some("10,20".to_string())).unwrap();
        assert_eq!(from_env.latitude, 10.0);

        let malformed = settings.location_with(|_| Some("garbage".to_string())).unwrap();
        assert_eq!(malformed.latitude, 1.0);

        assert_eq!(settings.location_with(|_| None), settings.location);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
    }
}
