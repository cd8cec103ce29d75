//! User settings, read from `config.toml`.
//!
//! ## Learning: Serde for Serialization
//!
//! `#[derive(Serialize, Deserialize)]` generates the TOML mapping, and
//! `#[serde(default)]` fills any field the file leaves out from
//! `Default::default()`, so an old or partial file keeps loading.
//!
//! ```toml
//! [editor]
//! undo_limit = 500
//! indent = "    "
//! list_marker = "* "
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// All settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub editor: EditorConfig,
}

impl Config {
    /// Reads the file at the default location.
    ///
    /// A missing file means defaults; an unreadable one is logged and
    /// also means defaults.
    pub fn load() -> Self {
        let path = match Self::default_path() {
            Ok(path) => path,
            Err(err) => {
                tracing::warn!("Using default config: {}", err);
                return Self::default();
            }
        };
        if !path.exists() {
            return Self::default();
        }
        Self::load_from(&path).unwrap_or_else(|err| {
            tracing::warn!(path = %path.display(), "Using default config: {}", err);
            Self::default()
        })
    }

    /// Reads and checks a specific file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        config.editor.validate()?;
        tracing::debug!(path = %path.as_ref().display(), "config loaded");
        Ok(config)
    }

    /// `<config dir>/noted/config.toml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("noted").join("config.toml"))
    }

    /// Writes the settings to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(Self::default_path()?)
    }

    /// Writes the settings to a specific file, creating its directory.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// How the editor behaves while typing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Undo steps kept before the oldest are dropped
    pub undo_limit: usize,

    /// One level of list indentation
    pub indent: String,

    /// Bullet written after a list item's indentation
    pub list_marker: String,

    /// Open notes with list mode already on
    pub start_in_list_mode: bool,
}

impl EditorConfig {
    /// Rejects settings the editor cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.undo_limit == 0 {
            return Err(ConfigError::Invalid("undo_limit must be at least 1".into()));
        }
        if self.indent.is_empty() || self.indent.contains('\n') {
            return Err(ConfigError::Invalid(
                "indent must be non-empty and on one line".into(),
            ));
        }
        if self.list_marker.contains('\n') {
            return Err(ConfigError::Invalid("list_marker must be on one line".into()));
        }
        Ok(())
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            undo_limit: 1000,
            indent: "\t".to_string(),
            list_marker: "- ".to_string(),
            start_in_list_mode: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config directory not found")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let editor = EditorConfig::default();
        assert_eq!(editor.undo_limit, 1000);
        assert_eq!(editor.indent, "\t");
        assert_eq!(editor.list_marker, "- ");
        assert!(!editor.start_in_list_mode);
        assert!(editor.validate().is_ok());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config::default();
        let text = toml::to_string(&config).unwrap();
        assert_eq!(toml::from_str::<Config>(&text).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let parsed: Config = toml::from_str("[editor]\nundo_limit = 5\n").unwrap();
        assert_eq!(parsed.editor.undo_limit, 5);
        assert_eq!(parsed.editor.list_marker, "- ");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.editor.indent = "  ".to_string();
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap().editor.indent, "  ");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::load_from(dir.path().join("absent.toml")),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[editor]\nundo_limit = 0\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Invalid(_))
        ));

        let config = EditorConfig {
            indent: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
