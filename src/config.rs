//! Editor settings persisted as TOML in the `.epoch123` folder.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app_dirs;

/// Default filename used to store the editor configuration.
pub const CONFIG_FILE_NAME: &str = "config.toml";

const MIN_POLL_INTERVAL_MS: u64 = 10;
const MAX_TICK_COUNT: usize = 64;

/// Errors that can occur while loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No suitable config directory available")]
    NoConfigDir,
    #[error("Failed to create config directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config file {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {0}")]
    SerializeToml(#[from] toml::ser::Error),
}

/// Aggregate editor settings.
///
/// Config keys (TOML): `selection`, `playback`, `history`, `view`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorSettings {
    #[serde(default)]
    pub selection: SelectionSettings,
    #[serde(default)]
    pub playback: PlaybackSettings,
    #[serde(default)]
    pub history: HistorySettings,
    #[serde(default)]
    pub view: ViewSettings,
}

/// Config keys: `min_span_samples`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionSettings {
    /// Drags spanning this many samples or fewer count as clicks.
    #[serde(default = "default_min_span_samples")]
    pub min_span_samples: usize,
}

/// Config keys: `poll_interval_ms`, `volume`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSettings {
    /// Interval between playback position polls.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Output volume in `0.0..=1.0`.
    #[serde(default = "default_volume")]
    pub volume: f32,
}

/// Config keys: `limit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySettings {
    /// Maximum number of undo snapshots retained.
    #[serde(default = "default_history_limit")]
    pub limit: usize,
}

/// Config keys: `tick_count`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSettings {
    /// Number of time ticks generated across the visible range.
    #[serde(default = "default_tick_count")]
    pub tick_count: usize,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            min_span_samples: default_min_span_samples(),
        }
    }
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            volume: default_volume(),
        }
    }
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            limit: default_history_limit(),
        }
    }
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            tick_count: default_tick_count(),
        }
    }
}

impl EditorSettings {
    /// Clamp values into their supported ranges.
    pub fn normalized(mut self) -> Self {
        self.selection.min_span_samples = self.selection.min_span_samples.max(1);
        self.playback.poll_interval_ms = self.playback.poll_interval_ms.max(MIN_POLL_INTERVAL_MS);
        self.playback.volume = clamp_volume(self.playback.volume);
        self.history.limit = self.history.limit.max(1);
        self.view.tick_count = self.view.tick_count.clamp(2, MAX_TICK_COUNT);
        self
    }
}

fn default_min_span_samples() -> usize {
    1
}

fn default_poll_interval_ms() -> u64 {
    50
}

fn default_volume() -> f32 {
    1.0
}

fn default_history_limit() -> usize {
    100
}

fn default_tick_count() -> usize {
    10
}

fn clamp_volume(volume: f32) -> f32 {
    if volume.is_finite() {
        volume.clamp(0.0, 1.0)
    } else {
        default_volume()
    }
}

/// Resolve the configuration file path inside the app root.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let dir = app_dirs::app_root_dir().map_err(map_app_dir_error)?;
    Ok(dir.join(CONFIG_FILE_NAME))
}

/// Load configuration from the app root, returning defaults if missing.
pub fn load_or_default() -> Result<EditorSettings, ConfigError> {
    load_from_path(&config_path()?)
}

/// Load configuration from a specific file, returning defaults if missing.
pub fn load_from_path(path: &Path) -> Result<EditorSettings, ConfigError> {
    if !path.exists() {
        return Ok(EditorSettings::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str::<EditorSettings>(&text)
        .map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })
        .map(EditorSettings::normalized)
}

/// Persist configuration to the app root.
pub fn save(settings: &EditorSettings) -> Result<(), ConfigError> {
    save_to_path(settings, &config_path()?)
}

/// Save configuration to a specific path, creating parent directories as needed.
pub fn save_to_path(settings: &EditorSettings, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let text = toml::to_string_pretty(settings)?;
    std::fs::write(path, text).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn map_app_dir_error(error: app_dirs::AppDirError) -> ConfigError {
    match error {
        app_dirs::AppDirError::NoBaseDir => ConfigError::NoConfigDir,
        app_dirs::AppDirError::CreateDir { path, source } => ConfigError::CreateDir { path, source },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let settings = load_from_path(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(settings, EditorSettings::default());
        assert_eq!(settings.playback.poll_interval_ms, 50);
        assert_eq!(settings.selection.min_span_samples, 1);
        assert_eq!(settings.view.tick_count, 10);
    }

    #[test]
    fn partial_file_fills_defaults_and_normalizes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            "[playback]\npoll_interval_ms = 2\nvolume = 3.5\n\n[history]\nlimit = 0\n",
        )
        .unwrap();
        let settings = load_from_path(&path).unwrap();
        assert_eq!(settings.playback.poll_interval_ms, MIN_POLL_INTERVAL_MS);
        assert_eq!(settings.playback.volume, 1.0);
        assert_eq!(settings.history.limit, 1);
        assert_eq!(settings.selection, SelectionSettings::default());
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);
        let mut settings = EditorSettings::default();
        settings.selection.min_span_samples = 32;
        settings.playback.volume = 0.25;
        save_to_path(&settings, &path).unwrap();
        assert_eq!(load_from_path(&path).unwrap(), settings);
    }

    #[test]
    fn invalid_toml_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[playback\nvolume = ").unwrap();
        let err = load_from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseToml { .. }));
    }
}
