//! Settings document persistence
//!
//! The settings document is a small JSON file holding the storage directory
//! and the theme selection:
//!
//! ```json
//! {
//!   "database": { "path": "data" },
//!   "style": { "selection": "dark" }
//! }
//! ```
//!
//! `database.path` is required. A missing `style` section means the
//! unstyled default theme. Top-level keys this module does not know about
//! are kept and written back on save.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable that overrides the settings document location.
pub const SETTINGS_ENV: &str = "CLIENTBOOK_SETTINGS";

/// Settings file name used when [`SETTINGS_ENV`] is unset.
pub const DEFAULT_SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("I/O error accessing settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize settings: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Visual theme chosen on the settings screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
    /// Unstyled; used for any selection other than `dark` / `light`.
    Default,
}

impl Theme {
    /// Exact, case-sensitive match on the stored selection.
    pub fn from_selection(selection: &str) -> Self {
        match selection {
            "dark" => Theme::Dark,
            "light" => Theme::Light,
            _ => Theme::Default,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
            Theme::Default => "",
        }
    }
}

/// On-disk shape of the settings document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    pub database: DatabaseSettings,
    #[serde(default)]
    pub style: StyleSettings,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatabaseSettings {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StyleSettings {
    #[serde(default)]
    pub selection: String,
}

/// Resolves where the settings document lives.
pub fn settings_path() -> PathBuf {
    std::env::var_os(SETTINGS_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE))
}

/// A loaded settings document bound to the file it came from.
#[derive(Debug, Clone)]
pub struct SettingsFile {
    path: PathBuf,
    settings: Settings,
}

impl SettingsFile {
    /// Reads and parses the document at `path`.
    ///
    /// A missing file is an error: the application cannot pick a storage
    /// directory without one.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|source| SettingsError::Io {
            path: path.clone(),
            source,
        })?;
        let settings: Settings =
            serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
                path: path.clone(),
                source,
            })?;
        debug!("loaded settings from {}", path.display());
        Ok(Self { path, settings })
    }

    /// Binds in-memory settings to `path` without touching the disk.
    pub fn new(path: impl Into<PathBuf>, settings: Settings) -> Self {
        Self {
            path: path.into(),
            settings,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The storage directory exactly as written in the document.
    pub fn raw_storage_path(&self) -> &Path {
        &self.settings.database.path
    }

    /// The storage directory, with relative paths resolved against the
    /// directory containing the settings document.
    pub fn storage_path(&self) -> PathBuf {
        let raw = &self.settings.database.path;
        if raw.is_absolute() {
            return raw.clone();
        }
        match self.path.parent() {
            Some(base) if !base.as_os_str().is_empty() => base.join(raw),
            _ => raw.clone(),
        }
    }

    /// The raw theme selection string.
    pub fn theme(&self) -> &str {
        &self.settings.style.selection
    }

    pub fn resolved_theme(&self) -> Theme {
        Theme::from_selection(self.theme())
    }

    pub fn set_storage_path(&mut self, path: impl Into<PathBuf>) {
        self.settings.database.path = path.into();
    }

    pub fn set_theme(&mut self, selection: impl Into<String>) {
        self.settings.style.selection = selection.into();
    }

    /// Writes the document back to the file it was loaded from.
    pub fn save(&self) -> Result<(), SettingsError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|source| SettingsError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let content =
            serde_json::to_string_pretty(&self.settings).map_err(SettingsError::Serialize)?;
        std::fs::write(&self.path, content).map_err(|source| SettingsError::Io {
            path: self.path.clone(),
            source,
        })?;
        info!("settings saved to {}", self.path.display());
        Ok(())
    }
}
