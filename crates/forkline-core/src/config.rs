//! Configuration management for forkline.
//!
//! Loads configuration from ${FORKLINE_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::time::DEFAULT_DATE_FORMAT;

fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for forkline configuration.
    //!
    //! FORKLINE_HOME resolution order:
    //! 1. FORKLINE_HOME environment variable (if set)
    //! 2. ~/.config/forkline (default)

    use std::path::PathBuf;

    /// Returns the forkline home directory.
    pub fn forkline_home() -> PathBuf {
        if let Ok(home) = std::env::var("FORKLINE_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".forkline"),
            |h| h.join(".config").join("forkline"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        forkline_home().join("config.toml")
    }
}

/// How branch rows are labelled and dated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub untitled_label: String,
    pub date_format: String,
    pub max_label_width: usize,
}

impl DisplayConfig {
    const DEFAULT_UNTITLED_LABEL: &'static str = "Untitled branch";
    const DEFAULT_MAX_LABEL_WIDTH: usize = 48;
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            untitled_label: Self::DEFAULT_UNTITLED_LABEL.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            max_label_width: Self::DEFAULT_MAX_LABEL_WIDTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing` filter directive, e.g. `"warn"` or `"forkline_core=debug"`.
    pub filter: String,
    /// Log file; relative paths resolve against `FORKLINE_HOME`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
            file: None,
        }
    }
}

impl LogConfig {
    /// Resolves `file` against `home` when it is relative.
    pub fn resolved_file(&self, home: &Path) -> Option<PathBuf> {
        self.file.as_ref().map(|file| {
            if file.is_absolute() {
                file.clone()
            } else {
                home.join(file)
            }
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub log: LogConfig,
}

impl Config {
    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename).
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}
