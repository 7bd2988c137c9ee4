//! Tandem configuration file handling

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tandem_recorder::{CaptureConfig, PlaybackConfig, SyncConfig};

/// Default config file name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "tandem.toml";

/// Top-level Tandem configuration (tandem.toml)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TandemConfig {
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub runner: RunnerConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directives, overridden by `RUST_LOG`
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    "tandem=info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

/// Scenario runner configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct RunnerConfig {
    /// Virtual milliseconds per cooperative step during `wait`
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

fn default_tick_ms() -> u64 {
    10
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
        }
    }
}

impl TandemConfig {
    /// Load configuration from a file
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config: TandemConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(config)
    }

    /// Load `path` if given, else `tandem.toml` in `dir` if present, else
    /// the defaults
    pub fn resolve(path: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }
        let default_path = dir.join(CONFIG_FILE_NAME);
        if default_path.is_file() {
            return Self::load_from_path(&default_path);
        }
        Ok(Self::default())
    }

    /// Engine settings
    pub fn sync(&self) -> SyncConfig {
        SyncConfig {
            playback: self.playback,
            capture: self.capture,
        }
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}
