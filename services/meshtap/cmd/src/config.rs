//! Configuration handling for meshtap.
//!
//! Settings come from an optional YAML file, then environment variables,
//! then command-line flags (applied by the caller). Loading never logs:
//! it runs before the subscriber is installed, so the outcome is kept in
//! [`MeshtapConfig::source`] for the caller to report.

use anyhow::{bail, Result};
use meshtap_capture::{DEFAULT_SNAP_LEN, LINKTYPE_LORATAP};
use meshtap_storage::StorageMode;
use meshtap_wire::{ChannelKey, DEFAULT_CHANNEL_KEY};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Where the configuration came from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// No file given
    #[default]
    Defaults,
    /// Loaded from this file
    File(PathBuf),
    /// File given but unusable; defaults used
    Fallback {
        /// File that was tried
        path: PathBuf,
        /// Why it was not used
        reason: String,
    },
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Defaults => write!(f, "defaults"),
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Fallback { path, reason } => {
                write!(f, "defaults ({} unusable: {})", path.display(), reason)
            }
        }
    }
}

/// Record storage settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// `memory` or `file`
    pub mode: String,
    /// Data directory for file storage
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            mode: "memory".to_string(),
            data_dir: PathBuf::from("./meshtap-data"),
        }
    }
}

/// Capture file settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CaptureConfig {
    /// Maximum captured bytes per frame
    pub snap_len: u32,
    /// Link type written to new capture files
    pub link_type: u16,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            snap_len: DEFAULT_SNAP_LEN,
            link_type: LINKTYPE_LORATAP,
        }
    }
}

/// meshtap configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MeshtapConfig {
    /// Channel key as base64 text
    pub channel_key: String,
    /// Record storage
    pub storage: StorageConfig,
    /// Capture files
    pub capture: CaptureConfig,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Where this configuration came from
    #[serde(skip)]
    pub source: ConfigSource,
}

impl Default for MeshtapConfig {
    fn default() -> Self {
        Self {
            channel_key: DEFAULT_CHANNEL_KEY.to_string(),
            storage: StorageConfig::default(),
            capture: CaptureConfig::default(),
            log_level: "info".to_string(),
            source: ConfigSource::Defaults,
        }
    }
}

impl MeshtapConfig {
    /// Load from an optional file, then apply environment overrides
    pub fn load(config_path: Option<&Path>) -> Self {
        let mut config = match config_path {
            Some(path) => Self::load_from_file(path),
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        config
    }

    /// Load from a file; a missing or malformed file yields defaults
    pub fn load_from_file<P: AsRef<Path>>(config_path: P) -> Self {
        let path = config_path.as_ref().to_path_buf();

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                return Self {
                    source: ConfigSource::Fallback {
                        path,
                        reason: e.to_string(),
                    },
                    ..Self::default()
                }
            }
        };

        match serde_yaml::from_str::<MeshtapConfig>(&content) {
            Ok(mut config) => {
                config.source = ConfigSource::File(path);
                config
            }
            Err(e) => Self {
                source: ConfigSource::Fallback {
                    path,
                    reason: e.to_string(),
                },
                ..Self::default()
            },
        }
    }

    /// Apply `MESHTAP_*` overrides using `lookup` to read variables
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("MESHTAP_CHANNEL_KEY") {
            self.channel_key = key;
        }
        if let Some(mode) = lookup("MESHTAP_STORAGE_MODE") {
            self.storage.mode = mode;
        }
        if let Some(dir) = lookup("MESHTAP_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(level) = lookup("MESHTAP_LOG_LEVEL") {
            self.log_level = level;
        }
    }

    /// Derive the channel key; failure is a startup error
    pub fn channel_key(&self) -> Result<ChannelKey> {
        Ok(ChannelKey::derive(&self.channel_key)?)
    }

    /// Storage backend selected by the configuration
    pub fn storage_mode(&self) -> Result<StorageMode> {
        match self.storage.mode.as_str() {
            "memory" => Ok(StorageMode::InMemory),
            "file" => Ok(StorageMode::File {
                data_dir: self.storage.data_dir.clone(),
            }),
            other => bail!("Invalid storage mode: {}. Use 'memory' or 'file'", other),
        }
    }
}
