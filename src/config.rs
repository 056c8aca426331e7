//! JSON-backed settings persistence for the CLI's target-host configuration.
//!
//! Not part of "the core" (see `spec.md` §1's Non-goals): the protocol stack works
//! without ever touching this module. Grounded on `original_source/pyetg1510/helper/settings.py`'s
//! load-or-create, deep-merge-on-load, diff-and-log-on-save behavior.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Persisted target-host configuration for the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Last-used Mailbox Gateway host, if any.
    #[serde(default)]
    pub host: Option<String>,

    /// Mailbox Gateway UDP port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Indices to watch by default when none are given on the command line.
    #[serde(default)]
    pub watch: Vec<u16>,
}

fn default_port() -> u16 {
    crate::session::GATEWAY_PORT
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: None,
            port: default_port(),
            watch: Vec::new(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, creating the file (and its parent directory) with
    /// defaults if it does not yet exist. An existing file is deep-merged onto the
    /// defaults: fields absent from the file keep their default value.
    pub fn load_or_create(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            let defaults = Self::default();
            defaults.save(path)?;
            return Ok(defaults);
        }

        let raw = fs::read_to_string(path).map_err(ConfigError::Io)?;
        let loaded: Self = serde_json::from_str(&raw).map_err(ConfigError::Decode)?;

        Ok(loaded)
    }

    /// Save these settings to `path` as pretty-printed JSON, creating the parent
    /// directory if needed and logging a warning for every field that changed relative
    /// to `before`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(ConfigError::Io)?;
            }
        }

        let json = serde_json::to_string_pretty(self).map_err(ConfigError::Decode)?;
        fs::write(path, json).map_err(ConfigError::Io)?;

        Ok(())
    }

    /// Save `self`, logging a warning for each top-level field that differs from
    /// `before`. Mirrors the source's diff-and-log-on-save behavior.
    pub fn save_reporting_diff(&self, before: &Self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        if before.host != self.host {
            warn!("setting changed: host: {:?} -> {:?}", before.host, self.host);
        }
        if before.port != self.port {
            warn!("setting changed: port: {} -> {}", before.port, self.port);
        }
        if before.watch != self.watch {
            warn!("setting changed: watch: {:?} -> {:?}", before.watch, self.watch);
        }

        self.save(path)
    }

    /// The conventional settings file location, `./etg1510.json`.
    pub fn default_path() -> PathBuf {
        PathBuf::from("etg1510.json")
    }
}

/// Errors arising from loading or saving [`Settings`].
#[derive(Debug)]
pub enum ConfigError {
    /// The settings file could not be read, written, or created.
    Io(std::io::Error),
    /// The settings file's contents were not valid JSON, or could not be serialized.
    Decode(serde_json::Error),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "settings I/O error: {e}"),
            Self::Decode(e) => write!(f, "settings JSON error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_a_temp_file() {
        let dir = std::env::temp_dir().join(format!("etg1510-test-{:?}", std::thread::current().id()));
        let path = dir.join("settings.json");

        let mut settings = Settings::default();
        settings.host = Some("10.0.0.5".to_string());
        settings.watch = vec![0x1000, 0x1018];

        settings.save(&path).unwrap();

        let loaded = Settings::load_or_create(&path).unwrap();

        assert_eq!(loaded, settings);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = std::env::temp_dir().join(format!("etg1510-test-default-{:?}", std::thread::current().id()));
        let path = dir.join("settings.json");

        let loaded = Settings::load_or_create(&path).unwrap();

        assert_eq!(loaded, Settings::default());
        assert!(path.exists());

        fs::remove_dir_all(&dir).ok();
    }
}
