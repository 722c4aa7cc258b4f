//! TOML-based application configuration.
//!
//! Stores:
//! - Tick cadence for elapsed-time refresh
//! - Database file name inside the data directory
//! - Timer form limits
//! - Whether active timers are restored at startup
//!
//! Configuration is stored at `~/.config/fleek/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::timer::DEFAULT_MAX_DESCRIPTION_LEN;

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/fleek/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Milliseconds between elapsed-time refreshes.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_database_file")]
    pub database_file: String,
    #[serde(default = "default_max_description_len")]
    pub max_description_len: usize,
    #[serde(default = "default_true")]
    pub restore_on_startup: bool,
}

fn default_tick_interval_ms() -> u64 {
    1000
}
fn default_database_file() -> String {
    "fleek.db".into()
}
fn default_max_description_len() -> usize {
    DEFAULT_MAX_DESCRIPTION_LEN
}
fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            database_file: default_database_file(),
            max_description_len: default_max_description_len(),
            restore_on_startup: true,
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => serde_json::Value::Number(
                        value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?
                            .into(),
                    ),
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, writing defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the
    /// defaults cannot be written.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)
                    .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()),
        }
    }

    /// Persist to the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key in memory. Call [`save`](Self::save) to
    /// persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json)?;
        Ok(())
    }

    /// The tick period. A zero interval falls back to the default.
    pub fn tick_interval(&self) -> Duration {
        match self.tick_interval_ms {
            0 => Duration::from_millis(default_tick_interval_ms()),
            ms => Duration::from_millis(ms),
        }
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let parsed: Config = toml::from_str("tick_interval_ms = 250").unwrap();
        assert_eq!(parsed.tick_interval(), Duration::from_millis(250));
        assert_eq!(parsed.database_file, "fleek.db");
        assert_eq!(parsed.max_description_len, 500);
        assert!(parsed.restore_on_startup);
    }

    #[test]
    fn zero_tick_interval_falls_back() {
        let cfg = Config {
            tick_interval_ms: 0,
            ..Config::default()
        };
        assert_eq!(cfg.tick_interval(), Duration::from_secs(1));
    }

    #[test]
    fn get_returns_string_for_all_types() {
        let cfg = Config::default();
        assert_eq!(cfg.get("tick_interval_ms").as_deref(), Some("1000"));
        assert_eq!(cfg.get("restore_on_startup").as_deref(), Some("true"));
        assert_eq!(cfg.get("database_file").as_deref(), Some("fleek.db"));
        assert!(cfg.get("missing_key").is_none());
    }

    #[test]
    fn set_updates_typed_values() {
        let mut cfg = Config::default();
        cfg.set("tick_interval_ms", "500").unwrap();
        cfg.set("restore_on_startup", "false").unwrap();
        cfg.set("database_file", "other.db").unwrap();
        assert_eq!(cfg.tick_interval_ms, 500);
        assert!(!cfg.restore_on_startup);
        assert_eq!(cfg.database_file, "other.db");
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_type() {
        let mut cfg = Config::default();
        assert!(cfg.set("nonexistent_key", "1").is_err());
        assert!(cfg.set("restore_on_startup", "not_a_bool").is_err());
        assert!(cfg.set("tick_interval_ms", "-5").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn load_from_writes_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());

        let mut changed = cfg.clone();
        changed.set("max_description_len", "80").unwrap();
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().max_description_len, 80);
    }

    #[test]
    fn load_from_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "tick_interval_ms = \"soon\"").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
