//! Configuration loading and data root resolution
//!
//! Bootstrap settings come from, highest priority first:
//! 1. Command-line arguments
//! 2. Environment variables (`PARL_DATA_ROOT`, `PARL_PORT`)
//! 3. TOML config file
//! 4. Compiled defaults
//!
//! A missing config file is not an error; the viewer starts on defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{Error, Result};

pub const DEFAULT_DATA_ROOT: &str = "http://127.0.0.1:8005/output/";
pub const DEFAULT_LIST_FILE: &str = "liste_parlementaires.json";
pub const DEFAULT_DETAILS_DIR: &str = "parlementaires/";
pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5790;

pub const DATA_ROOT_ENV: &str = "PARL_DATA_ROOT";
pub const PORT_ENV: &str = "PARL_PORT";

const APP_DIR: &str = "parl-viewer";
const CONFIG_FILE: &str = "config.toml";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Base URL the list index and detail documents are resolved against
    #[serde(default)]
    pub data_root: Option<String>,

    /// List index path, relative to the data root
    #[serde(default)]
    pub list_file: Option<String>,

    /// Detail documents directory, relative to the data root
    #[serde(default)]
    pub details_dir: Option<String>,

    #[serde(default)]
    pub bind: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Load an explicit config file (must exist), or the first discovered
    /// one, or fall back to defaults. Also returns the file that was read.
    pub fn discover(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => default_config_path(),
        };
        match path {
            Some(path) => Ok((Self::load(&path)?, Some(path))),
            None => Ok((Self::default(), None)),
        }
    }
}

/// First existing config file among the user config dir and `/etc`.
pub fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(unix) {
        let system_config = PathBuf::from("/etc").join(APP_DIR).join(CONFIG_FILE);
        if system_config.exists() {
            return Some(system_config);
        }
    }
    None
}

/// Command-line configuration overrides
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub data_root: Option<String>,
    pub bind: Option<String>,
    pub port: Option<u16>,
}

/// Fully resolved viewer configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerConfig {
    /// Always ends with `/`
    pub data_root: String,
    pub list_file: String,
    /// Always ends with `/`
    pub details_dir: String,
    pub bind: String,
    pub port: u16,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl ViewerConfig {
    /// Merge CLI overrides, environment, TOML and defaults.
    pub fn resolve(toml_config: &TomlConfig, overrides: &ConfigOverrides) -> Result<Self> {
        let data_root = overrides
            .data_root
            .clone()
            .or_else(|| env_value(DATA_ROOT_ENV))
            .or_else(|| toml_config.data_root.clone())
            .unwrap_or_else(|| DEFAULT_DATA_ROOT.to_string());

        if data_root.trim().is_empty() {
            return Err(Error::Config("data root is empty".to_string()));
        }

        let port = match overrides.port {
            Some(port) => port,
            None => match env_value(PORT_ENV) {
                Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                    Error::Config(format!("Invalid {} value {:?}: {}", PORT_ENV, raw, e))
                })?,
                None => toml_config.port.unwrap_or(DEFAULT_PORT),
            },
        };

        let list_file = toml_config
            .list_file
            .clone()
            .unwrap_or_else(|| DEFAULT_LIST_FILE.to_string());

        let details_dir = toml_config
            .details_dir
            .clone()
            .unwrap_or_else(|| DEFAULT_DETAILS_DIR.to_string());

        let bind = overrides
            .bind
            .clone()
            .or_else(|| toml_config.bind.clone())
            .unwrap_or_else(|| DEFAULT_BIND.to_string());

        let level = toml_config.logging.level.trim();
        let log_level = if level.is_empty() {
            default_log_level()
        } else {
            level.to_string()
        };

        Ok(Self {
            data_root: with_trailing_slash(data_root.trim()),
            list_file,
            details_dir: with_trailing_slash(&details_dir),
            bind,
            port,
            log_level,
            log_file: toml_config.logging.file.clone(),
        })
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Relative URL resolution drops the last path segment unless it ends with `/`.
pub fn with_trailing_slash(value: &str) -> String {
    if value.ends_with('/') {
        value.to_string()
    } else {
        format!("{}/", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_level() {
        assert_eq!(default_log_level(), "info");
        assert_eq!(LoggingConfig::default().level, "info");
    }

    #[test]
    fn test_trailing_slash() {
        assert_eq!(with_trailing_slash("http://h/output"), "http://h/output/");
        assert_eq!(with_trailing_slash("http://h/output/"), "http://h/output/");
    }

    #[test]
    fn test_toml_parses_partial_file() {
        let config: TomlConfig = toml::from_str(
            r#"
            data_root = "http://example.org/data"
            [logging]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.data_root.as_deref(), Some("http://example.org/data"));
        assert_eq!(config.port, None);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.file.is_none());
    }
}
