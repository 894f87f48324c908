//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/recollect/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/recollect/` (~/.config/recollect/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Source path overrides
    #[serde(default)]
    pub sources: SourceOverrides,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Override paths for session sources
#[derive(Debug, Deserialize, Default)]
pub struct SourceOverrides {
    /// Override path for the Claude Code projects directory
    pub claude_root: Option<PathBuf>,
    /// Override path for the Goose session store
    pub goose_db: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::debug!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/recollect/config.toml` (~/.config/recollect/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("recollect").join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.sources.claude_root.is_none());
        assert!(config.sources.goose_db.is_none());
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[sources]
claude_root = "/tmp/claude-projects"
goose_db = "/tmp/goose/sessions.db"

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(
            config.sources.claude_root.as_deref(),
            Some(std::path::Path::new("/tmp/claude-projects"))
        );
        assert_eq!(
            config.sources.goose_db.as_deref(),
            Some(std::path::Path::new("/tmp/goose/sessions.db"))
        );
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let toml = r#"
[logging]
level = "trace"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.sources.claude_root.is_none());
        assert_eq!(config.logging.level, "trace");
    }

    #[test]
    fn test_config_path_location() {
        let path = Config::config_path();
        assert!(path.ends_with("recollect/config.toml"));
    }
}
