//! User configuration
//!
//! Loaded from a TOML file. Every field has a default, so a missing file or
//! a partial file is fine. Command line flags override file values.

use crate::export::DEFAULT_SEPARATOR;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;

/// Upper bound on worker threads accepted from configuration
pub const MAX_WORKERS: usize = 1024;

const LEVELS: &[&str] = &["off", "error", "warn", "info", "debug", "trace"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pack: PackConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Defaults for `catpack pack`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackConfig {
    /// Text placed between consecutive files
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Accept several matches per root and search recursively
    #[serde(default)]
    pub merge_all: bool,

    /// Reader threads (0 = available parallelism)
    #[serde(default)]
    pub workers: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: off, error, warn, info, debug, trace
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            separator: default_separator(),
            merge_all: false,
            workers: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Reject values that would fail later in a less obvious way
    pub fn validate(&self) -> Result<()> {
        if self.pack.separator.is_empty() {
            anyhow::bail!("pack.separator must not be empty");
        }
        if self.pack.workers > MAX_WORKERS {
            anyhow::bail!(
                "pack.workers must be at most {} (got {})",
                MAX_WORKERS,
                self.pack.workers
            );
        }
        parse_level(&self.logging.level)?;
        Ok(())
    }

    pub fn level_filter(&self) -> Result<LevelFilter> {
        parse_level(&self.logging.level)
    }
}

/// Parse a level name, case-insensitively
pub fn parse_level(level: &str) -> Result<LevelFilter> {
    match level.to_ascii_lowercase().as_str() {
        "off" => Ok(LevelFilter::OFF),
        "error" => Ok(LevelFilter::ERROR),
        "warn" => Ok(LevelFilter::WARN),
        "info" => Ok(LevelFilter::INFO),
        "debug" => Ok(LevelFilter::DEBUG),
        "trace" => Ok(LevelFilter::TRACE),
        _ => anyhow::bail!(
            "Unknown log level '{}' (expected one of: {})",
            level,
            LEVELS.join(", ")
        ),
    }
}

/// Default config location: `<config dir>/catpack/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("catpack").join("config.toml"))
}

/// Load configuration
///
/// An explicit path must exist. Without one the default location is used
/// when present, and built-in defaults otherwise.
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(path) => {
            if !path.is_file() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            path.to_path_buf()
        }
        None => match config_file_path() {
            Some(path) if path.is_file() => path,
            _ => return Ok(Config::default()),
        },
    };

    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config = parse(&text)
        .with_context(|| format!("Invalid config file: {}", path.display()))?;
    Ok(config)
}

/// Parse and validate TOML text
pub fn parse(text: &str) -> Result<Config> {
    let config: Config = toml::from_str(text).context("Failed to parse TOML")?;
    config.validate()?;
    Ok(config)
}

/// Commented example config
pub fn example_config() -> String {
    r#"# catpack configuration

[pack]
# Text placed between consecutive files. Escapes are not interpreted here;
# use a TOML escape such as "\n\n" for blank lines.
separator = "\n\n"

# Accept several matches per directory and search directories recursively
merge_all = false

# Reader threads (0 = number of CPUs)
workers = 0

[logging]
# off, error, warn, info, debug, trace
level = "warn"
"#
    .to_string()
}
