//! Configuration file loading with precedence handling.

use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Directory and file stem used under the platform config/state dirs.
pub const APP_DIR: &str = "culling-log-parser";

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "CULLING_LOG_CONFIG";

/// Environment variable overriding `ignore_bots`.
pub const IGNORE_BOTS_ENV_VAR: &str = "CULLING_IGNORE_BOTS";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file path contains invalid UTF-8 or cannot be resolved.
    #[error("Invalid config path: {0}")]
    InvalidPath(String),

    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/culling-log-parser/config.toml`.
///
/// ```toml
/// ignore_bots = true
/// log_file_path = "/tmp/culling.log"
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Drop damage against bot opponents.
    #[serde(default)]
    pub ignore_bots: Option<bool>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Drop damage against bot opponents.
    pub ignore_bots: bool,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            ignore_bots: false,
            log_file_path: default_log_path(),
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/culling-log-parser/culling-log-parser.log` on
/// Linux, or the platform state directory elsewhere.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    let file_name = format!("{}.log", APP_DIR);
    match dirs::state_dir() {
        Some(state_dir) => state_dir.join(APP_DIR).join(file_name),
        None => PathBuf::from(file_name),
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
/// Returns `Err` if file exists but cannot be read or parsed.
///
/// # Arguments
///
/// * `path` - Path to config file
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    // Missing file is not an error - use defaults
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/culling-log-parser/config.toml` on Linux, appropriate
/// path on other platforms. Returns `None` if no config directory exists.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `CULLING_LOG_CONFIG` environment variable
/// 3. Default path `~/.config/culling-log-parser/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed,
/// or if `CULLING_LOG_CONFIG` is not valid unicode.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    match std::env::var(CONFIG_ENV_VAR) {
        Ok(env_path) => return load_config_file(PathBuf::from(env_path)),
        Err(std::env::VarError::NotUnicode(raw)) => {
            return Err(ConfigError::InvalidPath(raw.to_string_lossy().into_owned()));
        }
        Err(std::env::VarError::NotPresent) => {}
    }

    match default_config_path() {
        Some(default_path) => load_config_file(default_path),
        None => Ok(None),
    }
}

/// Interpret a boolean environment value.
///
/// Accepts `1|true|yes|on` and `0|false|no|off` (any case); anything else is
/// `None`.
pub fn parse_env_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `CULLING_IGNORE_BOTS`: Override `ignore_bots`
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Some(ignore_bots) = std::env::var(IGNORE_BOTS_ENV_VAR)
        .ok()
        .as_deref()
        .and_then(parse_env_bool)
    {
        config.ignore_bots = ignore_bots;
    }

    config
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        ignore_bots: config.ignore_bots.unwrap_or(defaults.ignore_bots),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
///
/// # Arguments
///
/// * `config` - Base resolved config (already merged with defaults, file, and env vars)
/// * `ignore_bots_override` - `Some(true)` when `--ignore-bots` was passed
/// * `log_file_override` - Optional path from `--log-file`
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    ignore_bots_override: Option<bool>,
    log_file_override: Option<PathBuf>,
) -> ResolvedConfig {
    if let Some(ignore_bots) = ignore_bots_override {
        config.ignore_bots = ignore_bots;
    }

    if let Some(path) = log_file_override {
        config.log_file_path = path;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
