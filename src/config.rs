//! # Configuration
//!
//! Settings are layered: defaults → config file → env vars → CLI flags.
//!
//! The config file lives at `~/.todo/config.toml`. Every field is optional, so
//! a missing file, a missing section and a missing key all fall back to the
//! built-in defaults.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::LevelFilter;
use serde::Deserialize;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct TodoConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeneralConfig {
    pub tasks_file: Option<PathBuf>,
    pub seed_defaults: Option<bool>,
    pub autosave: Option<bool>,
    pub confirm_delete: Option<bool>,
    pub clear_screen: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LogConfig {
    pub file: Option<PathBuf>,
    pub level: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_TASKS_FILE: &str = "tasks.json";
pub const DEFAULT_LOG_FILE: &str = "todo.log";
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;

pub const ENV_TASKS_FILE: &str = "TODO_FILE";
pub const ENV_LOG_LEVEL: &str = "TODO_LOG_LEVEL";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub tasks_file: PathBuf,
    pub seed_defaults: bool,
    pub autosave: bool,
    pub confirm_delete: bool,
    pub clear_screen: bool,
    pub log_file: Option<PathBuf>,
    pub log_level: LevelFilter,
}

/// Values that only the command line can provide.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub tasks_file: Option<PathBuf>,
    pub verbose: bool,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns `~/.todo`, the directory holding the config and the default log.
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".todo"))
}

/// Returns the path to `~/.todo/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load config from `~/.todo/config.toml`, or defaults when there is no
/// home directory or no file.
pub fn load_config() -> Result<TodoConfig, ConfigError> {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => Ok(TodoConfig::default()),
    }
}

/// Load config from an explicit path. A missing file is not an error; a
/// malformed one is.
pub fn load_config_from(path: &Path) -> Result<TodoConfig, ConfigError> {
    if !path.exists() {
        return Ok(TodoConfig::default());
    }
    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&contents).map_err(ConfigError::Parse)
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config: defaults → config file → env vars → CLI.
pub fn resolve(config: &TodoConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with_env(config, cli, |key| std::env::var(key).ok())
}

/// Same as [`resolve`] with an injectable environment lookup.
pub fn resolve_with_env<F>(config: &TodoConfig, cli: &CliOverrides, env: F) -> ResolvedConfig
where
    F: Fn(&str) -> Option<String>,
{
    // Tasks file: CLI → env → config → default
    let tasks_file = cli
        .tasks_file
        .clone()
        .or_else(|| env(ENV_TASKS_FILE).filter(|s| !s.trim().is_empty()).map(PathBuf::from))
        .or_else(|| config.general.tasks_file.clone())
        .map(|p| expand_home(&p))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TASKS_FILE));

    // Log level: --verbose → env → config → default
    let log_level = if cli.verbose {
        LevelFilter::Debug
    } else {
        env(ENV_LOG_LEVEL)
            .and_then(|s| s.trim().parse().ok())
            .or_else(|| config.log.level.as_deref().and_then(|s| s.trim().parse().ok()))
            .unwrap_or(DEFAULT_LOG_LEVEL)
    };

    let log_file = config
        .log
        .file
        .as_deref()
        .map(expand_home)
        .or_else(|| config_dir().map(|d| d.join(DEFAULT_LOG_FILE)));

    ResolvedConfig {
        tasks_file,
        seed_defaults: config.general.seed_defaults.unwrap_or(false),
        autosave: config.general.autosave.unwrap_or(false),
        confirm_delete: config.general.confirm_delete.unwrap_or(true),
        clear_screen: config.general.clear_screen.unwrap_or(true),
        log_file,
        log_level,
    }
}

/// Expand a leading `~/` to the home directory.
fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}
