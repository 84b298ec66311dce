//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.termchat/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn, LevelFilter};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TermchatConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub root_title: Option<String>,
    pub thread_list_limit: Option<usize>,
    pub poll_interval_ms: Option<u64>,
    pub log_file: Option<String>,
    pub log_level: Option<String>,
    pub session_file: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    pub base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8787";
pub const DEFAULT_ROOT_TITLE: &str = "Messenger";
pub const DEFAULT_THREAD_LIST_LIMIT: usize = 10;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOG_FILE: &str = "termchat.log";
const SESSION_FILE_NAME: &str = "session.json";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub server_url: String,
    pub request_timeout: Duration,
    pub root_title: String,
    pub thread_list_limit: usize,
    pub poll_interval: Duration,
    pub session_file: PathBuf,
    pub log_file: PathBuf,
    pub log_level: LevelFilter,
    pub fresh_login: bool,
}

/// Values given on the command line. `None` = flag not passed.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub server: Option<String>,
    pub session_file: Option<PathBuf>,
    pub fresh_login: bool,
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

/// `~/.termchat/`, where the config and the saved login live.
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".termchat"))
}

/// Returns the path to `~/.termchat/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load config from `~/.termchat/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `TermchatConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<TermchatConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(TermchatConfig::default());
        }
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<TermchatConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(TermchatConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: TermchatConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# termchat configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# root_title = "Messenger"
# thread_list_limit = 10             # threads shown by `reload`
# poll_interval_ms = 50              # how often the UI checks for input
# log_file = "termchat.log"
# log_level = "debug"                # "off", "error", "warn", "info", "debug", "trace"
# session_file = "session.json"      # Path relative to ~/.termchat/, or TERMCHAT_SESSION_FILE

# [server]
# base_url = "http://localhost:8787" # Or set TERMCHAT_SERVER
# request_timeout_secs = 30
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &TermchatConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with_env(config, cli, |key| std::env::var(key).ok())
}

/// Same as [`resolve`], with the environment lookup injected.
pub fn resolve_with_env(
    config: &TermchatConfig,
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Server: CLI → env → config → default
    let server_url = cli
        .server
        .clone()
        .or_else(|| env("TERMCHAT_SERVER"))
        .or_else(|| config.server.base_url.clone())
        .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

    // Session file: CLI → env → config (relative to ~/.termchat/) → default
    let session_file = cli
        .session_file
        .clone()
        .or_else(|| env("TERMCHAT_SESSION_FILE").map(PathBuf::from))
        .unwrap_or_else(|| {
            let name = config
                .general
                .session_file
                .as_deref()
                .unwrap_or(SESSION_FILE_NAME);
            match config_dir() {
                Some(dir) => dir.join(name),
                None => PathBuf::from(name),
            }
        });

    // Log level: env → config → debug
    let log_level = env("TERMCHAT_LOG_LEVEL")
        .or_else(|| config.general.log_level.clone())
        .map(|level| parse_level(&level))
        .unwrap_or(LevelFilter::Debug);

    ResolvedConfig {
        server_url,
        request_timeout: Duration::from_secs(
            config
                .server
                .request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        ),
        root_title: config
            .general
            .root_title
            .clone()
            .unwrap_or_else(|| DEFAULT_ROOT_TITLE.to_string()),
        thread_list_limit: config
            .general
            .thread_list_limit
            .unwrap_or(DEFAULT_THREAD_LIST_LIMIT),
        poll_interval: Duration::from_millis(
            config
                .general
                .poll_interval_ms
                .unwrap_or(DEFAULT_POLL_INTERVAL_MS),
        ),
        session_file,
        log_file: PathBuf::from(
            config
                .general
                .log_file
                .as_deref()
                .unwrap_or(DEFAULT_LOG_FILE),
        ),
        log_level,
        fresh_login: cli.fresh_login,
    }
}

fn parse_level(level: &str) -> LevelFilter {
    level.parse().unwrap_or_else(|_| {
        warn!("Unknown log level '{}', using debug", level);
        LevelFilter::Debug
    })
}
