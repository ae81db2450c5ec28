//! Bootstrap configuration loading
//!
//! Configuration file resolution priority:
//! 1. Explicit path (command-line argument or `MEDID_CONFIG`)
//! 2. Per-user config file (`<config_dir>/medid/medid-ai.toml`)
//! 3. Compiled defaults
//!
//! A missing file is never fatal: defaults apply and the caller logs a warning.
//! A file that exists but cannot be parsed is a configuration error.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8000";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Environment variables consulted for the Gemini API key, highest priority first
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "MEDID_GEMINI_API_KEY"];

/// Bootstrap configuration loaded from TOML
///
/// Every field has a default, so an empty file is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Address the HTTP service binds to
    pub bind_address: String,

    /// Gemini API key (environment variables take priority)
    pub gemini_api_key: Option<String>,

    /// Gemini model used for identification
    pub gemini_model: String,

    /// Gemini REST base URL
    pub gemini_base_url: String,

    /// Total timeout for one identification call
    pub request_timeout_secs: u64,

    /// Maximum accepted request body size for uploads
    pub max_upload_bytes: usize,

    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Per-user configuration file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("medid").join("medid-ai.toml"))
}

/// Pick the configuration file to load
///
/// An explicit path always wins, even if it does not exist (the loader then
/// warns and falls back to defaults).
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    default_config_path().filter(|path| path.exists())
}

/// Where the bootstrap configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// No file named and no per-user file present
    Defaults,
    /// Loaded from this file
    File(PathBuf),
    /// Named file does not exist; defaults apply
    Missing(PathBuf),
}

impl ConfigSource {
    /// Report the source; call once tracing is initialized
    pub fn log(&self) {
        match self {
            ConfigSource::Defaults => info!("No configuration file found, using defaults"),
            ConfigSource::File(path) => info!("Configuration loaded from {}", path.display()),
            ConfigSource::Missing(path) => warn!(
                "Configuration file {} not found, using defaults",
                path.display()
            ),
        }
    }
}

/// Bootstrap configuration plus its source
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
    pub config: TomlConfig,
    pub source: ConfigSource,
}

/// Load bootstrap configuration
///
/// `None` or a missing file yields [`TomlConfig::default`]. Nothing is logged
/// here since the log level itself comes from this file; the caller reports
/// [`LoadedConfig::source`] after tracing is up.
pub fn load_toml_config(path: Option<&Path>) -> Result<LoadedConfig> {
    let Some(path) = path else {
        return Ok(LoadedConfig {
            config: TomlConfig::default(),
            source: ConfigSource::Defaults,
        });
    };

    if !path.exists() {
        return Ok(LoadedConfig {
            config: TomlConfig::default(),
            source: ConfigSource::Missing(path.to_path_buf()),
        });
    }

    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    Ok(LoadedConfig {
        config,
        source: ConfigSource::File(path.to_path_buf()),
    })
}

/// Resolve the Gemini API key
///
/// **Priority:** `GEMINI_API_KEY` → `MEDID_GEMINI_API_KEY` → TOML
pub fn resolve_gemini_api_key(config: &TomlConfig) -> Result<String> {
    let mut candidates: Vec<(&str, String)> = API_KEY_ENV_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok().map(|key| (*var, key)))
        .collect();
    if let Some(key) = &config.gemini_api_key {
        candidates.push(("TOML", key.clone()));
    }
    candidates.retain(|(_, key)| is_valid_key(key));

    if candidates.len() > 1 {
        let sources: Vec<&str> = candidates.iter().map(|(source, _)| *source).collect();
        warn!(
            "Gemini API key found in multiple sources: {}. Using {} (highest priority).",
            sources.join(", "),
            sources[0]
        );
    }

    match candidates.into_iter().next() {
        Some((source, key)) => {
            info!("Gemini API key loaded from {}", source);
            Ok(key.trim().to_string())
        }
        None => Err(Error::Config(
            "Gemini API key not configured. Please configure using one of:\n\
             1. Environment: GEMINI_API_KEY=your-key-here\n\
             2. TOML config: ~/.config/medid/medid-ai.toml (gemini_api_key = \"your-key\")\n\
             \n\
             Obtain an API key at: https://aistudio.google.com/app/apikey"
                .to_string(),
        )),
    }
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
