use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveTime;
use tokio::fs;

use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// Config (root)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub alarm: AlarmConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_saphyr::Error),

    #[error("environment variable '{0}' is not set")]
    MissingEnvVar(String),

    #[error("unclosed variable reference '${{' (missing '}}')")]
    UnclosedVarReference,

    #[error("invalid default_time '{0}' (expected HH:MM or HH:MM:SS)")]
    InvalidDefaultTime(String),
}

impl Config {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::Io(e)),
        };
        let expanded = expand_env_vars(&contents)?;
        Ok(serde_saphyr::from_str(&expanded)?)
    }
}

/// Resolve a path relative to the config file directory.
///
/// Absolute paths are returned as-is.
pub fn resolve_path(config_path: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }

    let config_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    config_dir.join(path)
}

// ============================================================================
// Defaults
// ============================================================================

/// Default config file name.
pub const DEFAULT_CONFIG_FILE: &str = "alarm-scheduler.yaml";
/// Default directory holding the alarm record (relative to config file).
pub const DEFAULT_STORE_DIR: &str = ".alarm-scheduler";
/// Daily at 06:00.
pub const DEFAULT_CRON_EXPRESSION: &str = "0 6 * * *";

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_cron_expression() -> String {
    DEFAULT_CRON_EXPRESSION.to_string()
}

fn default_time() -> String {
    "06:00".to_string()
}

fn default_notify_timeout() -> u64 {
    10
}

fn default_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_DIR)
}

// ============================================================================
// Environment Variable Expansion
// ============================================================================

/// Expand environment variables in a string.
///
/// Supports the following syntax:
/// - `${VAR}` - Required variable, errors if not set
/// - `${VAR:-default}` - Optional variable with default value
/// - `${VAR:-}` - Optional variable, empty string if not set
/// - `$$` - Escaped `$`
///
/// Nested expansion (`${VAR:-${OTHER}}`) is not supported.
///
/// ```yaml
/// alarm:
///   webhook_url: ${ALARM_WEBHOOK_URL:-}
///   cron_expression: ${ALARM_CRON:-0 6 * * *}
/// ```
fn expand_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' {
            match chars.peek() {
                Some('$') => {
                    chars.next();
                    result.push('$');
                }
                Some('{') => {
                    chars.next();
                    let expanded = parse_var_reference(&mut chars)?;
                    result.push_str(&expanded);
                }
                _ => result.push('$'),
            }
        } else {
            result.push(c);
        }
    }

    Ok(result)
}

/// Parse a variable reference after seeing `${`.
fn parse_var_reference(
    chars: &mut std::iter::Peekable<std::str::Chars>,
) -> Result<String, ConfigError> {
    let mut var_name = String::new();
    let mut default_value: Option<String> = None;
    let mut found_closing_brace = false;

    while let Some(c) = chars.next() {
        match (c, default_value.as_mut()) {
            ('}', _) => {
                found_closing_brace = true;
                break;
            }
            (':', None) if chars.peek() == Some(&'-') => {
                chars.next();
                default_value = Some(String::new());
            }
            (c, Some(default)) => default.push(c),
            (c, None) => var_name.push(c),
        }
    }

    if !found_closing_brace {
        return Err(ConfigError::UnclosedVarReference);
    }

    match std::env::var(&var_name) {
        Ok(value) => Ok(value),
        Err(_) => default_value.ok_or(ConfigError::MissingEnvVar(var_name)),
    }
}

// ============================================================================
// ServerConfig
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

// ============================================================================
// AlarmConfig
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AlarmConfig {
    /// Recurrence rule. Five-field expressions get a leading seconds field.
    #[serde(default = "default_cron_expression")]
    pub cron_expression: String,
    /// Where fired alarms are posted. Empty or missing means log only.
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// Time of day for Set without a time, `HH:MM` or `HH:MM:SS`.
    #[serde(default = "default_time")]
    pub default_time: String,
    #[serde(default = "default_notify_timeout")]
    pub notify_timeout_seconds: u64,
    /// Directory holding the alarm record.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            cron_expression: default_cron_expression(),
            webhook_url: None,
            default_time: default_time(),
            notify_timeout_seconds: default_notify_timeout(),
            store_path: default_store_path(),
        }
    }
}

impl AlarmConfig {
    /// The webhook URL, if one is configured and non-blank.
    pub fn webhook_url(&self) -> Option<&str> {
        self.webhook_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn default_time(&self) -> Result<NaiveTime, ConfigError> {
        let raw = self.default_time.trim();
        NaiveTime::parse_from_str(raw, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
            .map_err(|_| ConfigError::InvalidDefaultTime(self.default_time.clone()))
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_secs(self.notify_timeout_seconds)
    }
}

// ============================================================================
// Tests
// ============================================================================
