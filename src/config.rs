//! Process configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! One typed struct per concern, assembled into [`AppConfig`]. Numeric knobs
//! fall back to their defaults when unset or unparseable; values that would
//! leave the service unusable (bad port, malformed model id) are errors.

use std::path::PathBuf;

use crate::upstream::config::UpstreamConfig;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_LIBRETRANSLATE_URL: &str = "https://libretranslate.de/translate";
pub const DEFAULT_TRANSLATE_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_PROMPT_CHARS: usize = 1000;
pub const DEFAULT_MAX_STUDIO_PROMPT_CHARS: usize = 2000;
pub const DEFAULT_HISTORY_LIMIT: usize = 50;
pub const DEFAULT_DAILY_LIMIT: u32 = 50;
pub const DEFAULT_USAGE_RETENTION_DAYS: i64 = 7;
pub const DEFAULT_STORE_PATH: &str = "data/state.json";
pub const DEFAULT_STORE_CAPACITY_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateConfig {
    /// Premium provider key. `None` skips straight to the free provider.
    pub google_api_key: Option<String>,
    /// Free provider endpoint. `None` disables it.
    pub libretranslate_url: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitsConfig {
    pub max_prompt_chars: usize,
    pub max_studio_prompt_chars: usize,
    pub daily_limit: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub capacity_bytes: usize,
    pub history_limit: usize,
    pub usage_retention_days: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub upstream: UpstreamConfig,
    pub translate: TranslateConfig,
    pub limits: LimitsConfig,
    pub store: StoreConfig,
}

impl AppConfig {
    /// Build the full service configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an unparseable `PORT` or a
    /// model id that is not of the form `owner/name`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidValue { key: "PORT", value: raw })?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self {
            port,
            upstream: UpstreamConfig::from_env()?,
            translate: TranslateConfig::from_env(),
            limits: LimitsConfig::from_env(),
            store: StoreConfig::from_env(),
        })
    }
}

impl TranslateConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let libretranslate_url = match std::env::var("LIBRETRANSLATE_URL") {
            Ok(raw) if raw.trim().is_empty() => None,
            Ok(raw) => Some(raw.trim().to_string()),
            Err(_) => Some(DEFAULT_LIBRETRANSLATE_URL.to_string()),
        };
        Self {
            google_api_key: env_non_empty("GOOGLE_TRANSLATE_API_KEY"),
            libretranslate_url,
            timeout_secs: env_parse("TRANSLATE_TIMEOUT_SECS", DEFAULT_TRANSLATE_TIMEOUT_SECS),
        }
    }
}

impl LimitsConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            max_prompt_chars: env_parse("MAX_PROMPT_CHARS", DEFAULT_MAX_PROMPT_CHARS),
            max_studio_prompt_chars: env_parse("MAX_STUDIO_PROMPT_CHARS", DEFAULT_MAX_STUDIO_PROMPT_CHARS),
            daily_limit: env_parse("DAILY_LIMIT", DEFAULT_DAILY_LIMIT),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_prompt_chars: DEFAULT_MAX_PROMPT_CHARS,
            max_studio_prompt_chars: DEFAULT_MAX_STUDIO_PROMPT_CHARS,
            daily_limit: DEFAULT_DAILY_LIMIT,
        }
    }
}

impl StoreConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            path: store_path(std::env::var("STORE_PATH").ok()),
            capacity_bytes: env_parse("STORE_CAPACITY_BYTES", DEFAULT_STORE_CAPACITY_BYTES),
            history_limit: env_parse("HISTORY_LIMIT", DEFAULT_HISTORY_LIMIT).max(1),
            usage_retention_days: env_parse("USAGE_RETENTION_DAYS", DEFAULT_USAGE_RETENTION_DAYS),
        }
    }
}

/// Unset means the default file; set but blank means memory only.
pub(crate) fn store_path(raw: Option<String>) -> PathBuf {
    raw.map_or_else(|| PathBuf::from(DEFAULT_STORE_PATH), |p| PathBuf::from(p.trim()))
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

pub(crate) fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
