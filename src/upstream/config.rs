//! Inference provider configuration parsed from environment variables.

use crate::config::{ConfigError, env_bool, env_non_empty, env_parse};

pub const DEFAULT_REPLICATE_BASE_URL: &str = "https://api.replicate.com/v1";
pub const DEFAULT_TEXT_MODEL: &str = "black-forest-labs/flux-dev";
pub const DEFAULT_REFERENCE_MODEL: &str = "black-forest-labs/flux-kontext-dev";
pub const DEFAULT_UPSTREAM_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_UPSTREAM_POLL_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpstreamTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamConfig {
    /// Provider credential. `None` leaves the gateway unconfigured.
    pub api_token: Option<String>,
    pub base_url: String,
    /// Text-only model variant.
    pub text_model: String,
    /// Reference-conditioned model variant.
    pub reference_model: String,
    /// Fetch output files and hand them over as byte streams.
    pub file_output: bool,
    pub timeouts: UpstreamTimeouts,
    pub poll_interval_ms: u64,
}

impl UpstreamConfig {
    /// Build typed provider config from environment variables.
    ///
    /// Optional:
    /// - `REPLICATE_API_TOKEN`: provider credential
    /// - `REPLICATE_BASE_URL`: default Replicate API base URL
    /// - `TEXT_MODEL` / `REFERENCE_MODEL`: `owner/name` or `owner/name:version`
    /// - `REPLICATE_FILE_OUTPUT`: default false
    /// - `UPSTREAM_REQUEST_TIMEOUT_SECS`: default 120
    /// - `UPSTREAM_CONNECT_TIMEOUT_SECS`: default 10
    /// - `UPSTREAM_POLL_INTERVAL_MS`: default 1000
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a model id is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let text_model = parse_model_id("TEXT_MODEL", std::env::var("TEXT_MODEL").ok(), DEFAULT_TEXT_MODEL)?;
        let reference_model =
            parse_model_id("REFERENCE_MODEL", std::env::var("REFERENCE_MODEL").ok(), DEFAULT_REFERENCE_MODEL)?;
        let base_url = std::env::var("REPLICATE_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_REPLICATE_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            api_token: env_non_empty("REPLICATE_API_TOKEN"),
            base_url,
            text_model,
            reference_model,
            file_output: env_bool("REPLICATE_FILE_OUTPUT").unwrap_or(false),
            timeouts: UpstreamTimeouts {
                request_secs: env_parse("UPSTREAM_REQUEST_TIMEOUT_SECS", DEFAULT_UPSTREAM_REQUEST_TIMEOUT_SECS),
                connect_secs: env_parse("UPSTREAM_CONNECT_TIMEOUT_SECS", DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS),
            },
            poll_interval_ms: env_parse("UPSTREAM_POLL_INTERVAL_MS", DEFAULT_UPSTREAM_POLL_INTERVAL_MS),
        })
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            base_url: DEFAULT_REPLICATE_BASE_URL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            reference_model: DEFAULT_REFERENCE_MODEL.to_string(),
            file_output: false,
            timeouts: UpstreamTimeouts {
                request_secs: DEFAULT_UPSTREAM_REQUEST_TIMEOUT_SECS,
                connect_secs: DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS,
            },
            poll_interval_ms: DEFAULT_UPSTREAM_POLL_INTERVAL_MS,
        }
    }
}

fn parse_model_id(key: &'static str, raw: Option<String>, default: &str) -> Result<String, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default.to_string());
    };
    let trimmed = raw.trim();
    let name = trimmed.split(':').next().unwrap_or("");
    let mut parts = name.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(owner), Some(model), None) if !owner.is_empty() && !model.is_empty() => Ok(trimmed.to_string()),
        _ => Err(ConfigError::InvalidValue { key, value: raw }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
