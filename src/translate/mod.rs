//! Translator: Chinese prompt text → English before generation.
//!
//! DESIGN
//! ======
//! Text without CJK ideographs passes through untouched with no network
//! traffic. Otherwise the configured remote services are tried in order
//! (premium first, then free), one request each, no retries. When all of
//! them fail the static dictionary is applied. Translation never fails from
//! the caller's point of view.

pub mod dictionary;
pub mod providers;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::TranslateConfig;

#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("translation request failed: {0}")]
    Request(String),
    #[error("translation service returned status {status}")]
    Status { status: u16 },
    #[error("translation response parse failed: {0}")]
    Parse(String),
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationMethod {
    Google,
    #[serde(rename = "libretranslate")]
    LibreTranslate,
    Dictionary,
}

/// Outcome of [`Translator::translate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub text: String,
    /// `None` when the input had nothing to translate.
    pub method: Option<TranslationMethod>,
}

impl Translation {
    #[must_use]
    pub fn is_translated(&self) -> bool {
        self.method.is_some()
    }
}

/// A remote translation backend. Enables mocking in tests.
#[async_trait::async_trait]
pub trait TranslationService: Send + Sync {
    fn method(&self) -> TranslationMethod;

    /// Translate Chinese `text` to English.
    ///
    /// # Errors
    ///
    /// Returns a [`TranslateError`] on any transport, status or payload problem.
    async fn translate(&self, text: &str) -> Result<String, TranslateError>;
}

/// True when `text` contains a CJK unified ideograph (U+4E00..=U+9FFF).
#[must_use]
pub fn contains_cjk(text: &str) -> bool {
    text.chars().any(|c| ('\u{4e00}'..='\u{9fff}').contains(&c))
}

pub struct Translator {
    services: Vec<Box<dyn TranslationService>>,
}

impl Translator {
    /// Build the service chain from config. A service whose HTTP client cannot
    /// be built is left out of the chain.
    #[must_use]
    pub fn from_config(config: &TranslateConfig) -> Self {
        let mut services: Vec<Box<dyn TranslationService>> = Vec::new();
        if let Some(key) = &config.google_api_key {
            match providers::GoogleTranslate::new(key, config.timeout_secs) {
                Ok(google) => services.push(Box::new(google)),
                Err(e) => warn!(error = %e, "google translate disabled"),
            }
        }
        if let Some(url) = &config.libretranslate_url {
            match providers::LibreTranslate::new(url.clone(), config.timeout_secs) {
                Ok(libre) => services.push(Box::new(libre)),
                Err(e) => warn!(error = %e, "libretranslate disabled"),
            }
        }
        info!(services = services.len(), "translator configured");
        Self::with_services(services)
    }

    #[must_use]
    pub fn with_services(services: Vec<Box<dyn TranslationService>>) -> Self {
        Self { services }
    }

    /// Translate `text` if it contains CJK, falling back down the chain.
    pub async fn translate(&self, text: &str) -> Translation {
        if !contains_cjk(text) {
            return Translation { text: text.to_string(), method: None };
        }
        for service in &self.services {
            match service.translate(text).await {
                Ok(translated) => {
                    return Translation { text: translated, method: Some(service.method()) };
                }
                Err(e) => warn!(method = ?service.method(), error = %e, "translation failed; falling back"),
            }
        }
        Translation { text: dictionary::substitute(text), method: Some(TranslationMethod::Dictionary) }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
