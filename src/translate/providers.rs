//! Remote translation services: Google Cloud Translation v2 and LibreTranslate.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{TranslateError, TranslationMethod, TranslationService};

const GOOGLE_TRANSLATE_URL: &str = "https://translation.googleapis.com/language/translate/v2";

fn build_http(timeout_secs: u64) -> Result<reqwest::Client, TranslateError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| TranslateError::HttpClientBuild(e.to_string()))
}

/// Send a JSON POST. Error text never carries the request URL.
async fn post_json(request: reqwest::RequestBuilder, body: &impl Serialize) -> Result<String, TranslateError> {
    let request_err = |e: reqwest::Error| TranslateError::Request(e.without_url().to_string());
    let response = request.json(body).send().await.map_err(request_err)?;
    let status = response.status().as_u16();
    let text = response.text().await.map_err(request_err)?;
    if !(200..300).contains(&status) {
        return Err(TranslateError::Status { status });
    }
    Ok(text)
}

// =============================================================================
// GOOGLE
// =============================================================================

const GOOGLE_API_KEY_HEADER: &str = "X-Goog-Api-Key";

/// Google v2 client. The key travels in a header, never in the URL.
pub struct GoogleTranslate {
    http: reqwest::Client,
    url: String,
    api_key: String,
}

impl GoogleTranslate {
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, TranslateError> {
        Self::with_url(api_key, GOOGLE_TRANSLATE_URL.to_string(), timeout_secs)
    }

    pub(crate) fn with_url(api_key: &str, url: String, timeout_secs: u64) -> Result<Self, TranslateError> {
        Ok(Self { http: build_http(timeout_secs)?, url, api_key: api_key.to_string() })
    }
}

#[derive(Serialize)]
struct GoogleRequest<'a> {
    q: &'a str,
    target: &'static str,
    format: &'static str,
}

#[derive(Deserialize)]
struct GoogleResponse {
    data: GoogleData,
}

#[derive(Deserialize)]
struct GoogleData {
    translations: Vec<GoogleTranslation>,
}

#[derive(Deserialize)]
struct GoogleTranslation {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

pub(crate) fn parse_google_response(text: &str) -> Result<String, TranslateError> {
    let parsed: GoogleResponse = serde_json::from_str(text).map_err(|e| TranslateError::Parse(e.to_string()))?;
    parsed
        .data
        .translations
        .into_iter()
        .next()
        .map(|t| t.translated_text)
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| TranslateError::Parse("no translations in response".into()))
}

#[async_trait::async_trait]
impl TranslationService for GoogleTranslate {
    fn method(&self) -> TranslationMethod {
        TranslationMethod::Google
    }

    async fn translate(&self, text: &str) -> Result<String, TranslateError> {
        let body = GoogleRequest { q: text, target: "en", format: "text" };
        let request = self.http.post(&self.url).header(GOOGLE_API_KEY_HEADER, &self.api_key);
        let raw = post_json(request, &body).await?;
        parse_google_response(&raw)
    }
}

// =============================================================================
// LIBRETRANSLATE
// =============================================================================

pub struct LibreTranslate {
    http: reqwest::Client,
    url: String,
}

impl LibreTranslate {
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(url: String, timeout_secs: u64) -> Result<Self, TranslateError> {
        Ok(Self { http: build_http(timeout_secs)?, url })
    }
}

#[derive(Serialize)]
struct LibreRequest<'a> {
    q: &'a str,
    source: &'static str,
    target: &'static str,
    format: &'static str,
}

#[derive(Deserialize)]
struct LibreResponse {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
}

pub(crate) fn parse_libre_response(text: &str) -> Result<String, TranslateError> {
    let parsed: LibreResponse = serde_json::from_str(text).map_err(|e| TranslateError::Parse(e.to_string()))?;
    parsed
        .translated_text
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| TranslateError::Parse("missing translatedText".into()))
}

#[async_trait::async_trait]
impl TranslationService for LibreTranslate {
    fn method(&self) -> TranslationMethod {
        TranslationMethod::LibreTranslate
    }

    async fn translate(&self, text: &str) -> Result<String, TranslateError> {
        let body = LibreRequest { q: text, source: "zh", target: "en", format: "text" };
        let raw = post_json(self.http.post(&self.url), &body).await?;
        parse_libre_response(&raw)
    }
}

#[cfg(test)]
#[path = "providers_test.rs"]
mod tests;
