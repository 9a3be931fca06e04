//! Replicate predictions API client.
//!
//! Thin HTTP wrapper for `/v1/models/{owner}/{name}/predictions` (or
//! `/v1/predictions` for pinned versions). Creates the prediction with
//! `Prefer: wait`, then polls until a terminal status. Pure parsing in
//! `parse_prediction` for testability.

use std::time::Duration;

use futures::{StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::config::UpstreamConfig;
use super::types::{ByteStream, ImageModel, RawOutput, UpstreamError};

// =============================================================================
// CLIENT
// =============================================================================

pub struct ReplicateClient {
    http: reqwest::Client,
    api_token: String,
    base_url: String,
    file_output: bool,
    poll_interval: Duration,
}

impl ReplicateClient {
    /// Build a client for the given credential.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::HttpClientBuild`] if the HTTP client fails to build.
    pub fn new(api_token: String, config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| UpstreamError::HttpClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            api_token,
            base_url: config.base_url.clone(),
            file_output: config.file_output,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        })
    }

    async fn create_prediction(&self, model: &str, input: &Value) -> Result<Prediction, UpstreamError> {
        let (url, body) = match model.split_once(':') {
            Some((_, version)) => {
                (format!("{}/predictions", self.base_url), CreateRequest { version: Some(version), input })
            }
            None => (format!("{}/models/{model}/predictions", self.base_url), CreateRequest { version: None, input }),
        };
        let request = self
            .http
            .post(url)
            .bearer_auth(&self.api_token)
            .header("Prefer", "wait")
            .json(&body);
        let text = self.send(request).await?;
        parse_prediction(&text)
    }

    async fn get_prediction(&self, url: &str) -> Result<Prediction, UpstreamError> {
        let request = self.http.get(url).bearer_auth(&self.api_token);
        let text = self.send(request).await?;
        parse_prediction(&text)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, UpstreamError> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        if !(200..300).contains(&status) {
            return Err(UpstreamError::Status { status, body: text });
        }
        Ok(text)
    }

    async fn wait_for_output(&self, mut prediction: Prediction) -> Result<Value, UpstreamError> {
        loop {
            match prediction.status {
                PredictionStatus::Succeeded => return Ok(prediction.output.unwrap_or(Value::Null)),
                PredictionStatus::Failed => {
                    return Err(UpstreamError::Prediction(error_text(prediction.error.as_ref())));
                }
                PredictionStatus::Canceled => return Err(UpstreamError::Canceled),
                PredictionStatus::Starting | PredictionStatus::Processing | PredictionStatus::Other => {
                    debug!(id = %prediction.id, status = ?prediction.status, "prediction pending");
                    tokio::time::sleep(self.poll_interval).await;
                    let url = poll_url(&self.base_url, &prediction);
                    prediction = self.get_prediction(&url).await?;
                }
            }
        }
    }

    /// Re-present hosted output files as byte streams.
    async fn open_files(&self, output: Value) -> Result<RawOutput, UpstreamError> {
        match output {
            Value::String(url) if is_remote(&url) => Ok(RawOutput::Stream(self.open_stream(&url).await?)),
            Value::Array(items) if !items.is_empty() && items.iter().all(|v| v.as_str().is_some_and(is_remote)) => {
                let mut streams = Vec::with_capacity(items.len());
                for url in items.iter().filter_map(Value::as_str) {
                    streams.push(self.open_stream(url).await?);
                }
                Ok(RawOutput::StreamList(streams))
            }
            other => Ok(RawOutput::Json(other)),
        }
    }

    async fn open_stream(&self, url: &str) -> Result<ByteStream, UpstreamError> {
        let response = self.http.get(url).send().await?;
        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status { status, body });
        }
        Ok(response
            .bytes_stream()
            .map_ok(|chunk| chunk.to_vec())
            .map_err(|e| UpstreamError::Stream(e.to_string()))
            .boxed())
    }
}

#[async_trait::async_trait]
impl ImageModel for ReplicateClient {
    async fn run(&self, model: &str, input: &Value) -> Result<RawOutput, UpstreamError> {
        let prediction = self.create_prediction(model, input).await?;
        info!(id = %prediction.id, %model, status = ?prediction.status, "prediction created");
        let output = self.wait_for_output(prediction).await?;
        if self.file_output { self.open_files(output).await } else { Ok(RawOutput::Json(output)) }
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct CreateRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'a str>,
    input: &'a Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum PredictionStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PredictionUrls {
    pub(crate) get: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Prediction {
    pub(crate) id: String,
    pub(crate) status: PredictionStatus,
    #[serde(default)]
    pub(crate) output: Option<Value>,
    #[serde(default)]
    pub(crate) error: Option<Value>,
    #[serde(default)]
    pub(crate) urls: Option<PredictionUrls>,
}

pub(crate) fn parse_prediction(text: &str) -> Result<Prediction, UpstreamError> {
    serde_json::from_str(text).map_err(|e| UpstreamError::Parse(e.to_string()))
}

fn poll_url(base_url: &str, prediction: &Prediction) -> String {
    prediction
        .urls
        .as_ref()
        .and_then(|u| u.get.clone())
        .unwrap_or_else(|| format!("{base_url}/predictions/{}", prediction.id))
}

fn error_text(error: Option<&Value>) -> String {
    match error {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Null) | None => "prediction failed".to_string(),
        Some(other) => other.to_string(),
    }
}

fn is_remote(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

#[cfg(test)]
#[path = "replicate_test.rs"]
mod tests;
