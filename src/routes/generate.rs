//! Generation endpoint.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ApiError, Lang, body};
use crate::services::gateway::{
    AspectRatio, DEFAULT_GUIDANCE, DEFAULT_OUTPUT_QUALITY, DEFAULT_STEPS, GatewayError, GenerationRequest, InputProblem,
    MAX_OUTPUT_COUNT, OutputFormat, validate_prompt,
};
use crate::state::AppState;

/// Wire body. `prompt` and `inputImage` stay loose so a wrong JSON type is
/// reported as a specific input problem rather than a parse failure.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBody {
    #[serde(default)]
    pub prompt: Value,
    #[serde(default)]
    pub input_image: Value,
    pub aspect_ratio: Option<String>,
    pub guidance: Option<f64>,
    pub num_inference_steps: Option<u32>,
    pub output_quality: Option<i64>,
    pub output_format: Option<String>,
    pub go_fast: Option<bool>,
    pub seed: Option<i64>,
    pub num_outputs: Option<i64>,
}

impl GenerateBody {
    /// Check field types and build a request. Prompt problems are reported
    /// before reference-image problems.
    ///
    /// # Errors
    ///
    /// [`GatewayError::InvalidInput`] for a missing, blank, overlong or
    /// non-string prompt, or a non-string reference image.
    pub fn into_request(self, max_prompt_chars: usize) -> Result<GenerationRequest, GatewayError> {
        let Value::String(prompt) = self.prompt else {
            return Err(GatewayError::InvalidInput(InputProblem::MissingPrompt));
        };
        validate_prompt(&prompt, max_prompt_chars)?;
        let reference_image = match self.input_image {
            Value::Null => None,
            Value::String(image) => Some(image),
            _ => return Err(GatewayError::InvalidInput(InputProblem::InvalidReferenceImage)),
        };

        let output_quality = self
            .output_quality
            .and_then(|q| u8::try_from(q.clamp(1, 100)).ok())
            .unwrap_or(DEFAULT_OUTPUT_QUALITY);
        let output_count = self
            .num_outputs
            .and_then(|n| u8::try_from(n.clamp(1, i64::from(MAX_OUTPUT_COUNT))).ok())
            .unwrap_or(1);

        Ok(GenerationRequest {
            reference_image,
            aspect_ratio: self.aspect_ratio.as_deref().map_or_else(AspectRatio::default, AspectRatio::parse),
            guidance: self.guidance.unwrap_or(DEFAULT_GUIDANCE),
            steps: self.num_inference_steps.unwrap_or(DEFAULT_STEPS),
            output_quality,
            output_format: self.output_format.as_deref().and_then(OutputFormat::parse).unwrap_or_default(),
            go_fast: self.go_fast.unwrap_or(true),
            seed: self.seed,
            output_count,
            ..GenerationRequest::new(prompt)
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub success: bool,
    pub image_urls: Vec<String>,
    /// First image, kept for older clients.
    pub image_url: String,
}

impl GenerateResponse {
    #[must_use]
    pub fn new(image_urls: Vec<String>) -> Self {
        let image_url = image_urls.first().cloned().unwrap_or_default();
        Self { success: true, image_urls, image_url }
    }
}

/// `GET /api/generate`: readiness probe.
pub async fn status(State(state): State<AppState>) -> Json<Value> {
    Json(serde_json::json!({
        "message": "FLUX image generation API is running",
        "configured": state.gateway.is_configured(),
    }))
}

/// `POST /api/generate`: one generation, no persistence.
pub async fn generate(
    State(state): State<AppState>,
    Lang(locale): Lang,
    payload: Result<Json<GenerateBody>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let req = body(payload, locale)?
        .into_request(state.gateway.settings().max_prompt_chars)
        .map_err(|e| ApiError::gateway(&e, locale))?;
    let generation = state.gateway.generate(&req).await.map_err(|e| ApiError::gateway(&e, locale))?;
    Ok(Json(GenerateResponse::new(generation.image_urls)))
}

#[cfg(test)]
#[path = "generate_test.rs"]
mod tests;
