//! Reference-image edit endpoint.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ApiError, Lang, body};
use crate::services::gateway::{AspectRatio, DEFAULT_SAFETY_TOLERANCE, EditRequest, InputProblem, OutputFormat};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditBody {
    #[serde(default)]
    pub prompt: Value,
    #[serde(default)]
    pub input_image: Value,
    pub aspect_ratio: Option<String>,
    pub safety_tolerance: Option<i64>,
    pub output_format: Option<String>,
}

impl EditBody {
    /// # Errors
    ///
    /// The [`InputProblem`] for a missing instruction or input image.
    pub fn into_request(self) -> Result<EditRequest, InputProblem> {
        let prompt = match self.prompt {
            Value::String(p) if !p.trim().is_empty() => p,
            _ => return Err(InputProblem::MissingInstruction),
        };
        let input_image = match self.input_image {
            Value::String(image) if !image.is_empty() => image,
            _ => return Err(InputProblem::MissingReferenceImage),
        };
        let aspect_ratio = match self.aspect_ratio.as_deref().map(str::trim) {
            None | Some("match_input_image") => AspectRatio::MatchSource,
            Some(raw) => AspectRatio::parse(raw),
        };
        Ok(EditRequest {
            prompt,
            input_image,
            aspect_ratio,
            safety_tolerance: self.safety_tolerance.unwrap_or(DEFAULT_SAFETY_TOLERANCE),
            output_format: self.output_format.as_deref().and_then(OutputFormat::parse).unwrap_or(OutputFormat::Png),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditResponse {
    pub success: bool,
    pub image_url: String,
    pub original_prompt: String,
    pub original_image: String,
}

/// `POST /api/edit-image`
pub async fn edit_image(
    State(state): State<AppState>,
    Lang(locale): Lang,
    payload: Result<Json<EditBody>, JsonRejection>,
) -> Result<Json<EditResponse>, ApiError> {
    let req = body(payload, locale)?
        .into_request()
        .map_err(|p| ApiError::invalid(p, locale))?;
    let image_url = state.gateway.edit(&req).await.map_err(|e| ApiError::gateway(&e, locale))?;
    Ok(Json(EditResponse {
        success: true,
        image_url,
        original_prompt: req.prompt,
        original_image: req.input_image,
    }))
}

#[cfg(test)]
#[path = "edit_test.rs"]
mod tests;
