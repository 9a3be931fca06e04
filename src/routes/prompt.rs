//! Prompt helper endpoints: preset catalogue, random prompt, enhancement.

use axum::extract::rejection::JsonRejection;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use super::{ApiError, Lang, body};
use crate::prompt::{self, EnhanceMode, Preset};
use crate::services::gateway::InputProblem;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetCatalogue {
    pub styles: &'static [Preset],
    pub color_schemes: &'static [Preset],
    pub lighting: &'static [Preset],
    pub compositions: &'static [Preset],
}

#[derive(Debug, Serialize)]
pub struct PromptBody {
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct EnhanceBody {
    pub prompt: String,
    #[serde(default)]
    pub mode: EnhanceMode,
}

/// `GET /api/prompt/presets`
pub async fn presets() -> Json<PresetCatalogue> {
    Json(PresetCatalogue {
        styles: prompt::STYLES,
        color_schemes: prompt::COLOR_SCHEMES,
        lighting: prompt::LIGHTING,
        compositions: prompt::COMPOSITIONS,
    })
}

/// `GET /api/prompt/random`
pub async fn random() -> Json<PromptBody> {
    Json(PromptBody { prompt: prompt::random_prompt().to_string() })
}

/// `POST /api/prompt/enhance`: `mode` is `keywords` (default), `smart`,
/// `art-history` or `photo`.
pub async fn enhance(
    Lang(locale): Lang,
    payload: Result<Json<EnhanceBody>, JsonRejection>,
) -> Result<Json<PromptBody>, ApiError> {
    let EnhanceBody { prompt: text, mode } = body(payload, locale)?;
    if text.trim().is_empty() {
        return Err(ApiError::invalid(InputProblem::MissingPrompt, locale));
    }
    Ok(Json(PromptBody { prompt: prompt::enhance_with(&text, mode) }))
}
