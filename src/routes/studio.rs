//! Studio endpoint: prompt building, quota and history in one call.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use super::generate::GenerateBody;
use super::{ApiError, Lang, body};
use crate::prompt::PromptOptions;
use crate::services::studio::{self, StudioRequest};
use crate::state::AppState;
use crate::translate::TranslationMethod;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudioBody {
    #[serde(flatten)]
    pub params: GenerateBody,
    #[serde(flatten)]
    pub options: PromptOptions,
    #[serde(default)]
    pub batch: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudioResponse {
    pub success: bool,
    pub image_urls: Vec<String>,
    pub image_url: String,
    pub final_prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation_method: Option<TranslationMethod>,
    pub usage_today: u32,
    pub daily_limit: u32,
}

/// `POST /api/studio/create`
pub async fn create(
    State(state): State<AppState>,
    Lang(locale): Lang,
    payload: Result<Json<StudioBody>, JsonRejection>,
) -> Result<Json<StudioResponse>, ApiError> {
    let StudioBody { params, options, batch } = body(payload, locale)?;
    let params = params
        .into_request(state.limits.max_studio_prompt_chars)
        .map_err(|e| ApiError::gateway(&e, locale))?;
    let req = StudioRequest { text: params.prompt.clone(), options, params, batch };

    let outcome = studio::create(&state, req).await.map_err(|e| ApiError::studio(&e, locale))?;
    Ok(Json(StudioResponse {
        success: true,
        image_url: outcome.image_urls.first().cloned().unwrap_or_default(),
        image_urls: outcome.image_urls,
        final_prompt: outcome.final_prompt,
        translation_method: outcome.translation,
        usage_today: outcome.usage_today,
        daily_limit: outcome.daily_limit,
    }))
}

#[cfg(test)]
#[path = "studio_test.rs"]
mod tests;
