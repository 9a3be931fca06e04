//! Translation endpoint.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ApiError, Lang, body};
use crate::services::gateway::InputProblem;
use crate::state::AppState;
use crate::translate::TranslationMethod;

#[derive(Debug, Default, Deserialize)]
pub struct TranslateBody {
    #[serde(default)]
    pub text: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    pub translated_text: String,
    pub is_translated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<TranslationMethod>,
}

/// `POST /api/translate`: never fails once the body is valid.
pub async fn translate(
    State(state): State<AppState>,
    Lang(locale): Lang,
    payload: Result<Json<TranslateBody>, JsonRejection>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let text = match body(payload, locale)?.text {
        Value::String(text) if !text.is_empty() => text,
        _ => return Err(ApiError::invalid(InputProblem::MissingText, locale)),
    };
    let translation = state.translator.translate(&text).await;
    let is_translated = translation.is_translated();
    Ok(Json(TranslateResponse {
        translated_text: translation.text,
        is_translated,
        original_text: is_translated.then_some(text),
        method: translation.method,
    }))
}

#[cfg(test)]
#[path = "translate_test.rs"]
mod tests;
