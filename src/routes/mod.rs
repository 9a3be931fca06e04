//! Router assembly and the shared failure envelope.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every endpoint lives under `/api` except the health probe. Failures from
//! any handler leave as `{success:false, error, code, retryable, upsell?}`
//! with the status the error maps to; malformed JSON bodies get the same
//! envelope with 400 instead of axum's plain-text rejection.

pub mod edit;
pub mod generate;
pub mod history;
pub mod prompt;
pub mod studio;
pub mod translate;

use std::convert::Infallible;

use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, FromRequestParts};
use axum::http::header::ACCEPT_LANGUAGE;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::{ErrorCode, Locale};
use crate::services::gateway::{GatewayError, InputProblem};
use crate::services::studio::StudioError;
use crate::state::AppState;
use crate::store::StoreError;

/// Reference images arrive inline as base64 data URIs.
const BODY_LIMIT_BYTES: usize = 20 * 1024 * 1024;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/generate", get(generate::status).post(generate::generate))
        .route("/api/edit-image", post(edit::edit_image))
        .route("/api/translate", post(translate::translate))
        .route("/api/studio/create", post(studio::create))
        .route("/api/prompt/presets", get(prompt::presets))
        .route("/api/prompt/random", get(prompt::random))
        .route("/api/prompt/enhance", post(prompt::enhance))
        .route("/api/history", get(history::list).delete(history::clear))
        .route("/api/usage", get(history::usage))
        .route("/healthz", get(healthz))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

// =============================================================================
// LOCALE EXTRACTOR
// =============================================================================

/// Response language picked from `Accept-Language`.
#[derive(Debug, Clone, Copy)]
pub struct Lang(pub Locale);

impl<S> FromRequestParts<S> for Lang
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts.headers.get(ACCEPT_LANGUAGE).and_then(|v| v.to_str().ok());
        Ok(Self(Locale::from_accept_language(raw)))
    }
}

// =============================================================================
// FAILURE ENVELOPE
// =============================================================================

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    pub code: &'static str,
    pub retryable: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub upsell: bool,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    fn new(status: u16, err: &impl ErrorCode, error: String, upsell: bool) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body: ErrorBody {
                success: false,
                error,
                code: err.error_code(),
                retryable: err.retryable(),
                upsell,
            },
        }
    }

    #[must_use]
    pub fn gateway(err: &GatewayError, locale: Locale) -> Self {
        Self::new(err.status(), err, err.user_message(locale), err.upsell())
    }

    #[must_use]
    pub fn studio(err: &StudioError, locale: Locale) -> Self {
        Self::new(err.status(), err, err.user_message(locale), err.upsell())
    }

    #[must_use]
    pub fn store(err: &StoreError, locale: Locale) -> Self {
        let message = match locale {
            Locale::Zh => "存储服务暂不可用，请稍后重试".to_string(),
            Locale::En => "State storage is unavailable, please retry.".to_string(),
        };
        Self::new(503, err, message, false)
    }

    #[must_use]
    pub fn invalid(problem: InputProblem, locale: Locale) -> Self {
        Self::gateway(&GatewayError::InvalidInput(problem), locale)
    }

    #[must_use]
    pub fn malformed(rejection: &JsonRejection, locale: Locale) -> Self {
        Self::invalid(InputProblem::MalformedBody(rejection.body_text()), locale)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Unwrap a JSON body or turn the rejection into the 400 envelope.
pub(crate) fn body<T>(payload: Result<Json<T>, JsonRejection>, locale: Locale) -> Result<T, ApiError> {
    payload.map(|Json(v)| v).map_err(|r| ApiError::malformed(&r, locale))
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
