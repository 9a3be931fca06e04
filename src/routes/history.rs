//! History and usage endpoints backed by the state store.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use super::{ApiError, Lang};
use crate::state::AppState;
use crate::store::HistoryEntry;
use crate::store::day;

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UsageQuery {
    /// Day-key such as `Mon Oct 19 2026`; today when absent.
    pub day: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UsageResponse {
    pub day: String,
    pub count: u32,
    pub limit: u32,
}

/// `GET /api/history`: most recent first.
pub async fn list(State(state): State<AppState>, Lang(locale): Lang) -> Result<Json<HistoryResponse>, ApiError> {
    let history = state.store.load_history().await.map_err(|e| ApiError::store(&e, locale))?;
    Ok(Json(HistoryResponse { history }))
}

/// `DELETE /api/history`
pub async fn clear(State(state): State<AppState>, Lang(locale): Lang) -> Result<StatusCode, ApiError> {
    state.store.clear_history().await.map_err(|e| ApiError::store(&e, locale))?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/usage?day=`
pub async fn usage(
    State(state): State<AppState>,
    Lang(locale): Lang,
    Query(query): Query<UsageQuery>,
) -> Result<Json<UsageResponse>, ApiError> {
    let day = query
        .day
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| day::day_key(day::today()));
    let count = state.store.load_usage(&day).await.map_err(|e| ApiError::store(&e, locale))?;
    Ok(Json(UsageResponse { day, count, limit: state.limits.daily_limit }))
}

#[cfg(test)]
#[path = "history_test.rs"]
mod tests;
