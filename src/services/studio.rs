//! Studio flow: build prompt, check the daily quota, generate, record.
//!
//! DESIGN
//! ======
//! One request runs start to finish in order: prompt build (translation
//! included), quota check, one gateway call or a batch fan-out, then history
//! and usage writes through the store actor.
//!
//! Batch mode issues N single-image calls concurrently. The batch succeeds
//! when at least one call does; URLs keep call order. When every call fails
//! the first error is returned.
//!
//! Store failures are logged and never fail a request whose images were
//! already produced.

use futures::future::join_all;
use time::OffsetDateTime;
use tracing::{info, warn};

use super::gateway::{
    Gateway, GatewayError, GenerationRequest, InputProblem, MAX_OUTPUT_COUNT, validate_prompt,
};
use crate::error::{ErrorCode, Locale};
use crate::prompt::{self, PromptOptions};
use crate::state::AppState;
use crate::store::HistoryEntry;
use crate::translate::TranslationMethod;

#[derive(Debug, Clone)]
pub struct StudioRequest {
    /// User text as typed, possibly Chinese.
    pub text: String,
    pub options: PromptOptions,
    /// Generation parameters. `prompt` is replaced by the built prompt.
    pub params: GenerationRequest,
    pub batch: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudioOutcome {
    pub image_urls: Vec<String>,
    pub final_prompt: String,
    pub translation: Option<TranslationMethod>,
    /// Today's count including this request.
    pub usage_today: u32,
    pub daily_limit: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("daily limit of {limit} images reached")]
    DailyLimitReached { limit: u32 },
}

impl ErrorCode for StudioError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Gateway(e) => e.error_code(),
            Self::DailyLimitReached { .. } => "E_DAILY_LIMIT",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Gateway(e) => e.retryable(),
            Self::DailyLimitReached { .. } => false,
        }
    }
}

impl StudioError {
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::Gateway(e) => e.status(),
            Self::DailyLimitReached { .. } => 429,
        }
    }

    #[must_use]
    pub fn upsell(&self) -> bool {
        match self {
            Self::Gateway(e) => e.upsell(),
            Self::DailyLimitReached { .. } => true,
        }
    }

    #[must_use]
    pub fn user_message(&self, locale: Locale) -> String {
        match (self, locale) {
            (Self::Gateway(e), _) => e.user_message(locale),
            (Self::DailyLimitReached { limit }, Locale::Zh) => format!("今日生成次数已达上限（{limit}张），请明天再来"),
            (Self::DailyLimitReached { limit }, Locale::En) => {
                format!("Daily limit of {limit} images reached, please come back tomorrow.")
            }
        }
    }
}

/// Run the full studio flow for one request.
///
/// # Errors
///
/// [`StudioError::DailyLimitReached`] before any upstream call when today's
/// count has reached the limit; otherwise any [`GatewayError`].
pub async fn create(state: &AppState, req: StudioRequest) -> Result<StudioOutcome, StudioError> {
    let text = req.text.trim();
    validate_prompt(text, state.limits.max_studio_prompt_chars)?;

    let built = prompt::build_prompt(&state.translator, text, &req.options).await;
    if built.text.is_empty() {
        return Err(GatewayError::InvalidInput(InputProblem::MissingPrompt).into());
    }

    let used = state.store.usage_today().await.unwrap_or_else(|e| {
        warn!(error = %e, "studio: usage unavailable; assuming none");
        0
    });
    let limit = state.limits.daily_limit;
    if used >= limit {
        info!(used, limit, "studio: daily limit reached");
        return Err(StudioError::DailyLimitReached { limit });
    }

    let mut params = req.params;
    params.prompt.clone_from(&built.text);
    let image_urls = if req.batch && params.reference_image.is_none() && params.output_count > 1 {
        run_batch(&state.gateway, &params).await?
    } else {
        state.gateway.dispatch(&params).await?.image_urls
    };

    let entries = HistoryEntry::batch(&image_urls, text, req.options.style_id(), now_ms());
    if let Err(e) = state.store.record_generation(entries).await {
        warn!(error = %e, "studio: history not recorded");
    }
    let produced = u32::try_from(image_urls.len()).unwrap_or(u32::MAX);
    let usage_today = state.store.increment_usage(produced).await.unwrap_or_else(|e| {
        warn!(error = %e, "studio: usage not recorded");
        used.saturating_add(produced)
    });

    info!(
        images = image_urls.len(),
        usage_today,
        translated = built.translation.is_some(),
        "studio: create succeeded"
    );
    Ok(StudioOutcome {
        image_urls,
        final_prompt: built.text,
        translation: built.translation,
        usage_today,
        daily_limit: limit,
    })
}

/// Fan `params.output_count` single-image calls out concurrently. A fixed
/// non-zero seed is offset per call so the images differ.
async fn run_batch(gateway: &Gateway, params: &GenerationRequest) -> Result<Vec<String>, GatewayError> {
    let count = params.output_count.clamp(1, MAX_OUTPUT_COUNT);
    let requests: Vec<GenerationRequest> = (0..count)
        .map(|i| {
            let mut single = params.clone();
            single.output_count = 1;
            single.seed = params.seed.filter(|s| *s != 0).map(|s| s.wrapping_add(i64::from(i)));
            single
        })
        .collect();

    let results = join_all(requests.iter().map(|r| gateway.dispatch(r))).await;

    let mut urls = Vec::new();
    let mut first_error = None;
    let mut failed = 0usize;
    for result in results {
        match result {
            Ok(generation) => urls.extend(generation.image_urls),
            Err(e) => {
                failed += 1;
                first_error.get_or_insert(e);
            }
        }
    }

    if urls.is_empty() {
        return Err(first_error.unwrap_or_else(|| GatewayError::GenerationFailed("batch produced no images".into())));
    }
    if failed > 0 {
        warn!(requested = count, failed, "studio: partial batch");
    }
    Ok(urls)
}

fn now_ms() -> i64 {
    i64::try_from(OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000).unwrap_or(i64::MAX)
}

#[cfg(test)]
#[path = "studio_test.rs"]
mod tests;
