use std::sync::Arc;

use serde_json::json;

use super::*;
use crate::config::LimitsConfig;
use crate::services::test_helpers::MockModel;
use crate::state::test_helpers::{test_app_state, test_app_state_with_limits};
use crate::upstream::{ImageModel, RawOutput, UpstreamError};

fn url(n: u32) -> Result<RawOutput, UpstreamError> {
    Ok(RawOutput::Json(json!(format!("https://x/{n}.webp"))))
}

fn request(text: &str) -> StudioRequest {
    StudioRequest {
        text: text.into(),
        options: PromptOptions::default(),
        params: GenerationRequest::new(""),
        batch: false,
    }
}

fn state_with(mock: &Arc<MockModel>) -> AppState {
    test_app_state(Some(mock.clone() as Arc<dyn ImageModel>))
}

#[tokio::test]
async fn blank_text_rejected_before_upstream() {
    let mock = Arc::new(MockModel::with_responses(vec![url(1)]));
    let err = create(&state_with(&mock), request("  ")).await.unwrap_err();
    assert!(matches!(err, StudioError::Gateway(GatewayError::InvalidInput(InputProblem::MissingPrompt))));
    assert_eq!(err.status(), 400);
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn chinese_text_falls_back_to_dictionary_and_appends_style() {
    let mock = Arc::new(MockModel::with_responses(vec![url(1)]));
    let mut req = request("一只猫");
    req.options.style = Some("anime".into());

    let outcome = create(&state_with(&mock), req).await.unwrap();

    assert!(outcome.final_prompt.contains("cat"));
    assert!(outcome.final_prompt.contains(", anime style"));
    assert_eq!(outcome.translation, Some(TranslationMethod::Dictionary));
    let (_, input) = mock.last_call().unwrap();
    assert_eq!(input["prompt"], outcome.final_prompt.as_str());
}

#[tokio::test]
async fn success_records_history_and_usage() {
    let mock = Arc::new(MockModel::with_responses(vec![Ok(RawOutput::Json(json!([
        "https://x/a.webp",
        "https://x/b.webp"
    ])))]));
    let state = state_with(&mock);
    let mut req = request("two owls");
    req.options.style = Some("vintage".into());
    req.params.output_count = 2;

    let outcome = create(&state, req).await.unwrap();

    assert_eq!(outcome.image_urls.len(), 2);
    assert_eq!(outcome.usage_today, 2);
    assert_eq!(outcome.daily_limit, LimitsConfig::default().daily_limit);
    let history = state.store.load_history().await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].url, "https://x/a.webp");
    assert_eq!(history[0].prompt, "two owls");
    assert_eq!(history[0].style, "vintage");
    assert_eq!(state.store.usage_today().await.unwrap(), 2);
}

#[tokio::test]
async fn daily_limit_blocks_before_upstream() {
    let mock = Arc::new(MockModel::with_responses(vec![url(1)]));
    let limits = LimitsConfig { daily_limit: 2, ..LimitsConfig::default() };
    let state = test_app_state_with_limits(Some(mock.clone() as Arc<dyn ImageModel>), limits);
    state.store.increment_usage(2).await.unwrap();

    let err = create(&state, request("a cat")).await.unwrap_err();

    assert!(matches!(err, StudioError::DailyLimitReached { limit: 2 }));
    assert_eq!(err.status(), 429);
    assert_eq!(err.error_code(), "E_DAILY_LIMIT");
    assert!(err.upsell());
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn studio_accepts_text_longer_than_generate_bound() {
    let mock = Arc::new(MockModel::with_responses(vec![url(1)]));
    let text = "a".repeat(1500);
    assert!(create(&state_with(&mock), request(&text)).await.is_ok());

    let too_long = "a".repeat(LimitsConfig::default().max_studio_prompt_chars + 1);
    let err = create(&state_with(&mock), request(&too_long)).await.unwrap_err();
    assert!(matches!(err, StudioError::Gateway(GatewayError::InvalidInput(InputProblem::PromptTooLong { .. }))));
}

#[tokio::test]
async fn unconfigured_gateway_records_nothing() {
    let state = test_app_state(None);
    let err = create(&state, request("a cat")).await.unwrap_err();
    assert!(matches!(err, StudioError::Gateway(GatewayError::Configuration)));
    assert!(state.store.load_history().await.unwrap().is_empty());
    assert_eq!(state.store.usage_today().await.unwrap(), 0);
}

// =============================================================================
// batch
// =============================================================================

#[tokio::test]
async fn batch_partial_success_keeps_call_order() {
    let mock = Arc::new(MockModel::with_responses(vec![
        url(1),
        Err(UpstreamError::Prediction("CUDA out of memory".into())),
        url(3),
    ]));
    let state = state_with(&mock);
    let mut req = request("foxes");
    req.batch = true;
    req.params.output_count = 3;
    req.params.seed = Some(10);

    let outcome = create(&state, req).await.unwrap();

    assert_eq!(outcome.image_urls, ["https://x/1.webp", "https://x/3.webp"]);
    assert_eq!(outcome.usage_today, 2);
    let calls = mock.calls();
    assert_eq!(calls.len(), 3);
    assert!(calls.iter().all(|(_, input)| input["num_outputs"] == 1));
    let seeds: Vec<_> = calls.iter().map(|(_, input)| input["seed"].as_i64().unwrap()).collect();
    assert_eq!(seeds, [10, 11, 12]);
}

#[tokio::test]
async fn batch_all_failed_returns_first_error() {
    let mock = Arc::new(MockModel::with_responses(vec![
        Err(UpstreamError::Status { status: 401, body: "bad token".into() }),
        Err(UpstreamError::Request { message: "deadline".into(), timeout: true }),
    ]));
    let state = state_with(&mock);
    let mut req = request("foxes");
    req.batch = true;
    req.params.output_count = 2;

    let err = create(&state, req).await.unwrap_err();

    assert!(matches!(err, StudioError::Gateway(GatewayError::Auth(_))));
    assert_eq!(mock.call_count(), 2);
    assert_eq!(state.store.usage_today().await.unwrap(), 0);
}

#[tokio::test]
async fn batch_with_reference_image_is_one_call() {
    let mock = Arc::new(MockModel::with_responses(vec![url(1)]));
    let mut req = request("add snow");
    req.batch = true;
    req.params.output_count = 4;
    req.params.reference_image = Some("data:image/png;base64,AAAA".into());

    let outcome = create(&state_with(&mock), req).await.unwrap();

    assert_eq!(outcome.image_urls.len(), 1);
    assert_eq!(mock.call_count(), 1);
    assert_eq!(mock.last_call().unwrap().1["num_outputs"], 1);
}
