use axum::http::StatusCode;
use serde_json::json;

use super::*;
use crate::error::Locale;
use crate::state::test_helpers::test_app_state;

async fn call(value: Value) -> Result<Json<TranslateResponse>, ApiError> {
    let body: TranslateBody = serde_json::from_value(value).unwrap();
    translate(State(test_app_state(None)), Lang(Locale::En), Ok(Json(body))).await
}

#[tokio::test]
async fn english_passes_through() {
    let Json(resp) = call(json!({ "text": "a cat" })).await.unwrap();
    assert_eq!(resp.translated_text, "a cat");
    assert!(!resp.is_translated);
    let wire = serde_json::to_value(&resp).unwrap();
    assert!(wire.get("originalText").is_none());
    assert!(wire.get("method").is_none());
}

#[tokio::test]
async fn chinese_uses_dictionary_without_services() {
    let Json(resp) = call(json!({ "text": "一只猫" })).await.unwrap();
    assert!(resp.is_translated);
    assert!(resp.translated_text.contains("cat"));
    let wire = serde_json::to_value(&resp).unwrap();
    assert_eq!(wire["originalText"], "一只猫");
    assert_eq!(wire["method"], "dictionary");
    assert_eq!(wire["isTranslated"], true);
}

#[tokio::test]
async fn missing_text_is_400() {
    for value in [json!({}), json!({ "text": "" }), json!({ "text": 3 })] {
        let err = call(value).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.body.error, "Text is required.");
    }
}
