use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

use super::*;
use crate::error::Locale;
use crate::services::test_helpers::MockModel;
use crate::state::test_helpers::test_app_state;
use crate::upstream::{ImageModel, RawOutput, UpstreamError};

fn parse(value: Value) -> EditBody {
    serde_json::from_value(value).unwrap()
}

#[test]
fn defaults_match_source_and_png() {
    let req = parse(json!({ "prompt": "add a hat", "inputImage": "data:image/png;base64,AA" }))
        .into_request()
        .unwrap();
    assert_eq!(req.aspect_ratio, AspectRatio::MatchSource);
    assert_eq!(req.output_format, OutputFormat::Png);
    assert_eq!(req.safety_tolerance, DEFAULT_SAFETY_TOLERANCE);
}

#[test]
fn explicit_ratio_is_kept() {
    let req = parse(json!({ "prompt": "p", "inputImage": "img", "aspectRatio": "3:4" })).into_request().unwrap();
    assert_eq!(req.aspect_ratio, AspectRatio::StandardTall);
}

#[test]
fn missing_fields_in_order() {
    assert_eq!(parse(json!({ "inputImage": 1 })).into_request().unwrap_err(), InputProblem::MissingInstruction);
    assert_eq!(parse(json!({ "prompt": "p" })).into_request().unwrap_err(), InputProblem::MissingReferenceImage);
    assert_eq!(
        parse(json!({ "prompt": "p", "inputImage": "" })).into_request().unwrap_err(),
        InputProblem::MissingReferenceImage
    );
}

#[tokio::test]
async fn edit_echoes_originals() {
    let mock = Arc::new(MockModel::with_output(RawOutput::Json(json!(["https://x/e.png"]))));
    let state = test_app_state(Some(mock.clone() as Arc<dyn ImageModel>));
    let body = parse(json!({ "prompt": "add a hat", "inputImage": "data:image/png;base64,AA", "safetyTolerance": -3 }));

    let Json(resp) = edit_image(State(state), Lang(Locale::En), Ok(Json(body))).await.unwrap();

    assert!(resp.success);
    assert_eq!(resp.image_url, "https://x/e.png");
    assert_eq!(resp.original_prompt, "add a hat");
    assert_eq!(resp.original_image, "data:image/png;base64,AA");
    assert_eq!(mock.last_call().unwrap().1["safety_tolerance"], 0);
}

#[tokio::test]
async fn safety_tolerance_complaint_is_400() {
    let mock = Arc::new(MockModel::with_error(UpstreamError::Prediction("invalid safety_tolerance".into())));
    let state = test_app_state(Some(mock as Arc<dyn ImageModel>));
    let body = parse(json!({ "prompt": "p", "inputImage": "img" }));

    let err = edit_image(State(state), Lang(Locale::Zh), Ok(Json(body))).await.unwrap_err();

    assert_eq!(err.status, StatusCode::BAD_REQUEST);
    assert_eq!(err.body.error, "安全等级设置错误，请使用0-6之间的值");
}
