use super::*;

#[test]
fn parse_succeeded_prediction_with_url_list() {
    let json = serde_json::json!({
        "id": "p1",
        "status": "succeeded",
        "output": ["https://replicate.delivery/a.webp"],
        "error": null,
        "urls": { "get": "https://api.replicate.com/v1/predictions/p1" }
    })
    .to_string();
    let prediction = parse_prediction(&json).unwrap();
    assert_eq!(prediction.id, "p1");
    assert_eq!(prediction.status, PredictionStatus::Succeeded);
    assert_eq!(prediction.output.unwrap()[0], "https://replicate.delivery/a.webp");
}

#[test]
fn parse_unknown_status_maps_to_other() {
    let json = serde_json::json!({ "id": "p2", "status": "queued" }).to_string();
    let prediction = parse_prediction(&json).unwrap();
    assert_eq!(prediction.status, PredictionStatus::Other);
    assert!(prediction.output.is_none());
}

#[test]
fn parse_garbage_is_parse_error() {
    assert!(matches!(parse_prediction("<html>"), Err(UpstreamError::Parse(_))));
}

#[test]
fn poll_url_prefers_provider_link() {
    let prediction = parse_prediction(
        &serde_json::json!({ "id": "p3", "status": "processing", "urls": { "get": "https://x/p3" } }).to_string(),
    )
    .unwrap();
    assert_eq!(poll_url("https://api.replicate.com/v1", &prediction), "https://x/p3");
}

#[test]
fn poll_url_falls_back_to_id() {
    let prediction =
        parse_prediction(&serde_json::json!({ "id": "p4", "status": "starting" }).to_string()).unwrap();
    assert_eq!(poll_url("https://api.replicate.com/v1", &prediction), "https://api.replicate.com/v1/predictions/p4");
}

#[test]
fn error_text_variants() {
    assert_eq!(error_text(None), "prediction failed");
    assert_eq!(error_text(Some(&Value::Null)), "prediction failed");
    assert_eq!(error_text(Some(&serde_json::json!("NSFW content detected"))), "NSFW content detected");
    assert_eq!(error_text(Some(&serde_json::json!({"detail": "x"}))), r#"{"detail":"x"}"#);
}

#[test]
fn create_request_omits_version_for_model_endpoint() {
    let input = serde_json::json!({ "prompt": "cat" });
    let body = serde_json::to_value(CreateRequest { version: None, input: &input }).unwrap();
    assert!(body.get("version").is_none());
    assert_eq!(body["input"]["prompt"], "cat");
}

#[test]
fn remote_urls_only() {
    assert!(is_remote("https://replicate.delivery/x.png"));
    assert!(!is_remote("data:image/png;base64,AAAA"));
}
