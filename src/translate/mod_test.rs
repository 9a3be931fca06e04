use super::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

struct MockService {
    method: TranslationMethod,
    reply: Result<String, u16>,
    calls: Arc<AtomicUsize>,
}

impl MockService {
    fn boxed(method: TranslationMethod, reply: Result<&str, u16>, calls: &Arc<AtomicUsize>) -> Box<dyn TranslationService> {
        Box::new(Self { method, reply: reply.map(str::to_string), calls: calls.clone() })
    }
}

#[async_trait::async_trait]
impl TranslationService for MockService {
    fn method(&self) -> TranslationMethod {
        self.method
    }

    async fn translate(&self, _text: &str) -> Result<String, TranslateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone().map_err(|status| TranslateError::Status { status })
    }
}

#[test]
fn cjk_detection() {
    assert!(contains_cjk("一只猫"));
    assert!(contains_cjk("a 猫 in the hat"));
    assert!(!contains_cjk("a cat"));
    assert!(!contains_cjk("こんにちは"));
    assert!(!contains_cjk(""));
}

#[tokio::test]
async fn non_cjk_passes_through_without_calls() {
    let calls = Arc::new(AtomicUsize::new(0));
    let translator = Translator::with_services(vec![MockService::boxed(TranslationMethod::Google, Ok("x"), &calls)]);
    for input in ["a cat", "", "café au lait ☕"] {
        let out = translator.translate(input).await;
        assert_eq!(out.text, input);
        assert!(!out.is_translated());
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn first_successful_service_wins() {
    let calls = Arc::new(AtomicUsize::new(0));
    let translator = Translator::with_services(vec![
        MockService::boxed(TranslationMethod::Google, Ok("a cat"), &calls),
        MockService::boxed(TranslationMethod::LibreTranslate, Ok("unused"), &calls),
    ]);
    let out = translator.translate("一只猫").await;
    assert_eq!(out.text, "a cat");
    assert_eq!(out.method, Some(TranslationMethod::Google));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn falls_back_to_free_service() {
    let calls = Arc::new(AtomicUsize::new(0));
    let translator = Translator::with_services(vec![
        MockService::boxed(TranslationMethod::Google, Err(403), &calls),
        MockService::boxed(TranslationMethod::LibreTranslate, Ok("a dog"), &calls),
    ]);
    let out = translator.translate("一只狗").await;
    assert_eq!(out.text, "a dog");
    assert_eq!(out.method, Some(TranslationMethod::LibreTranslate));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn all_services_down_uses_dictionary() {
    let calls = Arc::new(AtomicUsize::new(0));
    let translator = Translator::with_services(vec![MockService::boxed(TranslationMethod::LibreTranslate, Err(503), &calls)]);
    let out = translator.translate("一只猫").await;
    assert!(out.text.contains("cat"));
    assert_eq!(out.method, Some(TranslationMethod::Dictionary));
}

#[tokio::test]
async fn no_services_uses_dictionary() {
    let translator = Translator::with_services(Vec::new());
    let out = translator.translate("美丽的森林").await;
    assert_eq!(out.text, "beautiful的forest");
}

#[test]
fn method_wire_names() {
    assert_eq!(serde_json::to_value(TranslationMethod::LibreTranslate).unwrap(), "libretranslate");
    assert_eq!(serde_json::to_value(TranslationMethod::Dictionary).unwrap(), "dictionary");
}
