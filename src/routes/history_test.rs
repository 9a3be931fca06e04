use super::*;
use crate::error::Locale;
use crate::state::test_helpers::test_app_state;

fn entry(id: &str) -> HistoryEntry {
    HistoryEntry {
        id: id.into(),
        url: format!("https://x/{id}.png"),
        prompt: "cat".into(),
        timestamp: 1,
        style: "none".into(),
    }
}

#[tokio::test]
async fn list_then_clear() {
    let state = test_app_state(None);
    state.store.record_generation(vec![entry("b"), entry("a")]).await.unwrap();

    let Json(resp) = list(State(state.clone()), Lang(Locale::En)).await.unwrap();
    assert_eq!(resp.history.len(), 2);
    assert_eq!(resp.history[0].id, "b");

    let status = clear(State(state.clone()), Lang(Locale::En)).await.unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);
    let Json(resp) = list(State(state), Lang(Locale::En)).await.unwrap();
    assert!(resp.history.is_empty());
}

#[tokio::test]
async fn usage_defaults_to_today() {
    let state = test_app_state(None);
    state.store.increment_usage(3).await.unwrap();

    let Json(resp) = usage(State(state.clone()), Lang(Locale::En), Query(UsageQuery::default())).await.unwrap();

    assert_eq!(resp.day, day::day_key(day::today()));
    assert_eq!(resp.count, 3);
    assert_eq!(resp.limit, state.limits.daily_limit);
}

#[tokio::test]
async fn usage_for_explicit_day() {
    let state = test_app_state(None);
    let query = UsageQuery { day: Some(" Thu Jan 01 1970 ".into()) };
    let Json(resp) = usage(State(state), Lang(Locale::En), Query(query)).await.unwrap();
    assert_eq!(resp.day, "Thu Jan 01 1970");
    assert_eq!(resp.count, 0);
}
