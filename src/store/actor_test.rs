use std::sync::Arc;

use super::super::storage::MemoryStorage;
use super::*;

fn handle(capacity: usize) -> StoreHandle {
    spawn_store(StateStore::open(Box::new(MemoryStorage::new(capacity)), 50, 7))
}

fn entry(id: &str) -> HistoryEntry {
    HistoryEntry {
        id: id.into(),
        url: format!("https://x/{id}.png"),
        prompt: "cat".into(),
        timestamp: 1,
        style: "none".into(),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_increments_are_not_lost() {
    let store = Arc::new(handle(1 << 20));
    let tasks: Vec<_> = (0..40)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.increment_usage(2).await.unwrap() })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }
    assert_eq!(store.usage_today().await.unwrap(), 80);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_records_all_land() {
    let store = handle(1 << 20);
    let tasks: Vec<_> = (0..20)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move { store.record_generation(vec![entry(&i.to_string())]).await.unwrap() })
        })
        .collect();
    for task in tasks {
        assert_eq!(task.await.unwrap(), WriteOutcome::Stored);
    }
    let history = store.load_history().await.unwrap();
    assert_eq!(history.len(), 20);
    let mut ids: Vec<_> = history.into_iter().map(|e| e.id.parse::<u32>().unwrap()).collect();
    ids.sort_unstable();
    assert_eq!(ids, (0..20).collect::<Vec<_>>());
}

#[tokio::test]
async fn clear_then_load_is_empty() {
    let store = handle(1 << 20);
    store.record_generation(vec![entry("a"), entry("b")]).await.unwrap();
    assert_eq!(store.load_history().await.unwrap().len(), 2);
    store.clear_history().await.unwrap();
    assert!(store.load_history().await.unwrap().is_empty());
}

#[tokio::test]
async fn usage_for_unknown_day_is_zero() {
    let store = handle(1 << 20);
    assert_eq!(store.load_usage("Thu Jan 01 1970").await.unwrap(), 0);
}
