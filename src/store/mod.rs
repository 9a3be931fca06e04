//! State store: generation history and per-day usage counters.
//!
//! DESIGN
//! ======
//! The in-memory copy is authoritative; storage is a best-effort mirror.
//! Every mutation updates memory first, then goes through the overflow-safe
//! write path:
//!
//! 1. plain write
//! 2. on quota: prune usage keys older than the retention window, retry
//! 3. history key only: retry with the newest [`HISTORY_FALLBACK_LEN`] entries
//! 4. remove the key and carry on from memory
//!
//! Backoff is per call; the next mutation tries the full write again.
//! Storage failures are logged and never returned to the caller.
//!
//! `StateStore` itself is synchronous and single-owner. Concurrent access
//! goes through [`actor::StoreHandle`].

pub mod actor;
pub mod day;
pub mod storage;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::Date;
use tracing::{info, warn};

pub use actor::{StoreError, StoreHandle, spawn_store};
use storage::KvStorage;

pub const HISTORY_KEY: &str = "flux_history";
pub const USAGE_KEY_PREFIX: &str = "flux_usage_";
pub const HISTORY_FALLBACK_LEN: usize = 5;

/// One generated image. Never mutated after creation, only pruned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub url: String,
    /// Prompt as the user typed it, before translation.
    pub prompt: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub style: String,
}

impl HistoryEntry {
    /// One entry per URL, ids `{timestamp}-{index}`, in URL order.
    #[must_use]
    pub fn batch(urls: &[String], prompt: &str, style: &str, timestamp: i64) -> Vec<Self> {
        urls.iter()
            .enumerate()
            .map(|(i, url)| Self {
                id: format!("{timestamp}-{i}"),
                url: url.clone(),
                prompt: prompt.to_string(),
                timestamp,
                style: style.to_string(),
            })
            .collect()
    }
}

/// How far down the overflow-safe write path a write had to go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Stored,
    StoredAfterPrune,
    Truncated,
    Dropped,
    /// Non-quota storage failure.
    Failed,
}

#[must_use]
pub fn usage_key(day_key: &str) -> String {
    format!("{USAGE_KEY_PREFIX}{day_key}")
}

pub struct StateStore {
    storage: Box<dyn KvStorage>,
    history: Vec<HistoryEntry>,
    usage: BTreeMap<String, u32>,
    history_limit: usize,
    retention_days: i64,
}

impl StateStore {
    /// Load existing state from `storage`. Unreadable values are logged and
    /// treated as absent.
    #[must_use]
    pub fn open(storage: Box<dyn KvStorage>, history_limit: usize, retention_days: i64) -> Self {
        let history_limit = history_limit.max(1);
        let mut history: Vec<HistoryEntry> = match storage.get(HISTORY_KEY) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "stored history unreadable; starting empty");
                Vec::new()
            }),
            None => Vec::new(),
        };
        history.truncate(history_limit);

        let mut usage = BTreeMap::new();
        for key in storage.keys() {
            let Some(day) = key.strip_prefix(USAGE_KEY_PREFIX) else {
                continue;
            };
            match storage.get(&key).and_then(|raw| raw.trim().parse::<u32>().ok()) {
                Some(count) => {
                    usage.insert(day.to_string(), count);
                }
                None => warn!(key = %key, "stored usage counter unreadable; ignoring"),
            }
        }

        info!(history = history.len(), usage_days = usage.len(), "state store loaded");
        Self { storage, history, usage, history_limit, retention_days }
    }

    /// Most recent first.
    #[must_use]
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    #[must_use]
    pub fn usage(&self, day_key: &str) -> u32 {
        self.usage.get(day_key).copied().unwrap_or(0)
    }

    /// Prepend `entries` (kept in their given order) and cap the list.
    pub fn record_generation(&mut self, entries: Vec<HistoryEntry>) -> WriteOutcome {
        self.record_generation_on(day::today(), entries)
    }

    pub fn record_generation_on(&mut self, today: Date, entries: Vec<HistoryEntry>) -> WriteOutcome {
        if entries.is_empty() {
            return WriteOutcome::Stored;
        }
        let mut next = entries;
        next.append(&mut self.history);
        next.truncate(self.history_limit);
        self.history = next;

        let Some(body) = encode(&self.history) else {
            return WriteOutcome::Failed;
        };
        self.write(HISTORY_KEY, body, today)
    }

    /// Add `count` to the counter for `date`. Returns the new total.
    pub fn increment_usage_on(&mut self, date: Date, count: u32) -> u32 {
        let day = day::day_key(date);
        let total = self.usage(&day).saturating_add(count);
        self.usage.insert(day.clone(), total);
        self.write(&usage_key(&day), total.to_string(), date);
        total
    }

    pub fn clear_history(&mut self) -> WriteOutcome {
        self.history.clear();
        match self.storage.remove(HISTORY_KEY) {
            Ok(()) => WriteOutcome::Stored,
            Err(e) => {
                warn!(error = %e, "history clear not persisted");
                WriteOutcome::Failed
            }
        }
    }

    fn write(&mut self, key: &str, value: String, today: Date) -> WriteOutcome {
        let err = match self.storage.set(key, value.clone()) {
            Ok(()) => return WriteOutcome::Stored,
            Err(e) => e,
        };
        if !err.is_quota() {
            warn!(key, error = %err, "storage write failed");
            return WriteOutcome::Failed;
        }

        let pruned = self.prune_usage(today);
        warn!(key, pruned, error = %err, "storage full; pruned old usage counters");
        match self.storage.set(key, value) {
            Ok(()) => return WriteOutcome::StoredAfterPrune,
            Err(e) if !e.is_quota() => {
                warn!(key, error = %e, "storage write failed after prune");
                return WriteOutcome::Failed;
            }
            Err(_) => {}
        }

        if key == HISTORY_KEY {
            let keep = self.history.len().min(HISTORY_FALLBACK_LEN);
            if let Some(body) = encode(&self.history[..keep]) {
                match self.storage.set(key, body) {
                    Ok(()) => {
                        warn!(kept = keep, "storage full; persisted truncated history");
                        return WriteOutcome::Truncated;
                    }
                    Err(e) => warn!(error = %e, "truncated history write failed"),
                }
            }
        }

        if let Err(e) = self.storage.remove(key) {
            warn!(key, error = %e, "could not drop key after failed writes");
        }
        warn!(key, "storage full; key dropped, continuing from memory");
        WriteOutcome::Dropped
    }

    /// Remove usage counters dated before `today - retention_days`.
    /// Keys whose date cannot be parsed are kept.
    fn prune_usage(&mut self, today: Date) -> usize {
        let Some(cutoff) = today.checked_sub(time::Duration::days(self.retention_days)) else {
            return 0;
        };
        let mut pruned = 0;
        for key in self.storage.keys() {
            let Some(day) = key.strip_prefix(USAGE_KEY_PREFIX) else {
                continue;
            };
            if !day::parse_day_key(day).is_some_and(|date| date < cutoff) {
                continue;
            }
            match self.storage.remove(&key) {
                Ok(()) => {
                    self.usage.remove(day);
                    pruned += 1;
                }
                Err(e) => warn!(key = %key, error = %e, "usage prune failed"),
            }
        }
        pruned
    }
}

fn encode(entries: &[HistoryEntry]) -> Option<String> {
    serde_json::to_string(entries)
        .map_err(|e| warn!(error = %e, "history serialization failed"))
        .ok()
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
