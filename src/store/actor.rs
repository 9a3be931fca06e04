//! Single-writer actor around [`StateStore`].
//!
//! DESIGN
//! ======
//! One blocking worker owns the store and drains a command queue. Each
//! read-modify-write is one command, so concurrent generation completions
//! are applied one after another and never overwrite each other. Callers
//! hold a cheap, cloneable [`StoreHandle`].

use time::Date;
use tokio::sync::{mpsc, oneshot};
use tracing::info;

use super::{HistoryEntry, StateStore, WriteOutcome, day};
use crate::error::ErrorCode;

const QUEUE_DEPTH: usize = 256;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("state store worker is not running")]
    Closed,
}

impl ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        "E_STORE_UNAVAILABLE"
    }

    fn retryable(&self) -> bool {
        true
    }
}

enum Command {
    Record { entries: Vec<HistoryEntry>, reply: oneshot::Sender<WriteOutcome> },
    Increment { date: Date, count: u32, reply: oneshot::Sender<u32> },
    History { reply: oneshot::Sender<Vec<HistoryEntry>> },
    Usage { day_key: String, reply: oneshot::Sender<u32> },
    Clear { reply: oneshot::Sender<WriteOutcome> },
}

#[derive(Clone)]
pub struct StoreHandle {
    tx: mpsc::Sender<Command>,
}

/// Move `store` onto a blocking worker. Must be called inside a tokio runtime.
/// The worker exits when every handle has been dropped.
pub fn spawn_store(mut store: StateStore) -> StoreHandle {
    let (tx, mut rx) = mpsc::channel::<Command>(QUEUE_DEPTH);
    tokio::task::spawn_blocking(move || {
        while let Some(cmd) = rx.blocking_recv() {
            // A dropped reply receiver means the caller went away; the write
            // itself has already happened.
            match cmd {
                Command::Record { entries, reply } => {
                    let _ = reply.send(store.record_generation(entries));
                }
                Command::Increment { date, count, reply } => {
                    let _ = reply.send(store.increment_usage_on(date, count));
                }
                Command::History { reply } => {
                    let _ = reply.send(store.history().to_vec());
                }
                Command::Usage { day_key, reply } => {
                    let _ = reply.send(store.usage(&day_key));
                }
                Command::Clear { reply } => {
                    let _ = reply.send(store.clear_history());
                }
            }
        }
        info!("state store worker stopped");
    });
    StoreHandle { tx }
}

impl StoreHandle {
    async fn ask<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T, StoreError> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(build(reply)).await.map_err(|_| StoreError::Closed)?;
        rx.await.map_err(|_| StoreError::Closed)
    }

    /// # Errors
    ///
    /// [`StoreError::Closed`] if the worker has stopped.
    pub async fn record_generation(&self, entries: Vec<HistoryEntry>) -> Result<WriteOutcome, StoreError> {
        self.ask(|reply| Command::Record { entries, reply }).await
    }

    /// Add `count` to today's counter and return the new total.
    ///
    /// # Errors
    ///
    /// [`StoreError::Closed`] if the worker has stopped.
    pub async fn increment_usage(&self, count: u32) -> Result<u32, StoreError> {
        self.increment_usage_on(day::today(), count).await
    }

    /// # Errors
    ///
    /// [`StoreError::Closed`] if the worker has stopped.
    pub async fn increment_usage_on(&self, date: Date, count: u32) -> Result<u32, StoreError> {
        self.ask(|reply| Command::Increment { date, count, reply }).await
    }

    /// # Errors
    ///
    /// [`StoreError::Closed`] if the worker has stopped.
    pub async fn load_history(&self) -> Result<Vec<HistoryEntry>, StoreError> {
        self.ask(|reply| Command::History { reply }).await
    }

    /// # Errors
    ///
    /// [`StoreError::Closed`] if the worker has stopped.
    pub async fn load_usage(&self, day_key: &str) -> Result<u32, StoreError> {
        let day_key = day_key.to_string();
        self.ask(|reply| Command::Usage { day_key, reply }).await
    }

    /// # Errors
    ///
    /// [`StoreError::Closed`] if the worker has stopped.
    pub async fn usage_today(&self) -> Result<u32, StoreError> {
        self.load_usage(&day::day_key(day::today())).await
    }

    /// # Errors
    ///
    /// [`StoreError::Closed`] if the worker has stopped.
    pub async fn clear_history(&self) -> Result<WriteOutcome, StoreError> {
        self.ask(|reply| Command::Clear { reply }).await
    }
}

#[cfg(test)]
#[path = "actor_test.rs"]
mod tests;
