//! Versioned review-state storage and the read-compute-write loop.
//!
//! The grading engine is pure; persisting its output safely is the caller's
//! job. [`record_answer`] shows the required discipline: read the latest
//! revision, grade, then compare-and-swap, retrying on conflict. Grading is
//! deterministic, so a retry never has side effects.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::algorithm::SpacedRepetitionAlgorithm;
use crate::config::SchedulerConfig;
use crate::error::StoreError;
use crate::types::{Rating, ReviewState};

/// Identifies one item for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemKey {
    pub user_id: Uuid,
    pub item_id: Uuid,
}

impl ItemKey {
    pub fn new(user_id: Uuid, item_id: Uuid) -> Self {
        Self { user_id, item_id }
    }
}

/// A review state paired with its key, for partitioning keyed records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedItem {
    pub key: ItemKey,
    pub state: ReviewState,
}

impl AsRef<ReviewState> for TrackedItem {
    fn as_ref(&self) -> &ReviewState {
        &self.state
    }
}

/// A stored state and the revision it was written at.
///
/// Revision 0 means "never written"; the first write produces revision 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned {
    pub revision: u64,
    pub state: ReviewState,
}

/// Storage for review states with optimistic concurrency.
pub trait ReviewStore: Send + Sync {
    /// Latest stored state, if any.
    fn load(&self, key: &ItemKey) -> Option<Versioned>;

    /// Write `state` only if the stored revision still equals `expected`.
    ///
    /// Returns the new revision.
    fn compare_and_swap(
        &self,
        key: &ItemKey,
        expected: u64,
        state: ReviewState,
    ) -> Result<u64, StoreError>;
}

/// In-memory store guarded by a mutex.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<ItemKey, Versioned>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every state a user has, for queue and stats queries.
    pub fn user_items(&self, user_id: Uuid) -> Vec<TrackedItem> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records
            .iter()
            .filter(|(key, _)| key.user_id == user_id)
            .map(|(key, record)| TrackedItem {
                key: *key,
                state: record.state.clone(),
            })
            .collect()
    }
}

impl ReviewStore for MemoryStore {
    fn load(&self, key: &ItemKey) -> Option<Versioned> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.get(key).cloned()
    }

    fn compare_and_swap(
        &self,
        key: &ItemKey,
        expected: u64,
        state: ReviewState,
    ) -> Result<u64, StoreError> {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        let actual = records.get(key).map_or(0, |record| record.revision);
        if actual != expected {
            return Err(StoreError::Conflict { expected, actual });
        }

        let revision = actual + 1;
        records.insert(*key, Versioned { revision, state });
        Ok(revision)
    }
}

/// Grade an answer and persist the result.
///
/// Items that were never stored start from the algorithm's initial state.
/// Validation errors abort without writing. Conflicts are retried until
/// `config.max_store_retries` attempts have been made; at least one attempt
/// is always made.
pub fn record_answer<S, A>(
    store: &S,
    algorithm: &A,
    key: &ItemKey,
    rating: Rating,
    now: DateTime<Utc>,
    config: &SchedulerConfig,
) -> Result<Versioned, StoreError>
where
    S: ReviewStore + ?Sized,
    A: SpacedRepetitionAlgorithm + ?Sized,
{
    let max_attempts = config.max_store_retries.max(1);
    for attempt in 1..=max_attempts {
        let current = store.load(key).unwrap_or_else(|| Versioned {
            revision: 0,
            state: algorithm.initial_state(),
        });

        let result = algorithm.schedule(&current.state, rating, now)?;

        match store.compare_and_swap(key, current.revision, result.new_state.clone()) {
            Ok(revision) => {
                tracing::debug!(
                    user_id = %key.user_id,
                    item_id = %key.item_id,
                    revision,
                    "recorded review"
                );
                return Ok(Versioned {
                    revision,
                    state: result.new_state,
                });
            }
            Err(StoreError::Conflict { expected, actual }) => {
                tracing::warn!(
                    user_id = %key.user_id,
                    item_id = %key.item_id,
                    attempt,
                    expected,
                    actual,
                    "review state changed underneath us, retrying"
                );
            }
            Err(err) => return Err(err),
        }
    }

    Err(StoreError::RetriesExhausted {
        attempts: max_attempts,
    })
}
