//! Error types for review-core.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::types::MasteryTier;

/// Result type alias using ValidationError.
pub type Result<T> = std::result::Result<T, ValidationError>;

/// A review state that breaks one of its invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("ease factor {ease_factor} is below the floor of {floor}")]
    EaseBelowFloor { ease_factor: f64, floor: f64 },

    #[error("ease factor is not a finite number")]
    NonFiniteEase,

    #[error("reviewed item has a zero interval")]
    ZeroIntervalAfterReview,

    #[error("never-reviewed item has interval {interval_days}, expected 0")]
    IntervalOnNewItem { interval_days: u32 },

    #[error("never-reviewed item has {repetitions} repetitions and {lapses} lapses")]
    HistoryOnNewItem { repetitions: u32, lapses: u32 },

    #[error("item has a due date but was never reviewed")]
    MissingLastReviewed,

    #[error("reviewed item has no due date")]
    MissingDue,

    #[error("due date {actual} does not match last review plus interval ({expected})")]
    DueMismatch {
        expected: DateTime<Utc>,
        actual: DateTime<Utc>,
    },

    #[error("interval of {interval_days} days cannot be scheduled")]
    ScheduleOverflow { interval_days: u32 },

    #[error("stored tier {stored:?} does not match classified tier {expected:?}")]
    TierMismatch {
        stored: MasteryTier,
        expected: MasteryTier,
    },

    #[error("lapses decreased from {before} to {after}")]
    LapsesDecreased { before: u32, after: u32 },
}

/// Errors raised while loading or checking scheduler configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Errors raised by the read-compute-write cycle against a review store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("revision conflict: expected {expected}, found {actual}")]
    Conflict { expected: u64, actual: u64 },

    #[error("gave up after {attempts} conflicting attempts")]
    RetriesExhausted { attempts: u32 },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
