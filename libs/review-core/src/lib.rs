//! Spaced repetition scheduling core.
//!
//! Provides:
//! - Review state model and validation
//! - SM-2 grading engine (`next_state`)
//! - Mastery tier classification
//! - Due-queue partitioning, aggregate statistics and study pool recommendation
//! - Versioned storage seam with a compare-and-swap retry loop
//!
//! Nothing here reads the clock or does I/O on the hot path; callers pass `now`.

pub mod algorithm;
pub mod config;
pub mod error;
pub mod mastery;
pub mod queue;
pub mod stats;
pub mod store;
pub mod types;
pub mod validation;

pub use algorithm::{
    next_state, round_half_up, SchedulingResult, Sm2, SpacedRepetitionAlgorithm,
};
pub use config::SchedulerConfig;
pub use error::{ConfigError, Result, StoreError, ValidationError};
pub use mastery::{classify, classify_with, MasteryThresholds};
pub use queue::{partition, partition_within, DueCounts, DuePartition};
pub use stats::{
    aggregate, aggregate_with, recommend_pool, study_pool, study_pool_with, AggregateStats,
    StudyPool,
};
pub use store::{record_answer, ItemKey, MemoryStore, ReviewStore, TrackedItem, Versioned};
pub use types::{MasteryTier, Rating, ReviewState, SelfReport, DEFAULT_EASE_FACTOR};
pub use validation::validate;
