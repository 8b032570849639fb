//! Spaced repetition grading.

pub mod sm2;

use crate::error::Result;
use crate::types::{Rating, ReviewState};
use chrono::{DateTime, Utc};

pub use sm2::Sm2;

/// Result of scheduling an item after review.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulingResult {
    pub new_state: ReviewState,
    pub next_due: DateTime<Utc>,
}

/// Trait for spaced repetition algorithms.
///
/// Implementations are pure: no I/O, no clock. The caller passes `now`.
pub trait SpacedRepetitionAlgorithm: Send + Sync {
    /// Algorithm identifier.
    fn name(&self) -> &'static str;

    /// Calculate the next review state after a graded review.
    ///
    /// Both the input and the output are validated; an error means nothing
    /// should be persisted.
    fn schedule(
        &self,
        state: &ReviewState,
        rating: Rating,
        now: DateTime<Utc>,
    ) -> Result<SchedulingResult>;

    /// Initial state for an item that has never been reviewed.
    fn initial_state(&self) -> ReviewState;
}

/// Grade a review with the default SM-2 configuration.
pub fn next_state(
    current: &ReviewState,
    rating: Rating,
    now: DateTime<Utc>,
) -> Result<ReviewState> {
    Sm2::default()
        .schedule(current, rating, now)
        .map(|result| result.new_state)
}

/// Round to the nearest whole day, halves rounding up.
///
/// Saturates at `u32::MAX`; negative and NaN inputs give 0.
pub fn round_half_up(days: f64) -> u32 {
    (days + 0.5).floor() as u32
}
