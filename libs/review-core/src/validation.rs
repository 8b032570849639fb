//! Review state validation.
//!
//! Every state the grading engine returns passes through [`validate`], so a
//! state that breaks an invariant never reaches the caller's store.

use chrono::{DateTime, Duration, Utc};

use crate::config::SchedulerConfig;
use crate::error::{Result, ValidationError};
use crate::mastery::{classify_with, MasteryThresholds};
use crate::types::ReviewState;

/// Validate a state, including its cached mastery tier.
pub fn validate(state: ReviewState, config: &SchedulerConfig) -> Result<ReviewState> {
    check_fields(&state, config.minimum_ease)?;

    let expected = classify_with(&state, &MasteryThresholds::from(config));
    if state.mastery_tier != expected {
        return Err(ValidationError::TierMismatch {
            stored: state.mastery_tier,
            expected,
        });
    }

    Ok(state)
}

/// Validate the scheduling fields of a state, leaving the cached tier alone.
///
/// Used on grading input: the tier is recomputed on the way out, so a stale
/// cache (for example after a threshold change) is not a caller bug.
pub fn check_fields(state: &ReviewState, minimum_ease: f64) -> Result<()> {
    if !state.ease_factor.is_finite() {
        return Err(ValidationError::NonFiniteEase);
    }
    if state.ease_factor < minimum_ease {
        return Err(ValidationError::EaseBelowFloor {
            ease_factor: state.ease_factor,
            floor: minimum_ease,
        });
    }

    match (state.last_reviewed_at, state.due_at) {
        (None, None) => {
            if state.interval_days != 0 {
                return Err(ValidationError::IntervalOnNewItem {
                    interval_days: state.interval_days,
                });
            }
            if state.repetitions != 0 || state.lapses != 0 {
                return Err(ValidationError::HistoryOnNewItem {
                    repetitions: state.repetitions,
                    lapses: state.lapses,
                });
            }
        }
        (None, Some(_)) => return Err(ValidationError::MissingLastReviewed),
        (Some(_), None) => return Err(ValidationError::MissingDue),
        (Some(last), Some(actual)) => {
            if state.interval_days == 0 {
                return Err(ValidationError::ZeroIntervalAfterReview);
            }
            let expected = due_after(last, state.interval_days)?;
            if expected != actual {
                return Err(ValidationError::DueMismatch { expected, actual });
            }
        }
    }

    Ok(())
}

/// Check the fields that must never move backwards between two states.
pub fn check_transition(before: &ReviewState, after: &ReviewState) -> Result<()> {
    if after.lapses < before.lapses {
        return Err(ValidationError::LapsesDecreased {
            before: before.lapses,
            after: after.lapses,
        });
    }
    Ok(())
}

/// Instant an item reviewed at `reviewed_at` becomes due again.
pub(crate) fn due_after(reviewed_at: DateTime<Utc>, interval_days: u32) -> Result<DateTime<Utc>> {
    Duration::try_days(i64::from(interval_days))
        .and_then(|interval| reviewed_at.checked_add_signed(interval))
        .ok_or(ValidationError::ScheduleOverflow { interval_days })
}
