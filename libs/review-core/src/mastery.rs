//! Mastery tier classification.
//!
//! This is the only place a tier is decided. The grading engine stores the
//! result on [`ReviewState::mastery_tier`] as a cache for cheap filtering.

use crate::config::SchedulerConfig;
use crate::types::{MasteryTier, ReviewState};

/// Thresholds separating the tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasteryThresholds {
    pub reviewing_min_repetitions: u32,
    pub mastered_interval_days: u32,
}

impl Default for MasteryThresholds {
    fn default() -> Self {
        Self::from(&SchedulerConfig::default())
    }
}

impl From<&SchedulerConfig> for MasteryThresholds {
    fn from(config: &SchedulerConfig) -> Self {
        Self {
            reviewing_min_repetitions: config.reviewing_min_repetitions,
            mastered_interval_days: config.mastered_interval_days,
        }
    }
}

/// Classify a state with the default thresholds.
pub fn classify(state: &ReviewState) -> MasteryTier {
    classify_with(state, &MasteryThresholds::default())
}

/// Classify a state. Ignores the cached `mastery_tier`.
///
/// Rules, first match wins:
/// 1. never scheduled => `New`
/// 2. lapsed and not yet re-established => `Learning`
/// 3. established with a short interval => `Reviewing`
/// 4. established with a long interval => `Mastered`
/// 5. anything else (first successful repetitions) => `Learning`
pub fn classify_with(state: &ReviewState, thresholds: &MasteryThresholds) -> MasteryTier {
    let established = state.repetitions >= thresholds.reviewing_min_repetitions;

    if state.due_at.is_none() {
        MasteryTier::New
    } else if state.lapses > 0 && !established {
        MasteryTier::Learning
    } else if established && state.interval_days < thresholds.mastered_interval_days {
        MasteryTier::Reviewing
    } else if established {
        MasteryTier::Mastered
    } else {
        MasteryTier::Learning
    }
}

/// Return the state with its cached tier recomputed.
pub fn reclassify(mut state: ReviewState, thresholds: &MasteryThresholds) -> ReviewState {
    state.mastery_tier = classify_with(&state, thresholds);
    state
}
