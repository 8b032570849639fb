//! SM-2 spaced repetition algorithm.
//!
//! SuperMemo 2 variant with a four-button rating and configurable constants.
//! Every interval is a whole number of days, rounded half up.

use super::{round_half_up, SchedulingResult, SpacedRepetitionAlgorithm};
use crate::config::SchedulerConfig;
use crate::error::{ConfigError, Result};
use crate::mastery::{reclassify, MasteryThresholds};
use crate::types::{MasteryTier, Rating, ReviewState};
use crate::validation::{check_fields, check_transition, due_after, validate};
use chrono::{DateTime, Utc};

/// SM-2 algorithm with configurable parameters.
#[derive(Debug, Clone, Default)]
pub struct Sm2 {
    config: SchedulerConfig,
}

impl Sm2 {
    /// Build a scheduler from a config, rejecting invalid tunables.
    pub fn new(config: SchedulerConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Fold a review history through the scheduler.
    pub fn replay<I>(&self, initial: ReviewState, reviews: I) -> Result<ReviewState>
    where
        I: IntoIterator<Item = (Rating, DateTime<Utc>)>,
    {
        reviews
            .into_iter()
            .try_fold(initial, |state, (rating, now)| {
                self.schedule(&state, rating, now).map(|r| r.new_state)
            })
    }

    fn floor(&self, ease: f64) -> f64 {
        ease.max(self.config.minimum_ease)
    }

    /// Returns (repetitions, lapses, interval_days, ease_factor).
    fn transition(&self, state: &ReviewState, rating: Rating) -> (u32, u32, u32, f64) {
        let c = &self.config;
        let interval = f64::from(state.interval_days);

        match rating {
            Rating::Again => (
                0,
                state.lapses.saturating_add(1),
                c.lapse_interval_days,
                self.floor(state.ease_factor - c.lapse_ease_penalty),
            ),
            Rating::Hard => {
                let days = if state.repetitions == 0 {
                    c.graduating_interval_days
                } else {
                    round_half_up(interval * c.hard_interval_multiplier).max(1)
                };
                (
                    state.repetitions.saturating_add(1),
                    state.lapses,
                    days,
                    self.floor(state.ease_factor - c.hard_ease_penalty),
                )
            }
            Rating::Good => {
                let repetitions = state.repetitions.saturating_add(1);
                let days = if repetitions == 1 {
                    c.graduating_interval_days
                } else {
                    round_half_up(interval * state.ease_factor).max(1)
                };
                (repetitions, state.lapses, days, state.ease_factor)
            }
            Rating::Easy => {
                // Fresh items grow from one day, never from zero.
                let days = round_half_up(
                    interval.max(1.0) * state.ease_factor * c.easy_interval_multiplier,
                )
                .max(1);
                (
                    state.repetitions.saturating_add(1),
                    state.lapses,
                    days,
                    self.floor(state.ease_factor + c.easy_ease_bonus),
                )
            }
        }
    }
}

impl SpacedRepetitionAlgorithm for Sm2 {
    fn name(&self) -> &'static str {
        "sm2"
    }

    fn initial_state(&self) -> ReviewState {
        ReviewState::new(self.config.initial_ease)
    }

    fn schedule(
        &self,
        state: &ReviewState,
        rating: Rating,
        now: DateTime<Utc>,
    ) -> Result<SchedulingResult> {
        if let Err(err) = check_fields(state, self.config.minimum_ease) {
            tracing::warn!(error = %err, "rejected review state before grading");
            return Err(err);
        }

        let (repetitions, lapses, interval_days, ease_factor) = self.transition(state, rating);
        let next_due = due_after(now, interval_days)?;

        let candidate = reclassify(
            ReviewState {
                ease_factor,
                interval_days,
                repetitions,
                lapses,
                due_at: Some(next_due),
                last_reviewed_at: Some(now),
                mastery_tier: MasteryTier::New,
            },
            &MasteryThresholds::from(&self.config),
        );

        let new_state = check_transition(state, &candidate)
            .and_then(|()| validate(candidate, &self.config))
            .map_err(|err| {
                tracing::warn!(error = %err, ?rating, "graded state failed validation");
                err
            })?;

        tracing::debug!(
            ?rating,
            interval_before = state.interval_days,
            interval_after = new_state.interval_days,
            ease_before = state.ease_factor,
            ease_after = new_state.ease_factor,
            tier = new_state.mastery_tier.as_str(),
            "scheduled review"
        );

        Ok(SchedulingResult {
            new_state,
            next_due,
        })
    }
}
