//! Scheduler configuration.
//!
//! Every constant the grading engine, classifier and due-queue use lives here
//! so it can be tuned without touching the algorithms. Stored as JSON; fields
//! left out of a document fall back to their defaults.

use std::fs;
use std::path::Path;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::DEFAULT_EASE_FACTOR;

/// Tunable constants for scheduling, classification and reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Ease factor for items that have never been reviewed.
    pub initial_ease: f64,
    /// Hard floor for the ease factor.
    pub minimum_ease: f64,
    /// Ease subtracted on `Again`.
    pub lapse_ease_penalty: f64,
    /// Ease subtracted on `Hard`.
    pub hard_ease_penalty: f64,
    /// Ease added on `Easy`.
    pub easy_ease_bonus: f64,
    pub hard_interval_multiplier: f64,
    pub easy_interval_multiplier: f64,
    /// Interval after a lapse.
    pub lapse_interval_days: u32,
    /// Interval after the first successful repetition.
    pub graduating_interval_days: u32,
    /// Repetitions needed before an item leaves `Learning`.
    pub reviewing_min_repetitions: u32,
    /// Interval at which a reviewing item counts as mastered.
    pub mastered_interval_days: u32,
    pub due_soon_window_hours: u32,
    /// Attempts `record_answer` makes before giving up on a contended item.
    pub max_store_retries: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            initial_ease: DEFAULT_EASE_FACTOR,
            minimum_ease: 1.3,
            lapse_ease_penalty: 0.20,
            hard_ease_penalty: 0.15,
            easy_ease_bonus: 0.15,
            hard_interval_multiplier: 1.2,
            easy_interval_multiplier: 1.3,
            lapse_interval_days: 1,
            graduating_interval_days: 1,
            reviewing_min_repetitions: 2,
            mastered_interval_days: 21,
            due_soon_window_hours: 24,
            max_store_retries: 5,
        }
    }
}

impl SchedulerConfig {
    /// Parse a JSON document and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Width of the "due soon" window.
    pub fn due_soon_window(&self) -> Duration {
        Duration::hours(i64::from(self.due_soon_window_hours))
    }

    /// Reject tunables that would break the scheduler's invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
            ConfigError::Invalid {
                field,
                reason: reason.into(),
            }
        }

        let finite = [
            ("initial_ease", self.initial_ease),
            ("minimum_ease", self.minimum_ease),
            ("lapse_ease_penalty", self.lapse_ease_penalty),
            ("hard_ease_penalty", self.hard_ease_penalty),
            ("easy_ease_bonus", self.easy_ease_bonus),
            ("hard_interval_multiplier", self.hard_interval_multiplier),
            ("easy_interval_multiplier", self.easy_interval_multiplier),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(invalid(field, "must be a finite number"));
            }
        }

        // Intervals only grow on success if every multiplier is at least 1.
        if self.minimum_ease < 1.0 {
            return Err(invalid("minimum_ease", "must be at least 1.0"));
        }
        if self.initial_ease < self.minimum_ease {
            return Err(invalid(
                "initial_ease",
                format!("must not be below minimum_ease ({})", self.minimum_ease),
            ));
        }
        for (field, value) in [
            ("lapse_ease_penalty", self.lapse_ease_penalty),
            ("hard_ease_penalty", self.hard_ease_penalty),
            ("easy_ease_bonus", self.easy_ease_bonus),
        ] {
            if value < 0.0 {
                return Err(invalid(field, "must not be negative"));
            }
        }
        for (field, value) in [
            ("hard_interval_multiplier", self.hard_interval_multiplier),
            ("easy_interval_multiplier", self.easy_interval_multiplier),
        ] {
            if value < 1.0 {
                return Err(invalid(field, "must be at least 1.0"));
            }
        }
        for (field, value) in [
            ("lapse_interval_days", self.lapse_interval_days),
            ("graduating_interval_days", self.graduating_interval_days),
            ("reviewing_min_repetitions", self.reviewing_min_repetitions),
            ("mastered_interval_days", self.mastered_interval_days),
            ("max_store_retries", self.max_store_retries),
        ] {
            if value == 0 {
                return Err(invalid(field, "must be greater than zero"));
            }
        }

        Ok(())
    }
}
