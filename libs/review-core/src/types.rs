//! Core types for the review scheduler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ease factor given to an item on creation.
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Coarse mastery bucket derived from a review state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MasteryTier {
    New,
    Learning,
    Reviewing,
    Mastered,
}

impl Default for MasteryTier {
    fn default() -> Self {
        Self::New
    }
}

impl MasteryTier {
    /// All tiers, least to most mastered.
    pub const ALL: [MasteryTier; 4] = [
        MasteryTier::New,
        MasteryTier::Learning,
        MasteryTier::Reviewing,
        MasteryTier::Mastered,
    ];

    /// Get the tier name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Learning => "learning",
            Self::Reviewing => "reviewing",
            Self::Mastered => "mastered",
        }
    }

    /// Parse from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(Self::New),
            "learning" => Some(Self::Learning),
            "reviewing" => Some(Self::Reviewing),
            "mastered" => Some(Self::Mastered),
            _ => None,
        }
    }
}

/// Difficulty the learner reported after answering correctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfReport {
    Hard,
    Easy,
}

/// Rating for a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Again,
    Hard,
    Good,
    Easy,
}

impl Rating {
    /// All ratings, in ascending order of recall quality.
    pub const ALL: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy];

    /// Convert to 4-point numeric value (1-4).
    pub fn to_value(self) -> u8 {
        match self {
            Self::Again => 1,
            Self::Hard => 2,
            Self::Good => 3,
            Self::Easy => 4,
        }
    }

    /// Create from 4-point numeric value.
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Again),
            2 => Some(Self::Hard),
            3 => Some(Self::Good),
            4 => Some(Self::Easy),
            _ => None,
        }
    }

    /// Map 2-point rating to 4-point.
    /// Wrong -> Again, Correct -> Good
    pub fn from_2point(correct: bool) -> Self {
        if correct { Self::Good } else { Self::Again }
    }

    /// Map an answer event to a rating.
    ///
    /// Incorrect answers are always `Again`, whatever the learner reported.
    /// Correct answers are `Good` unless flagged hard or easy.
    pub fn from_response(correct: bool, report: Option<SelfReport>) -> Self {
        match (correct, report) {
            (false, _) => Self::Again,
            (true, Some(SelfReport::Hard)) => Self::Hard,
            (true, Some(SelfReport::Easy)) => Self::Easy,
            (true, None) => Self::Good,
        }
    }
}

/// Scheduling state of one item for one user.
///
/// `mastery_tier` is a cache of [`crate::mastery::classify`] over the other
/// fields and is only ever written by the grading engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewState {
    pub ease_factor: f64,
    pub interval_days: u32,
    pub repetitions: u32,
    pub lapses: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reviewed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub mastery_tier: MasteryTier,
}

impl Default for ReviewState {
    fn default() -> Self {
        Self {
            ease_factor: DEFAULT_EASE_FACTOR,
            interval_days: 0,
            repetitions: 0,
            lapses: 0,
            due_at: None,
            last_reviewed_at: None,
            mastery_tier: MasteryTier::New,
        }
    }
}

impl ReviewState {
    /// Fresh state for an item that has never been scheduled.
    pub fn new(initial_ease: f64) -> Self {
        Self {
            ease_factor: initial_ease,
            ..Default::default()
        }
    }

    /// Whether the item has never been reviewed.
    pub fn is_new(&self) -> bool {
        self.due_at.is_none()
    }

    /// Whether the item is eligible for review at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.due_at.is_some_and(|due| due <= now)
    }
}

impl AsRef<ReviewState> for ReviewState {
    fn as_ref(&self) -> &ReviewState {
        self
    }
}
