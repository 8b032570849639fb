//! Aggregate statistics and study pool recommendation.
//!
//! Tiers are always recomputed with the classifier. The cached `mastery_tier`
//! may be stale or missing on records loaded from storage.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::SchedulerConfig;
use crate::mastery::{classify_with, MasteryThresholds};
use crate::types::{MasteryTier, ReviewState};

/// Per-user summary over a snapshot of review states.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateStats {
    /// Always holds an entry for every tier.
    pub counts_by_tier: BTreeMap<MasteryTier, usize>,
    pub total_items: usize,
    pub reviewed_items: usize,
    pub average_ease: f64,
    pub average_interval: f64,
}

impl AggregateStats {
    pub fn count(&self, tier: MasteryTier) -> usize {
        self.counts_by_tier.get(&tier).copied().unwrap_or(0)
    }
}

/// Aggregate with the default config.
pub fn aggregate<T: AsRef<ReviewState>>(items: &[T]) -> AggregateStats {
    aggregate_with(items, &SchedulerConfig::default())
}

/// Count items per tier and average ease and interval over reviewed items.
///
/// With nothing reviewed the averages fall back to the initial ease and 0.
pub fn aggregate_with<T: AsRef<ReviewState>>(
    items: &[T],
    config: &SchedulerConfig,
) -> AggregateStats {
    let thresholds = MasteryThresholds::from(config);
    let mut counts_by_tier: BTreeMap<MasteryTier, usize> =
        MasteryTier::ALL.iter().map(|&tier| (tier, 0)).collect();
    let mut reviewed = 0usize;
    let mut ease_sum = 0.0;
    let mut interval_sum = 0.0;

    for item in items {
        let state: &ReviewState = item.as_ref();
        *counts_by_tier
            .entry(classify_with(state, &thresholds))
            .or_insert(0) += 1;
        if state.due_at.is_some() {
            reviewed += 1;
            ease_sum += state.ease_factor;
            interval_sum += f64::from(state.interval_days);
        }
    }

    let (average_ease, average_interval) = if reviewed == 0 {
        (config.initial_ease, 0.0)
    } else {
        (ease_sum / reviewed as f64, interval_sum / reviewed as f64)
    };

    AggregateStats {
        counts_by_tier,
        total_items: items.len(),
        reviewed_items: reviewed,
        average_ease,
        average_interval,
    }
}

/// The tier worth studying next, with its items.
#[derive(Debug)]
pub struct StudyPool<'a, T> {
    pub tier: MasteryTier,
    /// Due pools are most overdue first; the new pool keeps input order;
    /// the maintenance pool is soonest due first.
    pub items: Vec<&'a T>,
}

/// Recommend which tier to study next.
///
/// Due learning items come first, then due reviewing items, then unseen
/// items. With nothing urgent the answer is light maintenance of mastered items.
pub fn recommend_pool<T: AsRef<ReviewState>>(items: &[T], now: DateTime<Utc>) -> MasteryTier {
    study_pool(items, now).tier
}

/// Like [`recommend_pool`], also returning the items in the recommended pool.
pub fn study_pool<T: AsRef<ReviewState>>(items: &[T], now: DateTime<Utc>) -> StudyPool<'_, T> {
    study_pool_with(items, now, &SchedulerConfig::default())
}

/// Study pool using the tier thresholds from `config`.
pub fn study_pool_with<'a, T: AsRef<ReviewState>>(
    items: &'a [T],
    now: DateTime<Utc>,
    config: &SchedulerConfig,
) -> StudyPool<'a, T> {
    let thresholds = MasteryThresholds::from(config);
    let in_tier = |tier: MasteryTier, due_only: bool| -> Vec<&'a T> {
        let mut selected: Vec<&'a T> = items
            .iter()
            .filter(|item| {
                let state: &ReviewState = (*item).as_ref();
                classify_with(state, &thresholds) == tier && (!due_only || state.is_due(now))
            })
            .collect();
        // None sorts first, so unscheduled items keep input order.
        selected.sort_by_key(|item| AsRef::<ReviewState>::as_ref(*item).due_at);
        selected
    };

    for tier in [MasteryTier::Learning, MasteryTier::Reviewing] {
        let due = in_tier(tier, true);
        if !due.is_empty() {
            return StudyPool { tier, items: due };
        }
    }

    let fresh = in_tier(MasteryTier::New, false);
    if !fresh.is_empty() {
        return StudyPool {
            tier: MasteryTier::New,
            items: fresh,
        };
    }

    StudyPool {
        tier: MasteryTier::Mastered,
        items: in_tier(MasteryTier::Mastered, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 11, 2, 20, 15, 0).unwrap()
    }

    /// A state whose fields classify as `tier`.
    fn item(tier: MasteryTier, due_in: Option<Duration>, ease: f64, interval: u32) -> ReviewState {
        let (repetitions, lapses) = match tier {
            MasteryTier::New => (0, 0),
            MasteryTier::Learning => (0, 1),
            MasteryTier::Reviewing => (3, 0),
            MasteryTier::Mastered => (5, 0),
        };
        let state = ReviewState {
            ease_factor: ease,
            interval_days: interval,
            repetitions,
            lapses,
            due_at: due_in.map(|d| now() + d),
            mastery_tier: tier,
            ..Default::default()
        };
        assert_eq!(crate::mastery::classify(&state), tier);
        state
    }

    fn new_item() -> ReviewState {
        ReviewState::default()
    }

    #[test]
    fn aggregate_of_nothing_uses_defaults() {
        let items: Vec<ReviewState> = Vec::new();
        let stats = aggregate(&items);
        assert_eq!(
            stats,
            AggregateStats {
                counts_by_tier: MasteryTier::ALL.iter().map(|&t| (t, 0)).collect(),
                total_items: 0,
                reviewed_items: 0,
                average_ease: 2.5,
                average_interval: 0.0,
            }
        );
    }

    #[test]
    fn aggregate_of_only_new_items_uses_defaults() {
        let stats = aggregate(&[new_item(), new_item()]);
        assert_eq!(stats.count(MasteryTier::New), 2);
        assert_eq!(stats.average_ease, 2.5);
        assert_eq!(stats.average_interval, 0.0);
    }

    #[test]
    fn averages_skip_unreviewed_items() {
        let items = vec![
            new_item(),
            item(MasteryTier::Reviewing, Some(Duration::days(2)), 2.0, 4),
            item(MasteryTier::Mastered, Some(Duration::days(30)), 3.0, 40),
        ];
        let stats = aggregate(&items);
        assert_eq!(stats.total_items, 3);
        assert_eq!(stats.reviewed_items, 2);
        assert_eq!(stats.average_ease, 2.5);
        assert_eq!(stats.average_interval, 22.0);
        assert_eq!(stats.count(MasteryTier::New), 1);
        assert_eq!(stats.count(MasteryTier::Learning), 0);
        assert_eq!(stats.count(MasteryTier::Reviewing), 1);
        assert_eq!(stats.count(MasteryTier::Mastered), 1);
    }

    #[test]
    fn aggregate_default_ease_follows_config() {
        let config = SchedulerConfig {
            initial_ease: 2.2,
            ..Default::default()
        };
        let items: Vec<ReviewState> = Vec::new();
        assert_eq!(aggregate_with(&items, &config).average_ease, 2.2);
    }

    #[test]
    fn stats_serialize_tier_keys_as_names() {
        let items: Vec<ReviewState> = Vec::new();
        let json = serde_json::to_value(aggregate(&items)).unwrap();
        assert_eq!(json["counts_by_tier"]["mastered"], 0);
        assert_eq!(json["average_ease"], 2.5);
    }

    #[test]
    fn due_learning_wins() {
        let items = vec![
            item(MasteryTier::Reviewing, Some(-Duration::days(4)), 2.5, 6),
            item(MasteryTier::Learning, Some(-Duration::hours(1)), 2.3, 1),
            new_item(),
        ];
        assert_eq!(recommend_pool(&items, now()), MasteryTier::Learning);
    }

    #[test]
    fn learning_not_yet_due_does_not_count() {
        let items = vec![
            item(MasteryTier::Learning, Some(Duration::hours(3)), 2.3, 1),
            item(MasteryTier::Reviewing, Some(-Duration::days(1)), 2.5, 6),
        ];
        assert_eq!(recommend_pool(&items, now()), MasteryTier::Reviewing);
    }

    #[test]
    fn new_when_nothing_due() {
        let items = vec![
            item(MasteryTier::Reviewing, Some(Duration::days(2)), 2.5, 6),
            new_item(),
        ];
        assert_eq!(recommend_pool(&items, now()), MasteryTier::New);
    }

    #[test]
    fn mastered_when_nothing_urgent() {
        let items = vec![
            item(MasteryTier::Mastered, Some(Duration::days(60)), 2.9, 80),
            item(MasteryTier::Learning, Some(Duration::hours(5)), 2.3, 1),
        ];
        assert_eq!(recommend_pool(&items, now()), MasteryTier::Mastered);
        let items: Vec<ReviewState> = Vec::new();
        assert_eq!(recommend_pool(&items, now()), MasteryTier::Mastered);
    }

    #[test]
    fn due_mastered_items_do_not_outrank_new() {
        let items = vec![
            item(MasteryTier::Mastered, Some(-Duration::days(9)), 2.9, 80),
            new_item(),
        ];
        assert_eq!(recommend_pool(&items, now()), MasteryTier::New);
    }

    #[test]
    fn pool_items_most_overdue_first() {
        let items = vec![
            item(MasteryTier::Reviewing, Some(-Duration::hours(1)), 2.5, 6),
            item(MasteryTier::Reviewing, Some(-Duration::days(2)), 2.5, 6),
            item(MasteryTier::Reviewing, Some(Duration::days(2)), 2.5, 6),
        ];
        let pool = study_pool(&items, now());
        assert_eq!(pool.tier, MasteryTier::Reviewing);
        assert_eq!(pool.items.len(), 2);
        assert!(std::ptr::eq(pool.items[0], &items[1]));
        assert!(std::ptr::eq(pool.items[1], &items[0]));
    }

    #[test]
    fn record_without_cached_tier_is_classified() {
        let json = r#"{
            "ease_factor": 2.3,
            "interval_days": 1,
            "repetitions": 0,
            "lapses": 1,
            "due_at": "2024-01-02T00:00:00Z",
            "last_reviewed_at": "2024-01-01T00:00:00Z"
        }"#;
        let state: ReviewState = serde_json::from_str(json).unwrap();
        assert_eq!(state.mastery_tier, MasteryTier::New);

        let items = vec![state];
        let at = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();
        let stats = aggregate(&items);
        assert_eq!(stats.count(MasteryTier::New), 0);
        assert_eq!(stats.count(MasteryTier::Learning), 1);
        assert_eq!(recommend_pool(&items, at), MasteryTier::Learning);
        assert_eq!(study_pool(&items, at).items.len(), 1);
    }

    #[test]
    fn stale_cached_tier_is_ignored() {
        let mut stale = item(MasteryTier::Mastered, Some(Duration::days(10)), 2.8, 45);
        stale.mastery_tier = MasteryTier::Reviewing;
        let stats = aggregate(&[stale]);
        assert_eq!(stats.count(MasteryTier::Mastered), 1);
        assert_eq!(stats.count(MasteryTier::Reviewing), 0);
    }

    #[test]
    fn pool_thresholds_follow_config() {
        let config = SchedulerConfig {
            mastered_interval_days: 5,
            ..Default::default()
        };
        let items = vec![item(MasteryTier::Reviewing, Some(-Duration::days(1)), 2.5, 6)];
        assert_eq!(recommend_pool(&items, now()), MasteryTier::Reviewing);
        // Under a 5 day threshold the item is mastered, and mastered items are
        // only maintenance.
        assert_eq!(study_pool_with(&items, now(), &config).tier, MasteryTier::Mastered);
    }
}
