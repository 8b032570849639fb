//! Due-queue partitioning.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::config::SchedulerConfig;
use crate::types::ReviewState;

/// Items split by when they become due.
///
/// The three lists are disjoint and together hold every input item once.
#[derive(Debug)]
pub struct DuePartition<'a, T> {
    /// Due at or before `now`, most overdue first.
    pub due_now: Vec<&'a T>,
    /// Due within the window after `now`, soonest first.
    pub due_soon: Vec<&'a T>,
    /// Everything else in input order, including never-scheduled items.
    pub not_due: Vec<&'a T>,
}

/// Per-bucket counts for dashboard badges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DueCounts {
    pub due_now: usize,
    pub due_soon: usize,
    pub not_due: usize,
}

impl<'a, T> DuePartition<'a, T> {
    pub fn counts(&self) -> DueCounts {
        DueCounts {
            due_now: self.due_now.len(),
            due_soon: self.due_soon.len(),
            not_due: self.not_due.len(),
        }
    }

    /// Total number of partitioned items.
    pub fn len(&self) -> usize {
        self.due_now.len() + self.due_soon.len() + self.not_due.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partition items with the default 24 hour "due soon" window.
pub fn partition<T: AsRef<ReviewState>>(items: &[T], now: DateTime<Utc>) -> DuePartition<'_, T> {
    partition_within(items, now, SchedulerConfig::default().due_soon_window())
}

/// Partition items into due now, due within `window` of `now`, and the rest.
pub fn partition_within<T: AsRef<ReviewState>>(
    items: &[T],
    now: DateTime<Utc>,
    window: Duration,
) -> DuePartition<'_, T> {
    let soon_until = now.checked_add_signed(window).unwrap_or(DateTime::<Utc>::MAX_UTC);

    let mut due_now = Vec::new();
    let mut due_soon = Vec::new();
    let mut not_due = Vec::new();

    for item in items {
        match AsRef::<ReviewState>::as_ref(item).due_at {
            Some(due) if due <= now => due_now.push(item),
            Some(due) if due <= soon_until => due_soon.push(item),
            _ => not_due.push(item),
        }
    }

    // Stable, so equally overdue items keep their input order.
    due_now.sort_by_key(|item| due_of(*item));
    due_soon.sort_by_key(|item| due_of(*item));

    DuePartition {
        due_now,
        due_soon,
        not_due,
    }
}

fn due_of<T: AsRef<ReviewState>>(item: &T) -> Option<DateTime<Utc>> {
    item.as_ref().due_at
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 14, 7, 0, 0).unwrap()
    }

    fn due(offset: Duration) -> ReviewState {
        ReviewState {
            due_at: Some(now() + offset),
            ..Default::default()
        }
    }

    #[test]
    fn empty_input() {
        let items: Vec<ReviewState> = Vec::new();
        let parts = partition(&items, now());
        assert!(parts.is_empty());
        assert_eq!(parts.counts(), DueCounts::default());
    }

    #[test]
    fn boundaries_are_inclusive_on_the_right() {
        let items = vec![
            due(Duration::zero()),
            due(Duration::seconds(1)),
            due(Duration::hours(24)),
            due(Duration::hours(24) + Duration::seconds(1)),
        ];
        let parts = partition(&items, now());
        assert_eq!(
            parts.counts(),
            DueCounts {
                due_now: 1,
                due_soon: 2,
                not_due: 1
            }
        );
        assert!(std::ptr::eq(parts.due_now[0], &items[0]));
        assert!(std::ptr::eq(parts.not_due[0], &items[3]));
    }

    #[test]
    fn never_scheduled_items_are_not_due() {
        let items = vec![ReviewState::default()];
        let parts = partition(&items, now());
        assert_eq!(parts.not_due.len(), 1);
    }

    #[test]
    fn most_overdue_first() {
        let items = vec![
            due(-Duration::hours(2)),
            due(-Duration::days(3)),
            due(-Duration::minutes(5)),
            due(-Duration::days(3)),
        ];
        let parts = partition(&items, now());
        let order: Vec<*const ReviewState> =
            parts.due_now.iter().map(|s| *s as *const _).collect();
        let expected: Vec<*const ReviewState> = [1, 3, 0, 2]
            .iter()
            .map(|&i| &items[i] as *const _)
            .collect();
        assert_eq!(order, expected);
    }

    #[test]
    fn due_soon_sorted_by_due_date() {
        let items = vec![due(Duration::hours(20)), due(Duration::hours(3))];
        let parts = partition(&items, now());
        assert_eq!(parts.due_soon[0].due_at, Some(now() + Duration::hours(3)));
        assert_eq!(parts.due_soon[1].due_at, Some(now() + Duration::hours(20)));
    }

    #[test]
    fn custom_window() {
        let items = vec![due(Duration::hours(30))];
        assert_eq!(partition(&items, now()).counts().not_due, 1);
        assert_eq!(
            partition_within(&items, now(), Duration::hours(48)).counts().due_soon,
            1
        );
    }

    #[test]
    fn every_item_lands_in_exactly_one_bucket() {
        let offsets = [-72, -24, -1, 0, 1, 12, 24, 25, 200];
        let mut items: Vec<ReviewState> = offsets
            .iter()
            .map(|&h| due(Duration::hours(h)))
            .collect();
        items.push(ReviewState::default());

        for reference in [-48i64, 0, 6, 30] {
            let at = now() + Duration::hours(reference);
            let parts = partition(&items, at);
            assert_eq!(parts.len(), items.len());

            let mut seen = vec![0usize; items.len()];
            for bucket in [&parts.due_now, &parts.due_soon, &parts.not_due] {
                for item in bucket {
                    let index = items.iter().position(|s| std::ptr::eq(s, *item)).unwrap();
                    seen[index] += 1;
                }
            }
            assert!(seen.iter().all(|&n| n == 1));
        }
    }
}
