// src/content/policy.rs
//! Output policies shared by every source: visibility filter, day-of-year
//! rotation, text truncation and the activity cap.

use chrono::{Datelike, NaiveDate};

use crate::content::types::{ActivityItem, ActivityKind};

pub const ELLIPSIS: &str = "...";
pub const DEFAULT_TRUNCATE_CHARS: usize = 250;
pub const DEFAULT_MAX_ITEMS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityPolicy {
    pub truncate_chars: usize,
    pub max_items: usize,
}

impl Default for ActivityPolicy {
    fn default() -> Self {
        Self {
            truncate_chars: DEFAULT_TRUNCATE_CHARS,
            max_items: DEFAULT_MAX_ITEMS,
        }
    }
}

impl ActivityPolicy {
    /// Filter, cap, then truncate. Order matters: hidden reposts must not
    /// take a slot from a visible item.
    pub fn apply(&self, items: Vec<ActivityItem>) -> Vec<ActivityItem> {
        filter_visible(items)
            .into_iter()
            .take(self.item_limit())
            .map(|mut it| {
                it.content = truncate_content(&it.content, self.truncate_chars);
                it
            })
            .collect()
    }

    /// Never more than `DEFAULT_MAX_ITEMS`, whatever the configuration says.
    pub fn item_limit(&self) -> usize {
        self.max_items.min(DEFAULT_MAX_ITEMS)
    }
}

/// A bare repost (no comment of our own) is not shown.
pub fn is_visible(item: &ActivityItem) -> bool {
    !(item.kind == ActivityKind::Repost && !item.has_comment)
}

pub fn filter_visible(items: Vec<ActivityItem>) -> Vec<ActivityItem> {
    items.into_iter().filter(is_visible).collect()
}

/// Cut to `budget` characters and append the ellipsis, only when the text is longer.
pub fn truncate_content(s: &str, budget: usize) -> String {
    if s.chars().count() <= budget {
        return s.to_string();
    }
    let mut out: String = s.chars().take(budget).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Day-of-year (1-based) modulo the set size. Stable for a calendar day.
pub fn rotation_index(today: NaiveDate, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(today.ordinal() as usize % len)
}

pub fn rotate<T>(items: &[T], today: NaiveDate) -> Option<&T> {
    rotation_index(today, items.len()).map(|i| &items[i])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn item(id: &str, kind: ActivityKind, has_comment: bool) -> ActivityItem {
        ActivityItem {
            id: id.into(),
            content: format!("content {id}"),
            kind,
            date: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            has_comment,
        }
    }

    #[test]
    fn bare_reposts_are_dropped_commented_ones_kept() {
        let items = vec![
            item("1", ActivityKind::Post, false),
            item("2", ActivityKind::Repost, false),
            item("3", ActivityKind::Repost, true),
            item("4", ActivityKind::Comment, false),
        ];
        let ids: Vec<_> = filter_visible(items).into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["1", "3", "4"]);
    }

    #[test]
    fn truncation_only_when_over_budget() {
        assert_eq!(truncate_content("short", 10), "short");
        assert_eq!(truncate_content("exactly10!", 10), "exactly10!");
        assert_eq!(truncate_content("eleven chars", 10), "eleven cha...");
        assert_eq!(truncate_content("", 10), "");
    }

    #[test]
    fn truncation_counts_chars_not_bytes() {
        let s = "🚀".repeat(12);
        let out = truncate_content(&s, 10);
        assert_eq!(out.chars().count(), 13);
        assert!(out.ends_with(ELLIPSIS));
    }

    #[test]
    fn long_content_is_budget_plus_marker() {
        let mut rng = rand::rng();
        for _ in 0..50 {
            let len = rng.random_range(251..800);
            let s: String = (0..len).map(|_| rng.random_range('a'..='z')).collect();
            let out = truncate_content(&s, DEFAULT_TRUNCATE_CHARS);
            assert!(out.ends_with(ELLIPSIS));
            assert_eq!(out.chars().count(), DEFAULT_TRUNCATE_CHARS + ELLIPSIS.len());
            assert!(s.starts_with(&out[..DEFAULT_TRUNCATE_CHARS]));
        }
    }

    #[test]
    fn apply_caps_after_filtering() {
        let items = vec![
            item("1", ActivityKind::Repost, false),
            item("2", ActivityKind::Post, true),
            item("3", ActivityKind::Repost, false),
            item("4", ActivityKind::Article, true),
            item("5", ActivityKind::Post, true),
            item("6", ActivityKind::Post, true),
        ];
        let out = ActivityPolicy::default().apply(items);
        let ids: Vec<_> = out.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "4", "5"]);
    }

    #[test]
    fn configured_cap_above_three_is_clamped() {
        let items: Vec<_> = (1..=6)
            .map(|i| item(&i.to_string(), ActivityKind::Post, true))
            .collect();
        let policy = ActivityPolicy {
            max_items: 5,
            ..ActivityPolicy::default()
        };
        assert_eq!(policy.apply(items.clone()).len(), 3);

        let tighter = ActivityPolicy {
            max_items: 2,
            ..ActivityPolicy::default()
        };
        assert_eq!(tighter.apply(items).len(), 2);
    }

    #[test]
    fn rotation_is_stable_within_a_day_and_moves_daily() {
        let pool = ["a", "b", "c"];
        let d1 = NaiveDate::from_ymd_opt(2025, 9, 15).unwrap();
        let d2 = d1.succ_opt().unwrap();
        assert_eq!(rotate(&pool, d1), rotate(&pool, d1));
        assert_ne!(rotate(&pool, d1), rotate(&pool, d2));
        // Sep 15 2025 is day 258; 258 % 3 == 0
        assert_eq!(rotate(&pool, d1), Some(&"a"));
    }

    #[test]
    fn rotation_of_empty_set_is_none() {
        let empty: [u8; 0] = [];
        assert_eq!(rotate(&empty, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()), None);
    }
}
