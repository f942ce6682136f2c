// src/ingest/recency.rs
//! Age-window filter. Pure over an injected `now` so tests need no clock.

use chrono::{DateTime, Duration, Utc};

use crate::ingest::types::NewsItem;

/// Keep an item if it carries no timestamp (never dropped for age), or if its
/// age at `now` is within the window. The boundary is inclusive: an item that
/// is exactly `max_age_minutes` old is kept.
pub fn is_fresh(item: &NewsItem, now: DateTime<Utc>, max_age_minutes: i64) -> bool {
    match item.published_at {
        None => true,
        Some(ts) => now.signed_duration_since(ts) <= Duration::minutes(max_age_minutes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item_published(ts: Option<DateTime<Utc>>) -> NewsItem {
        NewsItem {
            title: "T".into(),
            summary: String::new(),
            link: String::new(),
            published_at: ts,
            source_id: "src".into(),
            controversy_score: None,
        }
    }

    #[test]
    fn no_date_items_are_always_kept() {
        let now = Utc::now();
        assert!(is_fresh(&item_published(None), now, 15));
    }

    #[test]
    fn boundary_is_inclusive() {
        let now = Utc::now();
        let exactly = item_published(Some(now - Duration::minutes(15)));
        assert!(is_fresh(&exactly, now, 15));

        let one_second_over = item_published(Some(now - Duration::minutes(15) - Duration::seconds(1)));
        assert!(!is_fresh(&one_second_over, now, 15));
    }

    #[test]
    fn recent_kept_stale_dropped() {
        let now = Utc::now();
        assert!(is_fresh(&item_published(Some(now - Duration::minutes(1))), now, 15));
        assert!(!is_fresh(&item_published(Some(now - Duration::hours(2))), now, 15));
    }
}
