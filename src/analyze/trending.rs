// src/analyze/trending.rs
//! Threshold filter + ranking over scored items.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;

use crate::ingest::types::NewsItem;

pub const DEFAULT_CONTROVERSY_THRESHOLD: f64 = 0.7;

/// Secondary sort key. An absent timestamp maps to the minimum instant, so
/// undated items rank last among equal scores.
fn published_or_min(item: &NewsItem) -> DateTime<Utc> {
    item.published_at.unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Total order: descending by `(score, published_at)`. Items without a score
/// compare as 0.0 (the selector normally only sees scored items).
pub fn rank_cmp(a: &NewsItem, b: &NewsItem) -> Ordering {
    let sa = a.controversy_score.unwrap_or(0.0);
    let sb = b.controversy_score.unwrap_or(0.0);
    sb.total_cmp(&sa)
        .then_with(|| published_or_min(b).cmp(&published_or_min(a)))
}

/// Keep items at or above the threshold (inclusive), ranked most-trending
/// first. The caller decides how many to act on; the bot takes the top one.
pub fn select_trending(scored: Vec<NewsItem>, threshold: f64) -> Vec<NewsItem> {
    let mut trending: Vec<NewsItem> = scored
        .into_iter()
        .filter(|item| item.controversy_score.unwrap_or(0.0) >= threshold)
        .collect();
    trending.sort_by(rank_cmp);
    trending
}
