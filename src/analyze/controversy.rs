// src/analyze/controversy.rs
//! Keyword-based controversy estimation.
//!
//! Deliberately plain substring containment over the lowercased
//! `title + " " + summary`: no stemming, no word boundaries, so "warning"
//! scores via "war". The lexicon and increments are part of the behavioral
//! contract and compiled in.

use crate::ingest::types::NewsItem;

/// Each hit adds 0.1 to the score.
pub const CONTROVERSIAL_KEYWORDS: [&str; 29] = [
    "war",
    "conflict",
    "protest",
    "election",
    "scandal",
    "corruption",
    "violence",
    "controversy",
    "debate",
    "crisis",
    "crackdown",
    "ban",
    "protesters",
    "unrest",
    "tension",
    "accusation",
    "dispute",
    "disagreement",
    "terrorism",
    "shootings",
    "riots",
    "militants",
    "dictator",
    "authoritarian",
    "censorship",
    "human rights",
    "freedom",
    "opposition",
    "repression",
];

/// High-impact subset; each hit adds a further 0.2.
pub const HIGH_IMPACT_KEYWORDS: [&str; 7] = [
    "war",
    "terrorism",
    "crisis",
    "scandal",
    "corruption",
    "shootings",
    "riots",
];

/// Pure scoring function. Result is always within [0, 1].
pub fn controversy_score(title: &str, summary: &str) -> f64 {
    let text = format!("{} {}", title, summary).to_lowercase();
    let mut score = 0.0_f64;

    for keyword in CONTROVERSIAL_KEYWORDS {
        if text.contains(keyword) {
            score += 0.1;
        }
    }
    for keyword in HIGH_IMPACT_KEYWORDS {
        if text.contains(keyword) {
            score += 0.2;
        }
    }

    score.clamp(0.0, 1.0)
}

/// Attach a score to every item. Only this step mutates items once they are
/// past normalization.
pub fn score_items(items: Vec<NewsItem>) -> Vec<NewsItem> {
    items
        .into_iter()
        .map(|mut item| {
            item.controversy_score = Some(controversy_score(&item.title, &item.summary));
            item
        })
        .collect()
}
