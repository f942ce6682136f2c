// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// One loosely-structured entry as it came out of a feed document.
///
/// Field names are canonical lowercase keys (`title`, `summary`, `description`,
/// `link`, `guid`, `published`, `updated`). The normalizer resolves each logical
/// field through an ordered list of candidate keys, so the fallback chains live
/// in one place instead of being scattered over ad-hoc lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    fields: BTreeMap<String, String>,
}

impl RawEntry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a field. Empty and whitespace-only values are treated as absent.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if !value.trim().is_empty() {
            self.fields.insert(key.to_string(), value);
        }
    }

    /// Store a field if the source provided one.
    pub fn set_opt(&mut self, key: &str, value: Option<String>) {
        if let Some(v) = value {
            self.set(key, v);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Resolve a logical field through an ordered candidate-key list.
    pub fn first_of(&self, candidates: &[&str]) -> Option<&str> {
        candidates.iter().find_map(|k| self.get(k))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// One normalized news item. Value object: built by the normalizer, enriched
/// with `controversy_score` by the scorer, read-only afterwards, and discarded
/// at the end of the pipeline run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub summary: String,
    pub link: String,
    /// Absent when the feed provided no timestamp or it failed to parse.
    pub published_at: Option<DateTime<Utc>>,
    /// URL of the feed this item came from.
    pub source_id: String,
    /// Attached by the scorer; always within [0, 1] when present.
    pub controversy_score: Option<f64>,
}

/// One configured feed source. The orchestrator only needs "raw entries out";
/// tests swap in fixture-backed or failing implementations.
#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_entries(&self) -> Result<Vec<RawEntry>>;
    fn url(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_of_respects_candidate_order() {
        let mut e = RawEntry::new();
        e.set("description", "fallback text");
        e.set("summary", "primary text");
        assert_eq!(e.first_of(&["summary", "description"]), Some("primary text"));

        let mut only_desc = RawEntry::new();
        only_desc.set("description", "fallback text");
        assert_eq!(
            only_desc.first_of(&["summary", "description"]),
            Some("fallback text")
        );
    }

    #[test]
    fn empty_values_count_as_absent() {
        let mut e = RawEntry::new();
        e.set("title", "   ");
        e.set_opt("link", None);
        assert!(e.is_empty());
        assert_eq!(e.first_of(&["title", "link"]), None);
    }
}
