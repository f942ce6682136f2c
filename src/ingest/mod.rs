// src/ingest/mod.rs
pub mod feed;
pub mod normalize;
pub mod recency;
pub mod types;

use anyhow::Result;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;

use crate::config::AppConfig;
use crate::ingest::feed::HttpFeedSource;
use crate::ingest::types::{FeedSource, NewsItem};

/// One-time metrics registration (so series carry descriptions under any recorder).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_entries_total", "Raw entries parsed from feeds.");
        describe_counter!(
            "ingest_kept_total",
            "Items kept after normalization + recency filtering."
        );
        describe_counter!(
            "ingest_rejected_total",
            "Entries rejected during normalization (empty title)."
        );
        describe_counter!("ingest_stale_total", "Items dropped by the recency window.");
        describe_counter!("ingest_source_errors_total", "Feed fetch/parse errors.");
        describe_histogram!("ingest_parse_ms", "Feed parse time in milliseconds.");
        describe_gauge!(
            "ingest_last_run_ts",
            "Unix ts when the ingest pipeline last ran."
        );
    });
}

/// The whole ingestion pipeline for one run: every configured source, fetched
/// sequentially, normalized and recency-filtered, then scored and ranked.
///
/// Per-source failure is isolated: a dead feed yields nothing and the run
/// continues with the remaining sources.
pub struct NewsPipeline {
    sources: Vec<Box<dyn FeedSource>>,
    min_news_age_minutes: i64,
    controversy_threshold: f64,
}

impl NewsPipeline {
    pub fn new(
        sources: Vec<Box<dyn FeedSource>>,
        min_news_age_minutes: i64,
        controversy_threshold: f64,
    ) -> Self {
        Self {
            sources,
            min_news_age_minutes,
            controversy_threshold,
        }
    }

    /// Build HTTP-backed sources for every configured feed URL, sharing one client.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = feed::build_http_client()?;
        let sources = config
            .news_sources
            .iter()
            .map(|url| Box::new(HttpFeedSource::new(url.clone(), client.clone())) as Box<dyn FeedSource>)
            .collect();
        Ok(Self::new(
            sources,
            config.content_settings.min_news_age_minutes,
            config.content_settings.controversy_threshold,
        ))
    }

    /// Fetch, normalize, and recency-filter every configured source.
    ///
    /// Never fails: a source that errors contributes zero items and a warning.
    pub async fn fetch_all(&self) -> Vec<NewsItem> {
        ensure_metrics_described();

        let mut all = Vec::new();
        for source in &self.sources {
            let entries = match source.fetch_entries().await {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!(error = ?e, source = source.url(), "source fetch failed");
                    counter!("ingest_source_errors_total").increment(1);
                    continue;
                }
            };

            // Wall-clock at filter time, per source.
            let now = chrono::Utc::now();
            let mut kept = 0usize;
            let mut rejected = 0usize;
            let mut stale = 0usize;

            for entry in &entries {
                match normalize::normalize_entry(entry, source.url()) {
                    None => rejected += 1,
                    Some(item) => {
                        if recency::is_fresh(&item, now, self.min_news_age_minutes) {
                            all.push(item);
                            kept += 1;
                        } else {
                            stale += 1;
                        }
                    }
                }
            }

            counter!("ingest_kept_total").increment(kept as u64);
            counter!("ingest_rejected_total").increment(rejected as u64);
            counter!("ingest_stale_total").increment(stale as u64);
            tracing::info!(
                target: "ingest",
                source = source.url(),
                kept,
                rejected,
                stale,
                "source fetched"
            );
        }

        gauge!("ingest_last_run_ts").set(chrono::Utc::now().timestamp().max(0) as f64);
        all
    }

    /// Score the combined items and return the ranked trending candidates.
    pub fn filter_trending(&self, items: Vec<NewsItem>) -> Vec<NewsItem> {
        let scored = crate::analyze::controversy::score_items(items);
        crate::analyze::trending::select_trending(scored, self.controversy_threshold)
    }
}
