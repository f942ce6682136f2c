// src/bot.rs
//! The posting loop: one pipeline run per interval, inside active hours only.
//!
//! A failed cycle is logged and answered with a flat backoff sleep; the loop
//! never crashes. Ctrl-C exits cleanly.

use anyhow::{Context, Result};
use chrono::{Local, Timelike};
use std::time::Duration;

use crate::compose::PostComposer;
use crate::config::AppConfig;
use crate::ingest::NewsPipeline;
use crate::publish::{PostReceipt, TwitterClient};

/// Flat sleep after a failed cycle.
pub const RETRY_BACKOFF: Duration = Duration::from_secs(300);

#[derive(Debug)]
pub enum CycleOutcome {
    /// Outside the configured active hours; nothing attempted.
    Idle,
    /// Pipeline ran, nothing met the controversy threshold.
    NothingTrending,
    /// Generated content was empty or over the configured length limit.
    ContentRejected,
    Posted(PostReceipt),
}

/// Both ends inclusive: `start..=end` in local hours.
fn hour_in_window(hour: u32, start: u32, end: u32) -> bool {
    start <= hour && hour <= end
}

pub struct AutoPosterBot {
    config: AppConfig,
    pipeline: NewsPipeline,
    composer: PostComposer,
    twitter: TwitterClient,
}

impl AutoPosterBot {
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let pipeline = NewsPipeline::from_config(&config)?;
        let composer = PostComposer::new(config.content_settings.max_post_length);
        let twitter = TwitterClient::new(config.twitter.clone())?;
        Ok(Self {
            config,
            pipeline,
            composer,
            twitter,
        })
    }

    /// One full cycle: fetch → select → compose → publish.
    pub async fn run_cycle(&self) -> Result<CycleOutcome> {
        let hours = self.config.posting_schedule.active_hours;
        let hour = Local::now().hour();
        if !hour_in_window(hour, hours.start, hours.end) {
            tracing::info!(
                hour,
                start = hours.start,
                end = hours.end,
                "outside active hours, skipping cycle"
            );
            return Ok(CycleOutcome::Idle);
        }

        let items = self.pipeline.fetch_all().await;
        tracing::info!(count = items.len(), "fetched news items");

        let trending = self.pipeline.filter_trending(items);
        tracing::info!(count = trending.len(), "trending news items");

        let Some(selected) = trending.into_iter().next() else {
            tracing::info!("no trending news found to post");
            return Ok(CycleOutcome::NothingTrending);
        };

        let link = (!selected.link.is_empty()).then_some(selected.link.as_str());
        let content = self
            .composer
            .compose(&selected.title, &selected.summary, link)
            .await;

        let max_len = self.config.content_settings.max_post_length;
        if content.is_empty() || content.chars().count() > max_len {
            tracing::warn!(
                chars = content.chars().count(),
                max = max_len,
                "generated content is too long or empty"
            );
            return Ok(CycleOutcome::ContentRejected);
        }

        let receipt = self
            .twitter
            .post(&content)
            .await
            .context("posting selected item")?;
        Ok(CycleOutcome::Posted(receipt))
    }

    /// Run until interrupted: one cycle per configured interval.
    pub async fn run(&self) -> Result<()> {
        tracing::info!("starting X auto-poster bot");
        let interval = Duration::from_secs(self.config.posting_schedule.interval_hours * 3600);

        loop {
            let sleep_for = match self.run_cycle().await {
                Ok(CycleOutcome::Posted(receipt)) => {
                    tracing::info!(tweet_id = %receipt.tweet_id, "successfully posted to X");
                    interval
                }
                Ok(_) => interval,
                Err(e) => {
                    tracing::error!(error = ?e, "error in posting cycle");
                    RETRY_BACKOFF
                }
            };

            tracing::info!(secs = sleep_for.as_secs(), "waiting until next cycle");
            tokio::select! {
                _ = tokio::time::sleep(sleep_for) => {}
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("bot stopped by user");
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_window_is_inclusive_both_ends() {
        assert!(hour_in_window(8, 8, 22));
        assert!(hour_in_window(22, 8, 22));
        assert!(hour_in_window(15, 8, 22));
        assert!(!hour_in_window(7, 8, 22));
        assert!(!hour_in_window(23, 8, 22));
    }
}
