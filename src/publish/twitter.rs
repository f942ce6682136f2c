// src/publish/twitter.rs
//! X API v2 client: create tweet + credential check.

use anyhow::{anyhow, Context, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::PostReceipt;
use crate::config::TwitterCredentials;

const API_BASE: &str = "https://api.twitter.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// X's per-post character limit.
pub const TWEET_CHAR_LIMIT: usize = 280;

#[derive(Clone)]
pub struct TwitterClient {
    creds: TwitterCredentials,
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct CreateTweet {
    text: String,
}

#[derive(Deserialize)]
struct TweetResponse {
    data: TweetData,
}

#[derive(Deserialize)]
struct TweetData {
    id: String,
}

#[derive(Deserialize)]
struct MeResponse {
    data: MeData,
}

#[derive(Deserialize)]
struct MeData {
    username: String,
}

impl TwitterClient {
    pub fn new(creds: TwitterCredentials) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("building X api client")?;
        Ok(Self {
            creds,
            client,
            base_url: API_BASE.to_string(),
        })
    }

    /// Post one tweet. Over-long content is truncated, not rejected.
    pub async fn post(&self, content: &str) -> Result<PostReceipt> {
        let content = enforce_limit(content);

        let resp = self
            .client
            .post(format!("{}/2/tweets", self.base_url))
            .bearer_auth(&self.creds.bearer_token)
            .json(&CreateTweet {
                text: content.clone(),
            })
            .send()
            .await
            .context("posting to X")?;

        match resp.status() {
            StatusCode::FORBIDDEN => Err(anyhow!("authorization failed - check API credentials")),
            StatusCode::TOO_MANY_REQUESTS => Err(anyhow!("rate limit exceeded")),
            status if !status.is_success() => {
                let body = resp.text().await.unwrap_or_default();
                Err(anyhow!("X API error {status}: {body}"))
            }
            _ => {
                let body: TweetResponse = resp.json().await.context("decoding X response")?;
                tracing::info!(tweet_id = %body.data.id, "posted to X");
                Ok(PostReceipt {
                    tweet_id: body.data.id,
                    content,
                })
            }
        }
    }

    /// Confirm the credentials identify a user.
    pub async fn verify_credentials(&self) -> Result<String> {
        let resp = self
            .client
            .get(format!("{}/2/users/me", self.base_url))
            .bearer_auth(&self.creds.bearer_token)
            .send()
            .await
            .context("verifying X credentials")?
            .error_for_status()
            .context("X credential check rejected")?;

        let body: MeResponse = resp.json().await.context("decoding X user response")?;
        tracing::info!(username = %body.data.username, "credentials verified");
        Ok(body.data.username)
    }
}

/// Truncate to the platform limit: 277 chars plus "...".
fn enforce_limit(content: &str) -> String {
    let count = content.chars().count();
    if count <= TWEET_CHAR_LIMIT {
        return content.to_string();
    }
    tracing::warn!(chars = count, "content exceeds X character limit, truncating");
    let head: String = content.chars().take(TWEET_CHAR_LIMIT - 3).collect();
    format!("{head}...")
}
