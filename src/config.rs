// src/config.rs
//! Application configuration.
//!
//! One JSON file (`config/config.json` unless `XPOSTER_CONFIG_PATH` points
//! elsewhere), created with defaults when missing. Environment variables win
//! over file values at load time; nothing below the orchestrator reads the
//! environment. Validation happens here, at the boundary; scoring and
//! selection assume valid input.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/config.json";
pub const ENV_CONFIG_PATH: &str = "XPOSTER_CONFIG_PATH";

/// X API credentials. Kept out of the config file in favor of `.env` where
/// possible; the file copy is a fallback, mirroring the setup wizard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwitterCredentials {
    pub bearer_token: String,
    pub api_key: String,
    pub api_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActiveHours {
    pub start: u32,
    pub end: u32,
}

impl Default for ActiveHours {
    fn default() -> Self {
        Self { start: 8, end: 22 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostingSchedule {
    pub interval_hours: u64,
    pub active_hours: ActiveHours,
}

impl Default for PostingSchedule {
    fn default() -> Self {
        Self {
            interval_hours: 2,
            active_hours: ActiveHours::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentSettings {
    pub max_post_length: usize,
    pub controversy_threshold: f64,
    pub min_news_age_minutes: i64,
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self {
            max_post_length: 280,
            controversy_threshold: 0.7,
            min_news_age_minutes: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub twitter: TwitterCredentials,
    pub news_sources: Vec<String>,
    pub posting_schedule: PostingSchedule,
    pub content_settings: ContentSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            twitter: TwitterCredentials::default(),
            news_sources: vec![
                "https://timesofindia.indiatimes.com/rssfeedstopstories.cms".to_string(),
            ],
            posting_schedule: PostingSchedule::default(),
            content_settings: ContentSettings::default(),
        }
    }
}

/// Config file location: `$XPOSTER_CONFIG_PATH` or the default path.
pub fn config_path() -> PathBuf {
    std::env::var(ENV_CONFIG_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    /// Load the config file, or create it with defaults when missing.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("reading config from {}", path.display()))?;
            let config: AppConfig = serde_json::from_str(&content)
                .with_context(|| format!("parsing config {}", path.display()))?;
            return Ok(config);
        }

        let config = AppConfig::default();
        config.save(path)?;
        tracing::info!(path = %path.display(), "created default configuration");
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating config dir {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self).context("serializing config")?;
        fs::write(path, content).with_context(|| format!("writing config {}", path.display()))
    }

    /// Environment variables override file values. Credentials follow the
    /// `.env` naming used by the setup wizard; pipeline settings use their
    /// own uppercase names.
    pub fn apply_env_overrides(&mut self) {
        let creds = &mut self.twitter;
        if let Some(v) = env_nonempty("BEARER_TOKEN") {
            creds.bearer_token = v;
        }
        if let Some(v) = env_nonempty("API_KEY") {
            creds.api_key = v;
        }
        if let Some(v) = env_nonempty("API_KEY_SECRET") {
            creds.api_secret = v;
        }
        if let Some(v) = env_nonempty("ACCESS_TOKEN") {
            creds.access_token = v;
        }
        if let Some(v) = env_nonempty("ACCESS_TOKEN_SECRET") {
            creds.access_token_secret = v;
        }

        if let Some(v) = env_nonempty("NEWS_SOURCES") {
            let sources: Vec<String> = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if !sources.is_empty() {
                self.news_sources = sources;
            }
        }
        if let Some(v) = env_nonempty("CONTROVERSY_THRESHOLD") {
            match v.parse::<f64>() {
                Ok(t) => self.content_settings.controversy_threshold = t,
                Err(_) => tracing::warn!(value = %v, "ignoring unparseable CONTROVERSY_THRESHOLD"),
            }
        }
        if let Some(v) = env_nonempty("MIN_NEWS_AGE_MINUTES") {
            match v.parse::<i64>() {
                Ok(m) => self.content_settings.min_news_age_minutes = m,
                Err(_) => tracing::warn!(value = %v, "ignoring unparseable MIN_NEWS_AGE_MINUTES"),
            }
        }
        if let Some(v) = env_nonempty("MAX_POST_LENGTH") {
            match v.parse::<usize>() {
                Ok(n) => self.content_settings.max_post_length = n,
                Err(_) => tracing::warn!(value = %v, "ignoring unparseable MAX_POST_LENGTH"),
            }
        }
    }

    /// Validate settings at the load boundary. Returns every problem found.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let required = [
            ("Bearer Token", &self.twitter.bearer_token),
            ("API Key", &self.twitter.api_key),
            ("API Secret", &self.twitter.api_secret),
            ("Access Token", &self.twitter.access_token),
            ("Access Token Secret", &self.twitter.access_token_secret),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                errors.push(format!("Missing required X credential: {name}"));
            }
        }

        if self.news_sources.is_empty() {
            errors.push("No news sources configured".to_string());
        }
        if self.content_settings.max_post_length > 280 {
            errors.push("max_post_length cannot exceed 280 for X".to_string());
        }
        let threshold = self.content_settings.controversy_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            errors.push("controversy_threshold must be between 0 and 1".to_string());
        }

        errors
    }
}

/// Write credentials to a `.env` file so they stay out of the config file.
pub fn save_credentials_to_env(creds: &TwitterCredentials, path: &Path) -> Result<()> {
    let content = format!(
        "API_KEY=\"{}\"\nAPI_KEY_SECRET=\"{}\"\nBEARER_TOKEN=\"{}\"\nACCESS_TOKEN=\"{}\"\nACCESS_TOKEN_SECRET=\"{}\"\n",
        creds.api_key,
        creds.api_secret,
        creds.bearer_token,
        creds.access_token,
        creds.access_token_secret,
    );
    fs::write(path, content).with_context(|| format!("writing credentials to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn defaults_match_contract() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.content_settings.max_post_length, 280);
        assert!((cfg.content_settings.controversy_threshold - 0.7).abs() < 1e-9);
        assert_eq!(cfg.content_settings.min_news_age_minutes, 15);
        assert_eq!(cfg.posting_schedule.interval_hours, 2);
        assert_eq!(cfg.posting_schedule.active_hours.start, 8);
        assert_eq!(cfg.posting_schedule.active_hours.end, 22);
        assert_eq!(cfg.news_sources.len(), 1);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let cfg: AppConfig =
            serde_json::from_str(r#"{"news_sources": ["https://example.test/f.rss"]}"#).unwrap();
        assert_eq!(cfg.news_sources, vec!["https://example.test/f.rss"]);
        assert_eq!(cfg.content_settings.max_post_length, 280);
        assert!(cfg.twitter.bearer_token.is_empty());
    }

    #[test]
    fn load_or_create_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config/config.json");

        let created = AppConfig::load_or_create(&path).unwrap();
        assert!(path.exists());

        let loaded = AppConfig::load_or_create(&path).unwrap();
        assert_eq!(created, loaded);
    }

    #[test]
    fn validate_reports_each_problem() {
        let mut cfg = AppConfig::default();
        cfg.news_sources.clear();
        cfg.content_settings.controversy_threshold = 1.5;
        cfg.content_settings.max_post_length = 300;

        let errors = cfg.validate();
        // 5 missing credentials + sources + post length + threshold
        assert_eq!(errors.len(), 8);
        assert!(errors.iter().any(|e| e.contains("Bearer Token")));
        assert!(errors.iter().any(|e| e.contains("news sources")));
        assert!(errors.iter().any(|e| e.contains("max_post_length")));
        assert!(errors.iter().any(|e| e.contains("controversy_threshold")));
    }

    #[test]
    fn valid_config_has_no_errors() {
        let mut cfg = AppConfig::default();
        cfg.twitter = TwitterCredentials {
            bearer_token: "b".into(),
            api_key: "k".into(),
            api_secret: "s".into(),
            access_token: "t".into(),
            access_token_secret: "ts".into(),
        };
        assert!(cfg.validate().is_empty());
    }

    #[serial_test::serial]
    #[test]
    fn env_overrides_beat_file_values() {
        env::set_var("BEARER_TOKEN", "env-bearer");
        env::set_var("NEWS_SOURCES", "https://a.test/f.rss, https://b.test/f.rss");
        env::set_var("CONTROVERSY_THRESHOLD", "0.5");
        env::set_var("MIN_NEWS_AGE_MINUTES", "30");

        let mut cfg = AppConfig::default();
        cfg.twitter.bearer_token = "file-bearer".into();
        cfg.apply_env_overrides();

        assert_eq!(cfg.twitter.bearer_token, "env-bearer");
        assert_eq!(
            cfg.news_sources,
            vec!["https://a.test/f.rss", "https://b.test/f.rss"]
        );
        assert!((cfg.content_settings.controversy_threshold - 0.5).abs() < 1e-9);
        assert_eq!(cfg.content_settings.min_news_age_minutes, 30);

        env::remove_var("BEARER_TOKEN");
        env::remove_var("NEWS_SOURCES");
        env::remove_var("CONTROVERSY_THRESHOLD");
        env::remove_var("MIN_NEWS_AGE_MINUTES");
    }

    #[serial_test::serial]
    #[test]
    fn unparseable_env_numbers_are_ignored() {
        env::set_var("CONTROVERSY_THRESHOLD", "very high");

        let mut cfg = AppConfig::default();
        cfg.apply_env_overrides();
        assert!((cfg.content_settings.controversy_threshold - 0.7).abs() < 1e-9);

        env::remove_var("CONTROVERSY_THRESHOLD");
    }

    #[test]
    fn env_file_contains_all_credentials() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(".env");
        let creds = TwitterCredentials {
            bearer_token: "B".into(),
            api_key: "K".into(),
            api_secret: "S".into(),
            access_token: "T".into(),
            access_token_secret: "TS".into(),
        };
        save_credentials_to_env(&creds, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("API_KEY=\"K\""));
        assert!(content.contains("BEARER_TOKEN=\"B\""));
        assert!(content.contains("ACCESS_TOKEN_SECRET=\"TS\""));
    }
}
