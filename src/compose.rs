// src/compose.rs
//! Post text generation.
//!
//! Shells out to the `qwen` CLI in non-interactive mode with a bounded
//! timeout. Any failure (missing binary, non-zero exit, timeout, empty
//! output) degrades to a deterministic fallback built from the title and
//! link. The composer never fails the cycle.

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;
use tokio::process::Command;

/// Bounded runtime for one generator invocation.
pub const GENERATOR_TIMEOUT: Duration = Duration::from_secs(30);

/// X's hard character limit; the configured `max_post_length` may be lower.
const POST_HARD_LIMIT: usize = 280;

/// Lines the generator tends to prefix its answer with.
const BOILERPLATE_PREFIXES: [&str; 5] = ["Response:", "Sure,", "Here", "Okay", "Generated"];

static RE_EMOJI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        "[\u{1F300}-\u{1F5FF}\u{1F600}-\u{1F64F}\u{1F680}-\u{1F6FF}\u{1F900}-\u{1F9FF}\u{1F1E6}-\u{1F1FF}\u{2600}-\u{27BF}\u{2B00}-\u{2BFF}\u{FE0F}\u{200D}]+",
    )
    .unwrap()
});

pub struct PostComposer {
    command: String,
    timeout: Duration,
    max_post_length: usize,
}

impl PostComposer {
    pub fn new(max_post_length: usize) -> Self {
        Self {
            command: "qwen".to_string(),
            timeout: GENERATOR_TIMEOUT,
            max_post_length,
        }
    }

    /// Swap the generator binary (tests point this at something that fails fast).
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    /// Produce post text for the selected item. Infallible by design: the
    /// generator path may fail, the fallback path cannot.
    pub async fn compose(&self, title: &str, summary: &str, link: Option<&str>) -> String {
        match self.generate(title, summary).await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => {
                tracing::warn!("generator returned empty content, using fallback post");
                fallback_post(title, link, self.max_post_length)
            }
            Err(e) => {
                tracing::warn!(error = ?e, "text generation failed, using fallback post");
                fallback_post(title, link, self.max_post_length)
            }
        }
    }

    async fn generate(&self, title: &str, summary: &str) -> Result<String> {
        let prompt = build_prompt(title, summary);

        let output = tokio::time::timeout(
            self.timeout,
            Command::new(&self.command)
                .arg("-p")
                .arg(&prompt)
                .kill_on_drop(true)
                .output(),
        )
        .await
        .context("text generator timed out")?
        .with_context(|| format!("running `{}`", self.command))?;

        if !output.status.success() {
            bail!(
                "`{}` exited with {}: {}",
                self.command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let raw = String::from_utf8_lossy(&output.stdout);
        let cleaned = strip_emojis(&cleanup_response(&raw));
        Ok(truncate_chars(cleaned.trim(), POST_HARD_LIMIT))
    }
}

fn build_prompt(title: &str, summary: &str) -> String {
    format!(
        "Create an engaging, concise X (Twitter) post (max 260 characters) about this news:\n\
         Title: {title}\n\
         Summary: {summary}\n\
         \n\
         Requirements:\n\
         - Use simple, clear English\n\
         - Avoid GenZ slang, internet abbreviations, and trendy phrases\n\
         - Do not use emojis\n\
         - Do not use first-person language (avoid 'I', 'my', 'me')\n\
         - Make it attention-grabbing and shareable\n\
         - Include relevant hashtags (max 2-3)\n\
         - Keep it under 260 characters to allow for potential link\n\
         - Make it sound professional and not clickbaity\n\
         - Include an opinion or reaction that would encourage engagement"
    )
}

/// Pull the answer out of chatty CLI output: the first line longer than 20
/// chars that is not generator boilerplate; otherwise the whole output.
pub fn cleanup_response(raw: &str) -> String {
    let trimmed = raw.trim();
    for line in trimmed.lines() {
        let line = line.trim();
        if line.chars().count() > 20 && !BOILERPLATE_PREFIXES.iter().any(|p| line.starts_with(p)) {
            return line.to_string();
        }
    }
    trimmed.to_string()
}

pub fn strip_emojis(s: &str) -> String {
    RE_EMOJI.replace_all(s, "").to_string()
}

/// Char-safe truncation to `max`, ellipsized with "...".
fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Deterministic fallback: the title, with the link appended when it fits.
/// If appending the link would leave fewer than ~10 chars of title, the link
/// is dropped rather than posting a stub.
pub fn fallback_post(title: &str, link: Option<&str>, max_post_length: usize) -> String {
    let clean_title = title.trim();

    let Some(link) = link.filter(|l| !l.trim().is_empty()) else {
        return truncate_chars(clean_title, max_post_length);
    };

    let post = format!("{clean_title} Read more: {link}");
    if post.chars().count() <= max_post_length {
        return post;
    }

    let overhead = "... Read more: ".chars().count() + link.chars().count();
    let available = max_post_length.saturating_sub(overhead);
    if available > 10 {
        let head: String = clean_title.chars().take(available).collect();
        format!("{head}... Read more: {link}")
    } else {
        truncate_chars(clean_title, max_post_length)
    }
}
