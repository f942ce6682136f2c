// src/ingest/normalize.rs
//! Maps one `RawEntry` to a `NewsItem`, or rejects it.
//!
//! Field resolution is an explicit ordered candidate-key list per logical
//! field. The only rejection reason is a missing/empty title; everything else
//! degrades (empty summary/link, absent timestamp).

use chrono::{DateTime, Utc};
use time::{format_description::well_known::Rfc2822, OffsetDateTime};

use crate::ingest::types::{NewsItem, RawEntry};

pub const TITLE_KEYS: &[&str] = &["title"];
pub const SUMMARY_KEYS: &[&str] = &["summary", "description"];
pub const LINK_KEYS: &[&str] = &["link", "guid"];
pub const PUBLISHED_KEYS: &[&str] = &["published", "updated"];

/// Normalize text: decode HTML entities, strip tags, collapse whitespace, trim.
pub fn clean_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();

    out.trim().to_string()
}

/// Parse a feed timestamp. RSS carries RFC 2822 (`Wed, 02 Oct 2024 13:00:00 GMT`),
/// Atom carries RFC 3339 (`2024-10-02T13:00:00Z`). Anything else is unparseable
/// and the caller keeps the item with `published_at` absent.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = OffsetDateTime::parse(raw, &Rfc2822) {
        return DateTime::<Utc>::from_timestamp(dt.unix_timestamp(), 0);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    None
}

/// Map one raw entry to a `NewsItem`. Returns `None` only when the resolved
/// title is empty or whitespace.
pub fn normalize_entry(entry: &RawEntry, source_id: &str) -> Option<NewsItem> {
    let title = clean_text(entry.first_of(TITLE_KEYS).unwrap_or_default());
    if title.is_empty() {
        return None;
    }

    let summary = clean_text(entry.first_of(SUMMARY_KEYS).unwrap_or_default());
    let link = entry
        .first_of(LINK_KEYS)
        .unwrap_or_default()
        .trim()
        .to_string();
    let published_at = entry.first_of(PUBLISHED_KEYS).and_then(parse_timestamp);

    Some(NewsItem {
        title,
        summary,
        link,
        published_at,
        source_id: source_id.to_string(),
        controversy_score: None,
    })
}
