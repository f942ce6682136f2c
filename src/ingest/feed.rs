// src/ingest/feed.rs
//! Feed Reader: HTTP fetch plus RSS 2.0 / Atom parsing into `RawEntry` records.
//!
//! Both formats deserialize through quick-xml serde structs. Field values land
//! under canonical keys (`title`, `summary`, `description`, `link`, `guid`,
//! `published`, `updated`); the normalizer owns the fallback chains.

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;
use std::time::Duration;

use crate::ingest::types::{FeedSource, RawEntry};

/// Bounded per-request timeout for feed fetches.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Browser-like client identity; some feed hosts reject obvious bots.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Shared client for all sources: one connection pool, one identity.
pub fn build_http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(BROWSER_USER_AGENT)
        .timeout(FETCH_TIMEOUT)
        .build()
        .context("building feed http client")
}

// ---- RSS 2.0 ----

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<String>,
    link: Option<String>,
    guid: Option<RssGuid>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

/// `<guid isPermaLink="false">...</guid>`: the attribute forces a struct.
#[derive(Debug, Deserialize)]
struct RssGuid {
    #[serde(rename = "$text")]
    value: Option<String>,
}

// ---- Atom ----

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<AtomText>,
    summary: Option<AtomText>,
    id: Option<String>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    published: Option<String>,
    updated: Option<String>,
}

/// Atom text constructs may carry a `type` attribute (`type="html"` etc.).
#[derive(Debug, Deserialize)]
struct AtomText {
    #[serde(rename = "$text")]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

/// Feeds routinely embed HTML entities that are not valid XML entities.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}

/// Name of the document's root element, ignoring the XML declaration and comments.
fn root_element(xml: &str) -> Option<&str> {
    let mut rest = xml;
    while let Some(pos) = rest.find('<') {
        let tail = &rest[pos + 1..];
        if tail.starts_with('?') || tail.starts_with('!') {
            rest = &tail[1..];
            continue;
        }
        let end = tail
            .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
            .unwrap_or(tail.len());
        return Some(&tail[..end]);
    }
    None
}

/// Parse a feed document into raw entries, order as given by the feed.
pub fn parse_feed(body: &str) -> Result<Vec<RawEntry>> {
    let t0 = std::time::Instant::now();
    let xml = scrub_html_entities_for_xml(body);

    let entries: Vec<RawEntry> = match root_element(&xml) {
        Some("rss") | Some("channel") => {
            let rss: Rss = from_str(&xml).context("parsing rss feed xml")?;
            rss.channel.items.into_iter().map(rss_entry).collect()
        }
        Some("feed") => {
            let feed: AtomFeed = from_str(&xml).context("parsing atom feed xml")?;
            feed.entries.into_iter().map(atom_entry).collect()
        }
        _ => anyhow::bail!("unrecognized feed document (expected <rss> or <feed> root)"),
    };

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("ingest_parse_ms").record(ms);
    counter!("ingest_entries_total").increment(entries.len() as u64);

    Ok(entries)
}

fn rss_entry(item: RssItem) -> RawEntry {
    let mut e = RawEntry::new();
    e.set_opt("title", item.title);
    e.set_opt("description", item.description);
    e.set_opt("link", item.link);
    e.set_opt("guid", item.guid.and_then(|g| g.value));
    e.set_opt("published", item.pub_date);
    e
}

fn atom_entry(entry: AtomEntry) -> RawEntry {
    let mut e = RawEntry::new();
    e.set_opt("title", entry.title.and_then(|t| t.value));
    e.set_opt("summary", entry.summary.and_then(|t| t.value));
    e.set_opt("guid", entry.id);
    e.set_opt("link", pick_atom_link(entry.links));
    e.set_opt("published", entry.published);
    e.set_opt("updated", entry.updated);
    e
}

/// Prefer the alternate link (or an unqualified one); fall back to the first.
fn pick_atom_link(links: Vec<AtomLink>) -> Option<String> {
    links
        .iter()
        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .and_then(|l| l.href.clone())
        .or_else(|| links.into_iter().find_map(|l| l.href))
}

/// One configured feed URL fetched over HTTP.
pub struct HttpFeedSource {
    url: String,
    client: reqwest::Client,
}

impl HttpFeedSource {
    pub fn new(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch_entries(&self) -> Result<Vec<RawEntry>> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("fetching feed {}", self.url))?
            .error_for_status()
            .with_context(|| format!("feed {} returned error status", self.url))?;
        let body = resp
            .text()
            .await
            .with_context(|| format!("reading feed body from {}", self.url))?;
        parse_feed(&body)
    }

    fn url(&self) -> &str {
        &self.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS_DOC: &str = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>Example</title>
    <item>
      <title>First headline</title>
      <link>https://example.test/1</link>
      <guid isPermaLink="false">urn:item:1</guid>
      <pubDate>Wed, 02 Oct 2024 13:00:00 GMT</pubDate>
      <description>Something happened.</description>
    </item>
    <item>
      <title>Second headline</title>
      <guid>https://example.test/2</guid>
    </item>
  </channel>
</rss>"#;

    const ATOM_DOC: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Example</title>
  <entry>
    <title type="text">Atom headline</title>
    <id>tag:example.test,2024:entry-1</id>
    <link rel="alternate" href="https://example.test/atom/1"/>
    <updated>2024-10-02T13:00:00Z</updated>
    <summary>Atom summary.</summary>
  </entry>
</feed>"#;

    #[test]
    fn parses_rss_items_in_order() {
        let entries = parse_feed(RSS_DOC).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].get("title"), Some("First headline"));
        assert_eq!(entries[0].get("link"), Some("https://example.test/1"));
        assert_eq!(entries[0].get("guid"), Some("urn:item:1"));
        assert_eq!(
            entries[0].get("published"),
            Some("Wed, 02 Oct 2024 13:00:00 GMT")
        );
        assert_eq!(entries[0].get("description"), Some("Something happened."));
        // Second item has no link element; only the guid survives.
        assert_eq!(entries[1].get("link"), None);
        assert_eq!(entries[1].get("guid"), Some("https://example.test/2"));
    }

    #[test]
    fn parses_atom_entries() {
        let entries = parse_feed(ATOM_DOC).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].get("title"), Some("Atom headline"));
        assert_eq!(entries[0].get("summary"), Some("Atom summary."));
        assert_eq!(entries[0].get("link"), Some("https://example.test/atom/1"));
        assert_eq!(entries[0].get("guid"), Some("tag:example.test,2024:entry-1"));
        assert_eq!(entries[0].get("updated"), Some("2024-10-02T13:00:00Z"));
        assert_eq!(entries[0].get("published"), None);
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(parse_feed("this is not xml").is_err());
        assert!(parse_feed("<html><body>404</body></html>").is_err());
    }

    #[test]
    fn html_entities_are_scrubbed_before_parsing() {
        let doc = RSS_DOC.replace("Something happened.", "A&nbsp;tight&ndash;race");
        let entries = parse_feed(&doc).unwrap();
        assert_eq!(entries[0].get("description"), Some("A tight-race"));
    }

    #[test]
    fn root_element_skips_decl_and_comments() {
        assert_eq!(root_element("<?xml version=\"1.0\"?><rss/>"), Some("rss"));
        assert_eq!(root_element("<!-- hi --><feed>"), Some("feed"));
        assert_eq!(root_element("no tags here"), None);
    }
}
