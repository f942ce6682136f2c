// src/publish/mod.rs
pub mod twitter;

pub use twitter::TwitterClient;

/// Outcome of a successful publish.
#[derive(Debug, Clone)]
pub struct PostReceipt {
    pub tweet_id: String,
    /// The text that actually went out (post-truncation, if any).
    pub content: String,
}
