pub mod discussion;
pub mod reddit;

pub use discussion::{Comment, Discussion, excerpt};
pub use reddit::RedditClient;

use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::LazyLock;

static SUBMISSION_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/comments/([a-zA-Z0-9]+)").expect("submission id pattern"));

/// Anything that can hand back a post with its comments.
#[async_trait]
pub trait DiscussionSource: Send + Sync {
    async fn fetch(&self, submission_id: &str) -> Result<Discussion>;
}

/// Pull the submission id out of a Reddit post URL.
pub fn parse_submission_id(url: &str) -> Option<String> {
    SUBMISSION_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Generate a stable id for a source URL
pub fn source_id(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.trim().as_bytes());
    let result = hasher.finalize();
    hex::encode(&result[..16])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_submission_id() {
        assert_eq!(
            parse_submission_id("https://www.reddit.com/r/SanJose/comments/1abc2d/best_views/"),
            Some("1abc2d".to_string())
        );
        assert_eq!(
            parse_submission_id("https://reddit.com/comments/xyz9"),
            Some("xyz9".to_string())
        );
        assert_eq!(parse_submission_id("https://reddit.com/r/SanJose"), None);
        assert_eq!(parse_submission_id(""), None);
    }

    #[test]
    fn test_source_id_is_stable() {
        let a = source_id("https://reddit.com/r/x/comments/abc");
        let b = source_id(" https://reddit.com/r/x/comments/abc ");
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
        assert_ne!(a, source_id("https://reddit.com/r/x/comments/abd"));
    }
}
