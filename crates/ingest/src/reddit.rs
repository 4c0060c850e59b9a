use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::DiscussionSource;
use crate::discussion::{Comment, Discussion};

/// Comments shorter than this carry no useful place names.
const MIN_COMMENT_CHARS: usize = 20;

#[derive(Clone)]
pub struct RedditClient {
    base_url: String,
    user_agent: String,
    comment_limit: usize,
    post_fetch_delay: Duration,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Deserialize)]
struct ListingData {
    children: Vec<Thing>,
}

#[derive(Deserialize)]
struct Thing {
    kind: String,
    data: serde_json::Value,
}

#[derive(Deserialize)]
struct PostData {
    title: String,
    #[serde(default)]
    selftext: String,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    permalink: String,
    #[serde(default)]
    url: String,
}

#[derive(Deserialize)]
struct CommentData {
    #[serde(default)]
    body: String,
    #[serde(default)]
    score: i64,
    author: Option<String>,
}

impl RedditClient {
    pub fn new(base_url: String, user_agent: String) -> Self {
        Self {
            base_url,
            user_agent,
            comment_limit: 10,
            post_fetch_delay: Duration::from_secs(1),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_comment_limit(mut self, comment_limit: usize) -> Self {
        self.comment_limit = comment_limit;
        self
    }

    pub fn with_post_fetch_delay(mut self, delay: Duration) -> Self {
        self.post_fetch_delay = delay;
        self
    }

    fn thread_url(&self, submission_id: &str) -> String {
        format!(
            "{}/comments/{}.json?limit={}&depth=1&sort=top&raw_json=1",
            self.base_url, submission_id, self.comment_limit
        )
    }

    /// Turn the two-listing thread payload into a `Discussion`.
    fn parse_thread(&self, submission_id: &str, body: &str) -> Result<Discussion> {
        let listings: Vec<Listing> =
            serde_json::from_str(body).context("Failed to parse Reddit thread payload")?;

        let mut listings = listings.into_iter();
        let post_thing = listings
            .next()
            .and_then(|listing| listing.data.children.into_iter().next())
            .context("Reddit thread has no submission")?;

        let post: PostData =
            serde_json::from_value(post_thing.data).context("Failed to parse submission")?;

        let comments = listings
            .next()
            .map(|listing| listing.data.children)
            .unwrap_or_default()
            .into_iter()
            .filter(|thing| thing.kind == "t1")
            .filter_map(|thing| serde_json::from_value::<CommentData>(thing.data).ok())
            // The limit counts top comments before short ones are dropped
            .take(self.comment_limit)
            .filter(|comment| comment.body.chars().count() > MIN_COMMENT_CHARS)
            .map(|comment| Comment {
                body: comment.body,
                score: comment.score,
                author: comment.author.unwrap_or_else(|| "[deleted]".to_string()),
            })
            .collect();

        let url = if post.permalink.is_empty() {
            post.url
        } else {
            format!("{}{}", self.base_url, post.permalink)
        };

        Ok(Discussion {
            id: submission_id.to_string(),
            title: post.title,
            body: post.selftext,
            score: post.score,
            url,
            comments,
        })
    }
}

impl Default for RedditClient {
    fn default() -> Self {
        Self::new(
            "https://www.reddit.com".to_string(),
            concat!("trailscout/", env!("CARGO_PKG_VERSION")).to_string(),
        )
    }
}

#[async_trait]
impl DiscussionSource for RedditClient {
    async fn fetch(&self, submission_id: &str) -> Result<Discussion> {
        let url = self.thread_url(submission_id);
        debug!(submission_id, "Fetching Reddit thread");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await
            .context("Failed to send request to Reddit")?;

        if !response.status().is_success() {
            anyhow::bail!("Reddit request failed: {}", response.status());
        }

        let body = response
            .text()
            .await
            .context("Failed to read Reddit response")?;
        let discussion = self.parse_thread(submission_id, &body)?;

        info!(
            submission_id,
            score = discussion.score,
            comments = discussion.comments.len(),
            "Fetched Reddit thread"
        );

        // Stay under Reddit's unauthenticated rate limit
        tokio::time::sleep(self.post_fetch_delay).await;

        Ok(discussion)
    }
}
