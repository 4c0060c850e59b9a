use serde::{Deserialize, Serialize};

/// Characters of source text kept in a provenance label.
pub const EXCERPT_CHARS: usize = 50;

/// A post and its top-level comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discussion {
    pub id: String,
    pub title: String,
    pub body: String,
    pub score: i64,
    pub url: String,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub body: String,
    pub score: i64,
    pub author: String,
}

impl Discussion {
    /// Title and body as one block of text.
    pub fn post_text(&self) -> String {
        format!("{} {}", self.title, self.body).trim().to_string()
    }

    pub fn provenance(&self) -> String {
        format!("Post: {}...", excerpt(&self.title, EXCERPT_CHARS))
    }
}

impl Comment {
    pub fn provenance(&self) -> String {
        format!(
            "Comment (+{}): {}...",
            self.score,
            excerpt(&self.body, EXCERPT_CHARS)
        )
    }
}

/// First `max_chars` characters of `text`, on a char boundary.
pub fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_respects_char_boundaries() {
        assert_eq!(excerpt("héllo wörld", 4), "héll");
        assert_eq!(excerpt("short", 50), "short");
    }

    #[test]
    fn test_provenance_labels() {
        let discussion = Discussion {
            id: "abc123".to_string(),
            title: "Best viewpoints around San Jose?".to_string(),
            body: String::new(),
            score: 20,
            url: "https://reddit.com/r/SanJose/comments/abc123/best".to_string(),
            comments: vec![Comment {
                body: "x".repeat(80),
                score: 7,
                author: "hiker".to_string(),
            }],
        };

        assert_eq!(discussion.provenance(), "Post: Best viewpoints around San Jose?...");
        assert_eq!(discussion.post_text(), "Best viewpoints around San Jose?");

        let label = discussion.comments[0].provenance();
        assert!(label.starts_with("Comment (+7): "));
        assert_eq!(label.len(), "Comment (+7): ".len() + EXCERPT_CHARS + 3);
    }
}
