pub mod filters;
pub mod gazetteer;
pub mod normalizer;
pub mod schema;
pub mod strategies;

pub use normalizer::{normalize_key, title_case, Deduplicator};
pub use schema::{CandidateMention, CanonicalCandidate, ContextTag, MAX_SOURCES};
pub use strategies::{default_strategies, MentionExtractor};

use tracing::debug;

/// Runs every extraction strategy over a block of text.
pub struct TextMiner {
    strategies: Vec<Box<dyn MentionExtractor>>,
}

impl TextMiner {
    pub fn new(strategies: Vec<Box<dyn MentionExtractor>>) -> Self {
        Self { strategies }
    }

    /// Raw mentions from all strategies, in strategy order. Never fails.
    pub fn mine(&self, text: &str) -> Vec<CandidateMention> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let mentions: Vec<CandidateMention> = self
            .strategies
            .iter()
            .flat_map(|strategy| strategy.extract(text))
            .collect();

        debug!(
            mentions = mentions.len(),
            text_len = text.len(),
            "Mined candidate mentions"
        );
        mentions
    }

    /// Mentions stamped with the upvote score of the text they came from.
    pub fn mine_scored(&self, text: &str, source_score: i64) -> Vec<CandidateMention> {
        self.mine(text)
            .into_iter()
            .map(|mention| mention.with_source_score(source_score))
            .collect()
    }

    /// Mine a block of text and collapse the mentions to unique places.
    pub fn extract_candidates(&self, text: &str) -> Vec<CanonicalCandidate> {
        Deduplicator::dedup(self.mine(text))
    }

    pub fn strategy_count(&self) -> usize {
        self.strategies.len()
    }
}

impl Default for TextMiner {
    fn default() -> Self {
        Self::new(default_strategies())
    }
}
