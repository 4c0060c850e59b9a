use serde::{Deserialize, Serialize};

/// Provenance snippets kept per candidate.
pub const MAX_SOURCES: usize = 3;

/// Which extraction strategy produced a mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextTag {
    Recommendation,
    Descriptive,
    Business,
    Quoted,
    Nature,
    List,
}

impl ContextTag {
    /// Fixed confidence weight of a mention found by this strategy.
    pub fn confidence(self) -> f64 {
        match self {
            ContextTag::Recommendation => 0.9,
            ContextTag::Business => 0.85,
            ContextTag::Descriptive => 0.8,
            ContextTag::Quoted => 0.75,
            ContextTag::Nature => 0.7,
            ContextTag::List => 0.6,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContextTag::Recommendation => "recommendation",
            ContextTag::Descriptive => "descriptive",
            ContextTag::Business => "business",
            ContextTag::Quoted => "quoted",
            ContextTag::Nature => "nature",
            ContextTag::List => "list",
        }
    }
}

/// One occurrence of a possible place name in a block of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateMention {
    /// Text exactly as the pattern captured it
    pub raw: String,
    /// Cleaned surface form
    pub name: String,
    pub context: ContextTag,
    pub confidence: f64,
    /// Upvote count of the post or comment the text came from
    pub source_score: i64,
}

impl CandidateMention {
    pub fn new(raw: &str, name: String, context: ContextTag) -> Self {
        Self {
            raw: raw.to_string(),
            name,
            context,
            confidence: context.confidence(),
            source_score: 0,
        }
    }

    pub fn with_source_score(mut self, score: i64) -> Self {
        self.source_score = score;
        self
    }
}

/// A deduplicated place identity, keyed by its normalized name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalCandidate {
    /// Best surface form seen so far
    pub name: String,
    pub key: String,
    pub contexts: Vec<ContextTag>,
    /// Tag of the mention that supplied `name`
    pub primary_context: ContextTag,
    pub confidence: f64,
    pub community_score: f64,
    pub mentions: usize,
    pub sources: Vec<String>,
}

impl CanonicalCandidate {
    pub fn from_mention(mention: CandidateMention, key: String) -> Self {
        Self {
            name: mention.name,
            key,
            contexts: vec![mention.context],
            primary_context: mention.context,
            confidence: mention.confidence,
            community_score: 0.0,
            mentions: 1,
            sources: Vec::new(),
        }
    }

    /// Fold another candidate with the same key into this one.
    ///
    /// The display name only changes hands on a strictly higher confidence,
    /// so the first-seen form wins ties.
    pub fn absorb(&mut self, other: CanonicalCandidate) {
        debug_assert_eq!(self.key, other.key);

        if other.confidence > self.confidence {
            self.name = other.name;
            self.confidence = other.confidence;
            self.primary_context = other.primary_context;
        }

        self.contexts.extend(other.contexts);
        self.community_score += other.community_score;
        self.mentions += other.mentions;

        for source in other.sources {
            if self.sources.len() >= MAX_SOURCES {
                break;
            }
            self.sources.push(source);
        }
    }

    pub fn add_source(&mut self, source: String) {
        if self.sources.len() < MAX_SOURCES {
            self.sources.push(source);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, context: ContextTag) -> CanonicalCandidate {
        CanonicalCandidate::from_mention(
            CandidateMention::new(name, name.to_string(), context),
            "Mission Peak".to_string(),
        )
    }

    #[test]
    fn test_absorb_prefers_higher_confidence_name() {
        let mut kept = candidate("mission peak", ContextTag::Nature);
        kept.absorb(candidate("Mission Peak", ContextTag::Recommendation));

        assert_eq!(kept.name, "Mission Peak");
        assert_eq!(kept.primary_context, ContextTag::Recommendation);
        assert_eq!(kept.mentions, 2);
        assert_eq!(
            kept.contexts,
            vec![ContextTag::Nature, ContextTag::Recommendation]
        );
    }

    #[test]
    fn test_absorb_keeps_first_on_tie() {
        let mut kept = candidate("Mission Peak", ContextTag::List);
        kept.absorb(candidate("MISSION PEAK", ContextTag::List));

        assert_eq!(kept.name, "Mission Peak");
    }

    #[test]
    fn test_sources_are_capped() {
        let mut kept = candidate("Mission Peak", ContextTag::Nature);
        for i in 0..5 {
            kept.add_source(format!("source {i}"));
        }
        let mut other = candidate("Mission Peak", ContextTag::Nature);
        other.add_source("late".to_string());
        kept.absorb(other);

        assert_eq!(kept.sources.len(), MAX_SOURCES);
        assert_eq!(kept.sources[0], "source 0");
    }

    #[test]
    fn test_context_serializes_lowercase() {
        let json = serde_json::to_string(&ContextTag::Recommendation).unwrap();
        assert_eq!(json, "\"recommendation\"");
    }
}
