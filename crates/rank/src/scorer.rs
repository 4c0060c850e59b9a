use extract::{CanonicalCandidate, Deduplicator, TextMiner};
use ingest::{Comment, Discussion};
use tracing::debug;

use crate::scoring::{comment_weight, post_weight, round1};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Post,
    Comment,
}

/// One block of discussion text with the upvote score that weights it.
#[derive(Debug, Clone)]
pub struct SourceItem {
    pub kind: SourceKind,
    pub text: String,
    pub score: i64,
    pub provenance: String,
}

impl SourceItem {
    pub fn post(discussion: &Discussion) -> Self {
        Self {
            kind: SourceKind::Post,
            text: discussion.post_text(),
            score: discussion.score,
            provenance: discussion.provenance(),
        }
    }

    pub fn comment(comment: &Comment) -> Self {
        Self {
            kind: SourceKind::Comment,
            text: comment.body.clone(),
            score: comment.score,
            provenance: comment.provenance(),
        }
    }

    /// The post first, then every comment in thread order.
    pub fn from_discussion(discussion: &Discussion) -> Vec<Self> {
        std::iter::once(Self::post(discussion))
            .chain(discussion.comments.iter().map(Self::comment))
            .collect()
    }

    pub fn weight(&self) -> f64 {
        match self.kind {
            SourceKind::Post => post_weight(self.score),
            SourceKind::Comment => comment_weight(self.score),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Ranking {
    /// Highest community score first, at most `top_n` long
    pub candidates: Vec<CanonicalCandidate>,
    pub mentions_mined: usize,
    pub distinct_places: usize,
}

/// Turns source items into a ranked list of candidates by community signal.
pub struct CommunityScorer {
    miner: TextMiner,
}

impl CommunityScorer {
    pub fn new(miner: TextMiner) -> Self {
        Self { miner }
    }

    /// Candidates found in one item, each carrying the item's weight once.
    pub fn score_item(&self, item: &SourceItem) -> (Vec<CanonicalCandidate>, usize) {
        let mentions = self.miner.mine_scored(&item.text, item.score);
        let mined = mentions.len();
        let weight = item.weight();

        let mut candidates = Deduplicator::dedup(mentions);
        for candidate in &mut candidates {
            candidate.community_score = weight;
            candidate.mentions = 1;
            candidate.add_source(item.provenance.clone());
        }

        (candidates, mined)
    }

    pub fn rank(&self, items: &[SourceItem], top_n: usize) -> Ranking {
        let mut dedup = Deduplicator::new();
        let mut mentions_mined = 0;

        for item in items {
            let (candidates, mined) = self.score_item(item);
            mentions_mined += mined;
            for candidate in candidates {
                dedup.push(candidate);
            }
        }

        let mut candidates = dedup.into_candidates();
        let distinct_places = candidates.len();

        for candidate in &mut candidates {
            candidate.community_score = round1(candidate.community_score);
        }
        // Stable: equal scores keep first-seen order
        candidates.sort_by(|a, b| b.community_score.total_cmp(&a.community_score));
        candidates.truncate(top_n);

        debug!(
            items = items.len(),
            mentions_mined,
            distinct_places,
            kept = candidates.len(),
            "Ranked candidates by community score"
        );

        Ranking {
            candidates,
            mentions_mined,
            distinct_places,
        }
    }
}

impl Default for CommunityScorer {
    fn default() -> Self {
        Self::new(TextMiner::default())
    }
}
