use std::collections::HashMap;

use crate::filters::strip_filler_prefixes;
use crate::schema::{CandidateMention, CanonicalCandidate};

/// Derive the identity key of a place name.
///
/// Lowercases, drops filler prefixes, folds "Mount"/"Mt."/"Mt" into a single
/// "Mt <Name>" form and title-cases the rest. Two names are the same place
/// iff their keys are equal.
pub fn normalize_key(name: &str) -> String {
    let collapsed = name.split_whitespace().collect::<Vec<_>>().join(" ");
    let lower = strip_filler_prefixes(&collapsed).to_lowercase();

    let mount_rest = ["mt. ", "mt ", "mount "]
        .iter()
        .find_map(|prefix| lower.strip_prefix(prefix));

    if let Some(rest) = mount_rest {
        if let Some(peak) = rest.split_whitespace().next() {
            return format!("Mt {}", title_case(peak));
        }
    }

    title_case(&lower)
}

/// Capitalize the first letter of each word, lowercase the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;

    for c in text.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        at_word_start = c.is_whitespace() || matches!(c, '-' | '/' | '(');
    }

    out
}

/// Collapses mentions (or partially merged candidates) sharing a key.
///
/// Output order is first-seen order of each key.
#[derive(Debug, Default)]
pub struct Deduplicator {
    /// Maps normalized key -> position in `candidates`
    index: HashMap<String, usize>,
    candidates: Vec<CanonicalCandidate>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_mention(&mut self, mention: CandidateMention) {
        let key = normalize_key(&mention.name);
        self.push(CanonicalCandidate::from_mention(mention, key));
    }

    pub fn push(&mut self, candidate: CanonicalCandidate) {
        match self.index.get(&candidate.key) {
            Some(&pos) => self.candidates[pos].absorb(candidate),
            None => {
                self.index.insert(candidate.key.clone(), self.candidates.len());
                self.candidates.push(candidate);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn into_candidates(self) -> Vec<CanonicalCandidate> {
        self.candidates
    }

    /// One canonical candidate per distinct key.
    pub fn dedup(mentions: impl IntoIterator<Item = CandidateMention>) -> Vec<CanonicalCandidate> {
        let mut dedup = Self::new();
        for mention in mentions {
            dedup.push_mention(mention);
        }
        dedup.into_candidates()
    }

    /// Merge candidates that already carry keys. A no-op on deduplicated input.
    pub fn merge(
        candidates: impl IntoIterator<Item = CanonicalCandidate>,
    ) -> Vec<CanonicalCandidate> {
        let mut dedup = Self::new();
        for candidate in candidates {
            dedup.push(candidate);
        }
        dedup.into_candidates()
    }
}
