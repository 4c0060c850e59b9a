use extract::{CanonicalCandidate, ContextTag};
use places::PlaceMatch;
use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::scoring::{combined_score, context_boost, directory_score, type_boost};

/// A candidate confirmed by the places directory, with its final score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedLocation {
    /// Directory's name for the place
    pub name: String,
    /// Name as it was mined from the discussion
    pub mined_name: String,
    pub score: f64,
    pub community_score: f64,
    pub directory_score: f64,
    pub context: ContextTag,
    pub context_boost: f64,
    pub type_boost: f64,
    pub mentions: usize,
    pub sources: Vec<String>,

    pub rating: Option<f64>,
    pub review_count: u32,
    pub types: Vec<String>,
    pub address: String,
    pub short_address: String,
    pub place_id: String,
    pub photo_references: Vec<String>,

    pub city: String,
    pub category: Category,
    #[serde(default)]
    pub source_url: String,
}

impl ValidatedLocation {
    pub fn from_match(
        candidate: CanonicalCandidate,
        place: PlaceMatch,
        city: &str,
        category: Category,
    ) -> Self {
        let directory_score = directory_score(place.rating, place.review_count);
        let context_boost = context_boost(candidate.primary_context);
        let type_boost = type_boost(&place.types);

        Self {
            name: place.canonical_name,
            mined_name: candidate.name,
            score: combined_score(
                candidate.community_score,
                directory_score,
                context_boost,
                type_boost,
            ),
            community_score: candidate.community_score,
            directory_score,
            context: candidate.primary_context,
            context_boost,
            type_boost,
            mentions: candidate.mentions,
            sources: candidate.sources,
            rating: place.rating,
            review_count: place.review_count,
            types: place.types,
            address: place.formatted_address,
            short_address: place.short_address,
            place_id: place.place_id,
            photo_references: place.photo_references,
            city: city.to_string(),
            category,
            source_url: String::new(),
        }
    }

    pub fn with_source_url(mut self, source_url: &str) -> Self {
        self.source_url = source_url.to_string();
        self
    }
}
