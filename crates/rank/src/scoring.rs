//! Score lookup tables. Everything here is a pure function over constants.

use extract::ContextTag;

pub const COMMUNITY_WEIGHT: f64 = 0.4;
pub const DIRECTORY_WEIGHT: f64 = 0.6;

/// Comment endorsement counts more than post text.
pub const COMMENT_MULTIPLIER: f64 = 1.5;

/// Directory types that mark a concrete destination.
pub const BOOSTED_TYPES: &[&str] = &[
    "point_of_interest",
    "establishment",
    "tourist_attraction",
    "natural_feature",
    "amusement_park",
    "park",
];

/// Directory types that mark a broad area rather than a spot.
pub const PENALIZED_TYPES: &[&str] = &["political", "colloquial_area", "locality"];

/// (minimum review count, confidence), highest band first.
const REVIEW_BANDS: &[(u32, f64)] = &[(500, 1.0), (100, 0.9), (50, 0.8), (20, 0.7), (10, 0.6)];
const LOW_REVIEW_CONFIDENCE: f64 = 0.4;

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn post_weight(score: i64) -> f64 {
    (score as f64 / 10.0).max(1.0)
}

pub fn comment_weight(score: i64) -> f64 {
    (score as f64 / 5.0).max(1.0) * COMMENT_MULTIPLIER
}

pub fn context_boost(context: ContextTag) -> f64 {
    match context {
        ContextTag::Recommendation => 1.5,
        ContextTag::Descriptive => 1.3,
        ContextTag::Business => 1.2,
        ContextTag::Quoted => 1.1,
        ContextTag::Nature => 1.0,
        ContextTag::List => 0.9,
    }
}

pub fn type_boost(types: &[String]) -> f64 {
    let has_any = |wanted: &[&str]| types.iter().any(|t| wanted.contains(&t.as_str()));

    if has_any(BOOSTED_TYPES) {
        1.2
    } else if has_any(PENALIZED_TYPES) {
        0.7
    } else {
        1.0
    }
}

pub fn review_confidence(review_count: u32) -> f64 {
    REVIEW_BANDS
        .iter()
        .find(|(min_reviews, _)| review_count >= *min_reviews)
        .map(|(_, confidence)| *confidence)
        .unwrap_or(LOW_REVIEW_CONFIDENCE)
}

/// Directory quality on a 0-10 scale: the 1-5 star rating rescaled and
/// discounted by how many reviews back it.
pub fn directory_score(rating: Option<f64>, review_count: u32) -> f64 {
    match rating {
        Some(rating) if rating > 0.0 && review_count > 0 => {
            round1((rating - 1.0) * 2.5 * review_confidence(review_count))
        }
        _ => 0.0,
    }
}

pub fn combined_score(community: f64, directory: f64, context_boost: f64, type_boost: f64) -> f64 {
    round1((community * COMMUNITY_WEIGHT + directory * DIRECTORY_WEIGHT) * context_boost * type_boost)
}
