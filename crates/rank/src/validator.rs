use extract::gazetteer::KNOWN_VIEWPOINTS;
use extract::{CanonicalCandidate, normalize_key};
use places::{PlaceMatch, PlacesDirectory};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

use crate::category::Category;
use crate::schema::ValidatedLocation;

pub const ELEVATION_KEYWORDS: &[&str] = &[
    "hill", "peak", "mount", "mountain", "heights", "ridge", "summit", "overlook", "vista",
];
pub const TRAIL_KEYWORDS: &[&str] = &["trail", "path", "creek", "wilderness", "preserve"];

/// Area classifications a viewpoint may still carry.
const AREA_TYPES: &[&str] = &["neighborhood", "political", "sublocality"];
/// Types allowed through with fewer than `MIN_REVIEWS` reviews.
const NATURAL_TYPES: &[&str] = &["natural_feature", "park", "tourist_attraction"];
const BROAD_TYPES: &[&str] = &["colloquial_area", "country", "administrative_area_level_1"];

const MIN_REVIEWS: u32 = 3;
const BROAD_MIN_REVIEWS: u32 = 20;
const POLITICAL_MIN_REVIEWS: u32 = 20;
const LOCALITY_MIN_REVIEWS: u32 = 10;

static KNOWN_LANDMARK_KEYS: LazyLock<HashSet<String>> =
    LazyLock::new(|| KNOWN_VIEWPOINTS.iter().map(|name| normalize_key(name)).collect());

/// Outcome of checking one directory match against the place-type rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    KnownLandmark,
    ElevatedArea,
    TrailName,
    ViewpointArea,
    Accepted,
    TooFewReviews,
    TooBroad,
    PoliticalArea,
    GenericLocality,
}

impl Verdict {
    pub fn is_accepted(self) -> bool {
        matches!(
            self,
            Verdict::KnownLandmark
                | Verdict::ElevatedArea
                | Verdict::TrailName
                | Verdict::ViewpointArea
                | Verdict::Accepted
        )
    }
}

pub fn is_known_landmark(name: &str) -> bool {
    KNOWN_LANDMARK_KEYS.contains(&normalize_key(name))
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Apply the category-aware filter rules, first match wins.
///
/// `name` is the mined name, not the directory's.
pub fn judge(name: &str, place: &PlaceMatch, category: Category) -> Verdict {
    let lower = name.trim().to_lowercase();
    let reviews = place.review_count;

    if is_known_landmark(name) {
        return Verdict::KnownLandmark;
    }

    if category == Category::Viewpoints
        && place.has_any_type(AREA_TYPES)
        && contains_any(&lower, ELEVATION_KEYWORDS)
    {
        return Verdict::ElevatedArea;
    }

    if category == Category::Hiking && contains_any(&lower, TRAIL_KEYWORDS) {
        return Verdict::TrailName;
    }

    if reviews < MIN_REVIEWS && !place.has_any_type(NATURAL_TYPES) {
        return Verdict::TooFewReviews;
    }

    if place.has_any_type(BROAD_TYPES) && reviews < BROAD_MIN_REVIEWS {
        return Verdict::TooBroad;
    }

    if place.has_type("political") {
        if category == Category::Viewpoints {
            return Verdict::ViewpointArea;
        }
        if reviews < POLITICAL_MIN_REVIEWS {
            return Verdict::PoliticalArea;
        }
    }

    if place.has_type("locality") && reviews < LOCALITY_MIN_REVIEWS {
        return Verdict::GenericLocality;
    }

    Verdict::Accepted
}

/// Confirms ranked candidates against a places directory and re-scores them.
pub struct Validator<D> {
    directory: D,
}

impl<D: PlacesDirectory> Validator<D> {
    pub fn new(directory: D) -> Self {
        Self { directory }
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Validated locations, highest combined score first.
    ///
    /// Candidates the directory cannot find, that fail the type rules, or
    /// whose lookup errors out are dropped and logged.
    pub async fn validate(
        &self,
        candidates: Vec<CanonicalCandidate>,
        city: &str,
        category: Category,
    ) -> Vec<ValidatedLocation> {
        let total = candidates.len();
        let mut validated = Vec::with_capacity(total);

        for candidate in candidates {
            let query = format!("{} {}", candidate.name, city).trim().to_string();
            debug!(candidate = %candidate.name, query = %query, "Looking up candidate");

            let place = match self.directory.search(&query).await {
                Ok(Some(place)) => place,
                Ok(None) => {
                    info!(candidate = %candidate.name, "Not found in places directory");
                    continue;
                }
                Err(e) => {
                    warn!(candidate = %candidate.name, error = %e, "Directory lookup failed, skipping");
                    continue;
                }
            };

            let verdict = judge(&candidate.name, &place, category);
            if !verdict.is_accepted() {
                info!(
                    candidate = %candidate.name,
                    place = %place.canonical_name,
                    review_count = place.review_count,
                    reason = ?verdict,
                    "Filtered out"
                );
                continue;
            }

            debug!(candidate = %candidate.name, place = %place.canonical_name, reason = ?verdict, "Accepted");
            validated.push(ValidatedLocation::from_match(candidate, place, city, category));
        }

        // Stable: equal scores keep community ranking order
        validated.sort_by(|a, b| b.score.total_cmp(&a.score));

        info!(validated = validated.len(), candidates = total, "Validated candidates");
        validated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(types: &[&str], review_count: u32) -> PlaceMatch {
        PlaceMatch {
            canonical_name: "Somewhere".to_string(),
            rating: Some(4.5),
            review_count,
            types: types.iter().map(|t| t.to_string()).collect(),
            formatted_address: String::new(),
            short_address: String::new(),
            place_id: "id".to_string(),
            photo_references: vec![],
        }
    }

    #[test]
    fn test_review_floor() {
        let verdict = judge("Lookout Cafe", &place(&["point_of_interest"], 2), Category::DogParks);
        assert_eq!(verdict, Verdict::TooFewReviews);
        assert!(!verdict.is_accepted());

        let verdict = judge("Quiet Meadow", &place(&["natural_feature"], 0), Category::DogParks);
        assert_eq!(verdict, Verdict::Accepted);
    }

    #[test]
    fn test_known_landmark_overrides() {
        let political = place(&["political"], 0);
        assert_eq!(judge("Twin Peaks", &political, Category::DogParks), Verdict::KnownLandmark);
        assert_eq!(judge("the twin peaks", &political, Category::Hiking), Verdict::KnownLandmark);
        assert_eq!(judge("Mt. Hamilton", &political, Category::Hiking), Verdict::KnownLandmark);
    }

    #[test]
    fn test_viewpoint_leniency() {
        let neighborhood = place(&["neighborhood", "political"], 1);
        assert_eq!(judge("Skyview Heights", &neighborhood, Category::Viewpoints), Verdict::ElevatedArea);
        assert_eq!(judge("Skyview Heights", &neighborhood, Category::Hiking), Verdict::TooFewReviews);

        let political = place(&["political"], 5);
        assert_eq!(judge("Downtown", &political, Category::Viewpoints), Verdict::ViewpointArea);
        assert_eq!(judge("Downtown", &political, Category::DogParks), Verdict::PoliticalArea);
    }

    #[test]
    fn test_hiking_leniency() {
        let route = place(&["route"], 0);
        assert_eq!(judge("Coyote Creek", &route, Category::Hiking), Verdict::TrailName);
        assert_eq!(judge("Coyote Creek", &route, Category::Viewpoints), Verdict::TooFewReviews);
    }

    #[test]
    fn test_broad_areas() {
        assert_eq!(judge("Bay Area", &place(&["colloquial_area"], 19), Category::Hiking), Verdict::TooBroad);
        assert_eq!(judge("Bay Area", &place(&["colloquial_area"], 20), Category::Hiking), Verdict::Accepted);
        assert_eq!(judge("Campbell", &place(&["locality"], 9), Category::Hiking), Verdict::GenericLocality);
        assert_eq!(judge("Campbell", &place(&["locality"], 10), Category::Hiking), Verdict::Accepted);
    }
}
