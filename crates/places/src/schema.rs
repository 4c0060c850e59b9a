use serde::{Deserialize, Serialize};

/// Photo references kept per place.
pub const MAX_PHOTOS: usize = 3;

/// Best directory match for a free-text query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceMatch {
    pub canonical_name: String,
    pub rating: Option<f64>,
    pub review_count: u32,
    pub types: Vec<String>,
    pub formatted_address: String,
    pub short_address: String,
    pub place_id: String,
    pub photo_references: Vec<String>,
}

impl PlaceMatch {
    pub fn has_type(&self, place_type: &str) -> bool {
        self.types.iter().any(|t| t == place_type)
    }

    pub fn has_any_type(&self, place_types: &[&str]) -> bool {
        place_types.iter().any(|t| self.has_type(t))
    }
}
