use chrono::{DateTime, Utc};
use rank::{Category, ValidatedLocation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A validated location as persisted in the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedLocation {
    #[serde(flatten)]
    pub location: ValidatedLocation,
    /// Stable id of `location.source_url`
    pub source_id: String,
    pub cached_at: DateTime<Utc>,
    #[serde(default)]
    pub photo_urls: Vec<String>,
    /// Long-form write-up attached after caching
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_updated: Option<DateTime<Utc>>,
}

impl CachedLocation {
    pub fn new(location: ValidatedLocation, photo_urls: Vec<String>) -> Self {
        Self {
            source_id: ingest::source_id(&location.source_url),
            location,
            cached_at: Utc::now(),
            photo_urls,
            description: None,
            description_updated: None,
        }
    }

    pub fn set_description(&mut self, text: &str) {
        self.description = Some(text.to_string());
        self.description_updated = Some(Utc::now());
    }

    /// Case-insensitive match on the directory name or the mined name.
    pub fn matches_name(&self, name: &str) -> bool {
        let name = name.trim();
        self.location.name.eq_ignore_ascii_case(name) || self.location.mined_name.eq_ignore_ascii_case(name)
    }

    pub fn place_id(&self) -> &str {
        &self.location.place_id
    }

    pub fn city(&self) -> &str {
        &self.location.city
    }

    pub fn category(&self) -> Category {
        self.location.category
    }
}

/// Free-form data about a city supplied by the client that scraped it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CityMetadata {
    /// Directory id of the city itself
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRecord {
    pub city_name: String,
    #[serde(flatten)]
    pub metadata: CityMetadata,
}

/// Bookkeeping for one (city, category) bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketMetadata {
    pub last_updated: DateTime<Utc>,
    pub total_locations: usize,
    pub source_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CitySummary {
    pub categories: Vec<String>,
    pub total_locations: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheSummary {
    pub total_cities: usize,
    pub total_locations: usize,
    pub cities: BTreeMap<String, CitySummary>,
}

impl CacheSummary {
    pub fn from_locations<'a>(locations: impl IntoIterator<Item = &'a CachedLocation>) -> Self {
        let mut summary = Self::default();

        for entry in locations {
            let city = summary.cities.entry(entry.city().to_string()).or_default();
            let category = entry.category().as_str();
            if !city.categories.iter().any(|c| c == category) {
                city.categories.push(category.to_string());
            }
            city.total_locations += 1;
            summary.total_locations += 1;
        }

        summary.total_cities = summary.cities.len();
        summary
    }
}
