use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::PlacesDirectory;
use crate::error::PlacesError;
use crate::rate_limit::RateLimiter;
use crate::schema::{MAX_PHOTOS, PlaceMatch};

const FIELD_MASK: &str = "places.displayName,places.rating,places.userRatingCount,places.types,places.formattedAddress,places.shortFormattedAddress,places.id,places.photos";

pub struct GooglePlacesClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
    limiter: RateLimiter,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchTextRequest<'a> {
    text_query: &'a str,
    max_result_count: u32,
}

#[derive(Deserialize)]
struct SearchTextResponse {
    #[serde(default)]
    places: Vec<Place>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Place {
    display_name: Option<LocalizedText>,
    rating: Option<f64>,
    user_rating_count: Option<u32>,
    #[serde(default)]
    types: Vec<String>,
    formatted_address: Option<String>,
    short_formatted_address: Option<String>,
    #[serde(default)]
    id: String,
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Deserialize)]
struct LocalizedText {
    text: String,
}

#[derive(Deserialize)]
struct Photo {
    name: Option<String>,
}

impl Place {
    fn into_match(self, query: &str) -> PlaceMatch {
        PlaceMatch {
            canonical_name: self
                .display_name
                .map(|name| name.text)
                .unwrap_or_else(|| query.to_string()),
            rating: self.rating,
            review_count: self.user_rating_count.unwrap_or(0),
            types: self.types,
            formatted_address: self.formatted_address.unwrap_or_default(),
            short_address: self.short_formatted_address.unwrap_or_default(),
            place_id: self.id,
            photo_references: self
                .photos
                .into_iter()
                .filter_map(|photo| photo.name)
                .take(MAX_PHOTOS)
                .collect(),
        }
    }
}

/// First place of a searchText payload.
fn parse_search_response(body: &str, query: &str) -> Result<Option<PlaceMatch>, serde_json::Error> {
    let response: SearchTextResponse = serde_json::from_str(body)?;
    Ok(response
        .places
        .into_iter()
        .next()
        .map(|place| place.into_match(query)))
}

impl GooglePlacesClient {
    pub fn new(api_key: Option<String>, limiter: RateLimiter) -> Self {
        Self::with_base_url("https://places.googleapis.com/v1".to_string(), api_key, limiter)
    }

    pub fn with_base_url(base_url: String, api_key: Option<String>, limiter: RateLimiter) -> Self {
        let api_key = api_key.filter(|key| !key.trim().is_empty());
        if api_key.is_none() {
            warn!("No Places API key configured, every directory lookup will miss");
        }

        Self {
            base_url,
            api_key,
            client: reqwest::Client::new(),
            limiter,
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    async fn search_once(&self, api_key: &str, query: &str) -> Result<Option<PlaceMatch>, PlacesError> {
        let url = format!("{}/places:searchText", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("X-Goog-Api-Key", api_key)
            .header("X-Goog-FieldMask", FIELD_MASK)
            .json(&SearchTextRequest {
                text_query: query,
                max_result_count: 1,
            })
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(PlacesError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlacesError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        parse_search_response(&body, query).map_err(|e| PlacesError::Status {
            status: status.as_u16(),
            body: format!("unparseable response: {e}"),
        })
    }
}

#[async_trait]
impl PlacesDirectory for GooglePlacesClient {
    async fn search(&self, query: &str) -> Result<Option<PlaceMatch>, PlacesError> {
        let Some(api_key) = self.api_key.as_deref() else {
            debug!(query, "Skipping directory lookup without API key");
            return Ok(None);
        };

        let found = self
            .limiter
            .run("places_search", || self.search_once(api_key, query))
            .await?;

        Ok(found.flatten())
    }

    fn photo_url(&self, reference: &str, max_width: u32) -> String {
        match self.api_key.as_deref() {
            Some(key) if !reference.is_empty() => format!(
                "{}/{}/media?maxWidthPx={}&key={}",
                self.base_url, reference, max_width, key
            ),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"{
      "places": [{
        "id": "ChIJ123",
        "displayName": {"text": "Mission Peak Regional Preserve", "languageCode": "en"},
        "rating": 4.8,
        "userRatingCount": 3120,
        "types": ["park", "tourist_attraction", "point_of_interest"],
        "formattedAddress": "Fremont, CA 94539, USA",
        "shortFormattedAddress": "Fremont",
        "photos": [
          {"name": "places/ChIJ123/photos/a"},
          {"name": "places/ChIJ123/photos/b"},
          {"name": "places/ChIJ123/photos/c"},
          {"name": "places/ChIJ123/photos/d"}
        ]
      }]
    }"#;

    fn client(key: Option<&str>) -> GooglePlacesClient {
        GooglePlacesClient::new(key.map(str::to_string), RateLimiter::new(0, 0))
    }

    #[test]
    fn test_parse_first_place() {
        let found = parse_search_response(RESPONSE, "Mission Peak San Jose")
            .unwrap()
            .unwrap();

        assert_eq!(found.canonical_name, "Mission Peak Regional Preserve");
        assert_eq!(found.review_count, 3120);
        assert_eq!(found.rating, Some(4.8));
        assert_eq!(found.place_id, "ChIJ123");
        assert_eq!(found.photo_references.len(), MAX_PHOTOS);
        assert!(found.has_type("park"));
        assert!(!found.has_any_type(&["locality", "political"]));
    }

    #[test]
    fn test_parse_empty_and_sparse() {
        assert_eq!(parse_search_response("{}", "q").unwrap(), None);

        let sparse = parse_search_response(r#"{"places": [{"id": "x"}]}"#, "Tank Hill SF")
            .unwrap()
            .unwrap();
        assert_eq!(sparse.canonical_name, "Tank Hill SF");
        assert_eq!(sparse.review_count, 0);
        assert_eq!(sparse.rating, None);
        assert!(sparse.photo_references.is_empty());
    }

    #[test]
    fn test_photo_url() {
        let with_key = client(Some("secret"));
        assert_eq!(
            with_key.photo_url("places/ChIJ123/photos/a", 800),
            "https://places.googleapis.com/v1/places/ChIJ123/photos/a/media?maxWidthPx=800&key=secret"
        );
        assert_eq!(with_key.photo_url("", 800), "");
        assert_eq!(client(None).photo_url("places/x/photos/y", 800), "");
    }

    #[test]
    fn test_photo_urls_skip_empty() {
        let with_key = client(Some("secret"));
        let urls = with_key.photo_urls(&["a".to_string(), String::new(), "b".to_string()], 400);
        assert_eq!(urls.len(), 2);
    }

    #[tokio::test]
    async fn test_search_without_key_misses() {
        let without_key = client(Some("  "));
        assert!(!without_key.has_api_key());
        assert_eq!(without_key.search("Mission Peak").await.unwrap(), None);
    }
}
