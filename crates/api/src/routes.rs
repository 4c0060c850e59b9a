use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
};
use index::{BucketMetadata, CacheSummary, CachedLocation, CityMetadata, CityRecord, LocationStore};
use rank::Category;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::metrics::MetricsSnapshot;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ScrapeRequest {
    pub url: String,
    pub city: String,
    pub category: String,
    pub target_count: Option<usize>,
    /// Directory id of the city itself, for `/places/:place_id` lookups
    pub city_place_id: Option<String>,
    pub city_metadata: Option<CityMetadata>,
}

#[derive(Debug, Serialize)]
pub struct ScrapeResponse {
    pub success: bool,
    pub city: String,
    pub category: Category,
    pub url: String,
    pub locations: Vec<CachedLocation>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct LocationsResponse {
    pub locations: Vec<CachedLocation>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BucketMetadata>,
}

impl From<Vec<CachedLocation>> for LocationsResponse {
    fn from(locations: Vec<CachedLocation>) -> Self {
        Self {
            count: locations.len(),
            locations,
            metadata: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub places_api_key: bool,
    pub cache_backend: &'static str,
    pub scrapes_in_flight: usize,
    pub cache: CacheSummary,
}

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CitiesResponse {
    pub cities: Vec<CityRecord>,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct DescriptionRequest {
    pub category: String,
    pub name: String,
    pub description: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/metrics", get(get_metrics))
        .route("/scrape/url", post(scrape_url))
        .route("/locations", get(all_locations))
        .route("/locations/:city", get(city_locations))
        .route("/locations/:city/:category", get(bucket_locations))
        .route("/places/:place_id", get(place_locations))
        .route("/places/:place_id/description", put(update_description))
        .route("/cities", get(all_cities))
        .route("/cities/:place_id", get(city_by_place_id))
        .route("/cache", delete(clear_cache))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

fn parse_category(raw: &str) -> Result<Category, ApiError> {
    Ok(raw.parse::<Category>()?)
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Outdoor location discovery API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health_check(State(state): State<Arc<AppState>>) -> Result<Json<HealthResponse>, ApiError> {
    let cache = state.store.summary().await?;

    Ok(Json(HealthResponse {
        status: "healthy",
        places_api_key: state.config.credentials.google_places_api_key.is_some(),
        cache_backend: state.config.cache.backend.as_str(),
        scrapes_in_flight: state.scrapes_in_flight(),
        cache,
    }))
}

async fn get_metrics(State(state): State<Arc<AppState>>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

async fn scrape_url(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ScrapeRequest>,
) -> Result<Json<ScrapeResponse>, ApiError> {
    let category = parse_category(&req.category)?;
    if req.city.trim().is_empty() {
        return Err(ApiError::BadRequest("city must not be empty".to_string()));
    }

    let Some(_guard) = state.begin_scrape(&req.city, category) else {
        state.metrics.record_rejected();
        return Err(ApiError::Conflict(format!("{} / {}", req.city, category)));
    };

    let target_count = req
        .target_count
        .unwrap_or(state.config.pipeline.target_count);
    let timeout = state.config.pipeline.request_timeout();
    let started = Instant::now();

    let outcome = tokio::time::timeout(
        timeout,
        state.scraper.scrape(&req.url, &req.city, category, target_count),
    )
    .await;

    let run = match outcome {
        Ok(Ok(run)) => run,
        Ok(Err(e)) => {
            state.metrics.record_failure();
            warn!(url = %req.url, error = %e, "Scrape failed");
            return Err(e.into());
        }
        Err(_) => {
            state.metrics.record_failure();
            warn!(url = %req.url, timeout_secs = timeout.as_secs(), "Scrape timed out");
            return Err(ApiError::Timeout(timeout.as_secs()));
        }
    };

    state
        .metrics
        .record_success(started.elapsed(), run.mentions_mined, run.locations.len());

    let locations: Vec<CachedLocation> = run
        .locations
        .into_iter()
        .map(|location| {
            let photo_urls = state.scraper.photo_urls(&location.photo_references);
            CachedLocation::new(location, photo_urls)
        })
        .collect();

    if !locations.is_empty() {
        state
            .store
            .add_locations(&req.city, category, locations.clone(), &req.url)
            .await?;
    }
    let city_place_id = req
        .city_place_id
        .clone()
        .or_else(|| req.city_metadata.as_ref().and_then(|m| m.place_id.clone()))
        .filter(|id| !id.is_empty());
    if let Some(city_place_id) = city_place_id {
        state.store.index_city(&city_place_id, &req.city).await?;
    }
    if let Some(metadata) = req.city_metadata {
        state.store.set_city_metadata(&req.city, metadata).await?;
    }

    info!(
        city = %req.city,
        %category,
        count = locations.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Scrape finished"
    );

    Ok(Json(ScrapeResponse {
        success: true,
        city: req.city,
        category,
        url: req.url,
        count: locations.len(),
        locations,
    }))
}

async fn all_locations(State(state): State<Arc<AppState>>) -> Result<Json<LocationsResponse>, ApiError> {
    Ok(Json(state.store.get_locations(None, None).await?.into()))
}

async fn city_locations(
    State(state): State<Arc<AppState>>,
    Path(city): Path<String>,
) -> Result<Json<LocationsResponse>, ApiError> {
    Ok(Json(state.store.get_locations(Some(&city), None).await?.into()))
}

async fn bucket_locations(
    State(state): State<Arc<AppState>>,
    Path((city, category)): Path<(String, String)>,
) -> Result<Json<LocationsResponse>, ApiError> {
    let category = parse_category(&category)?;
    let locations = state.store.get_locations(Some(&city), Some(category)).await?;
    Ok(Json(LocationsResponse {
        metadata: state.store.metadata(&city, category).await?,
        ..LocationsResponse::from(locations)
    }))
}

async fn place_locations(
    State(state): State<Arc<AppState>>,
    Path(place_id): Path<String>,
    Query(query): Query<CategoryQuery>,
) -> Result<Json<LocationsResponse>, ApiError> {
    let category = query.category.as_deref().map(parse_category).transpose()?;
    Ok(Json(
        state
            .store
            .get_locations_by_directory_id(&place_id, category)
            .await?
            .into(),
    ))
}

async fn update_description(
    State(state): State<Arc<AppState>>,
    Path(place_id): Path<String>,
    Json(req): Json<DescriptionRequest>,
) -> Result<Json<Value>, ApiError> {
    let category = parse_category(&req.category)?;
    let updated = state
        .store
        .update_description(&place_id, category, &req.name, &req.description)
        .await?;

    if !updated {
        return Err(ApiError::NotFound(format!(
            "No cached '{}' under {place_id} / {category}",
            req.name
        )));
    }
    Ok(Json(json!({ "success": true })))
}

async fn all_cities(State(state): State<Arc<AppState>>) -> Result<Json<CitiesResponse>, ApiError> {
    let cities = state.store.all_city_metadata().await?;
    Ok(Json(CitiesResponse {
        count: cities.len(),
        cities,
    }))
}

async fn city_by_place_id(
    State(state): State<Arc<AppState>>,
    Path(place_id): Path<String>,
) -> Result<Json<CityRecord>, ApiError> {
    state
        .store
        .city_by_directory_id(&place_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No city indexed under {place_id}")))
}

async fn clear_cache(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    state.store.clear().await?;
    warn!("Location cache cleared");
    Ok(Json(json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::metrics::Metrics;
    use crate::state::Scraper;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use extract::ContextTag;
    use index::FileLocationStore;
    use rank::{PipelineError, PipelineRun, ValidatedLocation};
    use std::time::Duration;
    use tower::ServiceExt;

    const URL: &str = "https://www.reddit.com/r/SanJose/comments/abc123/views/";

    enum Behaviour {
        Found,
        SourceDown,
        Slow,
    }

    struct FakeScraper(Behaviour);

    fn location(city: &str, category: Category) -> ValidatedLocation {
        ValidatedLocation {
            name: "Mission Peak Regional Preserve".to_string(),
            mined_name: "Mission Peak".to_string(),
            score: 9.2,
            community_score: 5.0,
            directory_score: 9.5,
            context: ContextTag::Nature,
            context_boost: 1.0,
            type_boost: 1.2,
            mentions: 2,
            sources: vec!["Post: Best views...".to_string()],
            rating: Some(4.8),
            review_count: 3000,
            types: vec!["park".to_string()],
            address: "Fremont, CA".to_string(),
            short_address: "Fremont".to_string(),
            place_id: "p-mission".to_string(),
            photo_references: vec!["places/p-mission/photos/1".to_string()],
            city: city.to_string(),
            category,
            source_url: URL.to_string(),
        }
    }

    #[async_trait]
    impl Scraper for FakeScraper {
        async fn scrape(
            &self,
            _reference: &str,
            city: &str,
            category: Category,
            _target_count: usize,
        ) -> Result<PipelineRun, PipelineError> {
            match self.0 {
                Behaviour::Found => Ok(PipelineRun {
                    locations: vec![location(city, category)],
                    source_items: 3,
                    mentions_mined: 6,
                    candidates_ranked: 2,
                }),
                Behaviour::SourceDown => Err(PipelineError::SourceUnavailable(anyhow::anyhow!(
                    "reddit returned 503"
                ))),
                Behaviour::Slow => {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(PipelineRun {
                        locations: vec![],
                        source_items: 0,
                        mentions_mined: 0,
                        candidates_ranked: 0,
                    })
                }
            }
        }

        fn photo_urls(&self, references: &[String]) -> Vec<String> {
            references.iter().map(|r| format!("https://photos.test/{r}")).collect()
        }
    }

    fn state(behaviour: Behaviour, dir: &tempfile::TempDir) -> Arc<AppState> {
        let mut config = AppConfig::default();
        config.pipeline.request_timeout_secs = 1;
        let store: Arc<dyn LocationStore> =
            Arc::new(FileLocationStore::new(dir.path().join("locations.json")));
        Arc::new(AppState::new(
            config,
            Arc::new(FakeScraper(behaviour)),
            store,
            Metrics::new(),
        ))
    }

    fn scrape_request(category: &str) -> Request<Body> {
        let body = json!({
            "url": URL,
            "city": "San Jose",
            "category": category,
            "city_place_id": "city-sj",
        });
        Request::post("/scrape/url")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(state: &Arc<AppState>, request: Request<Body>) -> (StatusCode, Value) {
        let response = router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_city_metadata_descriptions_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(Behaviour::Found, &dir);

        let scrape = json!({
            "url": URL,
            "city": "San Jose",
            "category": "hiking",
            "city_metadata": { "place_id": "city-sj", "state": "CA" },
        });
        let (status, _) = send(&state, json_request("POST", "/scrape/url", scrape)).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&state, get_request("/cities")).await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["cities"][0]["city_name"], "San Jose");
        assert_eq!(body["cities"][0]["state"], "CA");

        let (status, body) = send(&state, get_request("/cities/city-sj")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["place_id"], "city-sj");
        let (status, _) = send(&state, get_request("/cities/unknown")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let describe = json!({
            "category": "hiking",
            "name": "Mission Peak",
            "description": "Exposed climb with bay views.",
        });
        let (status, _) = send(
            &state,
            json_request("PUT", "/places/city-sj/description", describe.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&state, get_request("/locations/San%20Jose/hiking")).await;
        assert_eq!(body["locations"][0]["description"], "Exposed climb with bay views.");

        let (status, _) = send(
            &state,
            json_request("PUT", "/places/unknown/description", describe),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &state,
            Request::delete("/cache").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = send(&state, get_request("/locations")).await;
        assert_eq!(body["count"], 0);
        let (_, body) = send(&state, get_request("/cities")).await;
        assert_eq!(body["count"], 0);
    }

    #[tokio::test]
    async fn test_scrape_caches_results() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(Behaviour::Found, &dir);

        let (status, body) = send(&state, scrape_request("viewpoint")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["category"], "viewpoints");
        assert_eq!(body["count"], 1);
        assert_eq!(
            body["locations"][0]["photo_urls"][0],
            "https://photos.test/places/p-mission/photos/1"
        );

        let (_, body) = send(&state, get_request("/locations/San%20Jose/viewpoints")).await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["locations"][0]["name"], "Mission Peak Regional Preserve");
        assert_eq!(body["metadata"]["total_locations"], 1);
        assert_eq!(body["metadata"]["source_url"], URL);

        let (_, body) = send(&state, get_request("/places/p-mission?category=viewpoints")).await;
        assert_eq!(body["count"], 1);

        let (_, body) = send(&state, get_request("/places/city-sj")).await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["locations"][0]["city"], "San Jose");

        let (_, body) = send(&state, get_request("/metrics")).await;
        assert_eq!(body["successful_scrapes"], 1);
        assert_eq!(body["total_mentions_mined"], 6);

        let (_, body) = send(&state, get_request("/health")).await;
        assert_eq!(body["cache"]["total_locations"], 1);
        assert_eq!(body["places_api_key"], false);
    }

    #[tokio::test]
    async fn test_bad_category_is_400() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(Behaviour::Found, &dir);

        let (status, body) = send(&state, scrape_request("restaurants")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, _) = send(&state, get_request("/locations/San%20Jose/restaurants")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_source_failure_is_502() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(Behaviour::SourceDown, &dir);

        let (status, _) = send(&state, scrape_request("hiking")).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(state.metrics.snapshot().failed_scrapes, 1);
    }

    #[tokio::test]
    async fn test_timeout_is_504() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(Behaviour::Slow, &dir);

        let (status, _) = send(&state, scrape_request("hiking")).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(state.scrapes_in_flight(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_scrape_is_409() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(Behaviour::Found, &dir);

        let _held = state.begin_scrape("san jose ", Category::Viewpoints).unwrap();
        let (status, _) = send(&state, scrape_request("viewpoints")).await;
        assert_eq!(status, StatusCode::CONFLICT);

        // A different bucket is unaffected
        let (status, _) = send(&state, scrape_request("hiking")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_root_and_empty_listing() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(Behaviour::Found, &dir);

        let (status, body) = send(&state, get_request("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["version"].is_string());

        let (_, body) = send(&state, get_request("/locations")).await;
        assert_eq!(body["count"], 0);
    }
}
