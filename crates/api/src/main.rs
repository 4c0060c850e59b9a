use anyhow::{Context, Result};
use api::config::CacheBackend;
use api::telemetry::init_tracing;
use api::{AppConfig, AppState, Metrics, Scraper, router};
use index::{FileLocationStore, KvLocationStore, LocationStore};
use ingest::RedditClient;
use places::{GooglePlacesClient, RateLimiter};
use rank::LocationPipeline;
use std::sync::Arc;

fn build_store(config: &AppConfig) -> Result<Arc<dyn LocationStore>> {
    let store: Arc<dyn LocationStore> = match config.cache.backend {
        CacheBackend::File => Arc::new(FileLocationStore::new(config.cache.path.clone())),
        CacheBackend::Kv => {
            let url = config.cache.kv_url.clone().context("KV_REST_API_URL is not set")?;
            let token = config
                .cache
                .kv_token
                .clone()
                .context("KV_REST_API_TOKEN is not set")?;
            Arc::new(KvLocationStore::new(url, token))
        }
    };
    Ok(store)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = AppConfig::from_env()?;

    let limiter = RateLimiter::new(config.rate_limit.min_interval_ms, config.rate_limit.backoff_ms);
    let directory = GooglePlacesClient::new(config.credentials.google_places_api_key.clone(), limiter);

    let source = RedditClient::new(
        "https://www.reddit.com".to_string(),
        config.credentials.reddit_user_agent.clone(),
    )
    .with_comment_limit(config.mode.comment_limit())
    .with_post_fetch_delay(config.mode.post_fetch_delay());

    let scraper: Arc<dyn Scraper> = Arc::new(LocationPipeline::new(source, directory));
    let store = build_store(&config)?;

    let addr = config.server.addr();
    let state = Arc::new(AppState::new(config, scraper, store, Metrics::new()));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("Server listening on http://{addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
