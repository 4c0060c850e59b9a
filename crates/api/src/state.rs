use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use index::LocationStore;
use ingest::DiscussionSource;
use places::{DEFAULT_PHOTO_WIDTH, PlacesDirectory};
use rank::{Category, LocationPipeline, PipelineError, PipelineRun};
use std::sync::Arc;
use std::time::Instant;

use crate::config::AppConfig;
use crate::metrics::Metrics;

/// What the HTTP layer needs from the extraction pipeline.
#[async_trait]
pub trait Scraper: Send + Sync {
    async fn scrape(
        &self,
        reference: &str,
        city: &str,
        category: Category,
        target_count: usize,
    ) -> Result<PipelineRun, PipelineError>;

    fn photo_urls(&self, references: &[String]) -> Vec<String>;
}

#[async_trait]
impl<S: DiscussionSource, D: PlacesDirectory> Scraper for LocationPipeline<S, D> {
    async fn scrape(
        &self,
        reference: &str,
        city: &str,
        category: Category,
        target_count: usize,
    ) -> Result<PipelineRun, PipelineError> {
        self.run(reference, city, category.as_str(), target_count).await
    }

    fn photo_urls(&self, references: &[String]) -> Vec<String> {
        self.directory().photo_urls(references, DEFAULT_PHOTO_WIDTH)
    }
}

pub struct AppState {
    pub config: AppConfig,
    pub scraper: Arc<dyn Scraper>,
    pub store: Arc<dyn LocationStore>,
    pub metrics: Arc<Metrics>,
    in_flight: DashMap<String, Instant>,
}

/// Releases the (city, category) slot when dropped.
pub struct ScrapeGuard<'a> {
    in_flight: &'a DashMap<String, Instant>,
    key: String,
}

impl Drop for ScrapeGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.remove(&self.key);
    }
}

pub fn scrape_key(city: &str, category: Category) -> String {
    format!("{}:{}", city.trim().to_lowercase(), category)
}

impl AppState {
    pub fn new(
        config: AppConfig,
        scraper: Arc<dyn Scraper>,
        store: Arc<dyn LocationStore>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            config,
            scraper,
            store,
            metrics,
            in_flight: DashMap::new(),
        }
    }

    /// Claim the single writer slot for a bucket, or `None` if it is taken.
    pub fn begin_scrape(&self, city: &str, category: Category) -> Option<ScrapeGuard<'_>> {
        let key = scrape_key(city, category);
        match self.in_flight.entry(key.clone()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(Instant::now());
                Some(ScrapeGuard {
                    in_flight: &self.in_flight,
                    key,
                })
            }
        }
    }

    pub fn scrapes_in_flight(&self) -> usize {
        self.in_flight.len()
    }
}
