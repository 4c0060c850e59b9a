pub mod error;
pub mod file_store;
pub mod kv_store;
pub mod schema;

pub use error::StoreError;
pub use file_store::FileLocationStore;
pub use kv_store::KvLocationStore;
pub use schema::{BucketMetadata, CacheSummary, CachedLocation, CityMetadata, CityRecord, CitySummary};

use async_trait::async_trait;
use chrono::Utc;
use rank::Category;

/// Persistent home of validated locations, bucketed by (city, category).
///
/// Backends differ only in where the bytes live; merge and lookup rules are
/// the shared functions in this module.
#[async_trait]
pub trait LocationStore: Send + Sync {
    /// Merge locations into a bucket. Returns the bucket size afterwards.
    async fn add_locations(
        &self,
        city: &str,
        category: Category,
        locations: Vec<CachedLocation>,
        source_url: &str,
    ) -> Result<usize, StoreError>;

    async fn get_locations(
        &self,
        city: Option<&str>,
        category: Option<Category>,
    ) -> Result<Vec<CachedLocation>, StoreError>;

    async fn metadata(
        &self,
        city: &str,
        category: Category,
    ) -> Result<Option<BucketMetadata>, StoreError>;

    /// Record that a directory id (usually the city's own) names `city`.
    async fn index_city(&self, directory_id: &str, city: &str) -> Result<(), StoreError>;

    async fn city_for_directory_id(&self, directory_id: &str) -> Result<Option<String>, StoreError>;

    async fn set_city_metadata(&self, city: &str, metadata: CityMetadata) -> Result<(), StoreError>;

    async fn city_metadata(&self, city: &str) -> Result<Option<CityMetadata>, StoreError>;

    /// Every city with stored metadata, ordered by name.
    async fn all_city_metadata(&self) -> Result<Vec<CityRecord>, StoreError>;

    /// Attach a description to the entry called `name` in the bucket of the
    /// city indexed under `directory_id`. `Ok(false)` when either is unknown.
    async fn update_description(
        &self,
        directory_id: &str,
        category: Category,
        name: &str,
        text: &str,
    ) -> Result<bool, StoreError>;

    /// Drop every bucket, metadata record and index entry.
    async fn clear(&self) -> Result<(), StoreError>;

    async fn city_by_directory_id(&self, directory_id: &str) -> Result<Option<CityRecord>, StoreError> {
        let Some(city) = self.city_for_directory_id(directory_id).await? else {
            return Ok(None);
        };
        Ok(self
            .city_metadata(&city)
            .await?
            .map(|metadata| CityRecord {
                city_name: city,
                metadata,
            }))
    }

    /// Locations of the city indexed under `directory_id`, or failing that
    /// the locations whose own directory id matches.
    async fn get_locations_by_directory_id(
        &self,
        directory_id: &str,
        category: Option<Category>,
    ) -> Result<Vec<CachedLocation>, StoreError> {
        if let Some(city) = self.city_for_directory_id(directory_id).await? {
            return self.get_locations(Some(&city), category).await;
        }

        Ok(self
            .get_locations(None, category)
            .await?
            .into_iter()
            .filter(|entry| entry.place_id() == directory_id)
            .collect())
    }

    async fn summary(&self) -> Result<CacheSummary, StoreError> {
        let all = self.get_locations(None, None).await?;
        Ok(CacheSummary::from_locations(&all))
    }
}

/// Replace entries with the same directory id, append the rest.
pub fn merge_locations(bucket: &mut Vec<CachedLocation>, incoming: Vec<CachedLocation>) {
    for entry in incoming {
        let existing = (!entry.place_id().is_empty())
            .then(|| bucket.iter().position(|e| e.place_id() == entry.place_id()))
            .flatten();

        match existing {
            Some(pos) => {
                let mut entry = entry;
                // A rescrape keeps the write-up of the entry it replaces
                if entry.description.is_none() {
                    entry.description = bucket[pos].description.take();
                    entry.description_updated = bucket[pos].description_updated.take();
                }
                bucket[pos] = entry;
            }
            None => bucket.push(entry),
        }
    }
}

/// Set the description of the first entry matching `name`.
pub fn describe_location(bucket: &mut [CachedLocation], name: &str, text: &str) -> bool {
    match bucket.iter_mut().find(|entry| entry.matches_name(name)) {
        Some(entry) => {
            entry.set_description(text);
            true
        }
        None => false,
    }
}

pub fn bucket_metadata(bucket: &[CachedLocation], source_url: &str) -> BucketMetadata {
    BucketMetadata {
        last_updated: Utc::now(),
        total_locations: bucket.len(),
        source_url: (!source_url.is_empty()).then(|| source_url.to_string()),
    }
}
