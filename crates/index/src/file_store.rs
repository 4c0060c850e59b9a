use async_trait::async_trait;
use rank::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::schema::{BucketMetadata, CachedLocation, CityMetadata, CityRecord};
use crate::{LocationStore, bucket_metadata, describe_location, merge_locations};

/// On-disk layout: city -> category -> entries.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheDocument {
    #[serde(default)]
    locations: BTreeMap<String, BTreeMap<String, Vec<CachedLocation>>>,
    #[serde(default)]
    metadata: BTreeMap<String, BTreeMap<String, BucketMetadata>>,
    #[serde(default)]
    place_id_index: BTreeMap<String, String>,
    #[serde(default)]
    city_metadata: BTreeMap<String, CityMetadata>,
}

/// Location cache kept in a single JSON file.
pub struct FileLocationStore {
    path: PathBuf,
    // Serializes read-modify-write cycles
    lock: Mutex<()>,
}

impl FileLocationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<CacheDocument, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) if raw.trim().is_empty() => Ok(CacheDocument::default()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(CacheDocument::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, document: &CacheDocument) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(document)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(path = %self.path.display(), "Saved location cache");
        Ok(())
    }
}

#[async_trait]
impl LocationStore for FileLocationStore {
    async fn add_locations(
        &self,
        city: &str,
        category: Category,
        locations: Vec<CachedLocation>,
        source_url: &str,
    ) -> Result<usize, StoreError> {
        let _guard = self.lock.lock().await;
        let mut document = self.load().await?;

        let added = locations.len();
        let bucket = document
            .locations
            .entry(city.to_string())
            .or_default()
            .entry(category.as_str().to_string())
            .or_default();
        merge_locations(bucket, locations);

        let total = bucket.len();
        let metadata = bucket_metadata(bucket, source_url);
        document
            .metadata
            .entry(city.to_string())
            .or_default()
            .insert(category.as_str().to_string(), metadata);

        self.save(&document).await?;

        info!(city, %category, added, total, "Cached locations");
        Ok(total)
    }

    async fn get_locations(
        &self,
        city: Option<&str>,
        category: Option<Category>,
    ) -> Result<Vec<CachedLocation>, StoreError> {
        let document = self.load().await?;

        Ok(document
            .locations
            .into_iter()
            .filter(|(bucket_city, _)| city.is_none_or(|c| c == bucket_city.as_str()))
            .flat_map(|(_, buckets)| buckets)
            .filter(|(bucket_category, _)| category.is_none_or(|c| c.as_str() == bucket_category.as_str()))
            .flat_map(|(_, entries)| entries)
            .collect())
    }

    async fn metadata(
        &self,
        city: &str,
        category: Category,
    ) -> Result<Option<BucketMetadata>, StoreError> {
        let mut document = self.load().await?;
        Ok(document
            .metadata
            .get_mut(city)
            .and_then(|buckets| buckets.remove(category.as_str())))
    }

    async fn index_city(&self, directory_id: &str, city: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut document = self.load().await?;
        document
            .place_id_index
            .insert(directory_id.to_string(), city.to_string());
        self.save(&document).await
    }

    async fn city_for_directory_id(&self, directory_id: &str) -> Result<Option<String>, StoreError> {
        let mut document = self.load().await?;
        Ok(document.place_id_index.remove(directory_id))
    }

    async fn set_city_metadata(&self, city: &str, metadata: CityMetadata) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut document = self.load().await?;
        document.city_metadata.insert(city.to_string(), metadata);
        self.save(&document).await
    }

    async fn city_metadata(&self, city: &str) -> Result<Option<CityMetadata>, StoreError> {
        let mut document = self.load().await?;
        Ok(document.city_metadata.remove(city))
    }

    async fn all_city_metadata(&self) -> Result<Vec<CityRecord>, StoreError> {
        let document = self.load().await?;
        Ok(document
            .city_metadata
            .into_iter()
            .map(|(city_name, metadata)| CityRecord {
                city_name,
                metadata,
            })
            .collect())
    }

    async fn update_description(
        &self,
        directory_id: &str,
        category: Category,
        name: &str,
        text: &str,
    ) -> Result<bool, StoreError> {
        let _guard = self.lock.lock().await;
        let mut document = self.load().await?;

        let Some(city) = document.place_id_index.get(directory_id).cloned() else {
            warn!(directory_id, "No city indexed under directory id");
            return Ok(false);
        };

        let updated = document
            .locations
            .get_mut(&city)
            .and_then(|buckets| buckets.get_mut(category.as_str()))
            .is_some_and(|bucket| describe_location(bucket, name, text));

        if !updated {
            warn!(city = %city, %category, name, "No cached location to describe");
            return Ok(false);
        }

        self.save(&document).await?;
        info!(city = %city, %category, name, "Updated location description");
        Ok(true)
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        self.save(&CacheDocument::default()).await?;
        info!(path = %self.path.display(), "Cleared location cache");
        Ok(())
    }
}
