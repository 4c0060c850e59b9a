use async_trait::async_trait;
use rank::Category;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::schema::{BucketMetadata, CachedLocation, CityMetadata, CityRecord};
use crate::{LocationStore, bucket_metadata, describe_location, merge_locations};

const PLACE_ID_INDEX_KEY: &str = "place_id_index";

fn locations_key(city: &str, category: &str) -> String {
    format!("locations:{city}:{category}")
}

fn metadata_key(city: &str, category: &str) -> String {
    format!("metadata:{city}:{category}")
}

const CITY_METADATA_PREFIX: &str = "city_metadata:";

fn city_metadata_key(city: &str) -> String {
    format!("{CITY_METADATA_PREFIX}{city}")
}

/// Key families removed by `clear`, besides the place id index.
const CLEARED_PATTERNS: &[&str] = &["locations:*", "metadata:*", "city_metadata:*"];

/// Split `locations:{city}:{category}` back into its parts.
fn parse_locations_key(key: &str) -> Option<(&str, &str)> {
    key.strip_prefix("locations:")?.rsplit_once(':')
}

#[derive(Deserialize)]
struct CommandResponse {
    result: Option<Value>,
    error: Option<String>,
}

fn parse_response(body: &str) -> Result<Value, StoreError> {
    let response: CommandResponse = serde_json::from_str(body)?;
    match response.error {
        Some(error) => Err(StoreError::Remote(error)),
        None => Ok(response.result.unwrap_or(Value::Null)),
    }
}

/// Location cache in a Redis-compatible key-value store spoken to over
/// the Upstash REST protocol.
pub struct KvLocationStore {
    url: String,
    token: String,
    client: reqwest::Client,
    // Serializes read-modify-write cycles from this process
    lock: Mutex<()>,
}

impl KvLocationStore {
    pub fn new(url: String, token: String) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            token,
            client: reqwest::Client::new(),
            lock: Mutex::new(()),
        }
    }

    async fn command(&self, args: &[&str]) -> Result<Value, StoreError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(args)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() && !body.contains("\"error\"") {
            return Err(StoreError::Remote(format!("{status}: {body}")));
        }

        parse_response(&body)
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.command(&["GET", key]).await? {
            Value::String(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            _ => Ok(None),
        }
    }

    async fn set_json<T: serde::Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value)?;
        self.command(&["SET", key, &raw]).await?;
        Ok(())
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        let keys = match self.command(&["KEYS", pattern]).await? {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        };
        debug!(pattern, count = keys.len(), "Listed keys");
        Ok(keys)
    }

    async fn bucket(&self, key: &str) -> Result<Vec<CachedLocation>, StoreError> {
        Ok(self.get_json(key).await?.unwrap_or_default())
    }
}

#[async_trait]
impl LocationStore for KvLocationStore {
    async fn add_locations(
        &self,
        city: &str,
        category: Category,
        locations: Vec<CachedLocation>,
        source_url: &str,
    ) -> Result<usize, StoreError> {
        let _guard = self.lock.lock().await;

        let key = locations_key(city, category.as_str());
        let added = locations.len();
        let mut bucket = self.bucket(&key).await?;
        merge_locations(&mut bucket, locations);

        self.set_json(&key, &bucket).await?;
        self.set_json(
            &metadata_key(city, category.as_str()),
            &bucket_metadata(&bucket, source_url),
        )
        .await?;

        info!(city, %category, added, total = bucket.len(), "Cached locations");
        Ok(bucket.len())
    }

    async fn get_locations(
        &self,
        city: Option<&str>,
        category: Option<Category>,
    ) -> Result<Vec<CachedLocation>, StoreError> {
        if let (Some(city), Some(category)) = (city, category) {
            return self.bucket(&locations_key(city, category.as_str())).await;
        }

        let pattern = match city {
            Some(city) => format!("locations:{city}:*"),
            None => "locations:*".to_string(),
        };

        let mut keys = self.keys(&pattern).await?;
        keys.sort();

        let mut found = Vec::new();
        for key in keys {
            let Some((_, bucket_category)) = parse_locations_key(&key) else {
                continue;
            };
            if category.is_some_and(|c| c.as_str() != bucket_category) {
                continue;
            }
            found.extend(self.bucket(&key).await?);
        }
        Ok(found)
    }

    async fn metadata(
        &self,
        city: &str,
        category: Category,
    ) -> Result<Option<BucketMetadata>, StoreError> {
        self.get_json(&metadata_key(city, category.as_str())).await
    }

    async fn index_city(&self, directory_id: &str, city: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut index: BTreeMap<String, String> =
            self.get_json(PLACE_ID_INDEX_KEY).await?.unwrap_or_default();
        index.insert(directory_id.to_string(), city.to_string());
        self.set_json(PLACE_ID_INDEX_KEY, &index).await
    }

    async fn city_for_directory_id(&self, directory_id: &str) -> Result<Option<String>, StoreError> {
        let mut index: BTreeMap<String, String> =
            self.get_json(PLACE_ID_INDEX_KEY).await?.unwrap_or_default();
        Ok(index.remove(directory_id))
    }

    async fn set_city_metadata(&self, city: &str, metadata: CityMetadata) -> Result<(), StoreError> {
        self.set_json(&city_metadata_key(city), &metadata).await
    }

    async fn city_metadata(&self, city: &str) -> Result<Option<CityMetadata>, StoreError> {
        self.get_json(&city_metadata_key(city)).await
    }

    async fn all_city_metadata(&self) -> Result<Vec<CityRecord>, StoreError> {
        let mut keys = self.keys(&format!("{CITY_METADATA_PREFIX}*")).await?;
        keys.sort();

        let mut cities = Vec::new();
        for key in keys {
            let Some(city_name) = key.strip_prefix(CITY_METADATA_PREFIX) else {
                continue;
            };
            if let Some(metadata) = self.get_json::<CityMetadata>(&key).await? {
                cities.push(CityRecord {
                    city_name: city_name.to_string(),
                    metadata,
                });
            }
        }
        Ok(cities)
    }

    async fn update_description(
        &self,
        directory_id: &str,
        category: Category,
        name: &str,
        text: &str,
    ) -> Result<bool, StoreError> {
        let _guard = self.lock.lock().await;

        let Some(city) = self.city_for_directory_id(directory_id).await? else {
            warn!(directory_id, "No city indexed under directory id");
            return Ok(false);
        };

        let key = locations_key(&city, category.as_str());
        let mut bucket = self.bucket(&key).await?;
        if !describe_location(&mut bucket, name, text) {
            warn!(city = %city, %category, name, "No cached location to describe");
            return Ok(false);
        }

        self.set_json(&key, &bucket).await?;
        info!(city = %city, %category, name, "Updated location description");
        Ok(true)
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;

        let mut keys = vec![PLACE_ID_INDEX_KEY.to_string()];
        for pattern in CLEARED_PATTERNS {
            keys.extend(self.keys(pattern).await?);
        }

        let mut command = vec!["DEL"];
        command.extend(keys.iter().map(String::as_str));
        self.command(&command).await?;

        info!(deleted = keys.len(), "Cleared location cache");
        Ok(())
    }
}
