pub mod error;
pub mod google;
pub mod rate_limit;
pub mod schema;

pub use error::PlacesError;
pub use google::GooglePlacesClient;
pub use rate_limit::RateLimiter;
pub use schema::{MAX_PHOTOS, PlaceMatch};

use async_trait::async_trait;

/// Photo width used when no explicit width is requested.
pub const DEFAULT_PHOTO_WIDTH: u32 = 800;

/// A third-party places directory.
#[async_trait]
pub trait PlacesDirectory: Send + Sync {
    /// Best match for a free-text query, or `None`.
    async fn search(&self, query: &str) -> Result<Option<PlaceMatch>, PlacesError>;

    /// Fetchable URL for a photo reference. Pure transform, no network.
    fn photo_url(&self, reference: &str, max_width: u32) -> String;

    fn photo_urls(&self, references: &[String], max_width: u32) -> Vec<String> {
        references
            .iter()
            .filter(|reference| !reference.is_empty())
            .map(|reference| self.photo_url(reference, max_width))
            .collect()
    }
}
