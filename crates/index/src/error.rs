use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Cache file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Key-value store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Key-value store error: {0}")]
    Remote(String),
}
