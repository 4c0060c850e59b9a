use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlacesError {
    #[error("Places request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Places API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Places API rate limit hit")]
    RateLimited,
}
