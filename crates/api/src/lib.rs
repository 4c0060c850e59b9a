pub mod config;
pub mod error;
pub mod metrics;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use config::AppConfig;
pub use error::ApiError;
pub use metrics::{Metrics, MetricsSnapshot};
pub use routes::router;
pub use state::{AppState, Scraper};
