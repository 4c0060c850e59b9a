use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::PlacesError;

/// Retries after a rate-limit response before giving up on a query.
const MAX_RATE_LIMIT_RETRIES: usize = 1;

/// Spaces calls by a fixed minimum interval and absorbs a single
/// rate-limit response per call with a fixed backoff.
pub struct RateLimiter {
    min_interval: Duration,
    backoff: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval_ms: u64, backoff_ms: u64) -> Self {
        Self {
            min_interval: Duration::from_millis(min_interval_ms),
            backoff: Duration::from_millis(backoff_ms),
            last_call: Mutex::new(None),
        }
    }

    /// Wait until the minimum interval since the previous call has passed.
    pub async fn wait_turn(&self) {
        let mut last_call = self.last_call.lock().await;
        if let Some(previous) = *last_call {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        *last_call = Some(Instant::now());
    }

    /// Run a rate-limited operation.
    ///
    /// A `RateLimited` error triggers one backoff and retry; if that is
    /// throttled too the call resolves to `Ok(None)`.
    pub async fn run<F, Fut, T>(&self, operation_name: &str, mut f: F) -> Result<Option<T>, PlacesError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, PlacesError>>,
    {
        let mut attempt = 0;

        loop {
            self.wait_turn().await;

            match f().await {
                Ok(result) => {
                    if attempt > 0 {
                        info!(
                            operation = operation_name,
                            attempts = attempt + 1,
                            "Operation succeeded after rate limit backoff"
                        );
                    }
                    return Ok(Some(result));
                }
                Err(PlacesError::RateLimited) if attempt < MAX_RATE_LIMIT_RETRIES => {
                    attempt += 1;
                    warn!(
                        operation = operation_name,
                        attempt = attempt,
                        backoff_ms = self.backoff.as_millis(),
                        "Rate limited, backing off"
                    );
                    sleep(self.backoff).await;
                }
                Err(PlacesError::RateLimited) => {
                    warn!(
                        operation = operation_name,
                        attempts = attempt + 1,
                        "Still rate limited after backoff, treating as no match"
                    );
                    return Ok(None);
                }
                Err(e) => return Err(e),
            }
        }
    }
}
