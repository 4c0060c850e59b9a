use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

pub struct Metrics {
    started_at: Instant,

    // Counters
    total_scrapes: AtomicUsize,
    successful_scrapes: AtomicUsize,
    failed_scrapes: AtomicUsize,
    rejected_scrapes: AtomicUsize,

    // Timing (in microseconds), successful runs only
    total_pipeline_time_us: AtomicU64,

    // Counts
    total_mentions_mined: AtomicUsize,
    total_locations_validated: AtomicUsize,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            started_at: Instant::now(),
            total_scrapes: AtomicUsize::new(0),
            successful_scrapes: AtomicUsize::new(0),
            failed_scrapes: AtomicUsize::new(0),
            rejected_scrapes: AtomicUsize::new(0),
            total_pipeline_time_us: AtomicU64::new(0),
            total_mentions_mined: AtomicUsize::new(0),
            total_locations_validated: AtomicUsize::new(0),
        })
    }

    pub fn record_success(&self, duration: Duration, mentions: usize, locations: usize) {
        self.total_scrapes.fetch_add(1, Ordering::Relaxed);
        self.successful_scrapes.fetch_add(1, Ordering::Relaxed);
        self.total_pipeline_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.total_mentions_mined.fetch_add(mentions, Ordering::Relaxed);
        self.total_locations_validated
            .fetch_add(locations, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.total_scrapes.fetch_add(1, Ordering::Relaxed);
        self.failed_scrapes.fetch_add(1, Ordering::Relaxed);
    }

    /// A scrape turned away because the same bucket was already being scraped.
    pub fn record_rejected(&self) {
        self.rejected_scrapes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let successful = self.successful_scrapes.load(Ordering::Relaxed);
        let total_us = self.total_pipeline_time_us.load(Ordering::Relaxed) as f64;

        MetricsSnapshot {
            uptime_secs: self.started_at.elapsed().as_secs(),
            total_scrapes: self.total_scrapes.load(Ordering::Relaxed),
            successful_scrapes: successful,
            failed_scrapes: self.failed_scrapes.load(Ordering::Relaxed),
            rejected_scrapes: self.rejected_scrapes.load(Ordering::Relaxed),
            avg_pipeline_time_ms: if successful == 0 {
                0.0
            } else {
                total_us / successful as f64 / 1000.0
            },
            total_mentions_mined: self.total_mentions_mined.load(Ordering::Relaxed),
            total_locations_validated: self.total_locations_validated.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: u64,
    pub total_scrapes: usize,
    pub successful_scrapes: usize,
    pub failed_scrapes: usize,
    pub rejected_scrapes: usize,
    pub avg_pipeline_time_ms: f64,
    pub total_mentions_mined: usize,
    pub total_locations_validated: usize,
}
