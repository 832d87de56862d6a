// Request and store counters for the API client
//
// Shared by ApiClient and Store through an Arc

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Client performance metrics
///
/// Uses atomic operations for thread-safe metric tracking without locks.
/// The gateway records request timings and failures; the store records
/// dispatches, broadcasts and responses dropped by request fencing.
#[derive(Debug)]
pub struct Metrics {
    /// Requests handed to the transport
    requests_sent: AtomicU64,

    /// Requests that ended in a transport error or a non-2xx status
    requests_failed: AtomicU64,

    /// Total time spent waiting on the transport, in milliseconds
    total_request_time_ms: AtomicU64,

    /// Completion events ignored because a newer request superseded them
    stale_responses_dropped: AtomicU64,

    /// Number of actions dispatched to the store
    state_updates: AtomicU64,

    /// Number of change events broadcast
    state_broadcasts: AtomicU64,

    /// Broadcasts with no live subscriber
    state_broadcast_errors: AtomicU64,

    /// Client start time
    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            requests_sent: AtomicU64::new(0),
            requests_failed: AtomicU64::new(0),
            total_request_time_ms: AtomicU64::new(0),
            stale_responses_dropped: AtomicU64::new(0),
            state_updates: AtomicU64::new(0),
            state_broadcasts: AtomicU64::new(0),
            state_broadcast_errors: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record one completed transport call and its duration
    pub fn record_request(&self, duration: Duration) {
        self.requests_sent.fetch_add(1, Ordering::Relaxed);
        self.total_request_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn record_request_failed(&self) {
        self.requests_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stale_response(&self) {
        self.stale_responses_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_state_update(&self) {
        self.state_updates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_state_broadcast(&self) {
        self.state_broadcasts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_state_broadcast_error(&self) {
        self.state_broadcast_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn requests_sent(&self) -> u64 {
        self.requests_sent.load(Ordering::Relaxed)
    }

    pub fn requests_failed(&self) -> u64 {
        self.requests_failed.load(Ordering::Relaxed)
    }

    pub fn stale_responses_dropped(&self) -> u64 {
        self.stale_responses_dropped.load(Ordering::Relaxed)
    }

    pub fn state_updates(&self) -> u64 {
        self.state_updates.load(Ordering::Relaxed)
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Average transport time per request in milliseconds
    pub fn avg_request_time_ms(&self) -> f64 {
        let total = self.total_request_time_ms.load(Ordering::Relaxed);
        let count = self.requests_sent();
        if count > 0 {
            total as f64 / count as f64
        } else {
            0.0
        }
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!("=== Client Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Requests: {} sent, {} failed (avg: {:.2}ms)",
            self.requests_sent(),
            self.requests_failed(),
            self.avg_request_time_ms()
        );
        tracing::info!(
            "State updates: {}, broadcasts: {}, broadcast errors: {}, stale responses dropped: {}",
            self.state_updates(),
            self.state_broadcasts.load(Ordering::Relaxed),
            self.state_broadcast_errors.load(Ordering::Relaxed),
            self.stale_responses_dropped()
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
