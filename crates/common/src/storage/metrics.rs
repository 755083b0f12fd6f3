//! Pool counters
//!
//! Lock-free counters for connection acquisition, surfaced through the
//! health endpoint.

use std::sync::atomic::{AtomicU64, Ordering};

/// Connection pool counters
#[derive(Debug, Default)]
pub struct StorageMetrics {
    connections_acquired: AtomicU64,
    connections_timeout: AtomicU64,
    connections_error: AtomicU64,
    total_acquire_ms: AtomicU64,
}

impl StorageMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_connection_acquired(&self, duration_ms: u64) {
        self.connections_acquired.fetch_add(1, Ordering::Relaxed);
        self.total_acquire_ms.fetch_add(duration_ms, Ordering::Relaxed);
    }

    pub fn record_connection_timeout(&self) {
        self.connections_timeout.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_connection_error(&self) {
        self.connections_error.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connections_acquired(&self) -> u64 {
        self.connections_acquired.load(Ordering::Relaxed)
    }

    pub fn connections_timeout(&self) -> u64 {
        self.connections_timeout.load(Ordering::Relaxed)
    }

    pub fn connections_error(&self) -> u64 {
        self.connections_error.load(Ordering::Relaxed)
    }

    /// Average acquisition time in milliseconds; zero before the first
    /// acquisition.
    pub fn avg_acquire_ms(&self) -> u64 {
        let count = self.connections_acquired();
        if count == 0 {
            0
        } else {
            self.total_acquire_ms.load(Ordering::Relaxed) / count
        }
    }
}
