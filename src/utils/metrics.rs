//! Codec Metrics
//!
//! Process-wide counters for encode and decode traffic.
//!
//! Uses atomic counters so codecs on any thread can record without locking.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info};

/// Counters for codec operations
#[derive(Debug)]
pub struct Metrics {
    /// Records encoded successfully
    pub records_encoded: AtomicU64,
    /// Records decoded successfully
    pub records_decoded: AtomicU64,
    /// Bytes produced by successful encodes
    pub bytes_encoded: AtomicU64,
    /// Bytes consumed by successful decodes
    pub bytes_decoded: AtomicU64,
    /// Failed encodes
    pub encode_errors: AtomicU64,
    /// Failed decodes
    pub decode_errors: AtomicU64,
    /// Fields skipped because the schema did not declare them
    pub unknown_fields_skipped: AtomicU64,
    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            records_encoded: AtomicU64::new(0),
            records_decoded: AtomicU64::new(0),
            bytes_encoded: AtomicU64::new(0),
            bytes_decoded: AtomicU64::new(0),
            encode_errors: AtomicU64::new(0),
            decode_errors: AtomicU64::new(0),
            unknown_fields_skipped: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a successful encode of `byte_count` bytes
    pub fn record_encoded(&self, byte_count: u64) {
        self.records_encoded.fetch_add(1, Ordering::Relaxed);
        self.bytes_encoded.fetch_add(byte_count, Ordering::Relaxed);
    }

    /// Record a successful decode of `byte_count` bytes
    pub fn record_decoded(&self, byte_count: u64) {
        self.records_decoded.fetch_add(1, Ordering::Relaxed);
        self.bytes_decoded.fetch_add(byte_count, Ordering::Relaxed);
    }

    pub fn encode_failed(&self) {
        self.encode_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn decode_failed(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn unknown_fields_skipped(&self, count: u64) {
        if count > 0 {
            self.unknown_fields_skipped.fetch_add(count, Ordering::Relaxed);
        }
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records_encoded: self.records_encoded.load(Ordering::Relaxed),
            records_decoded: self.records_decoded.load(Ordering::Relaxed),
            bytes_encoded: self.bytes_encoded.load(Ordering::Relaxed),
            bytes_decoded: self.bytes_decoded.load(Ordering::Relaxed),
            encode_errors: self.encode_errors.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            unknown_fields_skipped: self.unknown_fields_skipped.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    /// Emit the current counters as one `info` event
    pub fn log_metrics(&self) {
        let s = self.snapshot();
        info!(
            records_encoded = s.records_encoded,
            records_decoded = s.records_decoded,
            bytes_encoded = s.bytes_encoded,
            bytes_decoded = s.bytes_decoded,
            encode_errors = s.encode_errors,
            decode_errors = s.decode_errors,
            unknown_fields_skipped = s.unknown_fields_skipped,
            uptime_seconds = s.uptime_seconds,
            "Codec metrics snapshot"
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub records_encoded: u64,
    pub records_decoded: u64,
    pub bytes_encoded: u64,
    pub bytes_decoded: u64,
    pub encode_errors: u64,
    pub decode_errors: u64,
    pub unknown_fields_skipped: u64,
    pub uptime_seconds: u64,
}

static METRICS: once_cell::sync::Lazy<Metrics> = once_cell::sync::Lazy::new(Metrics::new);

/// Get the global metrics instance
pub fn global_metrics() -> &'static Metrics {
    &METRICS
}

/// Initialize metrics collection (call once at startup)
pub fn init_metrics() {
    let _ = global_metrics();
    info!("Metrics collection initialized");
}

/// Logs the elapsed time of an operation when dropped
pub struct Timer {
    start: Instant,
    operation: &'static str,
}

impl Timer {
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            operation,
        }
    }

    pub fn elapsed_micros(&self) -> u128 {
        self.start.elapsed().as_micros()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        debug!(
            operation = self.operation,
            duration_us = self.elapsed_micros(),
            "Operation completed"
        );
    }
}
