// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for the search client.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The embedding application is responsible for installing an exporter.
//!
//! # Metric Naming Convention
//! - `search_client_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `command`: FT.SEARCH, FT.CREATE, HSET, ...
//! - `status`: success, error

use metrics::{counter, histogram};
use std::time::{Duration, Instant};

/// Record a command sent over a channel
pub fn record_command(command: &str, status: &str) {
    counter!(
        "search_client_commands_total",
        "command" => command.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record command round-trip latency
pub fn record_command_latency(command: &str, duration: Duration) {
    histogram!(
        "search_client_command_seconds",
        "command" => command.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Record search result count (documents in one reply page)
pub fn record_search_results(count: usize) {
    histogram!("search_client_search_results").record(count as f64);
}

/// Record a document rejected before it reached the wire
pub fn record_validation_failure(index: &str) {
    counter!(
        "search_client_validation_failures_total",
        "index" => index.to_string()
    )
    .increment(1);
}

/// Record index lifecycle operations (create, drop, alter)
pub fn record_index_operation(operation: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "search_client_index_operations_total",
        "operation" => operation.to_string(),
        "status" => status
    )
    .increment(1);
}

/// A timing guard that records command latency on drop
pub struct LatencyTimer {
    command: String,
    start: Instant,
}

impl LatencyTimer {
    /// Start a new latency timer
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
            start: Instant::now(),
        }
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        record_command_latency(&self.command, self.start.elapsed());
    }
}
