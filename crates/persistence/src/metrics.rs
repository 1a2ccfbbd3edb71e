//! Upstream call metrics.
//!
//! Provides functions for recording database service metrics.

use metrics::{counter, histogram};
use std::time::Instant;

/// Record the duration of one call to the database service.
pub fn record_upstream_duration(op: &'static str, resource: &str, duration_secs: f64) {
    histogram!(
        "upstream_request_duration_seconds",
        "op" => op,
        "resource" => resource.to_string()
    )
    .record(duration_secs);
}

/// Count a failed call to the database service.
pub fn record_upstream_error(op: &'static str, resource: &str) {
    counter!(
        "upstream_errors_total",
        "op" => op,
        "resource" => resource.to_string()
    )
    .increment(1);
}

/// A helper to time upstream calls and record metrics.
///
/// Usage:
/// ```ignore
/// let timer = UpstreamTimer::new("select", "cursos");
/// let result = client.get(url).send().await;
/// timer.record(result.is_ok());
/// ```
pub struct UpstreamTimer {
    op: &'static str,
    resource: String,
    start: Instant,
}

impl UpstreamTimer {
    pub fn new(op: &'static str, resource: impl Into<String>) -> Self {
        Self {
            op,
            resource: resource.into(),
            start: Instant::now(),
        }
    }

    /// Record the elapsed duration, and an error count when `ok` is false.
    pub fn record(self, ok: bool) {
        let duration = self.start.elapsed().as_secs_f64();
        record_upstream_duration(self.op, &self.resource, duration);
        if !ok {
            record_upstream_error(self.op, &self.resource);
        }
    }
}
