//! Metrics and observability utilities
//!
//! Prometheus-style metrics with standardized naming conventions.
//! The recorder itself is installed by the binary.

use metrics::{counter, describe_counter, describe_histogram, gauge, describe_gauge, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all ScholarNet metrics
pub const METRICS_PREFIX: &str = "scholarnet";

/// Buckets for traversal latency (in seconds). A depth-3 graph can take
/// minutes against a remote catalog.
pub const TRAVERSAL_BUCKETS: &[f64] = &[
    0.100,  // 100ms
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
    10.00,  // 10s
    30.00,  // 30s
    60.00,  // 1m
    120.0,  // 2m
    300.0,  // 5m
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Provider metrics
    describe_counter!(
        format!("{}_provider_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total bibliographic provider calls"
    );

    describe_histogram!(
        format!("{}_provider_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Bibliographic provider call latency in seconds"
    );

    // Traversal metrics
    describe_counter!(
        format!("{}_traversals_total", METRICS_PREFIX),
        Unit::Count,
        "Total traversals run"
    );

    describe_histogram!(
        format!("{}_traversal_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Traversal latency in seconds"
    );

    describe_gauge!(
        format!("{}_graph_nodes", METRICS_PREFIX),
        Unit::Count,
        "Nodes in the most recently built graph"
    );

    describe_gauge!(
        format!("{}_graph_edges", METRICS_PREFIX),
        Unit::Count,
        "Edges in the most recently built graph"
    );

    describe_counter!(
        format!("{}_unresolved_placeholders_total", METRICS_PREFIX),
        Unit::Count,
        "Placeholder nodes whose details fetch failed"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Helper to record one provider call
pub fn record_provider_call(provider: &str, operation: &str, duration_secs: f64, success: bool) {
    let status = if success { "success" } else { "error" };

    counter!(
        format!("{}_provider_requests_total", METRICS_PREFIX),
        "provider" => provider.to_string(),
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        format!("{}_provider_duration_seconds", METRICS_PREFIX),
        "provider" => provider.to_string(),
        "operation" => operation.to_string()
    )
    .record(duration_secs);
}

/// Helper to record a finished traversal
pub fn record_traversal(kind: &str, duration_secs: f64, success: bool) {
    let status = if success { "success" } else { "error" };

    counter!(
        format!("{}_traversals_total", METRICS_PREFIX),
        "kind" => kind.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        format!("{}_traversal_duration_seconds", METRICS_PREFIX),
        "kind" => kind.to_string()
    )
    .record(duration_secs);
}

/// Helper to record the shape of a built graph
pub fn record_graph(nodes: usize, edges: usize, unresolved: usize) {
    gauge!(format!("{}_graph_nodes", METRICS_PREFIX)).set(nodes as f64);
    gauge!(format!("{}_graph_edges", METRICS_PREFIX)).set(edges as f64);

    counter!(format!("{}_unresolved_placeholders_total", METRICS_PREFIX))
        .increment(unresolved as u64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_traversal_buckets() {
        let mut prev = 0.0;
        for &bucket in TRAVERSAL_BUCKETS {
            assert!(bucket > prev);
            prev = bucket;
        }
    }

    #[test]
    fn test_helpers_without_recorder() {
        // No recorder installed: calls are no-ops but must not panic
        let metrics = RequestMetrics::start("GET", "/api/graph");
        metrics.finish(200);
        record_provider_call("memory", "coauthor_links", 0.01, true);
        record_traversal("graph", 0.5, false);
        record_graph(3, 2, 1);
    }
}
