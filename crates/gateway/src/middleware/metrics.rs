//! Request metrics middleware

use axum::{extract::{MatchedPath, Request}, middleware::Next, response::Response};
use scholarnet_common::metrics::RequestMetrics;

/// Record count and latency per matched route
pub async fn track_requests(request: Request, next: Next) -> Response {
    // Unmatched paths (static assets) share one label to keep cardinality bounded
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "static".to_string());
    let tracker = RequestMetrics::start(request.method().as_str(), &endpoint);

    let response = next.run(request).await;
    tracker.finish(response.status().as_u16());
    response
}
