//! Rate limiting middleware using token bucket algorithm

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use governor::{
    clock::QuantaClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use scholarnet_common::errors::{AppError, Result};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Rate limiter using governor crate
pub type GlobalRateLimiter = RateLimiter<NotKeyed, InMemoryState, QuantaClock>;

/// Shared limiter plus the configured rate, reported back on rejection
pub struct InboundLimiter {
    limiter: GlobalRateLimiter,
    per_second: u32,
}

impl InboundLimiter {
    pub fn check(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

/// Create a new rate limiter
pub fn create_rate_limiter(requests_per_second: u32, burst: u32) -> Result<Arc<InboundLimiter>> {
    let rate = NonZeroU32::new(requests_per_second).ok_or_else(|| AppError::Configuration {
        message: "rate_limit.requests_per_second must be positive".to_string(),
    })?;
    let burst = NonZeroU32::new(burst).ok_or_else(|| AppError::Configuration {
        message: "rate_limit.burst must be positive".to_string(),
    })?;

    let quota = Quota::per_second(rate).allow_burst(burst);
    Ok(Arc::new(InboundLimiter {
        limiter: RateLimiter::direct(quota),
        per_second: requests_per_second,
    }))
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<InboundLimiter>>,
    request: Request,
    next: Next,
) -> Result<Response> {
    if limiter.check() {
        return Ok(next.run(request).await);
    }

    tracing::warn!(path = %request.uri().path(), "Rate limit exceeded");
    Err(AppError::RateLimited {
        limit: limiter.per_second,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    #[test]
    fn test_rate_limiter_creation() {
        let limiter = assert_ok!(create_rate_limiter(100, 200));
        assert!(limiter.check());
    }

    #[test]
    fn test_zero_quota_is_rejected() {
        assert!(matches!(
            create_rate_limiter(0, 10),
            Err(AppError::Configuration { .. })
        ));
        assert!(create_rate_limiter(10, 0).is_err());
    }

    #[test]
    fn test_burst_exhaustion() {
        let limiter = create_rate_limiter(1, 2).unwrap();
        assert!(limiter.check());
        assert!(limiter.check());
        assert!(!limiter.check());
        assert_eq!(limiter.per_second, 1);
    }
}
