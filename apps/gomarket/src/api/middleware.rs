//! # Rate Limiting
//!
//! One token bucket shared by every route. Requests beyond the bucket get
//! 429 with a `Retry-After` hint and the usual cart error body.

use super::types::CartResponse;
use axum::{
    Json,
    body::Body,
    extract::State,
    http::{HeaderValue, Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    Quota, RateLimiter,
    clock::{Clock, DefaultClock},
    state::{InMemoryState, NotKeyed},
};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Requests per second when `GOMARKET_RATE_LIMIT` is not set.
pub const DEFAULT_RATE_LIMIT: u32 = 100;

pub type GlobalRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Bucket refilling at `requests_per_second`; zero falls back to the default.
pub fn create_rate_limiter(requests_per_second: u32) -> GlobalRateLimiter {
    let rps = NonZeroU32::new(requests_per_second)
        .unwrap_or(NonZeroU32::MIN.saturating_add(DEFAULT_RATE_LIMIT - 1));
    Arc::new(RateLimiter::direct(Quota::per_second(rps)))
}

/// `GOMARKET_RATE_LIMIT`, or the default if unset or unparsable.
pub fn get_rate_limit_from_env() -> u32 {
    parse_rate_limit(std::env::var("GOMARKET_RATE_LIMIT").ok().as_deref())
}

fn parse_rate_limit(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse().ok())
        .unwrap_or(DEFAULT_RATE_LIMIT)
}

pub async fn rate_limit_middleware(
    State(limiter): State<GlobalRateLimiter>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Err(not_until) = limiter.check() else {
        return next.run(request).await;
    };

    let retry_after = not_until
        .wait_time_from(DefaultClock::default().now())
        .as_secs()
        .max(1);
    tracing::warn!(
        path = %request.uri().path(),
        retry_after,
        "Cart API rate limit exceeded"
    );

    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(CartResponse::error("Too many requests".to_string())),
    )
        .into_response();
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
    response
}
