use axum::{
    extract::{ConnectInfo, Request},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use governor::{Quota, RateLimiter, clock::DefaultClock, state::keyed::DefaultKeyedStateStore};
use once_cell::sync::OnceCell;
use std::{net::SocketAddr, num::NonZeroU32, sync::Arc, time::Duration};
use tower_http::cors::CorsLayer;

pub type IpRateLimiter = Arc<RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>>;

/// Rate limiter configuration trait for type-safe middleware
pub trait RateLimitConfig {
    fn quota() -> Quota;
    fn name() -> &'static str;
}

/// Poll rate limiter - generous limits for the turn/status polling loops
/// 1000 requests per minute per IP
pub struct PollRateLimit;

impl RateLimitConfig for PollRateLimit {
    fn quota() -> Quota {
        Quota::per_minute(NonZeroU32::new(1000).unwrap())
    }

    fn name() -> &'static str {
        "Poll"
    }
}

/// Play rate limiter - tighter limits for registration and mutation calls
/// 300 requests per minute per IP
pub struct PlayRateLimit;

impl RateLimitConfig for PlayRateLimit {
    fn quota() -> Quota {
        Quota::per_minute(NonZeroU32::new(300).unwrap())
    }

    fn name() -> &'static str {
        "Play"
    }
}

/// Type-safe rate limiting middleware
///
/// Usage:
/// ```rust,ignore
/// .layer(axum::middleware::from_fn(rate_limit_middleware::<PollRateLimit>))
/// ```
pub async fn rate_limit_middleware<T: RateLimitConfig>(
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    static POLL_LIMITER: OnceCell<IpRateLimiter> = OnceCell::new();
    static PLAY_LIMITER: OnceCell<IpRateLimiter> = OnceCell::new();

    let limiter = match T::name() {
        "Poll" => POLL_LIMITER.get_or_init(|| Arc::new(RateLimiter::keyed(T::quota()))),
        "Play" => PLAY_LIMITER.get_or_init(|| Arc::new(RateLimiter::keyed(T::quota()))),
        _ => unreachable!("Unknown rate limit type"),
    };

    // Extract client IP
    let client_ip =
        if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
            addr.ip().to_string()
        } else {
            "unknown".to_string()
        };

    // Check rate limit
    match limiter.check_key(&client_ip) {
        Ok(_) => Ok(next.run(request).await),
        Err(_) => {
            tracing::warn!("{} rate limit exceeded for IP: {}", T::name(), client_ip);
            Err(StatusCode::TOO_MANY_REQUESTS)
        }
    }
}

// CORS configuration using multiple allowed origins from env
pub fn cors_layer() -> CorsLayer {
    let allowed_origins = std::env::var("ALLOWED_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000".to_string())
        .split(',')
        .map(|s| s.trim().parse().unwrap())
        .collect::<Vec<_>>();

    tracing::info!("CORS allowed origins: {:?}", allowed_origins);

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
