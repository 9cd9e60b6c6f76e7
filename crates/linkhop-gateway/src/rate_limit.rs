//! Fixed-window request limiting keyed by client IP.

use crate::error::AppError;
use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use typed_builder::TypedBuilder;

/// Windows are swept once the map holds this many clients.
const SWEEP_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, TypedBuilder)]
pub struct RateLimitConfig {
    /// Requests allowed per client per window.
    #[builder(default = 100)]
    pub max_requests: u32,
    #[builder(default = Duration::from_secs(15 * 60))]
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Counts requests per key in fixed windows. Clones share the counters.
#[derive(Debug, Clone)]
pub struct FixedWindowLimiter {
    name: &'static str,
    config: RateLimitConfig,
    windows: Arc<DashMap<String, Window>>,
}

impl FixedWindowLimiter {
    pub fn new(name: &'static str, config: RateLimitConfig) -> Self {
        Self {
            name,
            config,
            windows: Arc::new(DashMap::new()),
        }
    }

    /// Counts one request for `key` and reports whether it is allowed.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    pub fn check_at(&self, key: &str, now: Instant) -> bool {
        if self.windows.len() >= SWEEP_THRESHOLD {
            self.sweep(now);
        }

        let mut window = self.windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.saturating_duration_since(window.started) >= self.config.window {
            *window = Window {
                started: now,
                count: 0,
            };
        }

        if window.count >= self.config.max_requests {
            return false;
        }
        window.count += 1;
        true
    }

    /// Drops windows that have already ended.
    pub fn sweep(&self, now: Instant) {
        let window = self.config.window;
        self.windows
            .retain(|_, w| now.saturating_duration_since(w.started) < window);
        debug!(limiter = self.name, clients = self.windows.len(), "swept rate limit windows");
    }
}

fn client_key(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Middleware rejecting requests over the limit with 429.
pub async fn limit(
    State(limiter): State<FixedWindowLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let key = client_key(&request);
    if !limiter.check(&key) {
        warn!(limiter = limiter.name, client = %key, "rate limit exceeded");
        return AppError::TooManyRequests.into_response();
    }
    next.run(request).await
}
