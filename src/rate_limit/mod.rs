//! Sliding-window rate limiting
//!
//! Hits are kept in a shared store keyed by caller identity. When the store
//! cannot be reached the limiter fails open and lets the request through.

mod memory;
mod postgres;

use std::sync::Arc;
use std::time::Duration;

use axum::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub use memory::MemoryRateLimitStore;
pub use postgres::PgRateLimitStore;

/// Rate limit store errors
#[derive(Error, Debug)]
pub enum RateLimitStoreError {
    #[error("Rate limit store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for RateLimitStoreError {
    fn from(e: sqlx::Error) -> Self {
        RateLimitStoreError::Unavailable(e.to_string())
    }
}

/// Backing storage for per-identifier request timestamps
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Drop hits older than `window_start`, then record a hit at `now` only if
    /// fewer than `max_requests` remain. Returns the number of hits that were
    /// in the window before this call.
    ///
    /// Prune, count and record must be atomic per identifier.
    async fn acquire(
        &self,
        identifier: &str,
        window_start: DateTime<Utc>,
        now: DateTime<Utc>,
        max_requests: u32,
    ) -> Result<u64, RateLimitStoreError>;
}

/// Outcome of a single rate limit evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub reset: DateTime<Utc>,
}

/// Sliding-window limiter over a shared store
#[derive(Clone)]
pub struct SlidingWindowLimiter {
    store: Arc<dyn RateLimitStore>,
    window: Duration,
    max_requests: u32,
}

impl SlidingWindowLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>, window: Duration, max_requests: u32) -> Self {
        Self {
            store,
            window,
            max_requests,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Evaluate and, when allowed, record a hit for `identifier`
    pub async fn limit(&self, identifier: &str) -> Result<RateLimitDecision, RateLimitStoreError> {
        self.limit_at(identifier, Utc::now()).await
    }

    pub async fn limit_at(
        &self,
        identifier: &str,
        now: DateTime<Utc>,
    ) -> Result<RateLimitDecision, RateLimitStoreError> {
        let window = chrono::Duration::milliseconds(self.window.as_millis() as i64);
        let window_start = now - window;
        let reset = now + window;

        let current = self
            .store
            .acquire(identifier, window_start, now, self.max_requests)
            .await?;

        if current >= u64::from(self.max_requests) {
            return Ok(RateLimitDecision {
                allowed: false,
                remaining: 0,
                reset,
            });
        }

        Ok(RateLimitDecision {
            allowed: true,
            remaining: self.max_requests - current as u32 - 1,
            reset,
        })
    }

    /// Check if a request is allowed, failing open on store errors
    pub async fn check(&self, identifier: &str) -> bool {
        match self.limit(identifier).await {
            Ok(decision) => decision.allowed,
            Err(e) => {
                tracing::warn!(
                    client = %identifier,
                    error = %e,
                    "Rate limiting failed, continuing without it"
                );
                true
            }
        }
    }
}
