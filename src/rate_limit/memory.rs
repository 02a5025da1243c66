//! In-process rate limit store

use std::{collections::HashMap, sync::Arc};

use axum::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{RateLimitStore, RateLimitStoreError};

/// Hit timestamps per identifier, held in memory
#[derive(Clone, Default)]
pub struct MemoryRateLimitStore {
    hits: Arc<RwLock<HashMap<String, Vec<DateTime<Utc>>>>>,
}

impl MemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop identifiers with no hits newer than `cutoff` (call periodically)
    pub async fn cleanup(&self, cutoff: DateTime<Utc>) {
        let mut hits = self.hits.write().await;
        hits.retain(|_, times| {
            times.retain(|t| *t >= cutoff);
            !times.is_empty()
        });
    }

    pub async fn tracked_identifiers(&self) -> usize {
        self.hits.read().await.len()
    }
}

#[async_trait]
impl RateLimitStore for MemoryRateLimitStore {
    async fn acquire(
        &self,
        identifier: &str,
        window_start: DateTime<Utc>,
        now: DateTime<Utc>,
        max_requests: u32,
    ) -> Result<u64, RateLimitStoreError> {
        // one write guard covers prune, count and record
        let mut hits = self.hits.write().await;
        let times = hits.entry(identifier.to_string()).or_default();
        times.retain(|t| *t >= window_start);

        let current = times.len() as u64;
        if current < u64::from(max_requests) {
            times.push(now);
        } else if times.is_empty() {
            hits.remove(identifier);
        }
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_acquire_records_only_below_max() {
        let store = MemoryRateLimitStore::new();
        let now = Utc::now();
        let window_start = now - Duration::minutes(1);

        assert_eq!(store.acquire("ip", window_start, now, 1).await.unwrap(), 0);
        assert_eq!(store.acquire("ip", window_start, now, 1).await.unwrap(), 1);
        assert_eq!(store.acquire("ip", window_start, now, 1).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_zero_limit_tracks_nothing() {
        let store = MemoryRateLimitStore::new();
        let now = Utc::now();

        assert_eq!(store.acquire("ip", now, now, 0).await.unwrap(), 0);
        assert_eq!(store.tracked_identifiers().await, 0);
    }

    #[tokio::test]
    async fn test_cleanup_drops_stale_identifiers() {
        let store = MemoryRateLimitStore::new();
        let now = Utc::now();
        let long_ago = now - Duration::minutes(10);

        store.acquire("old", long_ago, now - Duration::minutes(5), 5).await.unwrap();
        store.acquire("fresh", long_ago, now, 5).await.unwrap();
        assert_eq!(store.tracked_identifiers().await, 2);

        store.cleanup(now - Duration::minutes(1)).await;
        assert_eq!(store.tracked_identifiers().await, 1);
        assert_eq!(
            store.acquire("fresh", now - Duration::minutes(1), now, 5).await.unwrap(),
            1
        );
    }
}
