//! PostgreSQL-backed rate limit store

use axum::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{RateLimitStore, RateLimitStoreError};

/// Stores hits in the `rate_limits` table so every instance shares one window
#[derive(Clone)]
pub struct PgRateLimitStore {
    db_pool: PgPool,
}

impl PgRateLimitStore {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Delete every hit older than `cutoff`, returning the number removed
    pub async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<u64, RateLimitStoreError> {
        let result = sqlx::query("DELETE FROM rate_limits WHERE hit_at < $1")
            .bind(cutoff)
            .execute(&self.db_pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl RateLimitStore for PgRateLimitStore {
    async fn acquire(
        &self,
        identifier: &str,
        window_start: DateTime<Utc>,
        now: DateTime<Utc>,
        max_requests: u32,
    ) -> Result<u64, RateLimitStoreError> {
        let mut tx = self.db_pool.begin().await?;

        // per-identifier lock across instances, held until commit or rollback
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(identifier)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM rate_limits WHERE identifier = $1 AND hit_at < $2")
            .bind(identifier)
            .bind(window_start)
            .execute(&mut *tx)
            .await?;

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM rate_limits WHERE identifier = $1 AND hit_at >= $2",
        )
        .bind(identifier)
        .bind(window_start)
        .fetch_one(&mut *tx)
        .await?;
        let current = count.max(0) as u64;

        if current < u64::from(max_requests) {
            sqlx::query("INSERT INTO rate_limits (identifier, hit_at) VALUES ($1, $2)")
                .bind(identifier)
                .bind(now)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(current)
    }
}
