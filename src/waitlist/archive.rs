//! PostgreSQL copy of waitlist signups

use axum::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::{ArchiveError, SignupArchive, WaitlistEntry};

/// Writes each signup to the `waitlist_emails` table
#[derive(Clone)]
pub struct PgSignupArchive {
    db_pool: PgPool,
}

impl PgSignupArchive {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl SignupArchive for PgSignupArchive {
    async fn record(&self, entry: &WaitlistEntry, directory_id: &str) -> Result<(), ArchiveError> {
        sqlx::query(
            r#"
            INSERT INTO waitlist_emails (id, email, name, wallet_address, directory_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&entry.email)
        .bind(&entry.name)
        .bind(entry.wallet_address.as_deref())
        .bind(directory_id)
        .bind(Utc::now())
        .execute(&self.db_pool)
        .await?;

        Ok(())
    }
}
