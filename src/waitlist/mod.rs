//! Waitlist storage
//!
//! The primary record lives in a hosted document database (Notion); an
//! optional PostgreSQL archive keeps a secondary copy.

mod archive;
mod notion;

use axum::async_trait;
use thiserror::Error;

pub use archive::PgSignupArchive;
pub use notion::NotionDirectory;

/// Stored in the directory when the signup has no wallet address
pub const MISSING_WALLET_PLACEHOLDER: &str = "Not available";

/// Directory errors
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Directory request failed: {0}")]
    Request(String),

    #[error("Directory returned status {status}: {body}")]
    Status { status: u16, body: String },
}

impl From<reqwest::Error> for DirectoryError {
    fn from(e: reqwest::Error) -> Self {
        DirectoryError::Request(e.to_string())
    }
}

/// Archive errors
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for ArchiveError {
    fn from(e: sqlx::Error) -> Self {
        ArchiveError::DatabaseError(e.to_string())
    }
}

/// A signup to record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitlistEntry {
    pub email: String,
    pub name: String,
    pub wallet_address: Option<String>,
}

/// System of record for waitlist signups
#[async_trait]
pub trait WaitlistDirectory: Send + Sync {
    /// Number of entries already recorded for `email`
    async fn count_by_email(&self, email: &str) -> Result<u64, DirectoryError>;

    /// Create an entry, returning the directory's id for it
    async fn create_entry(&self, entry: &WaitlistEntry) -> Result<String, DirectoryError>;
}

/// Best-effort secondary copy of signups
#[async_trait]
pub trait SignupArchive: Send + Sync {
    async fn record(&self, entry: &WaitlistEntry, directory_id: &str) -> Result<(), ArchiveError>;
}
