//! Application state shared across handlers

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::mail::Mailer;
use crate::verification::VerificationKeys;
use crate::waitlist::{SignupArchive, WaitlistDirectory};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub verification_keys: Arc<VerificationKeys>,
    pub directory: Arc<dyn WaitlistDirectory>,
    pub mailer: Arc<dyn Mailer>,
    pub archive: Option<Arc<dyn SignupArchive>>,
    pub allowed_origins: Arc<Vec<String>>,
    pub db_pool: Option<PgPool>,
}

impl AppState {
    pub fn new(
        verification_keys: Arc<VerificationKeys>,
        directory: Arc<dyn WaitlistDirectory>,
        mailer: Arc<dyn Mailer>,
        allowed_origins: Vec<String>,
    ) -> Self {
        Self {
            verification_keys,
            directory,
            mailer,
            archive: None,
            allowed_origins: Arc::new(allowed_origins),
            db_pool: None,
        }
    }

    pub fn with_archive(mut self, archive: Arc<dyn SignupArchive>) -> Self {
        self.archive = Some(archive);
        self
    }

    pub fn with_db_pool(mut self, db_pool: PgPool) -> Self {
        self.db_pool = Some(db_pool);
        self
    }
}

impl FromRef<AppState> for Arc<VerificationKeys> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.verification_keys.clone()
    }
}
