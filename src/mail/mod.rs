//! Transactional email

mod resend;
mod template;

use axum::async_trait;
use thiserror::Error;

pub use resend::ResendMailer;
pub use template::render_welcome;

/// Mail delivery errors
#[derive(Error, Debug)]
pub enum MailError {
    #[error("Mail request failed: {0}")]
    Request(String),

    #[error("Mail provider returned status {status}: {body}")]
    Rejected { status: u16, body: String },
}

impl From<reqwest::Error> for MailError {
    fn from(e: reqwest::Error) -> Self {
        MailError::Request(e.to_string())
    }
}

/// Sends the welcome email after a signup
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_welcome(&self, to: &str, first_name: Option<&str>) -> Result<(), MailError>;
}
