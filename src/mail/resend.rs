//! Resend API client

use std::time::Duration;

use axum::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::{render_welcome, MailError, Mailer};
use crate::config::MailConfig;

#[derive(Debug, Serialize)]
struct SendEmailBody<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    reply_to: &'a str,
    html: String,
}

/// Mailer backed by the Resend HTTP API
pub struct ResendMailer {
    client: Client,
    config: MailConfig,
}

impl ResendMailer {
    pub fn new(config: MailConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
            config,
        }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send_welcome(&self, to: &str, first_name: Option<&str>) -> Result<(), MailError> {
        let body = SendEmailBody {
            from: &self.config.from,
            to: vec![to],
            subject: &self.config.subject,
            reply_to: &self.config.reply_to,
            html: render_welcome(first_name),
        };

        let response = self
            .client
            .post(format!("{}/emails", self.config.api_url.trim_end_matches('/')))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(status = %status.as_u16(), "Welcome email accepted by Resend");
        Ok(())
    }
}
