//! Notion-backed waitlist directory

use std::time::Duration;

use axum::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{DirectoryError, WaitlistDirectory, WaitlistEntry, MISSING_WALLET_PLACEHOLDER};
use crate::config::NotionConfig;

const NOTION_VERSION: &str = "2022-06-28";

#[derive(Debug, Deserialize)]
struct QueryResponse {
    results: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct CreatedPage {
    id: String,
}

/// Waitlist directory stored in a Notion database
pub struct NotionDirectory {
    client: Client,
    api_url: String,
    secret: String,
    database_id: String,
}

impl NotionDirectory {
    pub fn new(config: &NotionConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            secret: config.secret.clone(),
            database_id: config.database_id.clone(),
        }
    }

    async fn post(&self, path: &str, body: &Value) -> Result<reqwest::Response, DirectoryError> {
        let response = self
            .client
            .post(format!("{}{}", self.api_url, path))
            .bearer_auth(&self.secret)
            .header("Notion-Version", NOTION_VERSION)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DirectoryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl WaitlistDirectory for NotionDirectory {
    async fn count_by_email(&self, email: &str) -> Result<u64, DirectoryError> {
        let path = format!("/databases/{}/query", self.database_id);
        let response = self.post(&path, &email_filter(email)).await?;
        let query: QueryResponse = response.json().await?;
        Ok(query.results.len() as u64)
    }

    async fn create_entry(&self, entry: &WaitlistEntry) -> Result<String, DirectoryError> {
        let body = json!({
            "parent": { "database_id": self.database_id },
            "properties": page_properties(entry),
        });
        let response = self.post("/pages", &body).await?;
        let page: CreatedPage = response.json().await?;
        Ok(page.id)
    }
}

fn email_filter(email: &str) -> Value {
    json!({
        "filter": {
            "property": "Email",
            "email": { "equals": email },
        }
    })
}

fn page_properties(entry: &WaitlistEntry) -> Value {
    let wallet = entry
        .wallet_address
        .as_deref()
        .filter(|w| !w.is_empty())
        .unwrap_or(MISSING_WALLET_PLACEHOLDER);

    json!({
        "Email": { "type": "email", "email": entry.email },
        "Name": {
            "type": "title",
            "title": [{ "type": "text", "text": { "content": entry.name } }],
        },
        "wallet address": {
            "type": "rich_text",
            "rich_text": [{ "type": "text", "text": { "content": wallet } }],
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(wallet_address: Option<&str>) -> WaitlistEntry {
        WaitlistEntry {
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            wallet_address: wallet_address.map(str::to_string),
        }
    }

    #[test]
    fn test_page_properties() {
        let props = page_properties(&entry(Some("0xabc")));
        assert_eq!(props["Email"]["email"], "ada@example.com");
        assert_eq!(props["Name"]["title"][0]["text"]["content"], "Ada");
        assert_eq!(
            props["wallet address"]["rich_text"][0]["text"]["content"],
            "0xabc"
        );
    }

    #[test]
    fn test_missing_wallet_uses_placeholder() {
        for wallet in [None, Some("")] {
            let props = page_properties(&entry(wallet));
            assert_eq!(
                props["wallet address"]["rich_text"][0]["text"]["content"],
                MISSING_WALLET_PLACEHOLDER
            );
        }
    }

    #[test]
    fn test_email_filter() {
        let filter = email_filter("ada@example.com");
        assert_eq!(filter["filter"]["property"], "Email");
        assert_eq!(filter["filter"]["email"]["equals"], "ada@example.com");
    }

    #[test]
    fn test_api_url_trailing_slash_is_trimmed() {
        let directory = NotionDirectory::new(&NotionConfig {
            api_url: "https://api.notion.com/v1/".to_string(),
            secret: "secret".to_string(),
            database_id: "db".to_string(),
        });
        assert_eq!(directory.api_url, "https://api.notion.com/v1");
    }
}
