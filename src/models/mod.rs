//! Request and response bodies for the waitlist API

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::waitlist::WaitlistEntry;

/// Response carrying a freshly issued verification token
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueTokenResponse {
    pub success: bool,
    pub token: String,
    /// Seconds until the token expires
    pub expires_in: i64,
}

/// Request to look up an email on the waitlist
#[derive(Debug, Deserialize)]
pub struct CheckEmailRequest {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckEmailResponse {
    pub exists: bool,
    pub count: u64,
}

/// Request to send the welcome email
#[derive(Debug, Deserialize, Validate)]
pub struct SendWelcomeRequest {
    #[serde(default)]
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[serde(default)]
    pub firstname: Option<String>,
}

/// Request to add a signup to the waitlist
#[derive(Debug, Deserialize, Validate)]
pub struct JoinWaitlistRequest {
    #[serde(default)]
    #[validate(
        email(message = "Invalid email"),
        length(max = 254, message = "Email must be at most 254 characters")
    )]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "Name must be 1 to 200 characters"))]
    pub name: String,

    #[serde(rename = "walletAddress", default)]
    pub wallet_address: Option<String>,
}

impl From<JoinWaitlistRequest> for WaitlistEntry {
    fn from(req: JoinWaitlistRequest) -> Self {
        Self {
            email: req.email,
            name: req.name,
            wallet_address: req.wallet_address.filter(|w| !w.trim().is_empty()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}
