//! API handlers for the waitlist server

pub mod health;
pub mod mail;
pub mod verification;
pub mod waitlist;

pub use health::{health_check, root};
pub use mail::send_welcome_email;
pub use verification::issue_verification_token;
pub use waitlist::{check_email, join_waitlist};
