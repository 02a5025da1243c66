//! Route definitions for the waitlist API

mod mail;
mod verification;
mod waitlist;

pub use mail::mail_routes;
pub use verification::verification_routes;
pub use waitlist::waitlist_routes;
