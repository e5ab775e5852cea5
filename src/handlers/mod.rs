//! API handlers for the VidTube backend

pub mod account;
pub mod auth;

// Re-export the extractor for handler use
pub use crate::middleware::auth::AuthenticatedAccount;
