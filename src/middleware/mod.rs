//! Middleware for the VidTube API

pub mod auth;

pub use auth::AuthenticatedAccount;
