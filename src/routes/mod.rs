//! Route definitions for the VidTube API

mod account;
mod auth;

pub use account::account_routes;
pub use auth::auth_routes;
