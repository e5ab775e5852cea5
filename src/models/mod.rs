//! Data models for the VidTube backend

pub mod account;
pub use account::*;
