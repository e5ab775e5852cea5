//! Account registration and profile management

mod service;

pub use service::AccountService;
