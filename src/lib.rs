// Module declarations
pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod prompt;
pub mod provider;
pub mod store;

// Server module (HTTP API)
pub mod server;

// Re-export the error type; every fallible path in this crate speaks ApiError
pub use error::ApiError;
