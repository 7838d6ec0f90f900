//! HTTP client for the flight search and booking backend.

pub mod config;
pub mod error;
pub mod http;

pub use config::BackendConfig;
pub use error::ClientError;
pub use http::{HttpFlightBackend, IDEMPOTENCY_HEADER};
