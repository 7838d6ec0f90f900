use attar_types::CabinClass;
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_search_path() -> String {
    "/mcp/search-flights".to_string()
}

fn default_fallback_search_path() -> String {
    "/api/search-flights".to_string()
}

fn default_booking_path() -> String {
    "/create-booking".to_string()
}

/// Location and behaviour of the search/booking backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout. Requests are never retried.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Cabin searched when the traveller has not named one.
    #[serde(default)]
    pub cabin_class: CabinClass,

    #[serde(default = "default_search_path")]
    pub search_path: String,

    /// Tried when the primary search fails or finds nothing. Empty disables it.
    #[serde(default = "default_fallback_search_path")]
    pub fallback_search_path: String,

    #[serde(default = "default_booking_path")]
    pub booking_path: String,
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            cabin_class: CabinClass::default(),
            search_path: default_search_path(),
            fallback_search_path: default_fallback_search_path(),
            booking_path: default_booking_path(),
        }
    }
}
