//! Flight records returned by the search backend.
//!
//! A `FlightResult` is opaque to the conversation beyond field access: the
//! assistant reads it to build cards and booking requests but never mutates it.

use serde::{Deserialize, Serialize};

fn default_currency() -> String {
    "INR".to_string()
}

/// One end of a flight: airport code and local clock time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightEndpoint {
    /// IATA airport code, e.g. `BLR`.
    pub code: String,
    /// Local time as `HH:MM`.
    #[serde(default)]
    pub time: String,
}

/// A single flight offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightResult {
    /// Backend identifier, e.g. `BLR-JED-001`.
    #[serde(default)]
    pub id: Option<String>,
    pub airline: String,
    /// Marketing flight number, e.g. `6E 77`.
    pub flight_number: String,
    pub from: FlightEndpoint,
    pub to: FlightEndpoint,
    /// Human-readable duration, e.g. `5h 45m`.
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub stops: u32,
    pub price: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub cabin_class: Option<String>,
    #[serde(default)]
    pub seats_available: Option<u32>,
    #[serde(default)]
    pub departure_date: Option<String>,
}

impl FlightResult {
    pub fn origin_code(&self) -> &str {
        &self.from.code
    }

    pub fn destination_code(&self) -> &str {
        &self.to.code
    }

    /// Returns `true` if the flight has no intermediate stops.
    pub fn is_non_stop(&self) -> bool {
        self.stops == 0
    }

    /// Compares flight numbers ignoring case and whitespace, so that a
    /// transcript of "6e77" matches `6E 77`.
    pub fn matches_flight_number(&self, candidate: &str) -> bool {
        let normalize = |s: &str| {
            s.chars()
                .filter(|c| !c.is_whitespace() && *c != '-')
                .flat_map(char::to_lowercase)
                .collect::<String>()
        };
        let wanted = normalize(candidate);
        !wanted.is_empty() && normalize(&self.flight_number) == wanted
    }
}
