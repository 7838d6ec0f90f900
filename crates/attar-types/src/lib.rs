//! Shared types for the Attar travel assistant.
//!
//! This crate provides the foundational types used across all Attar crates:
//! traveller preference codes, the flight records returned by the search
//! backend, and the request/response shapes exchanged with that backend.
//!
//! No crate in the workspace depends on anything *except* `attar-types` for
//! cross-cutting type definitions. This keeps the dependency graph clean and
//! prevents circular dependencies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

mod flight;
mod wire;

pub use flight::{FlightEndpoint, FlightResult};
pub use wire::{BookingConfirmation, BookingRequest, BookingResponse, SearchRequest, SearchResponse};

/// Returned when a string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Seat position requested for the booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatPreference {
    /// Window seat.
    Window,
    /// Aisle seat.
    Aisle,
}

impl SeatPreference {
    /// Returns the wire label for this preference.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Window => "window",
            Self::Aisle => "aisle",
        }
    }
}

impl fmt::Display for SeatPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeatPreference {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "window" => Ok(Self::Window),
            "aisle" => Ok(Self::Aisle),
            _ => Err(UnknownVariant {
                kind: "seat preference",
                value: s.to_string(),
            }),
        }
    }
}

/// In-flight meal requested for the booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MealPreference {
    #[serde(rename = "vegetarian")]
    Vegetarian,
    #[serde(rename = "non-vegetarian")]
    NonVegetarian,
    #[serde(rename = "vegan")]
    Vegan,
}

impl MealPreference {
    /// Returns the wire label for this preference.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vegetarian => "vegetarian",
            Self::NonVegetarian => "non-vegetarian",
            Self::Vegan => "vegan",
        }
    }
}

impl fmt::Display for MealPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealPreference {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vegetarian" => Ok(Self::Vegetarian),
            "non-vegetarian" => Ok(Self::NonVegetarian),
            "vegan" => Ok(Self::Vegan),
            _ => Err(UnknownVariant {
                kind: "meal preference",
                value: s.to_string(),
            }),
        }
    }
}

/// Cabin class sent with a flight search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CabinClass {
    #[default]
    Economy,
    PremiumEconomy,
    Business,
    First,
}

impl CabinClass {
    /// Returns the wire label for this cabin.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Economy => "economy",
            Self::PremiumEconomy => "premium_economy",
            Self::Business => "business",
            Self::First => "first",
        }
    }

    /// Returns the label used in prompts.
    pub fn label(self) -> &'static str {
        match self {
            Self::Economy => "Economy",
            Self::PremiumEconomy => "Premium Economy",
            Self::Business => "Business",
            Self::First => "First",
        }
    }
}

impl fmt::Display for CabinClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CabinClass {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "economy" => Ok(Self::Economy),
            "premium_economy" => Ok(Self::PremiumEconomy),
            "business" => Ok(Self::Business),
            "first" => Ok(Self::First),
            _ => Err(UnknownVariant {
                kind: "cabin class",
                value: s.to_string(),
            }),
        }
    }
}

/// Whether the traveller returns on a second leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripType {
    OneWay,
    RoundTrip,
}

impl TripType {
    pub fn is_round_trip(self) -> bool {
        matches!(self, Self::RoundTrip)
    }
}
