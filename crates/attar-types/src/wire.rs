//! Request and response bodies exchanged with the search/booking backend.

use crate::{CabinClass, FlightResult, MealPreference, SeatPreference};
use serde::{Deserialize, Serialize};

/// Body of a flight search request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub origin: String,
    pub destination: String,
    /// `YYYY-MM-DD`.
    pub departure_date: String,
    pub passengers: u32,
    pub cabin_class: CabinClass,
}

/// Body returned by the search endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    pub success: bool,
    #[serde(default)]
    pub flights: Vec<FlightResult>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of a booking creation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub customer_email: String,
    pub passenger_name: String,
    pub phone: String,
    pub departure_location: String,
    pub destination: String,
    /// Flight number of the selected offer, if one was chosen.
    pub flight_number: Option<String>,
    pub departure_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
    pub num_travelers: u32,
    pub seat_preference: SeatPreference,
    pub meal_preference: MealPreference,
    pub round_trip: bool,
}

/// Body returned by the booking endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingResponse {
    pub success: bool,
    #[serde(default, alias = "booking_reference")]
    pub confirmation_reference: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A booking the backend accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub reference: String,
}
