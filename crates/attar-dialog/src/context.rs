//! Conversation context and the stage it is in.
//!
//! The (mode, step) pair of a scripted conversation is modelled as a single
//! [`Stage`] value so that invalid combinations cannot be represented. The
//! confirmation step carries the idempotency key of its booking attempt.

use crate::config::DialogConfig;
use crate::extract::Extraction;
use attar_types::{
    BookingRequest, CabinClass, FlightResult, MealPreference, SearchRequest, SeatPreference,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Coarse conversation phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Initial,
    CollectingInfo,
    Searching,
    Booking,
    Planning,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::CollectingInfo => "collecting_info",
            Self::Searching => "searching",
            Self::Booking => "booking",
            Self::Planning => "planning",
        }
    }
}

/// A search parameter the assistant is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfoField {
    Origin,
    Destination,
    Date,
}

/// One question of the booking sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStep {
    Passengers,
    Seat,
    Meal,
    TripType,
    ReturnDate,
    Email,
    Name,
    Phone,
    /// Final yes/no. `attempt` is sent as the idempotency key and survives
    /// retries of the same booking.
    Confirm { attempt: Uuid },
}

impl BookingStep {
    /// Position in the booking sequence, 0..=8.
    pub fn index(&self) -> u8 {
        match self {
            Self::Passengers => 0,
            Self::Seat => 1,
            Self::Meal => 2,
            Self::TripType => 3,
            Self::ReturnDate => 4,
            Self::Email => 5,
            Self::Name => 6,
            Self::Phone => 7,
            Self::Confirm { .. } => 8,
        }
    }

    /// The step after this one. The return date is skipped for one-way trips;
    /// entering confirmation mints a fresh attempt key. Confirmation has no
    /// successor within the sequence.
    pub fn next(&self, round_trip: bool) -> Option<Self> {
        let next = match self {
            Self::Passengers => Self::Seat,
            Self::Seat => Self::Meal,
            Self::Meal => Self::TripType,
            Self::TripType if round_trip => Self::ReturnDate,
            Self::TripType => Self::Email,
            Self::ReturnDate => Self::Email,
            Self::Email => Self::Name,
            Self::Name => Self::Phone,
            Self::Phone => Self::Confirm {
                attempt: Uuid::new_v4(),
            },
            Self::Confirm { .. } => return None,
        };
        Some(next)
    }
}

/// Where the conversation is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Initial,
    Collecting(InfoField),
    Searching,
    Booking(BookingStep),
    Planning,
}

/// The step pointer as exposed to clients: a booking index or the name of
/// the search field being collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Step {
    Index(u8),
    Field(InfoField),
}

impl Stage {
    pub fn mode(&self) -> Mode {
        match self {
            Self::Initial => Mode::Initial,
            Self::Collecting(_) => Mode::CollectingInfo,
            Self::Searching => Mode::Searching,
            Self::Booking(_) => Mode::Booking,
            Self::Planning => Mode::Planning,
        }
    }

    pub fn step(&self) -> Step {
        match self {
            Self::Collecting(field) => Step::Field(*field),
            Self::Booking(step) => Step::Index(step.index()),
            _ => Step::Index(0),
        }
    }
}

/// Everything learned during one call. Created empty at call start and
/// dropped at call end.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversationContext {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub departure_date: Option<String>,
    pub passengers: Option<u32>,
    pub seat_preference: Option<SeatPreference>,
    pub meal_preference: Option<MealPreference>,
    pub round_trip: bool,
    pub return_date: Option<String>,
    pub email: Option<String>,
    pub passenger_name: Option<String>,
    pub phone: Option<String>,
    pub cabin_class: Option<CabinClass>,
    pub stage: Stage,
    pub current_flights: Vec<FlightResult>,
    /// Index into `current_flights`.
    pub selected_flight: Option<usize>,
}

impl ConversationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.stage.mode()
    }

    pub fn step(&self) -> Step {
        self.stage.step()
    }

    /// Merges route, date and cabin from an extraction. Only values present in
    /// the extraction are written; nothing is cleared.
    ///
    /// Returns `true` if any field changed.
    pub fn apply(&mut self, extraction: &Extraction) -> bool {
        let mut changed = false;
        changed |= set_if_some(&mut self.origin, &extraction.origin);
        changed |= set_if_some(&mut self.destination, &extraction.destination);
        changed |= set_if_some(&mut self.departure_date, &extraction.departure_date);
        if let Some(cabin) = extraction.cabin_class {
            changed |= self.cabin_class != Some(cabin);
            self.cabin_class = Some(cabin);
        }
        changed
    }

    /// The first search parameter still unknown, in asking order.
    pub fn missing_search_field(&self) -> Option<InfoField> {
        if self.origin.is_none() {
            Some(InfoField::Origin)
        } else if self.destination.is_none() {
            Some(InfoField::Destination)
        } else if self.departure_date.is_none() {
            Some(InfoField::Date)
        } else {
            None
        }
    }

    /// Builds the search request once origin, destination and date are known.
    pub fn search_request(&self, config: &DialogConfig) -> Option<SearchRequest> {
        Some(SearchRequest {
            origin: self.origin.clone()?,
            destination: self.destination.clone()?,
            departure_date: self.departure_date.clone()?,
            passengers: self.passengers.unwrap_or(1),
            cabin_class: self.cabin_class.unwrap_or(config.cabin_class),
        })
    }

    pub fn selected_flight(&self) -> Option<&FlightResult> {
        self.selected_flight
            .and_then(|idx| self.current_flights.get(idx))
    }

    /// Builds the booking request once every booking answer is present.
    pub fn booking_request(&self) -> Option<BookingRequest> {
        Some(BookingRequest {
            customer_email: self.email.clone()?,
            passenger_name: self.passenger_name.clone()?,
            phone: self.phone.clone()?,
            departure_location: self.origin.clone()?,
            destination: self.destination.clone()?,
            flight_number: self.selected_flight().map(|f| f.flight_number.clone()),
            departure_date: self.departure_date.clone(),
            return_date: if self.round_trip {
                self.return_date.clone()
            } else {
                None
            },
            num_travelers: self.passengers?,
            seat_preference: self.seat_preference?,
            meal_preference: self.meal_preference?,
            round_trip: self.round_trip,
        })
    }
}

fn set_if_some(slot: &mut Option<String>, value: &Option<String>) -> bool {
    match value {
        Some(v) if slot.as_deref() != Some(v.as_str()) => {
            *slot = Some(v.clone());
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_steps_advance_one_at_a_time() {
        let mut step = BookingStep::Passengers;
        let mut indices = vec![step.index()];
        while let Some(next) = step.next(true) {
            indices.push(next.index());
            step = next;
        }
        assert_eq!(indices, (0..=8).collect::<Vec<u8>>());
    }

    #[test]
    fn one_way_skips_return_date() {
        assert_eq!(
            BookingStep::TripType.next(false),
            Some(BookingStep::Email)
        );
        assert_eq!(
            BookingStep::TripType.next(true),
            Some(BookingStep::ReturnDate)
        );
    }

    #[test]
    fn every_confirmation_gets_a_new_attempt() {
        let a = BookingStep::Phone.next(false);
        let b = BookingStep::Phone.next(false);
        assert!(matches!(a, Some(BookingStep::Confirm { .. })));
        assert_ne!(a, b);
    }

    #[test]
    fn stage_reports_mode_and_step() {
        assert_eq!(Stage::Initial.mode(), Mode::Initial);
        assert_eq!(
            Stage::Collecting(InfoField::Date).step(),
            Step::Field(InfoField::Date)
        );
        assert_eq!(Stage::Booking(BookingStep::Seat).step(), Step::Index(1));
        assert_eq!(Stage::Booking(BookingStep::Seat).mode(), Mode::Booking);
        assert_eq!(
            serde_json::to_value(Stage::Collecting(InfoField::Date).step()).unwrap(),
            serde_json::json!("date")
        );
    }

    #[test]
    fn apply_never_clears_known_fields() {
        let mut ctx = ConversationContext::new();
        ctx.origin = Some("BLR".into());
        let changed = ctx.apply(&Extraction {
            destination: Some("RUH".into()),
            ..Extraction::default()
        });
        assert!(changed);
        assert_eq!(ctx.origin.as_deref(), Some("BLR"));
        assert_eq!(ctx.destination.as_deref(), Some("RUH"));
        assert!(!ctx.apply(&Extraction::default()));
        assert_eq!(ctx.missing_search_field(), Some(InfoField::Date));
    }

    #[test]
    fn search_request_defaults() {
        let mut ctx = ConversationContext::new();
        let config = DialogConfig::default();
        assert!(ctx.search_request(&config).is_none());

        ctx.origin = Some("BLR".into());
        ctx.destination = Some("JED".into());
        ctx.departure_date = Some("2025-12-20".into());
        let request = ctx.search_request(&config).unwrap();
        assert_eq!(request.passengers, 1);
        assert_eq!(request.cabin_class, CabinClass::Economy);
    }
}
