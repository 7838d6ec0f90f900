//! Presentation: chat transcript entries, assistant replies and flight cards.

use crate::context::ConversationContext;
use attar_types::FlightResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One assistant output. `display` is shown in the chat; `spoken` is handed
/// to speech synthesis and may be shorter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub display: String,
    pub spoken: String,
}

impl Reply {
    /// A reply spoken exactly as displayed.
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            spoken: text.clone(),
            display: text,
        }
    }

    pub fn with_speech(display: impl Into<String>, spoken: impl Into<String>) -> Self {
        Self {
            display: display.into(),
            spoken: spoken.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

/// Ordered chat history of one call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, role: Role, text: impl Into<String>) {
        self.messages.push(ChatMessage {
            role,
            text: text.into(),
            sent_at: Utc::now(),
        });
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Display model for one flight result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightCard {
    pub airline: String,
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub duration: String,
    pub stops: String,
    pub price: String,
    pub cabin_class: String,
    pub seats: String,
    pub departure_date: String,
}

impl From<&FlightResult> for FlightCard {
    fn from(flight: &FlightResult) -> Self {
        let or_na = |s: &str| {
            if s.is_empty() {
                "N/A".to_string()
            } else {
                s.to_string()
            }
        };
        Self {
            airline: flight.airline.clone(),
            flight_number: flight.flight_number.clone(),
            origin: or_na(flight.origin_code()),
            destination: or_na(flight.destination_code()),
            departure_time: or_na(&flight.from.time),
            arrival_time: or_na(&flight.to.time),
            duration: flight.duration.clone().unwrap_or_else(|| "N/A".to_string()),
            stops: stops_label(flight.stops),
            price: format_price(flight.price, &flight.currency),
            cabin_class: flight
                .cabin_class
                .clone()
                .unwrap_or_else(|| "Economy".to_string()),
            seats: flight
                .seats_available
                .map(|n| format!("{n} left"))
                .unwrap_or_else(|| "Available".to_string()),
            departure_date: flight
                .departure_date
                .clone()
                .unwrap_or_else(|| "N/A".to_string()),
        }
    }
}

pub fn stops_label(stops: u32) -> String {
    match stops {
        0 => "Non-stop".to_string(),
        1 => "1 stop".to_string(),
        n => format!("{n} stops"),
    }
}

/// Formats a price with thousands separators, e.g. `INR 28,450`. Fractions
/// are rounded to whole units.
pub fn format_price(amount: f64, currency: &str) -> String {
    let whole = amount.round() as i64;
    let digits = whole.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if whole < 0 { "-" } else { "" };
    format!("{currency} {sign}{grouped}")
}

/// Summary shown before the final confirmation.
pub fn booking_summary(ctx: &ConversationContext) -> Reply {
    let flight = ctx
        .selected_flight()
        .map(|f| format!("{} {}", f.airline, f.flight_number))
        .unwrap_or_else(|| "Selected flight".to_string());
    let passengers = ctx.passengers.unwrap_or(1);
    let seat = ctx.seat_preference.map(|s| s.as_str()).unwrap_or("any");
    let meal = ctx.meal_preference.map(|m| m.as_str()).unwrap_or("any");
    let email = ctx.email.as_deref().unwrap_or("");
    let name = ctx.passenger_name.as_deref().unwrap_or("");
    let phone = ctx.phone.as_deref().unwrap_or("");
    let trip = if ctx.round_trip {
        format!(
            "Return Date: {}",
            ctx.return_date.as_deref().unwrap_or("to be confirmed")
        )
    } else {
        "One-way trip".to_string()
    };

    let display = format!(
        "Perfect! Let me confirm your booking:\n\n\
         Flight: {flight}\n\
         Passengers: {passengers}\n\
         Seat Preference: {seat}\n\
         Meal: {meal}\n\
         {trip}\n\
         Email: {email}\n\
         Name: {name}\n\
         Phone: {phone}\n\n\
         Shall I proceed with this booking?"
    );
    let spoken = format!(
        "Let me confirm: {passengers} passenger with {seat} seat, {meal} meal. Email {email}, name {name}, phone {phone}. Should I go ahead with the booking?"
    );
    Reply::with_speech(display, spoken)
}

/// Message sent after the backend accepted the booking.
pub fn booking_confirmed(ctx: &ConversationContext, reference: &str) -> Reply {
    let flight = ctx
        .selected_flight()
        .map(|f| f.flight_number.as_str())
        .unwrap_or("Selected flight");
    let email = ctx.email.as_deref().unwrap_or("");
    let display = format!(
        "Excellent! Your flight has been successfully booked!\n\n\
         Confirmation Details:\n\
         - Booking Reference: {reference}\n\
         - Flight: {flight}\n\
         - Passengers: {}\n\
         - Email: {email}\n\n\
         A detailed confirmation email has been sent to {email} with payment instructions and all booking information.\n\n\
         Is there anything else I can help you with today?",
        ctx.passengers.unwrap_or(1)
    );
    let spoken = format!(
        "Your booking is confirmed! A confirmation email has been sent to {email}. Thank you for booking with Attar Travel!"
    );
    Reply::with_speech(display, spoken)
}
