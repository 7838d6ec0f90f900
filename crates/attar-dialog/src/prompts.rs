//! Assistant wording.
//!
//! Re-ask prompts are constants so that a failed step repeats its question
//! word for word.

use attar_types::{FlightResult, MealPreference, SeatPreference};

pub const GREETING: &str =
    "Hello! I'm your travel assistant. I can search flights, book tickets and help plan your trip. Where would you like to go?";

pub const ASK_ORIGIN: &str = "I'd be delighted to help you with your flight booking. Could you tell me which city or airport you'll be departing from?";

pub const DATE_RETRY: &str = "I didn't catch the date. Could you please tell me when you'd like to travel? For example, you can say '15 December' or 'January 20th'.";

pub const HELP: &str =
    "I can help you with flights, bookings, and trip planning. What would you like to do?";

pub const ASK_TRIP_LENGTH: &str =
    "I'd love to help you plan your trip! How many days are you planning for?";

pub const SEARCH_FAILED: &str =
    "I'm having trouble finding flights right now. Please ask me again in a moment.";

pub const BOOK_OFFER: &str = "Would you like to book one of these flights? Tell me which one you prefer and how many passengers are travelling.";

pub const PASSENGERS_RETRY: &str = "Could you tell me the number of passengers? For example, you could say \"2 passengers\" or just \"2\".";

pub const SEAT_RETRY: &str = "Would you prefer window or aisle seats?";

pub const MEAL_RETRY: &str = "Would you prefer vegetarian, non-vegetarian, or vegan meals?";

pub const TRIP_TYPE_RETRY: &str = "Is this a one-way trip or a round trip?";

pub const ASK_RETURN_DATE: &str =
    "Wonderful! For your return flight, when would you like to head back?";

pub const RETURN_DATE_NOTED: &str = "Thank you! Your return date is noted. Now, could you please provide your email address for the booking confirmation?";

pub const ONE_WAY_NOTED: &str = "Perfect! One-way trip confirmed. Now, could you please provide your email address for the booking confirmation?";

pub const EMAIL_RETRY: &str = "I couldn't make out an email address. Could you spell it out, for example 'sara at example dot com'?";

pub const ASK_NAME: &str =
    "Perfect! Your email is saved. Could you tell me the passenger's full name?";

pub const NAME_RETRY: &str = "Could you tell me the full name of the passenger?";

pub const ASK_PHONE: &str =
    "Thank you! Now could you please share your phone number for contact purposes?";

pub const PHONE_RETRY: &str =
    "I need a phone number of at least seven digits. Could you say it again?";

pub const CONFIRM_RETRY: &str = "Should I go ahead with the booking?";

pub const BOOKING_FAILED: &str = "I'm sorry, I couldn't complete the booking just now. Say yes to try again; you won't be booked twice.";

pub fn ask_destination(origin: &str) -> String {
    format!(
        "Excellent! Flying from {origin}. Now, where are you planning to travel to? Please share your destination city."
    )
}

pub fn ask_date(origin: &str, destination: &str) -> String {
    format!(
        "Perfect! Flying from {origin} to {destination}. When are you planning to make this journey? Please share your preferred departure date."
    )
}

pub fn flights_found(count: usize, origin: &str, destination: &str) -> String {
    format!("I found {count} flights from {origin} to {destination}! Check the flight cards above.")
}

pub fn no_flights(origin: &str, destination: &str, date: &str) -> String {
    format!(
        "I couldn't find any flights from {origin} to {destination} on {date}. Would you like to try a different date?"
    )
}

pub fn trip_length_noted(days: u32) -> String {
    format!(
        "A {days}-day trip sounds wonderful! Where would you like to go, and which city will you be flying from?"
    )
}

pub fn flight_chosen(flight: &FlightResult) -> String {
    format!(
        "Great choice, {} {} it is.",
        flight.airline, flight.flight_number
    )
}

pub fn ask_seat(passengers: u32) -> String {
    format!(
        "Perfect! For your {passengers} passenger(s), would you prefer window seats for the view, or aisle seats for easier access?"
    )
}

pub fn seat_noted(seat: SeatPreference) -> &'static str {
    match seat {
        SeatPreference::Window => "Great choice! Window seats are wonderful for viewing the landscape. Now, regarding your in-flight dining, would you prefer vegetarian meals, non-vegetarian, or do you have any vegan requirements?",
        SeatPreference::Aisle => "Perfect! Aisle seats give you more flexibility. Now, regarding your in-flight dining, would you prefer vegetarian meals, non-vegetarian, or do you have any vegan requirements?",
    }
}

pub fn meal_noted(meal: MealPreference) -> &'static str {
    match meal {
        MealPreference::Vegetarian => "Excellent! Vegetarian meals will be arranged. Is this a one-way trip, or will you be returning?",
        MealPreference::NonVegetarian => "Perfect! Non-vegetarian meals will be arranged. Is this a one-way trip, or will you be returning?",
        MealPreference::Vegan => "Great! We'll arrange vegan meals for you. Is this a one-way trip, or will you be returning?",
    }
}
