//! Step progression engine.
//!
//! A [`Conversation`] takes one finalized utterance at a time, merges what it
//! recognises into its context and either asks for the next missing piece of
//! information or performs the search/booking side effect.

use crate::backend::FlightBackend;
use crate::config::DialogConfig;
use crate::context::{BookingStep, ConversationContext, InfoField, Stage};
use crate::extract;
use crate::lexicon;
use crate::present::{self, Reply};
use crate::prompts;
use attar_types::{BookingConfirmation, FlightResult};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Output of handling one utterance.
#[derive(Debug, Clone, Default)]
pub struct Turn {
    /// Assistant replies in the order they should be shown and spoken.
    pub replies: Vec<Reply>,
    /// Results of a search performed during this turn.
    pub flights: Vec<FlightResult>,
    /// Booking created during this turn.
    pub booking: Option<BookingConfirmation>,
}

impl Turn {
    fn say(&mut self, reply: Reply) {
        self.replies.push(reply);
    }
}

/// One call's conversation: its context plus the backend it drives.
pub struct Conversation {
    context: ConversationContext,
    backend: Arc<dyn FlightBackend>,
    config: DialogConfig,
}

impl std::fmt::Debug for Conversation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conversation")
            .field("context", &self.context)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Conversation {
    pub fn new(backend: Arc<dyn FlightBackend>, config: DialogConfig) -> Self {
        Self {
            context: ConversationContext::new(),
            backend,
            config,
        }
    }

    pub fn context(&self) -> &ConversationContext {
        &self.context
    }

    pub fn stage(&self) -> Stage {
        self.context.stage
    }

    /// The question the assistant is currently waiting on.
    pub fn current_prompt(&self) -> Reply {
        let origin = self.context.origin.as_deref().unwrap_or_default();
        let destination = self.context.destination.as_deref().unwrap_or_default();
        let text = match self.context.stage {
            Stage::Initial | Stage::Searching => prompts::HELP.to_string(),
            Stage::Planning => prompts::ASK_TRIP_LENGTH.to_string(),
            Stage::Collecting(InfoField::Origin) => prompts::ASK_ORIGIN.to_string(),
            Stage::Collecting(InfoField::Destination) => prompts::ask_destination(origin),
            Stage::Collecting(InfoField::Date) => prompts::ask_date(origin, destination),
            Stage::Booking(step) => match step {
                BookingStep::Passengers => prompts::PASSENGERS_RETRY,
                BookingStep::Seat => prompts::SEAT_RETRY,
                BookingStep::Meal => prompts::MEAL_RETRY,
                BookingStep::TripType => prompts::TRIP_TYPE_RETRY,
                BookingStep::ReturnDate => prompts::ASK_RETURN_DATE,
                BookingStep::Email => prompts::EMAIL_RETRY,
                BookingStep::Name => prompts::NAME_RETRY,
                BookingStep::Phone => prompts::ASK_PHONE,
                BookingStep::Confirm { .. } => prompts::CONFIRM_RETRY,
            }
            .to_string(),
        };
        Reply::text(text)
    }

    /// Processes one finalized utterance to completion.
    pub async fn handle(&mut self, utterance: &str) -> Turn {
        let mut turn = Turn::default();
        let text = utterance.trim();
        if text.is_empty() {
            turn.say(self.current_prompt());
            return turn;
        }

        debug!(utterance = text, stage = ?self.context.stage, "handling utterance");

        match self.context.stage {
            Stage::Booking(step) => self.handle_booking(step, text, &mut turn).await,
            Stage::Planning => self.handle_planning(text, &mut turn).await,
            Stage::Initial | Stage::Collecting(_) | Stage::Searching => {
                self.handle_search_flow(text, &mut turn).await
            }
        }

        debug!(stage = ?self.context.stage, replies = turn.replies.len(), "utterance handled");
        turn
    }

    async fn handle_search_flow(&mut self, text: &str, turn: &mut Turn) {
        let stage = self.context.stage;
        let extraction = extract::extract(text, &self.context, &self.config);
        self.context.apply(&extraction);

        let keyword = extract::has_flight_intent(text);
        let route_known = self.context.origin.is_some() && self.context.destination.is_some();
        // A single city only counts once a search is under way; outside one
        // it takes a full route.
        let collecting = matches!(stage, Stage::Collecting(_));
        let intent = keyword
            || collecting
            || extraction.cities.len() >= 2
            || (extraction.departure_date.is_some() && route_known);

        if !intent {
            if extract::has_planning_intent(text) {
                self.context.stage = Stage::Planning;
                turn.say(Reply::text(prompts::ASK_TRIP_LENGTH));
            } else {
                turn.say(Reply::text(prompts::HELP));
            }
            return;
        }

        let answered_nothing = extraction.departure_date.is_none()
            && extraction.cities.is_empty()
            && !keyword;
        if stage == Stage::Collecting(InfoField::Date)
            && self.context.departure_date.is_none()
            && answered_nothing
        {
            turn.say(Reply::text(prompts::DATE_RETRY));
            return;
        }

        self.advance_search(turn).await;
    }

    /// Asks for the first missing search field, or searches once all are known.
    async fn advance_search(&mut self, turn: &mut Turn) {
        let origin = self.context.origin.clone().unwrap_or_default();
        let destination = self.context.destination.clone().unwrap_or_default();

        match self.context.missing_search_field() {
            Some(InfoField::Origin) => {
                self.context.stage = Stage::Collecting(InfoField::Origin);
                turn.say(Reply::text(prompts::ASK_ORIGIN));
            }
            Some(InfoField::Destination) => {
                self.context.stage = Stage::Collecting(InfoField::Destination);
                turn.say(Reply::text(prompts::ask_destination(&origin)));
            }
            Some(InfoField::Date) => {
                self.context.stage = Stage::Collecting(InfoField::Date);
                turn.say(Reply::text(prompts::ask_date(&origin, &destination)));
            }
            None => self.search(turn).await,
        }
    }

    async fn search(&mut self, turn: &mut Turn) {
        let Some(request) = self.context.search_request(&self.config) else {
            return;
        };

        self.context.stage = Stage::Searching;
        info!(
            origin = %request.origin,
            destination = %request.destination,
            date = %request.departure_date,
            cabin = %request.cabin_class,
            "searching flights"
        );

        match self.backend.search_flights(&request).await {
            Ok(flights) if !flights.is_empty() => {
                info!(count = flights.len(), "flight search returned results");
                turn.say(Reply::text(prompts::flights_found(
                    flights.len(),
                    &request.origin,
                    &request.destination,
                )));
                turn.say(Reply::text(prompts::BOOK_OFFER));
                turn.flights = flights.clone();
                self.context.current_flights = flights;
                self.context.selected_flight = None;
                self.context.stage = Stage::Booking(BookingStep::Passengers);
            }
            Ok(_) => {
                info!("flight search returned no results");
                self.context.stage = Stage::Initial;
                turn.say(Reply::text(prompts::no_flights(
                    &request.origin,
                    &request.destination,
                    &request.departure_date,
                )));
            }
            Err(e) => {
                warn!(error = %e, "flight search failed");
                self.context.stage = Stage::Initial;
                turn.say(Reply::text(prompts::SEARCH_FAILED));
            }
        }
    }

    async fn handle_planning(&mut self, text: &str, turn: &mut Turn) {
        let names_route = lexicon::find_codes(text, self.config.city_match).len() >= 2;
        if extract::has_flight_intent(text) || names_route {
            self.context.stage = Stage::Initial;
            self.handle_search_flow(text, turn).await;
            return;
        }

        match extract::extract_days(text) {
            Some(days) => {
                self.context.stage = Stage::Initial;
                turn.say(Reply::text(prompts::trip_length_noted(days)));
            }
            None => turn.say(Reply::text(prompts::ASK_TRIP_LENGTH)),
        }
    }

    async fn handle_booking(&mut self, step: BookingStep, text: &str, turn: &mut Turn) {
        // The flight is chosen with the passenger count; the summary at
        // confirmation is final.
        if step == BookingStep::Passengers {
            self.resolve_flight_reference(text, step, turn);
        }

        match step {
            BookingStep::Passengers => {
                let by_number =
                    extract::flight_number_reference(text, &self.context.current_flights)
                        .is_some();
                match extract::extract_passengers(text, by_number) {
                    Some(n) => {
                        self.context.passengers = Some(n);
                        self.advance(step);
                        turn.say(Reply::text(prompts::ask_seat(n)));
                    }
                    None => turn.say(Reply::text(prompts::PASSENGERS_RETRY)),
                }
            }
            BookingStep::Seat => match extract::extract_seat(text) {
                Some(seat) => {
                    self.context.seat_preference = Some(seat);
                    self.advance(step);
                    turn.say(Reply::text(prompts::seat_noted(seat)));
                }
                None => turn.say(Reply::text(prompts::SEAT_RETRY)),
            },
            BookingStep::Meal => match extract::extract_meal(text) {
                Some(meal) => {
                    self.context.meal_preference = Some(meal);
                    self.advance(step);
                    turn.say(Reply::text(prompts::meal_noted(meal)));
                }
                None => turn.say(Reply::text(prompts::MEAL_RETRY)),
            },
            BookingStep::TripType => match extract::extract_trip_type(text) {
                Some(trip) => {
                    self.context.round_trip = trip.is_round_trip();
                    self.advance(step);
                    let reply = if trip.is_round_trip() {
                        prompts::ASK_RETURN_DATE
                    } else {
                        prompts::ONE_WAY_NOTED
                    };
                    turn.say(Reply::text(reply));
                }
                None => turn.say(Reply::text(prompts::TRIP_TYPE_RETRY)),
            },
            BookingStep::ReturnDate => {
                // Anything said here is kept; a recognisable date is normalised.
                let date = extract::extract_date(text, self.config.assumed_year)
                    .unwrap_or_else(|| text.to_string());
                self.context.return_date = Some(date);
                self.advance(step);
                turn.say(Reply::text(prompts::RETURN_DATE_NOTED));
            }
            BookingStep::Email => match extract::extract_email(text) {
                Some(email) => {
                    self.context.email = Some(email);
                    self.advance(step);
                    turn.say(Reply::text(prompts::ASK_NAME));
                }
                None => turn.say(Reply::text(prompts::EMAIL_RETRY)),
            },
            BookingStep::Name => match extract::extract_name(text) {
                Some(name) => {
                    self.context.passenger_name = Some(name);
                    self.advance(step);
                    turn.say(Reply::text(prompts::ASK_PHONE));
                }
                None => turn.say(Reply::text(prompts::NAME_RETRY)),
            },
            BookingStep::Phone => match extract::extract_phone(text) {
                Some(phone) => {
                    self.context.phone = Some(phone);
                    self.advance(step);
                    turn.say(present::booking_summary(&self.context));
                }
                None => turn.say(Reply::text(prompts::PHONE_RETRY)),
            },
            BookingStep::Confirm { attempt } => {
                if extract::is_affirmative(text) {
                    self.confirm_booking(attempt, turn).await;
                } else {
                    turn.say(Reply::text(prompts::CONFIRM_RETRY));
                }
            }
        }
    }

    fn resolve_flight_reference(&mut self, text: &str, step: BookingStep, turn: &mut Turn) {
        let Some(idx) = extract::flight_reference(text, &self.context.current_flights) else {
            return;
        };
        if self.context.selected_flight == Some(idx) {
            return;
        }
        self.context.selected_flight = Some(idx);
        if let Some(flight) = self.context.selected_flight() {
            debug!(flight = %flight.flight_number, step = step.index(), "flight selected");
            turn.say(Reply::text(prompts::flight_chosen(flight)));
        }
    }

    fn advance(&mut self, step: BookingStep) {
        if let Some(next) = step.next(self.context.round_trip) {
            self.context.stage = Stage::Booking(next);
        }
    }

    async fn confirm_booking(&mut self, attempt: Uuid, turn: &mut Turn) {
        let Some(request) = self.context.booking_request() else {
            error!(%attempt, "booking answers incomplete at confirmation, restarting questions");
            self.context.stage = Stage::Booking(BookingStep::Passengers);
            turn.say(Reply::text(prompts::PASSENGERS_RETRY));
            return;
        };

        info!(
            %attempt,
            origin = %request.departure_location,
            destination = %request.destination,
            travelers = request.num_travelers,
            "creating booking"
        );

        match self.backend.create_booking(&request, attempt).await {
            Ok(confirmation) => {
                info!(%attempt, reference = %confirmation.reference, "booking confirmed");
                turn.say(present::booking_confirmed(
                    &self.context,
                    &confirmation.reference,
                ));
                turn.booking = Some(confirmation);
                self.context.stage = Stage::Initial;
            }
            Err(e) => {
                // Stay on confirmation with the same attempt so a retry is
                // deduplicated by the backend.
                warn!(%attempt, error = %e, "booking creation failed");
                turn.say(Reply::text(prompts::BOOKING_FAILED));
            }
        }
    }
}
