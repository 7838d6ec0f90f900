#![allow(dead_code)]

use async_trait::async_trait;
use attar_dialog::{BackendError, Conversation, DialogConfig, FlightBackend};
use attar_types::{
    BookingConfirmation, BookingRequest, FlightEndpoint, FlightResult, SearchRequest,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Backend double that records every call and replays queued outcomes.
#[derive(Default)]
pub struct RecordingBackend {
    pub searches: Mutex<Vec<SearchRequest>>,
    pub bookings: Mutex<Vec<(BookingRequest, Uuid)>>,
    search_results: Mutex<VecDeque<Result<Vec<FlightResult>, BackendError>>>,
    booking_results: Mutex<VecDeque<Result<BookingConfirmation, BackendError>>>,
}

impl RecordingBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_flights(flights: Vec<FlightResult>) -> Arc<Self> {
        let backend = Self::default();
        backend.push_search(Ok(flights));
        Arc::new(backend)
    }

    pub fn push_search(&self, result: Result<Vec<FlightResult>, BackendError>) {
        self.search_results.lock().unwrap().push_back(result);
    }

    pub fn push_booking(&self, result: Result<BookingConfirmation, BackendError>) {
        self.booking_results.lock().unwrap().push_back(result);
    }

    pub fn search_count(&self) -> usize {
        self.searches.lock().unwrap().len()
    }

    pub fn booking_count(&self) -> usize {
        self.bookings.lock().unwrap().len()
    }
}

#[async_trait]
impl FlightBackend for RecordingBackend {
    async fn search_flights(
        &self,
        request: &SearchRequest,
    ) -> Result<Vec<FlightResult>, BackendError> {
        self.searches.lock().unwrap().push(request.clone());
        self.search_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(sample_flights()))
    }

    async fn create_booking(
        &self,
        request: &BookingRequest,
        idempotency_key: Uuid,
    ) -> Result<BookingConfirmation, BackendError> {
        self.bookings
            .lock()
            .unwrap()
            .push((request.clone(), idempotency_key));
        self.booking_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(BookingConfirmation {
                    reference: "ATR-1001".to_string(),
                })
            })
    }
}

pub fn flight(airline: &str, number: &str, from: &str, to: &str, price: f64) -> FlightResult {
    FlightResult {
        id: Some(number.replace(' ', "")),
        airline: airline.to_string(),
        flight_number: number.to_string(),
        from: FlightEndpoint {
            code: from.to_string(),
            time: "09:15".to_string(),
        },
        to: FlightEndpoint {
            code: to.to_string(),
            time: "12:40".to_string(),
        },
        duration: Some("5h 25m".to_string()),
        stops: 0,
        price,
        currency: "INR".to_string(),
        cabin_class: Some("Economy".to_string()),
        seats_available: Some(9),
        departure_date: Some("2025-12-15".to_string()),
    }
}

pub fn sample_flights() -> Vec<FlightResult> {
    vec![
        flight("Saudia", "SV 759", "BLR", "RUH", 28450.0),
        flight("IndiGo", "6E 77", "BLR", "RUH", 24900.0),
        flight("Flynas", "XY 330", "BLR", "RUH", 21300.0),
    ]
}

pub fn config() -> DialogConfig {
    DialogConfig {
        assumed_year: 2025,
        ..DialogConfig::default()
    }
}

pub fn conversation(backend: Arc<RecordingBackend>) -> Conversation {
    Conversation::new(backend, config())
}

/// Drives a conversation through `utterances`, returning the last turn's
/// display texts.
pub async fn say_all(conversation: &mut Conversation, utterances: &[&str]) -> Vec<String> {
    let mut last = Vec::new();
    for utterance in utterances {
        let turn = conversation.handle(utterance).await;
        last = turn.replies.into_iter().map(|r| r.display).collect();
    }
    last
}
