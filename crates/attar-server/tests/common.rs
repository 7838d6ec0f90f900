#![allow(dead_code)]

use async_trait::async_trait;
use attar_dialog::{BackendError, DialogConfig, FlightBackend};
use attar_server::AppState;
use attar_types::{
    BookingConfirmation, BookingRequest, FlightEndpoint, FlightResult, SearchRequest,
};
use attar_voice::{LiveKitConfig, VoiceService};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tower::ServiceExt;
use uuid::Uuid;

pub const LIVEKIT_URL: &str = "wss://voice.attar.test";
pub const LIVEKIT_KEY: &str = "devkey";
pub const LIVEKIT_SECRET: &str = "secret";

pub fn sample_flights() -> Vec<FlightResult> {
    ["SV 759", "6E 77"]
        .iter()
        .enumerate()
        .map(|(i, number)| FlightResult {
            id: None,
            airline: if i == 0 { "Saudia" } else { "IndiGo" }.to_string(),
            flight_number: number.to_string(),
            from: FlightEndpoint {
                code: "BLR".into(),
                time: "09:15".into(),
            },
            to: FlightEndpoint {
                code: "RUH".into(),
                time: "12:40".into(),
            },
            duration: Some("5h 25m".into()),
            stops: i as u32,
            price: 28450.0 - 1000.0 * i as f64,
            currency: "INR".into(),
            cabin_class: None,
            seats_available: None,
            departure_date: Some("2025-12-15".into()),
        })
        .collect()
}

/// Backend that always finds the sample flights and accepts every booking.
#[derive(Default)]
pub struct StubBackend {
    pub searches: AtomicUsize,
    pub bookings: AtomicUsize,
}

#[async_trait]
impl FlightBackend for StubBackend {
    async fn search_flights(
        &self,
        _request: &SearchRequest,
    ) -> Result<Vec<FlightResult>, BackendError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        Ok(sample_flights())
    }

    async fn create_booking(
        &self,
        _request: &BookingRequest,
        _idempotency_key: Uuid,
    ) -> Result<BookingConfirmation, BackendError> {
        self.bookings.fetch_add(1, Ordering::SeqCst);
        Ok(BookingConfirmation {
            reference: "ATR-2002".into(),
        })
    }
}

/// Backend whose searches block until released, for overlapping requests.
#[derive(Default)]
pub struct GatedBackend {
    pub entered: Notify,
    pub release: Notify,
}

#[async_trait]
impl FlightBackend for GatedBackend {
    async fn search_flights(
        &self,
        _request: &SearchRequest,
    ) -> Result<Vec<FlightResult>, BackendError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(sample_flights())
    }

    async fn create_booking(
        &self,
        _request: &BookingRequest,
        _idempotency_key: Uuid,
    ) -> Result<BookingConfirmation, BackendError> {
        Err(BackendError::Rejected("not used".into()))
    }
}

pub fn build_test_state(backend: Arc<dyn FlightBackend>, livekit: LiveKitConfig) -> AppState {
    let dialog = DialogConfig {
        assumed_year: 2025,
        ..DialogConfig::default()
    };
    AppState::new(backend, dialog, Arc::new(VoiceService::new(livekit)))
}

pub fn test_app() -> (Router, Arc<StubBackend>, AppState) {
    let backend = Arc::new(StubBackend::default());
    let state = build_test_state(backend.clone(), LiveKitConfig::default());
    (attar_server::app(state.clone()), backend, state)
}

pub fn livekit_config() -> LiveKitConfig {
    LiveKitConfig::new(LIVEKIT_URL, LIVEKIT_KEY, LIVEKIT_SECRET)
}

/// Sends one request through the router and returns status and JSON body
/// (`Value::Null` for empty bodies).
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

pub async fn create_session(app: &Router) -> String {
    let (status, body) = send(app, Method::POST, "/api/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    body["session_id"].as_str().unwrap().to_string()
}

pub async fn say(app: &Router, session_id: &str, text: &str) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        &format!("/api/sessions/{session_id}/utterances"),
        Some(serde_json::json!({"text": text, "is_final": true})),
    )
    .await
}
