use attar_client::{BackendConfig, ClientError, HttpFlightBackend, IDEMPOTENCY_HEADER};
use attar_dialog::{BackendError, FlightBackend};
use attar_types::{BookingRequest, CabinClass, MealPreference, SearchRequest, SeatPreference};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use uuid::Uuid;

#[derive(Default)]
struct Stub {
    hits: Mutex<Vec<String>>,
    bodies: Mutex<Vec<Value>>,
    keys: Mutex<Vec<Option<String>>>,
}

type Shared = Arc<Stub>;

fn flight_json(number: &str) -> Value {
    json!({
        "airline": "Saudia",
        "flight_number": number,
        "from": {"code": "BLR", "time": "09:15"},
        "to": {"code": "RUH", "time": "12:40"},
        "duration": "5h 25m",
        "stops": 0,
        "price": 28450.0,
        "currency": "INR"
    })
}

async fn spawn(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn backend(base_url: &str) -> HttpFlightBackend {
    HttpFlightBackend::new(&BackendConfig {
        base_url: base_url.to_string(),
        timeout_secs: 5,
        ..BackendConfig::default()
    })
    .unwrap()
}

fn search_request() -> SearchRequest {
    SearchRequest {
        origin: "BLR".into(),
        destination: "RUH".into(),
        departure_date: "2025-12-15".into(),
        passengers: 2,
        cabin_class: CabinClass::Economy,
    }
}

fn booking_request() -> BookingRequest {
    BookingRequest {
        customer_email: "sara@example.com".into(),
        passenger_name: "Sara Khan".into(),
        phone: "+966501234567".into(),
        departure_location: "BLR".into(),
        destination: "RUH".into(),
        flight_number: Some("SV 759".into()),
        departure_date: Some("2025-12-15".into()),
        return_date: None,
        num_travelers: 2,
        seat_preference: SeatPreference::Window,
        meal_preference: MealPreference::Vegetarian,
        round_trip: false,
    }
}

#[tokio::test]
async fn primary_search_results_are_returned() {
    let stub: Shared = Arc::default();
    let router = Router::new()
        .route(
            "/mcp/search-flights",
            post(|State(stub): State<Shared>, Json(body): Json<Value>| async move {
                stub.hits.lock().unwrap().push("primary".into());
                stub.bodies.lock().unwrap().push(body);
                Json(json!({"success": true, "flights": [flight_json("SV 759"), flight_json("SV 761")]}))
            }),
        )
        .route(
            "/api/search-flights",
            post(|State(stub): State<Shared>| async move {
                stub.hits.lock().unwrap().push("fallback".into());
                Json(json!({"success": true, "flights": []}))
            }),
        )
        .with_state(stub.clone());
    let url = spawn(router).await;

    let flights = backend(&url).search_flights(&search_request()).await.unwrap();

    assert_eq!(flights.len(), 2);
    assert_eq!(flights[0].flight_number, "SV 759");
    assert_eq!(*stub.hits.lock().unwrap(), vec!["primary".to_string()]);
    let body = stub.bodies.lock().unwrap()[0].clone();
    assert_eq!(body["origin"], "BLR");
    assert_eq!(body["departure_date"], "2025-12-15");
    assert_eq!(body["passengers"], 2);
    assert_eq!(body["cabin_class"], "economy");
}

#[tokio::test]
async fn failing_primary_falls_back() {
    let stub: Shared = Arc::default();
    let router = Router::new()
        .route(
            "/mcp/search-flights",
            post(|State(stub): State<Shared>| async move {
                stub.hits.lock().unwrap().push("primary".into());
                (StatusCode::INTERNAL_SERVER_ERROR, "boom")
            }),
        )
        .route(
            "/api/search-flights",
            post(|State(stub): State<Shared>| async move {
                stub.hits.lock().unwrap().push("fallback".into());
                Json(json!({"success": true, "flights": [flight_json("6E 77")]}))
            }),
        )
        .with_state(stub.clone());
    let url = spawn(router).await;

    let flights = backend(&url).search_flights(&search_request()).await.unwrap();

    assert_eq!(flights.len(), 1);
    assert_eq!(
        *stub.hits.lock().unwrap(),
        vec!["primary".to_string(), "fallback".to_string()]
    );
}

#[tokio::test]
async fn empty_primary_falls_back() {
    let router = Router::new()
        .route(
            "/mcp/search-flights",
            post(|| async { Json(json!({"success": true, "flights": []})) }),
        )
        .route(
            "/api/search-flights",
            post(|| async { Json(json!({"success": true, "flights": [flight_json("XY 330")]})) }),
        );
    let url = spawn(router).await;

    let flights = backend(&url).search_flights(&search_request()).await.unwrap();

    assert_eq!(flights[0].flight_number, "XY 330");
}

#[tokio::test]
async fn both_searches_failing_is_an_error() {
    let router = Router::new()
        .route(
            "/mcp/search-flights",
            post(|| async { StatusCode::BAD_GATEWAY }),
        )
        .route(
            "/api/search-flights",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
        );
    let url = spawn(router).await;

    let err = backend(&url)
        .search_flights(&search_request())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        BackendError::Status {
            status: 503,
            body: "down".into()
        }
    );
}

#[tokio::test]
async fn unsuccessful_search_is_rejected() {
    let router = Router::new().route(
        "/mcp/search-flights",
        post(|| async { Json(json!({"success": false, "message": "no inventory"})) }),
    );
    let url = spawn(router).await;
    let backend = HttpFlightBackend::new(&BackendConfig {
        base_url: url,
        fallback_search_path: String::new(),
        ..BackendConfig::default()
    })
    .unwrap();

    let err = backend.search_flights(&search_request()).await.unwrap_err();

    assert_eq!(err, BackendError::Rejected("no inventory".into()));
}

#[tokio::test]
async fn booking_sends_idempotency_key() {
    let stub: Shared = Arc::default();
    let router = Router::new()
        .route(
            "/create-booking",
            post(
                |State(stub): State<Shared>, headers: HeaderMap, Json(body): Json<Value>| async move {
                    let key = headers
                        .get(IDEMPOTENCY_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    stub.keys.lock().unwrap().push(key);
                    stub.bodies.lock().unwrap().push(body);
                    Json(json!({"success": true, "booking_reference": "MT-7F3A"}))
                },
            ),
        )
        .with_state(stub.clone());
    let url = spawn(router).await;
    let key = Uuid::new_v4();

    let confirmation = backend(&url)
        .create_booking(&booking_request(), key)
        .await
        .unwrap();

    assert_eq!(confirmation.reference, "MT-7F3A");
    assert_eq!(
        stub.keys.lock().unwrap()[0].as_deref(),
        Some(key.to_string().as_str())
    );
    let body = stub.bodies.lock().unwrap()[0].clone();
    assert_eq!(body["customer_email"], "sara@example.com");
    assert_eq!(body["seat_preference"], "window");
    assert_eq!(body["meal_preference"], "vegetarian");
    assert!(body.get("return_date").is_none());
}

#[tokio::test]
async fn declined_booking_is_rejected() {
    let router = Router::new().route(
        "/create-booking",
        post(|| async { Json(json!({"success": false, "message": "flight full"})) }),
    );
    let url = spawn(router).await;

    let err = backend(&url)
        .create_booking(&booking_request(), Uuid::new_v4())
        .await
        .unwrap_err();

    assert_eq!(err, BackendError::Rejected("flight full".into()));
}

#[tokio::test]
async fn malformed_booking_response_is_a_decode_error() {
    let router = Router::new().route("/create-booking", post(|| async { "not json" }));
    let url = spawn(router).await;

    let err = backend(&url)
        .create_booking(&booking_request(), Uuid::new_v4())
        .await
        .unwrap_err();

    assert!(matches!(err, BackendError::Decode(_)));
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let backend = HttpFlightBackend::new(&BackendConfig {
        base_url: url,
        fallback_search_path: String::new(),
        timeout_secs: 2,
        ..BackendConfig::default()
    })
    .unwrap();

    let err = backend.search_flights(&search_request()).await.unwrap_err();

    assert!(matches!(err, BackendError::Network(_)));
}

#[test]
fn rejects_non_http_base_url() {
    let err = HttpFlightBackend::new(&BackendConfig {
        base_url: "flights.internal".into(),
        ..BackendConfig::default()
    })
    .unwrap_err();
    assert!(matches!(err, ClientError::InvalidUrl(_)));
}

#[test]
fn trailing_slash_is_trimmed() {
    let backend = backend("http://localhost:8000/");
    assert_eq!(backend.base_url(), "http://localhost:8000");
}
