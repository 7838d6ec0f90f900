use crate::error::BackendError;
use async_trait::async_trait;
use attar_types::{BookingConfirmation, BookingRequest, FlightResult, SearchRequest};
use uuid::Uuid;

/// The external search/booking service the engine drives.
///
/// Both calls are single attempts. `create_booking` receives the idempotency
/// key of the booking attempt so that a retried confirmation is recognised by
/// the backend rather than booked twice.
#[async_trait]
pub trait FlightBackend: Send + Sync {
    async fn search_flights(
        &self,
        request: &SearchRequest,
    ) -> Result<Vec<FlightResult>, BackendError>;

    async fn create_booking(
        &self,
        request: &BookingRequest,
        idempotency_key: Uuid,
    ) -> Result<BookingConfirmation, BackendError>;
}
