use crate::config::BackendConfig;
use crate::error::ClientError;
use async_trait::async_trait;
use attar_dialog::{BackendError, FlightBackend};
use attar_types::{
    BookingConfirmation, BookingRequest, BookingResponse, FlightResult, SearchRequest,
    SearchResponse,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Header carrying the per-attempt booking key.
pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// [`FlightBackend`] speaking JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpFlightBackend {
    client: reqwest::Client,
    base_url: String,
    search_path: String,
    fallback_search_path: String,
    booking_path: String,
}

impl HttpFlightBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, ClientError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidUrl(config.base_url.clone()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("attar/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            search_path: config.search_path.clone(),
            fallback_search_path: config.fallback_search_path.clone(),
            booking_path: config.booking_path.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn search_at(
        &self,
        path: &str,
        request: &SearchRequest,
    ) -> Result<Vec<FlightResult>, BackendError> {
        let response: SearchResponse = self.post_json(path, request, None).await?;
        if !response.success {
            return Err(BackendError::Rejected(
                response
                    .message
                    .unwrap_or_else(|| "search unsuccessful".to_string()),
            ));
        }
        Ok(response.flights)
    }

    async fn post_json<B, R>(
        &self,
        path: &str,
        body: &B,
        idempotency_key: Option<Uuid>,
    ) -> Result<R, BackendError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.url(path);
        let mut builder = self.client.post(&url).json(body);
        if let Some(key) = idempotency_key {
            builder = builder.header(IDEMPOTENCY_HEADER, key.to_string());
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        resp.json::<R>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }
}

#[async_trait]
impl FlightBackend for HttpFlightBackend {
    async fn search_flights(
        &self,
        request: &SearchRequest,
    ) -> Result<Vec<FlightResult>, BackendError> {
        let primary = self.search_at(&self.search_path, request).await;
        if self.fallback_search_path.is_empty() {
            return primary;
        }

        match primary {
            Ok(flights) if !flights.is_empty() => {
                debug!(path = %self.search_path, count = flights.len(), "primary search succeeded");
                Ok(flights)
            }
            Ok(_) => {
                info!(path = %self.fallback_search_path, "primary search empty, trying fallback");
                self.search_at(&self.fallback_search_path, request).await
            }
            Err(e) => {
                warn!(error = %e, path = %self.fallback_search_path, "primary search failed, trying fallback");
                self.search_at(&self.fallback_search_path, request).await
            }
        }
    }

    async fn create_booking(
        &self,
        request: &BookingRequest,
        idempotency_key: Uuid,
    ) -> Result<BookingConfirmation, BackendError> {
        let response: BookingResponse = self
            .post_json(&self.booking_path, request, Some(idempotency_key))
            .await?;

        match (response.success, response.confirmation_reference) {
            (true, Some(reference)) if !reference.is_empty() => {
                Ok(BookingConfirmation { reference })
            }
            (true, _) => Err(BackendError::Decode(
                "booking accepted without a reference".to_string(),
            )),
            (false, _) => Err(BackendError::Rejected(
                response
                    .message
                    .unwrap_or_else(|| "booking unsuccessful".to_string()),
            )),
        }
    }
}
