//! Attar server library logic.

pub mod api;
pub mod api_sessions;
pub mod api_sse;
pub mod api_voice;
pub mod background;
pub mod config;
pub mod session;

use api::ApiError;
use attar_dialog::{DialogConfig, FlightBackend};
use attar_voice::VoiceService;
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde_json::{json, Value};
use session::Session;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Active sessions by id.
///
/// Uses `std::sync::RwLock` intentionally: all lock acquisitions are brief
/// HashMap operations (get/insert/remove) that never span `.await` points.
pub type SessionRegistry = Arc<RwLock<HashMap<String, Arc<Session>>>>;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Active call sessions.
    pub sessions: SessionRegistry,
    /// Flight search/booking backend shared by all sessions.
    pub backend: Arc<dyn FlightBackend>,
    /// Settings every new conversation starts with.
    pub dialog_config: DialogConfig,
    /// LiveKit token issuer.
    pub voice_service: Arc<VoiceService>,
    /// Browser origins allowed by CORS. Empty allows any.
    pub cors_origins: Vec<String>,
}

impl AppState {
    pub fn new(
        backend: Arc<dyn FlightBackend>,
        dialog_config: DialogConfig,
        voice_service: Arc<VoiceService>,
    ) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            backend,
            dialog_config,
            voice_service,
            cors_origins: Vec::new(),
        }
    }

    /// Looks up an active session and marks it as used.
    pub fn session(&self, id: &str) -> Result<Arc<Session>, ApiError> {
        let session = self
            .sessions
            .read()
            .map_err(|_| ApiError::InternalServerError("session registry poisoned".into()))?
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("session {id}")))?;
        session.touch();
        Ok(session)
    }

    /// Ends every session unused for at least `max_idle`. Returns how many
    /// were removed.
    pub fn expire_idle_sessions(&self, max_idle: Duration) -> usize {
        let expired: Vec<Arc<Session>> = {
            let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
            let ids: Vec<String> = sessions
                .iter()
                .filter(|(_, session)| session.idle_for() >= max_idle)
                .map(|(id, _)| id.clone())
                .collect();
            ids.iter().filter_map(|id| sessions.remove(id)).collect()
        };

        for session in &expired {
            session.close();
            tracing::info!(session_id = %session.id, "session expired after inactivity");
        }
        expired.len()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }
}

/// Maximum request body size (64 KiB). Utterances and token requests are small.
const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(allowed))
    }
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.cors_origins);

    Router::new()
        .route("/health", get(health))
        .route("/api/sessions", post(api_sessions::create_session_handler))
        .route(
            "/api/sessions/{id}",
            delete(api_sessions::delete_session_handler),
        )
        .route(
            "/api/sessions/{id}/utterances",
            post(api_sessions::utterance_handler),
        )
        .route(
            "/api/sessions/{id}/messages",
            get(api_sessions::messages_handler),
        )
        .route(
            "/api/sessions/{id}/speech",
            get(api_sse::speech_stream_handler),
        )
        .route(
            "/api/sessions/{id}/speech/{generation}/done",
            post(api_sessions::speech_done_handler),
        )
        .route(
            "/api/sessions/{id}/recognition-errors",
            post(api_sessions::recognition_error_handler),
        )
        .route(
            "/api/livekit/token",
            post(api_voice::livekit_token_handler),
        )
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(Extension(Arc::new(state)))
}
