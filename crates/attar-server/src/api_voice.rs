//! LiveKit token handler.

use crate::api::ApiError;
use crate::AppState;
use attar_voice::VoiceError;
use axum::extract::{Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub room_name: Option<String>,
    #[serde(default)]
    pub participant_identity: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub success: bool,
    pub token: String,
    pub livekit_url: String,
    pub room_name: String,
    pub participant_identity: String,
}

/// Handler for `POST /api/livekit/token`.
///
/// Room and identity default to timestamped names when omitted.
pub async fn livekit_token_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    if !state.voice_service.is_enabled() {
        return Err(ApiError::ServiceUnavailable(
            "voice calls are not configured".to_string(),
        ));
    }

    let now = chrono::Utc::now().timestamp_millis();
    let room_name = payload
        .room_name
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| format!("travel-room-{now}"));
    let participant_identity = payload
        .participant_identity
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| format!("user-{now}"));

    tracing::info!(room = %room_name, participant = %participant_identity, "issuing LiveKit token");

    let token = state
        .voice_service
        .generate_join_token(&room_name, &participant_identity)
        .map_err(|e| match e {
            VoiceError::Config(msg) => ApiError::BadRequest(msg),
            other => {
                tracing::error!(error = %other, "failed to sign LiveKit token");
                ApiError::InternalServerError("failed to generate token".to_string())
            }
        })?;

    Ok(Json(TokenResponse {
        success: true,
        token,
        livekit_url: state.voice_service.get_url().to_string(),
        room_name,
        participant_identity,
    }))
}
