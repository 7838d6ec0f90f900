//! Call session handlers: start, utterances, transcript, speech control, end.

use crate::api::ApiError;
use crate::session::{Session, TurnView};
use crate::AppState;
use attar_dialog::{ChatMessage, Conversation, Reply};
use attar_voice::{RecognitionOutcome, RecognitionResult};
use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Response body for `POST /api/sessions`.
#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub greeting: Reply,
    pub voice_enabled: bool,
}

/// Response body for `POST /api/sessions/{id}/utterances`.
#[derive(Debug, Serialize)]
pub struct UtteranceResponse {
    /// `false` for interim or blank results, which are acknowledged only.
    pub processed: bool,
    #[serde(flatten)]
    pub turn: Option<TurnView>,
}

#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct SpeechDoneResponse {
    /// Whether recognition may resume; `false` for a stale generation.
    pub resumed: bool,
    pub listening: bool,
}

#[derive(Debug, Deserialize)]
pub struct RecognitionErrorRequest {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct RecognitionErrorResponse {
    #[serde(flatten)]
    pub outcome: RecognitionOutcome,
    pub voice_enabled: bool,
}

/// Handler for `POST /api/sessions`. Starts a call with an empty context.
pub async fn create_session_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<(StatusCode, Json<CreateSessionResponse>), ApiError> {
    let id = Uuid::new_v4().to_string();
    let conversation = Conversation::new(state.backend.clone(), state.dialog_config.clone());
    let session = Arc::new(Session::new(id.clone(), conversation));
    let greeting = session.greet();

    let active = {
        let mut sessions = state
            .sessions
            .write()
            .map_err(|_| ApiError::InternalServerError("session registry poisoned".into()))?;
        sessions.insert(id.clone(), session.clone());
        sessions.len()
    };
    tracing::info!(session_id = %id, active, "session started");

    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id: id,
            greeting,
            voice_enabled: session.voice_enabled(),
        }),
    ))
}

/// Handler for `DELETE /api/sessions/{id}`. Ends the call and discards its
/// context.
pub async fn delete_session_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let removed = state
        .sessions
        .write()
        .map_err(|_| ApiError::InternalServerError("session registry poisoned".into()))?
        .remove(&id);

    match removed {
        Some(session) => {
            session.close();
            tracing::info!(session_id = %id, "session ended");
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(ApiError::NotFound(format!("session {id}"))),
    }
}

/// Handler for `POST /api/sessions/{id}/utterances`.
///
/// Returns 409 if the previous utterance of this session is still being
/// processed.
pub async fn utterance_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<RecognitionResult>,
) -> Result<Json<UtteranceResponse>, ApiError> {
    let session = state.session(&id)?;

    let Some(text) = payload.utterance() else {
        return Ok(Json(UtteranceResponse {
            processed: false,
            turn: None,
        }));
    };

    tracing::debug!(session_id = %id, utterance = text, "utterance received");
    let turn = session.handle_utterance(text).await.map_err(|e| {
        tracing::warn!(session_id = %id, "utterance dropped, previous one still in flight");
        ApiError::from(e)
    })?;

    tracing::info!(
        session_id = %id,
        mode = turn.mode.as_str(),
        replies = turn.replies.len(),
        flights = turn.flights.len(),
        "utterance processed"
    );

    Ok(Json(UtteranceResponse {
        processed: true,
        turn: Some(turn),
    }))
}

/// Handler for `GET /api/sessions/{id}/messages`.
pub async fn messages_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessagesResponse>, ApiError> {
    let session = state.session(&id)?;
    Ok(Json(MessagesResponse {
        messages: session.messages(),
    }))
}

/// Handler for `POST /api/sessions/{id}/speech/{generation}/done`.
pub async fn speech_done_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((id, generation)): Path<(String, u64)>,
) -> Result<Json<SpeechDoneResponse>, ApiError> {
    let session = state.session(&id)?;
    let resumed = session.speech_finished(generation);
    Ok(Json(SpeechDoneResponse {
        resumed,
        listening: session.speech().is_listening(),
    }))
}

/// Handler for `POST /api/sessions/{id}/recognition-errors`.
pub async fn recognition_error_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<RecognitionErrorRequest>,
) -> Result<Json<RecognitionErrorResponse>, ApiError> {
    let session = state.session(&id)?;
    let outcome = session.recognition_error(&payload.error);
    if let RecognitionOutcome::Restart { after_ms } = outcome {
        tracing::debug!(session_id = %id, code = %payload.error, after_ms, "restarting recognition");
    }
    Ok(Json(RecognitionErrorResponse {
        outcome,
        voice_enabled: session.voice_enabled(),
    }))
}
