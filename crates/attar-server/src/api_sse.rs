//! SSE speech stream handler.

use crate::api::ApiError;
use crate::AppState;
use attar_voice::SpeechEvent;
use axum::{
    extract::{Extension, Path},
    response::{sse::Event, Sse},
};
use futures_util::Stream;
use std::{convert::Infallible, sync::Arc};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

fn event_name(event: &SpeechEvent) -> &'static str {
    match event {
        SpeechEvent::Speak { .. } => "speak",
        SpeechEvent::Cancel { .. } => "cancel",
        SpeechEvent::Listen => "listen",
    }
}

/// Handler for `GET /api/sessions/{id}/speech`.
///
/// Streams the session's speech events: text to synthesize, cancellations of
/// superseded speech, and the signal to resume listening.
pub async fn speech_stream_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let session = state.session(&id)?;
    let rx = session.speech().subscribe();
    let stream = BroadcastStream::new(rx);

    let mapped_stream = stream.filter_map(move |result| match result {
        Ok(event) => match serde_json::to_string(&event) {
            Ok(data) => Some(Ok(Event::default().event(event_name(&event)).data(data))),
            Err(e) => {
                tracing::error!("failed to serialize speech event: {}", e);
                None
            }
        },
        Err(broadcast_error) => {
            tracing::warn!(
                session_id = %id,
                error = %broadcast_error,
                "speech SSE stream lagged; events were dropped for this subscriber"
            );
            None
        }
    });

    Ok(Sse::new(mapped_stream).keep_alive(axum::response::sse::KeepAlive::default()))
}
