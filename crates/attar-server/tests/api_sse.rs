mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use common::{create_session, say, send, test_app};
use futures_util::StreamExt;
use std::time::Duration;
use tower::ServiceExt;

/// Reads SSE frames until one contains `needle`, returning everything read.
async fn read_until(stream: &mut axum::body::BodyDataStream, needle: &str) -> String {
    let mut buffer = String::new();
    let deadline = tokio::time::sleep(Duration::from_secs(5));
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            chunk = stream.next() => {
                let chunk = chunk.expect("stream ended").expect("body error");
                buffer.push_str(&String::from_utf8_lossy(&chunk));
                if buffer.contains(needle) {
                    return buffer;
                }
            }
            () = &mut deadline => panic!("timed out waiting for {needle:?}, got {buffer:?}"),
        }
    }
}

#[tokio::test]
async fn speech_stream_carries_turn_speech() {
    let (app, _, _) = test_app();
    let id = create_session(&app).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri(format!("/api/sessions/{id}/speech"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/event-stream")));
    let mut stream = response.into_body().into_data_stream();

    let (_, body) = say(&app, &id, "Bangalore to Riyadh").await;
    let generation = body["speech_generation"].as_u64().unwrap();

    // The greeting is still playing, so it is cancelled first.
    let frames = read_until(&mut stream, "event: speak").await;
    assert!(frames.contains("event: cancel"));
    assert!(frames.contains(&format!("\"generation\":{}", generation - 1)));

    let frames = if frames.contains("When are you planning") {
        frames
    } else {
        read_until(&mut stream, "When are you planning").await
    };
    assert!(frames.contains(&format!("\"generation\":{generation}")));

    send(
        &app,
        Method::POST,
        &format!("/api/sessions/{id}/speech/{generation}/done"),
        None,
    )
    .await;
    read_until(&mut stream, "event: listen").await;
}

#[tokio::test]
async fn speech_stream_for_unknown_session_is_not_found() {
    let (app, _, _) = test_app();

    let (status, body) = send(&app, Method::GET, "/api/sessions/missing/speech", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("missing"));
}
