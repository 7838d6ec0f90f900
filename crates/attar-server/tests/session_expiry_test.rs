//! Tests for idle session expiry.
//!
//! These tests verify:
//! - Sessions unused past the idle timeout are removed and answer 404
//! - Any request on a session keeps it alive
//! - The background task sweeps on its own and is disabled by a zero timeout

mod common;

use attar_server::background::start_session_expiry_task;
use axum::http::{Method, StatusCode};
use common::{create_session, say, send, test_app};
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn idle_session_expires() {
    let (app, _, state) = test_app();
    let id = create_session(&app).await;

    tokio::time::advance(Duration::from_secs(31)).await;
    let expired = state.expire_idle_sessions(Duration::from_secs(30));

    assert_eq!(expired, 1);
    assert_eq!(state.session_count(), 0);
    let (status, body) = say(&app, &id, "hello there").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains(&id));
}

#[tokio::test(start_paused = true)]
async fn activity_keeps_session_alive() {
    let (app, _, state) = test_app();
    let active = create_session(&app).await;
    let abandoned = create_session(&app).await;

    tokio::time::advance(Duration::from_secs(20)).await;
    say(&app, &active, "hello there").await;
    tokio::time::advance(Duration::from_secs(20)).await;

    assert_eq!(state.expire_idle_sessions(Duration::from_secs(30)), 1);

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/sessions/{active}/messages"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/sessions/{abandoned}/messages"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test(start_paused = true)]
async fn expiry_task_removes_abandoned_sessions() {
    let (app, _, state) = test_app();
    let id = create_session(&app).await;

    tokio::spawn(start_session_expiry_task(state.clone(), 2));
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(state.session_count(), 0);
    let (status, _) = send(&app, Method::GET, &format!("/api/sessions/{id}/messages"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test(start_paused = true)]
async fn zero_timeout_disables_expiry_task() {
    let (app, _, state) = test_app();
    create_session(&app).await;

    // Returns immediately instead of looping.
    start_session_expiry_task(state.clone(), 0).await;
    tokio::time::advance(Duration::from_secs(3600)).await;

    assert_eq!(state.session_count(), 1);
}
