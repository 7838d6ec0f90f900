//! Background tasks for the Attar server.
//!
//! Includes:
//! - Expiring sessions whose caller went away without ending the call.

use crate::AppState;
use tokio::time::{sleep, Duration};

/// Starts the idle session expiry task.
///
/// Runs indefinitely, removing sessions that have not been used for
/// `idle_timeout_seconds`. A timeout of zero disables expiry.
pub async fn start_session_expiry_task(state: AppState, idle_timeout_seconds: u64) {
    if idle_timeout_seconds == 0 {
        tracing::warn!("session expiry disabled (idle timeout=0)");
        return;
    }

    let max_idle = Duration::from_secs(idle_timeout_seconds);
    let interval_seconds = (idle_timeout_seconds / 2).clamp(1, 60);
    let interval = Duration::from_secs(interval_seconds);

    tracing::info!(
        idle_timeout_seconds,
        interval_seconds,
        "starting session expiry task"
    );

    loop {
        sleep(interval).await;

        let expired = state.expire_idle_sessions(max_idle);
        if expired > 0 {
            tracing::info!(
                expired,
                active = state.session_count(),
                "expired idle sessions"
            );
        }
    }
}
