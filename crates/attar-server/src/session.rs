//! Per-call session state.

use attar_dialog::{
    prompts, ChatMessage, Conversation, FlightCard, Mode, Reply, Role, Step, Transcript,
};
use attar_voice::{classify, speakable, RecognitionOutcome, SpeechOutput};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{info, warn};

/// Returned when an utterance arrives while the previous one is still being
/// processed.
#[derive(Debug, Error)]
#[error("session {0} is still processing the previous utterance")]
pub struct SessionBusy(pub String);

/// Everything the client needs to render one processed utterance.
#[derive(Debug, Clone, Serialize)]
pub struct TurnView {
    pub replies: Vec<Reply>,
    pub flights: Vec<FlightCard>,
    pub booking_reference: Option<String>,
    pub mode: Mode,
    pub step: Step,
    /// Generation of the speech queued for this turn, if any was.
    pub speech_generation: Option<u64>,
}

/// One active call: its conversation, chat history and speech output.
///
/// The conversation sits behind an async mutex that doubles as the
/// single-flight guard: [`Session::handle_utterance`] uses `try_lock`, so a
/// second utterance arriving mid-turn is refused instead of queued.
pub struct Session {
    pub id: String,
    pub created_at: DateTime<Utc>,
    conversation: tokio::sync::Mutex<Conversation>,
    /// Uses `std::sync::Mutex`: pushes and reads never span an `.await`.
    transcript: Mutex<Transcript>,
    speech: SpeechOutput,
    voice_enabled: AtomicBool,
    last_active: Mutex<Instant>,
}

impl Session {
    pub fn new(id: impl Into<String>, conversation: Conversation) -> Self {
        Self {
            id: id.into(),
            created_at: Utc::now(),
            conversation: tokio::sync::Mutex::new(conversation),
            transcript: Mutex::new(Transcript::new()),
            speech: SpeechOutput::new(),
            voice_enabled: AtomicBool::new(true),
            last_active: Mutex::new(Instant::now()),
        }
    }

    /// Opens the call with a system notice and the spoken greeting.
    pub fn greet(&self) -> Reply {
        self.push(Role::System, "Call started. I'm listening! Ask me about flights.");
        let greeting = Reply::text(prompts::GREETING);
        self.push(Role::Assistant, greeting.display.clone());
        self.say(&greeting.spoken);
        greeting
    }

    /// Processes one final utterance to completion.
    pub async fn handle_utterance(&self, text: &str) -> Result<TurnView, SessionBusy> {
        let mut conversation = self
            .conversation
            .try_lock()
            .map_err(|_| SessionBusy(self.id.clone()))?;

        self.push(Role::User, text);
        let turn = conversation.handle(text).await;

        for reply in &turn.replies {
            self.push(Role::Assistant, reply.display.clone());
        }
        if let Some(booking) = &turn.booking {
            info!(session_id = %self.id, reference = %booking.reference, "booking completed");
        }

        // One synthesis per turn, so the replies of a turn do not cancel
        // each other.
        let spoken = turn
            .replies
            .iter()
            .map(|r| speakable(&r.spoken))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        let speech_generation = self.say(&spoken);

        let context = conversation.context();
        Ok(TurnView {
            flights: turn.flights.iter().map(FlightCard::from).collect(),
            booking_reference: turn.booking.map(|b| b.reference),
            replies: turn.replies,
            mode: context.mode(),
            step: context.step(),
            speech_generation,
        })
    }

    /// Queues `text` for synthesis unless voice is off for this session.
    fn say(&self, text: &str) -> Option<u64> {
        if text.is_empty() || !self.voice_enabled() {
            return None;
        }
        Some(self.speech.speak(text))
    }

    fn push(&self, role: Role, text: impl Into<String>) {
        self.transcript
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(role, text);
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.transcript
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .messages()
            .to_vec()
    }

    pub fn speech(&self) -> &SpeechOutput {
        &self.speech
    }

    /// Records that playback of `generation` finished. Returns whether
    /// listening resumed.
    pub fn speech_finished(&self, generation: u64) -> bool {
        self.speech.finished(generation)
    }

    /// Handles a recognizer error. Fatal errors turn voice off for the rest
    /// of the call and leave a notice in the chat.
    pub fn recognition_error(&self, error: &str) -> RecognitionOutcome {
        let outcome = classify(error);
        if let Some(voice_error) = outcome.error() {
            warn!(session_id = %self.id, code = error, error = %voice_error, "voice input lost");
            self.voice_enabled.store(false, Ordering::SeqCst);
            self.speech.cancel();
            if let RecognitionOutcome::Fatal { message } = &outcome {
                self.push(Role::System, message.clone());
            }
        }
        outcome
    }

    pub fn voice_enabled(&self) -> bool {
        self.voice_enabled.load(Ordering::SeqCst)
    }

    /// Marks the session as used now.
    pub fn touch(&self) {
        *self.last_active.lock().unwrap_or_else(|e| e.into_inner()) = Instant::now();
    }

    /// Time since the session was last used.
    pub fn idle_for(&self) -> Duration {
        self.last_active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .elapsed()
    }

    /// Stops any speech still playing. Called when the call ends.
    pub fn close(&self) {
        self.speech.cancel();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .field("voice_enabled", &self.voice_enabled())
            .finish_non_exhaustive()
    }
}
