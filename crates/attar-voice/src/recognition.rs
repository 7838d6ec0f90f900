//! Speech recognition results and error handling.

use crate::error::VoiceError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Delay before recognition is restarted after a recoverable error.
pub const RESTART_DELAY: Duration = Duration::from_millis(1000);

/// Error codes after which voice input cannot work for the rest of the call.
pub const FATAL_ERRORS: &[&str] = &["not-allowed", "service-not-allowed", "audio-capture"];

/// One result from the speech recognizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub text: String,
    #[serde(default = "default_is_final")]
    pub is_final: bool,
}

fn default_is_final() -> bool {
    true
}

impl RecognitionResult {
    /// The text to process, if this is a final, non-blank result. Interim
    /// results only drive UI feedback.
    pub fn utterance(&self) -> Option<&str> {
        let text = self.text.trim();
        (self.is_final && !text.is_empty()).then_some(text)
    }
}

/// What to do after the recognizer reported an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RecognitionOutcome {
    /// Start listening again after `after_ms`.
    Restart { after_ms: u64 },
    /// Voice input is unavailable; show `message` and stop listening.
    Fatal { message: String },
}

impl RecognitionOutcome {
    /// The voice error this outcome stands for, if voice input is lost.
    pub fn error(&self) -> Option<VoiceError> {
        match self {
            Self::Fatal { message } => Some(VoiceError::MicrophoneUnavailable(message.clone())),
            Self::Restart { .. } => None,
        }
    }
}

/// Classifies a recognizer error code.
pub fn classify(error: &str) -> RecognitionOutcome {
    let code = error.trim().to_lowercase();
    if FATAL_ERRORS.contains(&code.as_str()) {
        RecognitionOutcome::Fatal {
            message: fatal_message(&code).to_string(),
        }
    } else {
        RecognitionOutcome::Restart {
            after_ms: RESTART_DELAY.as_millis() as u64,
        }
    }
}

fn fatal_message(code: &str) -> &'static str {
    match code {
        "audio-capture" => {
            "No microphone was found. Please check your audio device, or type your message instead."
        }
        _ => "Microphone access was denied. Please allow microphone access, or type your message instead.",
    }
}
