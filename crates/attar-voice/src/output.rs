//! Speech output queue.
//!
//! Every reply is assigned a new generation. Queuing a reply cancels whatever
//! is still being synthesized so that the assistant never talks over itself,
//! and recognition is only resumed once the newest generation reports that it
//! finished playing.

use serde::Serialize;
use std::sync::Mutex;
use tokio::sync::broadcast;
use tracing::debug;

/// Default capacity for the per-session speech event channel.
const DEFAULT_SPEECH_BROADCAST_CAPACITY: usize = 64;

/// Event sent to the synthesizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpeechEvent {
    /// Synthesize `text`.
    Speak { generation: u64, text: String },
    /// Stop synthesizing `generation` if it is still playing or queued.
    Cancel { generation: u64 },
    /// Playback is over; start listening again.
    Listen,
}

#[derive(Debug, Default)]
struct OutputState {
    generation: u64,
    speaking: Option<u64>,
}

/// Per-session speech output with cancel-before-speak semantics.
#[derive(Debug)]
pub struct SpeechOutput {
    state: Mutex<OutputState>,
    tx: broadcast::Sender<SpeechEvent>,
}

impl Default for SpeechOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechOutput {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(DEFAULT_SPEECH_BROADCAST_CAPACITY);
        Self {
            state: Mutex::new(OutputState::default()),
            tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SpeechEvent> {
        self.tx.subscribe()
    }

    /// Queues `text` for synthesis and returns its generation. Any generation
    /// still playing is cancelled first.
    pub fn speak(&self, text: impl Into<String>) -> u64 {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = state.speaking.take() {
            let _ = self.tx.send(SpeechEvent::Cancel {
                generation: previous,
            });
        }
        state.generation += 1;
        let generation = state.generation;
        state.speaking = Some(generation);

        debug!(generation, "queueing speech");
        // No subscriber just means nobody is listening to this session's audio.
        let _ = self.tx.send(SpeechEvent::Speak {
            generation,
            text: text.into(),
        });
        generation
    }

    /// Records that `generation` finished playing. Returns `true` and resumes
    /// listening if it was the current generation; stale completions are
    /// ignored.
    pub fn finished(&self, generation: u64) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.speaking != Some(generation) {
            debug!(generation, current = ?state.speaking, "ignoring stale speech completion");
            return false;
        }
        state.speaking = None;
        let _ = self.tx.send(SpeechEvent::Listen);
        true
    }

    /// Cancels the current generation, if any.
    pub fn cancel(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(generation) = state.speaking.take() {
            let _ = self.tx.send(SpeechEvent::Cancel { generation });
        }
    }

    /// The generation currently playing.
    pub fn speaking(&self) -> Option<u64> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .speaking
    }

    /// `true` when nothing is being spoken, so recognition may run.
    pub fn is_listening(&self) -> bool {
        self.speaking().is_none()
    }
}
