//! Voice boundary for the Attar assistant.
//!
//! Speech recognition and synthesis run in the browser; this crate holds the
//! server-side rules around them: which recognition results are processed,
//! how recognizer errors are handled, what may be read aloud, the
//! per-session speech output queue, and LiveKit join tokens for the
//! real-time voice transport.

pub mod config;
pub mod error;
pub mod output;
pub mod recognition;
pub mod service;
pub mod speech;

pub use config::LiveKitConfig;
pub use error::VoiceError;
pub use output::{SpeechEvent, SpeechOutput};
pub use recognition::{classify, RecognitionOutcome, RecognitionResult};
pub use service::VoiceService;
pub use speech::{speakable, SCREEN_POINTER};
