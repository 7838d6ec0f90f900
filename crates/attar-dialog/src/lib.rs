//! Conversation engine for the Attar flight booking assistant.
//!
//! An utterance goes through [`extract`] to pull out cities, dates and booking
//! answers, is merged into a [`ConversationContext`], and the [`Conversation`]
//! engine decides whether to ask the next question, search for flights, or
//! create a booking through a [`FlightBackend`].

pub mod backend;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod extract;
pub mod lexicon;
pub mod present;
pub mod prompts;

pub use backend::FlightBackend;
pub use config::DialogConfig;
pub use context::{BookingStep, ConversationContext, InfoField, Mode, Stage, Step};
pub use engine::{Conversation, Turn};
pub use error::BackendError;
pub use lexicon::CityMatch;
pub use present::{ChatMessage, FlightCard, Reply, Role, Transcript};
