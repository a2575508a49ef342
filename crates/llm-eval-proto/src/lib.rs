//! # llm-eval-proto
//!
//! Shared types, error definitions, and traits for the LLM Eval harness.
//!
//! This crate provides the foundational abstractions used across all LLM Eval
//! crates, including:
//! - The typed party configuration handed to the conversation engine
//! - The chat transcript returned by the engine
//! - The `ConversationEngine` seam and its error type
//! - Line sinks for streaming the engine's running output

mod engine;
mod error;
mod party;
mod sink;
mod transcript;

pub use engine::{ConversationEngine, SessionOutcome};
pub use error::EngineError;
pub use party::{Attendee, Instruction, PartyConfig};
pub use sink::{ConsoleSink, LineSink, QuietSink};
pub use transcript::{ChatMessage, ChatTranscript};
