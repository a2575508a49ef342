//! # llm-eval-adapters
//!
//! Conversation engine adapters for the LLM Eval harness.
//!
//! The harness itself never talks to a model. Sessions are delegated to an
//! engine; this crate provides `CommandEngine`, which runs an external
//! engine program per session, streams its progress output, and enforces
//! an optional timeout.

mod command_engine;

pub use command_engine::{CommandEngine, EngineCommand};
