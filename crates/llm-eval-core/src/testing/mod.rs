//! Testing utilities for deterministic suite runs.

pub mod collecting_sink;
pub mod mock_engine;

pub use collecting_sink::CollectingSink;
pub use mock_engine::MockEngine;
