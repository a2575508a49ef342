//! The conversation engine seam.

use crate::error::EngineError;
use crate::party::PartyConfig;
use crate::sink::LineSink;
use crate::transcript::ChatTranscript;
use async_trait::async_trait;

/// Result of one engine session.
#[derive(Debug, Clone, Default)]
pub struct SessionOutcome {
    /// The chat history produced by the session.
    pub transcript: ChatTranscript,

    /// Secondary engine output. Not interpreted by the harness.
    pub auxiliary: serde_json::Value,
}

impl SessionOutcome {
    pub fn new(transcript: ChatTranscript) -> Self {
        Self {
            transcript,
            auxiliary: serde_json::Value::Null,
        }
    }
}

/// Runs one multi-party chat session from a resolved configuration.
///
/// Implementations block the caller until the session finishes. Running
/// output is streamed line by line to `sink`; quiet callers pass a
/// [`QuietSink`](crate::QuietSink).
#[async_trait]
pub trait ConversationEngine: Send + Sync {
    async fn start_session(
        &self,
        party: &PartyConfig,
        sink: &mut dyn LineSink,
    ) -> Result<SessionOutcome, EngineError>;
}
