//! Chat transcript returned by a conversation engine.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The chat history of one session round.
///
/// Engines may attach arbitrary extra keys (session ids, usage figures,
/// timing); they are kept in `extra` and written back out unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatTranscript {
    /// Messages in the order they were spoken.
    #[serde(default)]
    pub messages: Vec<ChatMessage>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single utterance in a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the attendee who spoke.
    pub speaker: String,

    /// What was said.
    pub text: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatTranscript {
    /// Creates an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message and returns the transcript.
    pub fn with_message(mut self, speaker: impl Into<String>, text: impl Into<String>) -> Self {
        self.messages.push(ChatMessage::new(speaker, text));
        self
    }

    /// Converts the transcript to a plain JSON record.
    pub fn to_record(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl ChatMessage {
    pub fn new(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            text: text.into(),
            extra: Map::new(),
        }
    }
}
