//! Mock conversation engine for deterministic testing.
//!
//! `MockEngine` records every party configuration it is handed and answers
//! with a short scripted transcript built from the attendees' instructions.
//! It can be told to fail on a given call to exercise abort paths.

use async_trait::async_trait;
use llm_eval_proto::{
    ChatTranscript, ConversationEngine, EngineError, LineSink, PartyConfig, SessionOutcome,
};
use std::sync::{Arc, Mutex};

/// A scripted in-process conversation engine.
///
/// Clones share their call history, so a clone can be handed to the code
/// under test while the original is inspected afterwards.
#[derive(Debug, Clone, Default)]
pub struct MockEngine {
    sessions: Arc<Mutex<Vec<PartyConfig>>>,
    fail_on_call: Option<usize>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the `n`-th call (1-based) fail.
    pub fn fail_on_call(mut self, n: usize) -> Self {
        self.fail_on_call = Some(n);
        self
    }

    /// Returns how many sessions were started.
    pub fn call_count(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }

    /// Returns the configurations of all started sessions, in call order.
    pub fn sessions(&self) -> Vec<PartyConfig> {
        self.sessions.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Returns each session's instruction texts, in call order.
    pub fn instruction_texts(&self) -> Vec<Vec<String>> {
        self.sessions()
            .iter()
            .map(|party| {
                party
                    .attendees
                    .iter()
                    .map(|a| a.instruction.text.clone())
                    .collect()
            })
            .collect()
    }
}

#[async_trait]
impl ConversationEngine for MockEngine {
    async fn start_session(
        &self,
        party: &PartyConfig,
        sink: &mut dyn LineSink,
    ) -> Result<SessionOutcome, EngineError> {
        let call = {
            let mut sessions = self
                .sessions
                .lock()
                .map_err(|_| EngineError::Other("mock engine lock poisoned".to_string()))?;
            sessions.push(party.clone());
            sessions.len()
        };

        if self.fail_on_call == Some(call) {
            sink.emit_line(&format!("[mock] session {call} failing"));
            return Err(EngineError::Other(format!("scripted failure on call {call}")));
        }

        let mut transcript = ChatTranscript::new();
        for (role, attendee) in party.role_labels().into_iter().zip(&party.attendees) {
            sink.emit_line(&format!("[mock] {role}: {}", attendee.instruction.text));
            transcript = transcript.with_message(role, attendee.instruction.text.clone());
        }

        Ok(SessionOutcome {
            transcript,
            auxiliary: serde_json::json!({ "call": call }),
        })
    }
}
