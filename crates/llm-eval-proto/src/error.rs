//! Errors raised at the conversation-engine boundary.

use std::time::Duration;

/// Errors a conversation engine can report for one session.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The engine could not be started.
    #[error("Failed to start conversation engine '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// IO error while talking to the engine.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The resolved configuration could not be handed to the engine.
    #[error("Failed to encode party configuration: {0}")]
    Encode(#[from] serde_yaml::Error),

    /// The engine exited unsuccessfully.
    #[error(
        "Conversation engine exited with {}: {stderr_tail}",
        .exit_code.map_or_else(|| "a signal".to_string(), |c| format!("code {c}"))
    )]
    Exited {
        exit_code: Option<i32>,
        stderr_tail: String,
    },

    /// The engine did not finish within the configured timeout.
    #[error("Conversation engine timed out after {}s", .0.as_secs())]
    TimedOut(Duration),

    /// The engine's output was not a transcript.
    #[error("Conversation engine produced a malformed transcript: {0}")]
    MalformedOutput(#[from] serde_json::Error),

    /// Any other engine-specific failure.
    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exited_display() {
        let err = EngineError::Exited {
            exit_code: Some(2),
            stderr_tail: "model unavailable".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Conversation engine exited with code 2: model unavailable"
        );

        let err = EngineError::Exited {
            exit_code: None,
            stderr_tail: String::new(),
        };
        assert!(err.to_string().contains("a signal"));
    }

    #[test]
    fn test_timeout_display() {
        let err = EngineError::TimedOut(Duration::from_secs(30));
        assert_eq!(err.to_string(), "Conversation engine timed out after 30s");
    }
}
