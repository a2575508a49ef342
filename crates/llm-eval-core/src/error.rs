//! Error type for suite expansion and session orchestration.

use llm_eval_proto::EngineError;
use std::path::PathBuf;

/// Errors raised while expanding or running an experiment suite.
///
/// Nothing here is retried. Configuration and enumeration errors stop the
/// whole suite; compilation and engine errors stop the current combination,
/// which in turn stops the suite.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error(
        "Experiment suite configuration is missing required keys: {} (required: {})",
        .missing.join(", "),
        .required.join(", ")
    )]
    InvalidSuiteConfig {
        missing: Vec<String>,
        required: Vec<String>,
    },

    #[error("Malformed experiment suite configuration: {0}")]
    MalformedSuiteConfig(String),

    #[error("Failed to parse suite file {}: {source}", .path.display())]
    SuiteFileParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Instruction directory not found: {}", .path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error("Instruction directory contains no instruction files: {}", .path.display())]
    EmptyDirectory { path: PathBuf },

    #[error("Failed to read {}: {source}", .path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse party configuration {}: {source}", .path.display())]
    TemplateParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error(
        "Party configuration {} declares {attendees} attendee(s) but {instructions} instruction(s) were given",
        .path.display()
    )]
    AttendeeCountMismatch {
        path: PathBuf,
        attendees: usize,
        instructions: usize,
    },

    #[error("Failed to parse experiment configuration {}: {source}", .path.display())]
    ExperimentConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid experiment configuration {}: {message}", .path.display())]
    InvalidExperimentConfig { path: PathBuf, message: String },

    #[error("Round {round} failed: {source}")]
    Engine {
        round: u32,
        #[source]
        source: EngineError,
    },

    #[error("Failed to serialize {}: {message}", .path.display())]
    Serialize { path: PathBuf, message: String },

    #[error("Failed to write artifact {}: {source}", .path.display())]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, EvalError>;
