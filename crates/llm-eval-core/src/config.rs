//! Suite and experiment configuration documents.
//!
//! A suite file is a YAML list of experiment suites. Each suite names its
//! instruction directories, a party template and an experiment config using
//! three literal keys. Suites are kept as raw YAML until they are run so a
//! missing key can be reported by name before any work begins.

use crate::error::{EvalError, Result};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Key naming the list of instruction directories.
pub const INIT_INSTR_DIRS_KEY: &str = "init instr dirs";
/// Key naming the party template path.
pub const PARTY_CONF_KEY: &str = "party conf";
/// Key naming the experiment config path.
pub const EXP_CONF_KEY: &str = "exp conf";

/// Keys every experiment suite must declare.
pub const REQUIRED_SUITE_KEYS: [&str; 3] = [INIT_INSTR_DIRS_KEY, PARTY_CONF_KEY, EXP_CONF_KEY];

/// Rounds run per combination when `num_rounds` is absent.
pub const DEFAULT_NUM_ROUNDS: u32 = 3;

/// A validated experiment suite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentSuite {
    /// One directory per attendee slot, in slot order.
    #[serde(rename = "init instr dirs")]
    pub init_instr_dirs: Vec<PathBuf>,

    /// Path to the party configuration template.
    #[serde(rename = "party conf")]
    pub party_conf: PathBuf,

    /// Path to the experiment configuration.
    #[serde(rename = "exp conf")]
    pub exp_conf: PathBuf,
}

impl ExperimentSuite {
    /// Validates a raw suite document.
    ///
    /// Missing keys are reported together, before any field is typed.
    pub fn from_value(value: &Value) -> Result<Self> {
        let missing: Vec<String> = match value.as_mapping() {
            Some(map) => REQUIRED_SUITE_KEYS
                .iter()
                .filter(|key| !map.contains_key(**key))
                .map(|key| (*key).to_string())
                .collect(),
            None => REQUIRED_SUITE_KEYS.iter().map(|k| (*k).to_string()).collect(),
        };
        if !missing.is_empty() {
            return Err(EvalError::InvalidSuiteConfig {
                missing,
                required: REQUIRED_SUITE_KEYS.iter().map(|k| (*k).to_string()).collect(),
            });
        }

        let suite: Self = serde_yaml::from_value(value.clone())
            .map_err(|e| EvalError::MalformedSuiteConfig(e.to_string()))?;
        if suite.init_instr_dirs.is_empty() {
            return Err(EvalError::MalformedSuiteConfig(format!(
                "'{INIT_INSTR_DIRS_KEY}' must list at least one directory"
            )));
        }
        Ok(suite)
    }
}

/// Loads a suite file.
///
/// The file holds a list of suites; a single suite mapping at the top level
/// is accepted as a one-element list.
pub fn load_suites(path: impl AsRef<Path>) -> Result<Vec<Value>> {
    let path = path.as_ref();
    debug!(path = %path.display(), "Loading experiment suites");
    let content = fs::read_to_string(path).map_err(|source| EvalError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let doc: Value = serde_yaml::from_str(&content).map_err(|source| EvalError::SuiteFileParse {
        path: path.to_path_buf(),
        source,
    })?;

    match doc {
        Value::Sequence(suites) => Ok(suites),
        Value::Mapping(_) => Ok(vec![doc]),
        Value::Null => Ok(Vec::new()),
        other => Err(EvalError::MalformedSuiteConfig(format!(
            "{} must contain a list of experiment suites, found {}",
            path.display(),
            yaml_kind(&other)
        ))),
    }
}

fn yaml_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Session-level parameters of an experiment.
///
/// Keys other than `num_rounds` belong to the conversation engine and are
/// carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Rounds to run per combination.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_rounds: Option<u32>,

    #[serde(flatten)]
    pub extra: Mapping,
}

impl ExperimentConfig {
    /// Loads an experiment config from a YAML file.
    ///
    /// An empty file is the same as `{}`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading experiment configuration");
        let content = fs::read_to_string(path).map_err(|source| EvalError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(&content).map_err(|source| EvalError::ExperimentConfigParse {
                path: path.to_path_buf(),
                source,
            })?
        };
        config.validate(path)?;
        Ok(config)
    }

    /// Creates a config with an explicit round count.
    pub fn with_rounds(num_rounds: u32) -> Self {
        Self {
            num_rounds: Some(num_rounds),
            extra: Mapping::new(),
        }
    }

    /// Rejects a round count of zero.
    pub fn validate(&self, path: &Path) -> Result<()> {
        if self.num_rounds == Some(0) {
            return Err(EvalError::InvalidExperimentConfig {
                path: path.to_path_buf(),
                message: "num_rounds must be a positive integer".to_string(),
            });
        }
        Ok(())
    }

    /// The effective number of rounds.
    pub fn num_rounds(&self) -> u32 {
        self.num_rounds.unwrap_or(DEFAULT_NUM_ROUNDS)
    }
}
