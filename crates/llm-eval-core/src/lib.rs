//! # llm-eval-core
//!
//! Experiment-suite expansion and session orchestration for LLM Eval.
//!
//! This crate provides:
//! - Loading instruction files from directories in a stable order
//! - Compiling instruction texts into a party configuration template
//! - Expanding instruction directories into every combination of files
//! - Running sessions round by round and persisting their artifacts
//! - The suite controller tying these together

mod artifacts;
mod compiler;
mod config;
mod controller;
mod error;
mod instructions;
mod product;
mod session_runner;
mod suite;
pub mod testing;

pub use artifacts::{ArtifactStore, Clock, RoundArtifacts, STAMP_FORMAT, SystemClock, format_stamp};
pub use compiler::compile_party_config;
pub use config::{
    DEFAULT_NUM_ROUNDS, EXP_CONF_KEY, ExperimentConfig, ExperimentSuite, INIT_INSTR_DIRS_KEY,
    PARTY_CONF_KEY, REQUIRED_SUITE_KEYS, load_suites,
};
pub use controller::{
    CombinationReport, NoSuiteProgress, SuiteController, SuiteProgress, SuiteReport, plan_suite,
};
pub use error::{EvalError, Result};
pub use instructions::{InstructionFile, InstructionSet, load_instructions, read_instruction};
pub use product::cartesian_product;
pub use session_runner::{RoundReport, SessionRunner};
pub use suite::{Combination, make_init_instr_lists};
