//! Suite controller: validates a suite and runs every combination in order.

use crate::artifacts::ArtifactStore;
use crate::compiler::compile_party_config;
use crate::config::{ExperimentConfig, ExperimentSuite};
use crate::error::{EvalError, Result};
use crate::instructions::load_instructions;
use crate::session_runner::{RoundReport, SessionRunner};
use crate::suite::{Combination, make_init_instr_lists};
use llm_eval_proto::{ConversationEngine, LineSink};
use serde_yaml::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Observer for suite progress.
///
/// All methods default to no-ops so implementors pick what they display.
pub trait SuiteProgress: Send + Sync {
    /// Called once the combinations of a suite are known.
    fn on_suite_start(&self, _total_combinations: usize) {}

    /// Called before a combination's rounds start. `index` is 0-based.
    fn on_combination_start(&self, _index: usize, _combination: &Combination) {}

    /// Called after every round of a combination completed.
    fn on_combination_complete(&self, _index: usize, _rounds: &[RoundReport]) {}

    /// Called when the suite finished or stopped.
    fn on_suite_finish(&self, _succeeded: bool) {}
}

/// Progress observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSuiteProgress;

impl SuiteProgress for NoSuiteProgress {}

/// Outcome of one combination.
#[derive(Debug, Clone)]
pub struct CombinationReport {
    pub combination: Combination,
    pub rounds: Vec<RoundReport>,
}

/// Outcome of one suite.
#[derive(Debug, Clone, Default)]
pub struct SuiteReport {
    pub combinations: Vec<CombinationReport>,
    pub elapsed_secs: f64,
}

impl SuiteReport {
    pub fn rounds(&self) -> usize {
        self.combinations.iter().map(|c| c.rounds.len()).sum()
    }

    /// Number of files written (two per round).
    pub fn artifacts(&self) -> usize {
        self.rounds() * 2
    }
}

/// Validates a suite and expands it without running anything.
pub fn plan_suite(suite: &Value) -> Result<(ExperimentSuite, Vec<Combination>)> {
    let suite = ExperimentSuite::from_value(suite)?;
    let combinations = make_init_instr_lists(&suite.init_instr_dirs)?;
    Ok((suite, combinations))
}

/// Drives experiment suites against a conversation engine.
///
/// Combinations and rounds run strictly one after another. The first error
/// stops the whole suite.
pub struct SuiteController<'a> {
    engine: &'a dyn ConversationEngine,
    store: ArtifactStore,
    progress: Arc<dyn SuiteProgress>,
}

impl<'a> SuiteController<'a> {
    pub fn new(engine: &'a dyn ConversationEngine, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            engine,
            store: ArtifactStore::new(output_dir),
            progress: Arc::new(NoSuiteProgress),
        }
    }

    /// Replaces the artifact store (e.g., to inject a clock).
    pub fn with_store(mut self, store: ArtifactStore) -> Self {
        self.store = store;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn SuiteProgress>) -> Self {
        self.progress = progress;
        self
    }

    pub fn output_dir(&self) -> &Path {
        self.store.output_dir()
    }

    /// Runs one raw suite document.
    ///
    /// The three required keys are checked before any directory is read.
    /// Every combination is enumerated before the first session starts.
    pub async fn run_exp_suite(
        &self,
        suite: &Value,
        sink: &mut dyn LineSink,
    ) -> Result<SuiteReport> {
        let started = Instant::now();
        let (suite, combinations) = plan_suite(suite)?;
        info!(
            party_conf = %suite.party_conf.display(),
            exp_conf = %suite.exp_conf.display(),
            combinations = combinations.len(),
            "Running experiment suite"
        );
        self.progress.on_suite_start(combinations.len());

        let mut report = SuiteReport::default();
        for (index, combination) in combinations.into_iter().enumerate() {
            self.progress.on_combination_start(index, &combination);
            info!(index = index + 1, %combination, "Starting combination");

            let rounds = match self
                .run_exp_with_single_party_conf(
                    &combination,
                    &suite.party_conf,
                    &suite.exp_conf,
                    sink,
                )
                .await
            {
                Ok(rounds) => rounds,
                Err(e) => {
                    error!(
                        index = index + 1,
                        %combination,
                        error = %e,
                        "Combination failed, stopping suite"
                    );
                    self.progress.on_suite_finish(false);
                    return Err(e);
                }
            };

            self.progress.on_combination_complete(index, &rounds);
            report.combinations.push(CombinationReport {
                combination,
                rounds,
            });
        }

        report.elapsed_secs = started.elapsed().as_secs_f64();
        self.progress.on_suite_finish(true);
        info!(
            combinations = report.combinations.len(),
            rounds = report.rounds(),
            elapsed_secs = report.elapsed_secs,
            "Experiment suite complete"
        );
        Ok(report)
    }

    /// Runs a list of suites in order, stopping at the first failure.
    pub async fn run_exp_suites(
        &self,
        suites: &[Value],
        sink: &mut dyn LineSink,
    ) -> Result<Vec<SuiteReport>> {
        let mut reports = Vec::with_capacity(suites.len());
        for (i, suite) in suites.iter().enumerate() {
            info!(suite = i + 1, total = suites.len(), "Starting suite");
            reports.push(self.run_exp_suite(suite, sink).await?);
        }
        Ok(reports)
    }

    /// Compiles one combination's party configuration and runs its rounds.
    ///
    /// The configuration is compiled fresh and dropped afterwards.
    pub async fn run_exp_with_single_party_conf(
        &self,
        combination: &Combination,
        party_conf: &Path,
        exp_conf: &Path,
        sink: &mut dyn LineSink,
    ) -> Result<Vec<RoundReport>> {
        let init_instr = combination.load_texts()?;
        let party = compile_party_config(party_conf, &init_instr)?;
        let exp = ExperimentConfig::from_file(exp_conf)?;

        SessionRunner::new(self.engine, &self.store)
            .conduct_chat_session(&party, &exp, sink)
            .await
    }

    /// Runs a single session from one instruction directory.
    ///
    /// The directory's files are bound to attendee slots in name order.
    pub async fn run_single_session(
        &self,
        init_instr_dir: &Path,
        party_conf: &Path,
        exp_conf: &Path,
        sink: &mut dyn LineSink,
    ) -> Result<Vec<RoundReport>> {
        let instructions = load_instructions(init_instr_dir)?;
        if instructions.is_empty() {
            return Err(EvalError::EmptyDirectory {
                path: init_instr_dir.to_path_buf(),
            });
        }
        info!(
            dir = %instructions.dir().display(),
            instructions = instructions.len(),
            "Running single session"
        );
        let party = compile_party_config(party_conf, &instructions.texts())?;
        let exp = ExperimentConfig::from_file(exp_conf)?;

        SessionRunner::new(self.engine, &self.store)
            .conduct_chat_session(&party, &exp, sink)
            .await
    }
}
