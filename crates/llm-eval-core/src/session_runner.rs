//! Session runner: drives the conversation engine round by round.

use crate::artifacts::{ArtifactStore, RoundArtifacts};
use crate::config::ExperimentConfig;
use crate::error::{EvalError, Result};
use llm_eval_proto::{ConversationEngine, LineSink, PartyConfig};
use std::time::Instant;
use tracing::{debug, info};

/// Artifacts and timing of one completed round.
#[derive(Debug, Clone)]
pub struct RoundReport {
    /// 1-based round number.
    pub round: u32,
    pub artifacts: RoundArtifacts,
    pub messages: usize,
    pub elapsed_ms: u64,
}

/// Runs the rounds of one resolved party configuration.
pub struct SessionRunner<'a> {
    engine: &'a dyn ConversationEngine,
    store: &'a ArtifactStore,
}

impl<'a> SessionRunner<'a> {
    pub fn new(engine: &'a dyn ConversationEngine, store: &'a ArtifactStore) -> Self {
        Self { engine, store }
    }

    /// Runs `exp_conf.num_rounds()` independent rounds.
    ///
    /// Each round calls the engine once, then writes the transcript and the
    /// unchanged party configuration under one round stamp. The first
    /// failure aborts the remaining rounds.
    pub async fn conduct_chat_session(
        &self,
        party: &PartyConfig,
        exp_conf: &ExperimentConfig,
        sink: &mut dyn LineSink,
    ) -> Result<Vec<RoundReport>> {
        let num_rounds = exp_conf.num_rounds();
        let mut reports = Vec::with_capacity(num_rounds as usize);

        for round in 1..=num_rounds {
            let started = Instant::now();
            let artifacts = self.store.begin_round()?;
            info!(round, num_rounds, stamp = %artifacts.stamp, "Starting round");

            let outcome = self
                .engine
                .start_session(party, sink)
                .await
                .map_err(|source| EvalError::Engine { round, source })?;
            debug!(round, auxiliary = %outcome.auxiliary, "Engine session finished");

            self.store.write_transcript(&artifacts, &outcome.transcript)?;
            self.store.write_party_conf(&artifacts, party)?;

            let elapsed_ms = started.elapsed().as_millis() as u64;
            info!(
                round,
                messages = outcome.transcript.len(),
                elapsed_ms,
                "Round complete"
            );
            reports.push(RoundReport {
                round,
                artifacts,
                messages: outcome.transcript.len(),
                elapsed_ms,
            });
        }

        Ok(reports)
    }
}
