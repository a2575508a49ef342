//! Round artifact naming and persistence.
//!
//! Every round writes a transcript (`chat_history_<stamp>.json`) and the
//! resolved party configuration (`party_conf_<stamp>.yaml`). The stamp is
//! the round's start time with second resolution. When a name is already
//! taken, the stamp gains a `_<n>` suffix so both files of a round always
//! share one stem and earlier rounds are never overwritten.

use crate::error::{EvalError, Result};
use chrono::{DateTime, Local};
use llm_eval_proto::{ChatTranscript, PartyConfig};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Timestamp format embedded in artifact names.
pub const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

const CHAT_HISTORY_PREFIX: &str = "chat_history_";
const PARTY_CONF_PREFIX: &str = "party_conf_";

/// Source of round start times.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Formats a round start time as `YYYYMMDD_HHMMSS`.
pub fn format_stamp(time: &DateTime<Local>) -> String {
    time.format(STAMP_FORMAT).to_string()
}

/// The pair of files written for one round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundArtifacts {
    /// Shared stem, the timestamp plus any collision suffix.
    pub stamp: String,
    pub chat_history: PathBuf,
    pub party_conf: PathBuf,
}

impl RoundArtifacts {
    fn in_dir(dir: &Path, stamp: String) -> Self {
        Self {
            chat_history: dir.join(format!("{CHAT_HISTORY_PREFIX}{stamp}.json")),
            party_conf: dir.join(format!("{PARTY_CONF_PREFIX}{stamp}.yaml")),
            stamp,
        }
    }

    fn is_free(&self) -> bool {
        !self.chat_history.exists() && !self.party_conf.exists()
    }
}

/// Writes round artifacts into an output directory.
#[derive(Clone)]
pub struct ArtifactStore {
    output_dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for ArtifactStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactStore")
            .field("output_dir", &self.output_dir)
            .finish_non_exhaustive()
    }
}

impl ArtifactStore {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the clock used for round stamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Takes the round start time and picks free artifact names for it.
    ///
    /// Creates the output directory if needed.
    pub fn begin_round(&self) -> Result<RoundArtifacts> {
        fs::create_dir_all(&self.output_dir).map_err(|source| EvalError::ArtifactWrite {
            path: self.output_dir.clone(),
            source,
        })?;

        let base = format_stamp(&self.clock.now());
        let mut artifacts = RoundArtifacts::in_dir(&self.output_dir, base.clone());
        let mut suffix = 0u32;
        while !artifacts.is_free() {
            suffix += 1;
            artifacts = RoundArtifacts::in_dir(&self.output_dir, format!("{base}_{suffix}"));
        }
        if suffix > 0 {
            warn!(
                stamp = %base,
                suffix,
                "Artifact names already taken for this second, using suffixed names"
            );
        }
        Ok(artifacts)
    }

    /// Writes the transcript as indented JSON.
    pub fn write_transcript(
        &self,
        artifacts: &RoundArtifacts,
        transcript: &ChatTranscript,
    ) -> Result<()> {
        let path = &artifacts.chat_history;
        let record = transcript.to_record().map_err(|e| EvalError::Serialize {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let json = serde_json::to_string_pretty(&record).map_err(|e| EvalError::Serialize {
            path: path.clone(),
            message: e.to_string(),
        })?;
        write_file(path, &json)
    }

    /// Writes the resolved party configuration as YAML.
    pub fn write_party_conf(&self, artifacts: &RoundArtifacts, party: &PartyConfig) -> Result<()> {
        let path = &artifacts.party_conf;
        let yaml = party.to_yaml().map_err(|e| EvalError::Serialize {
            path: path.clone(),
            message: e.to_string(),
        })?;
        write_file(path, &yaml)
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|source| EvalError::ArtifactWrite {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = content.len(), "Wrote artifact");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    struct FixedClock(DateTime<Local>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Local> {
            self.0
        }
    }

    fn fixed() -> Arc<dyn Clock> {
        let time = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).single().unwrap();
        Arc::new(FixedClock(time))
    }

    #[test]
    fn test_stamp_is_fixed_width() {
        let time = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).single().unwrap();
        assert_eq!(format_stamp(&time), "20240309_070501");
    }

    #[test]
    fn test_names_share_stamp() {
        let temp = TempDir::new().unwrap();
        let store = ArtifactStore::new(temp.path()).with_clock(fixed());

        let round = store.begin_round().unwrap();
        assert_eq!(round.stamp, "20240309_070501");
        assert!(round.chat_history.ends_with("chat_history_20240309_070501.json"));
        assert!(round.party_conf.ends_with("party_conf_20240309_070501.yaml"));
    }

    #[test]
    fn test_same_second_rounds_get_suffixes() {
        let temp = TempDir::new().unwrap();
        let store = ArtifactStore::new(temp.path()).with_clock(fixed());

        let first = store.begin_round().unwrap();
        store
            .write_transcript(&first, &ChatTranscript::new())
            .unwrap();

        let second = store.begin_round().unwrap();
        assert_eq!(second.stamp, "20240309_070501_1");

        fs::write(&second.party_conf, "attendees: []\n").unwrap();
        let third = store.begin_round().unwrap();
        assert_eq!(third.stamp, "20240309_070501_2");
    }

    #[test]
    fn test_creates_output_dir() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("runs").join("today");
        let store = ArtifactStore::new(&out).with_clock(fixed());

        store.begin_round().unwrap();
        assert!(out.is_dir());
    }

    #[test]
    fn test_transcript_written_as_indented_json() {
        let temp = TempDir::new().unwrap();
        let store = ArtifactStore::new(temp.path()).with_clock(fixed());
        let round = store.begin_round().unwrap();

        let transcript = ChatTranscript::new().with_message("ai", "hello");
        store.write_transcript(&round, &transcript).unwrap();

        let written = fs::read_to_string(&round.chat_history).unwrap();
        assert!(written.contains("\n  \"messages\""));
        let parsed: ChatTranscript = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, transcript);
    }

    #[test]
    fn test_party_conf_written_as_yaml() {
        let temp = TempDir::new().unwrap();
        let store = ArtifactStore::new(temp.path()).with_clock(fixed());
        let round = store.begin_round().unwrap();

        let party = PartyConfig::from_yaml(
            "attendees:\n  - role: ai\n    instruction:\n      text: be brief\n",
        )
        .unwrap();
        store.write_party_conf(&round, &party).unwrap();

        let written = fs::read_to_string(&round.party_conf).unwrap();
        assert_eq!(PartyConfig::from_yaml(&written).unwrap(), party);
    }
}
