//! Configuration compiler: merges instruction texts into a party template.

use crate::error::{EvalError, Result};
use llm_eval_proto::PartyConfig;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Loads the party template at `template` and binds `init_instr[i]` to
/// attendee `i`.
///
/// Attendees beyond `init_instr.len()` keep the template's instruction.
/// A template with fewer attendees than instructions is rejected.
pub fn compile_party_config(
    template: impl AsRef<Path>,
    init_instr: &[String],
) -> Result<PartyConfig> {
    let path = template.as_ref();
    let content = fs::read_to_string(path).map_err(|source| EvalError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let mut party = PartyConfig::from_yaml(&content).map_err(|source| EvalError::TemplateParse {
        path: path.to_path_buf(),
        source,
    })?;

    if party.attendee_count() < init_instr.len() {
        return Err(EvalError::AttendeeCountMismatch {
            path: path.to_path_buf(),
            attendees: party.attendee_count(),
            instructions: init_instr.len(),
        });
    }

    for (attendee, text) in party.attendees.iter_mut().zip(init_instr) {
        attendee.instruction.text.clone_from(text);
    }

    debug!(
        template = %path.display(),
        attendees = party.attendee_count(),
        bound = init_instr.len(),
        "Compiled party configuration"
    );
    Ok(party)
}
