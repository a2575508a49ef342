//! Suite expander: every combination of instruction files across directories.

use crate::error::{EvalError, Result};
use crate::instructions::{load_instructions, read_instruction};
use crate::product::cartesian_product;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One instruction file per directory, in directory order.
///
/// Element `i` is bound to attendee slot `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combination(Vec<PathBuf>);

impl Combination {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self(paths)
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reads the instruction text of every file, in slot order.
    pub fn load_texts(&self) -> Result<Vec<String>> {
        self.0.iter().map(|p| read_instruction(p)).collect()
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self
            .0
            .iter()
            .map(|p| {
                p.file_name()
                    .map_or_else(|| p.display().to_string(), |n| n.to_string_lossy().into_owned())
            })
            .collect();
        write!(f, "({})", names.join(", "))
    }
}

/// Enumerates every combination of files across `dirs`.
///
/// The result is fully materialized: every directory is loaded and checked
/// before the first combination is returned. The last directory's files
/// vary fastest.
pub fn make_init_instr_lists<P: AsRef<Path>>(dirs: &[P]) -> Result<Vec<Combination>> {
    let mut file_lists = Vec::with_capacity(dirs.len());
    for dir in dirs {
        let dir = dir.as_ref();
        let set = load_instructions(dir)?;
        if set.is_empty() {
            return Err(EvalError::EmptyDirectory {
                path: dir.to_path_buf(),
            });
        }
        debug!(dir = %dir.display(), files = set.len(), "Instruction directory ready");
        file_lists.push(set.paths());
    }

    let combinations: Vec<Combination> = cartesian_product(&file_lists)
        .into_iter()
        .map(Combination::new)
        .collect();
    info!(
        directories = dirs.len(),
        combinations = combinations.len(),
        "Expanded instruction combinations"
    );
    Ok(combinations)
}
