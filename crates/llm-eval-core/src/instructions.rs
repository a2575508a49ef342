//! Instruction loader.
//!
//! Reads every non-hidden regular file of an instruction directory, ordered
//! by file name. File name order decides which attendee slot an instruction
//! is bound to, so ordering is byte-wise and stable across platforms that
//! expose raw file names.

use crate::error::{EvalError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One instruction file and its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionFile {
    pub path: PathBuf,
    pub text: String,
}

/// The instruction files of one directory, sorted by file name.
///
/// Loaded fresh on every call; nothing is cached.
#[derive(Debug, Clone)]
pub struct InstructionSet {
    dir: PathBuf,
    files: Vec<InstructionFile>,
}

impl InstructionSet {
    /// The directory this set was loaded from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn files(&self) -> &[InstructionFile] {
        &self.files
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    pub fn texts(&self) -> Vec<String> {
        self.files.iter().map(|f| f.text.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Loads the instruction files of `dir`.
///
/// Dotfiles and anything that is not a regular file are skipped. An empty
/// result is returned as-is; callers that need at least one file check it.
pub fn load_instructions(dir: impl AsRef<Path>) -> Result<InstructionSet> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(EvalError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let entries = fs::read_dir(dir).map_err(|source| EvalError::FileRead {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| EvalError::FileRead {
            path: dir.to_path_buf(),
            source,
        })?;
        let name = entry.file_name();
        if name.as_encoded_bytes().starts_with(b".") {
            debug!(path = %entry.path().display(), "Skipping hidden entry");
            continue;
        }
        let path = entry.path();
        if !path.is_file() {
            debug!(path = %path.display(), "Skipping non-file entry");
            continue;
        }
        paths.push(path);
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let text = read_instruction(&path)?;
        files.push(InstructionFile { path, text });
    }

    debug!(dir = %dir.display(), count = files.len(), "Loaded instructions");
    Ok(InstructionSet {
        dir: dir.to_path_buf(),
        files,
    })
}

/// Reads a single instruction file.
pub fn read_instruction(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|source| EvalError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, text: &str) {
        fs::write(dir.join(name), text).unwrap();
    }

    #[test]
    fn test_files_sorted_by_name() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "c.txt", "third");
        write(temp.path(), "a.txt", "first");
        write(temp.path(), "b.txt", "second");

        let set = load_instructions(temp.path()).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.texts(), vec!["first", "second", "third"]);
        let names: Vec<_> = set
            .paths()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);
    }

    #[test]
    fn test_hidden_files_excluded() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.txt", "first");
        write(temp.path(), ".DS_Store", "junk");

        let set = load_instructions(temp.path()).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.files()[0].text, "first");
    }

    #[test]
    fn test_subdirectories_skipped() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.txt", "first");
        fs::create_dir(temp.path().join("nested")).unwrap();

        let set = load_instructions(temp.path()).unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_byte_order_not_natural_order() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "instr10.txt", "ten");
        write(temp.path(), "instr2.txt", "two");
        write(temp.path(), "Instr3.txt", "upper");

        let set = load_instructions(temp.path()).unwrap();
        assert_eq!(set.texts(), vec!["upper", "ten", "two"]);
    }

    #[test]
    fn test_missing_directory() {
        let temp = TempDir::new().unwrap();
        let err = load_instructions(temp.path().join("nope")).unwrap_err();
        assert!(matches!(err, EvalError::DirectoryNotFound { .. }));
    }

    #[test]
    fn test_file_path_is_not_a_directory() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.txt", "first");
        let err = load_instructions(temp.path().join("a.txt")).unwrap_err();
        assert!(matches!(err, EvalError::DirectoryNotFound { .. }));
    }

    #[test]
    fn test_empty_directory_yields_empty_set() {
        let temp = TempDir::new().unwrap();
        let set = load_instructions(temp.path()).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_unreadable_file_reports_path() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("bad.txt"), [0xff, 0xfe, 0x00]).unwrap();

        let err = load_instructions(temp.path()).unwrap_err();
        match err {
            EvalError::FileRead { path, .. } => assert!(path.ends_with("bad.txt")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
