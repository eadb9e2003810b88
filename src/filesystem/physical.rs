//! Physical filesystem implementation
//!
//! This module provides `PhysicalFs`, which uses the real OS filesystem.
//! This is the production adapter used by the walker and the CLI.

use std::fs;
use std::path::{Path, PathBuf};

use super::{EntryAttributes, FileSystem};
use crate::error::MatchingError;

/// Physical filesystem adapter
///
/// Uses `std::fs` to interact with the real filesystem. Readability checks
/// are performed by opening the file, so permission problems surface the
/// same way a later read would.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhysicalFs;

impl PhysicalFs {
    /// Create a new `PhysicalFs` instance
    pub fn new() -> Self {
        Self
    }
}

fn attributes_from(metadata: &fs::Metadata) -> EntryAttributes {
    EntryAttributes {
        is_dir: metadata.is_dir(),
        is_file: metadata.is_file(),
        is_symlink: metadata.file_type().is_symlink(),
        len: metadata.len(),
    }
}

impl FileSystem for PhysicalFs {
    fn read_to_string(&self, path: &Path) -> Result<String, MatchingError> {
        fs::read_to_string(path).map_err(|source| MatchingError::io(path, source))
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_readable_file(&self, path: &Path) -> bool {
        path.is_file() && fs::File::open(path).is_ok()
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<PathBuf>, MatchingError> {
        let reader = fs::read_dir(path).map_err(|source| MatchingError::io(path, source))?;
        let mut entries = Vec::new();
        for entry in reader {
            let entry = entry.map_err(|source| MatchingError::io(path, source))?;
            entries.push(entry.path());
        }
        Ok(entries)
    }

    fn symlink_attributes(&self, path: &Path) -> Result<EntryAttributes, MatchingError> {
        let metadata =
            fs::symlink_metadata(path).map_err(|source| MatchingError::io(path, source))?;
        Ok(attributes_from(&metadata))
    }

    fn attributes(&self, path: &Path) -> Result<EntryAttributes, MatchingError> {
        let metadata = fs::metadata(path).map_err(|source| MatchingError::io(path, source))?;
        let symlink = fs::symlink_metadata(path)
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false);
        Ok(EntryAttributes {
            is_symlink: symlink,
            ..attributes_from(&metadata)
        })
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf, MatchingError> {
        fs::canonicalize(path).map_err(|source| MatchingError::io(path, source))
    }
}
