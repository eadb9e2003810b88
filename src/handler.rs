//! Match handler contract
//!
//! The walker reports every matched entry through a [`MatchHandler`]. The
//! return value is the cooperative cancellation mechanism: answering `false`
//! from either callback halts the walk before the next entry. Errors raised
//! by a handler abort the walk and propagate to its caller.

use std::path::{Path, PathBuf};

use crate::error::MatchingError;
use crate::filesystem::EntryAttributes;

/// Callbacks invoked for each matched file and directory.
pub trait MatchHandler {
    /// Called when a file is matched. Return `false` to stop the walk.
    fn file(&mut self, file: &Path, attrs: &EntryAttributes) -> Result<bool, MatchingError>;

    /// Called when a directory is matched. Return `false` to stop the walk.
    /// The default accepts everything.
    fn directory(&mut self, dir: &Path, attrs: &EntryAttributes) -> Result<bool, MatchingError> {
        let _ = (dir, attrs);
        Ok(true)
    }
}

/// Handler that accumulates the paths encountered during a walk.
///
/// The order of the collected paths reflects the order the filesystem
/// reported them, which may differ between runs and machines.
#[derive(Debug, Default)]
pub struct CollectingHandler {
    paths: Vec<PathBuf>,
    include_directories: bool,
}

impl CollectingHandler {
    /// Collects files and directories.
    pub fn new() -> Self {
        Self {
            paths: Vec::new(),
            include_directories: true,
        }
    }

    /// Collects files only.
    pub fn files_only() -> Self {
        Self {
            paths: Vec::new(),
            include_directories: false,
        }
    }

    /// The paths collected so far.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Consumes the handler and returns the collected paths.
    pub fn into_paths(self) -> Vec<PathBuf> {
        self.paths
    }
}

impl MatchHandler for CollectingHandler {
    fn file(&mut self, file: &Path, _attrs: &EntryAttributes) -> Result<bool, MatchingError> {
        self.paths.push(file.to_path_buf());
        Ok(true)
    }

    fn directory(&mut self, dir: &Path, _attrs: &EntryAttributes) -> Result<bool, MatchingError> {
        if self.include_directories {
            self.paths.push(dir.to_path_buf());
        }
        Ok(true)
    }
}
