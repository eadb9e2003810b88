//! Filesystem abstraction - the primary test seam
//!
//! This module defines the `FileSystem` trait which provides an abstraction
//! over the operations the walker and the ignore engine need: directory
//! enumeration, attribute queries, and whole-file reads. Production code uses
//! `PhysicalFs`; tests can run hermetically on `MemoryFs`.

pub mod memory;
pub mod physical;

use std::path::{Path, PathBuf};

use crate::error::MatchingError;

/// Basic attributes of a directory entry, as handed to match handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryAttributes {
    /// Entry is a directory (after link resolution, if any was performed).
    pub is_dir: bool,
    /// Entry is a regular file.
    pub is_file: bool,
    /// Entry itself is a symbolic link.
    pub is_symlink: bool,
    /// Size in bytes, zero for directories on filesystems that report none.
    pub len: u64,
}

/// Abstract filesystem interface
///
/// Implementations can be backed by the real filesystem (`PhysicalFs`) or by
/// in-memory storage (`MemoryFs` for testing). All paths are interpreted as
/// given; no implicit normalisation is performed.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as UTF-8 text.
    fn read_to_string(&self, path: &Path) -> Result<String, MatchingError>;

    /// Whether the path names an existing directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Whether the path names an existing, readable regular file.
    fn is_readable_file(&self, path: &Path) -> bool;

    /// Lists the entries of a directory, in the order the underlying store
    /// yields them. Entries are returned as full paths.
    fn list_dir(&self, path: &Path) -> Result<Vec<PathBuf>, MatchingError>;

    /// Attributes of the entry itself, without following symbolic links.
    fn symlink_attributes(&self, path: &Path) -> Result<EntryAttributes, MatchingError>;

    /// Attributes of the entry after following symbolic links.
    fn attributes(&self, path: &Path) -> Result<EntryAttributes, MatchingError>;

    /// Resolves a path to a canonical absolute form, following links.
    fn canonicalize(&self, path: &Path) -> Result<PathBuf, MatchingError>;
}
