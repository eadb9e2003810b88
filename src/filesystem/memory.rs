//! In-memory filesystem implementation for testing
//!
//! This module provides `MemoryFs`, a fake filesystem that stores all data
//! in memory. It's used for hermetic testing without touching the real
//! filesystem. Directories are implied by the paths of the files added to
//! the store, or created explicitly with [`MemoryFs::add_dir`]. Symbolic
//! links are not modelled.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use super::{EntryAttributes, FileSystem};
use crate::error::MatchingError;

#[derive(Default)]
struct Store {
    files: BTreeMap<PathBuf, String>,
    dirs: BTreeSet<PathBuf>,
}

/// In-memory filesystem for testing
///
/// A "fake" implementation providing a working filesystem entirely in
/// memory: fast, deterministic (entries list in lexical order), and fully
/// controllable from tests.
#[derive(Clone, Default)]
pub struct MemoryFs {
    store: Arc<RwLock<Store>>,
}

impl MemoryFs {
    /// Create a new empty in-memory filesystem
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with the given content, creating parent directories.
    pub fn add_file(&self, path: impl AsRef<Path>, content: &str) {
        let path = path.as_ref().to_path_buf();
        let mut store = self.store.write().expect("filesystem lock");
        add_ancestors(&mut store.dirs, &path);
        store.files.insert(path, content.to_string());
    }

    /// Add an empty directory, creating parent directories.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        let mut store = self.store.write().expect("filesystem lock");
        add_ancestors(&mut store.dirs, &path);
        store.dirs.insert(path);
    }

    /// Remove a file from the filesystem.
    pub fn remove_file(&self, path: impl AsRef<Path>) {
        let mut store = self.store.write().expect("filesystem lock");
        store.files.remove(path.as_ref());
    }
}

fn add_ancestors(dirs: &mut BTreeSet<PathBuf>, path: &Path) {
    let mut current = path.parent();
    while let Some(dir) = current {
        if dir.as_os_str().is_empty() {
            break;
        }
        dirs.insert(dir.to_path_buf());
        current = dir.parent();
    }
}

fn not_found(path: &Path) -> MatchingError {
    MatchingError::io(
        path,
        std::io::Error::new(std::io::ErrorKind::NotFound, "no such file or directory"),
    )
}

impl FileSystem for MemoryFs {
    fn read_to_string(&self, path: &Path) -> Result<String, MatchingError> {
        let store = self.store.read().expect("filesystem lock");
        store
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| not_found(path))
    }

    fn is_dir(&self, path: &Path) -> bool {
        let store = self.store.read().expect("filesystem lock");
        store.dirs.contains(path)
    }

    fn is_readable_file(&self, path: &Path) -> bool {
        let store = self.store.read().expect("filesystem lock");
        store.files.contains_key(path)
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<PathBuf>, MatchingError> {
        let store = self.store.read().expect("filesystem lock");
        if !store.dirs.contains(path) {
            return Err(not_found(path));
        }

        let mut entries: Vec<PathBuf> = store
            .files
            .keys()
            .chain(store.dirs.iter())
            .filter(|candidate| candidate.parent() == Some(path))
            .cloned()
            .collect();
        entries.sort();
        entries.dedup();
        Ok(entries)
    }

    fn symlink_attributes(&self, path: &Path) -> Result<EntryAttributes, MatchingError> {
        let store = self.store.read().expect("filesystem lock");
        if let Some(content) = store.files.get(path) {
            Ok(EntryAttributes {
                is_dir: false,
                is_file: true,
                is_symlink: false,
                len: content.len() as u64,
            })
        } else if store.dirs.contains(path) {
            Ok(EntryAttributes {
                is_dir: true,
                is_file: false,
                is_symlink: false,
                len: 0,
            })
        } else {
            Err(not_found(path))
        }
    }

    fn attributes(&self, path: &Path) -> Result<EntryAttributes, MatchingError> {
        self.symlink_attributes(path)
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf, MatchingError> {
        Ok(path.to_path_buf())
    }
}
