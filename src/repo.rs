//! Repository probe
//!
//! Pure queries that locate the artefacts the walker cares about: the
//! repository marker directory, per-directory ignore files, the repository's
//! private exclude file, and the user-wide configuration file. The process
//! environment is captured once into [`ProcessEnv`] and threaded through, so
//! traversal never re-reads environment variables.

use std::path::{Path, PathBuf};

use crate::filesystem::FileSystem;
use crate::path_util;

const REPO_MARKER: &str = ".git";
const IGNORE_FILE: &str = ".gitignore";
const EXCLUDE_FILE: &str = ".git/info/exclude";

/// Environment values captured at walker construction.
#[derive(Debug, Clone, Default)]
pub struct ProcessEnv {
    home: Option<PathBuf>,
    xdg_config_home: Option<PathBuf>,
}

impl ProcessEnv {
    /// Captures `HOME` and `XDG_CONFIG_HOME` from the process environment.
    /// Empty values count as unset.
    pub fn capture() -> Self {
        Self {
            home: env_path("HOME"),
            xdg_config_home: env_path("XDG_CONFIG_HOME"),
        }
    }

    /// Builds an environment with explicit values, mainly for tests.
    pub fn with_values(home: Option<PathBuf>, xdg_config_home: Option<PathBuf>) -> Self {
        Self {
            home,
            xdg_config_home,
        }
    }

    /// The user's home directory, if known.
    pub fn home(&self) -> Option<&Path> {
        self.home.as_deref()
    }

    /// Replaces a leading `~/` in `text` with the home directory.
    pub fn expand_tilde(&self, text: &str) -> PathBuf {
        path_util::expand_tilde(text, self.home())
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// True iff `dir` contains the repository marker (`.git`) as a directory.
pub fn contains_repo_marker(fs: &dyn FileSystem, dir: &Path) -> bool {
    fs.is_dir(&dir.join(REPO_MARKER))
}

/// The repository's private exclude file under `dir`, if readable.
pub fn repo_exclude_file(fs: &dyn FileSystem, dir: &Path) -> Option<PathBuf> {
    readable(fs, dir.join(EXCLUDE_FILE))
}

/// The ignore file directly inside `dir`, if readable.
pub fn local_ignore_file(fs: &dyn FileSystem, dir: &Path) -> Option<PathBuf> {
    readable(fs, dir.join(IGNORE_FILE))
}

/// Locates the user-wide configuration file: `$HOME/.gitconfig` first, then
/// `$XDG_CONFIG_HOME/git/config` (falling back to `$HOME/.config/git/config`
/// when the variable is unset or empty).
pub fn find_global_config_file(fs: &dyn FileSystem, env: &ProcessEnv) -> Option<PathBuf> {
    if let Some(home) = env.home() {
        if let Some(found) = readable(fs, home.join(".gitconfig")) {
            return Some(found);
        }
    }

    let config_dir = match (&env.xdg_config_home, env.home()) {
        (Some(xdg), _) => xdg.clone(),
        (None, Some(home)) => home.join(".config"),
        (None, None) => return None,
    };
    readable(fs, config_dir.join("git").join("config"))
}

fn readable(fs: &dyn FileSystem, path: PathBuf) -> Option<PathBuf> {
    fs.is_readable_file(&path).then_some(path)
}
