//! Ignore-set evaluation
//!
//! An [`IgnoreSet`] holds the compiled rules of one ignore file, rooted at
//! the directory the file lives in. Because the ignore format gives the
//! *last* matching line the final word, rules are stored in reverse file
//! order: the first hit during a linear scan is then the decisive one.

mod pattern;

pub use pattern::IgnorePattern;

use std::path::{Path, PathBuf};

use crate::error::MatchingError;
use crate::filesystem::FileSystem;
use crate::path_util;

/// Verdict of an ignore set for one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreVerdict {
    /// A non-negated rule matched: the path is ignored.
    Ignore,
    /// A negated rule matched: the path is explicitly allow-listed.
    Allow,
    /// No rule mentioned the path.
    None,
}

/// An ordered collection of ignore patterns rooted at a directory.
#[derive(Debug)]
pub struct IgnoreSet {
    root: PathBuf,
    patterns: Vec<IgnorePattern>,
}

impl IgnoreSet {
    /// Reads and compiles an ignore file rooted at `root`.
    pub fn from_file(
        fs: &dyn FileSystem,
        root: &Path,
        file: &Path,
        case_insensitive: bool,
    ) -> Result<Self, MatchingError> {
        let content = fs.read_to_string(file)?;
        Self::compile(root, content.lines(), case_insensitive)
    }

    /// Compiles an explicit list of ignore lines rooted at `root`.
    pub fn from_lines<I, S>(
        root: &Path,
        lines: I,
        case_insensitive: bool,
    ) -> Result<Self, MatchingError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::compile(root, lines, case_insensitive)
    }

    fn compile<I, S>(root: &Path, lines: I, case_insensitive: bool) -> Result<Self, MatchingError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut patterns = Vec::new();
        for line in lines {
            if let Some(compiled) = IgnorePattern::parse(line.as_ref(), case_insensitive)? {
                patterns.push(compiled);
            }
        }
        // Last line wins, so scan order is reverse file order.
        patterns.reverse();

        Ok(Self {
            root: path_util::remove_prefix(Path::new("./"), root),
            patterns,
        })
    }

    /// The directory the rules are interpreted relative to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The compiled rules, decisive-first.
    pub fn patterns(&self) -> &[IgnorePattern] {
        &self.patterns
    }

    /// Decides whether `path` is ignored, allow-listed, or unmentioned.
    ///
    /// `is_dir` must reflect the entry's type so directory-only rules can be
    /// honoured.
    pub fn matches(&self, path: &Path, is_dir: bool) -> IgnoreVerdict {
        if self.patterns.is_empty() {
            return IgnoreVerdict::None;
        }

        let prepared = self.prepare_path(path);
        for rule in &self.patterns {
            if rule.glob_matches(&prepared) && (!rule.is_dir_only() || is_dir) {
                return if rule.is_negated() {
                    IgnoreVerdict::Allow
                } else {
                    IgnoreVerdict::Ignore
                };
            }
        }
        IgnoreVerdict::None
    }

    /// Strips the leading `./` and the set's root so the rules see the path
    /// relative to the ignore file's directory.
    fn prepare_path(&self, path: &Path) -> String {
        let stripped = path_util::remove_prefix(Path::new("./"), path);
        let prepared = path_util::remove_prefix(&self.root, &stripped);
        path_util::to_match_string(&prepared)
    }
}
