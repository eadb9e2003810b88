//! Hierarchical tree walker
//!
//! [`MatchingWalker`] drives a depth-first traversal of a directory tree,
//! reporting entries that match the caller's include patterns through a
//! [`MatchHandler`]. Ignore files are honoured hierarchically inside a
//! repository work tree, hidden entries are filtered by policy, and depth
//! and symbolic-link behaviour are configurable.
//!
//! The walker runs synchronously on the caller's thread and holds no
//! filesystem state between entries beyond the directory listing of the
//! parent currently being expanded.
//!
//! # Example
//!
//! ```rust,no_run
//! use treematch::{CollectingHandler, MatchingWalker};
//!
//! let mut handler = CollectingHandler::new();
//! MatchingWalker::new("/work/project", vec!["*.rs".to_string()])
//!     .walk(&mut handler)
//!     .unwrap();
//!
//! for path in handler.paths() {
//!     println!("{}", path.display());
//! }
//! ```

mod visitor;

use std::path::{Path, PathBuf};

use crate::error::MatchingError;
use crate::filesystem::physical::PhysicalFs;
use crate::filesystem::{EntryAttributes, FileSystem};
use crate::handler::MatchHandler;
use crate::repo::ProcessEnv;
use visitor::{Flow, MatchVisitor};

/// Pattern-matching filesystem walker.
///
/// Include patterns use the ignore-file grammar and act as an allow-list:
/// when none are given every entry is a candidate. As in ignore files,
/// patterns later in the list take precedence.
pub struct MatchingWalker<F: FileSystem = PhysicalFs> {
    fs: F,
    start: PathBuf,
    patterns: Vec<String>,
    exclude_hidden: bool,
    respect_ignore_files: bool,
    follow_links: bool,
    max_depth: Option<usize>,
    env: ProcessEnv,
}

impl MatchingWalker<PhysicalFs> {
    /// Creates a walker over the real filesystem rooted at `start`.
    pub fn new(start: impl Into<PathBuf>, patterns: Vec<String>) -> Self {
        Self::with_filesystem(PhysicalFs::new(), start, patterns)
    }
}

impl<F: FileSystem> MatchingWalker<F> {
    /// Creates a walker over an explicit filesystem implementation.
    pub fn with_filesystem(fs: F, start: impl Into<PathBuf>, patterns: Vec<String>) -> Self {
        Self {
            fs,
            start: start.into(),
            patterns,
            exclude_hidden: true,
            respect_ignore_files: true,
            follow_links: false,
            max_depth: None,
            env: ProcessEnv::capture(),
        }
    }

    /// Whether to skip hidden entries. Default: `true`.
    pub fn exclude_hidden(mut self, exclude_hidden: bool) -> Self {
        self.exclude_hidden = exclude_hidden;
        self
    }

    /// Whether to honour repository ignore files. Default: `true`.
    pub fn respect_ignore_files(mut self, respect: bool) -> Self {
        self.respect_ignore_files = respect;
        self
    }

    /// Whether to traverse through symbolic links. Default: `false`.
    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Bounds the descent; the start directory is depth zero. Default:
    /// unbounded.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Overrides the captured process environment, mainly for tests.
    pub fn process_env(mut self, env: ProcessEnv) -> Self {
        self.env = env;
        self
    }

    /// Walks the tree, reporting matches to `handler`. Returns the start
    /// path when the walk ran to completion or was stopped by the handler.
    pub fn walk(&self, handler: &mut dyn MatchHandler) -> Result<PathBuf, MatchingError> {
        let mut visitor = MatchVisitor::new(
            &self.fs,
            &self.env,
            handler,
            &self.patterns,
            self.exclude_hidden,
            self.respect_ignore_files,
        );
        let mut driver = WalkDriver {
            fs: &self.fs,
            follow_links: self.follow_links,
            max_depth: self.max_depth,
            active_dirs: Vec::new(),
        };
        driver.visit(&self.start, 0, &mut visitor)?;
        Ok(self.start.clone())
    }
}

/// Depth-first traversal mechanics, separated from match decisions.
struct WalkDriver<'a> {
    fs: &'a dyn FileSystem,
    follow_links: bool,
    max_depth: Option<usize>,
    /// Canonical paths of the directories currently being expanded; used for
    /// loop detection when following links.
    active_dirs: Vec<PathBuf>,
}

impl WalkDriver<'_> {
    fn visit(
        &mut self,
        path: &Path,
        depth: usize,
        visitor: &mut MatchVisitor<'_>,
    ) -> Result<Flow, MatchingError> {
        let attrs = self.read_attributes(path)?;
        if attrs.is_dir && self.can_descend(depth) {
            self.visit_directory(path, attrs, depth, visitor)
        } else {
            visitor.visit_file(path, &attrs)
        }
    }

    fn can_descend(&self, depth: usize) -> bool {
        self.max_depth.map_or(true, |max| depth < max)
    }

    fn visit_directory(
        &mut self,
        dir: &Path,
        attrs: EntryAttributes,
        depth: usize,
        visitor: &mut MatchVisitor<'_>,
    ) -> Result<Flow, MatchingError> {
        let canonical = if self.follow_links {
            let canonical = self.fs.canonicalize(dir)?;
            if self.active_dirs.contains(&canonical) {
                return Err(MatchingError::FilesystemLoop {
                    path: dir.to_path_buf(),
                });
            }
            Some(canonical)
        } else {
            None
        };

        match visitor.pre_visit_directory(dir, &attrs)? {
            Flow::Continue => {}
            Flow::SkipSubtree => return Ok(Flow::Continue),
            Flow::Terminate => return Ok(Flow::Terminate),
        }

        if let Some(canonical) = canonical {
            self.active_dirs.push(canonical);
        }

        let entries = self.fs.list_dir(dir)?;
        for entry in entries {
            if self.visit(&entry, depth + 1, visitor)? == Flow::Terminate {
                return Ok(Flow::Terminate);
            }
        }

        if self.follow_links {
            self.active_dirs.pop();
        }
        visitor.post_visit_directory();
        Ok(Flow::Continue)
    }

    /// With link following enabled, a broken link falls back to its own
    /// attributes and is visited as a file.
    fn read_attributes(&self, path: &Path) -> Result<EntryAttributes, MatchingError> {
        if self.follow_links {
            self.fs
                .attributes(path)
                .or_else(|_| self.fs.symlink_attributes(path))
        } else {
            self.fs.symlink_attributes(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::memory::MemoryFs;
    use crate::handler::CollectingHandler;

    fn sorted(paths: &[PathBuf]) -> Vec<String> {
        let mut names: Vec<String> = paths
            .iter()
            .map(|path| path.to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    fn walker(fs: &MemoryFs, patterns: &[&str]) -> MatchingWalker<MemoryFs> {
        MatchingWalker::with_filesystem(
            fs.clone(),
            "/tree",
            patterns.iter().map(|p| p.to_string()).collect(),
        )
        .process_env(ProcessEnv::with_values(None, None))
    }

    fn tree() -> MemoryFs {
        let fs = MemoryFs::new();
        fs.add_file("/tree/dir1a/file1a", "");
        fs.add_file("/tree/dir1a/file1b.txt", "");
        fs.add_file("/tree/dir1b/file1c.txt", "");
        fs.add_file("/tree/dir1c/dir2d/file2c.cpp", "");
        fs.add_file("/tree/dir1c/dir2d/file2d.cpp", "");
        fs.add_file("/tree/dir1c/file1d.foo", "");
        fs.add_dir("/tree/dir1a/dir2a");
        fs
    }

    #[test]
    fn test_unfiltered_walk_visits_everything() {
        let fs = tree();
        let mut handler = CollectingHandler::new();
        walker(&fs, &[])
            .respect_ignore_files(false)
            .exclude_hidden(false)
            .walk(&mut handler)
            .unwrap();

        assert_eq!(
            sorted(handler.paths()),
            vec![
                "/tree",
                "/tree/dir1a",
                "/tree/dir1a/dir2a",
                "/tree/dir1a/file1a",
                "/tree/dir1a/file1b.txt",
                "/tree/dir1b",
                "/tree/dir1b/file1c.txt",
                "/tree/dir1c",
                "/tree/dir1c/dir2d",
                "/tree/dir1c/dir2d/file2c.cpp",
                "/tree/dir1c/dir2d/file2d.cpp",
                "/tree/dir1c/file1d.foo",
            ]
        );
    }

    #[test]
    fn test_literal_pattern_matches_single_file() {
        let fs = tree();
        let mut handler = CollectingHandler::new();
        walker(&fs, &["file2d.cpp"])
            .respect_ignore_files(false)
            .exclude_hidden(false)
            .walk(&mut handler)
            .unwrap();

        assert_eq!(sorted(handler.paths()), vec!["/tree/dir1c/dir2d/file2d.cpp"]);
    }

    #[test]
    fn test_extension_union_patterns() {
        let fs = tree();
        let mut handler = CollectingHandler::new();
        walker(&fs, &["*.txt", "*.cpp"])
            .respect_ignore_files(false)
            .exclude_hidden(false)
            .walk(&mut handler)
            .unwrap();

        assert_eq!(
            sorted(handler.paths()),
            vec![
                "/tree/dir1a/file1b.txt",
                "/tree/dir1b/file1c.txt",
                "/tree/dir1c/dir2d/file2c.cpp",
                "/tree/dir1c/dir2d/file2d.cpp",
            ]
        );
    }

    #[test]
    fn test_directory_pattern_emits_directory() {
        let fs = tree();
        let mut handler = CollectingHandler::new();
        walker(&fs, &["dir2d"])
            .respect_ignore_files(false)
            .exclude_hidden(false)
            .walk(&mut handler)
            .unwrap();

        // The directory matches and is reported; its contents match no
        // pattern and are filtered out.
        assert_eq!(sorted(handler.paths()), vec!["/tree/dir1c/dir2d"]);
    }

    #[test]
    fn test_negated_include_pattern_prunes() {
        let fs = tree();
        let mut handler = CollectingHandler::new();
        walker(&fs, &["*.cpp", "!dir2d"])
            .respect_ignore_files(false)
            .exclude_hidden(false)
            .walk(&mut handler)
            .unwrap();

        assert!(handler.paths().is_empty());
    }

    #[test]
    fn test_max_depth_bounds_descent() {
        let fs = tree();
        let mut handler = CollectingHandler::new();
        walker(&fs, &[])
            .respect_ignore_files(false)
            .exclude_hidden(false)
            .max_depth(1)
            .walk(&mut handler)
            .unwrap();

        // Depth one: the start directory and its immediate files; nested
        // directories are not descended into and not reported.
        assert_eq!(
            sorted(handler.paths()),
            vec!["/tree"]
        );

        let mut handler = CollectingHandler::new();
        walker(&fs, &[])
            .respect_ignore_files(false)
            .exclude_hidden(false)
            .max_depth(2)
            .walk(&mut handler)
            .unwrap();
        assert_eq!(
            sorted(handler.paths()),
            vec![
                "/tree",
                "/tree/dir1a",
                "/tree/dir1a/file1a",
                "/tree/dir1a/file1b.txt",
                "/tree/dir1b",
                "/tree/dir1b/file1c.txt",
                "/tree/dir1c",
                "/tree/dir1c/file1d.foo",
            ]
        );
    }

    #[test]
    fn test_handler_false_terminates() {
        struct StopAfter {
            remaining: usize,
            seen: usize,
        }
        impl MatchHandler for StopAfter {
            fn file(
                &mut self,
                _: &Path,
                _: &EntryAttributes,
            ) -> Result<bool, MatchingError> {
                self.seen += 1;
                self.remaining -= 1;
                Ok(self.remaining > 0)
            }
            fn directory(
                &mut self,
                _: &Path,
                _: &EntryAttributes,
            ) -> Result<bool, MatchingError> {
                Ok(true)
            }
        }

        let fs = tree();
        let mut handler = StopAfter {
            remaining: 2,
            seen: 0,
        };
        walker(&fs, &[])
            .respect_ignore_files(false)
            .exclude_hidden(false)
            .walk(&mut handler)
            .unwrap();

        assert_eq!(handler.seen, 2);
    }

    #[test]
    fn test_handler_error_propagates() {
        struct Failing;
        impl MatchHandler for Failing {
            fn file(&mut self, file: &Path, _: &EntryAttributes) -> Result<bool, MatchingError> {
                Err(MatchingError::Handler {
                    path: file.to_path_buf(),
                    source: "boom".into(),
                })
            }
        }

        let fs = tree();
        let result = walker(&fs, &[])
            .respect_ignore_files(false)
            .exclude_hidden(false)
            .walk(&mut Failing);
        assert!(matches!(result, Err(MatchingError::Handler { .. })));
    }

    #[test]
    fn test_missing_start_is_an_error() {
        let fs = MemoryFs::new();
        let mut handler = CollectingHandler::new();
        let result = walker(&fs, &[]).walk(&mut handler);
        assert!(matches!(result, Err(MatchingError::Io { .. })));
    }

    #[test]
    fn test_gitignore_respected_inside_work_tree() {
        let fs = tree();
        fs.add_dir("/tree/.git");
        fs.add_file("/tree/.gitignore", "*.txt\n");

        let mut handler = CollectingHandler::new();
        walker(&fs, &[]).walk(&mut handler).unwrap();

        let paths = sorted(handler.paths());
        assert!(paths.contains(&"/tree/dir1a/file1a".to_string()));
        assert!(!paths.iter().any(|path| path.ends_with(".txt")));
    }

    #[test]
    fn test_gitignore_unread_outside_work_tree() {
        // Same ignore file, but no repository marker: every entry survives.
        let fs = tree();
        fs.add_file("/tree/.gitignore", "*.txt\n");

        let mut handler = CollectingHandler::new();
        walker(&fs, &[])
            .exclude_hidden(false)
            .walk(&mut handler)
            .unwrap();

        let paths = sorted(handler.paths());
        assert!(paths.contains(&"/tree/dir1a/file1b.txt".to_string()));
        assert!(paths.contains(&"/tree/dir1b/file1c.txt".to_string()));
    }

    #[test]
    fn test_hidden_entries_excluded_by_default() {
        let fs = tree();
        fs.add_file("/tree/.secret", "");
        fs.add_file("/tree/.config/settings", "");

        let mut handler = CollectingHandler::new();
        walker(&fs, &[]).respect_ignore_files(false).walk(&mut handler).unwrap();

        let paths = sorted(handler.paths());
        assert!(!paths.iter().any(|path| path.contains("/.")));

        let mut handler = CollectingHandler::new();
        walker(&fs, &[])
            .respect_ignore_files(false)
            .exclude_hidden(false)
            .walk(&mut handler)
            .unwrap();
        let paths = sorted(handler.paths());
        assert!(paths.contains(&"/tree/.secret".to_string()));
        assert!(paths.contains(&"/tree/.config/settings".to_string()));
    }

    #[test]
    fn test_hidden_allow_listed_entry_survives() {
        let fs = tree();
        fs.add_dir("/tree/.git");
        fs.add_file("/tree/.gitignore", "!.secret\n");
        fs.add_file("/tree/.secret", "");

        let mut handler = CollectingHandler::new();
        walker(&fs, &[]).walk(&mut handler).unwrap();

        assert!(sorted(handler.paths()).contains(&"/tree/.secret".to_string()));
    }

    #[test]
    fn test_walk_returns_start_path() {
        let fs = tree();
        let mut handler = CollectingHandler::new();
        let start = walker(&fs, &[])
            .respect_ignore_files(false)
            .walk(&mut handler)
            .unwrap();
        assert_eq!(start, PathBuf::from("/tree"));
    }
}
