//! Per-entry match decisions
//!
//! The visitor owns the ignore-context stack and applies the precedence
//! chain for every directory and file the driver presents: include matcher
//! first, then the active ignore sets (innermost first, then the base sets
//! discovered above the start directory), then the hidden policy, and
//! finally the handler callback.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::MatchingError;
use crate::filesystem::{EntryAttributes, FileSystem};
use crate::gitconfig::GitConfig;
use crate::handler::MatchHandler;
use crate::ignore::{IgnoreSet, IgnoreVerdict};
use crate::path_util;
use crate::repo::{self, ProcessEnv};

/// Traversal directive returned by each visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    SkipSubtree,
    Terminate,
}

/// One directory frame: the ignore sets in force and whether the frame is
/// inside a repository work tree. The work-tree bit is sticky on descent.
struct WalkContext {
    work_tree: bool,
    ignores: Vec<Arc<IgnoreSet>>,
}

pub(crate) struct MatchVisitor<'a> {
    fs: &'a dyn FileSystem,
    env: &'a ProcessEnv,
    handler: &'a mut dyn MatchHandler,
    match_patterns: &'a [String],
    exclude_hidden: bool,
    respect_ignore_files: bool,
    initialized: bool,
    case_insensitive: bool,
    /// Include patterns compiled as an ignore set; verdicts are inverted.
    matcher: Option<IgnoreSet>,
    /// Ignore sets discovered above the start directory, plus the global one.
    base_ignores: Vec<Arc<IgnoreSet>>,
    /// Work-tree seed from the ancestor scan, applied to the first frame.
    seed_work_tree: bool,
    context_stack: Vec<WalkContext>,
}

impl<'a> MatchVisitor<'a> {
    pub fn new(
        fs: &'a dyn FileSystem,
        env: &'a ProcessEnv,
        handler: &'a mut dyn MatchHandler,
        match_patterns: &'a [String],
        exclude_hidden: bool,
        respect_ignore_files: bool,
    ) -> Self {
        Self {
            fs,
            env,
            handler,
            match_patterns,
            exclude_hidden,
            respect_ignore_files,
            initialized: false,
            case_insensitive: false,
            matcher: None,
            base_ignores: Vec::new(),
            seed_work_tree: false,
            context_stack: Vec::new(),
        }
    }

    /// One-time setup at the first visited entry: read the global config,
    /// compile the include patterns, and scan the ancestors of `root` for
    /// ignore files and a repository marker.
    fn initialize(&mut self, root: &Path) -> Result<(), MatchingError> {
        self.initialized = true;

        let config = self.load_global_config()?;
        self.case_insensitive = config.boolean("core", "ignoreCase", false)?;

        self.matcher = if self.match_patterns.is_empty() {
            None
        } else {
            Some(IgnoreSet::from_lines(
                root,
                self.match_patterns,
                self.case_insensitive,
            )?)
        };

        if !self.respect_ignore_files {
            return Ok(());
        }

        // Ascend towards the filesystem root collecting candidate ignore
        // files; stop at the directory containing the repository marker.
        // Nothing is read unless the marker is actually found.
        let mut candidates: Vec<(&Path, std::path::PathBuf)> = Vec::new();
        let mut ancestor = root.parent();
        while let Some(dir) = ancestor {
            if let Some(file) = repo::local_ignore_file(self.fs, dir) {
                candidates.push((dir, file));
            }

            if repo::contains_repo_marker(self.fs, dir) {
                self.seed_work_tree = true;
                if let Some(file) = repo::repo_exclude_file(self.fs, dir) {
                    candidates.push((dir, file));
                }
                debug!(work_tree_root = %dir.display(), "found repository above start");
                break;
            }

            ancestor = dir.parent();
        }

        if self.seed_work_tree {
            for (dir, file) in candidates {
                self.base_ignores.push(Arc::new(IgnoreSet::from_file(
                    self.fs,
                    dir,
                    &file,
                    self.case_insensitive,
                )?));
            }
        }

        if let Some(value) = config.string("core", "excludesFile") {
            let excludes = self.env.expand_tilde(value);
            if self.fs.is_readable_file(&excludes) {
                let excludes_root = excludes.parent().unwrap_or_else(|| Path::new(""));
                debug!(file = %excludes.display(), "loading global excludes file");
                self.base_ignores.push(Arc::new(IgnoreSet::from_file(
                    self.fs,
                    excludes_root,
                    &excludes,
                    self.case_insensitive,
                )?));
            }
        }

        Ok(())
    }

    /// An unreadable global config degrades to defaults; a malformed one is
    /// a real error.
    fn load_global_config(&self) -> Result<GitConfig, MatchingError> {
        match repo::find_global_config_file(self.fs, self.env) {
            None => Ok(GitConfig::empty()),
            Some(path) => match GitConfig::from_file(self.fs, self.env, &path) {
                Ok(config) => Ok(config),
                Err(MatchingError::Io { .. }) => Ok(GitConfig::empty()),
                Err(other) => Err(other),
            },
        }
    }

    pub fn pre_visit_directory(
        &mut self,
        dir: &Path,
        attrs: &EntryAttributes,
    ) -> Result<Flow, MatchingError> {
        let mut work_tree = false;

        if !self.initialized {
            self.initialize(dir)?;
            work_tree = self.seed_work_tree;
        }

        let mut context = WalkContext {
            work_tree: false,
            ignores: Vec::new(),
        };

        if self.respect_ignore_files {
            let repo_root = repo::contains_repo_marker(self.fs, dir);
            if let Some(parent) = self.context_stack.last() {
                work_tree = work_tree || parent.work_tree;
            }
            work_tree = work_tree || repo_root;

            // Ignore files outside a work tree are never read, let alone
            // consulted.
            if work_tree {
                if let Some(file) = repo::local_ignore_file(self.fs, dir) {
                    context.ignores.push(Arc::new(IgnoreSet::from_file(
                        self.fs,
                        dir,
                        &file,
                        self.case_insensitive,
                    )?));
                }
                if repo_root {
                    if let Some(file) = repo::repo_exclude_file(self.fs, dir) {
                        context.ignores.push(Arc::new(IgnoreSet::from_file(
                            self.fs,
                            dir,
                            &file,
                            self.case_insensitive,
                        )?));
                    }
                }
            }

            if let Some(parent) = self.context_stack.last() {
                context.ignores.extend(parent.ignores.iter().cloned());
            }
            context.work_tree = work_tree;
        }

        // An explicitly negated include pattern prunes the directory.
        if let Some(matcher) = &self.matcher {
            if matcher.matches(dir, true) == IgnoreVerdict::Allow {
                trace!(dir = %dir.display(), "subtree excluded by include patterns");
                return Ok(Flow::SkipSubtree);
            }
        }

        let mut allowed = false;

        if self.respect_ignore_files && context.work_tree {
            for ignores in context.ignores.iter().chain(self.base_ignores.iter()) {
                match ignores.matches(dir, true) {
                    IgnoreVerdict::Ignore => {
                        trace!(dir = %dir.display(), "subtree ignored");
                        return Ok(Flow::SkipSubtree);
                    }
                    IgnoreVerdict::Allow => allowed = true,
                    IgnoreVerdict::None => {}
                }
            }
        }

        if path_util::is_hidden(dir) && self.exclude_hidden && !allowed {
            trace!(dir = %dir.display(), "hidden subtree skipped");
            return Ok(Flow::SkipSubtree);
        }

        // The directory callback fires only when the directory itself is in
        // the caller's requested set.
        let emit = match &self.matcher {
            None => true,
            Some(matcher) => matcher.matches(dir, true) == IgnoreVerdict::Ignore,
        };
        if emit && !self.report_directory(dir, attrs)? {
            self.context_stack.clear();
            return Ok(Flow::Terminate);
        }

        self.context_stack.push(context);
        Ok(Flow::Continue)
    }

    pub fn visit_file(
        &mut self,
        file: &Path,
        attrs: &EntryAttributes,
    ) -> Result<Flow, MatchingError> {
        // Directories surface here when the depth bound stops descent; they
        // are not files and are not reported.
        if attrs.is_dir {
            return Ok(Flow::Continue);
        }

        if !self.initialized {
            // The walk started directly on a file.
            let root = file.parent().unwrap_or_else(|| Path::new(""));
            self.initialize(root)?;
        }

        if let Some(matcher) = &self.matcher {
            if matcher.matches(file, false) != IgnoreVerdict::Ignore {
                return Ok(Flow::Continue);
            }
        }

        let mut allowed = false;

        if self.respect_ignore_files {
            let work_tree = self
                .context_stack
                .last()
                .map_or(self.seed_work_tree, |context| context.work_tree);
            if work_tree {
                let frame_ignores = self
                    .context_stack
                    .last()
                    .map_or(&[][..], |context| context.ignores.as_slice());
                for ignores in frame_ignores.iter().chain(self.base_ignores.iter()) {
                    match ignores.matches(file, false) {
                        IgnoreVerdict::Ignore => {
                            trace!(file = %file.display(), "file ignored");
                            return Ok(Flow::Continue);
                        }
                        IgnoreVerdict::Allow => allowed = true,
                        IgnoreVerdict::None => {}
                    }
                }
            }
        }

        if path_util::is_hidden(file) && self.exclude_hidden && !allowed {
            return Ok(Flow::Continue);
        }

        if !self.report_file(file, attrs)? {
            self.context_stack.clear();
            return Ok(Flow::Terminate);
        }

        Ok(Flow::Continue)
    }

    pub fn post_visit_directory(&mut self) {
        self.context_stack.pop();
    }

    fn report_directory(
        &mut self,
        dir: &Path,
        attrs: &EntryAttributes,
    ) -> Result<bool, MatchingError> {
        self.handler.directory(dir, attrs)
    }

    fn report_file(&mut self, file: &Path, attrs: &EntryAttributes) -> Result<bool, MatchingError> {
        self.handler.file(file, attrs)
    }
}
