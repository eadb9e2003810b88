//! Treematch - pattern-matched filesystem traversal
//!
//! This library walks a directory tree and reports the files and directories
//! whose paths match a set of glob include patterns, optionally honouring
//! hierarchical repository ignore files along the way. Matching is driven by
//! three engines: a glob compiler, an ignore-set evaluator with
//! last-line-wins semantics, and a depth-first walker that stacks ignore
//! contexts per directory.
//!
//! # Architecture
//!
//! The crate follows a ports-and-adapters layout:
//!
//! - **Ports** (abstract interfaces): [`FileSystem`], [`MatchHandler`]
//! - **Adapters**:
//!   - Production: [`PhysicalFs`], [`CollectingHandler`]
//!   - Testing: [`MemoryFs`], plus any handler a test supplies
//! - **Core**: [`Glob`], [`IgnoreSet`], [`GitConfig`], and
//!   [`MatchingWalker`], which depend only on the ports
//!
//! # Example
//!
//! ```rust,no_run
//! use treematch::{CollectingHandler, MatchingWalker};
//!
//! let mut handler = CollectingHandler::files_only();
//! MatchingWalker::new(".", vec!["*.rs".to_string(), "*.toml".to_string()])
//!     .exclude_hidden(true)
//!     .walk(&mut handler)
//!     .unwrap();
//!
//! println!("matched {} files", handler.paths().len());
//! ```

pub mod error;
pub mod filesystem;
pub mod gitconfig;
pub mod glob;
pub mod handler;
pub mod ignore;
pub mod repo;
pub mod walker;

mod cursor;
mod path_util;

// Re-export commonly used types
pub use error::MatchingError;
pub use filesystem::memory::MemoryFs;
pub use filesystem::physical::PhysicalFs;
pub use filesystem::{EntryAttributes, FileSystem};
pub use gitconfig::GitConfig;
pub use glob::Glob;
pub use handler::{CollectingHandler, MatchHandler};
pub use ignore::{IgnorePattern, IgnoreSet, IgnoreVerdict};
pub use repo::ProcessEnv;
pub use walker::MatchingWalker;
