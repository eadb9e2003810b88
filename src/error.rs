//! Crate-wide error type
//!
//! All matching, parsing, and traversal failures surface as a single
//! `MatchingError` so callers have one condition to handle at the walk
//! boundary. Underlying I/O and regex errors are preserved as sources.

use std::path::PathBuf;
use thiserror::Error;

/// Error raised while compiling patterns, reading configuration, or walking
/// the file tree.
#[derive(Debug, Error)]
pub enum MatchingError {
    /// A glob pattern ended in the middle of a backslash escape.
    #[error("Incomplete escape in pattern \"{pattern}\"")]
    IncompleteEscape { pattern: String },

    /// A `[...]` character class was missing its closing bracket.
    #[error("Character class not closed in pattern \"{pattern}\"")]
    UnclosedCharClass { pattern: String },

    /// A character class contained a range whose end precedes its start.
    #[error("Invalid character range in pattern \"{pattern}\"")]
    InvalidCharRange { pattern: String },

    /// The translated glob could not be compiled by the regex backend.
    #[error("Could not create regular expression \"{expression}\"")]
    Regex {
        expression: String,
        #[source]
        source: regex::Error,
    },

    /// Config `include.path` directives nested beyond the allowed depth.
    #[error("Too many include recursions")]
    TooManyIncludes,

    /// The config file ended inside a construct that required more input.
    #[error("Unexpected end of config file")]
    UnexpectedConfigEnd,

    /// A `[section]` header was malformed.
    #[error("Bad group header")]
    BadGroupHeader,

    /// The characters between a key name and its value were not a valid
    /// delimiter.
    #[error("Bad entry delimiter")]
    BadEntryDelimiter,

    /// A config key contained a disallowed character.
    #[error("Bad entry name: {name}")]
    BadEntryName { name: String },

    /// A config section name contained a disallowed character.
    #[error("Bad section name: {name}")]
    BadSectionName { name: String },

    /// A quoted config value ran into a raw newline.
    #[error("Newline in quotes not allowed")]
    NewlineInQuotes,

    /// The config file ended immediately after a backslash.
    #[error("End of file in escape")]
    EndOfFileInEscape,

    /// A backslash escape in a config value was not recognised.
    #[error("Bad escape: {escape}")]
    BadEscape { escape: String },

    /// A config line appeared outside any section, or an `include` entry was
    /// not of the form `path = ...`.
    #[error("Invalid line in config file: {line}")]
    InvalidConfigLine { line: String },

    /// A config value could not be interpreted as a boolean.
    #[error("Invalid boolean value \"{value}\"")]
    InvalidBoolean { value: String },

    /// A file named by the configuration exists but could not be read.
    #[error("Cannot read file {}", path.display())]
    CannotReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An I/O failure during traversal or while loading an ignore file.
    #[error("Could not read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Following symbolic links led back into a directory already being
    /// traversed.
    #[error("File system loop detected at {}", path.display())]
    FilesystemLoop { path: PathBuf },

    /// A handler reported a failure; the walk stops and the error is passed
    /// through to the caller.
    #[error("Handler failed at {}", path.display())]
    Handler {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl MatchingError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MatchingError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_keep_context() {
        let err = MatchingError::UnclosedCharClass {
            pattern: "[a-".to_string(),
        };
        assert_eq!(err.to_string(), "Character class not closed in pattern \"[a-\"");

        let err = MatchingError::io("/no/such", std::io::Error::other("denied"));
        assert_eq!(err.to_string(), "Could not read /no/such");
    }

    #[test]
    fn test_source_chain_preserved() {
        use std::error::Error;

        let err = MatchingError::io("/no/such", std::io::Error::other("denied"));
        assert!(err.source().is_some());
    }
}
