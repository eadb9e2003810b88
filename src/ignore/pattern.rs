//! Ignore-pattern compilation
//!
//! Transforms one line of an ignore file into a compiled glob plus the
//! negation and directory-only flags that distinguish ignore patterns from
//! plain globs. Comment and blank lines compile to nothing.

use crate::error::MatchingError;
use crate::glob::Glob;

/// A single rule from an ignore file.
#[derive(Debug)]
pub struct IgnorePattern {
    line: String,
    glob: Glob,
    negated: bool,
    dir_only: bool,
}

impl IgnorePattern {
    /// Compiles one ignore-file line. Returns `None` for comments and lines
    /// that are empty after trailing-whitespace removal.
    pub fn parse(line: &str, case_insensitive: bool) -> Result<Option<Self>, MatchingError> {
        if line.starts_with('#') {
            return Ok(None);
        }

        let mut trimmed = trim_trailing(line);
        if trimmed.is_empty() {
            return Ok(None);
        }

        let mut negated = false;
        let mut dir_only = false;
        let mut absolute = false;

        if trimmed.starts_with("\\!") || trimmed.starts_with("\\#") {
            // The escape keeps the `!` or `#` as pattern text.
            trimmed = &trimmed[1..];
            absolute = trimmed.starts_with('/');
        } else {
            if let Some(rest) = trimmed.strip_prefix('!') {
                negated = true;
                trimmed = rest;
            }
            if let Some(rest) = trimmed.strip_prefix('/') {
                // A leading slash anchors the pattern to the ignore file's
                // directory.
                absolute = true;
                trimmed = rest;
            }
        }

        if let Some(rest) = trimmed.strip_suffix('/') {
            dir_only = true;
            trimmed = rest;
            // An escaped trailing slash leaves its backslash behind.
            if let Some(rest) = trimmed.strip_suffix('\\') {
                trimmed = rest;
            }
        }

        let mut body = trimmed.to_string();

        // A pattern without a slash matches at any depth; anchor-free
        // patterns get an explicit recursive prefix.
        if !absolute && !body.contains('/') && !body.starts_with("**/") && body != "**" {
            body.insert_str(0, "**/");
        }

        // `dir/**` should match the contents of the directory but not the
        // directory itself, which a bare recursive suffix would.
        if body.ends_with("/**") {
            body.push_str("/*");
        }

        let glob = Glob::with_case_insensitive(&body, case_insensitive)?;
        Ok(Some(Self {
            line: line.to_string(),
            glob,
            negated,
            dir_only,
        }))
    }

    /// The original line the pattern was compiled from.
    pub fn line(&self) -> &str {
        &self.line
    }

    /// Whether the rule allow-lists instead of ignoring.
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Whether the rule applies to directories only.
    pub fn is_dir_only(&self) -> bool {
        self.dir_only
    }

    pub(crate) fn glob_matches(&self, prepared: &str) -> bool {
        self.glob.matches_str(prepared)
    }

    #[cfg(test)]
    pub(crate) fn glob_pattern(&self) -> &str {
        self.glob.pattern()
    }
}

impl PartialEq for IgnorePattern {
    fn eq(&self, other: &Self) -> bool {
        self.line == other.line
    }
}

impl Eq for IgnorePattern {}

/// Strips trailing whitespace unless it is escaped with a backslash. Only
/// the escaped character survives, not the whitespace after it.
pub(crate) fn trim_trailing(line: &str) -> &str {
    let chars: Vec<char> = line.chars().collect();
    for (index, ch) in chars.iter().enumerate().rev() {
        let escaped = index > 0 && chars[index - 1] == '\\';
        if !ch.is_whitespace() || escaped {
            let end: usize = chars[..=index].iter().map(|c| c.len_utf8()).sum();
            return &line[..end];
        }
    }
    ""
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(line: &str) -> IgnorePattern {
        IgnorePattern::parse(line, false).unwrap().unwrap()
    }

    #[test]
    fn test_trim_trailing() {
        assert_eq!(trim_trailing(""), "");
        assert_eq!(trim_trailing("   "), "");
        assert_eq!(trim_trailing("foo/bar"), "foo/bar");
        assert_eq!(trim_trailing("foo/bar    "), "foo/bar");
        assert_eq!(trim_trailing("foo/bar abc"), "foo/bar abc");
        assert_eq!(trim_trailing("foo/bar\\    "), "foo/bar\\ ");
    }

    #[test]
    fn test_comments_and_blanks_are_skipped() {
        assert!(IgnorePattern::parse("# a comment", false).unwrap().is_none());
        assert!(IgnorePattern::parse("", false).unwrap().is_none());
        assert!(IgnorePattern::parse("   ", false).unwrap().is_none());
    }

    #[test]
    fn test_bare_name_gains_recursive_prefix() {
        assert_eq!(pattern("target").glob_pattern(), "**/target");
        assert_eq!(pattern("*.lock").glob_pattern(), "**/*.lock");
        // Already-recursive patterns are left alone.
        assert_eq!(pattern("**").glob_pattern(), "**");
        assert_eq!(pattern("**/foo").glob_pattern(), "**/foo");
        // A slash means the pattern matches the whole relative path.
        assert_eq!(pattern("src/*.rs").glob_pattern(), "src/*.rs");
    }

    #[test]
    fn test_negation_flag() {
        let rule = pattern("!keep.txt");
        assert!(rule.is_negated());
        assert_eq!(rule.glob_pattern(), "**/keep.txt");
        assert!(!pattern("keep.txt").is_negated());
    }

    #[test]
    fn test_anchored_pattern() {
        let rule = pattern("/*.c");
        assert_eq!(rule.glob_pattern(), "*.c");
        let rule = pattern("/src/*.rs");
        assert_eq!(rule.glob_pattern(), "src/*.rs");
        // Negation and anchoring combine.
        let rule = pattern("!/src/main.rs");
        assert!(rule.is_negated());
        assert_eq!(rule.glob_pattern(), "src/main.rs");
    }

    #[test]
    fn test_dir_only_flag() {
        let rule = pattern("foo/");
        assert!(rule.is_dir_only());
        assert_eq!(rule.glob_pattern(), "**/foo");

        // Escaped trailing slash still marks dir-only, minus the escape.
        let rule = pattern("foo\\/");
        assert!(rule.is_dir_only());
        assert_eq!(rule.glob_pattern(), "**/foo");

        // Unescaped trailing whitespace is trimmed first.
        let rule = pattern("node_modules/ ");
        assert!(rule.is_dir_only());
        assert_eq!(rule.glob_pattern(), "**/node_modules");
    }

    #[test]
    fn test_escaped_leading_bang_and_hash() {
        let rule = pattern("\\!xy");
        assert!(!rule.is_negated());
        assert_eq!(rule.glob_pattern(), "**/!xy");

        let rule = pattern("\\#foo");
        assert_eq!(rule.glob_pattern(), "**/#foo");
    }

    #[test]
    fn test_contents_only_suffix() {
        assert_eq!(pattern("abc/**").glob_pattern(), "abc/**/*");
        assert_eq!(pattern("**/dir2a/**").glob_pattern(), "**/dir2a/**/*");
    }

    #[test]
    fn test_equality_is_on_source_line() {
        assert_eq!(pattern("foo"), pattern("foo"));
        assert_ne!(pattern("foo"), pattern("bar"));
    }

    #[test]
    fn test_invalid_glob_propagates() {
        assert!(IgnorePattern::parse("[z-a]", false).is_err());
    }
}
