//! Glob compilation and matching
//!
//! A [`Glob`] owns a pattern string together with one of two matcher shapes:
//! a plain string comparison for patterns that contain no wildcards, or a
//! compiled regular expression for everything else. Matching is always
//! performed against the `/`-separated string form of a path, so patterns
//! behave identically on every platform.
//!
//! A glob differs from an ignore pattern: the latter layers negation and
//! directory-only semantics on top of a glob (see [`crate::ignore`]).

mod escape;
mod parser;

pub(crate) use parser::{Parser, Token};

use std::fmt;
use std::path::Path;

use crate::error::MatchingError;
use crate::path_util;

/// A compiled glob pattern.
#[derive(Debug)]
pub struct Glob {
    pattern: String,
    matcher: Matcher,
}

#[derive(Debug)]
enum Matcher {
    /// Whole-string comparison. Chosen only for non-empty, case-sensitive,
    /// wildcard-free patterns.
    Literal(String),
    /// Compiled expression produced by [`translate`].
    Regex(regex::bytes::Regex),
}

impl Glob {
    /// Compiles a case-sensitive glob.
    pub fn new(pattern: &str) -> Result<Self, MatchingError> {
        Self::with_case_insensitive(pattern, false)
    }

    /// Compiles a glob, optionally folding ASCII case during matching.
    pub fn with_case_insensitive(
        pattern: &str,
        case_insensitive: bool,
    ) -> Result<Self, MatchingError> {
        let tokens = Parser::new(pattern).parse()?;

        let all_literal = tokens
            .iter()
            .all(|token| matches!(token, Token::Literal(_)));
        let matcher = if !case_insensitive && all_literal && !tokens.is_empty() {
            let literal = tokens
                .iter()
                .map(|token| match token {
                    Token::Literal(ch) => *ch,
                    _ => unreachable!("checked literal"),
                })
                .collect();
            Matcher::Literal(literal)
        } else {
            let expression = translate(&tokens, case_insensitive);
            let regex = regex::bytes::Regex::new(&expression).map_err(|source| {
                MatchingError::Regex {
                    expression: expression.clone(),
                    source,
                }
            })?;
            Matcher::Regex(regex)
        };

        Ok(Self {
            pattern: pattern.to_string(),
            matcher,
        })
    }

    /// The original pattern text.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Whether the path's string form matches this glob.
    pub fn matches(&self, path: &Path) -> bool {
        self.matches_str(&path_util::to_match_string(path))
    }

    pub(crate) fn matches_str(&self, text: &str) -> bool {
        match &self.matcher {
            Matcher::Literal(literal) => literal == text,
            Matcher::Regex(regex) => regex.is_match(text.as_bytes()),
        }
    }

    #[cfg(test)]
    fn is_literal(&self) -> bool {
        matches!(self.matcher, Matcher::Literal(_))
    }

    #[cfg(test)]
    fn regex_text(&self) -> Option<&str> {
        match &self.matcher {
            Matcher::Literal(_) => None,
            Matcher::Regex(regex) => Some(regex.as_str()),
        }
    }
}

impl fmt::Display for Glob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

impl PartialEq for Glob {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl Eq for Glob {}

/// Renders the token sequence as a regular expression.
///
/// Unicode mode is disabled so `[^/]` means "any byte but the separator"
/// and case folding, when requested, stays ASCII-only.
fn translate(tokens: &[Token], case_insensitive: bool) -> String {
    let mut expression = String::from("(?-u)");
    if case_insensitive {
        expression.push_str("(?i)");
    }
    expression.push('^');

    if matches!(tokens, [Token::RecursivePrefix]) {
        expression.push_str(".*");
    } else {
        for token in tokens {
            match token {
                Token::Literal(ch) => expression.push_str(&escape::escape(*ch)),
                Token::Any => expression.push_str("[^/]"),
                Token::ZeroOrMore => expression.push_str("[^/]*"),
                Token::RecursivePrefix => expression.push_str("(?:/?|.*/)"),
                Token::RecursiveSuffix => expression.push_str("/.*"),
                Token::RecursiveZeroOrMore => expression.push_str("(?:/|/.*/)"),
                Token::CharClass { negated, ranges } => {
                    expression.push('[');
                    if *negated {
                        expression.push('^');
                    }
                    for range in ranges {
                        if range.start == range.end {
                            expression.push_str(&escape::escape_char_class(range.start));
                        } else {
                            expression.push_str(&escape::escape_char_class(range.start));
                            expression.push('-');
                            expression.push_str(&escape::escape_char_class(range.end));
                        }
                    }
                    expression.push(']');
                }
            }
        }
    }

    expression.push('$');
    expression
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glob(pattern: &str) -> Glob {
        Glob::new(pattern).unwrap()
    }

    fn glob_ci(pattern: &str) -> Glob {
        Glob::with_case_insensitive(pattern, true).unwrap()
    }

    #[test]
    fn test_literal_matcher_selection() {
        for pattern in ["a", "/a", "/a/", "/a/b", "a/b"] {
            assert!(glob(pattern).is_literal(), "{pattern:?} should be literal");
        }
        for pattern in ["*.a", "**/a/b", "a?b", "[ab]"] {
            assert!(!glob(pattern).is_literal(), "{pattern:?} should be regex");
        }
        // Case folding forces the regex shape even for pure literals.
        for pattern in ["a", "/a/b", "a/b"] {
            assert!(!glob_ci(pattern).is_literal());
        }
    }

    #[test]
    fn test_regex_translation() {
        let cases = [
            ("?", "(?-u)^[^/]$"),
            ("*", "(?-u)^[^/]*$"),
            ("a?", "(?-u)^a[^/]$"),
            ("?a", "(?-u)^[^/]a$"),
            ("a*", "(?-u)^a[^/]*$"),
            ("*a", "(?-u)^[^/]*a$"),
            ("[*]", "(?-u)^[*]$"),
            ("[+]", "(?-u)^[+]$"),
            ("**", "(?-u)^.*$"),
            ("**/", "(?-u)^.*$"),
            ("**/*", "(?-u)^(?:/?|.*/)[^/]*$"),
            ("**/**", "(?-u)^.*$"),
            ("**/**/*", "(?-u)^(?:/?|.*/)[^/]*$"),
            ("a/**", "(?-u)^a/.*$"),
            ("a/**/**", "(?-u)^a/.*$"),
            ("a/**/b", "(?-u)^a(?:/|/.*/)b$"),
            ("a/**/**/b", "(?-u)^a(?:/|/.*/)b$"),
            ("**/b", "(?-u)^(?:/?|.*/)b$"),
            ("a**", "(?-u)^a[^/]*[^/]*$"),
            ("**a", "(?-u)^[^/]*[^/]*a$"),
            ("a**b", "(?-u)^a[^/]*[^/]*b$"),
            ("***", "(?-u)^[^/]*[^/]*[^/]*$"),
            ("/a**", "(?-u)^/a[^/]*[^/]*$"),
            ("/**a", "(?-u)^/[^/]*[^/]*a$"),
            ("[a-z]", "(?-u)^[a-z]$"),
            ("[!a-z]", "(?-u)^[^a-z]$"),
        ];
        for (pattern, expected) in cases {
            assert_eq!(
                glob(pattern).regex_text(),
                Some(expected),
                "pattern {pattern:?}"
            );
        }
    }

    #[test]
    fn test_regex_translation_case_insensitive() {
        assert_eq!(glob_ci("a").regex_text(), Some("(?-u)(?i)^a$"));
        assert_eq!(glob_ci("+").regex_text(), Some("(?-u)(?i)^\\+$"));
        assert_eq!(
            glob_ci("\u{1234}").regex_text(),
            Some("(?-u)(?i)^\\xe1\\x88\\xb4$")
        );
    }

    #[test]
    fn test_non_ascii_literals_with_wildcards() {
        assert_eq!(
            glob("*\u{2603}").regex_text(),
            Some("(?-u)^[^/]*\\xe2\\x98\\x83$")
        );
        assert!(glob("*\u{2603}").matches(Path::new("snow\u{2603}")));
        assert!(!glob("*\u{2603}").matches(Path::new("snowman")));
    }

    #[test]
    fn test_matching_positive() {
        let cases = [
            ("a", "a"),
            ("a*b", "a_b"),
            ("a*b*c", "abc"),
            ("a*b*c", "a_b_c"),
            ("a*b*c", "a___b___c"),
            ("abc*abc*abc", "abcabcabcabcabcabcabc"),
            ("a*a*a*a*a*a*a*a*a", "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"),
            ("a*b[xyz]c*d", "abxcdbxcddd"),
            ("*.rs", ".rs"),
            ("*.rs", "foo.rs"),
            ("\u{2603}", "\u{2603}"),
            ("some/**/needle.txt", "some/needle.txt"),
            ("some/**/needle.txt", "some/one/needle.txt"),
            ("some/**/needle.txt", "some/one/two/needle.txt"),
            ("some/**/**/needle.txt", "some/one/two/needle.txt"),
            ("**", "abcde"),
            ("**", ""),
            ("**", ".asdf"),
            ("**", "/x/.asdf"),
            ("**/test", "one/two/test"),
            ("**/test", "test"),
            ("/**/test", "/one/two/test"),
            ("/**/test", "/test"),
            ("**/.*", ".abc"),
            ("**/.*", "abc/.abc"),
            ("**/foo/bar", "foo/bar"),
            (".*/**", ".abc/abc"),
            ("test/**", "test/one"),
            ("test/**", "test/one/two"),
            ("some/*/needle.txt", "some/one/needle.txt"),
            ("a[0-9]b", "a0b"),
            ("a[!0-9]b", "a_b"),
            ("[a-z123]", "1"),
            ("[abc-]", "-"),
            ("[-abc]", "-"),
            ("[-]", "-"),
            ("a[^0-9]b", "a_b"),
            ("*hello.txt", "hello.txt"),
            ("*hello.txt", "gareth_says_hello.txt"),
            ("*some/path/to/hello.txt", "some/path/to/hello.txt"),
            ("_[[]_[]]_[?]_[*]_!_", "_[_]_?_*_!_"),
            ("a,b", "a,b"),
            ("\\a", "a"),
        ];
        for (pattern, path) in cases {
            assert!(
                glob(pattern).matches(Path::new(path)),
                "{pattern:?} should match {path:?}"
            );
        }
    }

    #[test]
    fn test_matching_negative() {
        let cases = [
            ("test/**", "test/"),
            ("*hello.txt", "some/path/to/hello.txt"),
            ("*hello.txt", "/an/absolute/path/to/hello.txt"),
            ("*some/path/to/hello.txt", "a/bigger/some/path/to/hello.txt"),
            ("a*b*c", "abcd"),
            ("abc*abc*abc", "abcabcabcabcabcabcabca"),
            ("some/**/needle.txt", "some/other/notthis.txt"),
            ("/**/test", "test"),
            ("/**/test", "/one/notthis"),
            ("**/.*", "ab.c"),
            ("**/.*", "abc/ab.c"),
            (".*/**", "a.bc"),
            (".*/**", ".abc"),
            ("a[0-9]b", "a_b"),
            ("a[!0-9]b", "a0b"),
            ("[!-]", "-"),
            ("[^-]", "-"),
            ("*hello.txt", "hello.txt-and-then-some"),
            ("*hello.txt", "goodbye.txt"),
            ("a", "foo/a"),
            ("./foo", "foo"),
            ("**/foo", "foofoo"),
            ("**/foo/bar", "foofoo/bar"),
            ("/*.c", "mozilla-sha1/sha1.c"),
            ("*.c", "mozilla-sha1/sha1.c"),
            ("a[^0-9]b", "a0b"),
            ("some/*/needle.txt", "some/needle.txt"),
            ("some/*/needle.txt", "some/one/two/needle.txt"),
            ("foo/**", "foo"),
        ];
        for (pattern, path) in cases {
            assert!(
                !glob(pattern).matches(Path::new(path)),
                "{pattern:?} should not match {path:?}"
            );
        }
    }

    #[test]
    fn test_matching_case_insensitive() {
        for path in ["aBcDeFg", "abcdefg", "ABCDEFG", "AbCdEfG"] {
            assert!(glob_ci("aBcDeFg").matches(Path::new(path)));
        }
        assert!(glob_ci("a").matches(Path::new("A")));
        assert!(!glob("a").matches(Path::new("A")));
    }

    #[test]
    fn test_pattern_accessors_and_equality() {
        let first = glob("*.rs");
        assert_eq!(first.pattern(), "*.rs");
        assert_eq!(first.to_string(), "*.rs");
        assert_eq!(first, glob("*.rs"));
        assert_ne!(first, glob("*.go"));
    }
}
