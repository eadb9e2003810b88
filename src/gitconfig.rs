//! Minimal git-config reader
//!
//! Parses just enough of the configuration grammar to answer the two
//! questions the walker asks: where is the user's global excludes file, and
//! is matching case-insensitive. Section and key lookups fold case,
//! subsection names and values keep theirs. `include.path` directives are
//! followed to a fixed depth. Every other key is parsed and ignored.

use std::path::{Path, PathBuf};

use crate::cursor::CharCursor;
use crate::error::MatchingError;
use crate::filesystem::FileSystem;
use crate::repo::ProcessEnv;

const MAX_INCLUDE_DEPTH: usize = 10;

/// One parsed line of a configuration file. Lines that set no key still
/// occupy an entry so section state threads through the file in order.
#[derive(Debug, Default, Clone)]
struct ConfigLine {
    section: Option<String>,
    subsection: Option<String>,
    name: Option<String>,
    /// `None` when the line has a `=` with nothing after it; `Some("")` when
    /// the key appears without `=` at all, which reads as boolean true.
    value: Option<String>,
}

impl ConfigLine {
    fn matches(&self, section: &str, subsection: Option<&str>, name: &str) -> bool {
        fn eq_fold(a: Option<&str>, b: &str) -> bool {
            a.is_some_and(|a| a.eq_ignore_ascii_case(b))
        }

        eq_fold(self.section.as_deref(), section)
            && self.subsection.as_deref() == subsection
            && eq_fold(self.name.as_deref(), name)
    }

    fn render(&self) -> String {
        let Some(section) = &self.section else {
            return "<empty>".to_string();
        };
        let mut text = section.clone();
        if let Some(subsection) = &self.subsection {
            text.push('.');
            text.push_str(subsection);
        }
        if let Some(name) = &self.name {
            text.push('.');
            text.push_str(name);
        }
        if let Some(value) = &self.value {
            text.push('=');
            text.push_str(value);
        }
        text
    }
}

/// A parsed configuration, queried by section/key.
#[derive(Debug, Default)]
pub struct GitConfig {
    entries: Vec<ConfigLine>,
}

impl GitConfig {
    /// An empty configuration; every lookup yields its default.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Reads and parses a configuration file.
    pub fn from_file(
        fs: &dyn FileSystem,
        env: &ProcessEnv,
        path: &Path,
    ) -> Result<Self, MatchingError> {
        let text = fs.read_to_string(path)?;
        Self::from_text(fs, env, path, &text)
    }

    /// Parses configuration text. `config_path` anchors relative
    /// `include.path` targets.
    pub fn from_text(
        fs: &dyn FileSystem,
        env: &ProcessEnv,
        config_path: &Path,
        text: &str,
    ) -> Result<Self, MatchingError> {
        let mut config = Self::default();
        config.parse_text(fs, env, config_path, text, 1)?;
        Ok(config)
    }

    /// The last value set for `section.name`, if any.
    pub fn string(&self, section: &str, name: &str) -> Option<&str> {
        self.string_in(section, None, name)
    }

    /// The last value set for `section.subsection.name`, if any.
    pub fn string_in(&self, section: &str, subsection: Option<&str>, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.matches(section, subsection, name))
            .and_then(|entry| entry.value.as_deref())
            .filter(|value| !value.is_empty())
    }

    /// The last value of `section.name` interpreted as a boolean.
    ///
    /// Recognises `true|yes|on|1` and `false|no|off|0` without regard to
    /// case; a key present with no value reads as true.
    pub fn boolean(&self, section: &str, name: &str, default: bool) -> Result<bool, MatchingError> {
        match self
            .entries
            .iter()
            .rev()
            .find(|entry| entry.matches(section, None, name))
        {
            None => Ok(default),
            Some(entry) => match entry.value.as_deref() {
                None => Ok(default),
                Some(value) => to_boolean(value),
            },
        }
    }

    fn parse_text(
        &mut self,
        fs: &dyn FileSystem,
        env: &ProcessEnv,
        config_path: &Path,
        text: &str,
        depth: usize,
    ) -> Result<(), MatchingError> {
        if depth > MAX_INCLUDE_DEPTH {
            return Err(MatchingError::TooManyIncludes);
        }

        let mut cursor = CharCursor::new(text);
        let mut last: Option<(String, Option<String>)> = None;
        let mut line = ConfigLine::default();

        loop {
            let Some(ch) = cursor.next() else {
                if line.section.is_some() {
                    self.entries.push(line);
                }
                break;
            };

            if ch == '\n' {
                if let Some(section) = &line.section {
                    last = Some((section.clone(), line.subsection.clone()));
                }
                self.entries.push(std::mem::take(&mut line));
            } else if ch == ' ' || ch == '\t' || ch == '\r' {
                // Indentation and other leading whitespace.
            } else if ch == '[' {
                line.section = Some(read_section_name(&mut cursor)?);
                let mut delimiter = cursor.next();
                if delimiter == Some('"') {
                    line.subsection = Some(read_subsection_name(&mut cursor)?);
                    delimiter = cursor.next();
                }
                if delimiter != Some(']') {
                    return Err(MatchingError::BadGroupHeader);
                }
            } else if ch == ';' || ch == '#' {
                // Comment line; scan to the end of the line.
                while cursor.peek_next().is_some_and(|next| next != '\n') {
                    cursor.next();
                }
            } else if let Some((section, subsection)) = &last {
                line.section = Some(section.clone());
                line.subsection = subsection.clone();
                cursor.prev();

                let mut name = read_key_name(&mut cursor)?;
                if name.ends_with('\n') {
                    name.pop();
                    line.name = Some(name);
                    line.value = Some(String::new());
                } else {
                    line.name = Some(name);
                    line.value = read_value(&mut cursor)?;
                }

                if section.eq_ignore_ascii_case("include") {
                    self.include_config(fs, env, config_path, &line, depth)?;
                }
            } else {
                return Err(MatchingError::InvalidConfigLine {
                    line: line.render(),
                });
            }
        }

        Ok(())
    }

    fn include_config(
        &mut self,
        fs: &dyn FileSystem,
        env: &ProcessEnv,
        config_path: &Path,
        line: &ConfigLine,
        depth: usize,
    ) -> Result<(), MatchingError> {
        let name_is_path = line
            .name
            .as_deref()
            .is_some_and(|name| name.eq_ignore_ascii_case("path"));
        let target = line.value.as_deref().filter(|value| !value.is_empty());
        let Some(target) = target.filter(|_| name_is_path) else {
            return Err(MatchingError::InvalidConfigLine {
                line: line.render(),
            });
        };

        let file = resolve_include(config_path, env, target);

        // A missing include target is silently skipped; an unreadable one is
        // an error.
        if !fs.is_readable_file(&file) {
            return Ok(());
        }
        let text = match fs.read_to_string(&file) {
            Ok(text) => text,
            Err(MatchingError::Io { source, .. }) => {
                return Err(MatchingError::CannotReadFile { path: file, source });
            }
            Err(other) => return Err(other),
        };

        self.parse_text(fs, env, config_path, &text, depth + 1)
    }
}

fn resolve_include(config_path: &Path, env: &ProcessEnv, target: &str) -> PathBuf {
    if target.starts_with("~/") {
        env.expand_tilde(target)
    } else {
        match config_path.parent() {
            Some(parent) => parent.join(target),
            None => PathBuf::from(target),
        }
    }
}

fn to_boolean(value: &str) -> Result<bool, MatchingError> {
    if value.is_empty() {
        return Ok(true);
    }
    let folded = value.to_ascii_lowercase();
    match folded.as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(MatchingError::InvalidBoolean {
            value: value.to_string(),
        }),
    }
}

fn read_section_name(cursor: &mut CharCursor) -> Result<String, MatchingError> {
    let mut name = String::new();

    loop {
        let Some(ch) = cursor.next() else {
            return Err(MatchingError::UnexpectedConfigEnd);
        };

        if ch == ']' {
            cursor.prev();
            break;
        }

        if ch == ' ' || ch == '\t' {
            // Whitespace is only valid before a quoted subsection.
            loop {
                let Some(ch) = cursor.next() else {
                    return Err(MatchingError::UnexpectedConfigEnd);
                };
                if ch == '"' {
                    cursor.prev();
                    break;
                }
                if ch == ' ' || ch == '\t' {
                    continue;
                }
                return Err(MatchingError::BadSectionName { name });
            }
            break;
        }

        if ch.is_alphanumeric() || ch == '.' || ch == '-' {
            name.push(ch);
        } else {
            return Err(MatchingError::BadSectionName { name });
        }
    }

    Ok(name)
}

fn read_key_name(cursor: &mut CharCursor) -> Result<String, MatchingError> {
    let mut name = String::new();

    loop {
        let Some(ch) = cursor.next() else {
            return Err(MatchingError::UnexpectedConfigEnd);
        };

        if ch == '=' {
            break;
        }

        if ch == ' ' || ch == '\t' {
            loop {
                let Some(ch) = cursor.next() else {
                    return Err(MatchingError::UnexpectedConfigEnd);
                };
                if ch == '=' {
                    break;
                }
                if ch == ';' || ch == '#' || ch == '\n' {
                    cursor.prev();
                    break;
                }
                if ch == ' ' || ch == '\t' {
                    continue;
                }
                return Err(MatchingError::BadEntryDelimiter);
            }
            break;
        }

        // Key names are alphanumeric plus dash, compared case-insensitively.
        if ch.is_alphanumeric() || ch == '-' {
            name.push(ch);
        } else if ch == '\n' {
            // Value-less key; the newline marker is stripped by the caller.
            cursor.prev();
            name.push('\n');
            break;
        } else {
            return Err(MatchingError::BadEntryName { name });
        }
    }

    Ok(name)
}

fn read_subsection_name(cursor: &mut CharCursor) -> Result<String, MatchingError> {
    let mut name = String::new();

    loop {
        let Some(ch) = cursor.next() else {
            break;
        };

        if ch == '\n' {
            return Err(MatchingError::NewlineInQuotes);
        }

        if ch == '\\' {
            // Unrecognised escapes simply drop the backslash.
            match cursor.next() {
                None => return Err(MatchingError::EndOfFileInEscape),
                Some(escaped) => {
                    name.push(escaped);
                    continue;
                }
            }
        }

        if ch == '"' {
            break;
        }

        name.push(ch);
    }

    Ok(name)
}

fn read_value(cursor: &mut CharCursor) -> Result<Option<String>, MatchingError> {
    let mut value = String::new();
    let mut trailing = String::new();
    let mut quoted = false;
    let mut leading_space = true;

    loop {
        let Some(ch) = cursor.next() else {
            break;
        };

        if ch == '\n' {
            if quoted {
                return Err(MatchingError::NewlineInQuotes);
            }
            cursor.prev();
            break;
        }

        if !quoted && (ch == ';' || ch == '#') {
            trailing.clear();
            cursor.prev();
            break;
        }

        if ch.is_whitespace() {
            if leading_space {
                continue;
            }
            // Interior whitespace is kept, trailing whitespace dropped; park
            // it until the next non-space character decides.
            trailing.push(ch);
            continue;
        }

        leading_space = false;
        if !trailing.is_empty() {
            value.push_str(&trailing);
            trailing.clear();
        }

        if ch == '\\' {
            let Some(escaped) = cursor.next() else {
                return Err(MatchingError::EndOfFileInEscape);
            };
            match escaped {
                '\n' => continue,
                't' => value.push('\t'),
                'b' => value.push('\u{0008}'),
                'n' => value.push('\n'),
                '\\' => value.push('\\'),
                '"' => value.push('"'),
                other => {
                    if other == '\r' {
                        // CR-LF line continuation.
                        match cursor.next() {
                            Some('\n') => continue,
                            Some(_) => {
                                cursor.prev();
                            }
                            None => {}
                        }
                    }
                    let escape = if other.is_alphabetic() {
                        other.to_string()
                    } else {
                        format!("\\u{:04x}", other as u32)
                    };
                    return Err(MatchingError::BadEscape { escape });
                }
            }
            continue;
        }

        if ch == '"' {
            quoted = !quoted;
            continue;
        }

        value.push(ch);
    }

    Ok(if value.is_empty() { None } else { Some(value) })
}
