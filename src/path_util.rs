//! Path utilities
//!
//! Small helpers shared by the ignore engine and the walker: segment-aligned
//! prefix removal, conversion of paths to the `/`-separated string form that
//! globs match against, and the hidden-entry convention.

use std::path::{Component, Path, PathBuf};

/// Removes `prefix` from the front of `path`.
///
/// The prefix must cover complete path segments: `"foo"` strips from
/// `foo/bar/x` but not from `foobar/x`. If the prefix does not match, or
/// stripping it would leave nothing, the path is returned unchanged.
pub(crate) fn remove_prefix(prefix: &Path, path: &Path) -> PathBuf {
    match path.strip_prefix(prefix) {
        Ok(stripped) if !stripped.as_os_str().is_empty() => stripped.to_path_buf(),
        _ => path.to_path_buf(),
    }
}

/// Renders a path in the `/`-separated form used for glob matching,
/// regardless of the platform's native separator. Joining the parsed
/// components also normalises redundant and trailing separators, so
/// `test/` matches as `test`.
pub(crate) fn to_match_string(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => out.push_str(&prefix.as_os_str().to_string_lossy()),
            Component::RootDir => out.push('/'),
            Component::CurDir => push_segment(&mut out, "."),
            Component::ParentDir => push_segment(&mut out, ".."),
            Component::Normal(name) => push_segment(&mut out, &name.to_string_lossy()),
        }
    }
    out
}

fn push_segment(out: &mut String, segment: &str) {
    if !out.is_empty() && !out.ends_with('/') {
        out.push('/');
    }
    out.push_str(segment);
}

/// Reports whether the entry's final component is hidden by the leading-dot
/// convention. `.` and `..` are navigation, not hidden entries.
pub(crate) fn is_hidden(path: &Path) -> bool {
    match path.components().next_back() {
        Some(Component::Normal(name)) => name.to_string_lossy().starts_with('.'),
        _ => false,
    }
}

/// Replaces a leading `~/` with the given home directory. Anything else is
/// returned unchanged, including a bare `~user` form.
pub(crate) fn expand_tilde(text: &str, home: Option<&Path>) -> PathBuf {
    if let (Some(rest), Some(home)) = (text.strip_prefix("~/"), home) {
        home.join(rest)
    } else {
        PathBuf::from(text)
    }
}
