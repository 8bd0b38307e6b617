//! Path manipulation utilities for fs-merger
//!
//! Two path flavors meet here. Roots and resolved locations are host paths
//! (`Path`/`PathBuf`). Paths inside the merged namespace are posix-style
//! strings (`"vendor/lib.js"`), independent of the host separator.

use crate::error::{Error, Result};
use regex::{Captures, Regex};
use std::path::{Component, Path, PathBuf};

/// Lexically normalize a host path.
///
/// Folds `.` components and resolves `..` against preceding normal
/// components. A `..` directly under the root is dropped; leading `..` on a
/// relative path is kept. The filesystem is never consulted.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().map(|c| c.as_os_str()).collect()
}

/// Make `path` absolute (against the current directory) and normalize it.
pub fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(normalize(path))
    } else {
        let cwd = std::env::current_dir()?;
        Ok(normalize(&cwd.join(path)))
    }
}

/// Reject paths that are not relative to the overlay namespace.
///
/// Only absolute or rooted paths are refused. Relative paths containing `..`
/// are composed onto each root as given.
pub fn ensure_relative(relative: &str) -> Result<()> {
    let path = Path::new(relative);
    if path.is_absolute() || path.has_root() || relative.starts_with('/') {
        return Err(Error::invalid_argument(format!(
            "Relative path is expected, path {} is an absolute path. \
             The root path gets prefixed to the relative path provided.",
            relative
        )));
    }
    Ok(())
}

/// Join a namespace-relative path onto a root.
///
/// Trailing separators on `relative` are ignored and an empty `relative`
/// yields the root itself.
pub fn compose(root: &Path, relative: &str) -> PathBuf {
    let trimmed = relative.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() || trimmed == "." {
        root.to_path_buf()
    } else {
        root.join(trimmed)
    }
}

/// Render a relative host path as a posix-style namespace path.
pub fn to_posix(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Join two posix-style namespace paths and normalize the result.
///
/// Empty segments and `.` are dropped, `..` pops the previous segment. An
/// empty result is returned as `"."`.
pub fn join_posix(base: &str, relative: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in base.split('/').chain(relative.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                if matches!(segments.last(), Some(last) if *last != "..") {
                    segments.pop();
                } else {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        ".".to_string()
    } else {
        segments.join("/")
    }
}

/// Apply a compiled regex rename with `$N` capture-group references.
///
/// Returns the rewritten path if `regex` matches, `None` otherwise.
pub fn regex_rename(regex: &Regex, replacement: &str, path: &str) -> Option<String> {
    regex
        .captures(path)
        .map(|captures| expand_captures(&captures, replacement))
}

fn expand_captures(captures: &Captures<'_>, replacement: &str) -> String {
    let mut result = String::new();
    let mut chars = replacement.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' {
            if let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
                chars.next();
                if let Some(capture) = captures.get(digit as usize) {
                    result.push_str(capture.as_str());
                }
                continue;
            }
        }
        result.push(ch);
    }

    result
}
