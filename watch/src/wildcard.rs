//! Wildcard path expansion.
//!
//! Each configured path is split into segments and walked from its first
//! literal prefix. Segments containing `*` or `?` are matched against
//! directory entries; `*` never crosses a path separator. There is no
//! recursive `**` (it behaves like `*`) and no brace expansion.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf, absolute};

use globset::{GlobBuilder, GlobMatcher};
use logdiag_core::normalize_path;

/// Files matched by one expansion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
    pub files: BTreeSet<PathBuf>,
    /// Relative patterns were skipped because no workspace root was given.
    pub missing_root: bool,
}

fn is_wildcard(segment: &str) -> bool {
    segment.contains(['*', '?'])
}

/// Build a single-segment matcher. Glob metacharacters other than `*` and
/// `?` are matched literally.
fn segment_matcher(segment: &str) -> Option<GlobMatcher> {
    let mut escaped = String::with_capacity(segment.len());
    for c in segment.chars() {
        match c {
            '[' | '{' | '}' => {
                escaped.push('[');
                escaped.push(c);
                escaped.push(']');
            }
            _ => escaped.push(c),
        }
    }
    let escaped = escaped.replace("**", "*");

    let mut builder = GlobBuilder::new(&escaped);
    builder.literal_separator(true);
    if cfg!(windows) {
        builder.case_insensitive(true);
    }
    match builder.build() {
        Ok(glob) => Some(glob.compile_matcher()),
        Err(e) => {
            tracing::warn!("Invalid wildcard segment '{segment}': {e}");
            None
        }
    }
}

fn entries(dir: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(iter) => iter.filter_map(Result::ok).map(|e| e.path()).collect(),
        Err(e) => {
            tracing::debug!(dir = %dir.display(), "Skipping unreadable directory: {e}");
            Vec::new()
        }
    }
}

/// Expand one absolute pattern into existing files.
fn expand_absolute(pattern: &Path) -> Vec<PathBuf> {
    let mut prefix = PathBuf::new();
    let mut rest: Vec<String> = Vec::new();
    for component in normalize_path(pattern).components() {
        match component {
            Component::Normal(seg) if !rest.is_empty() || is_wildcard(&seg.to_string_lossy()) => {
                rest.push(seg.to_string_lossy().into_owned());
            }
            other => prefix.push(other),
        }
    }

    if prefix.as_os_str().is_empty() {
        prefix.push(".");
    }

    if rest.is_empty() {
        return if prefix.is_file() { vec![prefix] } else { Vec::new() };
    }

    let mut current = vec![prefix];
    let last = rest.len() - 1;
    for (i, segment) in rest.iter().enumerate() {
        let mut next = Vec::new();
        if is_wildcard(segment) {
            let Some(matcher) = segment_matcher(segment) else {
                return Vec::new();
            };
            for dir in &current {
                for entry in entries(dir) {
                    let name_matches = entry
                        .file_name()
                        .is_some_and(|name| matcher.is_match(Path::new(name)));
                    if name_matches {
                        next.push(entry);
                    }
                }
            }
        } else {
            next.extend(current.iter().map(|dir| dir.join(segment)));
        }
        current = if i == last {
            next.into_iter().filter(|p| p.is_file()).collect()
        } else {
            next.into_iter().filter(|p| p.is_dir()).collect()
        };
        if current.is_empty() {
            break;
        }
    }
    current
}

/// Expand every pattern. Relative patterns resolve against `root`, which is
/// itself made absolute against the current directory first.
#[must_use]
pub fn expand(patterns: &[String], root: Option<&Path>) -> Expansion {
    let root = root.map(|root| absolute(root).unwrap_or_else(|_| root.to_path_buf()));
    let root = root.as_deref();
    let mut out = Expansion::default();
    for raw in patterns {
        let pattern = Path::new(raw.trim());
        let full = if pattern.is_absolute() {
            pattern.to_path_buf()
        } else if let Some(root) = root {
            root.join(pattern)
        } else {
            out.missing_root = true;
            continue;
        };
        out.files.extend(expand_absolute(&full));
    }
    out
}
