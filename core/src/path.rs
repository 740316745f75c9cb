use std::path::{Component, Path, PathBuf};

/// Lexically normalize a path: drop `.` components and fold `..` into the
/// preceding normal component. Does not touch the filesystem.
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for c in path.components() {
        match c {
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(c),
            },
            Component::CurDir => {}
            other => out.push(other),
        }
    }
    out.iter().collect()
}

/// Resolve the bucket key for a matched line.
///
/// A missing file falls back to the log file itself. Relative files are
/// resolved against the directory containing the log file, not the
/// workspace root.
#[must_use]
pub fn resolve_target(file: Option<&str>, log_path: &Path) -> PathBuf {
    let Some(file) = file else {
        return normalize_path(log_path);
    };
    let candidate = Path::new(file);
    if candidate.is_absolute() {
        return normalize_path(candidate);
    }
    let base = log_path.parent().unwrap_or_else(|| Path::new(""));
    normalize_path(&base.join(candidate))
}
