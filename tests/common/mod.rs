//! Shared test utilities and fixtures

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use logdiag_config::WatchConfig;
use logdiag_types::{GroupIndices, PatternSpec};

/// `file:line:col: severity: message`
pub const COLON_REGEXP: &str = r"^(.*?):(\d+):(\d+):\s+(warning|error|note):\s+(.*)$";

/// `file(line,col): severity CODE: message`
pub const PAREN_REGEXP: &str = r"^(.*?)\((\d+),(\d+)\):\s+(warning|error)\s+(\w+):\s+(.*)$";

/// `severity: message`, no location.
pub const BARE_REGEXP: &str = r"^(error|warning|note):\s+(.*)$";

pub fn colon_pattern() -> PatternSpec {
    PatternSpec::new(
        COLON_REGEXP,
        GroupIndices {
            file: Some(1),
            line: Some(2),
            column: Some(3),
            severity: Some(4),
            message: Some(5),
            ..GroupIndices::default()
        },
    )
    .unwrap()
}

pub fn paren_pattern() -> PatternSpec {
    PatternSpec::new(
        PAREN_REGEXP,
        GroupIndices {
            file: Some(1),
            line: Some(2),
            column: Some(3),
            severity: Some(4),
            code: Some(5),
            message: Some(6),
        },
    )
    .unwrap()
}

pub fn bare_pattern() -> PatternSpec {
    PatternSpec::new(
        BARE_REGEXP,
        GroupIndices {
            severity: Some(1),
            message: Some(2),
            ..GroupIndices::default()
        },
    )
    .unwrap()
}

/// Watch config with the standard patterns and a poller that never fires
/// on its own during a test.
pub fn quiet_config(paths: &[&str]) -> WatchConfig {
    WatchConfig::new(
        paths.iter().map(ToString::to_string).collect(),
        vec![paren_pattern(), colon_pattern(), bare_pattern()],
    )
    .with_poll_interval(Duration::from_secs(3600))
    .with_rescan_interval(Duration::from_secs(3600))
}

pub fn write_file(dir: &Path, relative: &str, content: &str) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}
