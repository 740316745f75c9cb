//! Built-in problem patterns for common compiler output formats.
//!
//! Presets are selected by name in configuration and appended after the
//! user's own patterns, so user patterns always take precedence.

use logdiag_types::{GroupIndices, PatternSpec};

/// `file:line:col: severity: message` (gcc, clang, many linters).
const GCC: &str = r"^(.*?):(\d+):(\d+):\s+(fatal error|error|warning|note|info|hint):\s+(.*)$";

/// `file(line[,col]): severity CODE: message` (MSVC, tsc, csc).
const MSVC: &str = r"^\s*(.*?)\((\d+)(?:,(\d+))?\)\s*:\s+(fatal error|error|warning|note|info)\s+(\w+)\s*:\s+(.*)$";

/// Names accepted by [`preset`].
pub const PRESET_NAMES: &[&str] = &["gcc", "msvc"];

/// Look up a built-in pattern by name (case-insensitive).
#[must_use]
pub fn preset(name: &str) -> Option<PatternSpec> {
    let (regexp, groups) = match name.trim().to_ascii_lowercase().as_str() {
        "gcc" => (
            GCC,
            GroupIndices {
                file: Some(1),
                line: Some(2),
                column: Some(3),
                severity: Some(4),
                message: Some(5),
                ..GroupIndices::default()
            },
        ),
        "msvc" => (
            MSVC,
            GroupIndices {
                file: Some(1),
                line: Some(2),
                column: Some(3),
                severity: Some(4),
                code: Some(5),
                message: Some(6),
            },
        ),
        _ => return None,
    };
    PatternSpec::new(regexp, groups)
        .ok()
        .map(|spec| spec.named(name.trim().to_ascii_lowercase()))
}
