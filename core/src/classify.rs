use logdiag_types::ErrorInfo;
use regex::Captures;

use crate::pattern::CompiledPattern;

/// Classify one log line against patterns in configured order.
///
/// The first pattern that matches wins; later patterns are not tried.
/// Returns `None` for lines no pattern recognizes, which is most of a log.
#[must_use]
pub fn classify(line: &str, patterns: &[CompiledPattern]) -> Option<ErrorInfo> {
    patterns.iter().find_map(|pattern| {
        let caps = pattern.regex().captures(line)?;
        Some(extract(line, pattern, &caps))
    })
}

fn extract(line: &str, pattern: &CompiledPattern, caps: &Captures<'_>) -> ErrorInfo {
    let groups = pattern.spec().groups();
    let text = |index: Option<usize>| -> Option<&str> {
        index
            .and_then(|i| caps.get(i))
            .map(|m| m.as_str().trim())
    };

    ErrorInfo {
        message: text(groups.message)
            .unwrap_or_else(|| line.trim())
            .to_string(),
        file: text(groups.file)
            .filter(|f| !f.is_empty())
            .map(str::to_string),
        line: text(groups.line).and_then(|raw| parse_number("line", raw)),
        column: text(groups.column).and_then(|raw| parse_number("column", raw)),
        severity: text(groups.severity).map(str::to_lowercase),
        code: text(groups.code)
            .filter(|c| !c.is_empty())
            .map(str::to_string),
    }
}

/// Non-numeric captures are treated as absent so range computation falls
/// back to its defaults.
fn parse_number(field: &'static str, raw: &str) -> Option<u32> {
    match raw.parse::<u32>() {
        Ok(n) => Some(n),
        Err(e) => {
            tracing::debug!(field, value = raw, "Ignoring non-numeric capture: {e}");
            None
        }
    }
}
