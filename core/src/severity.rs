use logdiag_types::Severity;

/// Normalize a raw severity token.
///
/// Matching is case-insensitive and ignores surrounding whitespace. Absent
/// and unrecognized tokens map to [`Severity::Error`] so an unclassified
/// problem line is never silently dropped.
#[must_use]
pub fn map_severity(token: Option<&str>) -> Severity {
    let Some(token) = token else {
        return Severity::Error;
    };
    match token.trim().to_lowercase().as_str() {
        "warning" | "warn" => Severity::Warning,
        "info" | "information" => Severity::Information,
        "hint" => Severity::Hint,
        "note" => Severity::Note,
        // "error", "fatal", "fatal error" and anything unrecognized
        _ => Severity::Error,
    }
}
