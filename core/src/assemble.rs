//! Diagnostic assembly for one log file.
//!
//! Walks the lines of a single log, classifies each, and groups the
//! resulting diagnostics by resolved target file. `note`-severity lines are
//! not diagnostics of their own: they become related information on the
//! most recent non-note diagnostic of the same [`DiagnosticAssembler::assemble`]
//! call, or are dropped if there is none yet.

use std::path::{Path, PathBuf};

use logdiag_types::{
    DEFAULT_SOURCE_LABEL, Diagnostic, DiagnosticsByFile, ErrorInfo, Location, Range,
    RelatedInformation,
};

use crate::classify::classify;
use crate::path::resolve_target;
use crate::pattern::PatternSet;
use crate::severity::map_severity;

pub struct DiagnosticAssembler<'a> {
    patterns: &'a PatternSet,
    source: String,
}

impl<'a> DiagnosticAssembler<'a> {
    #[must_use]
    pub fn new(patterns: &'a PatternSet) -> Self {
        Self {
            patterns,
            source: DEFAULT_SOURCE_LABEL.to_string(),
        }
    }

    /// Override the `source` label stamped on every diagnostic.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Assemble diagnostics from the full text of a log file.
    #[must_use]
    pub fn assemble_content(&self, content: &str, log_path: &Path) -> DiagnosticsByFile {
        self.assemble(content.split('\n'), log_path)
    }

    /// Assemble diagnostics from a line sequence belonging to `log_path`.
    ///
    /// Line indices are the zero-based positions within `lines`.
    pub fn assemble<'l, I>(&self, lines: I, log_path: &Path) -> DiagnosticsByFile
    where
        I: IntoIterator<Item = &'l str>,
    {
        let mut out = DiagnosticsByFile::new();
        // Bucket key and index of the most recent non-note diagnostic.
        let mut last: Option<(PathBuf, usize)> = None;
        let mut notes_dropped = 0usize;

        for (index, raw) in lines.into_iter().enumerate() {
            let line = strip_line_breaks(raw);
            let Some(info) = classify(&line, self.patterns.patterns()) else {
                continue;
            };

            let target = resolve_target(info.file.as_deref(), log_path);
            let range = compute_range(&info, index, &line);
            let severity = map_severity(info.severity.as_deref());

            match severity.diagnostic_severity() {
                None => {
                    let parent = last
                        .as_ref()
                        .and_then(|(path, i)| out.get_mut(path, *i));
                    match parent {
                        Some(parent) => parent.push_related(RelatedInformation {
                            location: Location {
                                path: target,
                                range,
                            },
                            message: info.message,
                        }),
                        None => notes_dropped += 1,
                    }
                }
                Some(severity) => {
                    let diagnostic = Diagnostic::new(severity, info.message, range, &self.source)
                        .with_code(info.code);
                    let i = out.push(target.clone(), diagnostic);
                    last = Some((target, i));
                }
            }
        }

        tracing::debug!(
            log = %log_path.display(),
            files = out.len(),
            diagnostics = out.total_count(),
            notes_dropped,
            "Assembled diagnostics"
        );
        out
    }
}

fn strip_line_breaks(raw: &str) -> String {
    raw.chars().filter(|c| !matches!(c, '\r' | '\n')).collect()
}

fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Convert 1-based captures to a zero-based range.
///
/// Without a line capture the log line's own index is used. Without a column
/// the span covers the whole trimmed line so it stays visible.
fn compute_range(info: &ErrorInfo, index: usize, line: &str) -> Range {
    let line_no = info
        .line
        .map_or_else(|| to_u32(index), |l| l.saturating_sub(1));
    match info.column {
        Some(col) => {
            let col = col.saturating_sub(1);
            Range::on_line(line_no, col, col)
        }
        None => Range::on_line(line_no, 0, to_u32(line.trim().chars().count())),
    }
}
