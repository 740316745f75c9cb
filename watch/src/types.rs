//! Public types consumed by the host.
//!
//! The host constructs a [`crate::WatchSession`], drains [`Notice`]s for
//! display, and reads [`DiagnosticsSnapshot`]s from the store.

use std::collections::BTreeSet;
use std::path::PathBuf;

use logdiag_types::{Diagnostic, DiagnosticSeverity};

/// An event emitted by the filesystem poller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// A watched log file's content changed.
    Changed(PathBuf),
    /// Result of a periodic wildcard rescan: the full current file set.
    Snapshot(BTreeSet<PathBuf>),
}

#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("cannot start watching: {0}")]
    ConfigMissing(&'static str),
    #[error("failed to read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A user-visible message. Operator-only conditions go to `tracing` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    level: NoticeLevel,
    message: String,
}

impl Notice {
    pub(crate) fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn level(&self) -> NoticeLevel {
        self.level
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Diagnostic totals per published severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeverityCounts {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    pub hints: usize,
}

impl SeverityCounts {
    fn tally<'a>(diagnostics: impl IntoIterator<Item = &'a Diagnostic>) -> Self {
        let mut counts = Self::default();
        for diagnostic in diagnostics {
            match diagnostic.severity() {
                DiagnosticSeverity::Error => counts.errors += 1,
                DiagnosticSeverity::Warning => counts.warnings += 1,
                DiagnosticSeverity::Information => counts.infos += 1,
                DiagnosticSeverity::Hint => counts.hints += 1,
            }
        }
        counts
    }

    #[must_use]
    pub fn total(self) -> usize {
        self.errors + self.warnings + self.infos + self.hints
    }
}

/// Point-in-time copy of every published bucket, for display.
///
/// Files containing errors come first, then paths in order.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticsSnapshot {
    files: Vec<(PathBuf, Vec<Diagnostic>)>,
    counts: SeverityCounts,
}

impl DiagnosticsSnapshot {
    pub(crate) fn new(mut files: Vec<(PathBuf, Vec<Diagnostic>)>) -> Self {
        files.sort_by_cached_key(|(path, items)| {
            let has_errors = items.iter().any(|d| d.severity().is_error());
            (!has_errors, path.clone())
        });
        let counts = SeverityCounts::tally(files.iter().flat_map(|(_, items)| items));
        Self { files, counts }
    }

    #[must_use]
    pub fn files(&self) -> &[(PathBuf, Vec<Diagnostic>)] {
        &self.files
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    #[must_use]
    pub fn counts(&self) -> SeverityCounts {
        self.counts
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.counts.errors
    }

    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.counts.warnings
    }

    #[must_use]
    pub fn info_count(&self) -> usize {
        self.counts.infos
    }

    #[must_use]
    pub fn hint_count(&self) -> usize {
        self.counts.hints
    }

    #[must_use]
    pub fn total_count(&self) -> usize {
        self.counts.total()
    }

    /// `E:<errors> W:<warnings>`, or empty when nothing is published.
    #[must_use]
    pub fn status_string(&self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            format!("E:{} W:{}", self.counts.errors, self.counts.warnings)
        }
    }
}
