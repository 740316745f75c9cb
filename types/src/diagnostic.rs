//! Diagnostic output types.
//!
//! These types define the interface between the pattern engine and the
//! diagnostics sink. The engine builds [`DiagnosticsByFile`] per parse pass;
//! the sink stores [`Diagnostic`]s keyed by resolved file path.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Source label attached to every published diagnostic unless configured otherwise.
pub const DEFAULT_SOURCE_LABEL: &str = "Build Log";

/// Normalized severity of a matched log line.
///
/// `Note` is a pseudo-severity: it never becomes a standalone diagnostic and
/// is absorbed as related information of the preceding diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Information,
    Hint,
    Note,
}

impl Severity {
    /// The publishable severity, or `None` for `Note`.
    #[must_use]
    pub fn diagnostic_severity(self) -> Option<DiagnosticSeverity> {
        match self {
            Self::Error => Some(DiagnosticSeverity::Error),
            Self::Warning => Some(DiagnosticSeverity::Warning),
            Self::Information => Some(DiagnosticSeverity::Information),
            Self::Hint => Some(DiagnosticSeverity::Hint),
            Self::Note => None,
        }
    }
}

/// Severity level for a published diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticSeverity {
    Error = 1,
    Warning = 2,
    Information = 3,
    Hint = 4,
}

impl DiagnosticSeverity {
    #[must_use]
    pub fn is_error(self) -> bool {
        self == Self::Error
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Information => "info",
            Self::Hint => "hint",
        }
    }
}

impl From<DiagnosticSeverity> for Severity {
    fn from(value: DiagnosticSeverity) -> Self {
        match value {
            DiagnosticSeverity::Error => Self::Error,
            DiagnosticSeverity::Warning => Self::Warning,
            DiagnosticSeverity::Information => Self::Information,
            DiagnosticSeverity::Hint => Self::Hint,
        }
    }
}

/// Zero-based line/character position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    #[must_use]
    pub const fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// Zero-based range; `end` is never before `start` on the same line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// A span on a single line from `start_col` to `end_col`.
    #[must_use]
    pub const fn on_line(line: u32, start_col: u32, end_col: u32) -> Self {
        Self {
            start: Position::new(line, start_col),
            end: Position::new(line, end_col),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: PathBuf,
    pub range: Range,
}

/// Secondary location and message, used for compiler `note:` follow-ups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInformation {
    pub location: Location,
    pub message: String,
}

/// A single diagnostic synthesized from a build log.
///
/// Fields are private; related information is the only part that grows
/// after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    range: Range,
    severity: DiagnosticSeverity,
    message: String,
    source: String,
    code: Option<String>,
    related_information: Vec<RelatedInformation>,
}

impl Diagnostic {
    #[must_use]
    pub fn new(
        severity: DiagnosticSeverity,
        message: impl Into<String>,
        range: Range,
        source: impl Into<String>,
    ) -> Self {
        Self {
            range,
            severity,
            message: message.into(),
            source: source.into(),
            code: None,
            related_information: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_code(mut self, code: Option<String>) -> Self {
        self.code = code;
        self
    }

    pub fn push_related(&mut self, related: RelatedInformation) {
        self.related_information.push(related);
    }

    #[must_use]
    pub fn range(&self) -> Range {
        self.range
    }

    #[must_use]
    pub fn severity(&self) -> DiagnosticSeverity {
        self.severity
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    #[must_use]
    pub fn related_information(&self) -> &[RelatedInformation] {
        &self.related_information
    }

    /// Format as `path:line:col: severity: [source] message` (1-indexed for display),
    /// followed by one indented line per related note.
    #[must_use]
    pub fn display_with_path(&self, path: &Path) -> String {
        let code = self
            .code
            .as_deref()
            .map(|c| format!(" {c}"))
            .unwrap_or_default();
        let mut out = format!(
            "{}:{}:{}: {}{code}: [{}] {}",
            path.display(),
            self.range.start.line + 1,
            self.range.start.character + 1,
            self.severity.label(),
            self.source,
            self.message,
        );
        for related in &self.related_information {
            let _ = write!(
                out,
                "\n    {}:{}:{}: note: {}",
                related.location.path.display(),
                related.location.range.start.line + 1,
                related.location.range.start.character + 1,
                related.message,
            );
        }
        out
    }
}

/// Diagnostics grouped by resolved target file, built fresh per parse pass.
///
/// Keys are ordered so publishing is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticsByFile {
    buckets: BTreeMap<PathBuf, Vec<Diagnostic>>,
}

impl DiagnosticsByFile {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the bucket for `path`, creating it if absent.
    ///
    /// Returns the index of the diagnostic within its bucket.
    pub fn push(&mut self, path: PathBuf, diagnostic: Diagnostic) -> usize {
        let bucket = self.buckets.entry(path).or_default();
        bucket.push(diagnostic);
        bucket.len() - 1
    }

    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&[Diagnostic]> {
        self.buckets.get(path).map(Vec::as_slice)
    }

    pub fn get_mut(&mut self, path: &Path, index: usize) -> Option<&mut Diagnostic> {
        self.buckets.get_mut(path)?.get_mut(index)
    }

    /// Number of buckets (distinct target files).
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total diagnostic count across all buckets.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.buckets.keys().map(PathBuf::as_path)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, PathBuf, Vec<Diagnostic>> {
        self.buckets.iter()
    }
}

impl IntoIterator for DiagnosticsByFile {
    type Item = (PathBuf, Vec<Diagnostic>);
    type IntoIter = btree_map::IntoIter<PathBuf, Vec<Diagnostic>>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.into_iter()
    }
}

impl<'a> IntoIterator for &'a DiagnosticsByFile {
    type Item = (&'a PathBuf, &'a Vec<Diagnostic>);
    type IntoIter = btree_map::Iter<'a, PathBuf, Vec<Diagnostic>>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.iter()
    }
}
