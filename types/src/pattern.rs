//! Problem pattern configuration and the per-line extraction record.
//!
//! Raw TOML/JSON records are validated into [`PatternSpec`] at the
//! deserialization boundary. Existence of a `PatternSpec` proves the regex
//! source is non-empty and every group index is a non-negative integer.
//! Whether the source actually compiles is decided later by the pattern
//! compiler, which skips invalid patterns instead of rejecting the config.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternSpecError {
    #[error("pattern regexp must not be empty")]
    EmptyRegexp,
    #[error("group index for `{field}` must be a non-negative integer (got {value})")]
    InvalidGroupIndex { field: &'static str, value: i64 },
}

/// 1-based capture-group indices for each extractable field.
///
/// `None` means the field is not extracted. A configured value of `0` is
/// normalized to `None` at the boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupIndices {
    pub file: Option<usize>,
    pub line: Option<usize>,
    pub column: Option<usize>,
    pub severity: Option<usize>,
    pub code: Option<usize>,
    pub message: Option<usize>,
}

impl GroupIndices {
    /// Largest configured group index, if any field is extracted.
    #[must_use]
    pub fn max_index(&self) -> Option<usize> {
        [
            self.file,
            self.line,
            self.column,
            self.severity,
            self.code,
            self.message,
        ]
        .into_iter()
        .flatten()
        .max()
    }
}

#[derive(Deserialize)]
struct RawPatternSpec {
    #[serde(default)]
    name: Option<String>,
    regexp: String,
    #[serde(default)]
    file: Option<i64>,
    #[serde(default)]
    line: Option<i64>,
    #[serde(default)]
    column: Option<i64>,
    #[serde(default)]
    severity: Option<i64>,
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<i64>,
}

fn group_index(field: &'static str, raw: Option<i64>) -> Result<Option<usize>, PatternSpecError> {
    match raw {
        None | Some(0) => Ok(None),
        Some(value) => usize::try_from(value)
            .map(Some)
            .map_err(|_| PatternSpecError::InvalidGroupIndex { field, value }),
    }
}

/// A validated problem pattern: regex source plus capture-group mapping.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawPatternSpec")]
pub struct PatternSpec {
    name: Option<String>,
    regexp: String,
    groups: GroupIndices,
}

impl TryFrom<RawPatternSpec> for PatternSpec {
    type Error = PatternSpecError;

    fn try_from(raw: RawPatternSpec) -> Result<Self, Self::Error> {
        let groups = GroupIndices {
            file: group_index("file", raw.file)?,
            line: group_index("line", raw.line)?,
            column: group_index("column", raw.column)?,
            severity: group_index("severity", raw.severity)?,
            code: group_index("code", raw.code)?,
            message: group_index("message", raw.message)?,
        };
        let spec = Self::new(raw.regexp, groups)?;
        Ok(match raw.name {
            Some(name) => spec.named(name),
            None => spec,
        })
    }
}

impl PatternSpec {
    /// Construct a pattern from its regex source and group mapping.
    pub fn new(regexp: impl Into<String>, groups: GroupIndices) -> Result<Self, PatternSpecError> {
        let regexp = regexp.into();
        if regexp.trim().is_empty() {
            return Err(PatternSpecError::EmptyRegexp);
        }
        Ok(Self {
            name: None,
            regexp,
            groups,
        })
    }

    /// Attach a display name used in operator log messages.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn regexp(&self) -> &str {
        &self.regexp
    }

    #[must_use]
    pub fn groups(&self) -> &GroupIndices {
        &self.groups
    }
}

/// Structured fields extracted from a single matching log line.
///
/// `line` and `column` are 1-based as authored in the log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorInfo {
    pub message: String,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
    /// Raw lowercase severity token, before normalization.
    pub severity: Option<String>,
    pub code: Option<String>,
}
