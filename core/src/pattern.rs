//! Pattern compilation.
//!
//! A malformed regex in one configured pattern must not take down the rest:
//! [`PatternSet::compile`] skips invalid patterns with an operator-log
//! warning and keeps every pattern that compiles, in configured order.

use logdiag_types::PatternSpec;
use regex::{Regex, RegexBuilder};

#[derive(Debug, thiserror::Error)]
#[error("invalid pattern `{regexp}`: {source}")]
pub struct PatternInvalid {
    regexp: String,
    #[source]
    source: regex::Error,
}

impl PatternInvalid {
    #[must_use]
    pub fn regexp(&self) -> &str {
        &self.regexp
    }
}

/// A compiled, case-insensitive matcher plus the spec it came from.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Regex,
    spec: PatternSpec,
}

impl CompiledPattern {
    /// Compile a pattern. Matching is always case-insensitive.
    pub fn compile(spec: &PatternSpec) -> Result<Self, PatternInvalid> {
        let regex = RegexBuilder::new(spec.regexp())
            .case_insensitive(true)
            .build()
            .map_err(|source| PatternInvalid {
                regexp: spec.regexp().to_string(),
                source,
            })?;
        Ok(Self {
            regex,
            spec: spec.clone(),
        })
    }

    #[must_use]
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    #[must_use]
    pub fn spec(&self) -> &PatternSpec {
        &self.spec
    }

    /// Number of explicit capture groups (excluding the implicit whole match).
    #[must_use]
    pub fn capture_count(&self) -> usize {
        self.regex.captures_len() - 1
    }
}

/// Ordered list of compiled patterns for one or more parse passes.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<CompiledPattern>,
}

impl PatternSet {
    /// Compile every spec, skipping (and logging) the ones that fail.
    #[must_use]
    pub fn compile(specs: &[PatternSpec]) -> Self {
        let mut patterns = Vec::with_capacity(specs.len());
        for (index, spec) in specs.iter().enumerate() {
            let label = spec.name().unwrap_or(spec.regexp());
            match CompiledPattern::compile(spec) {
                Ok(compiled) => {
                    if let Some(max) = spec.groups().max_index()
                        && max > compiled.capture_count()
                    {
                        tracing::warn!(
                            index,
                            pattern = %label,
                            groups = compiled.capture_count(),
                            "Pattern references group {max} which does not exist; field will be empty"
                        );
                    }
                    patterns.push(compiled);
                }
                Err(e) => {
                    tracing::warn!(index, pattern = %label, "Skipping problem pattern: {e}");
                }
            }
        }
        Self { patterns }
    }

    #[must_use]
    pub fn patterns(&self) -> &[CompiledPattern] {
        &self.patterns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
