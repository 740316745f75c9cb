//! Diagnostics store: the in-memory collection of published diagnostics.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use logdiag_types::Diagnostic;

use crate::sink::DiagnosticSink;
use crate::types::DiagnosticsSnapshot;

/// In-memory [`DiagnosticSink`] used by the CLI and tests.
#[derive(Debug, Default)]
pub struct DiagnosticsStore {
    data: HashMap<PathBuf, Vec<Diagnostic>>,
}

impl DiagnosticsStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
        }
    }

    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&[Diagnostic]> {
        self.data.get(path).map(Vec::as_slice)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Copy the published buckets for display.
    #[must_use]
    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        DiagnosticsSnapshot::new(
            self.data
                .iter()
                .map(|(key, bucket)| (key.clone(), bucket.clone()))
                .collect(),
        )
    }
}

impl DiagnosticSink for DiagnosticsStore {
    fn clear_all(&mut self) {
        self.data.clear();
    }

    fn clear_one(&mut self, key: &Path) {
        self.data.remove(key);
    }

    fn set_one(&mut self, key: PathBuf, diagnostics: Vec<Diagnostic>) {
        if diagnostics.is_empty() {
            self.data.remove(&key);
        } else {
            self.data.insert(key, diagnostics);
        }
    }
}
