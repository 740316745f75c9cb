//! Publishing bridge between parse passes and the diagnostics collection.

use std::path::{Path, PathBuf};

use logdiag_config::ClearPolicy;
use logdiag_types::{Diagnostic, DiagnosticsByFile};

/// A diagnostics collection keyed by absolute file path.
///
/// Implemented by [`crate::DiagnosticsStore`]; hosts with their own
/// collection (an editor's problems view, a language server) implement it
/// directly.
pub trait DiagnosticSink {
    /// Remove every published bucket.
    fn clear_all(&mut self);

    /// Remove the bucket for `key`, if any.
    fn clear_one(&mut self, key: &Path);

    /// Replace the bucket for `key`.
    fn set_one(&mut self, key: PathBuf, diagnostics: Vec<Diagnostic>);

    /// Replace the whole collection with `buckets`.
    fn replace_all(&mut self, buckets: DiagnosticsByFile) {
        self.clear_all();
        for (key, diagnostics) in buckets {
            self.set_one(key, diagnostics);
        }
    }
}

/// Apply one pass's output to `sink` under `policy`.
///
/// With [`ClearPolicy::File`] only the bucket keyed by the log file itself is
/// cleared first, so buckets written by other logs survive. Two logs that
/// resolve into the same target file overwrite each other (last writer wins).
pub fn publish<S>(sink: &mut S, buckets: DiagnosticsByFile, policy: ClearPolicy, log_path: &Path)
where
    S: DiagnosticSink + ?Sized,
{
    match policy {
        ClearPolicy::All => sink.replace_all(buckets),
        ClearPolicy::File => {
            sink.clear_one(log_path);
            for (key, diagnostics) in buckets {
                sink.set_one(key, diagnostics);
            }
        }
    }
}
