//! The watch session driven by the host.
//!
//! A session owns the compiled patterns, the diagnostics sink, and, while
//! watching, the poller task and its event channel. Watching state lives in
//! `active`: `Some` while watching, `None` otherwise. Dropping the active
//! watch aborts the poller.
//!
//! Parse passes run on the caller's task, one file at a time. Change events
//! are coalesced into `pending` before any pass runs, so a burst of writes to
//! one log produces a single pass and two passes never overlap.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use logdiag_config::{ClearPolicy, WatchConfig};
use logdiag_core::{DiagnosticAssembler, PatternSet};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::poller::{self, PollerConfig};
use crate::sink::{DiagnosticSink, publish};
use crate::types::{Notice, NoticeLevel, WatchError, WatchEvent};
use crate::wildcard;

/// Channel capacity between the poller task and the session.
const EVENT_CHANNEL_CAPACITY: usize = 256;

struct ActiveWatch {
    files: BTreeSet<PathBuf>,
    event_rx: mpsc::Receiver<WatchEvent>,
    poller: JoinHandle<()>,
    pending: BTreeSet<PathBuf>,
}

impl Drop for ActiveWatch {
    fn drop(&mut self) {
        self.poller.abort();
    }
}

pub struct WatchSession<S: DiagnosticSink> {
    config: WatchConfig,
    workspace_root: Option<PathBuf>,
    patterns: PatternSet,
    sink: S,
    active: Option<ActiveWatch>,
    /// Bucket keys each log file last published, for cleanup when the log
    /// stops matching.
    published: BTreeMap<PathBuf, BTreeSet<PathBuf>>,
    notices: Vec<Notice>,
}

impl<S: DiagnosticSink> WatchSession<S> {
    /// Create an idle session. Invalid patterns are logged and dropped here.
    pub fn new(config: WatchConfig, workspace_root: Option<PathBuf>, sink: S) -> Self {
        let patterns = PatternSet::compile(config.patterns());
        Self {
            config,
            workspace_root,
            patterns,
            sink,
            active: None,
            published: BTreeMap::new(),
            notices: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_watching(&self) -> bool {
        self.active.is_some()
    }

    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Files currently being watched (empty when idle).
    #[must_use]
    pub fn watched_files(&self) -> Vec<PathBuf> {
        self.active
            .as_ref()
            .map(|active| active.files.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Take all queued user-visible notices.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        let notice = Notice::new(level, message);
        match level {
            NoticeLevel::Info => tracing::info!("{}", notice.message()),
            NoticeLevel::Warning => tracing::warn!("{}", notice.message()),
            NoticeLevel::Error => tracing::error!("{}", notice.message()),
        }
        self.notices.push(notice);
    }

    fn check_config(&mut self) -> Result<(), WatchError> {
        let missing = if self.config.paths().is_empty() {
            Some("no log file paths configured")
        } else if self.config.patterns().is_empty() {
            Some("no problem patterns configured")
        } else if self.patterns.is_empty() {
            Some("no valid problem patterns configured")
        } else {
            None
        };
        match missing {
            Some(what) => {
                let err = WatchError::ConfigMissing(what);
                self.notify(NoticeLevel::Error, err.to_string());
                Err(err)
            }
            None => Ok(()),
        }
    }

    /// Expand the configured wildcards, reporting a missing root or an
    /// empty match as warnings.
    fn expand_paths(&mut self) -> BTreeSet<PathBuf> {
        let expansion = wildcard::expand(self.config.paths(), self.workspace_root.as_deref());
        if expansion.missing_root {
            self.notify(
                NoticeLevel::Warning,
                "Relative log paths are ignored: no workspace root is available",
            );
        }
        if expansion.files.is_empty() {
            self.notify(NoticeLevel::Warning, "No log files matched the configured paths");
        }
        expansion.files
    }

    /// Begin watching. Calling this while already watching is a no-op.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_watching(&mut self) -> Result<(), WatchError> {
        if self.is_watching() {
            self.notify(NoticeLevel::Info, "Already watching build logs");
            return Ok(());
        }
        self.check_config()?;

        let files = self.expand_paths();
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let poller = poller::spawn(
            PollerConfig {
                patterns: self.config.paths().to_vec(),
                root: self.workspace_root.clone(),
                poll_interval: self.config.poll_interval(),
                rescan_interval: self.config.rescan_interval(),
            },
            &files,
            event_tx,
        );
        tracing::info!(count = files.len(), "Started watching build logs");

        self.active = Some(ActiveWatch {
            files: files.clone(),
            event_rx,
            poller,
            pending: BTreeSet::new(),
        });
        for path in &files {
            // Failures are reported as notices; other files still get processed.
            let _ = self.process_file(path);
        }
        Ok(())
    }

    /// Stop watching and clear every published diagnostic. Idempotent.
    pub fn stop_watching(&mut self) {
        if let Some(active) = self.active.take() {
            tracing::info!(count = active.files.len(), "Stopped watching build logs");
        }
        self.published.clear();
        self.sink.clear_all();
    }

    /// Run one pass over every matched file without starting the poller.
    ///
    /// Returns the number of files that were processed successfully.
    pub fn scan_once(&mut self) -> Result<usize, WatchError> {
        self.check_config()?;
        let files = self.expand_paths();
        let mut processed = 0;
        for path in &files {
            if self.process_file(path).is_ok() {
                processed += 1;
            }
        }
        Ok(processed)
    }

    /// Read, assemble, and publish one log file.
    ///
    /// On a read failure the file's published buckets are left untouched.
    /// Returns the number of diagnostics published.
    pub fn process_file(&mut self, log_path: &Path) -> Result<usize, WatchError> {
        let content = match std::fs::read_to_string(log_path) {
            Ok(content) => content,
            Err(source) => {
                let err = WatchError::FileRead {
                    path: log_path.to_path_buf(),
                    source,
                };
                self.notify(NoticeLevel::Error, err.to_string());
                return Err(err);
            }
        };

        let buckets = DiagnosticAssembler::new(&self.patterns)
            .with_source(self.config.source())
            .assemble_content(&content, log_path);
        let count = buckets.total_count();
        let keys: BTreeSet<PathBuf> = buckets.paths().map(Path::to_path_buf).collect();
        tracing::debug!(
            log = %log_path.display(),
            files = keys.len(),
            count,
            "Publishing diagnostics"
        );

        let policy = self.config.clear_policy();
        if policy == ClearPolicy::All {
            self.published.clear();
        }
        publish(&mut self.sink, buckets, policy, log_path);
        // Last writer owns a shared target bucket.
        for (other, owned) in &mut self.published {
            if other != log_path {
                owned.retain(|key| !keys.contains(key));
            }
        }
        self.published.insert(log_path.to_path_buf(), keys);
        Ok(count)
    }

    /// Handle a single watcher event. Passes are queued, not run.
    pub fn handle_event(&mut self, event: WatchEvent) {
        match event {
            WatchEvent::Changed(path) => {
                if let Some(active) = self.active.as_mut()
                    && active.files.contains(&path)
                {
                    active.pending.insert(path);
                }
            }
            WatchEvent::Snapshot(files) => self.apply_snapshot(files),
        }
    }

    fn apply_snapshot(&mut self, files: BTreeSet<PathBuf>) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        let removed: Vec<PathBuf> = active.files.difference(&files).cloned().collect();
        let added: Vec<PathBuf> = files.difference(&active.files).cloned().collect();
        let now_empty = files.is_empty() && !active.files.is_empty();

        active.pending.retain(|path| files.contains(path));
        active.pending.extend(added.iter().cloned());
        active.files = files;

        for path in &removed {
            tracing::info!(path = %path.display(), "Log file no longer matched");
            self.clear_log(path);
        }
        for path in &added {
            tracing::info!(path = %path.display(), "New log file matched");
        }
        if now_empty {
            self.notify(NoticeLevel::Warning, "No log files matched the configured paths");
        }
    }

    /// Clear the log's own bucket and every bucket it last published.
    fn clear_log(&mut self, log_path: &Path) {
        self.sink.clear_one(log_path);
        if let Some(keys) = self.published.remove(log_path) {
            for key in keys {
                self.sink.clear_one(&key);
            }
        }
    }

    /// Run a pass for every queued file. Returns the number of passes that
    /// published; failed reads are reported as notices and not counted.
    pub fn flush_pending(&mut self) -> usize {
        let pending = match self.active.as_mut() {
            Some(active) => std::mem::take(&mut active.pending),
            None => return 0,
        };
        let mut passes = 0;
        for path in pending {
            if self.process_file(&path).is_ok() {
                passes += 1;
            }
        }
        passes
    }

    /// Drain up to `budget` queued events without blocking, then run the
    /// resulting passes. Returns the number of events handled.
    pub fn poll_events(&mut self, budget: usize) -> usize {
        let mut count = 0;
        while count < budget {
            let Some(active) = self.active.as_mut() else {
                break;
            };
            match active.event_rx.try_recv() {
                Ok(event) => {
                    self.handle_event(event);
                    count += 1;
                }
                // Empty or disconnected; a closed channel surfaces in process_next.
                Err(_) => break,
            }
        }
        self.flush_pending();
        count
    }

    /// Wait for the next watcher event, then handle everything queued.
    ///
    /// Returns `None` when idle or when the poller has gone away.
    pub async fn process_next(&mut self, budget: usize) -> Option<usize> {
        let event = self.active.as_mut()?.event_rx.recv().await?;
        self.handle_event(event);
        Some(1 + self.poll_events(budget.saturating_sub(1)))
    }

    /// Queue an event as if the poller had sent it (for testing).
    #[cfg(test)]
    pub(crate) fn inject(&mut self, event: WatchEvent) {
        self.handle_event(event);
    }
}
