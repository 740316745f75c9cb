//! Polling filesystem watcher.
//!
//! A single spawned task owns the current file set and a fingerprint per
//! file. On every poll tick it emits [`WatchEvent::Changed`] for files whose
//! size or mtime moved; on every rescan tick it re-expands the wildcard
//! patterns and emits [`WatchEvent::Snapshot`] when the set changes.
//!
//! Only size and mtime are compared. A same-length rewrite within the
//! filesystem's mtime granularity goes unnoticed until the file changes again.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::types::WatchEvent;
use crate::wildcard;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Fingerprint {
    len: u64,
    modified: Option<SystemTime>,
}

pub(crate) fn fingerprint(path: &Path) -> Option<Fingerprint> {
    let metadata = std::fs::metadata(path).ok()?;
    Some(Fingerprint {
        len: metadata.len(),
        modified: metadata.modified().ok(),
    })
}

pub(crate) struct PollerConfig {
    pub patterns: Vec<String>,
    pub root: Option<PathBuf>,
    pub poll_interval: Duration,
    pub rescan_interval: Duration,
}

struct Poller {
    config: PollerConfig,
    known: BTreeMap<PathBuf, Option<Fingerprint>>,
    event_tx: mpsc::Sender<WatchEvent>,
}

impl Poller {
    /// Returns `false` once the receiving session is gone.
    async fn poll_changes(&mut self) -> bool {
        let mut changed = Vec::new();
        for (path, last) in &mut self.known {
            let current = fingerprint(path);
            // A vanished file is left to the next rescan.
            if current.is_some() && current != *last {
                *last = current;
                changed.push(path.clone());
            }
        }
        for path in changed {
            tracing::debug!(path = %path.display(), "Log file changed");
            if self.event_tx.send(WatchEvent::Changed(path)).await.is_err() {
                return false;
            }
        }
        true
    }

    async fn rescan(&mut self) -> bool {
        let files = wildcard::expand(&self.config.patterns, self.config.root.as_deref()).files;
        let current: BTreeSet<PathBuf> = self.known.keys().cloned().collect();
        if files == current {
            return true;
        }

        self.known.retain(|path, _| files.contains(path));
        for path in &files {
            self.known
                .entry(path.clone())
                .or_insert_with(|| fingerprint(path));
        }
        tracing::debug!(count = files.len(), "Watched log set changed");
        self.event_tx.send(WatchEvent::Snapshot(files)).await.is_ok()
    }

    async fn run(mut self) {
        let mut poll = time::interval(self.config.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut rescan = time::interval(self.config.rescan_interval);
        rescan.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // Both intervals fire immediately; the session already ran the initial passes.
        poll.tick().await;
        rescan.tick().await;

        loop {
            let alive = tokio::select! {
                _ = poll.tick() => self.poll_changes().await,
                _ = rescan.tick() => self.rescan().await,
            };
            if !alive {
                tracing::debug!("Watch session closed; poller exiting");
                break;
            }
        }
    }
}

/// Spawn the poller, seeded with the files the session already processed.
pub(crate) fn spawn(
    config: PollerConfig,
    initial: &BTreeSet<PathBuf>,
    event_tx: mpsc::Sender<WatchEvent>,
) -> JoinHandle<()> {
    let known = initial
        .iter()
        .map(|path| (path.clone(), fingerprint(path)))
        .collect();
    let poller = Poller {
        config,
        known,
        event_tx,
    };
    tokio::spawn(poller.run())
}
