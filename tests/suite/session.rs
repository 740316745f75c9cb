//! Watch session behavior against real files on disk.

use std::collections::BTreeSet;
use std::fs;
use std::time::Duration;

use logdiag_config::ClearPolicy;
use logdiag_types::Position;
use logdiag_watch::{DiagnosticsStore, NoticeLevel, WatchError, WatchSession};
use tempfile::tempdir;

use crate::common::{quiet_config, write_file};

#[tokio::test]
async fn stop_twice_leaves_store_empty() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "build.log", "src/a.c:1:1: error: boom\n");

    let mut session = WatchSession::new(
        quiet_config(&["*.log"]),
        Some(dir.path().to_path_buf()),
        DiagnosticsStore::new(),
    );
    session.start_watching().unwrap();
    assert_eq!(session.sink().snapshot().error_count(), 1);

    session.stop_watching();
    session.stop_watching();
    assert!(session.sink().is_empty());
    assert!(!session.is_watching());
}

#[tokio::test]
async fn logs_in_nested_directories_resolve_relative_files() {
    let dir = tempdir().unwrap();
    let log = write_file(
        dir.path(),
        "out/ci/build.log",
        "../../src/lib.c:7:3: warning: shadowed\n",
    );

    let mut session = WatchSession::new(
        quiet_config(&["out/*/*.log"]),
        Some(dir.path().to_path_buf()),
        DiagnosticsStore::new(),
    );
    session.start_watching().unwrap();
    assert_eq!(session.watched_files(), vec![log]);

    let target = dir.path().join("src/lib.c");
    let bucket = session.sink().get(&target).unwrap();
    assert_eq!(bucket[0].range().start, Position::new(6, 2));
}

#[tokio::test]
async fn file_policy_keeps_other_logs() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a.log", "a.c:1:1: error: from a\n");
    write_file(dir.path(), "b.log", "b.c:1:1: warning: from b\n");

    let mut session = WatchSession::new(
        quiet_config(&["*.log"]).with_clear_policy(ClearPolicy::File),
        Some(dir.path().to_path_buf()),
        DiagnosticsStore::new(),
    );
    assert_eq!(session.scan_once().unwrap(), 2);
    let snapshot = session.sink().snapshot();
    assert_eq!(snapshot.status_string(), "E:1 W:1");
    assert_eq!(snapshot.files()[0].0, dir.path().join("a.c"));
}

#[tokio::test]
async fn scan_once_without_paths_fails() {
    let dir = tempdir().unwrap();
    let mut session = WatchSession::new(
        quiet_config(&[]),
        Some(dir.path().to_path_buf()),
        DiagnosticsStore::new(),
    );
    assert!(matches!(
        session.scan_once(),
        Err(WatchError::ConfigMissing(_))
    ));
    let notices = session.drain_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level(), NoticeLevel::Error);
}

#[tokio::test]
async fn appended_output_is_picked_up() {
    let dir = tempdir().unwrap();
    let log = write_file(dir.path(), "build.log", "Compiling...\n");

    let mut session = WatchSession::new(
        quiet_config(&["*.log"]).with_poll_interval(Duration::from_millis(50)),
        Some(dir.path().to_path_buf()),
        DiagnosticsStore::new(),
    );
    session.start_watching().unwrap();
    assert!(session.sink().is_empty());

    fs::write(&log, "Compiling...\nerror: linker failed\n").unwrap();
    let waited = tokio::time::timeout(Duration::from_secs(5), async {
        while session.sink().get(&log).is_none() {
            assert!(session.process_next(16).await.is_some());
        }
    })
    .await;
    assert!(waited.is_ok());

    let bucket = session.sink().get(&log).unwrap();
    assert_eq!(bucket[0].message(), "linker failed");
    assert_eq!(bucket[0].range().start, Position::new(1, 0));
    session.stop_watching();
}

#[tokio::test]
async fn new_log_is_discovered_by_rescan() {
    let dir = tempdir().unwrap();
    let mut session = WatchSession::new(
        quiet_config(&["logs/*.log"]).with_rescan_interval(Duration::from_millis(50)),
        Some(dir.path().to_path_buf()),
        DiagnosticsStore::new(),
    );
    session.start_watching().unwrap();
    assert_eq!(
        session
            .drain_notices()
            .iter()
            .map(|n| n.level())
            .collect::<Vec<_>>(),
        vec![NoticeLevel::Warning]
    );

    let log = write_file(dir.path(), "logs/late.log", "warning: late arrival\n");
    let waited = tokio::time::timeout(Duration::from_secs(5), async {
        while session.sink().get(&log).is_none() {
            assert!(session.process_next(16).await.is_some());
        }
    })
    .await;
    assert!(waited.is_ok());

    let watched: BTreeSet<_> = session.watched_files().into_iter().collect();
    assert!(watched.contains(&log));
}
