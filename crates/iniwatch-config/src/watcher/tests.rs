//! Tests for the stable change monitor.

use super::state::{classify, FsChange, MonitorState, TickAction};
use super::*;
use iniwatch_common::ConfigError;
use notify::event::{
    AccessKind, CreateKind, DataChange, MetadataKind, ModifyKind, RemoveKind, RenameMode,
};
use notify::EventKind;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

const TICK: Duration = Duration::from_millis(100);
const WAIT: Duration = Duration::from_secs(3);

fn rearm_ok() -> Result<(), ConfigError> {
    Ok(())
}

#[test]
fn classify_event_kinds() {
    assert_eq!(
        classify(&EventKind::Modify(ModifyKind::Data(DataChange::Content))),
        Some(FsChange::Write)
    );
    assert_eq!(
        classify(&EventKind::Modify(ModifyKind::Any)),
        Some(FsChange::Write)
    );
    assert_eq!(
        classify(&EventKind::Modify(ModifyKind::Name(RenameMode::From))),
        Some(FsChange::Rename)
    );
    assert_eq!(
        classify(&EventKind::Remove(RemoveKind::File)),
        Some(FsChange::Remove)
    );
    assert_eq!(
        classify(&EventKind::Modify(ModifyKind::Metadata(
            MetadataKind::Permissions
        ))),
        None
    );
    assert_eq!(classify(&EventKind::Access(AccessKind::Any)), None);
    assert_eq!(classify(&EventKind::Create(CreateKind::File)), None);
}

#[test]
fn quiet_tick_is_idle() {
    let mut state = MonitorState::default();
    assert_eq!(state.on_tick(rearm_ok), TickAction::Idle);
    assert!(state.is_quiet());
}

#[test]
fn single_write_settles_once() {
    let mut state = MonitorState::default();
    state.record(FsChange::Write);
    assert_eq!(state.on_tick(rearm_ok), TickAction::Settle);
    assert_eq!(state.on_tick(rearm_ok), TickAction::Idle);
}

#[test]
fn burst_of_writes_coalesces() {
    let mut state = MonitorState::default();
    for _ in 0..25 {
        state.record(FsChange::Write);
    }
    assert_eq!(state.on_tick(rearm_ok), TickAction::Settle);
    assert_eq!(state.on_tick(rearm_ok), TickAction::Idle);
}

#[test]
fn remove_then_reappear_settles_on_following_tick() {
    let mut state = MonitorState::default();
    state.record(FsChange::Write);
    state.record(FsChange::Remove);

    let mut rearmed = 0;
    let action = state.on_tick(|| {
        rearmed += 1;
        Ok(())
    });
    assert_eq!(action, TickAction::Rearmed);
    assert_eq!(rearmed, 1);

    assert_eq!(state.on_tick(rearm_ok), TickAction::Settle);
    assert_eq!(state.on_tick(rearm_ok), TickAction::Idle);
}

#[test]
fn rename_and_remove_collapse_into_one_rearm() {
    let mut state = MonitorState::default();
    state.record(FsChange::Rename);
    state.record(FsChange::Remove);
    state.record(FsChange::Rename);

    let mut calls = 0;
    let _ = state.on_tick(|| {
        calls += 1;
        Ok(())
    });
    assert_eq!(calls, 1);
}

#[test]
fn failed_rearm_is_lost() {
    let mut state = MonitorState::default();
    state.record(FsChange::Remove);
    let action = state.on_tick(|| Err(ConfigError::WatchLost("/tmp/gone.ini".into())));
    assert_eq!(
        action,
        TickAction::Lost(ConfigError::WatchLost("/tmp/gone.ini".into()))
    );
}

#[test]
fn rearm_not_attempted_without_identity_event() {
    let mut state = MonitorState::default();
    state.record(FsChange::Write);
    let action = state.on_tick(|| panic!("rearm should not run"));
    assert_eq!(action, TickAction::Settle);
}

fn append(path: &Path, line: &str) {
    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .open(path)
        .unwrap();
    writeln!(file, "{line}").unwrap();
    file.sync_all().unwrap();
}

#[tokio::test]
async fn start_on_missing_path_fails() {
    let monitor = StableChangeMonitor::new("/tmp/nonexistent_iniwatch_monitor.ini", TICK);
    let err = monitor.start(CancellationToken::new()).unwrap_err();
    assert!(matches!(err, ConfigError::WatchError(_)));
}

#[test]
fn zero_tick_is_clamped() {
    let monitor = StableChangeMonitor::new("/tmp/app.ini", Duration::ZERO);
    assert_eq!(monitor.tick(), Duration::from_millis(1));
    assert_eq!(monitor.path(), Path::new("/tmp/app.ini"));
}

#[tokio::test]
async fn write_produces_one_settle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.ini");
    std::fs::write(&path, "one=1\n").unwrap();

    let cancel = CancellationToken::new();
    let mut handle = StableChangeMonitor::new(&path, TICK)
        .start(cancel.clone())
        .unwrap();

    append(&path, "two=2");

    let signal = timeout(WAIT, handle.next()).await.unwrap();
    assert_eq!(signal, Some(MonitorSignal::Settled));

    // Nothing else changed, so nothing else arrives
    assert!(timeout(TICK * 4, handle.next()).await.is_err());

    cancel.cancel();
    handle.join().await;
}

#[tokio::test]
async fn burst_of_writes_produces_one_settle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.ini");
    std::fs::write(&path, "").unwrap();

    let cancel = CancellationToken::new();
    let mut handle = StableChangeMonitor::new(&path, Duration::from_millis(500))
        .start(cancel.clone())
        .unwrap();

    for i in 0..10 {
        append(&path, &format!("key{i}=value{i}"));
    }

    let signal = timeout(WAIT, handle.next()).await.unwrap();
    assert_eq!(signal, Some(MonitorSignal::Settled));
    assert!(timeout(Duration::from_millis(1200), handle.next())
        .await
        .is_err());

    cancel.cancel();
    handle.join().await;
}

#[tokio::test]
async fn atomic_replace_is_treated_as_write() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.ini");
    std::fs::write(&path, "one=1\n").unwrap();

    let cancel = CancellationToken::new();
    let mut handle = StableChangeMonitor::new(&path, TICK)
        .start(cancel.clone())
        .unwrap();

    let staged = dir.path().join("app.ini.tmp");
    std::fs::write(&staged, "one=2\n").unwrap();
    std::fs::rename(&staged, &path).unwrap();

    let signal = timeout(WAIT, handle.next()).await.unwrap();
    assert_eq!(signal, Some(MonitorSignal::Settled));

    // The new file is being watched now
    append(&path, "two=2");
    let signal = timeout(WAIT, handle.next()).await.unwrap();
    assert_eq!(signal, Some(MonitorSignal::Settled));

    cancel.cancel();
    handle.join().await;
}

#[tokio::test]
async fn removed_file_is_lost() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.ini");
    std::fs::write(&path, "one=1\n").unwrap();

    let mut handle = StableChangeMonitor::new(&path, TICK)
        .start(CancellationToken::new())
        .unwrap();

    std::fs::remove_file(&path).unwrap();

    let signal = timeout(WAIT, handle.next()).await.unwrap();
    assert!(matches!(
        signal,
        Some(MonitorSignal::Lost(ConfigError::WatchLost(_)))
    ));

    // Lost is final
    let after = timeout(WAIT, handle.next()).await.unwrap();
    assert_eq!(after, None);
    handle.join().await;
}

#[tokio::test]
async fn cancel_stops_monitor() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.ini");
    std::fs::write(&path, "one=1\n").unwrap();

    let cancel = CancellationToken::new();
    let mut handle = StableChangeMonitor::new(&path, TICK)
        .start(cancel.clone())
        .unwrap();

    cancel.cancel();
    append(&path, "two=2");

    let signal = timeout(WAIT, handle.next()).await.unwrap();
    assert_eq!(signal, None);
    timeout(WAIT, handle.join()).await.unwrap();
}

#[tokio::test]
async fn steady_writes_still_settle() {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.ini");
    std::fs::write(&path, "").unwrap();

    let cancel = CancellationToken::new();
    let mut handle = StableChangeMonitor::new(&path, TICK)
        .start(cancel.clone())
        .unwrap();

    // Keep the notification queue busy for the whole test
    let writing = Arc::new(AtomicBool::new(true));
    let writer = {
        let writing = writing.clone();
        let path = path.clone();
        std::thread::spawn(move || {
            let mut i = 0;
            while writing.load(Ordering::Relaxed) {
                append(&path, &format!("key{i}=value{i}"));
                i += 1;
            }
        })
    };

    let signal = timeout(WAIT, handle.next()).await;
    writing.store(false, Ordering::Relaxed);
    writer.join().unwrap();

    assert_eq!(signal.unwrap(), Some(MonitorSignal::Settled));

    cancel.cancel();
    handle.join().await;
}
