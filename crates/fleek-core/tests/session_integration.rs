//! Integration tests for session recording through the store boundary.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use fleek_core::storage::keys;
use fleek_core::{
    ActiveTimer, CoreError, Database, KvStore, ManualClock, MemoryStore, NewTimer,
    SessionRecorder, StorageError, TimerService,
};

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
}

/// Store that rejects writes to one key.
struct FailingKey {
    inner: MemoryStore,
    key: &'static str,
}

impl KvStore for FailingKey {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if key == self.key {
            return Err(StorageError::Unavailable("disk full".into()));
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }
}

#[test]
fn test_recording_twice_is_idempotent() {
    let store = Arc::new(Database::open_memory().unwrap());
    let recorder = SessionRecorder::new(store);
    let def = NewTimer::new("Fleek", "Sessions").into_definition(at(0));

    let mut early = ActiveTimer::new(def.clone(), at(0));
    early.elapsed_time = 30;
    let mut late = early.clone();
    late.elapsed_time = 45;

    let first = recorder.record(&early, at(30)).unwrap();
    let second = recorder.record(&late, at(45)).unwrap();

    assert!(!first.is_duplicate());
    assert!(second.is_duplicate());
    assert_eq!(second.session().total_time, 30);
    assert_eq!(recorder.list().len(), 1);
    assert_eq!(recorder.total_for_timer(&def.id), 30);
}

#[test]
fn test_separate_runs_are_separate_sessions() {
    let clock = Arc::new(ManualClock::new(at(0)));
    let mut service = TimerService::new(Arc::new(MemoryStore::new()), clock.clone());
    let def = service.create_timer(NewTimer::new("Fleek", "Runs")).unwrap();

    for secs in [10, 20] {
        service.start(&def).unwrap();
        clock.advance_secs(secs);
        service.stop(&def.id).unwrap();
    }

    let sessions = service.sessions_for_timer(&def.id);
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].total_time, 20);
    assert_eq!(sessions[1].total_time, 10);
    assert_ne!(sessions[0].id, sessions[1].id);
}

#[test]
fn test_failed_session_write_keeps_timer() {
    let store = Arc::new(FailingKey {
        inner: MemoryStore::new(),
        key: keys::SESSIONS,
    });
    let clock = Arc::new(ManualClock::new(at(0)));
    let mut service = TimerService::new(store, clock.clone());
    let def = NewTimer::new("Fleek", "Failure").into_definition(at(0));
    service.start(&def).unwrap();
    clock.advance_secs(9);

    let err = service.stop(&def.id).unwrap_err();
    assert!(matches!(err, CoreError::SessionNotSaved { .. }));
    assert!(service.get(&def.id).is_some());

    // The timer keeps running and a later stop still sees it.
    clock.advance_secs(1);
    service.tick().unwrap();
    assert_eq!(service.get(&def.id).unwrap().elapsed_time, 10);
}

#[test]
fn test_snapshot_failure_surfaces_but_keeps_state() {
    let store = Arc::new(FailingKey {
        inner: MemoryStore::new(),
        key: keys::ACTIVE_TIMERS,
    });
    let clock = Arc::new(ManualClock::new(at(0)));
    let mut service = TimerService::new(store, clock);
    let def = NewTimer::new("Fleek", "Snapshot").into_definition(at(0));

    let err = service.start(&def).unwrap_err();
    assert!(matches!(err, CoreError::SnapshotNotSaved { .. }));
    assert!(service.get(&def.id).unwrap().is_ticking());
}
