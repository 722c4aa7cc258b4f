//! Completed sessions and their recorder.
//!
//! A session's id is derived from the run it records,
//! `session_{timerId}_{startTimeMillis}`, so recording the same run twice
//! is detectable and becomes a no-op.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::StorageError;
use crate::storage::{keys, read_list, write_list, SharedStore};
use crate::timer::{ActiveTimer, TimerDefinition};

/// Immutable record of one finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedTimerSession {
    pub id: String,
    pub timer_id: String,
    pub timer_data: TimerDefinition,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Elapsed seconds, pauses excluded.
    pub total_time: u64,
    pub completed_at: DateTime<Utc>,
}

impl CompletedTimerSession {
    /// Whether this session records the run `(timer_id, start_time)`.
    pub fn is_run(&self, timer_id: &str, start_time: DateTime<Utc>) -> bool {
        self.timer_id == timer_id && self.start_time == start_time
    }
}

/// Deterministic session id for a run.
pub fn session_id(timer_id: &str, start_time: DateTime<Utc>) -> String {
    format!("session_{timer_id}_{}", start_time.timestamp_millis())
}

/// Result of [`SessionRecorder::record`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded(CompletedTimerSession),
    /// The run was already recorded; nothing was written.
    Duplicate(CompletedTimerSession),
}

impl RecordOutcome {
    pub fn session(&self) -> &CompletedTimerSession {
        match self {
            RecordOutcome::Recorded(session) | RecordOutcome::Duplicate(session) => session,
        }
    }

    pub fn into_session(self) -> CompletedTimerSession {
        match self {
            RecordOutcome::Recorded(session) | RecordOutcome::Duplicate(session) => session,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, RecordOutcome::Duplicate(_))
    }
}

/// Appends completed sessions to the catalog under [`keys::SESSIONS`].
#[derive(Clone)]
pub struct SessionRecorder {
    store: SharedStore,
}

impl SessionRecorder {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Record the completion of `timer` at `now`.
    ///
    /// Returns [`RecordOutcome::Duplicate`] when a session with the same id
    /// or the same `(timer_id, start_time)` already exists.
    ///
    /// # Errors
    /// Returns an error if the catalog cannot be read or written. A corrupted
    /// catalog is never overwritten.
    pub fn record(
        &self,
        timer: &ActiveTimer,
        now: DateTime<Utc>,
    ) -> Result<RecordOutcome, StorageError> {
        let id = session_id(&timer.id, timer.start_time);
        let mut sessions: Vec<CompletedTimerSession> =
            read_list(self.store.as_ref(), keys::SESSIONS)?;

        if let Some(existing) = sessions
            .iter()
            .find(|s| s.id == id || s.is_run(&timer.id, timer.start_time))
        {
            warn!(session_id = %id, timer_id = %timer.id, "session already recorded, skipping");
            return Ok(RecordOutcome::Duplicate(existing.clone()));
        }

        let session = CompletedTimerSession {
            id,
            timer_id: timer.id.clone(),
            timer_data: timer.timer_data.clone(),
            start_time: timer.start_time,
            end_time: now,
            total_time: timer.elapsed_time,
            completed_at: now,
        };
        sessions.push(session.clone());
        write_list(self.store.as_ref(), keys::SESSIONS, &sessions)?;

        info!(
            session_id = %session.id,
            timer_id = %session.timer_id,
            total_secs = session.total_time,
            "recorded session"
        );
        Ok(RecordOutcome::Recorded(session))
    }

    /// Every recorded session, in completion order.
    pub fn list(&self) -> Vec<CompletedTimerSession> {
        match read_list(self.store.as_ref(), keys::SESSIONS) {
            Ok(sessions) => sessions,
            Err(e) => {
                warn!(error = %e, "failed to read completed sessions");
                Vec::new()
            }
        }
    }

    /// Sessions of one timer, most recent first.
    pub fn for_timer(&self, timer_id: &str) -> Vec<CompletedTimerSession> {
        let mut sessions: Vec<_> = self
            .list()
            .into_iter()
            .filter(|s| s.timer_id == timer_id)
            .collect();
        sessions.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        sessions
    }

    /// Total recorded seconds for one timer.
    pub fn total_for_timer(&self, timer_id: &str) -> u64 {
        self.list()
            .iter()
            .filter(|s| s.timer_id == timer_id)
            .map(|s| s.total_time)
            .sum()
    }
}
