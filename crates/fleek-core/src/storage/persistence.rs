//! Snapshot and restore of the active timers.
//!
//! Every entry is written together with `lastUpdateTime`, the moment of the
//! snapshot. On restore, time that passed while the process was not running
//! is added back for timers that were running and not paused:
//!
//! ```text
//! elapsed = floor((lastUpdate - start) / 1s) - pausedTime
//!         + floor((now - lastUpdate) / 1s)        (running, not paused)
//! elapsed = elapsedTime                           (paused)
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{keys, read_list, write_list, SharedStore};
use crate::error::StorageError;
use crate::timer::{clamp_secs, whole_seconds_between, ActiveTimer, TimerDefinition};

/// Stored form of an [`ActiveTimer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedActiveTimer {
    pub id: String,
    pub timer_data: TimerDefinition,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub paused_time: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paused_at: Option<DateTime<Utc>>,
    /// Frozen elapsed seconds; authoritative only for paused entries.
    #[serde(default)]
    pub elapsed_time: Option<u64>,
    pub is_paused: bool,
    pub is_running: bool,
    pub last_update_time: DateTime<Utc>,
}

impl SerializedActiveTimer {
    pub fn from_timer(timer: &ActiveTimer, now: DateTime<Utc>) -> Self {
        Self {
            id: timer.id.clone(),
            timer_data: timer.timer_data.clone(),
            start_time: timer.start_time,
            end_time: timer.end_time,
            paused_time: timer.paused_time,
            paused_at: timer.paused_at,
            elapsed_time: Some(timer.elapsed_time),
            is_paused: timer.is_paused,
            is_running: timer.is_running,
            last_update_time: now,
        }
    }

    /// Rebuild the entry as of `now`.
    pub fn into_timer(self, now: DateTime<Utc>) -> ActiveTimer {
        let paused = i64::try_from(self.paused_time).unwrap_or(i64::MAX);
        let base = whole_seconds_between(self.start_time, self.last_update_time)
            .saturating_sub(paused);

        let elapsed = if self.is_paused {
            self.elapsed_time.unwrap_or_else(|| clamp_secs(base))
        } else {
            // A clock that moved backwards contributes nothing.
            let gap = whole_seconds_between(self.last_update_time, now).max(0);
            clamp_secs(base.saturating_add(gap))
        };

        ActiveTimer {
            id: self.id,
            timer_data: self.timer_data,
            start_time: self.start_time,
            end_time: self.end_time,
            paused_time: self.paused_time,
            paused_at: self.paused_at,
            is_paused: self.is_paused,
            is_running: self.is_running,
            elapsed_time: elapsed,
        }
    }
}

/// Reads and writes the active-timer snapshot under [`keys::ACTIVE_TIMERS`].
#[derive(Clone)]
pub struct ActiveTimerStore {
    store: SharedStore,
}

impl ActiveTimerStore {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Write the snapshot, or remove the key when there is nothing active.
    ///
    /// # Errors
    /// Returns an error if encoding fails or the store rejects the write.
    pub fn save(&self, timers: &[ActiveTimer], now: DateTime<Utc>) -> Result<(), StorageError> {
        if timers.is_empty() {
            return self.store.remove(keys::ACTIVE_TIMERS);
        }
        let serialized: Vec<SerializedActiveTimer> = timers
            .iter()
            .map(|t| SerializedActiveTimer::from_timer(t, now))
            .collect();
        write_list(self.store.as_ref(), keys::ACTIVE_TIMERS, &serialized)
    }

    /// Load the previous snapshot. Any read failure yields no timers; a
    /// corrupted snapshot is also removed.
    pub fn restore(&self, now: DateTime<Utc>) -> Vec<ActiveTimer> {
        let serialized: Vec<SerializedActiveTimer> =
            match read_list(self.store.as_ref(), keys::ACTIVE_TIMERS) {
                Ok(serialized) => serialized,
                Err(e @ StorageError::Corrupted { .. }) => {
                    warn!(error = %e, "discarding corrupted active-timer snapshot");
                    if let Err(e) = self.store.remove(keys::ACTIVE_TIMERS) {
                        warn!(error = %e, "failed to clear corrupted snapshot");
                    }
                    return Vec::new();
                }
                Err(e) => {
                    warn!(error = %e, "failed to load active-timer snapshot");
                    return Vec::new();
                }
            };

        let total = serialized.len();
        let timers: Vec<ActiveTimer> = serialized
            .into_iter()
            .filter(|s| s.is_running)
            .map(|s| s.into_timer(now))
            .collect();
        debug!(restored = timers.len(), skipped = total - timers.len(), "restored active timers");
        timers
    }

    /// Remove the snapshot.
    ///
    /// # Errors
    /// Returns an error if the store rejects the removal.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(keys::ACTIVE_TIMERS)
    }
}
