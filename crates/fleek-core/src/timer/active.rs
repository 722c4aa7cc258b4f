//! A single in-progress run of a timer definition.
//!
//! Elapsed time is derived from the wall clock at one-second resolution:
//!
//! ```text
//! elapsed = max(0, floor((now - start_time) / 1s) - paused_time)
//! ```
//!
//! Resuming shifts `start_time` forward by the paused gap, so `paused_time`
//! is normally zero and only carries values from older snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::definition::TimerDefinition;
use super::format::format_clock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTimer {
    /// Same as `timer_data.id`; one active run per definition.
    pub id: String,
    pub timer_data: TimerDefinition,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    /// Accumulated paused seconds subtracted from the wall-clock span.
    #[serde(default)]
    pub paused_time: u64,
    /// When the current pause began.
    #[serde(default)]
    pub paused_at: Option<DateTime<Utc>>,
    pub is_paused: bool,
    pub is_running: bool,
    /// Last computed elapsed seconds. Frozen while paused.
    pub elapsed_time: u64,
}

impl ActiveTimer {
    /// A fresh, running entry for `definition` starting at `now`.
    pub fn new(definition: TimerDefinition, now: DateTime<Utc>) -> Self {
        Self {
            id: definition.id.clone(),
            timer_data: definition,
            start_time: now,
            end_time: None,
            paused_time: 0,
            paused_at: None,
            is_paused: false,
            is_running: true,
            elapsed_time: 0,
        }
    }

    /// Running and not paused.
    pub fn is_ticking(&self) -> bool {
        self.is_running && !self.is_paused
    }

    /// Elapsed seconds as of `now`, ignoring the frozen value.
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> u64 {
        elapsed_since(self.start_time, now, self.paused_time)
    }

    /// `MM:SS`, or `HH:MM:SS` from one hour on.
    pub fn display_time(&self) -> String {
        format_clock(self.elapsed_time)
    }
}

/// Whole seconds from `from` to `to`, rounded towards negative infinity.
pub fn whole_seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_milliseconds().div_euclid(1000)
}

/// Non-negative elapsed seconds since `start`, minus `paused_secs`.
pub fn elapsed_since(start: DateTime<Utc>, now: DateTime<Utc>, paused_secs: u64) -> u64 {
    let paused = i64::try_from(paused_secs).unwrap_or(i64::MAX);
    clamp_secs(whole_seconds_between(start, now).saturating_sub(paused))
}

pub(crate) fn clamp_secs(secs: i64) -> u64 {
    u64::try_from(secs).unwrap_or(0)
}
