use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every lifecycle transition produces an Event.
/// The presentation layer drains them for notifications and redraws.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        timer_id: String,
        project: String,
        task: String,
        /// An earlier run of the same timer was discarded.
        replaced: bool,
        at: DateTime<Utc>,
    },
    TimerPaused {
        timer_id: String,
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        timer_id: String,
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    TimerStopped {
        timer_id: String,
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    SessionRecorded {
        session_id: String,
        timer_id: String,
        total_secs: u64,
        at: DateTime<Utc>,
    },
    /// A stop for an already recorded run was ignored.
    SessionDuplicate {
        session_id: String,
        timer_id: String,
        at: DateTime<Utc>,
    },
    TimersRestored {
        count: usize,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// The timer this event concerns, if any.
    pub fn timer_id(&self) -> Option<&str> {
        match self {
            Event::TimerStarted { timer_id, .. }
            | Event::TimerPaused { timer_id, .. }
            | Event::TimerResumed { timer_id, .. }
            | Event::TimerStopped { timer_id, .. }
            | Event::SessionRecorded { timer_id, .. }
            | Event::SessionDuplicate { timer_id, .. } => Some(timer_id),
            Event::TimersRestored { .. } => None,
        }
    }
}
