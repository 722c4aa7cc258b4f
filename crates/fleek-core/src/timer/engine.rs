//! Timer lifecycle engine.
//!
//! The engine is a wall-clock-based state machine over the collection of
//! active timers. It does not read the clock or use internal threads: every
//! transition takes `now` from the caller, and the caller is responsible for
//! calling `tick()` periodically.
//!
//! ## State Transitions
//!
//! ```text
//! (absent) -> Running <-> Paused
//!                |          |
//!                +-> (removed on stop)
//! ```
//!
//! Operations on unknown ids, pausing a paused timer or resuming a running
//! one are silent no-ops that return `None`.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new();
//! engine.start(definition, clock.now());
//! // Once per second:
//! engine.tick(clock.now());
//! ```

use chrono::{DateTime, Utc};

use super::active::ActiveTimer;
use super::definition::TimerDefinition;
use crate::events::Event;

#[derive(Debug, Clone, Default)]
pub struct TimerEngine {
    timers: Vec<ActiveTimer>,
}

impl TimerEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from restored entries. Later duplicates of an id win.
    pub fn from_timers(timers: Vec<ActiveTimer>) -> Self {
        let mut engine = Self::new();
        for timer in timers {
            engine.timers.retain(|t| t.id != timer.id);
            engine.timers.push(timer);
        }
        engine
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn timers(&self) -> &[ActiveTimer] {
        &self.timers
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ActiveTimer> {
        self.timers.iter().find(|t| t.id == id)
    }

    /// The running, unpaused timer with the latest start time.
    /// On equal start times the most recently inserted one wins.
    pub fn current_running(&self) -> Option<&ActiveTimer> {
        self.timers
            .iter()
            .filter(|t| t.is_ticking())
            .max_by_key(|t| t.start_time)
    }

    pub fn has_running(&self) -> bool {
        self.timers.iter().any(ActiveTimer::is_ticking)
    }

    /// Sum of elapsed seconds across running, unpaused timers.
    pub fn total_running_elapsed(&self) -> u64 {
        self.timers
            .iter()
            .filter(|t| t.is_ticking())
            .map(|t| t.elapsed_time)
            .sum()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a run of `definition`, replacing any active run with the same id.
    pub fn start(&mut self, definition: TimerDefinition, now: DateTime<Utc>) -> Option<Event> {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != definition.id);
        let replaced = self.timers.len() != before;

        let timer = ActiveTimer::new(definition, now);
        let event = Event::TimerStarted {
            timer_id: timer.id.clone(),
            project: timer.timer_data.project.clone(),
            task: timer.timer_data.task.clone(),
            replaced,
            at: now,
        };
        self.timers.push(timer);
        Some(event)
    }

    pub fn pause(&mut self, id: &str, now: DateTime<Utc>) -> Option<Event> {
        let timer = self.get_mut(id)?;
        if !timer.is_ticking() {
            return None;
        }
        // Freeze the elapsed time first.
        timer.elapsed_time = timer.elapsed_at(now);
        timer.is_paused = true;
        timer.paused_at = Some(now);
        Some(Event::TimerPaused {
            timer_id: timer.id.clone(),
            elapsed_secs: timer.elapsed_time,
            at: now,
        })
    }

    pub fn resume(&mut self, id: &str, now: DateTime<Utc>) -> Option<Event> {
        let timer = self.get_mut(id)?;
        if !(timer.is_running && timer.is_paused) {
            return None;
        }
        // Re-anchor so that `elapsed_at` continues from the frozen value.
        timer.start_time = match timer.paused_at {
            Some(paused_at) if paused_at <= now => timer.start_time + (now - paused_at),
            _ => i64::try_from(timer.elapsed_time)
                .ok()
                .and_then(chrono::Duration::try_seconds)
                .and_then(|frozen| now.checked_sub_signed(frozen))
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
        };
        timer.paused_time = 0;
        timer.paused_at = None;
        timer.is_paused = false;
        Some(Event::TimerResumed {
            timer_id: timer.id.clone(),
            elapsed_secs: timer.elapsed_time,
            at: now,
        })
    }

    /// Call periodically. Returns `true` when any elapsed value changed.
    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        let mut changed = false;
        for timer in self.timers.iter_mut().filter(|t| t.is_ticking()) {
            let elapsed = timer.elapsed_at(now);
            if elapsed != timer.elapsed_time {
                timer.elapsed_time = elapsed;
                changed = true;
            }
        }
        changed
    }

    /// The entry as it stands at `now`, ready to be recorded.
    ///
    /// Running timers get their elapsed time refreshed; paused ones keep the
    /// frozen value. The entry itself is left in place.
    pub fn finish(&mut self, id: &str, now: DateTime<Utc>) -> Option<ActiveTimer> {
        let timer = self.get_mut(id)?;
        if timer.is_ticking() {
            timer.elapsed_time = timer.elapsed_at(now);
        }
        let mut finished = timer.clone();
        finished.end_time = Some(now);
        Some(finished)
    }

    /// Drop the entry for `id`.
    pub fn remove(&mut self, id: &str) -> Option<ActiveTimer> {
        let index = self.timers.iter().position(|t| t.id == id)?;
        Some(self.timers.remove(index))
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn get_mut(&mut self, id: &str) -> Option<&mut ActiveTimer> {
        self.timers.iter_mut().find(|t| t.id == id)
    }
}
