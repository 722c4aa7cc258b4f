//! Timer service: the engine wired to its clock, store and recorder.
//!
//! The service owns the only copy of the active-timer collection. Each
//! operation reads the clock once, applies one engine transition, publishes
//! the new collection to subscribers and writes the snapshot.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::session::{CompletedTimerSession, RecordOutcome, SessionRecorder};
use crate::storage::{ActiveTimerStore, Config, Database, SharedStore, TimerCatalog};
use crate::timer::{ActiveTimer, NewTimer, TimerDefinition, TimerEngine, DEFAULT_MAX_DESCRIPTION_LEN};

pub struct TimerService {
    engine: TimerEngine,
    clock: Arc<dyn Clock>,
    catalog: TimerCatalog,
    recorder: SessionRecorder,
    snapshots: ActiveTimerStore,
    max_description_len: usize,
    events: Vec<Event>,
    updates: watch::Sender<Vec<ActiveTimer>>,
}

impl TimerService {
    /// Build a service over `store`, restoring the previous snapshot.
    pub fn new(store: SharedStore, clock: Arc<dyn Clock>) -> Self {
        let mut service = Self::without_restore(store, clock);
        service.restore();
        service
    }

    /// Build a service that starts with no active timers.
    pub fn without_restore(store: SharedStore, clock: Arc<dyn Clock>) -> Self {
        let (updates, _) = watch::channel(Vec::new());
        Self {
            engine: TimerEngine::new(),
            clock,
            catalog: TimerCatalog::new(store.clone()),
            recorder: SessionRecorder::new(store.clone()),
            snapshots: ActiveTimerStore::new(store),
            max_description_len: DEFAULT_MAX_DESCRIPTION_LEN,
            events: Vec::new(),
            updates,
        }
    }

    /// Open the on-disk store named by `config` with the system clock.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened.
    pub fn open(config: &Config) -> Result<Self> {
        let store: SharedStore = Arc::new(Database::open(&config.database_file)?);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let mut service = Self::without_restore(store, clock);
        service.max_description_len = config.max_description_len;
        if config.restore_on_startup {
            service.restore();
        }
        Ok(service)
    }

    pub fn with_max_description_len(mut self, max: usize) -> Self {
        self.max_description_len = max;
        self
    }

    fn restore(&mut self) {
        let now = self.clock.now();
        self.engine = TimerEngine::from_timers(self.snapshots.restore(now));
        if !self.engine.is_empty() {
            info!(count = self.engine.len(), "restored active timers");
            self.events.push(Event::TimersRestored {
                count: self.engine.len(),
                at: now,
            });
        }
        self.updates.send_replace(self.engine.timers().to_vec());
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn timers(&self) -> &[ActiveTimer] {
        self.engine.timers()
    }

    pub fn get(&self, id: &str) -> Option<&ActiveTimer> {
        self.engine.get(id)
    }

    pub fn current_running(&self) -> Option<&ActiveTimer> {
        self.engine.current_running()
    }

    pub fn has_running(&self) -> bool {
        self.engine.has_running()
    }

    pub fn total_running_elapsed(&self) -> u64 {
        self.engine.total_running_elapsed()
    }

    pub fn catalog(&self) -> &TimerCatalog {
        &self.catalog
    }

    pub fn sessions(&self) -> Vec<CompletedTimerSession> {
        self.recorder.list()
    }

    pub fn sessions_for_timer(&self, timer_id: &str) -> Vec<CompletedTimerSession> {
        self.recorder.for_timer(timer_id)
    }

    /// Receives the collection after every transition and every tick that
    /// changed an elapsed value.
    pub fn subscribe(&self) -> watch::Receiver<Vec<ActiveTimer>> {
        self.updates.subscribe()
    }

    /// Take the events produced since the last call.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Validate `input` and save it to the catalog.
    ///
    /// # Errors
    /// Returns a validation error, or [`CoreError::TimerNotSaved`].
    pub fn create_timer(&self, input: NewTimer) -> Result<TimerDefinition> {
        input.validate(self.max_description_len)?;
        let definition = input.into_definition(self.clock.now());
        self.catalog.save(&definition)?;
        debug!(timer_id = %definition.id, "created timer");
        Ok(definition)
    }

    /// Start a run of `definition`, replacing any active run of it.
    ///
    /// # Errors
    /// Returns [`CoreError::SnapshotNotSaved`]; the timer is running anyway.
    pub fn start(&mut self, definition: &TimerDefinition) -> Result<()> {
        let now = self.clock.now();
        let event = self.engine.start(definition.clone(), now);
        self.events.extend(event);
        info!(timer_id = %definition.id, "timer started");
        self.commit(now)
    }

    /// Start a saved timer by id. Returns `false` for an unknown id.
    ///
    /// # Errors
    /// Returns [`CoreError::SnapshotNotSaved`].
    pub fn start_saved(&mut self, id: &str) -> Result<bool> {
        match self.catalog.get(id) {
            Some(definition) => self.start(&definition).map(|()| true),
            None => Ok(false),
        }
    }

    /// Returns whether the timer was paused.
    ///
    /// # Errors
    /// Returns [`CoreError::SnapshotNotSaved`].
    pub fn pause(&mut self, id: &str) -> Result<bool> {
        let now = self.clock.now();
        match self.engine.pause(id, now) {
            Some(event) => {
                self.events.push(event);
                self.commit(now)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Returns whether the timer was resumed.
    ///
    /// # Errors
    /// Returns [`CoreError::SnapshotNotSaved`].
    pub fn resume(&mut self, id: &str) -> Result<bool> {
        let now = self.clock.now();
        match self.engine.resume(id, now) {
            Some(event) => {
                self.events.push(event);
                self.commit(now)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Refresh elapsed times. Persists and publishes only on change.
    ///
    /// # Errors
    /// Returns [`CoreError::SnapshotNotSaved`].
    pub fn tick(&mut self) -> Result<bool> {
        let now = self.clock.now();
        if !self.engine.tick(now) {
            return Ok(false);
        }
        self.commit(now)?;
        Ok(true)
    }

    /// Stop the timer and record its session.
    ///
    /// Returns `None` if no such timer is active. When the run was already
    /// recorded the existing session is returned and nothing is written.
    ///
    /// # Errors
    /// Returns [`CoreError::SessionNotSaved`] if the session could not be
    /// written; the timer then stays active. Returns
    /// [`CoreError::SnapshotNotSaved`] if only the snapshot failed.
    pub fn stop(&mut self, id: &str) -> Result<Option<CompletedTimerSession>> {
        let now = self.clock.now();
        let Some(finished) = self.engine.finish(id, now) else {
            debug!(timer_id = %id, "stop ignored, timer not active");
            return Ok(None);
        };

        let outcome = self
            .recorder
            .record(&finished, now)
            .map_err(|source| CoreError::SessionNotSaved {
                timer_id: id.to_string(),
                source,
            })?;

        self.engine.remove(id);
        self.events.push(Event::TimerStopped {
            timer_id: id.to_string(),
            elapsed_secs: finished.elapsed_time,
            at: now,
        });
        self.events.push(match &outcome {
            RecordOutcome::Recorded(session) => Event::SessionRecorded {
                session_id: session.id.clone(),
                timer_id: session.timer_id.clone(),
                total_secs: session.total_time,
                at: now,
            },
            RecordOutcome::Duplicate(session) => Event::SessionDuplicate {
                session_id: session.id.clone(),
                timer_id: session.timer_id.clone(),
                at: now,
            },
        });
        info!(timer_id = %id, elapsed_secs = finished.elapsed_time, "timer stopped");

        self.commit(now)?;
        Ok(Some(outcome.into_session()))
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn commit(&mut self, now: chrono::DateTime<chrono::Utc>) -> Result<()> {
        self.updates.send_replace(self.engine.timers().to_vec());
        self.snapshots
            .save(self.engine.timers(), now)
            .map_err(|source| CoreError::SnapshotNotSaved { source })
    }
}
