//! Shared async access to a [`TimerService`].
//!
//! Presentation code and the [`Ticker`](crate::Ticker) hold clones of one
//! [`TimerHandle`]. Every call takes the service lock for the duration of a
//! single operation, so transitions never interleave.

use std::collections::HashSet;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{watch, Mutex};
use tracing::debug;

use crate::error::Result;
use crate::service::TimerService;
use crate::session::CompletedTimerSession;
use crate::timer::{ActiveTimer, TimerDefinition};

/// Ids with a stop in progress.
///
/// A second stop for the same id is dropped while the first one is still
/// waiting for the service, instead of queueing behind it.
#[derive(Debug, Clone, Default)]
pub struct StopGuard {
    in_flight: Arc<StdMutex<HashSet<String>>>,
}

/// Releases its id when dropped.
#[derive(Debug)]
pub struct StopTicket {
    id: String,
    in_flight: Arc<StdMutex<HashSet<String>>>,
}

impl StopGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `id`, or `None` if a stop for it is already in flight.
    pub fn begin(&self, id: &str) -> Option<StopTicket> {
        let mut set = match self.in_flight.lock() {
            Ok(set) => set,
            Err(poisoned) => poisoned.into_inner(),
        };
        if !set.insert(id.to_string()) {
            return None;
        }
        Some(StopTicket {
            id: id.to_string(),
            in_flight: self.in_flight.clone(),
        })
    }

    pub fn is_stopping(&self, id: &str) -> bool {
        match self.in_flight.lock() {
            Ok(set) => set.contains(id),
            Err(poisoned) => poisoned.into_inner().contains(id),
        }
    }
}

impl Drop for StopTicket {
    fn drop(&mut self) {
        let mut set = match self.in_flight.lock() {
            Ok(set) => set,
            Err(poisoned) => poisoned.into_inner(),
        };
        set.remove(&self.id);
    }
}

/// Cloneable handle to a service behind an async mutex.
#[derive(Clone)]
pub struct TimerHandle {
    service: Arc<Mutex<TimerService>>,
    stopping: StopGuard,
    updates: watch::Receiver<Vec<ActiveTimer>>,
}

impl TimerHandle {
    pub fn new(service: TimerService) -> Self {
        let updates = service.subscribe();
        Self {
            service: Arc::new(Mutex::new(service)),
            stopping: StopGuard::new(),
            updates,
        }
    }

    /// Lock the service directly for queries or batched calls.
    pub async fn lock(&self) -> tokio::sync::MutexGuard<'_, TimerService> {
        self.service.lock().await
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<ActiveTimer>> {
        self.updates.clone()
    }

    pub async fn start(&self, definition: &TimerDefinition) -> Result<()> {
        self.service.lock().await.start(definition)
    }

    pub async fn pause(&self, id: &str) -> Result<bool> {
        self.service.lock().await.pause(id)
    }

    pub async fn resume(&self, id: &str) -> Result<bool> {
        self.service.lock().await.resume(id)
    }

    pub async fn tick(&self) -> Result<bool> {
        self.service.lock().await.tick()
    }

    /// Stop `id` unless a stop for it is already in flight.
    pub async fn stop(&self, id: &str) -> Result<Option<CompletedTimerSession>> {
        let Some(_ticket) = self.stopping.begin(id) else {
            debug!(timer_id = %id, "stop already in flight, ignoring");
            return Ok(None);
        };
        self.service.lock().await.stop(id)
    }

    pub async fn timers(&self) -> Vec<ActiveTimer> {
        self.service.lock().await.timers().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStore;
    use crate::timer::NewTimer;
    use chrono::{DateTime, Utc};

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn ticket_releases_on_drop() {
        let guard = StopGuard::new();
        let ticket = guard.begin("a").unwrap();
        assert!(guard.begin("a").is_none());
        assert!(guard.begin("b").is_some());
        assert!(guard.is_stopping("a"));
        drop(ticket);
        assert!(!guard.is_stopping("a"));
        assert!(guard.begin("a").is_some());
    }

    #[tokio::test]
    async fn concurrent_stops_record_one_session() {
        let clock = Arc::new(ManualClock::new(at(0)));
        let service = TimerService::new(Arc::new(MemoryStore::new()), clock.clone());
        let handle = TimerHandle::new(service);
        let def = NewTimer::new("p", "t").into_definition(at(0));
        handle.start(&def).await.unwrap();
        clock.advance_secs(10);

        // Hold the service so the first stop waits with its ticket claimed.
        let held = handle.lock().await;
        let first = tokio::spawn({
            let handle = handle.clone();
            let id = def.id.clone();
            async move { handle.stop(&id).await }
        });
        while !handle.stopping.is_stopping(&def.id) {
            tokio::task::yield_now().await;
        }
        assert!(handle.stop(&def.id).await.unwrap().is_none());
        drop(held);

        let session = first.await.unwrap().unwrap().unwrap();
        assert_eq!(session.total_time, 10);
        assert_eq!(handle.lock().await.sessions().len(), 1);
        assert!(handle.timers().await.is_empty());
    }
}
