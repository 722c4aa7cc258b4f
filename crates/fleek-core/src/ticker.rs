//! Periodic elapsed-time refresh.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error};

use crate::handle::TimerHandle;

/// Background task calling [`TimerHandle::tick`] once per period.
///
/// The task is aborted on [`cancel`](Self::cancel) or when the ticker is
/// dropped. Requires a running tokio runtime.
pub struct Ticker {
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn spawn(timers: TimerHandle, period: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                match timers.tick().await {
                    Ok(true) => debug!("elapsed times refreshed"),
                    Ok(false) => {}
                    Err(e) => error!(error = %e, "tick failed"),
                }
            }
        });
        Self {
            handle: Some(handle),
        }
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::service::TimerService;
    use crate::storage::MemoryStore;
    use crate::timer::NewTimer;
    use chrono::{DateTime, Utc};
    use std::sync::Arc;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    async fn running_handle() -> (TimerHandle, Arc<ManualClock>, String) {
        let clock = Arc::new(ManualClock::new(at(0)));
        let service = TimerService::new(Arc::new(MemoryStore::new()), clock.clone());
        let handle = TimerHandle::new(service);
        let def = NewTimer::new("p", "t").into_definition(at(0));
        handle.start(&def).await.unwrap();
        (handle, clock, def.id)
    }

    #[tokio::test(start_paused = true)]
    async fn refreshes_elapsed_each_period() {
        let (handle, clock, id) = running_handle().await;
        let mut rx = handle.subscribe();
        let _ = rx.borrow_and_update();
        let _ticker = Ticker::spawn(handle.clone(), Duration::from_secs(1));

        clock.advance_secs(3);
        time::sleep(Duration::from_millis(1100)).await;

        assert!(rx.has_changed().unwrap());
        let timers = handle.timers().await;
        assert_eq!(timers.iter().find(|t| t.id == id).unwrap().elapsed_time, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_ticker_stops_refreshing() {
        let (handle, clock, _) = running_handle().await;
        let mut ticker = Ticker::spawn(handle.clone(), Duration::from_secs(1));
        assert!(ticker.is_running());

        ticker.cancel();
        assert!(!ticker.is_running());
        clock.advance_secs(5);
        time::sleep(Duration::from_secs(3)).await;

        assert_eq!(handle.timers().await[0].elapsed_time, 0);
    }
}
