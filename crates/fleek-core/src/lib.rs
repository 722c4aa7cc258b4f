//! # Fleek Core Library
//!
//! Core logic for Fleek, a multi-timer time tracker. Users keep a catalog of
//! saved timers (project, task, description), run several of them at once,
//! pause and resume them, and stop them to produce completed sessions.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A wall-clock state machine over the active timers.
//!   Elapsed time is always derived from `now - start - paused`, never
//!   accumulated, and the caller invokes `tick()` to refresh it
//! - **Storage**: A key-value store (SQLite or in-memory) holding the timer
//!   catalog, completed sessions and a snapshot of the active timers, plus
//!   TOML configuration
//! - **Service**: Wires the engine to a [`Clock`], the store and the session
//!   recorder so every transition is persisted and published
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Active-timer state machine
//! - [`TimerService`]: Engine plus persistence and change notification
//! - [`SessionRecorder`]: Idempotent completed-session writer
//! - [`ActiveTimerStore`]: Snapshot and gap-aware restore
//! - [`Ticker`]: Background refresh task

pub mod clock;
pub mod error;
pub mod events;
pub mod handle;
pub mod service;
pub mod session;
pub mod storage;
pub mod ticker;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::Event;
pub use handle::{StopGuard, StopTicket, TimerHandle};
pub use service::TimerService;
pub use session::{session_id, CompletedTimerSession, RecordOutcome, SessionRecorder};
pub use storage::{
    ActiveTimerStore, Config, Database, KvStore, MemoryStore, SerializedActiveTimer, SharedStore,
    TimerCatalog,
};
pub use ticker::Ticker;
pub use timer::{
    format_clock, format_duration, ActiveTimer, NewTimer, TimerDefinition, TimerEngine,
};
