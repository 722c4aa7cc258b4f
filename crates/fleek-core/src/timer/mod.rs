mod active;
mod definition;
mod engine;
mod format;

pub use active::{elapsed_since, whole_seconds_between, ActiveTimer};
pub(crate) use active::clamp_secs;
pub use definition::{NewTimer, TimerDefinition, DEFAULT_MAX_DESCRIPTION_LEN};
pub use engine::TimerEngine;
pub use format::{format_clock, format_duration};
