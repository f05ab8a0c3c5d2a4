//! Facebot Scheduler - decides when publish attempts happen.
//!
//! A [`TriggerMode`] is resolved once from configuration and then
//! [`drive`]n: the callback is awaited for every trigger, so a single
//! schedule never produces overlapping publish attempts.

pub mod scheduler;
pub mod trigger;

pub use scheduler::{drive, next_daily_run, next_fire, parse_time_of_day};
pub use trigger::{ScheduleError, TriggerMode, TriggerSource};
