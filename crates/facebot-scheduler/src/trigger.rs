//! Publish trigger modes.

use crate::scheduler::parse_time_of_day;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Errors building a trigger mode from configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    /// A time of day could not be parsed.
    #[error("invalid time of day '{value}': expected HH:MM or HH:MM:SS")]
    InvalidTime {
        /// The rejected value
        value: String,
    },

    /// A zero-length interval was requested.
    #[error("post interval must be greater than zero")]
    ZeroInterval,
}

/// How publish attempts are triggered. Exactly one mode is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerMode {
    /// Publish once immediately, then stop.
    Once,
    /// Publish, sleep the period, repeat forever.
    Interval(Duration),
    /// Publish at each local time of day, every day.
    DailyAt(Vec<NaiveTime>),
    /// Never publish on a timer; only external requests publish.
    Passive,
}

impl TriggerMode {
    /// Pick the mode from the configured options, in precedence order:
    /// once, interval, times of day, passive.
    pub fn resolve(
        post_now: bool,
        interval: Option<Duration>,
        times: &[String],
    ) -> Result<Self, ScheduleError> {
        if post_now {
            return Ok(Self::Once);
        }

        if let Some(interval) = interval {
            if interval.is_zero() {
                return Err(ScheduleError::ZeroInterval);
            }
            return Ok(Self::Interval(interval));
        }

        if !times.is_empty() {
            let mut parsed = times
                .iter()
                .map(|t| parse_time_of_day(t))
                .collect::<Result<Vec<_>, _>>()?;
            parsed.sort_unstable();
            parsed.dedup();
            return Ok(Self::DailyAt(parsed));
        }

        Ok(Self::Passive)
    }
}

impl fmt::Display for TriggerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Once => write!(f, "once"),
            Self::Interval(d) => write!(f, "every {}s", d.as_secs()),
            Self::DailyAt(times) => {
                let times: Vec<String> = times
                    .iter()
                    .map(|t| t.format("%H:%M:%S").to_string())
                    .collect();
                write!(f, "daily at {}", times.join(", "))
            }
            Self::Passive => write!(f, "passive"),
        }
    }
}

/// What caused a publish attempt. Carried into logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerSource {
    /// The one-shot startup trigger
    Startup,
    /// The fixed-period timer
    Interval,
    /// A time-of-day timer
    DailyAt(NaiveTime),
    /// An external request (admin endpoint)
    Manual,
}

impl fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Startup => write!(f, "startup"),
            Self::Interval => write!(f, "interval"),
            Self::DailyAt(t) => write!(f, "daily {}", t.format("%H:%M:%S")),
            Self::Manual => write!(f, "manual"),
        }
    }
}
