//! Trigger scheduling: computes when the next publish is due and drives a
//! callback accordingly.

use crate::trigger::{ScheduleError, TriggerMode, TriggerSource};
use chrono::{DateTime, Local, NaiveTime, TimeZone};
use std::future::Future;

/// Parse `HH:MM` or `HH:MM:SS`.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, ScheduleError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| ScheduleError::InvalidTime {
            value: value.to_string(),
        })
}

/// The first instant strictly after `after` whose local time is `time`.
///
/// Local times that do not exist on a given day (DST gaps) are skipped to
/// the following day.
pub fn next_daily_run<Tz: TimeZone>(after: &DateTime<Tz>, time: NaiveTime) -> DateTime<Tz> {
    let tz = after.timezone();
    let mut date = after.date_naive();
    loop {
        if let Some(candidate) = tz.from_local_datetime(&date.and_time(time)).earliest() {
            if candidate > *after {
                return candidate;
            }
        }
        date = date.succ_opt().unwrap_or(date);
    }
}

/// Soonest run among `times` strictly after `after`.
///
/// Returns `None` only when `times` is empty.
pub fn next_fire<Tz: TimeZone>(
    after: &DateTime<Tz>,
    times: &[NaiveTime],
) -> Option<(DateTime<Tz>, NaiveTime)> {
    times
        .iter()
        .map(|t| (next_daily_run(after, *t), *t))
        .min_by(|a, b| a.0.cmp(&b.0))
}

/// Run `fire` according to `mode`.
///
/// Each call to `fire` is awaited before the next is scheduled, so triggers
/// from one mode never overlap. Returns after the single call in
/// [`TriggerMode::Once`]; every other mode runs until the task is dropped.
pub async fn drive<F, Fut>(mode: &TriggerMode, mut fire: F)
where
    F: FnMut(TriggerSource) -> Fut,
    Fut: Future<Output = ()>,
{
    tracing::info!("Publish trigger mode: {}", mode);

    match mode {
        TriggerMode::Once => fire(TriggerSource::Startup).await,
        TriggerMode::Interval(period) => loop {
            fire(TriggerSource::Interval).await;
            tokio::time::sleep(*period).await;
        },
        TriggerMode::DailyAt(times) => {
            let mut last_fired: Option<DateTime<Local>> = None;
            loop {
                let now = Local::now();
                let after = match last_fired {
                    Some(last) if last > now => last,
                    _ => now,
                };
                let Some((at, time)) = next_fire(&after, times) else {
                    tracing::warn!("No times of day configured; trigger idle");
                    return std::future::pending().await;
                };
                tracing::debug!("Next publish at {}", at);

                let wait = (at - now).to_std().unwrap_or_default();
                tokio::time::sleep(wait).await;
                fire(TriggerSource::DailyAt(time)).await;
                last_fired = Some(at);
            }
        }
        TriggerMode::Passive => {
            tracing::info!("No publish schedule; waiting for manual triggers");
            std::future::pending::<()>().await;
        }
    }
}
