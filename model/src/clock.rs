use std::fmt;

use chrono::{Datelike, Local, NaiveDateTime, NaiveTime, Timelike};

use gtfs::{ServiceType, TimeOfDay};

/// Shown when a duration can't be worked out
pub const UNKNOWN_DURATION: &str = "--";

/// Minutes from departure to arrival. `None` unless arrival is strictly after departure; times
/// wrapping past midnight aren't expected, since GTFS keeps counting hours instead.
pub fn duration_minutes(dep: &TimeOfDay, arr: &TimeOfDay) -> Option<u32> {
    let diff = i64::from(arr.to_minutes()?) - i64::from(dep.to_minutes()?);
    if diff <= 0 {
        return None;
    }
    u32::try_from(diff).ok()
}

pub fn describe_duration(dep: &TimeOfDay, arr: &TimeOfDay) -> String {
    match duration_minutes(dep, arr) {
        None => UNKNOWN_DURATION.to_string(),
        Some(x) if x >= 60 => format!("{}時間{}分", x / 60, x % 60),
        Some(x) => format!("{x}分"),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Countdown {
    /// Leaving now, or the clock already passed it
    Imminent,
    OneMinute,
    Minutes(u32),
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Countdown::Imminent => write!(f, "まもなく出発"),
            Countdown::OneMinute => write!(f, "あと1分"),
            Countdown::Minutes(x) => write!(f, "あと{x}分"),
        }
    }
}

/// Only the hour and minute of `now` count.
pub fn countdown(now: NaiveTime, dep: &TimeOfDay) -> Option<Countdown> {
    let now_minutes = i64::from(now.hour() * 60 + now.minute());
    let diff = i64::from(dep.to_minutes()?) - now_minutes;
    Some(match diff {
        x if x <= 0 => Countdown::Imminent,
        1 => Countdown::OneMinute,
        x => Countdown::Minutes(u32::try_from(x).ok()?),
    })
}

/// `H:MM`, with hours past 24 wrapped and marked as the next day. Only for display; compare the
/// raw `TimeOfDay` instead.
pub fn format_time(time: &TimeOfDay) -> String {
    let (hours, minutes) = match (time.hours(), time.minutes_field()) {
        (Some(h), Some(m)) => (h, m),
        _ => return time.to_string(),
    };
    if hours >= 24 {
        format!("{}:{minutes} (翌)", hours - 24)
    } else {
        format!("{hours}:{minutes}")
    }
}

/// The wall clock as a GTFS time, never past 23:59:59
pub fn time_of_day(now: NaiveTime) -> TimeOfDay {
    TimeOfDay::from_hms(now.hour(), now.minute(), now.second())
}

pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Which timetable runs today, going only by the day of the week
pub fn today_service_type(now: NaiveDateTime) -> ServiceType {
    ServiceType::for_weekday(now.weekday())
}
