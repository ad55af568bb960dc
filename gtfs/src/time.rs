use std::fmt;

use serde::{Deserialize, Serialize};

/// A GTFS time, `HH:MM:SS`, relative to the start of the service day. Hours can be 24 or more for
/// trips running past midnight.
///
/// Ordering compares the raw strings. Since the fields are fixed-width and zero-padded, that's the
/// same as chronological order within one service day. Use `to_minutes` only for arithmetic.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeOfDay(String);

impl TimeOfDay {
    /// Sorts after every real time
    pub const SENTINEL: &'static str = "99:99:99";

    /// Keeps the input as-is, except `H:MM:SS` (legal in GTFS) gets zero-padded to `0H:MM:SS`.
    pub fn new<S: Into<String>>(x: S) -> Self {
        let x = x.into();
        let trimmed = x.trim();
        if let Some((hours, _)) = trimmed.split_once(':') {
            if hours.len() == 1 {
                return Self(format!("0{trimmed}"));
            }
        }
        Self(trimmed.to_string())
    }

    pub fn from_hms(hours: u32, minutes: u32, seconds: u32) -> Self {
        Self(format!("{hours:02}:{minutes:02}:{seconds:02}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Non-timepoint stops may leave their times blank
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `H * 60 + M`, ignoring seconds. There's no wraparound: `25:30:00` is 1530.
    pub fn to_minutes(&self) -> Option<u32> {
        let mut parts = self.0.split(':');
        let hours = parts.next()?.trim().parse::<u32>().ok()?;
        let minutes = parts.next()?.trim().parse::<u32>().ok()?;
        Some(hours * 60 + minutes)
    }

    pub fn hours(&self) -> Option<u32> {
        self.0.split(':').next()?.trim().parse().ok()
    }

    /// The minutes field as written, still zero-padded
    pub fn minutes_field(&self) -> Option<&str> {
        self.0.split(':').nth(1)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TimeOfDay {
    fn from(x: &str) -> Self {
        Self::new(x)
    }
}
