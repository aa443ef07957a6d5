//! Wall-clock time windows for the adaptive poll interval.
//!
//! Windows are evaluated against local wall-clock time only. A window is
//! built on the same day as "now", so windows cannot span midnight: a
//! reversed window such as 23:00–01:00 is read as 01:00–23:00.

use std::fmt;

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::Deserialize;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time {input:?}: {reason}")]
pub struct TimeError {
    input: String,
    reason: &'static str,
}

impl TimeError {
    fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }
}

/// An hour and minute of the day, written "HH:MM".
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct ClockTime {
    hour: u32,
    minute: u32,
}

impl ClockTime {
    /// Parse "HH:MM". A single-digit hour ("7:30") is accepted.
    ///
    /// # Examples
    ///
    /// ```
    /// use sl_departures::domain::ClockTime;
    ///
    /// assert!(ClockTime::parse_hhmm("07:30").is_ok());
    /// assert!(ClockTime::parse_hhmm("7:30").is_ok());
    /// assert!(ClockTime::parse_hhmm("24:00").is_err());
    /// assert!(ClockTime::parse_hhmm("0730").is_err());
    /// ```
    pub fn parse_hhmm(s: &str) -> Result<Self, TimeError> {
        let (h, m) = s
            .split_once(':')
            .ok_or_else(|| TimeError::new(s, "expected HH:MM format"))?;

        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return Err(TimeError::new(s, "expected HH:MM format"));
        }

        let hour: u32 = h
            .parse()
            .map_err(|_| TimeError::new(s, "invalid hour digits"))?;
        if hour > 23 {
            return Err(TimeError::new(s, "hour must be 0-23"));
        }

        let minute: u32 = m
            .parse()
            .map_err(|_| TimeError::new(s, "invalid minute digits"))?;
        if minute > 59 {
            return Err(TimeError::new(s, "minute must be 0-59"));
        }

        Ok(Self { hour, minute })
    }

    /// This clock time on the day of `now`, keeping `now`'s seconds.
    fn on_day_of(self, now: NaiveDateTime) -> NaiveDateTime {
        now.with_hour(self.hour)
            .and_then(|t| t.with_minute(self.minute))
            .unwrap_or(now)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = TimeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse_hhmm(&s)
    }
}

impl fmt::Debug for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClockTime({self})")
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Whether `now` lies strictly between `start` and `stop` on its own day.
///
/// Both bounds take `now`'s seconds, so the comparison is effectively per
/// minute and exclusive at both ends. If `start` is later than `stop` the
/// bounds are swapped rather than wrapped around midnight.
pub fn is_time_between(start: ClockTime, stop: ClockTime, now: NaiveDateTime) -> bool {
    let mut st = start.on_day_of(now);
    let mut en = stop.on_day_of(now);
    if st > en {
        std::mem::swap(&mut st, &mut en);
    }
    st < now && now < en
}

/// Which days of the week a window applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayClass {
    /// Monday to Friday.
    Weekdays,
    /// Saturday and Sunday.
    Weekends,
    /// Anything else in the configuration; never matches.
    #[serde(other)]
    Unknown,
}

impl DayClass {
    pub fn contains(self, day: Weekday) -> bool {
        let weekend = matches!(day, Weekday::Sat | Weekday::Sun);
        match self {
            DayClass::Weekdays => !weekend,
            DayClass::Weekends => weekend,
            DayClass::Unknown => false,
        }
    }
}

/// Whether `now` falls on one of `days` and inside the window.
pub fn is_between(days: DayClass, start: ClockTime, stop: ClockTime, now: NaiveDateTime) -> bool {
    days.contains(now.weekday()) && is_time_between(start, stop, now)
}
