//! Calendar-day and wall-clock value types, and the single normalize step
//! every pass runs before filtering, sorting or conflict checking.
//!
//! Dates are reduced to their `YYYY-MM-DD` prefix without any timezone
//! conversion, so a stored `2024-01-05T23:30:00-08:00` is the 5th on every
//! machine. Records whose date or time cannot be read are kept, with the
//! unreadable part set to `None`; each consumer decides how to skip them.

use crate::error::{BoardError, BoardResult};
use crate::models::Appointment;
use chrono::{Local, NaiveDate, NaiveTime};
use std::fmt;

/// A date with the time of day removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDay(NaiveDate);

impl CalendarDay {
    /// Read the leading `YYYY-MM-DD` of a stored date value.
    ///
    /// Anything after the date must be separated by `T` or a space.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let prefix = value.get(..10)?;
        match value[10..].chars().next() {
            None | Some('T') | Some('t') | Some(' ') => {}
            Some(_) => return None,
        }
        NaiveDate::parse_from_str(prefix, "%Y-%m-%d")
            .ok()
            .map(CalendarDay)
    }

    /// Strict form for user input: exactly `YYYY-MM-DD`.
    pub fn from_input(value: &str) -> BoardResult<Self> {
        let value = value.trim();
        match CalendarDay::parse(value) {
            Some(day) if value.len() == 10 => Ok(day),
            _ => Err(BoardError::InvalidDate(value.to_string())),
        }
    }

    pub fn today() -> Self {
        CalendarDay(Local::now().date_naive())
    }

    pub fn from_date(date: NaiveDate) -> Self {
        CalendarDay(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for CalendarDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// A 24-hour wall-clock time with no date attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WallTime(NaiveTime);

impl WallTime {
    /// Accepts `HH:MM`, `H:MM` and `HH:MM:SS`.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        NaiveTime::parse_from_str(value, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
            .ok()
            .map(WallTime)
    }

    pub fn from_input(value: &str) -> BoardResult<Self> {
        WallTime::parse(value).ok_or_else(|| BoardError::InvalidTime(value.trim().to_string()))
    }

    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(WallTime)
    }

    /// Absolute distance to another time of the same day, in seconds.
    pub fn seconds_apart(&self, other: &WallTime) -> i64 {
        (self.0 - other.0).num_seconds().abs()
    }

    pub fn format_hm(&self) -> String {
        self.0.format("%H:%M").to_string()
    }
}

impl fmt::Display for WallTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M:%S"))
    }
}

/// An appointment together with its readable date and time, if any.
#[derive(Debug, Clone, Copy)]
pub struct NormalizedAppointment<'a> {
    pub record: &'a Appointment,
    pub day: Option<CalendarDay>,
    pub time: Option<WallTime>,
}

impl NormalizedAppointment<'_> {
    /// Both date and time are readable.
    pub fn is_schedulable(&self) -> bool {
        self.day.is_some() && self.time.is_some()
    }
}

pub fn normalize(record: &Appointment) -> NormalizedAppointment<'_> {
    let day = record.date.as_deref().and_then(CalendarDay::parse);
    let time = record.time.as_deref().and_then(WallTime::parse);

    if day.is_none() {
        tracing::debug!(
            id = ?record.id,
            date = ?record.date,
            "appointment has no readable date, skipping it in date comparisons"
        );
    }
    if time.is_none() && record.time.is_some() {
        tracing::debug!(
            id = ?record.id,
            time = ?record.time,
            "appointment has an unreadable time"
        );
    }

    NormalizedAppointment { record, day, time }
}

pub fn normalize_all(records: &[Appointment]) -> Vec<NormalizedAppointment<'_>> {
    records.iter().map(normalize).collect()
}
