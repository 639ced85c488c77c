//! Doctor double-booking check for the appointment form.
//!
//! Two appointments conflict when they share the doctor and the calendar day
//! and their start times are less than the conflict window apart. There is
//! no duration in the data, so this is a start-to-start distance, not an
//! interval overlap. The check is advisory: anything unreadable is skipped.

use crate::calendar::{normalize_all, CalendarDay, WallTime};
use crate::models::{Appointment, ConflictCandidate};
use chrono::Duration;

pub const DEFAULT_CONFLICT_WINDOW_MINUTES: i64 = 30;

pub fn default_conflict_window() -> Duration {
    Duration::minutes(DEFAULT_CONFLICT_WINDOW_MINUTES)
}

/// First appointment, in input order, that conflicts with `candidate`.
///
/// `exclude_id` is the id of the appointment being edited, so it never
/// conflicts with itself.
pub fn find_conflict(
    appointments: &[Appointment],
    candidate: &ConflictCandidate,
    exclude_id: Option<i64>,
) -> Option<Appointment> {
    find_conflict_within(appointments, candidate, exclude_id, default_conflict_window())
}

pub fn find_conflict_within(
    appointments: &[Appointment],
    candidate: &ConflictCandidate,
    exclude_id: Option<i64>,
    window: Duration,
) -> Option<Appointment> {
    if candidate.doctor_id.is_empty() {
        return None;
    }
    let (Some(day), Some(time)) = (
        CalendarDay::parse(&candidate.date),
        WallTime::parse(&candidate.time),
    ) else {
        tracing::debug!(
            date = %candidate.date,
            time = %candidate.time,
            "conflict candidate has no readable date or time"
        );
        return None;
    };
    let window_seconds = window.num_seconds();

    normalize_all(appointments)
        .into_iter()
        .filter(|entry| exclude_id.is_none() || entry.record.id != exclude_id)
        .filter(|entry| entry.record.doctor_id.as_ref() == Some(&candidate.doctor_id))
        .find(|entry| match (entry.day, entry.time) {
            (Some(other_day), Some(other_time)) => {
                other_day == day && other_time.seconds_apart(&time) < window_seconds
            }
            _ => false,
        })
        .map(|entry| {
            tracing::debug!(
                conflicting_id = ?entry.record.id,
                doctor_id = %candidate.doctor_id,
                "appointment conflict found"
            );
            entry.record.clone()
        })
}

/// Warning shown under the form, e.g. "Doctor has appointment at 09:20".
pub fn conflict_notice(conflict: &Appointment) -> String {
    let time = conflict
        .time
        .as_deref()
        .and_then(WallTime::parse)
        .map(|time| time.format_hm())
        .or_else(|| conflict.time.clone())
        .unwrap_or_default();
    format!("Doctor has appointment at {}", time)
}
