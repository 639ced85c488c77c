//! List view ordering.
//!
//! Date modes order by calendar day, then by wall-clock time, both in the
//! requested direction. Records without a readable date go last in either
//! direction. The sort is stable, so repeated identical sorts do not reorder
//! rows with equal keys.

use crate::calendar::{normalize_all, NormalizedAppointment};
use crate::models::{Appointment, SortMode};
use std::cmp::Ordering;

/// Return a new, ordered copy of `appointments`.
pub fn sort_appointments(appointments: &[Appointment], mode: SortMode) -> Vec<Appointment> {
    let mut entries = normalize_all(appointments);
    entries.sort_by(|a, b| compare(a, b, mode));
    entries.into_iter().map(|entry| entry.record.clone()).collect()
}

fn compare(
    a: &NormalizedAppointment<'_>,
    b: &NormalizedAppointment<'_>,
    mode: SortMode,
) -> Ordering {
    match mode {
        SortMode::IdAsc => a.record.id_or_zero().cmp(&b.record.id_or_zero()),
        SortMode::IdDesc => b.record.id_or_zero().cmp(&a.record.id_or_zero()),
        SortMode::DateAsc | SortMode::DateDesc => compare_schedule(a, b, mode.is_descending()),
    }
}

fn compare_schedule(
    a: &NormalizedAppointment<'_>,
    b: &NormalizedAppointment<'_>,
    descending: bool,
) -> Ordering {
    match (a.day, b.day) {
        (Some(day_a), Some(day_b)) => {
            // missing time orders as earliest
            let ordering = day_a.cmp(&day_b).then_with(|| a.time.cmp(&b.time));
            if descending {
                ordering.reverse()
            } else {
                ordering
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
