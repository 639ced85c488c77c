//! List view filtering.
//!
//! Four conjunctive filters: tab, free-text search, patient and exact date.
//! Blank criteria pass everything through. Records with an unreadable date
//! survive the `all` tab but never match a date-based filter.

use crate::calendar::{normalize_all, CalendarDay, NormalizedAppointment};
use crate::models::{Appointment, FilterCriteria, PatientRecord, Tab};
use crate::reference::{derived_reference, stored_reference, ReferenceFormat};

/// What the filters need besides the records themselves.
#[derive(Debug, Clone)]
pub struct FilterContext<'a> {
    pub today: CalendarDay,
    pub patients: Option<&'a [PatientRecord]>,
    pub reference: &'a ReferenceFormat,
}

impl<'a> FilterContext<'a> {
    pub fn new(today: CalendarDay, reference: &'a ReferenceFormat) -> Self {
        FilterContext {
            today,
            patients: None,
            reference,
        }
    }

    pub fn with_patients(mut self, patients: &'a [PatientRecord]) -> Self {
        self.patients = Some(patients);
        self
    }

    fn patient_name(&self, appointment: &Appointment) -> Option<String> {
        let patients = self.patients?;
        let patient_id = appointment.patient_id.as_ref()?;
        patients
            .iter()
            .find(|patient| !patient.id.is_empty() && patient.id == *patient_id)
            .map(|patient| patient.name.full_name())
    }
}

/// Apply every active criterion and return the surviving records in input order.
pub fn filter_appointments(
    appointments: &[Appointment],
    criteria: &FilterCriteria,
    context: &FilterContext<'_>,
) -> Vec<Appointment> {
    if criteria.is_empty() {
        return appointments.to_vec();
    }

    let needle = criteria.search().map(str::to_lowercase);

    normalize_all(appointments)
        .into_iter()
        .filter(|entry| matches_tab(entry, criteria.tab, context.today))
        .filter(|entry| match &needle {
            Some(needle) => matches_search(entry.record, needle, context),
            None => true,
        })
        .filter(|entry| match criteria.patient() {
            Some(patient_id) => matches_patient(entry.record, patient_id),
            None => true,
        })
        .filter(|entry| match criteria.date() {
            Some(date) => matches_exact_date(entry, date),
            None => true,
        })
        .map(|entry| entry.record.clone())
        .collect()
}

pub fn matches_tab(entry: &NormalizedAppointment<'_>, tab: Tab, today: CalendarDay) -> bool {
    match (tab, entry.day) {
        (Tab::All, _) => true,
        (Tab::Upcoming, Some(day)) => day >= today,
        (Tab::Past, Some(day)) => day < today,
        (_, None) => false,
    }
}

/// Case-insensitive substring match on the stored reference, the derived
/// reference, the id and, for alphabetic input, the linked patient's name.
///
/// `needle` must already be lowercase.
pub fn matches_search(
    appointment: &Appointment,
    needle: &str,
    context: &FilterContext<'_>,
) -> bool {
    let contains = |haystack: &str| haystack.to_lowercase().contains(needle);

    if stored_reference(appointment).is_some_and(contains) {
        return true;
    }
    if derived_reference(appointment, context.reference)
        .is_some_and(|code| contains(code.as_str()))
    {
        return true;
    }
    if appointment.id.is_some_and(|id| contains(id.to_string().as_str())) {
        return true;
    }
    if needle.chars().any(char::is_alphabetic) {
        if let Some(name) = context.patient_name(appointment) {
            return contains(name.as_str());
        }
    }
    false
}

pub fn matches_patient(appointment: &Appointment, patient_id: &str) -> bool {
    appointment
        .patient_id
        .as_ref()
        .is_some_and(|id| id.matches(patient_id))
}

pub fn matches_exact_date(entry: &NormalizedAppointment<'_>, date: &str) -> bool {
    entry
        .day
        .is_some_and(|day| day.to_string() == date.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PersonSummary;

    fn today() -> CalendarDay {
        CalendarDay::parse("2024-06-15").unwrap()
    }

    fn sample() -> Vec<Appointment> {
        vec![
            Appointment::new(1, "2024-06-14", "10:00").with_patient(10_i64),
            Appointment::new(2, "2024-06-15T00:00:00.000Z", "09:00").with_patient("11"),
            Appointment::new(3, "2024-07-01", "08:30")
                .with_patient(10_i64)
                .with_reference("REF-ABC"),
            Appointment::new(45, "garbage", "08:30").with_patient(12_i64),
        ]
    }

    fn patients() -> Vec<PatientRecord> {
        vec![
            PatientRecord::new(10_i64, PersonSummary::new("Ana", Some("Maria"), "Lopez")),
            PatientRecord::new(11_i64, PersonSummary::new("John", None, "Smith")),
        ]
    }

    fn ids(appointments: &[Appointment]) -> Vec<i64> {
        appointments.iter().map(Appointment::id_or_zero).collect()
    }

    #[test]
    fn empty_criteria_pass_everything() {
        let format = ReferenceFormat::default();
        let context = FilterContext::new(today(), &format);
        let result = filter_appointments(&sample(), &FilterCriteria::default(), &context);
        assert_eq!(ids(&result), vec![1, 2, 3, 45]);
    }

    #[test]
    fn upcoming_includes_today_and_excludes_yesterday() {
        let format = ReferenceFormat::default();
        let context = FilterContext::new(today(), &format);
        let criteria = FilterCriteria::for_tab(Tab::Upcoming);
        let result = filter_appointments(&sample(), &criteria, &context);
        assert_eq!(ids(&result), vec![2, 3]);
    }

    #[test]
    fn past_excludes_today_and_unreadable_dates() {
        let format = ReferenceFormat::default();
        let context = FilterContext::new(today(), &format);
        let result = filter_appointments(&sample(), &FilterCriteria::for_tab(Tab::Past), &context);
        assert_eq!(ids(&result), vec![1]);
    }

    #[test]
    fn search_matches_references_and_ids() {
        let format = ReferenceFormat::default();
        let context = FilterContext::new(today(), &format);

        let by_stored = FilterCriteria::default().with_search("ref-abc");
        assert_eq!(ids(&filter_appointments(&sample(), &by_stored, &context)), vec![3]);

        let by_derived = FilterCriteria::default().with_search("apt-002");
        assert_eq!(ids(&filter_appointments(&sample(), &by_derived, &context)), vec![2]);

        let by_id = FilterCriteria::default().with_search("4");
        assert_eq!(ids(&filter_appointments(&sample(), &by_id, &context)), vec![45]);
    }

    #[test]
    fn search_by_patient_name_needs_directory() {
        let format = ReferenceFormat::default();
        let criteria = FilterCriteria::default().with_search("maria lo");

        let without = FilterContext::new(today(), &format);
        assert!(filter_appointments(&sample(), &criteria, &without).is_empty());

        let directory = patients();
        let with = FilterContext::new(today(), &format).with_patients(&directory);
        assert_eq!(ids(&filter_appointments(&sample(), &criteria, &with)), vec![1, 3]);
    }

    #[test]
    fn numeric_search_skips_names() {
        let directory = vec![PatientRecord::new(
            10_i64,
            PersonSummary::new("R2", None, "D2"),
        )];
        let format = ReferenceFormat::default();
        let context = FilterContext::new(today(), &format).with_patients(&directory);
        let criteria = FilterCriteria::default().with_search("2");
        assert_eq!(ids(&filter_appointments(&sample(), &criteria, &context)), vec![2]);
    }

    #[test]
    fn patient_filter_tolerates_type_drift() {
        let format = ReferenceFormat::default();
        let context = FilterContext::new(today(), &format);
        let criteria = FilterCriteria::default().with_patient(" 10 ");
        assert_eq!(ids(&filter_appointments(&sample(), &criteria, &context)), vec![1, 3]);
    }

    #[test]
    fn exact_date_ignores_time_of_day() {
        let format = ReferenceFormat::default();
        let context = FilterContext::new(today(), &format);
        let criteria = FilterCriteria::default().with_date("2024-06-15");
        assert_eq!(ids(&filter_appointments(&sample(), &criteria, &context)), vec![2]);

        let criteria = FilterCriteria::default().with_date("15/06/2024");
        assert!(filter_appointments(&sample(), &criteria, &context).is_empty());
    }

    #[test]
    fn filters_are_conjunctive() {
        let format = ReferenceFormat::default();
        let directory = patients();
        let context = FilterContext::new(today(), &format).with_patients(&directory);
        let criteria = FilterCriteria::for_tab(Tab::Upcoming)
            .with_search("ana")
            .with_patient("10");
        assert_eq!(ids(&filter_appointments(&sample(), &criteria, &context)), vec![3]);

        let separately: Vec<Vec<i64>> = [
            FilterCriteria::for_tab(Tab::Upcoming),
            FilterCriteria::default().with_search("ana"),
            FilterCriteria::default().with_patient("10"),
        ]
        .iter()
        .map(|single| ids(&filter_appointments(&sample(), single, &context)))
        .collect();
        let intersection: Vec<i64> = separately[0]
            .iter()
            .copied()
            .filter(|id| separately[1..].iter().all(|set| set.contains(id)))
            .collect();
        assert_eq!(intersection, vec![3]);
    }
}
