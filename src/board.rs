//! Appointment board: the one place that holds the current snapshot and the
//! list view derived from it.
//!
//! The board owns an immutable snapshot of appointments and the patient
//! directory, plus the active criteria and sort mode. Any change to one of
//! those recomputes the view from scratch; individual records are never
//! patched. A refresh replaces each snapshot section wholesale.

use crate::calendar::CalendarDay;
use crate::config::EngineConfig;
use crate::conflict::find_conflict_within;
use crate::error::BoardResult;
use crate::filter::{filter_appointments, FilterContext};
use crate::models::{Appointment, ConflictCandidate, FilterCriteria, PatientRecord, SortMode, Tab};
use crate::reference::format_reference_with;
use crate::sort::sort_appointments;
use serde::de::DeserializeOwned;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Where snapshots come from. Each section loads independently.
pub trait SnapshotSource {
    fn load_appointments(&self) -> BoardResult<Vec<Appointment>>;
    fn load_patients(&self) -> BoardResult<Vec<PatientRecord>>;
}

/// Snapshot file of the form `{ "appointments": [...], "patients": [...] }`.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileSource { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_section<T: DeserializeOwned>(&self, key: &'static str) -> BoardResult<T> {
        let contents = fs::read_to_string(&self.path)?;
        let mut document: serde_json::Value = serde_json::from_str(&contents)?;
        let section = document
            .get_mut(key)
            .map(serde_json::Value::take)
            .ok_or_else(|| <serde_json::Error as serde::de::Error>::missing_field(key))?;
        Ok(serde_json::from_value(section)?)
    }
}

impl SnapshotSource for JsonFileSource {
    fn load_appointments(&self) -> BoardResult<Vec<Appointment>> {
        self.read_section("appointments")
    }

    fn load_patients(&self) -> BoardResult<Vec<PatientRecord>> {
        self.read_section("patients")
    }
}

/// Snapshot already in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pub appointments: Vec<Appointment>,
    pub patients: Vec<PatientRecord>,
}

impl SnapshotSource for MemorySource {
    fn load_appointments(&self) -> BoardResult<Vec<Appointment>> {
        Ok(self.appointments.clone())
    }

    fn load_patients(&self) -> BoardResult<Vec<PatientRecord>> {
        Ok(self.patients.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Appointments,
    Patients,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Appointments => f.write_str("appointments"),
            Section::Patients => f.write_str("patients"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionFailure {
    pub section: Section,
    pub message: String,
}

/// Outcome of a refresh. Sections that failed kept their previous data.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub revision: Uuid,
    pub appointments_loaded: Option<usize>,
    pub patients_loaded: Option<usize>,
    pub failures: Vec<SectionFailure>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct AppointmentBoard {
    config: EngineConfig,
    appointments: Vec<Appointment>,
    patients: Option<Vec<PatientRecord>>,
    criteria: FilterCriteria,
    sort_mode: SortMode,
    today: CalendarDay,
    revision: Uuid,
    view: Vec<Appointment>,
}

impl AppointmentBoard {
    pub fn new(config: EngineConfig) -> Self {
        AppointmentBoard {
            config,
            appointments: Vec::new(),
            patients: None,
            criteria: FilterCriteria::default(),
            sort_mode: SortMode::default(),
            today: CalendarDay::today(),
            revision: Uuid::new_v4(),
            view: Vec::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Identifies the snapshot the current view was derived from.
    pub fn revision(&self) -> Uuid {
        self.revision
    }

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn patients(&self) -> Option<&[PatientRecord]> {
        self.patients.as_deref()
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort_mode
    }

    pub fn today(&self) -> CalendarDay {
        self.today
    }

    /// The filtered and sorted list.
    pub fn view(&self) -> &[Appointment] {
        &self.view
    }

    /// Replace the whole snapshot. `None` means no patient directory is available.
    pub fn replace_snapshot(
        &mut self,
        appointments: Vec<Appointment>,
        patients: Option<Vec<PatientRecord>>,
    ) {
        self.appointments = appointments;
        self.patients = patients;
        self.revision = Uuid::new_v4();
        tracing::info!(
            revision = %self.revision,
            appointments = self.appointments.len(),
            patients = self.patients.as_ref().map(Vec::len),
            "snapshot replaced"
        );
        self.recompute();
    }

    /// Reload both sections from `source`, keeping whatever fails to load.
    pub fn refresh(&mut self, source: &dyn SnapshotSource) -> LoadReport {
        let mut failures = Vec::new();

        let appointments = match source.load_appointments() {
            Ok(appointments) => Some(appointments),
            Err(e) => {
                tracing::warn!(error = %e, "failed to load appointments, keeping previous list");
                failures.push(SectionFailure {
                    section: Section::Appointments,
                    message: e.to_string(),
                });
                None
            }
        };
        let patients = match source.load_patients() {
            Ok(patients) => Some(patients),
            Err(e) => {
                tracing::warn!(error = %e, "failed to load patients, keeping previous directory");
                failures.push(SectionFailure {
                    section: Section::Patients,
                    message: e.to_string(),
                });
                None
            }
        };

        let appointments_loaded = appointments.as_ref().map(Vec::len);
        let patients_loaded = patients.as_ref().map(Vec::len);

        if appointments.is_some() || patients.is_some() {
            let next_appointments =
                appointments.unwrap_or_else(|| std::mem::take(&mut self.appointments));
            let next_patients = patients.or_else(|| self.patients.take());
            self.replace_snapshot(next_appointments, next_patients);
        }

        LoadReport {
            revision: self.revision,
            appointments_loaded,
            patients_loaded,
            failures,
        }
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.recompute();
    }

    pub fn set_tab(&mut self, tab: Tab) {
        self.criteria.tab = tab;
        self.recompute();
    }

    pub fn set_search(&mut self, text: Option<String>) {
        self.criteria.search_text = text;
        self.recompute();
    }

    pub fn set_patient_filter(&mut self, patient_id: Option<String>) {
        self.criteria.patient_id = patient_id;
        self.recompute();
    }

    /// Filter on one calendar day. The input must be a valid `YYYY-MM-DD`.
    pub fn set_exact_date(&mut self, date: Option<&str>) -> BoardResult<()> {
        let date = match date.map(str::trim).filter(|d| !d.is_empty()) {
            Some(raw) => Some(CalendarDay::from_input(raw)?.to_string()),
            None => None,
        };
        self.criteria.exact_date = date;
        self.recompute();
        Ok(())
    }

    pub fn clear_filters(&mut self) {
        self.criteria = FilterCriteria::default();
        self.recompute();
    }

    pub fn set_sort_mode(&mut self, mode: SortMode) {
        self.sort_mode = mode;
        self.recompute();
    }

    pub fn set_today(&mut self, today: CalendarDay) {
        self.today = today;
        self.recompute();
    }

    /// Conflict check for a form edit against the current snapshot.
    pub fn check_conflict(
        &self,
        candidate: &ConflictCandidate,
        exclude_id: Option<i64>,
    ) -> Option<Appointment> {
        find_conflict_within(
            &self.appointments,
            candidate,
            exclude_id,
            self.config.conflict_window(),
        )
    }

    pub fn reference_for(&self, appointment: &Appointment) -> String {
        format_reference_with(appointment, self.config.reference())
    }

    /// Display name of the appointment's patient: directory first, then the
    /// embedded summary.
    pub fn patient_name(&self, appointment: &Appointment) -> Option<String> {
        let from_directory = self.patients().and_then(|patients| {
            let patient_id = appointment.patient_id.as_ref()?;
            patients
                .iter()
                .find(|patient| patient.id == *patient_id)
                .map(|patient| patient.name.full_name())
        });
        from_directory
            .or_else(|| appointment.patient.as_ref().map(|p| p.full_name()))
            .filter(|name| !name.is_empty())
    }

    fn recompute(&mut self) {
        let mut context = FilterContext::new(self.today, self.config.reference());
        if let Some(patients) = self.patients.as_deref() {
            context = context.with_patients(patients);
        }
        let filtered = filter_appointments(&self.appointments, &self.criteria, &context);
        self.view = sort_appointments(&filtered, self.sort_mode);
        tracing::debug!(
            total = self.appointments.len(),
            shown = self.view.len(),
            tab = self.criteria.tab.name(),
            sort = self.sort_mode.name(),
            "view recomputed"
        );
    }
}

impl fmt::Display for AppointmentBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AppointmentBoard(appointments={}, shown={}, tab={}, sort={})",
            self.appointments.len(),
            self.view.len(),
            self.criteria.tab.name(),
            self.sort_mode.name()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoardError;
    use crate::models::PersonSummary;

    struct FlakySource {
        appointments: Option<Vec<Appointment>>,
        patients: Option<Vec<PatientRecord>>,
    }

    impl SnapshotSource for FlakySource {
        fn load_appointments(&self) -> BoardResult<Vec<Appointment>> {
            self.appointments
                .clone()
                .ok_or_else(|| BoardError::Config("appointments offline".to_string()))
        }

        fn load_patients(&self) -> BoardResult<Vec<PatientRecord>> {
            self.patients
                .clone()
                .ok_or_else(|| BoardError::Config("patients offline".to_string()))
        }
    }

    fn board() -> AppointmentBoard {
        let mut board = AppointmentBoard::new(EngineConfig::default());
        board.set_today(CalendarDay::parse("2024-06-15").unwrap());
        board
    }

    fn ids(appointments: &[Appointment]) -> Vec<i64> {
        appointments.iter().map(Appointment::id_or_zero).collect()
    }

    #[test]
    fn view_follows_snapshot_criteria_and_sort() {
        let mut board = board();
        board.replace_snapshot(
            vec![
                Appointment::new(1, "2024-06-14", "10:00"),
                Appointment::new(2, "2024-06-20", "09:00"),
                Appointment::new(3, "2024-06-15", "11:00"),
            ],
            None,
        );
        assert_eq!(ids(board.view()), vec![2, 3, 1]);

        board.set_tab(Tab::Upcoming);
        assert_eq!(ids(board.view()), vec![2, 3]);

        board.set_sort_mode(SortMode::DateAsc);
        assert_eq!(ids(board.view()), vec![3, 2]);

        board.clear_filters();
        assert_eq!(ids(board.view()), vec![1, 3, 2]);
    }

    #[test]
    fn replacing_snapshot_changes_revision() {
        let mut board = board();
        let before = board.revision();
        board.replace_snapshot(vec![Appointment::new(1, "2024-06-14", "10:00")], None);
        assert_ne!(before, board.revision());
        assert_eq!(board.appointments().len(), 1);
    }

    #[test]
    fn partial_refresh_keeps_previous_section() {
        let mut board = board();
        let patients = vec![PatientRecord::new(10_i64, PersonSummary::new("Ana", None, "Lopez"))];
        board.refresh(&MemorySource {
            appointments: vec![Appointment::new(1, "2024-06-14", "10:00").with_patient(10_i64)],
            patients: patients.clone(),
        });

        let newer = vec![Appointment::new(2, "2024-06-16", "10:00").with_patient(10_i64)];
        let report = board.refresh(&FlakySource {
            appointments: Some(newer),
            patients: None,
        });
        assert!(!report.is_complete());
        assert_eq!(report.appointments_loaded, Some(1));
        assert_eq!(report.patients_loaded, None);
        assert_eq!(report.failures[0].section, Section::Patients);
        assert_eq!(ids(board.appointments()), vec![2]);
        assert_eq!(board.patients(), Some(patients.as_slice()));
    }

    #[test]
    fn total_failure_leaves_board_untouched() {
        let mut board = board();
        board.replace_snapshot(vec![Appointment::new(1, "2024-06-14", "10:00")], None);
        let revision = board.revision();
        let report = board.refresh(&FlakySource {
            appointments: None,
            patients: None,
        });
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.revision, revision);
        assert_eq!(ids(board.view()), vec![1]);
    }

    #[test]
    fn exact_date_input_is_validated() {
        let mut board = board();
        assert!(matches!(
            board.set_exact_date(Some("15/06/2024")),
            Err(BoardError::InvalidDate(_))
        ));
        assert!(board.set_exact_date(Some("2024-06-15T10:00")).is_err());
        board.set_exact_date(Some(" 2024-06-15 ")).unwrap();
        assert_eq!(board.criteria().date(), Some("2024-06-15"));
        board.set_exact_date(None).unwrap();
        assert_eq!(board.criteria().date(), None);
    }

    #[test]
    fn patient_name_prefers_directory() {
        let mut board = board();
        let mut appointment = Appointment::new(1, "2024-06-14", "10:00").with_patient(10_i64);
        appointment.patient = Some(PersonSummary::new("Embedded", None, "Name"));
        board.replace_snapshot(
            vec![appointment.clone()],
            Some(vec![PatientRecord::new(10_i64, PersonSummary::new("Ana", None, "Lopez"))]),
        );
        assert_eq!(board.patient_name(&appointment).as_deref(), Some("Ana Lopez"));

        board.replace_snapshot(vec![appointment.clone()], None);
        assert_eq!(board.patient_name(&appointment).as_deref(), Some("Embedded Name"));
    }

    #[test]
    fn conflict_uses_configured_window() {
        let mut board = AppointmentBoard::new(
            EngineConfig::new(10, crate::reference::ReferenceFormat::default()).unwrap(),
        );
        board.replace_snapshot(
            vec![Appointment::new(1, "2024-03-01", "09:00").with_doctor(5_i64)],
            None,
        );
        let near = ConflictCandidate::new("2024-03-01", "09:09", 5_i64);
        let far = ConflictCandidate::new("2024-03-01", "09:15", 5_i64);
        assert!(board.check_conflict(&near, None).is_some());
        assert!(board.check_conflict(&far, None).is_none());
    }

    #[test]
    fn widest_window_covers_the_whole_day() {
        let config = EngineConfig::new(
            crate::config::MAX_CONFLICT_WINDOW_MINUTES,
            crate::reference::ReferenceFormat::default(),
        )
        .unwrap();
        let mut board = AppointmentBoard::new(config);
        board.replace_snapshot(
            vec![Appointment::new(1, "2024-03-01", "00:00").with_doctor(5_i64)],
            None,
        );
        let late = ConflictCandidate::new("2024-03-01", "23:59", 5_i64);
        let next_day = ConflictCandidate::new("2024-03-02", "00:00", 5_i64);
        assert_eq!(board.check_conflict(&late, None).unwrap().id, Some(1));
        assert!(board.check_conflict(&next_day, None).is_none());
    }
}
