//! Data models for the appointment board.
//!
//! This module defines the records received from the backend and the
//! criteria the list view applies to them:
//! - ForeignId: identifier tolerant of numeric/string drift
//! - Appointment: one appointment record from the snapshot
//! - PatientRecord: entry of the patient directory used by name search
//! - Tab / SortMode: list view selectors
//! - FilterCriteria: the conjunctive filters of the list view
//! - ConflictCandidate: the (date, time, doctor) triple being edited

use crate::calendar::{CalendarDay, WallTime};
use crate::error::{BoardError, BoardResult};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Identifier pointing into an external collection (patients, doctors, nurses).
///
/// The backend sends these as numbers in some payloads and as strings in
/// others, so the value is kept as trimmed text and compared as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct ForeignId(String);

impl ForeignId {
    pub fn new(value: impl Into<String>) -> Self {
        ForeignId(value.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compare against free-form user input.
    pub fn matches(&self, other: &str) -> bool {
        !self.0.is_empty() && self.0 == other.trim()
    }
}

impl<'de> Deserialize<'de> for ForeignId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Integer(i64),
            Float(f64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Integer(n) => ForeignId(n.to_string()),
            RawId::Float(f) => ForeignId(f.to_string()),
            RawId::Text(s) => ForeignId::new(s),
        })
    }
}

impl From<i64> for ForeignId {
    fn from(value: i64) -> Self {
        ForeignId(value.to_string())
    }
}

impl From<&str> for ForeignId {
    fn from(value: &str) -> Self {
        ForeignId::new(value)
    }
}

impl fmt::Display for ForeignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display names of a person embedded in, or referenced by, an appointment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonSummary {
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
}

impl PersonSummary {
    pub fn new(first: &str, middle: Option<&str>, last: &str) -> Self {
        PersonSummary {
            first_name: Some(first.to_string()),
            middle_name: middle.map(str::to_string),
            last_name: Some(last.to_string()),
        }
    }

    /// "first middle last", skipping blank parts.
    pub fn full_name(&self) -> String {
        [&self.first_name, &self.middle_name, &self.last_name]
            .into_iter()
            .flatten()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Entry of the patient directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub id: ForeignId,
    #[serde(flatten)]
    pub name: PersonSummary,
}

impl PatientRecord {
    pub fn new(id: impl Into<ForeignId>, name: PersonSummary) -> Self {
        PatientRecord {
            id: id.into(),
            name,
        }
    }
}

/// One appointment of the snapshot, exactly as the backend delivered it.
///
/// `date` and `time` stay raw; they are only interpreted through
/// [`crate::calendar::normalize`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Appointment {
    pub id: Option<i64>,
    pub date: Option<String>,
    pub time: Option<String>,
    #[serde(rename = "type")]
    pub appointment_type: Option<String>,
    pub reference_code: Option<String>,
    pub patient_id: Option<ForeignId>,
    pub doctor_id: Option<ForeignId>,
    pub nurse_id: Option<ForeignId>,
    pub patient: Option<PersonSummary>,
    pub doctor: Option<PersonSummary>,
    pub nurse: Option<PersonSummary>,
}

impl Appointment {
    pub fn new(id: i64, date: &str, time: &str) -> Self {
        Appointment {
            id: Some(id),
            date: Some(date.to_string()),
            time: Some(time.to_string()),
            ..Appointment::default()
        }
    }

    pub fn with_doctor(mut self, doctor_id: impl Into<ForeignId>) -> Self {
        self.doctor_id = Some(doctor_id.into());
        self
    }

    pub fn with_patient(mut self, patient_id: impl Into<ForeignId>) -> Self {
        self.patient_id = Some(patient_id.into());
        self
    }

    pub fn with_reference(mut self, reference_code: &str) -> Self {
        self.reference_code = Some(reference_code.to_string());
        self
    }

    pub fn with_type(mut self, appointment_type: &str) -> Self {
        self.appointment_type = Some(appointment_type.to_string());
        self
    }

    /// Numeric id, with a missing id counting as 0.
    pub fn id_or_zero(&self) -> i64 {
        self.id.unwrap_or(0)
    }
}

/// Which slice of the timeline the list shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    All,
    Upcoming,
    Past,
}

impl Tab {
    pub fn from_string(value: &str) -> BoardResult<Self> {
        match value.to_lowercase().trim() {
            "all" => Ok(Tab::All),
            "upcoming" => Ok(Tab::Upcoming),
            "past" => Ok(Tab::Past),
            _ => Err(BoardError::InvalidTab(value.to_string())),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Tab::All => "all",
            Tab::Upcoming => "upcoming",
            Tab::Past => "past",
        }
    }
}

/// Ordering of the list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortMode {
    #[default]
    DateDesc,
    DateAsc,
    IdDesc,
    IdAsc,
}

impl SortMode {
    pub fn from_string(value: &str) -> BoardResult<Self> {
        match value.to_lowercase().trim() {
            "date-desc" => Ok(SortMode::DateDesc),
            "date-asc" => Ok(SortMode::DateAsc),
            "id-desc" => Ok(SortMode::IdDesc),
            "id-asc" => Ok(SortMode::IdAsc),
            _ => Err(BoardError::InvalidSortMode(value.to_string())),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            SortMode::DateDesc => "date-desc",
            SortMode::DateAsc => "date-asc",
            SortMode::IdDesc => "id-desc",
            SortMode::IdAsc => "id-asc",
        }
    }

    pub fn is_descending(&self) -> bool {
        matches!(self, SortMode::DateDesc | SortMode::IdDesc)
    }
}

/// Conjunctive filters of the list view. Blank fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterCriteria {
    pub tab: Tab,
    pub search_text: Option<String>,
    pub patient_id: Option<String>,
    pub exact_date: Option<String>,
}

impl FilterCriteria {
    pub fn for_tab(tab: Tab) -> Self {
        FilterCriteria {
            tab,
            ..FilterCriteria::default()
        }
    }

    pub fn with_search(mut self, text: &str) -> Self {
        self.search_text = Some(text.to_string());
        self
    }

    pub fn with_patient(mut self, patient_id: &str) -> Self {
        self.patient_id = Some(patient_id.to_string());
        self
    }

    pub fn with_date(mut self, date: &str) -> Self {
        self.exact_date = Some(date.to_string());
        self
    }

    pub fn search(&self) -> Option<&str> {
        non_blank(&self.search_text)
    }

    pub fn patient(&self) -> Option<&str> {
        non_blank(&self.patient_id)
    }

    pub fn date(&self) -> Option<&str> {
        non_blank(&self.exact_date)
    }

    /// True when applying these criteria passes every record through.
    pub fn is_empty(&self) -> bool {
        self.tab == Tab::All
            && self.search().is_none()
            && self.patient().is_none()
            && self.date().is_none()
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
}

/// The appointment being created or edited, as entered in the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictCandidate {
    pub date: String,
    pub time: String,
    pub doctor_id: ForeignId,
}

impl ConflictCandidate {
    pub fn new(date: &str, time: &str, doctor_id: impl Into<ForeignId>) -> Self {
        ConflictCandidate {
            date: date.to_string(),
            time: time.to_string(),
            doctor_id: doctor_id.into(),
        }
    }

    /// Build from form input, rejecting a date or time that cannot be checked.
    pub fn parse(date: &str, time: &str, doctor_id: impl Into<ForeignId>) -> BoardResult<Self> {
        let day = CalendarDay::from_input(date)?;
        let time = WallTime::from_input(time)?;
        Ok(ConflictCandidate {
            date: day.to_string(),
            time: time.format_hm(),
            doctor_id: doctor_id.into(),
        })
    }
}
