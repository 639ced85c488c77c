//! Appointment list engine for clinic dashboards.
//!
//! Works on an in-memory snapshot of appointments fetched from the backend:
//! filtering and sorting for the list view, doctor conflict detection for the
//! appointment form, and human-facing reference codes. All of it is pure and
//! synchronous; [`board::AppointmentBoard`] ties it together as a small state
//! container that recomputes the view whenever its inputs change.

pub mod board;
pub mod calendar;
pub mod config;
pub mod conflict;
pub mod error;
pub mod filter;
pub mod models;
pub mod reference;
pub mod sort;

pub use board::{AppointmentBoard, JsonFileSource, LoadReport, MemorySource, SnapshotSource};
pub use calendar::{CalendarDay, WallTime};
pub use config::EngineConfig;
pub use conflict::{conflict_notice, find_conflict};
pub use error::{BoardError, BoardResult};
pub use filter::{filter_appointments, FilterContext};
pub use models::{
    Appointment, ConflictCandidate, FilterCriteria, ForeignId, PatientRecord, PersonSummary,
    SortMode, Tab,
};
pub use reference::{format_reference, ReferenceFormat};
pub use sort::sort_appointments;
