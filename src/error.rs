//! Error types for user input parsing and snapshot loading.
//!
//! The filter, sort, conflict and reference functions never fail; only the
//! edges that read user input or files return these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoardError {
    #[error("Invalid sort mode: '{0}'. Must be one of: date-desc, date-asc, id-desc, id-asc")]
    InvalidSortMode(String),

    #[error("Invalid tab: '{0}'. Must be one of: all, upcoming, past")]
    InvalidTab(String),

    #[error("Invalid date: '{0}'. Expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid time: '{0}'. Expected HH:MM")]
    InvalidTime(String),

    #[error("Failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type BoardResult<T> = Result<T, BoardError>;
