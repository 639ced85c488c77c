//! Human-facing appointment references.
//!
//! Precedence: the stored reference code, then a zero-padded code derived
//! from the id, then a random placeholder. The placeholder exists only so a
//! row never renders without a reference; it must never be sent back to the
//! backend as if it were stored.

use crate::models::Appointment;
use chrono::{Datelike, Local};
use rand::Rng;

/// Shape of derived and placeholder references, e.g. `APT-007` and
/// `APT-2024-004211`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceFormat {
    pub prefix: String,
    pub min_digits: usize,
    pub fallback_digits: u32,
}

impl Default for ReferenceFormat {
    fn default() -> Self {
        ReferenceFormat {
            prefix: "APT".to_string(),
            min_digits: 3,
            fallback_digits: 6,
        }
    }
}

/// Stored reference code, if present and not blank. Returned untrimmed.
pub fn stored_reference(appointment: &Appointment) -> Option<&str> {
    appointment
        .reference_code
        .as_deref()
        .filter(|code| !code.trim().is_empty())
}

/// The deterministic part of the precedence: stored code or id-based code.
///
/// Only positive ids produce a code; zero, negative and missing ids have none.
pub fn derived_reference(appointment: &Appointment, format: &ReferenceFormat) -> Option<String> {
    if let Some(code) = stored_reference(appointment) {
        return Some(code.to_string());
    }
    match appointment.id {
        Some(id) if id > 0 => Some(format!(
            "{}-{:0width$}",
            format.prefix,
            id,
            width = format.min_digits
        )),
        _ => None,
    }
}

pub fn format_reference(appointment: &Appointment) -> String {
    format_reference_with(appointment, &ReferenceFormat::default())
}

pub fn format_reference_with(appointment: &Appointment, format: &ReferenceFormat) -> String {
    derived_reference(appointment, format).unwrap_or_else(|| {
        let placeholder = fallback_reference(format);
        tracing::debug!(%placeholder, "appointment has neither reference nor id");
        placeholder
    })
}

/// Random placeholder for the current year.
pub fn fallback_reference(format: &ReferenceFormat) -> String {
    fallback_reference_from(&mut rand::thread_rng(), Local::now().year(), format)
}

pub fn fallback_reference_from<R: Rng + ?Sized>(
    rng: &mut R,
    year: i32,
    format: &ReferenceFormat,
) -> String {
    let digits = format.fallback_digits.clamp(1, 18);
    let upper = 10u64.pow(digits) - 1;
    let number = rng.gen_range(0..=upper);
    format!(
        "{}-{}-{:0width$}",
        format.prefix,
        year,
        number,
        width = digits as usize
    )
}
