//! Runtime configuration, resolved once at startup and handed to the board.

use crate::conflict::DEFAULT_CONFLICT_WINDOW_MINUTES;
use crate::error::{BoardError, BoardResult};
use crate::reference::ReferenceFormat;
use chrono::Duration;

pub const APP_NAME: &str = "appointdesk";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const ENV_CONFLICT_WINDOW: &str = "APPOINTDESK_CONFLICT_WINDOW_MINUTES";
pub const ENV_REFERENCE_PREFIX: &str = "APPOINTDESK_REFERENCE_PREFIX";

/// Conflicts are only ever looked for within one calendar day.
pub const MAX_CONFLICT_WINDOW_MINUTES: i64 = 24 * 60;

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "appointdesk=info"
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    conflict_window_minutes: i64,
    reference: ReferenceFormat,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            conflict_window_minutes: DEFAULT_CONFLICT_WINDOW_MINUTES,
            reference: ReferenceFormat::default(),
        }
    }
}

impl EngineConfig {
    pub fn new(conflict_window_minutes: i64, reference: ReferenceFormat) -> BoardResult<Self> {
        if conflict_window_minutes <= 0 {
            return Err(BoardError::Config(
                "conflict window must be a positive number of minutes".to_string(),
            ));
        }
        if conflict_window_minutes > MAX_CONFLICT_WINDOW_MINUTES {
            return Err(BoardError::Config(format!(
                "conflict window cannot exceed {} minutes, got {}",
                MAX_CONFLICT_WINDOW_MINUTES, conflict_window_minutes
            )));
        }
        if reference.prefix.trim().is_empty() {
            return Err(BoardError::Config(
                "reference prefix cannot be empty".to_string(),
            ));
        }

        Ok(EngineConfig {
            conflict_window_minutes,
            reference,
        })
    }

    /// Build from process environment variables, defaulting anything unset.
    pub fn from_env() -> BoardResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> BoardResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = EngineConfig::default();

        let window = match lookup(ENV_CONFLICT_WINDOW) {
            Some(raw) => raw.trim().parse::<i64>().map_err(|_| {
                BoardError::Config(format!(
                    "{} must be an integer, got '{}'",
                    ENV_CONFLICT_WINDOW, raw
                ))
            })?,
            None => defaults.conflict_window_minutes,
        };

        let mut reference = defaults.reference;
        if let Some(prefix) = lookup(ENV_REFERENCE_PREFIX) {
            reference.prefix = prefix.trim().to_string();
        }

        EngineConfig::new(window, reference)
    }

    pub fn conflict_window_minutes(&self) -> i64 {
        self.conflict_window_minutes
    }

    pub fn conflict_window(&self) -> Duration {
        Duration::minutes(self.conflict_window_minutes)
    }

    pub fn reference(&self) -> &ReferenceFormat {
        &self.reference
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let config = EngineConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.conflict_window(), Duration::minutes(30));
        assert_eq!(config.reference().prefix, "APT");
    }

    #[test]
    fn reads_overrides() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            (ENV_CONFLICT_WINDOW, " 15 "),
            (ENV_REFERENCE_PREFIX, "VIS"),
        ]))
        .unwrap();
        assert_eq!(config.conflict_window_minutes(), 15);
        assert_eq!(config.reference().prefix, "VIS");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            EngineConfig::from_lookup(lookup_from(&[(ENV_CONFLICT_WINDOW, "half an hour")])),
            Err(BoardError::Config(_))
        ));
        assert!(EngineConfig::from_lookup(lookup_from(&[(ENV_CONFLICT_WINDOW, "0")])).is_err());
        assert!(EngineConfig::from_lookup(lookup_from(&[(ENV_REFERENCE_PREFIX, "  ")])).is_err());
    }

    #[test]
    fn rejects_windows_longer_than_a_day() {
        let huge = lookup_from(&[(ENV_CONFLICT_WINDOW, "9223372036854775807")]);
        assert!(matches!(
            EngineConfig::from_lookup(huge),
            Err(BoardError::Config(_))
        ));

        let too_wide = MAX_CONFLICT_WINDOW_MINUTES + 1;
        assert!(EngineConfig::new(too_wide, ReferenceFormat::default()).is_err());

        let widest = EngineConfig::new(MAX_CONFLICT_WINDOW_MINUTES, ReferenceFormat::default());
        assert_eq!(widest.unwrap().conflict_window(), Duration::days(1));
    }

    #[test]
    fn app_name_matches_package() {
        assert_eq!(APP_NAME, env!("CARGO_PKG_NAME"));
    }
}
