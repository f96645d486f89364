//! Configuration management module
//!
//! Loads and validates environment-based configuration.

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid value for {0}")]
    ParseError(&'static str),

    #[error("{0} must be greater than zero")]
    InvalidValue(&'static str),

    #[error("{0} must be between {1} and {2}")]
    OutOfRange(&'static str, i64, i64),
}

/// Upper bound for the schedule optimization window
pub const MAX_SCHEDULE_WINDOW_DAYS: i64 = 365;

/// Server configuration settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Data windows fed to the health scorer and schedule optimizer
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisSettings {
    /// Number of most recent readings averaged for a health assessment
    pub health_reading_window: usize,
    /// Days of readings averaged for schedule optimization
    pub schedule_window_days: i64,
    /// Number of most recent watering events used for pattern extraction
    pub watering_history_limit: usize,
}

/// In-memory store limits
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    /// Ring buffer capacity per plant
    pub max_readings_per_plant: usize,
    /// Watering history capacity per plant
    pub max_watering_events_per_plant: usize,
}

/// Demo simulator settings
#[derive(Debug, Clone, Deserialize)]
pub struct SimulatorSettings {
    pub enabled: bool,
    /// Interval in milliseconds between simulated readings
    pub interval_ms: u64,
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub analysis: AnalysisSettings,
    pub store: StoreSettings,
    pub simulator: SimulatorSettings,
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load settings from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = parse_or(&lookup, "SERVER_PORT", 8080u16)?;

        let health_reading_window = positive(
            parse_or(&lookup, "HEALTH_READING_WINDOW", 24usize)?,
            "HEALTH_READING_WINDOW",
        )?;
        let schedule_window_days = parse_or(&lookup, "SCHEDULE_WINDOW_DAYS", 7i64)?;
        if schedule_window_days <= 0 {
            return Err(SettingsError::InvalidValue("SCHEDULE_WINDOW_DAYS"));
        }
        if schedule_window_days > MAX_SCHEDULE_WINDOW_DAYS {
            return Err(SettingsError::OutOfRange(
                "SCHEDULE_WINDOW_DAYS",
                1,
                MAX_SCHEDULE_WINDOW_DAYS,
            ));
        }
        let watering_history_limit = positive(
            parse_or(&lookup, "WATERING_HISTORY_LIMIT", 10usize)?,
            "WATERING_HISTORY_LIMIT",
        )?;
        let max_readings_per_plant = positive(
            parse_or(&lookup, "MAX_READINGS_PER_PLANT", 2000usize)?,
            "MAX_READINGS_PER_PLANT",
        )?;
        let max_watering_events_per_plant = positive(
            parse_or(&lookup, "MAX_WATERING_EVENTS_PER_PLANT", 500usize)?,
            "MAX_WATERING_EVENTS_PER_PLANT",
        )?;

        let simulator_enabled = parse_or(&lookup, "SIMULATOR_ENABLED", false)?;
        let simulator_interval_ms = parse_or(&lookup, "SIMULATOR_INTERVAL_MS", 5000u64)?;

        Ok(Self {
            server: ServerSettings {
                host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".into()),
                port,
            },
            analysis: AnalysisSettings {
                health_reading_window,
                schedule_window_days,
                watering_history_limit,
            },
            store: StoreSettings {
                max_readings_per_plant,
                max_watering_events_per_plant,
            },
            simulator: SimulatorSettings {
                enabled: simulator_enabled,
                interval_ms: simulator_interval_ms,
            },
        })
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            health_reading_window: 24,
            schedule_window_days: 7,
            watering_history_limit: 10,
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, SettingsError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| SettingsError::ParseError(key)),
        None => Ok(default),
    }
}

fn positive(value: usize, key: &'static str) -> Result<usize, SettingsError> {
    if value == 0 {
        return Err(SettingsError::InvalidValue(key));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(pairs: &[(&str, &str)]) -> Result<Settings, SettingsError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_settings() {
        let settings = settings_from(&[]).unwrap();

        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.analysis.health_reading_window, 24);
        assert_eq!(settings.analysis.schedule_window_days, 7);
        assert_eq!(settings.analysis.watering_history_limit, 10);
        assert_eq!(settings.store.max_readings_per_plant, 2000);
        assert_eq!(settings.store.max_watering_events_per_plant, 500);
        assert!(!settings.simulator.enabled);
    }

    #[test]
    fn test_custom_settings() {
        let settings = settings_from(&[
            ("SERVER_PORT", "3000"),
            ("HEALTH_READING_WINDOW", "48"),
            ("SIMULATOR_ENABLED", "true"),
            ("SIMULATOR_INTERVAL_MS", "500"),
        ])
        .unwrap();

        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.analysis.health_reading_window, 48);
        assert!(settings.simulator.enabled);
        assert_eq!(settings.simulator.interval_ms, 500);
    }

    #[test]
    fn test_invalid_number() {
        let result = settings_from(&[("SERVER_PORT", "not-a-port")]);
        assert!(matches!(result, Err(SettingsError::ParseError("SERVER_PORT"))));
    }

    #[test]
    fn test_zero_window_rejected() {
        let result = settings_from(&[("HEALTH_READING_WINDOW", "0")]);
        assert!(matches!(result, Err(SettingsError::InvalidValue("HEALTH_READING_WINDOW"))));

        let result = settings_from(&[("SCHEDULE_WINDOW_DAYS", "-2")]);
        assert!(matches!(result, Err(SettingsError::InvalidValue("SCHEDULE_WINDOW_DAYS"))));
    }

    #[test]
    fn test_oversized_schedule_window_rejected() {
        let result = settings_from(&[("SCHEDULE_WINDOW_DAYS", "9223372036854775807")]);
        assert!(matches!(
            result,
            Err(SettingsError::OutOfRange("SCHEDULE_WINDOW_DAYS", 1, MAX_SCHEDULE_WINDOW_DAYS))
        ));

        let settings = settings_from(&[("SCHEDULE_WINDOW_DAYS", "365")]).unwrap();
        assert_eq!(settings.analysis.schedule_window_days, 365);
    }
}
