//! Input validation module
//!
//! Validates sensor data, plant registrations, watering events and
//! schedule preferences at the API boundary.

use tracing::{debug, warn};
use validator::{Validate, ValidationErrors};

use crate::error::{AppError, AppResult};
use crate::models::{PlantInput, SchedulePreferences, SensorInput, WateringInput};
use crate::state::DateRange;

/// Sensor data validation constraints
pub struct SensorConstraints;

impl SensorConstraints {
    pub const MOISTURE_MIN: f64 = 0.0;
    pub const MOISTURE_MAX: f64 = 100.0;

    pub const TEMP_MIN: f64 = -40.0;
    pub const TEMP_MAX: f64 = 80.0;

    pub const HUMIDITY_MIN: f64 = 0.0;
    pub const HUMIDITY_MAX: f64 = 100.0;

    /// Full sunlight peaks around 120000 lux
    pub const LIGHT_MIN: f64 = 0.0;
    pub const LIGHT_MAX: f64 = 200000.0;
}

/// Validate sensor input data
pub fn validate_sensor_input(input: &SensorInput) -> AppResult<()> {
    if let Err(errors) = input.validate() {
        let message = flatten_errors(&errors);
        warn!(errors = %message, "Sensor input validation failed");
        return Err(AppError::ValidationError(message));
    }

    // Additional semantic validation
    validate_measurement(
        "Soil moisture",
        input.soil_moisture,
        SensorConstraints::MOISTURE_MIN,
        SensorConstraints::MOISTURE_MAX,
    )?;
    validate_measurement(
        "Temperature",
        input.temperature,
        SensorConstraints::TEMP_MIN,
        SensorConstraints::TEMP_MAX,
    )?;
    validate_measurement(
        "Humidity",
        input.humidity,
        SensorConstraints::HUMIDITY_MIN,
        SensorConstraints::HUMIDITY_MAX,
    )?;
    validate_measurement(
        "Light",
        input.light,
        SensorConstraints::LIGHT_MIN,
        SensorConstraints::LIGHT_MAX,
    )?;

    debug!("Sensor input validation passed");
    Ok(())
}

/// Validate a plant registration
pub fn validate_plant_input(input: &PlantInput) -> AppResult<()> {
    input
        .validate()
        .map_err(|errors| AppError::ValidationError(flatten_errors(&errors)))?;

    if input.name.trim().is_empty() {
        return Err(AppError::ValidationError("Plant name must not be blank".to_string()));
    }
    if input.plant_type.trim().is_empty() {
        return Err(AppError::ValidationError("Plant type must not be blank".to_string()));
    }

    Ok(())
}

/// Validate a watering event
pub fn validate_watering_input(input: &WateringInput) -> AppResult<()> {
    input
        .validate()
        .map_err(|errors| AppError::ValidationError(flatten_errors(&errors)))?;

    if !input.duration_minutes.is_finite() || !input.amount_ml.is_finite() {
        return Err(AppError::ValidationError(
            "Watering duration and amount must be finite numbers".to_string(),
        ));
    }

    Ok(())
}

/// Validate explicit schedule overrides
pub fn validate_preferences(preferences: &SchedulePreferences) -> AppResult<()> {
    if let Some(days) = &preferences.days {
        if days.is_empty() {
            return Err(AppError::ValidationError(
                "Preferred days must not be empty".to_string(),
            ));
        }
        if let Some(day) = days.iter().find(|d| **d > 6) {
            return Err(AppError::ValidationError(format!(
                "Day {} out of range [0, 6] (0 = Sunday)",
                day
            )));
        }
    }

    if let Some(times) = &preferences.times {
        if times.is_empty() {
            return Err(AppError::ValidationError(
                "Preferred times must not be empty".to_string(),
            ));
        }
        for time in times {
            time.validate()
                .map_err(|errors| AppError::ValidationError(flatten_errors(&errors)))?;
        }
    }

    Ok(())
}

/// Validate a history date range
pub fn validate_date_range(range: &DateRange) -> AppResult<()> {
    if let (Some(start), Some(end)) = (range.start, range.end) {
        if start > end {
            return Err(AppError::ValidationError(
                "Range start must not be after range end".to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_measurement(name: &str, value: f64, min: f64, max: f64) -> AppResult<()> {
    if !value.is_finite() {
        return Err(AppError::ValidationError(format!(
            "{} must be a finite number",
            name
        )));
    }

    if value < min || value > max {
        return Err(AppError::ValidationError(format!(
            "{} {} out of valid range [{}, {}]",
            name, value, min, max
        )));
    }

    Ok(())
}

fn flatten_errors(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let msgs: Vec<String> = errors
                .iter()
                .map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => e.code.to_string(),
                })
                .collect();
            format!("{}: {}", field, msgs.join(", "))
        })
        .collect();
    messages.sort();
    messages.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeOfDay;
    use chrono::{Duration, Utc};

    fn sensor_input(soil_moisture: f64, temperature: f64, humidity: f64, light: f64) -> SensorInput {
        SensorInput {
            soil_moisture,
            temperature,
            humidity,
            light,
            timestamp: None,
        }
    }

    #[test]
    fn test_valid_sensor_input() {
        assert!(validate_sensor_input(&sensor_input(45.0, 22.0, 60.0, 800.0)).is_ok());
    }

    #[test]
    fn test_invalid_soil_moisture() {
        let result = validate_sensor_input(&sensor_input(140.0, 22.0, 60.0, 800.0));
        assert!(result.is_err());

        if let Err(AppError::ValidationError(msg)) = result {
            assert!(msg.contains("soil_moisture") || msg.contains("Soil moisture"));
        }
    }

    #[test]
    fn test_invalid_temperature_and_light() {
        assert!(validate_sensor_input(&sensor_input(45.0, 100.0, 60.0, 800.0)).is_err());
        assert!(validate_sensor_input(&sensor_input(45.0, 22.0, 60.0, -10.0)).is_err());
    }

    #[test]
    fn test_non_finite_values() {
        assert!(validate_measurement("Temperature", f64::NAN, -40.0, 80.0).is_err());
        assert!(validate_measurement("Light", f64::INFINITY, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_plant_input_validation() {
        let valid = PlantInput {
            id: None,
            name: "Rosemary".into(),
            plant_type: "herb".into(),
            owner_id: Some("user-1".into()),
        };
        assert!(validate_plant_input(&valid).is_ok());

        let blank = PlantInput {
            name: "   ".into(),
            ..valid.clone()
        };
        assert!(validate_plant_input(&blank).is_err());

        let empty_type = PlantInput {
            plant_type: String::new(),
            ..valid
        };
        assert!(validate_plant_input(&empty_type).is_err());
    }

    #[test]
    fn test_watering_input_validation() {
        let valid = WateringInput {
            duration_minutes: 10.0,
            amount_ml: 400.0,
            automatic: true,
            success: true,
            timestamp: None,
        };
        assert!(validate_watering_input(&valid).is_ok());

        let zero = WateringInput {
            duration_minutes: 0.0,
            ..valid
        };
        assert!(validate_watering_input(&zero).is_err());
    }

    #[test]
    fn test_preferences_validation() {
        assert!(validate_preferences(&SchedulePreferences::default()).is_ok());

        let valid = SchedulePreferences {
            days: Some(vec![0, 6]),
            times: Some(vec![TimeOfDay::new(23, 59)]),
        };
        assert!(validate_preferences(&valid).is_ok());

        let bad_day = SchedulePreferences {
            days: Some(vec![7]),
            times: None,
        };
        assert!(validate_preferences(&bad_day).is_err());

        let bad_time = SchedulePreferences {
            days: None,
            times: Some(vec![TimeOfDay::new(24, 0)]),
        };
        assert!(validate_preferences(&bad_time).is_err());

        let empty = SchedulePreferences {
            days: Some(Vec::new()),
            times: None,
        };
        assert!(validate_preferences(&empty).is_err());
    }

    #[test]
    fn test_date_range_validation() {
        let now = Utc::now();
        assert!(validate_date_range(&DateRange::default()).is_ok());
        assert!(validate_date_range(&DateRange {
            start: Some(now - Duration::days(3)),
            end: Some(now),
        })
        .is_ok());
        assert!(validate_date_range(&DateRange {
            start: Some(now),
            end: Some(now - Duration::days(3)),
        })
        .is_err());
    }
}
