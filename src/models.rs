//! Data models for plants, sensor readings and watering events
//!
//! Defines the core data structures used throughout the application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A registered plant and the type that selects its care profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantRecord {
    pub id: String,
    pub name: String,
    /// Free-form type name, resolved case-insensitively against the profile catalog
    pub plant_type: String,
    pub owner_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input DTO for plant registration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PlantInput {
    /// Optional client-chosen identifier (defaults to a UUID)
    pub id: Option<String>,

    #[validate(length(min = 1, max = 120, message = "Plant name must be 1-120 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 60, message = "Plant type must be 1-60 characters"))]
    pub plant_type: String,

    pub owner_id: Option<String>,
}

impl From<PlantInput> for PlantRecord {
    fn from(input: PlantInput) -> Self {
        PlantRecord {
            id: input
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: input.name,
            plant_type: input.plant_type,
            owner_id: input.owner_id,
            created_at: Utc::now(),
        }
    }
}

/// Environmental observation from a plant's sensor node
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SensorReading {
    /// Unique identifier for this reading
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    /// Volumetric soil moisture (percentage)
    #[validate(range(min = 0.0, max = 100.0, message = "Soil moisture must be between 0 and 100%"))]
    pub soil_moisture: f64,

    /// Air temperature (Celsius)
    #[validate(range(min = -40.0, max = 80.0, message = "Temperature must be between -40 and 80°C"))]
    pub temperature: f64,

    /// Relative air humidity (percentage)
    #[validate(range(min = 0.0, max = 100.0, message = "Humidity must be between 0 and 100%"))]
    pub humidity: f64,

    /// Illuminance (lux)
    #[validate(range(min = 0.0, max = 200000.0, message = "Light must be between 0 and 200000 lux"))]
    pub light: f64,

    /// ISO 8601 timestamp of the reading
    pub timestamp: DateTime<Utc>,
}

impl SensorReading {
    /// Create a new sensor reading with current timestamp
    pub fn new(soil_moisture: f64, temperature: f64, humidity: f64, light: f64) -> Self {
        Self::at(soil_moisture, temperature, humidity, light, Utc::now())
    }

    /// Create a sensor reading with an explicit timestamp
    pub fn at(
        soil_moisture: f64,
        temperature: f64,
        humidity: f64,
        light: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            soil_moisture,
            temperature,
            humidity,
            light,
            timestamp,
        }
    }
}

/// Input DTO for sensor data ingestion
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SensorInput {
    #[validate(range(min = 0.0, max = 100.0))]
    pub soil_moisture: f64,

    #[validate(range(min = -40.0, max = 80.0))]
    pub temperature: f64,

    #[validate(range(min = 0.0, max = 100.0))]
    pub humidity: f64,

    #[validate(range(min = 0.0, max = 200000.0))]
    pub light: f64,

    /// Optional client-provided timestamp (defaults to server time)
    pub timestamp: Option<DateTime<Utc>>,
}

impl From<SensorInput> for SensorReading {
    fn from(input: SensorInput) -> Self {
        SensorReading::at(
            input.soil_moisture,
            input.temperature,
            input.humidity,
            input.light,
            input.timestamp.unwrap_or_else(Utc::now),
        )
    }
}

/// Arithmetic mean of a reading batch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorAverages {
    pub soil_moisture: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub light: f64,
    /// Newest timestamp in the batch
    pub latest_timestamp: DateTime<Utc>,
}

impl SensorAverages {
    /// Average a batch of readings; `None` for an empty batch.
    ///
    /// Order-independent: the latest timestamp is the maximum, not the first element.
    pub fn from_readings(readings: &[SensorReading]) -> Option<Self> {
        let latest_timestamp = readings.iter().map(|r| r.timestamp).max()?;

        let (moisture_sum, temp_sum, hum_sum, light_sum) = readings.iter().fold(
            (0.0, 0.0, 0.0, 0.0),
            |(m, t, h, l), r| {
                (
                    m + r.soil_moisture,
                    t + r.temperature,
                    h + r.humidity,
                    l + r.light,
                )
            },
        );

        let count = readings.len() as f64;

        Some(Self {
            soil_moisture: moisture_sum / count,
            temperature: temp_sum / count,
            humidity: hum_sum / count,
            light: light_sum / count,
            latest_timestamp,
        })
    }
}

/// Record of an irrigation action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WateringEvent {
    pub id: Uuid,
    pub plant_id: String,
    pub timestamp: DateTime<Utc>,
    /// Watering duration in minutes
    pub duration_minutes: f64,
    /// Water volume in millilitres
    pub amount_ml: f64,
    /// `true` when triggered by a schedule, `false` for manual watering
    pub automatic: bool,
    pub success: bool,
}

/// Input DTO for recording a watering event
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WateringInput {
    #[validate(range(min = 0.1, max = 1440.0, message = "Duration must be between 0.1 and 1440 minutes"))]
    pub duration_minutes: f64,

    #[validate(range(min = 0.0, message = "Amount must not be negative"))]
    pub amount_ml: f64,

    #[serde(default)]
    pub automatic: bool,

    #[serde(default = "default_success")]
    pub success: bool,

    pub timestamp: Option<DateTime<Utc>>,
}

fn default_success() -> bool {
    true
}

impl WateringEvent {
    pub fn from_input(plant_id: &str, input: WateringInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            plant_id: plant_id.to_string(),
            timestamp: input.timestamp.unwrap_or_else(Utc::now),
            duration_minutes: input.duration_minutes,
            amount_ml: input.amount_ml,
            automatic: input.automatic,
            success: input.success,
        }
    }
}

/// Time-of-day slot for a watering run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
pub struct TimeOfDay {
    #[validate(range(max = 23, message = "Hour must be between 0 and 23"))]
    pub hour: u8,
    #[validate(range(max = 59, message = "Minute must be between 0 and 59"))]
    pub minute: u8,
}

impl TimeOfDay {
    pub const fn new(hour: u8, minute: u8) -> Self {
        Self { hour, minute }
    }
}

/// Caller overrides for the derived watering pattern
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchedulePreferences {
    /// Weekday indices, 0 = Sunday
    pub days: Option<Vec<u8>>,
    pub times: Option<Vec<TimeOfDay>>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheck {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub plant_count: usize,
    pub total_readings: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::Duration;

    #[test]
    fn test_sensor_reading_creation() {
        let reading = SensorReading::new(55.0, 22.0, 60.0, 500.0);

        assert_eq!(reading.soil_moisture, 55.0);
        assert_eq!(reading.temperature, 22.0);
        assert_eq!(reading.humidity, 60.0);
        assert_eq!(reading.light, 500.0);
    }

    #[test]
    fn test_sensor_input_conversion() {
        let input = SensorInput {
            soil_moisture: 41.0,
            temperature: 24.0,
            humidity: 60.0,
            light: 650.0,
            timestamp: None,
        };

        let reading: SensorReading = input.into();

        assert_eq!(reading.soil_moisture, 41.0);
        assert_eq!(reading.light, 650.0);
    }

    #[test]
    fn test_sensor_reading_validation() {
        let valid = SensorReading::new(55.0, 22.0, 60.0, 500.0);
        assert!(valid.validate().is_ok());

        let invalid = SensorReading::new(120.0, 22.0, 60.0, 500.0);
        assert!(invalid.validate().is_err());

        let invalid = SensorReading::new(55.0, 22.0, 60.0, -1.0);
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_averages_of_empty_batch() {
        assert!(SensorAverages::from_readings(&[]).is_none());
    }

    #[test]
    fn test_averages_are_order_independent() {
        let now = Utc::now();
        let older = SensorReading::at(40.0, 20.0, 50.0, 400.0, now - Duration::hours(2));
        let newer = SensorReading::at(60.0, 24.0, 70.0, 600.0, now);

        let forward = SensorAverages::from_readings(&[older.clone(), newer.clone()]).unwrap();
        let backward = SensorAverages::from_readings(&[newer, older]).unwrap();

        assert_eq!(forward, backward);
        assert_relative_eq!(forward.soil_moisture, 50.0);
        assert_relative_eq!(forward.temperature, 22.0);
        assert_relative_eq!(forward.humidity, 60.0);
        assert_relative_eq!(forward.light, 500.0);
        assert_eq!(forward.latest_timestamp, now);
    }

    #[test]
    fn test_plant_input_generates_id() {
        let record: PlantRecord = PlantInput {
            id: Some("  ".into()),
            name: "Basil".into(),
            plant_type: "herb".into(),
            owner_id: None,
        }
        .into();

        assert!(Uuid::parse_str(&record.id).is_ok());
    }

    #[test]
    fn test_time_of_day_validation() {
        assert!(TimeOfDay::new(6, 30).validate().is_ok());
        assert!(TimeOfDay::new(24, 0).validate().is_err());
        assert!(TimeOfDay::new(6, 60).validate().is_err());
    }
}
