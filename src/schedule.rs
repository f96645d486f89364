//! Irrigation schedule optimization
//!
//! Derives a watering schedule (frequency, duration, weekdays and times of
//! day) from recent sensor averages, the plant's care profile and the
//! timing of past watering events. Explicit user preferences always win
//! over the pattern learned from history.

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::Serialize;
use tracing::debug;

use crate::models::{SchedulePreferences, SensorAverages, SensorReading, TimeOfDay, WateringEvent};
use crate::profiles::{CareProfile, WaterNeeds};

pub const DEFAULT_FREQUENCY_DAYS: u32 = 3;
pub const DEFAULT_DURATION_MINUTES: u32 = 10;
/// Monday, Wednesday, Friday
pub const DEFAULT_DAYS: [u8; 3] = [1, 3, 5];
pub const DEFAULT_TIMES: [TimeOfDay; 2] = [TimeOfDay::new(6, 0), TimeOfDay::new(18, 0)];

const PREFERRED_DAY_COUNT: usize = 3;
const PREFERRED_HOUR_COUNT: usize = 2;

pub const NOTE_OPTIMIZED: &str = "Optimized from sensor data and watering history";
pub const NOTE_OPTIMIZED_NO_HISTORY: &str =
    "Optimized from sensor data; default watering days and times (no watering history)";
pub const NOTE_DEFAULT: &str = "Default schedule: insufficient sensor data";

/// Recommended watering schedule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WateringSchedule {
    /// Days between waterings
    pub frequency: u32,
    /// Minutes per watering
    pub duration: u32,
    pub times: Vec<TimeOfDay>,
    /// Weekday indices, 0 = Sunday
    pub days: Vec<u8>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub note: String,
}

/// Preferred watering days and hours learned from history
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WateringPattern {
    pub preferred_days: Vec<u8>,
    pub preferred_times: Vec<TimeOfDay>,
}

impl Default for WateringPattern {
    fn default() -> Self {
        Self {
            preferred_days: DEFAULT_DAYS.to_vec(),
            preferred_times: DEFAULT_TIMES.to_vec(),
        }
    }
}

/// Optimize a schedule for one plant.
///
/// An empty reading batch takes the fixed default path; `now` stamps the
/// result so identical inputs give identical schedules.
pub fn optimize(
    care: &CareProfile,
    readings: &[SensorReading],
    history: &[WateringEvent],
    preferences: &SchedulePreferences,
    now: DateTime<Utc>,
) -> WateringSchedule {
    let Some(averages) = SensorAverages::from_readings(readings) else {
        debug!(plant_type = %care.plant_type, "No sensor readings, using default schedule");
        return default_schedule(preferences, now);
    };

    let base = base_frequency(care.water_needs, averages.temperature, averages.humidity);
    let frequency = refine_frequency(base, averages.soil_moisture, care.ideal_moisture);
    let duration = watering_duration(care.water_needs, averages.soil_moisture, care.ideal_moisture);
    let pattern = analyze_pattern(history);

    debug!(
        plant_type = %care.plant_type,
        avg_moisture = averages.soil_moisture,
        avg_temperature = averages.temperature,
        avg_humidity = averages.humidity,
        base_frequency = base,
        frequency,
        duration,
        history = history.len(),
        "Irrigation schedule optimized"
    );

    let note = if history.is_empty() {
        NOTE_OPTIMIZED_NO_HISTORY
    } else {
        NOTE_OPTIMIZED
    };

    build_schedule(frequency, duration, pattern, preferences, note, now)
}

/// Fixed fallback schedule used when sensor data is insufficient
pub fn default_schedule(preferences: &SchedulePreferences, now: DateTime<Utc>) -> WateringSchedule {
    build_schedule(
        DEFAULT_FREQUENCY_DAYS,
        DEFAULT_DURATION_MINUTES,
        WateringPattern::default(),
        preferences,
        NOTE_DEFAULT,
        now,
    )
}

/// Interval from water needs, adjusted for temperature then humidity
pub fn base_frequency(water_needs: WaterNeeds, temperature: f64, humidity: f64) -> u32 {
    let mut frequency = water_needs.base_frequency_days();

    if temperature > 30.0 {
        frequency = frequency.saturating_sub(1).max(1);
    } else if temperature < 15.0 {
        frequency += 1;
    }

    if humidity < 40.0 {
        frequency = frequency.saturating_sub(1).max(1);
    } else if humidity > 80.0 {
        frequency += 1;
    }

    frequency
}

/// Tighten or loosen `base` by a day when soil moisture is off its ideal by more than 20%
pub fn refine_frequency(base: u32, avg_moisture: f64, ideal_moisture: f64) -> u32 {
    let refined = if avg_moisture < ideal_moisture * 0.8 {
        base.saturating_sub(1)
    } else if avg_moisture > ideal_moisture * 1.2 {
        base + 1
    } else {
        base
    };
    refined.max(1)
}

/// Minutes per watering from water needs and the moisture gap to the ideal
pub fn watering_duration(water_needs: WaterNeeds, current_moisture: f64, target_moisture: f64) -> u32 {
    let base = water_needs.base_duration_minutes();
    let gap = target_moisture - current_moisture;

    let duration = if gap > 20.0 {
        base + 5
    } else if gap < 0.0 {
        base.saturating_sub(5)
    } else {
        base
    };
    duration.max(1)
}

/// Tally watering events by weekday and hour (UTC) and keep the busiest slots.
///
/// Always yields 3 days and 2 times: ties, including slots with no events,
/// go to the lower weekday / hour index. An empty history yields the
/// default pattern.
pub fn analyze_pattern(history: &[WateringEvent]) -> WateringPattern {
    if history.is_empty() {
        return WateringPattern::default();
    }

    let mut day_counts = [0usize; 7];
    let mut hour_counts = [0usize; 24];
    for event in history {
        day_counts[event.timestamp.weekday().num_days_from_sunday() as usize] += 1;
        hour_counts[event.timestamp.hour() as usize] += 1;
    }

    let preferred_days = top_slots(&day_counts, PREFERRED_DAY_COUNT);
    let preferred_times = top_slots(&hour_counts, PREFERRED_HOUR_COUNT)
        .into_iter()
        .map(|hour| TimeOfDay::new(hour, 0))
        .collect();

    WateringPattern {
        preferred_days,
        preferred_times,
    }
}

fn top_slots(counts: &[usize], take: usize) -> Vec<u8> {
    let mut ranked: Vec<(u8, usize)> = counts
        .iter()
        .enumerate()
        .map(|(slot, count)| (slot as u8, *count))
        .collect();
    // stable: equal counts keep ascending slot order
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.into_iter().take(take).map(|(slot, _)| slot).collect()
}

fn build_schedule(
    frequency: u32,
    duration: u32,
    pattern: WateringPattern,
    preferences: &SchedulePreferences,
    note: &str,
    now: DateTime<Utc>,
) -> WateringSchedule {
    WateringSchedule {
        frequency: frequency.max(1),
        duration: duration.max(1),
        times: preferences.times.clone().unwrap_or(pattern.preferred_times),
        days: preferences.days.clone().unwrap_or(pattern.preferred_days),
        enabled: true,
        created_at: now,
        note: note.to_string(),
    }
}
