//! Application state management
//!
//! In-memory plant registry, per-plant sensor ring buffers, watering
//! history and saved schedules. The scoring and scheduling code only sees
//! this store through the [`PlantDataSource`] trait, so any other storage
//! engine can stand in for it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{PlantRecord, SensorReading, WateringEvent};
use crate::schedule::WateringSchedule;

/// Default ring buffer capacity per plant
pub const DEFAULT_MAX_READINGS: usize = 2000;
/// Default watering history capacity per plant
pub const DEFAULT_MAX_WATERING_EVENTS: usize = 500;

/// Inclusive timestamp bounds; an open side is unbounded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.start.map_or(true, |s| timestamp >= s) && self.end.map_or(true, |e| timestamp <= e)
    }
}

/// Read access to plant metadata, sensor history and watering history
pub trait PlantDataSource {
    fn plant(&self, plant_id: &str) -> Option<PlantRecord>;

    /// Up to `limit` readings, newest first
    fn recent_readings(&self, plant_id: &str, limit: usize) -> Vec<SensorReading>;

    /// Readings at or after `since`, newest first
    fn readings_since(&self, plant_id: &str, since: DateTime<Utc>) -> Vec<SensorReading>;

    /// Watering events newest first: every event inside `range` when given,
    /// otherwise the `limit` most recent
    fn watering_history(
        &self,
        plant_id: &str,
        range: Option<DateRange>,
        limit: usize,
    ) -> Vec<WateringEvent>;
}

/// A schedule saved for a user's plant
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleRecord {
    pub id: Uuid,
    pub user_id: Option<String>,
    pub plant_id: String,
    #[serde(flatten)]
    pub schedule: WateringSchedule,
    pub updated_at: DateTime<Utc>,
}

/// Central application state
#[derive(Debug)]
pub struct AppState {
    plants: HashMap<String, PlantRecord>,
    /// Per-plant ring buffers of sensor readings
    readings: HashMap<String, VecDeque<SensorReading>>,
    /// Per-plant ring buffers of watering events
    watering: HashMap<String, VecDeque<WateringEvent>>,
    schedules: Vec<ScheduleRecord>,
    max_readings: usize,
    max_watering_events: usize,
    /// Application start time
    start_time: DateTime<Utc>,
    /// Total readings processed
    total_readings: u64,
}

impl AppState {
    /// Create new application state
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MAX_READINGS, DEFAULT_MAX_WATERING_EVENTS)
    }

    /// Same capacity for both per-plant buffers
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_limits(capacity, capacity)
    }

    pub fn with_limits(max_readings: usize, max_watering_events: usize) -> Self {
        info!(max_readings, max_watering_events, "Initializing application state");
        Self {
            plants: HashMap::new(),
            readings: HashMap::new(),
            watering: HashMap::new(),
            schedules: Vec::new(),
            max_readings: max_readings.max(1),
            max_watering_events: max_watering_events.max(1),
            start_time: Utc::now(),
            total_readings: 0,
        }
    }

    /// Register or replace a plant
    pub fn add_plant(&mut self, plant: PlantRecord) {
        info!(plant_id = %plant.id, plant_type = %plant.plant_type, "Registering plant");
        self.plants.insert(plant.id.clone(), plant);
    }

    pub fn has_plant(&self, plant_id: &str) -> bool {
        self.plants.contains_key(plant_id)
    }

    pub fn plant_ids(&self) -> Vec<String> {
        self.plants.keys().cloned().collect()
    }

    pub fn plant_count(&self) -> usize {
        self.plants.len()
    }

    /// Add a new sensor reading to a plant's buffer
    pub fn add_reading(&mut self, plant_id: &str, reading: SensorReading) {
        self.total_readings += 1;

        let buffer = self
            .readings
            .entry(plant_id.to_string())
            .or_insert_with(VecDeque::new);

        // Remove oldest reading if at capacity
        if buffer.len() >= self.max_readings {
            buffer.pop_front();
        }

        debug!(
            plant_id = %plant_id,
            reading_id = %reading.id,
            total = self.total_readings,
            "Adding sensor reading to state"
        );

        buffer.push_back(reading);
    }

    /// Get the latest sensor reading for a plant
    pub fn get_latest(&self, plant_id: &str) -> Option<&SensorReading> {
        self.readings
            .get(plant_id)?
            .iter()
            .max_by_key(|r| r.timestamp)
    }

    pub fn add_watering_event(&mut self, event: WateringEvent) {
        debug!(
            plant_id = %event.plant_id,
            event_id = %event.id,
            automatic = event.automatic,
            "Recording watering event"
        );
        let events = self.watering.entry(event.plant_id.clone()).or_default();

        // Evict the oldest event if at capacity
        if events.len() >= self.max_watering_events {
            events.pop_front();
        }
        events.push_back(event);
    }

    /// Save a schedule, replacing any earlier one for the same plant
    pub fn save_schedule(
        &mut self,
        user_id: Option<String>,
        plant_id: &str,
        schedule: WateringSchedule,
    ) -> ScheduleRecord {
        self.schedules.retain(|r| r.plant_id != plant_id);

        let record = ScheduleRecord {
            id: Uuid::new_v4(),
            user_id,
            plant_id: plant_id.to_string(),
            updated_at: schedule.created_at,
            schedule,
        };

        info!(schedule_id = %record.id, plant_id = %plant_id, "Schedule saved");
        self.schedules.push(record.clone());
        record
    }

    pub fn schedule_for_plant(&self, plant_id: &str) -> Option<&ScheduleRecord> {
        self.schedules.iter().find(|r| r.plant_id == plant_id)
    }

    pub fn schedules_for_user(&self, user_id: &str) -> Vec<&ScheduleRecord> {
        self.schedules
            .iter()
            .filter(|r| r.user_id.as_deref() == Some(user_id))
            .collect()
    }

    /// Enable or disable a schedule; `None` if the id is unknown
    pub fn set_schedule_enabled(&mut self, schedule_id: Uuid, enabled: bool) -> Option<&ScheduleRecord> {
        let record = self.schedules.iter_mut().find(|r| r.id == schedule_id)?;
        record.schedule.enabled = enabled;
        record.updated_at = Utc::now();
        info!(schedule_id = %schedule_id, enabled, "Schedule toggled");
        Some(record)
    }

    /// Delete a schedule; `false` if the id is unknown
    pub fn delete_schedule(&mut self, schedule_id: Uuid) -> bool {
        let before = self.schedules.len();
        self.schedules.retain(|r| r.id != schedule_id);
        let removed = self.schedules.len() < before;
        if removed {
            info!(schedule_id = %schedule_id, "Schedule deleted");
        }
        removed
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        (Utc::now() - self.start_time).num_seconds().max(0) as u64
    }

    /// Get total readings processed
    pub fn total_readings(&self) -> u64 {
        self.total_readings
    }

    fn readings_newest_first<F>(&self, plant_id: &str, keep: F) -> Vec<SensorReading>
    where
        F: Fn(&SensorReading) -> bool,
    {
        let mut readings: Vec<SensorReading> = self
            .readings
            .get(plant_id)
            .map(|buffer| buffer.iter().filter(|r| keep(*r)).cloned().collect())
            .unwrap_or_default();
        readings.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        readings
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl PlantDataSource for AppState {
    fn plant(&self, plant_id: &str) -> Option<PlantRecord> {
        self.plants.get(plant_id).cloned()
    }

    fn recent_readings(&self, plant_id: &str, limit: usize) -> Vec<SensorReading> {
        let mut readings = self.readings_newest_first(plant_id, |_| true);
        readings.truncate(limit);
        readings
    }

    fn readings_since(&self, plant_id: &str, since: DateTime<Utc>) -> Vec<SensorReading> {
        self.readings_newest_first(plant_id, |r| r.timestamp >= since)
    }

    fn watering_history(
        &self,
        plant_id: &str,
        range: Option<DateRange>,
        limit: usize,
    ) -> Vec<WateringEvent> {
        let mut events: Vec<WateringEvent> = self
            .watering
            .get(plant_id)
            .map(|events| {
                events
                    .iter()
                    .filter(|e| range.map_or(true, |r| r.contains(e.timestamp)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        if range.is_none() {
            events.truncate(limit);
        }
        events
    }
}
