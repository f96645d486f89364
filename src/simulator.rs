//! Demo sensor simulator
//!
//! Generates noisy soil moisture, temperature, humidity and light readings
//! for every registered plant, and an automatic watering event whenever a
//! plant's soil dries out. Used for demos only; the scoring and scheduling
//! code never sees any randomness beyond the readings it is handed.

use chrono::Utc;
use rand::Rng;
use rand_distr::{Distribution, Normal, NormalError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{interval, Duration};
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{SensorReading, WateringEvent};
use crate::state::AppState;

/// Soil moisture below which the simulator waters a plant
const DRY_SOIL_THRESHOLD: f64 = 25.0;
/// Moisture gained from one simulated watering
const WATERING_MOISTURE_GAIN: f64 = 35.0;
/// Moisture lost per tick through evaporation and uptake
const MOISTURE_DECAY_PER_TICK: f64 = 0.4;

/// Per-plant simulated environment
#[derive(Debug, Clone)]
struct PlantEnvironment {
    soil_moisture: f64,
    base_temperature: f64,
    base_humidity: f64,
    base_light: f64,
}

impl PlantEnvironment {
    fn seeded<R: Rng>(rng: &mut R) -> Self {
        Self {
            soil_moisture: rng.gen_range(35.0..70.0),
            base_temperature: rng.gen_range(19.0..27.0),
            base_humidity: rng.gen_range(45.0..70.0),
            base_light: rng.gen_range(300.0..900.0),
        }
    }
}

/// Simulator that feeds readings into the shared state
pub struct SensorSimulator {
    /// Interval between readings in milliseconds
    interval_ms: u64,
    /// Time drift factor for day/night cycles
    drift_factor: f64,
    environments: HashMap<String, PlantEnvironment>,
    temp_noise: Normal<f64>,
    humidity_noise: Normal<f64>,
    light_noise: Normal<f64>,
}

impl SensorSimulator {
    pub fn new(interval_ms: u64) -> Result<Self, NormalError> {
        info!(interval_ms, "Initializing sensor simulator");

        Ok(Self {
            interval_ms,
            drift_factor: 0.0,
            environments: HashMap::new(),
            temp_noise: Normal::new(0.0, 0.5)?,
            humidity_noise: Normal::new(0.0, 2.0)?,
            light_noise: Normal::new(0.0, 40.0)?,
        })
    }

    /// Run the simulator continuously
    pub async fn run(mut self, state: Arc<RwLock<AppState>>) {
        info!("Starting simulated sensor loop");

        let mut tick_interval = interval(Duration::from_millis(self.interval_ms.max(1)));
        let mut tick_count: u64 = 0;

        loop {
            tick_interval.tick().await;
            tick_count += 1;

            let mut app_state = state.write().await;
            let generated = self.tick(&mut app_state, &mut rand::thread_rng());

            if tick_count % 60 == 0 {
                info!(
                    tick = tick_count,
                    plants = generated,
                    total_readings = app_state.total_readings(),
                    "Simulator heartbeat"
                );
            }
        }
    }

    /// Generate one reading per registered plant; returns how many were generated
    fn tick<R: Rng>(&mut self, state: &mut AppState, rng: &mut R) -> usize {
        self.drift_factor += 0.01;
        if self.drift_factor > std::f64::consts::PI * 2.0 {
            self.drift_factor = 0.0;
        }

        let plant_ids = state.plant_ids();
        for plant_id in &plant_ids {
            let env = self
                .environments
                .entry(plant_id.clone())
                .or_insert_with(|| PlantEnvironment::seeded(rng));

            env.soil_moisture = (env.soil_moisture - MOISTURE_DECAY_PER_TICK).max(0.0);

            if env.soil_moisture < DRY_SOIL_THRESHOLD {
                env.soil_moisture = (env.soil_moisture + WATERING_MOISTURE_GAIN).min(100.0);
                state.add_watering_event(WateringEvent {
                    id: Uuid::new_v4(),
                    plant_id: plant_id.clone(),
                    timestamp: Utc::now(),
                    duration_minutes: rng.gen_range(5.0..15.0),
                    amount_ml: rng.gen_range(200.0..700.0),
                    automatic: true,
                    success: rng.gen::<f64>() > 0.1,
                });
                info!(plant_id = %plant_id, "Simulated automatic watering");
            }

            // Warmer, drier and brighter during the simulated day
            let daylight = self.drift_factor.sin();
            let temperature = (env.base_temperature + daylight * 3.0 + self.temp_noise.sample(rng))
                .clamp(-10.0, 45.0);
            let humidity = (env.base_humidity - daylight * 6.0 + self.humidity_noise.sample(rng))
                .clamp(10.0, 100.0);
            let light = (env.base_light * (1.0 + daylight * 0.5) + self.light_noise.sample(rng))
                .clamp(0.0, 2000.0);

            let reading = SensorReading::new(
                (env.soil_moisture * 10.0).round() / 10.0,
                (temperature * 10.0).round() / 10.0,
                (humidity * 10.0).round() / 10.0,
                light.round(),
            );

            debug!(
                plant_id = %plant_id,
                soil_moisture = reading.soil_moisture,
                temperature = reading.temperature,
                humidity = reading.humidity,
                light = reading.light,
                "Generated simulated reading"
            );

            state.add_reading(plant_id, reading);
        }

        plant_ids.len()
    }
}
