//! Plant care service
//!
//! Resolves a plant through a [`PlantDataSource`], fetches the data windows
//! each analysis needs and hands them to the pure health and schedule code.

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use crate::config::AnalysisSettings;
use crate::error::{AppError, AppResult};
use crate::health::{self, HealthAssessment};
use crate::models::{PlantRecord, SchedulePreferences};
use crate::profiles::ProfileCatalog;
use crate::schedule::{self, WateringSchedule};
use crate::state::PlantDataSource;

/// Entry point for health assessments and schedule optimization
#[derive(Debug, Clone)]
pub struct PlantCareService {
    catalog: ProfileCatalog,
    analysis: AnalysisSettings,
}

impl PlantCareService {
    pub fn new(catalog: ProfileCatalog, analysis: AnalysisSettings) -> Self {
        Self { catalog, analysis }
    }

    pub fn catalog(&self) -> &ProfileCatalog {
        &self.catalog
    }

    pub fn analysis(&self) -> &AnalysisSettings {
        &self.analysis
    }

    /// Assess a plant's health from its most recent readings
    pub fn assess_health<S: PlantDataSource>(
        &self,
        source: &S,
        plant_id: &str,
    ) -> AppResult<HealthAssessment> {
        let plant = self.resolve_plant(source, plant_id)?;
        let profile = self.catalog.profile(&plant.plant_type);
        let readings = source.recent_readings(&plant.id, self.analysis.health_reading_window);

        let assessment = health::assess(&plant, profile, &readings)?;

        info!(
            plant_id = %plant.id,
            health_score = assessment.health_score,
            status = assessment.status.as_str(),
            issues = assessment.issues.len(),
            "Health assessment completed"
        );

        Ok(assessment)
    }

    /// Optimize a watering schedule for a plant
    pub fn optimize_schedule<S: PlantDataSource>(
        &self,
        source: &S,
        plant_id: &str,
        user_id: Option<&str>,
        preferences: &SchedulePreferences,
        now: DateTime<Utc>,
    ) -> AppResult<WateringSchedule> {
        let plant = self.resolve_plant(source, plant_id)?;
        let care = self.catalog.care_profile(&plant.plant_type);

        // a window beyond chrono's range means no lower bound
        let since = Duration::try_days(self.analysis.schedule_window_days)
            .and_then(|window| now.checked_sub_signed(window))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let readings = source.readings_since(&plant.id, since);
        let history = source.watering_history(&plant.id, None, self.analysis.watering_history_limit);

        if readings.is_empty() {
            warn!(plant_id = %plant.id, "No recent sensor data, falling back to default schedule");
        }

        let schedule = schedule::optimize(&care, &readings, &history, preferences, now);

        info!(
            plant_id = %plant.id,
            user_id = user_id.unwrap_or("-"),
            frequency = schedule.frequency,
            duration = schedule.duration,
            "Watering schedule optimized"
        );

        Ok(schedule)
    }

    fn resolve_plant<S: PlantDataSource>(&self, source: &S, plant_id: &str) -> AppResult<PlantRecord> {
        let plant_id = plant_id.trim();
        if plant_id.is_empty() {
            return Err(AppError::InvalidInput("Missing plant id".to_string()));
        }

        source
            .plant(plant_id)
            .ok_or_else(|| AppError::NotFound(format!("Plant {} not found", plant_id)))
    }
}

impl Default for PlantCareService {
    fn default() -> Self {
        Self::new(ProfileCatalog::builtin(), AnalysisSettings::default())
    }
}
