//! HTTP request handlers
//!
//! REST endpoints for plant registration, sensor ingestion, watering
//! history, health assessment and irrigation schedules.

use actix_web::{web, HttpRequest, HttpResponse, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    HealthCheck, PlantInput, PlantRecord, SchedulePreferences, SensorInput, SensorReading,
    WateringEvent, WateringInput,
};
use crate::profiles::{CareProfile, PlantProfile, PlantType};
use crate::service::PlantCareService;
use crate::state::{AppState, DateRange, PlantDataSource, ScheduleRecord};
use crate::validation::{
    validate_date_range, validate_plant_input, validate_preferences, validate_sensor_input,
    validate_watering_input,
};

type SharedState = web::Data<Arc<RwLock<AppState>>>;

/// Configure all application routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Health check
            .route("/health", web::get().to(health_check))
            // Plant registry and data
            .route("/plants", web::post().to(register_plant))
            .route("/plants/{id}", web::get().to(get_plant))
            .route("/plants/{id}/readings", web::post().to(ingest_reading))
            .route("/plants/{id}/watering", web::post().to(record_watering))
            .route("/plants/{id}/watering", web::get().to(get_watering_history))
            .route("/plants/{id}/health", web::get().to(get_plant_health))
            // Irrigation schedules
            .route("/irrigation/optimize", web::post().to(optimize_schedule))
            .route(
                "/irrigation/schedules/plant/{plant_id}",
                web::get().to(get_plant_schedule),
            )
            .route(
                "/irrigation/schedules/user/{user_id}",
                web::get().to(get_user_schedules),
            )
            .route(
                "/irrigation/schedules/{id}/toggle",
                web::patch().to(toggle_schedule),
            )
            .route("/irrigation/schedules/{id}", web::delete().to(delete_schedule))
            // Profile catalog
            .route("/profiles/{type}", web::get().to(get_profile)),
    );
}

/// Health check endpoint
///
/// GET /api/health
pub async fn health_check(state: SharedState) -> Result<HttpResponse, AppError> {
    let state = state.read().await;

    let health = HealthCheck {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        uptime_seconds: state.uptime_seconds(),
        plant_count: state.plant_count(),
        total_readings: state.total_readings(),
    };

    Ok(HttpResponse::Ok().json(health))
}

/// Register a plant
///
/// POST /api/plants
pub async fn register_plant(
    state: SharedState,
    body: web::Json<PlantInput>,
) -> Result<HttpResponse, AppError> {
    validate_plant_input(&body)?;

    let plant: PlantRecord = body.into_inner().into();

    let mut state = state.write().await;
    if state.has_plant(&plant.id) {
        return Err(AppError::BadRequest(format!(
            "Plant {} is already registered",
            plant.id
        )));
    }
    state.add_plant(plant.clone());

    Ok(HttpResponse::Created().json(plant))
}

/// GET /api/plants/{id}
pub async fn get_plant(
    state: SharedState,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let plant_id = path.into_inner();
    let state = state.read().await;

    match state.plant(&plant_id) {
        Some(plant) => Ok(HttpResponse::Ok().json(plant)),
        None => Err(AppError::NotFound(format!("Plant {} not found", plant_id))),
    }
}

/// Ingest a sensor reading for a plant
///
/// POST /api/plants/{id}/readings
pub async fn ingest_reading(
    state: SharedState,
    path: web::Path<String>,
    body: web::Json<SensorInput>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let plant_id = path.into_inner();
    let correlation_id = extract_correlation_id(&req);

    info!(
        correlation_id = %correlation_id,
        plant_id = %plant_id,
        "Received sensor data ingestion request"
    );

    validate_sensor_input(&body)?;

    let reading: SensorReading = body.into_inner().into();

    {
        let mut state = state.write().await;
        if !state.has_plant(&plant_id) {
            warn!(plant_id = %plant_id, "Reading for unregistered plant rejected");
            return Err(AppError::NotFound(format!("Plant {} not found", plant_id)));
        }
        state.add_reading(&plant_id, reading.clone());
    }

    info!(
        correlation_id = %correlation_id,
        reading_id = %reading.id,
        "Sensor data ingested successfully"
    );

    Ok(HttpResponse::Created().json(IngestResponse {
        success: true,
        reading_id: reading.id.to_string(),
        correlation_id,
    }))
}

#[derive(Serialize)]
struct IngestResponse {
    success: bool,
    reading_id: String,
    correlation_id: String,
}

/// Record a watering event
///
/// POST /api/plants/{id}/watering
pub async fn record_watering(
    state: SharedState,
    path: web::Path<String>,
    body: web::Json<WateringInput>,
) -> Result<HttpResponse, AppError> {
    let plant_id = path.into_inner();
    validate_watering_input(&body)?;

    let event = WateringEvent::from_input(&plant_id, body.into_inner());

    let mut state = state.write().await;
    if !state.has_plant(&plant_id) {
        return Err(AppError::NotFound(format!("Plant {} not found", plant_id)));
    }
    state.add_watering_event(event.clone());

    Ok(HttpResponse::Created().json(event))
}

/// Watering history, newest first
///
/// GET /api/plants/{id}/watering?start=2024-05-01T00:00:00Z&end=2024-05-31T23:59:59Z
///
/// Without a range the most recent events up to the configured history
/// limit are returned.
pub async fn get_watering_history(
    state: SharedState,
    service: web::Data<PlantCareService>,
    path: web::Path<String>,
    query: web::Query<DateRange>,
) -> Result<HttpResponse, AppError> {
    let plant_id = path.into_inner();
    let range = query.into_inner();
    validate_date_range(&range)?;

    let range = if range.start.is_some() || range.end.is_some() {
        Some(range)
    } else {
        None
    };

    let state = state.read().await;
    if !state.has_plant(&plant_id) {
        return Err(AppError::NotFound(format!("Plant {} not found", plant_id)));
    }

    let events = state.watering_history(
        &plant_id,
        range,
        service.analysis().watering_history_limit,
    );

    Ok(HttpResponse::Ok().json(events))
}

/// Assess a plant's health
///
/// GET /api/plants/{id}/health
pub async fn get_plant_health(
    state: SharedState,
    service: web::Data<PlantCareService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let plant_id = path.into_inner();
    let state = state.read().await;

    let assessment = service.assess_health(&*state, &plant_id)?;

    Ok(HttpResponse::Ok().json(assessment))
}

/// Body for schedule optimization
#[derive(Debug, Deserialize, Serialize)]
pub struct OptimizeRequest {
    pub plant_id: Option<String>,
    pub user_id: Option<String>,
    #[serde(default)]
    pub preferences: Option<SchedulePreferences>,
}

/// Optimize and save a watering schedule
///
/// POST /api/irrigation/optimize
pub async fn optimize_schedule(
    state: SharedState,
    service: web::Data<PlantCareService>,
    body: web::Json<OptimizeRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();
    let preferences = request.preferences.unwrap_or_default();
    validate_preferences(&preferences)?;

    let plant_id = request.plant_id.unwrap_or_default();

    let mut state = state.write().await;
    let schedule = service.optimize_schedule(
        &*state,
        &plant_id,
        request.user_id.as_deref(),
        &preferences,
        Utc::now(),
    )?;

    let record = state.save_schedule(request.user_id, plant_id.trim(), schedule);

    Ok(HttpResponse::Ok().json(record))
}

/// Current schedule for a plant
///
/// GET /api/irrigation/schedules/plant/{plant_id}
pub async fn get_plant_schedule(
    state: SharedState,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let plant_id = path.into_inner();
    let state = state.read().await;

    match state.schedule_for_plant(&plant_id) {
        Some(record) => Ok(HttpResponse::Ok().json(record)),
        None => Err(AppError::NotFound(format!(
            "No schedule for plant {}",
            plant_id
        ))),
    }
}

/// All schedules saved for a user
///
/// GET /api/irrigation/schedules/user/{user_id}
pub async fn get_user_schedules(
    state: SharedState,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    let state = state.read().await;

    let schedules: Vec<&ScheduleRecord> = state.schedules_for_user(&user_id);

    Ok(HttpResponse::Ok().json(schedules))
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ToggleRequest {
    pub enabled: bool,
}

/// PATCH /api/irrigation/schedules/{id}/toggle
pub async fn toggle_schedule(
    state: SharedState,
    path: web::Path<String>,
    body: web::Json<ToggleRequest>,
) -> Result<HttpResponse, AppError> {
    let schedule_id = parse_schedule_id(&path)?;
    let mut state = state.write().await;

    match state.set_schedule_enabled(schedule_id, body.enabled) {
        Some(record) => Ok(HttpResponse::Ok().json(record)),
        None => Err(AppError::NotFound(format!(
            "Schedule {} not found",
            schedule_id
        ))),
    }
}

/// DELETE /api/irrigation/schedules/{id}
pub async fn delete_schedule(
    state: SharedState,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let schedule_id = parse_schedule_id(&path)?;
    let mut state = state.write().await;

    if state.delete_schedule(schedule_id) {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(AppError::NotFound(format!(
            "Schedule {} not found",
            schedule_id
        )))
    }
}

#[derive(Serialize)]
struct ProfileResponse<'a> {
    requested_type: String,
    /// False when the default profile was substituted
    known_type: bool,
    profile: &'a PlantProfile,
    care: CareProfile,
}

/// Threshold and care profile for a plant type
///
/// GET /api/profiles/{type}
pub async fn get_profile(
    service: web::Data<PlantCareService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let requested_type = path.into_inner();
    let catalog = service.catalog();

    Ok(HttpResponse::Ok().json(ProfileResponse {
        known_type: requested_type.parse::<PlantType>().is_ok(),
        profile: catalog.profile(&requested_type),
        care: catalog.care_profile(&requested_type),
        requested_type,
    }))
}

fn parse_schedule_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::BadRequest(format!("Invalid schedule id: {}", raw)))
}

/// Extract or generate correlation ID from request headers
fn extract_correlation_id(req: &HttpRequest) -> String {
    req.headers()
        .get("X-Correlation-ID")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeOfDay;
    use actix_web::{test, App};
    use serde_json::Value;

    fn new_state() -> Arc<RwLock<AppState>> {
        Arc::new(RwLock::new(AppState::new()))
    }

    fn app(
        state: Arc<RwLock<AppState>>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(state))
            .app_data(web::Data::new(PlantCareService::default()))
            .configure(configure_routes)
    }

    async fn seed_plant(state: &Arc<RwLock<AppState>>, id: &str, plant_type: &str) {
        state.write().await.add_plant(PlantRecord {
            id: id.into(),
            name: "Test plant".into(),
            plant_type: plant_type.into(),
            owner_id: Some("user-1".into()),
            created_at: Utc::now(),
        });
    }

    fn sensor_input(soil_moisture: f64, temperature: f64) -> SensorInput {
        SensorInput {
            soil_moisture,
            temperature,
            humidity: 55.0,
            light: 550.0,
            timestamp: None,
        }
    }

    #[actix_web::test]
    async fn test_health_check() {
        let state = new_state();
        seed_plant(&state, "p1", "herb").await;
        let app = test::init_service(app(state)).await;

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["plant_count"], 1);
    }

    #[actix_web::test]
    async fn test_register_and_get_plant() {
        let app = test::init_service(app(new_state())).await;

        let input = PlantInput {
            id: Some("basil-1".into()),
            name: "Basil".into(),
            plant_type: "herb".into(),
            owner_id: Some("user-1".into()),
        };
        let req = test::TestRequest::post()
            .uri("/api/plants")
            .set_json(&input)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);

        // duplicate id
        let req = test::TestRequest::post()
            .uri("/api/plants")
            .set_json(&input)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);

        let req = test::TestRequest::get().uri("/api/plants/basil-1").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["name"], "Basil");

        let req = test::TestRequest::get().uri("/api/plants/missing").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }

    #[actix_web::test]
    async fn test_ingest_valid_data() {
        let state = new_state();
        seed_plant(&state, "p1", "herb").await;
        let app = test::init_service(app(state.clone())).await;

        let req = test::TestRequest::post()
            .uri("/api/plants/p1/readings")
            .insert_header(("X-Correlation-ID", "corr-42"))
            .set_json(&sensor_input(45.0, 22.0))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["correlation_id"], "corr-42");
        assert_eq!(state.read().await.total_readings(), 1);
    }

    #[actix_web::test]
    async fn test_ingest_invalid_data() {
        let state = new_state();
        seed_plant(&state, "p1", "herb").await;
        let app = test::init_service(app(state)).await;

        let req = test::TestRequest::post()
            .uri("/api/plants/p1/readings")
            .set_json(&sensor_input(45.0, 100.0))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn test_ingest_unknown_plant() {
        let app = test::init_service(app(new_state())).await;

        let req = test::TestRequest::post()
            .uri("/api/plants/ghost/readings")
            .set_json(&sensor_input(45.0, 22.0))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }

    #[actix_web::test]
    async fn test_plant_health() {
        let state = new_state();
        seed_plant(&state, "p1", "herb").await;
        let app = test::init_service(app(state.clone())).await;

        // no readings yet
        let req = test::TestRequest::get().uri("/api/plants/p1/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 422);

        state
            .write()
            .await
            .add_reading("p1", SensorReading::new(20.0, 22.0, 55.0, 550.0));

        let req = test::TestRequest::get().uri("/api/plants/p1/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        let score = body["health_score"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&score));
        assert_eq!(body["plant_id"], "p1");
        assert!(body["issues"]
            .as_array()
            .unwrap()
            .iter()
            .any(|i| i == "underwatering"));
    }

    #[actix_web::test]
    async fn test_health_unknown_plant() {
        let app = test::init_service(app(new_state())).await;

        let req = test::TestRequest::get().uri("/api/plants/ghost/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }

    #[actix_web::test]
    async fn test_watering_history() {
        let state = new_state();
        seed_plant(&state, "p1", "herb").await;
        let app = test::init_service(app(state)).await;

        let input = WateringInput {
            duration_minutes: 8.0,
            amount_ml: 250.0,
            automatic: false,
            success: true,
            timestamp: None,
        };
        let req = test::TestRequest::post()
            .uri("/api/plants/p1/watering")
            .set_json(&input)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);

        let req = test::TestRequest::get().uri("/api/plants/p1/watering").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().unwrap().len(), 1);

        let req = test::TestRequest::get()
            .uri("/api/plants/p1/watering?start=2030-01-01T00:00:00Z&end=2020-01-01T00:00:00Z")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn test_optimize_missing_plant_id() {
        let app = test::init_service(app(new_state())).await;

        let req = test::TestRequest::post()
            .uri("/api/irrigation/optimize")
            .set_json(&OptimizeRequest {
                plant_id: None,
                user_id: Some("user-1".into()),
                preferences: None,
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn test_optimize_rejects_invalid_preferences() {
        let state = new_state();
        seed_plant(&state, "p1", "herb").await;
        let app = test::init_service(app(state)).await;

        let req = test::TestRequest::post()
            .uri("/api/irrigation/optimize")
            .set_json(&OptimizeRequest {
                plant_id: Some("p1".into()),
                user_id: None,
                preferences: Some(SchedulePreferences {
                    days: Some(vec![9]),
                    times: None,
                }),
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn test_schedule_lifecycle() {
        let state = new_state();
        seed_plant(&state, "p1", "fern").await;
        let app = test::init_service(app(state)).await;

        let req = test::TestRequest::post()
            .uri("/api/irrigation/optimize")
            .set_json(&OptimizeRequest {
                plant_id: Some("p1".into()),
                user_id: Some("user-1".into()),
                preferences: Some(SchedulePreferences {
                    days: None,
                    times: Some(vec![TimeOfDay::new(7, 30)]),
                }),
            })
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;

        // no readings: default schedule with the preferred time
        assert_eq!(created["frequency"], 3);
        assert_eq!(created["duration"], 10);
        assert_eq!(created["times"][0]["hour"], 7);
        assert_eq!(created["enabled"], true);
        let schedule_id = created["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::get()
            .uri("/api/irrigation/schedules/plant/p1")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["id"], schedule_id.as_str());

        let req = test::TestRequest::get()
            .uri("/api/irrigation/schedules/user/user-1")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().unwrap().len(), 1);

        let req = test::TestRequest::patch()
            .uri(&format!("/api/irrigation/schedules/{}/toggle", schedule_id))
            .set_json(&ToggleRequest { enabled: false })
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["enabled"], false);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/irrigation/schedules/{}", schedule_id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 204);

        let req = test::TestRequest::get()
            .uri("/api/irrigation/schedules/plant/p1")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }

    #[actix_web::test]
    async fn test_toggle_invalid_schedule_id() {
        let app = test::init_service(app(new_state())).await;

        let req = test::TestRequest::patch()
            .uri("/api/irrigation/schedules/not-a-uuid/toggle")
            .set_json(&ToggleRequest { enabled: true })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/irrigation/schedules/{}", Uuid::new_v4()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }

    #[actix_web::test]
    async fn test_profile_lookup() {
        let app = test::init_service(app(new_state())).await;

        let req = test::TestRequest::get().uri("/api/profiles/Succulent").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["known_type"], true);
        assert_eq!(body["care"]["water_needs"], "low");

        let req = test::TestRequest::get().uri("/api/profiles/orchid").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["known_type"], false);
        assert_eq!(body["profile"]["plant_type"], "default");
    }
}
