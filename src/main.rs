//! Plant care backend
//!
//! Serves plant health assessments and irrigation schedules over HTTP.

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use plantcare::config::Settings;
use plantcare::handlers;
use plantcare::profiles::ProfileCatalog;
use plantcare::service::PlantCareService;
use plantcare::simulator::SensorSimulator;
use plantcare::state::AppState;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenv::dotenv().ok();

    // Logging
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,plantcare=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().json())
        .init();

    // Load configuration
    let settings = Settings::from_env().context("Failed to load configuration")?;
    let bind_address = format!("{}:{}", settings.server.host, settings.server.port);

    info!("Starting plant care backend");
    info!("Binding server to {}", bind_address);

    // Shared application state
    let app_state = Arc::new(RwLock::new(AppState::with_limits(
        settings.store.max_readings_per_plant,
        settings.store.max_watering_events_per_plant,
    )));
    let service = web::Data::new(PlantCareService::new(
        ProfileCatalog::builtin(),
        settings.analysis.clone(),
    ));

    // Demo readings; must run on the actix runtime
    if settings.simulator.enabled {
        let simulator = SensorSimulator::new(settings.simulator.interval_ms)
            .context("Failed to initialize sensor simulator")?;
        let simulator_state = app_state.clone();

        actix_rt::spawn(async move {
            simulator.run(simulator_state).await;
        });
    }

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(service.clone())
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(handlers::configure_routes)
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run()
    .await?;

    Ok(())
}
