//! Crowdwatch Server
//!
//! Main entry point for the crowd monitoring application.

use crowdwatch::{
    alerting::{AlertRepository, AlertingEngine},
    analytics::{AnalyticsRepository, AnalyticsService},
    camera_registry::CameraRepository,
    dashboard::DashboardService,
    heat_map::HeatMapService,
    ingest::{IngestService, ReadingRepository},
    location_registry::LocationRepository,
    state::{AppConfig, AppState, SystemHealth},
    web_api,
};
use sqlx::mysql::MySqlPoolOptions;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crowdwatch=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Crowdwatch Server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = AppConfig::default();
    tracing::info!(
        database_url = %config.database_url,
        host = %config.host,
        port = config.port,
        bucket_tz = %config.bucket_tz,
        analytics_group_by_id = config.analytics_group_by_id,
        "Configuration loaded"
    );

    // Create database pool
    let pool = MySqlPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&config.database_url)
        .await?;

    tracing::info!("Database connected");

    // Initialize system health
    let system_health = Arc::new(RwLock::new(SystemHealth::default()));

    // Initialize repositories
    let locations = LocationRepository::new(pool.clone());
    let cameras = CameraRepository::new(pool.clone());
    let readings = ReadingRepository::new(pool.clone());
    let alerts = AlertRepository::new(pool.clone());

    // Alerting engine (capacity thresholds + incident dedup)
    let alerting = Arc::new(AlertingEngine::new(locations.clone(), alerts.clone()));
    tracing::info!("AlertingEngine initialized");

    // Ingestion validator, wired to the engine
    let ingest = Arc::new(IngestService::new(readings.clone(), alerting.clone()));
    tracing::info!("IngestService initialized");

    // Aggregators
    let analytics = AnalyticsService::new(
        AnalyticsRepository::new(pool.clone()),
        config.bucket_tz,
        config.analytics_group_by_id,
    );
    let heat_map = HeatMapService::new(pool.clone());
    let dashboard = DashboardService::new(
        cameras.clone(),
        readings.clone(),
        alerts.clone(),
        locations.clone(),
    );
    tracing::info!("Aggregators initialized (AnalyticsService, HeatMapService, DashboardService)");

    // Create application state
    let state = AppState {
        pool,
        config,
        locations,
        cameras,
        readings,
        ingest,
        alerting,
        analytics,
        heat_map,
        dashboard,
        system_health,
        started_at: Instant::now(),
    };

    let app = web_api::create_router(state.clone())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start system health monitoring
    let health_monitor = state.system_health.clone();
    tokio::spawn(async move {
        use sysinfo::System;
        let mut sys = System::new_all();
        let mut interval = tokio::time::interval(Duration::from_secs(30));

        loop {
            interval.tick().await;
            sys.refresh_all();

            let cpu = {
                let cpus = sys.cpus();
                if cpus.is_empty() {
                    0.0
                } else {
                    cpus.iter().map(|c| c.cpu_usage()).sum::<f32>() / cpus.len() as f32
                }
            };
            let memory = if sys.total_memory() > 0 {
                (sys.used_memory() as f32 / sys.total_memory() as f32) * 100.0
            } else {
                0.0
            };

            let mut health = health_monitor.write().await;
            health.update(cpu, memory);
        }
    });

    // Start server
    let addr = format!("{}:{}", state.config.host, state.config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
