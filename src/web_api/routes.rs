//! API Routes

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::alerting::{
    AlertQuery, AlertStatus, CreateAlertRequest, Severity, UpdateAlertStatusRequest,
};
use crate::camera_registry::{CreateCameraRequest, UpdateCameraRequest};
use crate::error::{Error, Result};
use crate::ingest::{NewReading, ReadingQuery};
use crate::location_registry::CreateLocationRequest;
use crate::models::ApiResponse;
use crate::state::AppState;

/// Create API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health & Status
        .route("/healthz", get(super::health_check))
        .route("/api/system/status", get(super::system_status))
        // Readings (ingestion + window queries)
        .route("/api/readings", get(list_readings).post(ingest_reading))
        .route("/api/readings/analytics", get(get_analytics))
        // Heat map
        .route("/api/heat-map", get(get_heat_map))
        // Dashboard
        .route("/api/dashboard/stats", get(get_dashboard_stats))
        // Alerts
        .route("/api/alerts", get(list_alerts).post(create_alert))
        .route("/api/alerts/:id", get(get_alert).patch(update_alert_status))
        // Locations
        .route("/api/locations", get(list_locations).post(create_location))
        .route("/api/locations/:id", get(get_location))
        // Cameras
        .route("/api/cameras", get(list_cameras).post(create_camera))
        .route("/api/cameras/:id", get(get_camera).patch(update_camera))
        .with_state(state)
}

// ========================================
// Reading Handlers
// ========================================

#[derive(Debug, Deserialize)]
struct ReadingListParams {
    camera_id: Option<String>,
    location_id: Option<String>,
    hours: Option<i64>,
    limit: Option<u32>,
}

async fn list_readings(
    State(state): State<AppState>,
    Query(params): Query<ReadingListParams>,
) -> Result<impl IntoResponse> {
    let readings = state
        .readings
        .list(ReadingQuery {
            camera_id: params.camera_id,
            location_id: params.location_id,
            hours: params.hours,
            limit: params.limit,
        })
        .await?;

    let count = readings.len();
    Ok(Json(json!({
        "data": readings,
        "count": count
    })))
}

async fn ingest_reading(
    State(state): State<AppState>,
    Json(payload): Json<NewReading>,
) -> Result<impl IntoResponse> {
    let reading = state.ingest.ingest(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(reading))))
}

// ========================================
// Aggregate Handlers
// ========================================

#[derive(Debug, Deserialize)]
struct AnalyticsParams {
    location_id: Option<String>,
    hours: Option<i64>,
}

async fn get_analytics(
    State(state): State<AppState>,
    Query(params): Query<AnalyticsParams>,
) -> Result<impl IntoResponse> {
    let summary = state
        .analytics
        .summarize(params.location_id.as_deref(), params.hours.unwrap_or(24))
        .await?;

    Ok(Json(json!({ "analytics": summary })))
}

#[derive(Debug, Deserialize)]
struct HeatMapParams {
    hours: Option<i64>,
}

async fn get_heat_map(
    State(state): State<AppState>,
    Query(params): Query<HeatMapParams>,
) -> Result<impl IntoResponse> {
    let response = state.heat_map.heatmap(params.hours.unwrap_or(1)).await?;
    Ok(Json(response))
}

async fn get_dashboard_stats(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let stats = state.dashboard.snapshot().await?;
    Ok(Json(json!({ "stats": stats })))
}

// ========================================
// Alert Handlers
// ========================================

#[derive(Debug, Deserialize)]
struct AlertListParams {
    status: Option<String>,
    severity: Option<String>,
    limit: Option<u32>,
}

async fn list_alerts(
    State(state): State<AppState>,
    Query(params): Query<AlertListParams>,
) -> Result<impl IntoResponse> {
    let alerts = state
        .alerting
        .list(AlertQuery {
            status: params.status.as_deref().map(AlertStatus::from),
            severity: params.severity.as_deref().map(Severity::from),
            limit: params.limit,
        })
        .await?;

    let count = alerts.len();
    Ok(Json(json!({
        "data": alerts,
        "count": count
    })))
}

async fn create_alert(
    State(state): State<AppState>,
    Json(req): Json<CreateAlertRequest>,
) -> Result<impl IntoResponse> {
    let alert = state.alerting.create_manual(req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(alert))))
}

async fn get_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let alert = state
        .alerting
        .get(&id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("alert {}", id)))?;

    Ok(Json(ApiResponse::success(alert)))
}

async fn update_alert_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateAlertStatusRequest>,
) -> Result<impl IntoResponse> {
    let alert = state.alerting.update_status(&id, req.status).await?;
    Ok(Json(ApiResponse::success(alert)))
}

// ========================================
// Location Handlers
// ========================================

async fn list_locations(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let locations = state.locations.list().await?;
    let count = locations.len();
    Ok(Json(json!({
        "data": locations,
        "count": count
    })))
}

async fn create_location(
    State(state): State<AppState>,
    Json(req): Json<CreateLocationRequest>,
) -> Result<impl IntoResponse> {
    let location = state.locations.insert(req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(location))))
}

async fn get_location(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let location = state
        .locations
        .get(&id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("location {}", id)))?;

    Ok(Json(ApiResponse::success(location)))
}

// ========================================
// Camera Handlers
// ========================================

async fn list_cameras(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let cameras = state.cameras.list().await?;
    let count = cameras.len();
    Ok(Json(json!({
        "data": cameras,
        "count": count
    })))
}

async fn create_camera(
    State(state): State<AppState>,
    Json(req): Json<CreateCameraRequest>,
) -> Result<impl IntoResponse> {
    let camera = state.cameras.insert(req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(camera))))
}

async fn get_camera(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let camera = state
        .cameras
        .get(&id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("camera {}", id)))?;

    Ok(Json(ApiResponse::success(camera)))
}

async fn update_camera(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCameraRequest>,
) -> Result<impl IntoResponse> {
    let camera = state.cameras.update(&id, req).await?;
    Ok(Json(ApiResponse::success(camera)))
}
