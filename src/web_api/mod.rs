//! WebAPI - REST API Endpoints
//!
//! ## Responsibilities
//!
//! - HTTP API routes
//! - Request validation
//! - Response formatting

mod routes;

pub use routes::create_router;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::models::HealthResponse;
use crate::state::AppState;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_connected = sqlx::query("SELECT 1")
        .execute(&state.pool)
        .await
        .is_ok();

    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_sec: state.started_at.elapsed().as_secs(),
        db_connected,
    };

    Json(response)
}

/// System health endpoint (CPU/memory/overload)
pub async fn system_status(State(state): State<AppState>) -> impl IntoResponse {
    let health = state.system_health.read().await.clone();

    Json(json!({
        "cpu_percent": health.cpu_percent,
        "memory_percent": health.memory_percent,
        "overloaded": health.overloaded,
        "last_overload_at": health.last_overload_at,
    }))
}
