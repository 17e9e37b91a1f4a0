//! Camera repository (cameras table)

use super::types::{
    status_transition, Camera, CameraStatus, CameraStatusEvent, CreateCameraRequest,
    UpdateCameraRequest,
};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

/// Camera persistence and status tracking
#[derive(Clone)]
pub struct CameraRepository {
    pool: MySqlPool,
}

impl CameraRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Create a new camera; status starts offline until first contact
    pub async fn insert(&self, req: CreateCameraRequest) -> Result<Camera> {
        req.validate()?;

        let camera_id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO cameras
                (camera_id, name, camera_type, status, stream_url, location_id,
                 latitude, longitude, created_at, updated_at)
            VALUES (?, ?, ?, 'offline', ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&camera_id)
        .bind(&req.name)
        .bind(&req.camera_type)
        .bind(&req.stream_url)
        .bind(&req.location_id)
        .bind(req.latitude)
        .bind(req.longitude)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        tracing::info!(
            camera_id = %camera_id,
            name = %req.name,
            camera_type = %req.camera_type,
            "Camera created"
        );

        Ok(Camera {
            camera_id,
            name: req.name,
            camera_type: req.camera_type,
            status: CameraStatus::Offline.to_string(),
            stream_url: req.stream_url,
            location_id: req.location_id,
            location_name: None,
            latitude: req.latitude,
            longitude: req.longitude,
            created_at: now,
            updated_at: now,
        })
    }

    /// List all cameras with their joined location name, newest first
    pub async fn list(&self) -> Result<Vec<Camera>> {
        let rows = sqlx::query(
            r#"
            SELECT c.camera_id, c.name, c.camera_type, c.status, c.stream_url,
                   c.location_id, l.name AS location_name,
                   c.latitude, c.longitude, c.created_at, c.updated_at
            FROM cameras c
            LEFT JOIN locations l ON c.location_id = l.id
            ORDER BY c.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_camera).collect()
    }

    /// Get a camera by id
    pub async fn get(&self, camera_id: &str) -> Result<Option<Camera>> {
        let row = sqlx::query(
            r#"
            SELECT c.camera_id, c.name, c.camera_type, c.status, c.stream_url,
                   c.location_id, l.name AS location_name,
                   c.latitude, c.longitude, c.created_at, c.updated_at
            FROM cameras c
            LEFT JOIN locations l ON c.location_id = l.id
            WHERE c.camera_id = ?
            "#,
        )
        .bind(camera_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_camera).transpose()
    }

    /// Apply a partial update; logs status transitions (lost/recovered)
    pub async fn update(&self, camera_id: &str, req: UpdateCameraRequest) -> Result<Camera> {
        let current = self
            .get(camera_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("camera {}", camera_id)))?;

        let prev_status = CameraStatus::from(current.status.as_str());
        let next_status = req.status.unwrap_or(prev_status);

        sqlx::query(
            r#"
            UPDATE cameras
            SET status = ?,
                stream_url = COALESCE(?, stream_url),
                latitude = COALESCE(?, latitude),
                longitude = COALESCE(?, longitude),
                updated_at = ?
            WHERE camera_id = ?
            "#,
        )
        .bind(next_status.to_string())
        .bind(&req.stream_url)
        .bind(req.latitude)
        .bind(req.longitude)
        .bind(Utc::now())
        .bind(camera_id)
        .execute(&self.pool)
        .await?;

        match status_transition(prev_status, next_status) {
            Some(CameraStatusEvent::Lost) => {
                tracing::warn!(camera_id = %camera_id, "Camera connection lost");
            }
            Some(CameraStatusEvent::Recovered) => {
                tracing::info!(camera_id = %camera_id, "Camera connection recovered");
            }
            None => {}
        }

        self.get(camera_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("camera {}", camera_id)))
    }

    /// Count cameras currently online
    pub async fn count_online(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM cameras WHERE status = 'online'")
            .fetch_one(&self.pool)
            .await?;

        let n: i64 = row.try_get("n")?;
        Ok(n)
    }
}

fn row_to_camera(row: MySqlRow) -> Result<Camera> {
    let created_at: chrono::NaiveDateTime = row.try_get("created_at")?;
    let updated_at: chrono::NaiveDateTime = row.try_get("updated_at")?;

    Ok(Camera {
        camera_id: row.try_get("camera_id")?,
        name: row.try_get("name")?,
        camera_type: row.try_get("camera_type")?,
        status: row.try_get("status")?,
        stream_url: row.try_get("stream_url")?,
        location_id: row.try_get("location_id")?,
        location_name: row.try_get("location_name")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        created_at: DateTime::from_naive_utc_and_offset(created_at, Utc),
        updated_at: DateTime::from_naive_utc_and_offset(updated_at, Utc),
    })
}
