//! Location repository (locations table)

use super::types::{CreateLocationRequest, Location};
use crate::error::Result;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

/// Location persistence and lookups
#[derive(Clone)]
pub struct LocationRepository {
    pool: MySqlPool,
}

impl LocationRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Create a new location
    pub async fn insert(&self, req: CreateLocationRequest) -> Result<Location> {
        req.validate()?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO locations
                (id, name, description, area_type, capacity, latitude, longitude,
                 created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&req.name)
        .bind(&req.description)
        .bind(&req.area_type)
        .bind(req.capacity)
        .bind(req.latitude)
        .bind(req.longitude)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        tracing::info!(
            location_id = %id,
            name = %req.name,
            capacity = ?req.capacity,
            "Location created"
        );

        Ok(Location {
            id,
            name: req.name,
            description: req.description,
            area_type: req.area_type,
            capacity: req.capacity,
            latitude: req.latitude,
            longitude: req.longitude,
            created_at: now,
            updated_at: now,
        })
    }

    /// List all locations, ordered by name
    pub async fn list(&self) -> Result<Vec<Location>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, area_type, capacity, latitude, longitude,
                   created_at, updated_at
            FROM locations
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_location).collect()
    }

    /// Get a location by id
    pub async fn get(&self, id: &str) -> Result<Option<Location>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, description, area_type, capacity, latitude, longitude,
                   created_at, updated_at
            FROM locations
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_location).transpose()
    }

    /// Sum of capacity over all locations, each counted once
    pub async fn total_capacity(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COALESCE(SUM(capacity), 0) AS total FROM locations")
            .fetch_one(&self.pool)
            .await?;

        let total: i64 = row.try_get("total")?;
        Ok(total)
    }
}

fn row_to_location(row: MySqlRow) -> Result<Location> {
    let created_at: chrono::NaiveDateTime = row.try_get("created_at")?;
    let updated_at: chrono::NaiveDateTime = row.try_get("updated_at")?;

    Ok(Location {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        area_type: row.try_get("area_type")?,
        capacity: row.try_get("capacity")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        created_at: DateTime::from_naive_utc_and_offset(created_at, Utc),
        updated_at: DateTime::from_naive_utc_and_offset(updated_at, Utc),
    })
}
