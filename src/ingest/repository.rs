//! Reading repository (crowd_readings table)

use super::types::{Reading, ValidatedReading};
use crate::error::Result;
use chrono::{DateTime, Duration, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

/// Query parameters for listing readings
#[derive(Debug, Clone, Default)]
pub struct ReadingQuery {
    pub camera_id: Option<String>,
    pub location_id: Option<String>,
    /// Trailing window in hours (default 24)
    pub hours: Option<i64>,
    /// Row cap (default 100)
    pub limit: Option<u32>,
}

/// Reading persistence and window queries
#[derive(Clone)]
pub struct ReadingRepository {
    pool: MySqlPool,
}

impl ReadingRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Persist a validated reading, assigning id and server timestamp
    pub async fn insert(&self, reading: ValidatedReading) -> Result<Reading> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let metadata_json = reading.metadata.to_string();

        sqlx::query(
            r#"
            INSERT INTO crowd_readings
                (id, camera_id, location_id, person_count, confidence_score,
                 metadata, timestamp, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&reading.camera_id)
        .bind(&reading.location_id)
        .bind(reading.person_count)
        .bind(reading.confidence_score)
        .bind(&metadata_json)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Reading {
            id,
            camera_id: reading.camera_id,
            location_id: reading.location_id,
            person_count: reading.person_count,
            confidence_score: reading.confidence_score,
            timestamp: now,
            metadata: reading.metadata,
            created_at: now,
            camera_name: None,
            location_name: None,
        })
    }

    /// List readings in a trailing window, newest first, with joined names
    pub async fn list(&self, query: ReadingQuery) -> Result<Vec<Reading>> {
        let hours = query.hours.unwrap_or(24).max(1);
        let limit = query.limit.unwrap_or(100);
        let since = Utc::now() - Duration::hours(hours);

        let mut sql = String::from(
            r#"
            SELECT r.id, r.camera_id, r.location_id, r.person_count,
                   r.confidence_score, r.metadata, r.timestamp, r.created_at,
                   c.name AS camera_name, l.name AS location_name
            FROM crowd_readings r
            LEFT JOIN cameras c ON r.camera_id = c.camera_id
            LEFT JOIN locations l ON r.location_id = l.id
            WHERE r.timestamp >= ?
            "#,
        );
        if query.camera_id.is_some() {
            sql.push_str(" AND r.camera_id = ?");
        }
        if query.location_id.is_some() {
            sql.push_str(" AND r.location_id = ?");
        }
        sql.push_str(" ORDER BY r.timestamp DESC LIMIT ?");

        let mut q = sqlx::query(&sql).bind(since);
        if let Some(camera_id) = &query.camera_id {
            q = q.bind(camera_id);
        }
        if let Some(location_id) = &query.location_id {
            q = q.bind(location_id);
        }
        let rows = q.bind(limit).fetch_all(&self.pool).await?;

        rows.into_iter().map(row_to_reading).collect()
    }

    /// Person counts from the last `minutes`, newest first, capped at `limit`
    pub async fn recent_counts(&self, minutes: i64, limit: u32) -> Result<Vec<i64>> {
        let since = Utc::now() - Duration::minutes(minutes);

        let rows = sqlx::query(
            r#"
            SELECT person_count
            FROM crowd_readings
            WHERE timestamp >= ?
            ORDER BY timestamp DESC
            LIMIT ?
            "#,
        )
        .bind(since)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| row.try_get("person_count").map_err(Into::into))
            .collect()
    }
}

fn row_to_reading(row: MySqlRow) -> Result<Reading> {
    let metadata_str: String = row.try_get("metadata")?;
    let metadata: serde_json::Value = serde_json::from_str(&metadata_str)?;

    let timestamp: chrono::NaiveDateTime = row.try_get("timestamp")?;
    let created_at: chrono::NaiveDateTime = row.try_get("created_at")?;

    Ok(Reading {
        id: row.try_get("id")?,
        camera_id: row.try_get("camera_id")?,
        location_id: row.try_get("location_id")?,
        person_count: row.try_get("person_count")?,
        confidence_score: row.try_get("confidence_score")?,
        timestamp: DateTime::from_naive_utc_and_offset(timestamp, Utc),
        metadata,
        created_at: DateTime::from_naive_utc_and_offset(created_at, Utc),
        camera_name: row.try_get("camera_name")?,
        location_name: row.try_get("location_name")?,
    })
}
