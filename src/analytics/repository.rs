//! Analytics window queries (crowd_readings joined to locations)

use super::types::ReadingSample;
use crate::error::Result;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

/// Read-only window fetches for the analytics aggregator
#[derive(Clone)]
pub struct AnalyticsRepository {
    pool: MySqlPool,
}

impl AnalyticsRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Fetch all readings since `since`, newest first, with joined location
    pub async fn fetch_window(
        &self,
        since: DateTime<Utc>,
        location_id: Option<&str>,
    ) -> Result<Vec<ReadingSample>> {
        let rows = if let Some(location_id) = location_id {
            sqlx::query(
                r#"
                SELECT r.person_count, r.timestamp, r.location_id,
                       l.name AS location_name, l.capacity
                FROM crowd_readings r
                LEFT JOIN locations l ON r.location_id = l.id
                WHERE r.timestamp >= ? AND r.location_id = ?
                ORDER BY r.timestamp DESC
                "#,
            )
            .bind(since)
            .bind(location_id)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query(
                r#"
                SELECT r.person_count, r.timestamp, r.location_id,
                       l.name AS location_name, l.capacity
                FROM crowd_readings r
                LEFT JOIN locations l ON r.location_id = l.id
                WHERE r.timestamp >= ?
                ORDER BY r.timestamp DESC
                "#,
            )
            .bind(since)
            .fetch_all(&self.pool)
            .await?
        };

        rows.into_iter().map(row_to_sample).collect()
    }
}

fn row_to_sample(row: MySqlRow) -> Result<ReadingSample> {
    let timestamp: chrono::NaiveDateTime = row.try_get("timestamp")?;

    Ok(ReadingSample {
        person_count: row.try_get("person_count")?,
        timestamp: DateTime::from_naive_utc_and_offset(timestamp, Utc),
        location_id: row.try_get("location_id")?,
        location_name: row.try_get("location_name")?,
        capacity: row.try_get("capacity")?,
    })
}
