//! Alert repository (alerts table)

use super::types::{Alert, AlertQuery, AlertStatus, Severity, TriggerSource};
use crate::error::Result;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

/// Alert persistence and incident lookups
#[derive(Clone)]
pub struct AlertRepository {
    pool: MySqlPool,
}

impl AlertRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Plain insert (manual alerts)
    pub async fn insert(&self, alert: &Alert) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO alerts
                (id, title, description, severity, location_id, camera_id,
                 trigger_source, crowd_count, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&alert.id)
        .bind(&alert.title)
        .bind(&alert.description)
        .bind(alert.severity.to_string())
        .bind(&alert.location_id)
        .bind(&alert.camera_id)
        .bind(alert.trigger_source.to_string())
        .bind(alert.crowd_count)
        .bind(alert.status.to_string())
        .bind(alert.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Conditional insert: open a crowd-density incident only if the
    /// location has no active one
    ///
    /// Returns false when suppressed. The alerts table also carries a unique
    /// index over (location, crowd_density, active); if a concurrent insert
    /// slips past the NOT EXISTS check, the index rejects it and that too
    /// reports as suppressed.
    pub async fn insert_if_no_active(&self, alert: &Alert) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO alerts
                (id, title, description, severity, location_id, camera_id,
                 trigger_source, crowd_count, status, created_at)
            SELECT ?, ?, ?, ?, ?, ?, 'crowd_density', ?, 'active', ?
            FROM DUAL
            WHERE NOT EXISTS (
                SELECT 1 FROM alerts
                WHERE location_id = ?
                  AND trigger_source = 'crowd_density'
                  AND status = 'active'
            )
            "#,
        )
        .bind(&alert.id)
        .bind(&alert.title)
        .bind(&alert.description)
        .bind(alert.severity.to_string())
        .bind(&alert.location_id)
        .bind(&alert.camera_id)
        .bind(alert.crowd_count)
        .bind(alert.created_at)
        .bind(&alert.location_id)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(done.rows_affected() > 0),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Find the live crowd-density incident for a location, if any
    pub async fn find_active_crowd(&self, location_id: &str) -> Result<Option<Alert>> {
        let row = sqlx::query(
            r#"
            SELECT a.id, a.title, a.description, a.severity, a.location_id,
                   a.camera_id, a.trigger_source, a.crowd_count, a.status,
                   a.created_at, a.resolved_at, CAST(NULL AS CHAR) AS location_name
            FROM alerts a
            WHERE a.location_id = ?
              AND a.trigger_source = 'crowd_density'
              AND a.status = 'active'
            LIMIT 1
            "#,
        )
        .bind(location_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_alert).transpose()
    }

    /// Get an alert by id
    pub async fn get(&self, id: &str) -> Result<Option<Alert>> {
        let row = sqlx::query(
            r#"
            SELECT a.id, a.title, a.description, a.severity, a.location_id,
                   a.camera_id, a.trigger_source, a.crowd_count, a.status,
                   a.created_at, a.resolved_at, l.name AS location_name
            FROM alerts a
            LEFT JOIN locations l ON a.location_id = l.id
            WHERE a.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_alert).transpose()
    }

    /// List alerts, newest first, optionally filtered by status/severity
    pub async fn list(&self, query: AlertQuery) -> Result<Vec<Alert>> {
        let limit = query.limit.unwrap_or(50);

        let mut sql = String::from(
            r#"
            SELECT a.id, a.title, a.description, a.severity, a.location_id,
                   a.camera_id, a.trigger_source, a.crowd_count, a.status,
                   a.created_at, a.resolved_at, l.name AS location_name
            FROM alerts a
            LEFT JOIN locations l ON a.location_id = l.id
            WHERE 1 = 1
            "#,
        );
        if query.status.is_some() {
            sql.push_str(" AND a.status = ?");
        }
        if query.severity.is_some() {
            sql.push_str(" AND a.severity = ?");
        }
        sql.push_str(" ORDER BY a.created_at DESC LIMIT ?");

        let mut q = sqlx::query(&sql);
        if let Some(status) = query.status {
            q = q.bind(status.to_string());
        }
        if let Some(severity) = query.severity {
            q = q.bind(severity.to_string());
        }
        let rows = q.bind(limit).fetch_all(&self.pool).await?;

        rows.into_iter().map(row_to_alert).collect()
    }

    /// Persist a status change; resolved_at is stamped by the caller
    pub async fn update_status(
        &self,
        id: &str,
        status: AlertStatus,
        resolved_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE alerts
            SET status = ?,
                resolved_at = COALESCE(?, resolved_at)
            WHERE id = ?
            "#,
        )
        .bind(status.to_string())
        .bind(resolved_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Count alerts currently active
    pub async fn count_active(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM alerts WHERE status = 'active'")
            .fetch_one(&self.pool)
            .await?;

        let n: i64 = row.try_get("n")?;
        Ok(n)
    }
}

fn row_to_alert(row: MySqlRow) -> Result<Alert> {
    let severity: String = row.try_get("severity")?;
    let trigger_source: String = row.try_get("trigger_source")?;
    let status: String = row.try_get("status")?;

    let created_at: chrono::NaiveDateTime = row.try_get("created_at")?;
    let resolved_at: Option<chrono::NaiveDateTime> = row.try_get("resolved_at")?;

    Ok(Alert {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        severity: Severity::from(severity.as_str()),
        location_id: row.try_get("location_id")?,
        camera_id: row.try_get("camera_id")?,
        trigger_source: TriggerSource::from(trigger_source.as_str()),
        crowd_count: row.try_get("crowd_count")?,
        status: AlertStatus::from(status.as_str()),
        created_at: DateTime::from_naive_utc_and_offset(created_at, Utc),
        resolved_at: resolved_at.map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc)),
        location_name: row.try_get("location_name")?,
    })
}
