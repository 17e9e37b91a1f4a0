//! Alerting - Capacity-threshold alert engine
//!
//! ## Responsibilities
//!
//! - Map a reading's capacity percentage to a severity
//! - Open at most one live crowd-density incident per location
//! - Explicit alert status transitions (investigate/resolve/dismiss)
//! - Manual alert creation and listing
//!
//! The engine is level-triggered: every qualifying reading is evaluated, and
//! suppressed while an active incident for the location exists. Resolving or
//! dismissing the incident re-arms the location; the next qualifying reading
//! opens a fresh alert.
//!
//! The check-then-insert sequence is guarded twice: a per-location mutex
//! serializes evaluation inside this process, and the insert itself is
//! conditional on no active incident existing, so several engine instances
//! sharing one store still observe the single-live-incident invariant.

mod repository;
mod types;

pub use repository::AlertRepository;
pub use types::{
    Alert, AlertQuery, AlertStatus, CreateAlertRequest, Severity, TriggerSource,
    UpdateAlertStatusRequest, ValidatedAlertRequest,
};

use crate::error::{Error, Result};
use crate::location_registry::LocationRepository;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// Map a capacity percentage to a severity, highest threshold first
///
/// Below 60% no alert is raised; the density mapping never yields `low`.
pub fn classify_severity(person_count: i64, capacity: i64) -> Option<Severity> {
    if capacity <= 0 {
        return None;
    }
    let pct = capacity_percentage(person_count, capacity);
    if pct >= 90.0 {
        Some(Severity::Critical)
    } else if pct >= 75.0 {
        Some(Severity::High)
    } else if pct >= 60.0 {
        Some(Severity::Medium)
    } else {
        None
    }
}

/// `100 * person_count / capacity`; caller must ensure capacity > 0
pub fn capacity_percentage(person_count: i64, capacity: i64) -> f64 {
    person_count as f64 / capacity as f64 * 100.0
}

/// Threshold alerting engine
pub struct AlertingEngine {
    locations: LocationRepository,
    alerts: AlertRepository,
    /// Per-location evaluation locks
    locks: RwLock<HashMap<String, Arc<Mutex<()>>>>,
}

impl AlertingEngine {
    pub fn new(locations: LocationRepository, alerts: AlertRepository) -> Self {
        Self {
            locations,
            alerts,
            locks: RwLock::new(HashMap::new()),
        }
    }

    /// Evaluate a reading against its location's capacity thresholds
    ///
    /// Returns the newly opened alert, or None when the location has no
    /// usable capacity, the reading is below threshold, or a live incident
    /// already exists for the location.
    pub async fn evaluate(
        &self,
        location_id: &str,
        camera_id: &str,
        person_count: i64,
    ) -> Result<Option<Alert>> {
        let Some(location) = self.locations.get(location_id).await? else {
            return Ok(None);
        };
        let capacity = match location.capacity {
            Some(c) if c > 0 => c,
            _ => return Ok(None),
        };
        let Some(severity) = classify_severity(person_count, capacity) else {
            return Ok(None);
        };

        // Serialize check-then-insert for this location within the process
        let lock = self.location_lock(location_id).await;
        let _guard = lock.lock().await;

        if self.alerts.find_active_crowd(location_id).await?.is_some() {
            tracing::debug!(
                location_id = %location_id,
                person_count = person_count,
                "Active crowd alert exists; suppressing"
            );
            return Ok(None);
        }

        let pct = capacity_percentage(person_count, capacity);
        let alert = Alert {
            id: Uuid::new_v4().to_string(),
            title: format!("High Crowd Density at {}", location.name),
            description: format!(
                "Crowd capacity at {}% ({}/{} people)",
                pct.round() as i64,
                person_count,
                capacity
            ),
            severity,
            location_id: location_id.to_string(),
            camera_id: Some(camera_id.to_string()),
            trigger_source: TriggerSource::CrowdDensity,
            crowd_count: Some(person_count),
            status: AlertStatus::Active,
            created_at: Utc::now(),
            resolved_at: None,
            location_name: None,
        };

        // Conditional insert; a concurrent engine instance may still win
        if !self.alerts.insert_if_no_active(&alert).await? {
            tracing::debug!(
                location_id = %location_id,
                "Concurrent incident insert won; suppressing"
            );
            return Ok(None);
        }

        tracing::info!(
            alert_id = %alert.id,
            location_id = %location_id,
            camera_id = %camera_id,
            severity = %alert.severity,
            person_count = person_count,
            capacity = capacity,
            "Crowd density alert created"
        );

        Ok(Some(alert))
    }

    /// Create a manually raised alert
    pub async fn create_manual(&self, req: CreateAlertRequest) -> Result<Alert> {
        let v = req.validate()?;

        if self.locations.get(&v.location_id).await?.is_none() {
            return Err(Error::NotFound(format!("location {}", v.location_id)));
        }

        let alert = Alert {
            id: Uuid::new_v4().to_string(),
            title: v.title,
            description: v.description,
            severity: v.severity,
            location_id: v.location_id,
            camera_id: v.camera_id,
            trigger_source: TriggerSource::Manual,
            crowd_count: v.crowd_count,
            status: AlertStatus::Active,
            created_at: Utc::now(),
            resolved_at: None,
            location_name: None,
        };

        self.alerts.insert(&alert).await?;

        tracing::info!(
            alert_id = %alert.id,
            location_id = %alert.location_id,
            severity = %alert.severity,
            "Manual alert created"
        );

        Ok(alert)
    }

    /// Apply an explicit status transition
    ///
    /// `resolved` stamps resolved_at. Transitions not in the lifecycle table
    /// fail with InvalidTransition and leave the alert unchanged.
    pub async fn update_status(&self, alert_id: &str, next: AlertStatus) -> Result<Alert> {
        let alert = self
            .alerts
            .get(alert_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("alert {}", alert_id)))?;

        if !alert.status.can_transition_to(next) {
            return Err(Error::InvalidTransition(format!(
                "alert {} cannot move {} -> {}",
                alert_id, alert.status, next
            )));
        }

        let resolved_at = (next == AlertStatus::Resolved).then(Utc::now);
        self.alerts.update_status(alert_id, next, resolved_at).await?;

        tracing::info!(
            alert_id = %alert_id,
            from = %alert.status,
            to = %next,
            "Alert status updated"
        );

        self.alerts
            .get(alert_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("alert {}", alert_id)))
    }

    /// List alerts, newest first, optionally filtered by status/severity
    pub async fn list(&self, query: AlertQuery) -> Result<Vec<Alert>> {
        self.alerts.list(query).await
    }

    /// Get a single alert
    pub async fn get(&self, alert_id: &str) -> Result<Option<Alert>> {
        self.alerts.get(alert_id).await
    }

    /// Get the lock for a location (created on first use)
    async fn location_lock(&self, location_id: &str) -> Arc<Mutex<()>> {
        {
            let locks = self.locks.read().await;
            if let Some(lock) = locks.get(location_id) {
                return lock.clone();
            }
        }

        let mut locks = self.locks.write().await;
        locks
            .entry(location_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_below_sixty_percent_is_silent() {
        assert!(classify_severity(0, 1000).is_none());
        assert!(classify_severity(599, 1000).is_none());
    }

    #[test]
    fn test_medium_band() {
        assert_eq!(classify_severity(600, 1000), Some(Severity::Medium));
        assert_eq!(classify_severity(749, 1000), Some(Severity::Medium));
    }

    #[test]
    fn test_high_band() {
        assert_eq!(classify_severity(750, 1000), Some(Severity::High));
        assert_eq!(classify_severity(899, 1000), Some(Severity::High));
        // 900/1000 = 90% crosses into critical, not high
        assert_eq!(classify_severity(899, 999), Some(Severity::High));
    }

    #[test]
    fn test_nine_hundred_of_thousand_is_critical() {
        assert_eq!(classify_severity(900, 1000), Some(Severity::Critical));
    }

    #[test]
    fn test_over_capacity_is_critical() {
        assert_eq!(classify_severity(1500, 1000), Some(Severity::Critical));
    }

    #[test]
    fn test_zero_or_negative_capacity_is_silent() {
        assert!(classify_severity(500, 0).is_none());
        assert!(classify_severity(500, -10).is_none());
    }

    #[test]
    fn test_capacity_percentage() {
        assert!((capacity_percentage(900, 1000) - 90.0).abs() < f64::EPSILON);
        assert!((capacity_percentage(1, 3) - 33.333333333333336).abs() < 1e-9);
    }

    fn engine() -> AlertingEngine {
        // Lazy pool: nothing here touches the database
        let pool = sqlx::MySqlPool::connect_lazy("mysql://root@localhost/crowdwatch_test")
            .expect("lazy pool");
        AlertingEngine::new(
            LocationRepository::new(pool.clone()),
            AlertRepository::new(pool),
        )
    }

    #[tokio::test]
    async fn test_same_location_shares_a_lock() {
        let engine = engine();
        let a = engine.location_lock("loc-a").await;
        let b = engine.location_lock("loc-a").await;
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn test_different_locations_lock_independently() {
        let engine = engine();
        let a = engine.location_lock("loc-a").await;
        let b = engine.location_lock("loc-b").await;
        assert!(!Arc::ptr_eq(&a, &b));

        let _held = a.lock().await;
        assert!(b.try_lock().is_ok());
    }
}
