//! Dashboard - Live snapshot composition
//!
//! Composes the landing-page counters from camera status, the last hour of
//! readings, active alerts, and configured capacity. Unlike the windowed
//! analytics, total capacity here is summed once per location; there is no
//! per-reading join to repeat it.

use crate::alerting::AlertRepository;
use crate::camera_registry::CameraRepository;
use crate::error::Result;
use crate::ingest::ReadingRepository;
use crate::location_registry::LocationRepository;
use serde::{Deserialize, Serialize};

/// Crowd sample window (minutes) and cap for the current-crowd estimate
const SAMPLE_WINDOW_MIN: i64 = 60;
const SAMPLE_LIMIT: u32 = 50;

/// Dashboard snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub active_cameras: i64,
    pub current_crowd: i64,
    pub active_alerts: i64,
    pub capacity_usage: i64,
    pub total_capacity: i64,
}

/// Dashboard summary aggregator
#[derive(Clone)]
pub struct DashboardService {
    cameras: CameraRepository,
    readings: ReadingRepository,
    alerts: AlertRepository,
    locations: LocationRepository,
}

impl DashboardService {
    pub fn new(
        cameras: CameraRepository,
        readings: ReadingRepository,
        alerts: AlertRepository,
        locations: LocationRepository,
    ) -> Self {
        Self {
            cameras,
            readings,
            alerts,
            locations,
        }
    }

    /// Build the current snapshot; the four source queries run concurrently
    pub async fn snapshot(&self) -> Result<DashboardStats> {
        let (active_cameras, sample, active_alerts, total_capacity) = tokio::try_join!(
            self.cameras.count_online(),
            self.readings.recent_counts(SAMPLE_WINDOW_MIN, SAMPLE_LIMIT),
            self.alerts.count_active(),
            self.locations.total_capacity(),
        )?;

        Ok(compose_stats(
            active_cameras,
            &sample,
            active_alerts,
            total_capacity,
        ))
    }
}

/// Pure composition of the snapshot from its four inputs
pub fn compose_stats(
    active_cameras: i64,
    sample: &[i64],
    active_alerts: i64,
    total_capacity: i64,
) -> DashboardStats {
    let current_crowd = if sample.is_empty() {
        0
    } else {
        (sample.iter().sum::<i64>() as f64 / sample.len() as f64).round() as i64
    };

    let capacity_usage = if total_capacity > 0 {
        (current_crowd as f64 / total_capacity as f64 * 100.0).round() as i64
    } else {
        0
    };

    DashboardStats {
        active_cameras,
        current_crowd,
        active_alerts,
        capacity_usage,
        total_capacity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sample_is_zero_crowd() {
        let stats = compose_stats(3, &[], 1, 500);
        assert_eq!(stats.current_crowd, 0);
        assert_eq!(stats.capacity_usage, 0);
        assert_eq!(stats.active_cameras, 3);
        assert_eq!(stats.active_alerts, 1);
        assert_eq!(stats.total_capacity, 500);
    }

    #[test]
    fn test_current_crowd_is_rounded_mean() {
        let stats = compose_stats(0, &[10, 11], 0, 0);
        assert_eq!(stats.current_crowd, 11); // round(10.5)
    }

    #[test]
    fn test_capacity_usage_rounds() {
        let stats = compose_stats(0, &[50], 0, 200);
        assert_eq!(stats.capacity_usage, 25);

        let stats = compose_stats(0, &[1], 0, 3);
        assert_eq!(stats.capacity_usage, 33);
    }

    #[test]
    fn test_zero_capacity_never_divides() {
        let stats = compose_stats(0, &[100], 0, 0);
        assert_eq!(stats.capacity_usage, 0);
    }

    #[test]
    fn test_serializes_camel_case() {
        let stats = compose_stats(2, &[40], 1, 400);
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("activeCameras"));
        assert!(json.contains("capacityUsage"));
        assert!(json.contains("totalCapacity"));
    }
}
