//! HeatMap - Spatial intensity aggregation
//!
//! Groups windowed readings by the exact coordinate pair of their location
//! and derives a 0-100 intensity per point for map rendering. Two locations
//! pinned to identical coordinates merge into one point (kept for output
//! compatibility). Without a known capacity, intensity falls back to
//! treating 100 people as "full", a rough simplification rather than a real
//! normalization.

use crate::error::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use std::collections::HashMap;

/// One reading joined with its located coordinates
#[derive(Debug, Clone)]
pub struct HeatSample {
    pub person_count: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
    pub capacity: Option<i64>,
}

/// One heat-map point
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatMapPoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Normalized 0-100 visualization value
    pub intensity: i64,
    pub name: String,
    pub avg_crowd: i64,
    pub max_crowd: i64,
    pub capacity: Option<i64>,
}

/// Heat-map response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatMapResponse {
    pub heat_map_points: Vec<HeatMapPoint>,
    pub timestamp: DateTime<Utc>,
    /// Raw reading count behind the points
    pub data_points: usize,
}

/// Spatial heat-map aggregator
#[derive(Clone)]
pub struct HeatMapService {
    pool: MySqlPool,
}

impl HeatMapService {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Build the heat map over the last `window_hours` (min 1)
    pub async fn heatmap(&self, window_hours: i64) -> Result<HeatMapResponse> {
        let since = Utc::now() - Duration::hours(window_hours.max(1));

        let rows = sqlx::query(
            r#"
            SELECT r.person_count, l.latitude, l.longitude, l.name, l.capacity
            FROM crowd_readings r
            INNER JOIN locations l ON r.location_id = l.id
            WHERE r.timestamp >= ?
              AND l.latitude IS NOT NULL
              AND l.longitude IS NOT NULL
            ORDER BY r.timestamp DESC
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        let samples: Vec<HeatSample> = rows
            .into_iter()
            .map(row_to_sample)
            .collect::<Result<_>>()?;

        Ok(HeatMapResponse {
            heat_map_points: build_points(&samples),
            timestamp: Utc::now(),
            data_points: samples.len(),
        })
    }
}

/// Group samples by exact coordinates and compute per-point intensity
pub fn build_points(samples: &[HeatSample]) -> Vec<HeatMapPoint> {
    struct Group {
        latitude: f64,
        longitude: f64,
        name: String,
        capacity: Option<i64>,
        counts: Vec<i64>,
    }

    // Keyed on the formatted pair; order of first appearance is kept
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();

    for sample in samples {
        let key = format!("{},{}", sample.latitude, sample.longitude);
        let idx = *index.entry(key).or_insert_with(|| {
            groups.push(Group {
                latitude: sample.latitude,
                longitude: sample.longitude,
                name: sample.name.clone(),
                capacity: sample.capacity,
                counts: Vec::new(),
            });
            groups.len() - 1
        });
        groups[idx].counts.push(sample.person_count);
    }

    groups
        .into_iter()
        .map(|group| {
            let avg = group.counts.iter().sum::<i64>() as f64 / group.counts.len() as f64;
            let max_crowd = group.counts.iter().copied().max().unwrap_or(0);

            let intensity = match group.capacity {
                Some(capacity) if capacity > 0 => (avg / capacity as f64 * 100.0).min(100.0),
                // No capacity known: 100 people reads as fully saturated
                _ => avg.min(100.0),
            };

            HeatMapPoint {
                latitude: group.latitude,
                longitude: group.longitude,
                intensity: intensity.round() as i64,
                name: group.name,
                avg_crowd: avg.round() as i64,
                max_crowd,
                capacity: group.capacity,
            }
        })
        .collect()
}

fn row_to_sample(row: MySqlRow) -> Result<HeatSample> {
    Ok(HeatSample {
        person_count: row.try_get("person_count")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        name: row.try_get("name")?,
        capacity: row.try_get("capacity")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(count: i64, lat: f64, lon: f64, name: &str, capacity: Option<i64>) -> HeatSample {
        HeatSample {
            person_count: count,
            latitude: lat,
            longitude: lon,
            name: name.to_string(),
            capacity,
        }
    }

    #[test]
    fn test_no_samples_no_points() {
        assert!(build_points(&[]).is_empty());
    }

    #[test]
    fn test_capacity_based_intensity() {
        let points = build_points(&[
            sample(40, 25.0, 82.0, "Ghat", Some(100)),
            sample(60, 25.0, 82.0, "Ghat", Some(100)),
        ]);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].avg_crowd, 50);
        assert_eq!(points[0].max_crowd, 60);
        assert_eq!(points[0].intensity, 50);
    }

    #[test]
    fn test_capacity_free_fallback_caps_at_100() {
        // avg 120 with no capacity: fallback saturates at 100
        let points = build_points(&[sample(120, 25.0, 82.0, "Plaza", None)]);
        assert_eq!(points[0].avg_crowd, 120);
        assert_eq!(points[0].intensity, 100);
    }

    #[test]
    fn test_capacity_free_fallback_below_100() {
        let points = build_points(&[sample(35, 25.0, 82.0, "Plaza", None)]);
        assert_eq!(points[0].intensity, 35);
    }

    #[test]
    fn test_over_capacity_intensity_caps_at_100() {
        let points = build_points(&[sample(250, 25.0, 82.0, "Ghat", Some(100))]);
        assert_eq!(points[0].intensity, 100);
    }

    #[test]
    fn test_identical_coordinates_merge() {
        // Two differently named locations at the same pair become one point
        let points = build_points(&[
            sample(10, 25.0, 82.0, "North Gate", Some(100)),
            sample(30, 25.0, 82.0, "South Gate", Some(200)),
        ]);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].name, "North Gate");
        assert_eq!(points[0].capacity, Some(100));
        assert_eq!(points[0].avg_crowd, 20);
    }

    #[test]
    fn test_distinct_coordinates_stay_apart() {
        let points = build_points(&[
            sample(10, 25.0, 82.0, "A", None),
            sample(30, 25.1, 82.0, "B", None),
        ]);
        assert_eq!(points.len(), 2);
    }
}
