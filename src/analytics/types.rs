//! Analytics data types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One reading joined with its location, as fetched for aggregation
#[derive(Debug, Clone)]
pub struct ReadingSample {
    pub person_count: i64,
    pub timestamp: DateTime<Utc>,
    pub location_id: Option<String>,
    pub location_name: Option<String>,
    pub capacity: Option<i64>,
}

/// Windowed analytics summary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_readings: usize,
    pub average_crowd: i64,
    pub peak_crowd: i64,
    pub current_crowd: i64,
    pub capacity_utilization: i64,
    pub hourly_data: Vec<HourlyPoint>,
    pub location_breakdown: BTreeMap<String, LocationUsage>,
}

/// Average and peak for one hour-of-day bucket
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyPoint {
    /// Bucket key, formatted "HH:00"
    pub hour: String,
    pub avg_crowd: i64,
    pub peak_crowd: i64,
}

/// Per-location usage within the window
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationUsage {
    pub avg_crowd: i64,
    pub peak_crowd: i64,
    pub capacity: i64,
}
