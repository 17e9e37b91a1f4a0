//! Analytics - Windowed crowd statistics
//!
//! ## Responsibilities
//!
//! - Summary statistics over a trailing window of readings
//! - Hour-of-day buckets and per-location breakdowns
//!
//! Aggregation is a pure function of the fetched rows; the service only adds
//! the window query in front of it. Two deliberate oddities are kept for
//! compatibility with downstream consumers and pinned by tests here:
//!
//! - `capacityUtilization` sums the joined location capacity once per
//!   *reading*, so a chatty location weighs in more than once (the dashboard
//!   sums per location instead; the two are intentionally different).
//! - The location breakdown keys on the location display *name* by default,
//!   collapsing same-named locations. Id-keyed grouping is available via
//!   config.

mod repository;
mod types;

pub use repository::AnalyticsRepository;
pub use types::{AnalyticsSummary, HourlyPoint, LocationUsage, ReadingSample};

use crate::error::Result;
use chrono::{Duration, Utc};
use chrono_tz::Tz;
use std::collections::BTreeMap;

/// Windowed analytics aggregator
#[derive(Clone)]
pub struct AnalyticsService {
    repo: AnalyticsRepository,
    bucket_tz: Tz,
    group_by_id: bool,
}

impl AnalyticsService {
    pub fn new(repo: AnalyticsRepository, bucket_tz: Tz, group_by_id: bool) -> Self {
        Self {
            repo,
            bucket_tz,
            group_by_id,
        }
    }

    /// Summarize readings from the last `window_hours` (min 1), optionally
    /// filtered to one location
    pub async fn summarize(
        &self,
        location_id: Option<&str>,
        window_hours: i64,
    ) -> Result<AnalyticsSummary> {
        let since = Utc::now() - Duration::hours(window_hours.max(1));
        let rows = self.repo.fetch_window(since, location_id).await?;

        Ok(build_summary(&rows, self.bucket_tz, self.group_by_id))
    }
}

/// Compute the summary over rows sorted newest first
pub fn build_summary(rows: &[ReadingSample], bucket_tz: Tz, group_by_id: bool) -> AnalyticsSummary {
    let counts: Vec<i64> = rows.iter().map(|r| r.person_count).collect();

    let average_crowd = round_mean(&counts);
    let peak_crowd = counts.iter().copied().max().unwrap_or(0);
    let current_crowd = rows.first().map(|r| r.person_count).unwrap_or(0);

    // Capacity summed once per reading, not per distinct location
    let total_capacity: i64 = rows.iter().map(|r| r.capacity.unwrap_or(0)).sum();
    let capacity_utilization = if total_capacity > 0 {
        (current_crowd as f64 / total_capacity as f64 * 100.0).round() as i64
    } else {
        0
    };

    AnalyticsSummary {
        total_readings: rows.len(),
        average_crowd,
        peak_crowd,
        current_crowd,
        capacity_utilization,
        hourly_data: hourly_buckets(rows, bucket_tz),
        location_breakdown: location_breakdown(rows, group_by_id),
    }
}

/// Group by hour-of-day ("HH:00") in the bucket timezone
///
/// Buckets fold across days: two readings 24h apart share a bucket.
fn hourly_buckets(rows: &[ReadingSample], bucket_tz: Tz) -> Vec<HourlyPoint> {
    let mut buckets: BTreeMap<String, Vec<i64>> = BTreeMap::new();
    for row in rows {
        let hour = row
            .timestamp
            .with_timezone(&bucket_tz)
            .format("%H:00")
            .to_string();
        buckets.entry(hour).or_default().push(row.person_count);
    }

    // BTreeMap iteration gives the lexicographic bucket order
    buckets
        .into_iter()
        .map(|(hour, counts)| HourlyPoint {
            hour,
            avg_crowd: round_mean(&counts),
            peak_crowd: counts.iter().copied().max().unwrap_or(0),
        })
        .collect()
}

/// Group by location display name (or id when configured); capacity is taken
/// from the first-seen reading's location
fn location_breakdown(rows: &[ReadingSample], group_by_id: bool) -> BTreeMap<String, LocationUsage> {
    let mut groups: BTreeMap<String, (Vec<i64>, i64)> = BTreeMap::new();
    for row in rows {
        let key = if group_by_id {
            row.location_id.clone()
        } else {
            row.location_name.clone()
        }
        .unwrap_or_else(|| "Unknown".to_string());

        let entry = groups
            .entry(key)
            .or_insert_with(|| (Vec::new(), row.capacity.unwrap_or(0)));
        entry.0.push(row.person_count);
    }

    groups
        .into_iter()
        .map(|(key, (counts, capacity))| {
            (
                key,
                LocationUsage {
                    avg_crowd: round_mean(&counts),
                    peak_crowd: counts.iter().copied().max().unwrap_or(0),
                    capacity,
                },
            )
        })
        .collect()
}

/// Arithmetic mean rounded half-away-from-zero; 0 for an empty slice
fn round_mean(values: &[i64]) -> i64 {
    if values.is_empty() {
        return 0;
    }
    let sum: i64 = values.iter().sum();
    (sum as f64 / values.len() as f64).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(
        person_count: i64,
        timestamp: chrono::DateTime<Utc>,
        location: Option<(&str, &str, Option<i64>)>,
    ) -> ReadingSample {
        let (id, name, capacity) = match location {
            Some((id, name, capacity)) => {
                (Some(id.to_string()), Some(name.to_string()), capacity)
            }
            None => (None, None, None),
        };
        ReadingSample {
            person_count,
            timestamp,
            location_id: id,
            location_name: name,
            capacity,
        }
    }

    fn at(hour: u32, minute: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 5, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_empty_window_is_all_zeros() {
        let summary = build_summary(&[], Tz::UTC, false);
        assert_eq!(summary.total_readings, 0);
        assert_eq!(summary.average_crowd, 0);
        assert_eq!(summary.peak_crowd, 0);
        assert_eq!(summary.current_crowd, 0);
        assert_eq!(summary.capacity_utilization, 0);
        assert!(summary.hourly_data.is_empty());
        assert!(summary.location_breakdown.is_empty());
    }

    #[test]
    fn test_two_reading_scenario() {
        // Rows newest first: 50 at 11:00, 95 at 10:00, one location cap 100
        let rows = vec![
            sample(50, at(11, 0), Some(("loc-a", "Riverside", Some(100)))),
            sample(95, at(10, 0), Some(("loc-a", "Riverside", Some(100)))),
        ];
        let summary = build_summary(&rows, Tz::UTC, false);

        assert_eq!(summary.total_readings, 2);
        assert_eq!(summary.average_crowd, 73); // round(72.5)
        assert_eq!(summary.peak_crowd, 95);
        assert_eq!(summary.current_crowd, 50);
        assert_eq!(summary.hourly_data.len(), 2);
        assert_eq!(summary.hourly_data[0].hour, "10:00");
        assert_eq!(summary.hourly_data[1].hour, "11:00");
    }

    #[test]
    fn test_capacity_summed_once_per_reading() {
        // Two readings at one cap-100 location: denominator is 200, not 100
        let rows = vec![
            sample(50, at(11, 0), Some(("loc-a", "Riverside", Some(100)))),
            sample(95, at(10, 0), Some(("loc-a", "Riverside", Some(100)))),
        ];
        let summary = build_summary(&rows, Tz::UTC, false);
        assert_eq!(summary.capacity_utilization, 25); // round(50 / 200 * 100)
    }

    #[test]
    fn test_zero_capacity_sum_yields_zero_utilization() {
        let rows = vec![sample(50, at(11, 0), Some(("loc-a", "Riverside", None)))];
        let summary = build_summary(&rows, Tz::UTC, false);
        assert_eq!(summary.capacity_utilization, 0);
    }

    #[test]
    fn test_hourly_buckets_fold_across_days() {
        let day_later = at(10, 15) + Duration::hours(24);
        let rows = vec![
            sample(30, day_later, None),
            sample(10, at(10, 30), None),
        ];
        let points = hourly_buckets(&rows, Tz::UTC);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].hour, "10:00");
        assert_eq!(points[0].avg_crowd, 20);
        assert_eq!(points[0].peak_crowd, 30);
    }

    #[test]
    fn test_hourly_buckets_respect_timezone() {
        // 10:30 UTC is 16:00 in Asia/Kolkata (+05:30)
        let rows = vec![sample(10, at(10, 30), None)];
        let points = hourly_buckets(&rows, chrono_tz::Asia::Kolkata);
        assert_eq!(points[0].hour, "16:00");
    }

    #[test]
    fn test_breakdown_collapses_shared_names() {
        let rows = vec![
            sample(40, at(11, 0), Some(("loc-b", "Gate", Some(50)))),
            sample(20, at(10, 0), Some(("loc-a", "Gate", Some(80)))),
        ];
        let breakdown = location_breakdown(&rows, false);
        assert_eq!(breakdown.len(), 1);
        let gate = &breakdown["Gate"];
        assert_eq!(gate.avg_crowd, 30);
        assert_eq!(gate.peak_crowd, 40);
        // Capacity comes from the first-seen (most recent) reading
        assert_eq!(gate.capacity, 50);
    }

    #[test]
    fn test_breakdown_by_id_separates_shared_names() {
        let rows = vec![
            sample(40, at(11, 0), Some(("loc-b", "Gate", Some(50)))),
            sample(20, at(10, 0), Some(("loc-a", "Gate", Some(80)))),
        ];
        let breakdown = location_breakdown(&rows, true);
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown["loc-a"].capacity, 80);
        assert_eq!(breakdown["loc-b"].capacity, 50);
    }

    #[test]
    fn test_unjoined_readings_group_as_unknown() {
        let rows = vec![sample(5, at(9, 0), None)];
        let breakdown = location_breakdown(&rows, false);
        assert!(breakdown.contains_key("Unknown"));
        assert_eq!(breakdown["Unknown"].capacity, 0);
    }

    #[test]
    fn test_round_mean_half_away_from_zero() {
        assert_eq!(round_mean(&[]), 0);
        assert_eq!(round_mean(&[1, 2]), 2); // 1.5 rounds up
        assert_eq!(round_mean(&[1, 1, 2]), 1); // 1.33 rounds down
        assert_eq!(round_mean(&[95, 50]), 73);
    }
}
