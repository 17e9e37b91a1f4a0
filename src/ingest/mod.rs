//! Ingest - Reading validation and persistence
//!
//! ## Responsibilities
//!
//! - Validate raw occupancy readings from sensing points
//! - Persist valid readings (assigning id and server timestamp)
//! - Hand each persisted reading to the alerting engine, best-effort
//!
//! Ingestion is authoritative, alerting is not: a failure while evaluating
//! thresholds is logged and swallowed so the reading is never lost.

mod repository;
mod types;

pub use repository::{ReadingQuery, ReadingRepository};
pub use types::{NewReading, Reading, ValidatedReading};

use crate::alerting::AlertingEngine;
use crate::error::Result;
use std::sync::Arc;

/// Ingestion validator service
pub struct IngestService {
    readings: ReadingRepository,
    alerting: Arc<AlertingEngine>,
}

impl IngestService {
    pub fn new(readings: ReadingRepository, alerting: Arc<AlertingEngine>) -> Self {
        Self { readings, alerting }
    }

    /// Validate, persist, and evaluate a candidate reading
    pub async fn ingest(&self, payload: NewReading) -> Result<Reading> {
        let validated = payload.validate()?;
        let reading = self.readings.insert(validated).await?;

        tracing::info!(
            reading_id = %reading.id,
            camera_id = %reading.camera_id,
            location_id = ?reading.location_id,
            person_count = reading.person_count,
            "Reading stored"
        );

        // Threshold evaluation needs a location to look up capacity on
        if let Some(location_id) = reading.location_id.clone() {
            if let Err(e) = self
                .alerting
                .evaluate(&location_id, &reading.camera_id, reading.person_count)
                .await
            {
                tracing::warn!(
                    reading_id = %reading.id,
                    location_id = %location_id,
                    error = %e,
                    "Alert evaluation failed; reading kept"
                );
            }
        }

        Ok(reading)
    }
}
