//! Reading data types and validation

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored occupancy reading; immutable once written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    pub id: String,
    pub camera_id: String,
    pub location_id: Option<String>,
    pub person_count: i64,
    pub confidence_score: f64,
    pub timestamp: DateTime<Utc>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    /// Display names of joined records, present on list queries only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
}

/// Candidate reading as posted by a sensing point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReading {
    pub camera_id: Option<String>,
    pub location_id: Option<String>,
    pub person_count: Option<i64>,
    pub confidence_score: Option<f64>,
    pub metadata: Option<serde_json::Value>,
}

/// A reading that passed validation, with defaults applied
#[derive(Debug, Clone)]
pub struct ValidatedReading {
    pub camera_id: String,
    pub location_id: Option<String>,
    pub person_count: i64,
    pub confidence_score: f64,
    pub metadata: serde_json::Value,
}

impl NewReading {
    /// Validate required fields and apply defaults
    ///
    /// confidence_score defaults to 0 and metadata to an empty map when
    /// absent; an out-of-range confidence is rejected rather than clamped.
    pub fn validate(self) -> Result<ValidatedReading> {
        let camera_id = match self.camera_id {
            Some(id) if !id.trim().is_empty() => id,
            _ => return Err(Error::Validation("camera_id is required".to_string())),
        };

        let person_count = self
            .person_count
            .ok_or_else(|| Error::Validation("person_count is required".to_string()))?;
        if person_count < 0 {
            return Err(Error::Validation(
                "person_count must be non-negative".to_string(),
            ));
        }

        let confidence_score = self.confidence_score.unwrap_or(0.0);
        if !(0.0..=1.0).contains(&confidence_score) {
            return Err(Error::Validation(
                "confidence_score must be within [0, 1]".to_string(),
            ));
        }

        Ok(ValidatedReading {
            camera_id,
            location_id: self.location_id,
            person_count,
            confidence_score,
            metadata: self.metadata.unwrap_or_else(|| serde_json::json!({})),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> NewReading {
        NewReading {
            camera_id: Some("cam-1".to_string()),
            location_id: Some("loc-1".to_string()),
            person_count: Some(42),
            confidence_score: Some(0.87),
            metadata: None,
        }
    }

    #[test]
    fn test_valid_payload() {
        let v = payload().validate().unwrap();
        assert_eq!(v.camera_id, "cam-1");
        assert_eq!(v.person_count, 42);
        assert!((v.confidence_score - 0.87).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_camera_id_rejected() {
        let mut p = payload();
        p.camera_id = None;
        assert!(matches!(p.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_blank_camera_id_rejected() {
        let mut p = payload();
        p.camera_id = Some("   ".to_string());
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_missing_person_count_rejected() {
        let mut p = payload();
        p.person_count = None;
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_negative_person_count_rejected() {
        let mut p = payload();
        p.person_count = Some(-1);
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_zero_person_count_allowed() {
        let mut p = payload();
        p.person_count = Some(0);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_defaults_applied() {
        let mut p = payload();
        p.confidence_score = None;
        p.metadata = None;
        let v = p.validate().unwrap();
        assert_eq!(v.confidence_score, 0.0);
        assert_eq!(v.metadata, serde_json::json!({}));
    }

    #[test]
    fn test_out_of_range_confidence_rejected() {
        let mut p = payload();
        p.confidence_score = Some(1.5);
        assert!(p.validate().is_err());

        let mut p = payload();
        p.confidence_score = Some(-0.1);
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_missing_location_is_allowed() {
        let mut p = payload();
        p.location_id = None;
        assert!(p.validate().is_ok());
    }
}
