//! Location data types

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Location entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub area_type: Option<String>,
    /// Operator-configured maximum comfortable occupancy; optional
    pub capacity: Option<i64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Location creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLocationRequest {
    pub name: String,
    pub description: Option<String>,
    pub area_type: Option<String>,
    pub capacity: Option<i64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl CreateLocationRequest {
    /// Validate required fields
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("name is required".to_string()));
        }
        if self.latitude.is_none() || self.longitude.is_none() {
            return Err(Error::Validation(
                "latitude and longitude are required".to_string(),
            ));
        }
        if let Some(capacity) = self.capacity {
            if capacity <= 0 {
                return Err(Error::Validation(
                    "capacity must be a positive integer".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateLocationRequest {
        CreateLocationRequest {
            name: "Main Ghat".to_string(),
            description: None,
            area_type: Some("ghat".to_string()),
            capacity: Some(1000),
            latitude: Some(25.3176),
            longitude: Some(82.9739),
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut req = request();
        req.name = "  ".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_missing_coordinates_rejected() {
        let mut req = request();
        req.longitude = None;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let mut req = request();
        req.capacity = Some(0);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_absent_capacity_allowed() {
        let mut req = request();
        req.capacity = None;
        assert!(req.validate().is_ok());
    }
}
