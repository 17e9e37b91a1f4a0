//! Camera data types

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Camera entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    pub camera_id: String,
    pub name: String,
    pub camera_type: String,
    /// Stored as VARCHAR, converted to/from CameraStatus
    pub status: String,
    pub stream_url: Option<String>,
    pub location_id: Option<String>,
    /// Display name of the joined location, when listed with context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Camera status enum (for API serialization only, not for sqlx)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CameraStatus {
    Online,
    Offline,
    Maintenance,
}

impl Default for CameraStatus {
    fn default() -> Self {
        Self::Offline
    }
}

impl From<&str> for CameraStatus {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "online" => Self::Online,
            "maintenance" => Self::Maintenance,
            _ => Self::Offline,
        }
    }
}

impl std::fmt::Display for CameraStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Online => write!(f, "online"),
            Self::Offline => write!(f, "offline"),
            Self::Maintenance => write!(f, "maintenance"),
        }
    }
}

/// Camera status transition event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraStatusEvent {
    /// Camera went from online to offline
    Lost,
    /// Camera went from offline to online
    Recovered,
}

/// Determine the transition event for a status change, if any
///
/// Only online<->offline flips produce events; maintenance moves and
/// same-status updates are silent.
pub fn status_transition(prev: CameraStatus, next: CameraStatus) -> Option<CameraStatusEvent> {
    match (prev, next) {
        (CameraStatus::Online, CameraStatus::Offline) => Some(CameraStatusEvent::Lost),
        (CameraStatus::Offline, CameraStatus::Online) => Some(CameraStatusEvent::Recovered),
        _ => None,
    }
}

/// Camera creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCameraRequest {
    pub name: String,
    pub camera_type: String,
    pub stream_url: Option<String>,
    pub location_id: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl CreateCameraRequest {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("name is required".to_string()));
        }
        if self.camera_type.trim().is_empty() {
            return Err(Error::Validation("camera_type is required".to_string()));
        }
        Ok(())
    }
}

/// Camera update request (partial)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCameraRequest {
    pub status: Option<CameraStatus>,
    pub stream_url: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        assert_eq!(CameraStatus::from("online"), CameraStatus::Online);
        assert_eq!(CameraStatus::from("MAINTENANCE"), CameraStatus::Maintenance);
        assert_eq!(CameraStatus::from("garbage"), CameraStatus::Offline);
        assert_eq!(CameraStatus::Online.to_string(), "online");
    }

    #[test]
    fn test_online_to_offline_is_lost() {
        assert_eq!(
            status_transition(CameraStatus::Online, CameraStatus::Offline),
            Some(CameraStatusEvent::Lost)
        );
    }

    #[test]
    fn test_offline_to_online_is_recovered() {
        assert_eq!(
            status_transition(CameraStatus::Offline, CameraStatus::Online),
            Some(CameraStatusEvent::Recovered)
        );
    }

    #[test]
    fn test_same_status_no_event() {
        assert!(status_transition(CameraStatus::Online, CameraStatus::Online).is_none());
        assert!(status_transition(CameraStatus::Offline, CameraStatus::Offline).is_none());
    }

    #[test]
    fn test_maintenance_moves_are_silent() {
        assert!(status_transition(CameraStatus::Online, CameraStatus::Maintenance).is_none());
        assert!(status_transition(CameraStatus::Maintenance, CameraStatus::Online).is_none());
    }

    #[test]
    fn test_create_request_requires_type() {
        let req = CreateCameraRequest {
            name: "Gate 3".to_string(),
            camera_type: "".to_string(),
            stream_url: None,
            location_id: None,
            latitude: None,
            longitude: None,
        };
        assert!(req.validate().is_err());
    }
}
