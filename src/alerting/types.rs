//! Alert data types and status transitions

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Alert severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

impl From<&str> for Severity {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "critical" => Self::Critical,
            "high" => Self::High,
            "medium" => Self::Medium,
            _ => Self::Low,
        }
    }
}

/// Alert lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Active,
    Investigating,
    Resolved,
    Dismissed,
}

impl AlertStatus {
    /// Terminal states admit no further transition
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Dismissed)
    }

    /// Permitted lifecycle moves:
    /// active -> investigating | resolved | dismissed,
    /// investigating -> resolved | dismissed
    pub fn can_transition_to(self, next: AlertStatus) -> bool {
        matches!(
            (self, next),
            (Self::Active, Self::Investigating)
                | (Self::Active, Self::Resolved)
                | (Self::Active, Self::Dismissed)
                | (Self::Investigating, Self::Resolved)
                | (Self::Investigating, Self::Dismissed)
        )
    }
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Investigating => write!(f, "investigating"),
            Self::Resolved => write!(f, "resolved"),
            Self::Dismissed => write!(f, "dismissed"),
        }
    }
}

impl From<&str> for AlertStatus {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "investigating" => Self::Investigating,
            "resolved" => Self::Resolved,
            "dismissed" => Self::Dismissed,
            _ => Self::Active,
        }
    }
}

/// Origin of an alert; part of the dedup key for live incidents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerSource {
    Manual,
    CrowdDensity,
}

impl std::fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Manual => write!(f, "manual"),
            Self::CrowdDensity => write!(f, "crowd_density"),
        }
    }
}

impl From<&str> for TriggerSource {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "crowd_density" => Self::CrowdDensity,
            _ => Self::Manual,
        }
    }
}

/// Alert record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub location_id: String,
    pub camera_id: Option<String>,
    pub trigger_source: TriggerSource,
    pub crowd_count: Option<i64>,
    pub status: AlertStatus,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    /// Display name of the joined location, present on list queries only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
}

/// Manual alert creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAlertRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub severity: Option<Severity>,
    pub location_id: Option<String>,
    pub camera_id: Option<String>,
    pub crowd_count: Option<i64>,
}

impl CreateAlertRequest {
    pub fn validate(self) -> Result<ValidatedAlertRequest> {
        let title = match self.title {
            Some(t) if !t.trim().is_empty() => t,
            _ => return Err(Error::Validation("title is required".to_string())),
        };
        let description = match self.description {
            Some(d) if !d.trim().is_empty() => d,
            _ => return Err(Error::Validation("description is required".to_string())),
        };
        let severity = self
            .severity
            .ok_or_else(|| Error::Validation("severity is required".to_string()))?;
        let location_id = match self.location_id {
            Some(l) if !l.trim().is_empty() => l,
            _ => return Err(Error::Validation("location_id is required".to_string())),
        };

        Ok(ValidatedAlertRequest {
            title,
            description,
            severity,
            location_id,
            camera_id: self.camera_id,
            crowd_count: self.crowd_count,
        })
    }
}

/// A manual alert request that passed validation
#[derive(Debug, Clone)]
pub struct ValidatedAlertRequest {
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub location_id: String,
    pub camera_id: Option<String>,
    pub crowd_count: Option<i64>,
}

/// Alert status update request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAlertStatusRequest {
    pub status: AlertStatus,
}

/// Query parameters for listing alerts
#[derive(Debug, Clone, Default)]
pub struct AlertQuery {
    pub status: Option<AlertStatus>,
    pub severity: Option<Severity>,
    /// Row cap (default 50)
    pub limit: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_roundtrip() {
        for s in [
            Severity::Low,
            Severity::Medium,
            Severity::High,
            Severity::Critical,
        ] {
            assert_eq!(Severity::from(s.to_string().as_str()), s);
        }
    }

    #[test]
    fn test_status_roundtrip() {
        for s in [
            AlertStatus::Active,
            AlertStatus::Investigating,
            AlertStatus::Resolved,
            AlertStatus::Dismissed,
        ] {
            assert_eq!(AlertStatus::from(s.to_string().as_str()), s);
        }
    }

    #[test]
    fn test_trigger_source_roundtrip() {
        assert_eq!(TriggerSource::from("crowd_density"), TriggerSource::CrowdDensity);
        assert_eq!(TriggerSource::from("manual"), TriggerSource::Manual);
        assert_eq!(TriggerSource::CrowdDensity.to_string(), "crowd_density");
    }

    #[test]
    fn test_permitted_transitions() {
        use AlertStatus::*;
        assert!(Active.can_transition_to(Investigating));
        assert!(Active.can_transition_to(Resolved));
        assert!(Active.can_transition_to(Dismissed));
        assert!(Investigating.can_transition_to(Resolved));
        assert!(Investigating.can_transition_to(Dismissed));
    }

    #[test]
    fn test_terminal_states_admit_nothing() {
        use AlertStatus::*;
        for next in [Active, Investigating, Resolved, Dismissed] {
            assert!(!Resolved.can_transition_to(next));
            assert!(!Dismissed.can_transition_to(next));
        }
        assert!(Resolved.is_terminal());
        assert!(Dismissed.is_terminal());
    }

    #[test]
    fn test_no_self_or_backward_transitions() {
        use AlertStatus::*;
        assert!(!Active.can_transition_to(Active));
        assert!(!Investigating.can_transition_to(Active));
        assert!(!Investigating.can_transition_to(Investigating));
    }

    #[test]
    fn test_manual_request_requires_core_fields() {
        let req = CreateAlertRequest {
            title: Some("Blocked exit".to_string()),
            description: None,
            severity: Some(Severity::High),
            location_id: Some("loc-1".to_string()),
            camera_id: None,
            crowd_count: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_manual_request_valid() {
        let req = CreateAlertRequest {
            title: Some("Blocked exit".to_string()),
            description: Some("East exit obstructed".to_string()),
            severity: Some(Severity::High),
            location_id: Some("loc-1".to_string()),
            camera_id: None,
            crowd_count: None,
        };
        let v = req.validate().unwrap();
        assert_eq!(v.severity, Severity::High);
        assert_eq!(v.location_id, "loc-1");
    }
}
