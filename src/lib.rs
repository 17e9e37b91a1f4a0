//! Crowdwatch Server Library
//!
//! Crowd occupancy ingestion, aggregation and threshold alerting.
//!
//! ## Architecture
//!
//! 1. LocationRegistry - Named areas with finite capacity
//! 2. CameraRegistry - Sensing point records and status
//! 3. Ingest - Reading validation and persistence
//! 4. Alerting - Capacity-threshold alert engine (single live incident per location)
//! 5. Analytics - Windowed crowd statistics
//! 6. HeatMap - Spatial intensity aggregation
//! 7. Dashboard - Live snapshot composition
//! 8. WebAPI - REST API endpoints
//!
//! ## Design Principles
//!
//! - Readings are append-only; ingestion is authoritative, alerting is best-effort
//! - Aggregators are pure functions over a window snapshot
//! - Alert lifecycle moves only through explicit status transitions

pub mod alerting;
pub mod analytics;
pub mod camera_registry;
pub mod dashboard;
pub mod error;
pub mod heat_map;
pub mod ingest;
pub mod location_registry;
pub mod models;
pub mod state;
pub mod web_api;

pub use error::{Error, Result};
pub use state::AppState;
