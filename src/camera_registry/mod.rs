//! CameraRegistry - Sensing point records
//!
//! ## Responsibilities
//!
//! - Persist camera records and their online/offline/maintenance status
//! - Detect status transitions so lost/recovered events are logged once,
//!   not on every update
//! - Online-camera counts for the dashboard
//!
//! Capture and person detection happen outside this system; a camera here is
//! the identity a reading's `camera_id` points at.

mod repository;
mod types;

pub use repository::CameraRepository;
pub use types::{
    status_transition, Camera, CameraStatus, CameraStatusEvent, CreateCameraRequest,
    UpdateCameraRequest,
};
