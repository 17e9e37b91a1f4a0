//! LocationRegistry - Named physical areas with finite capacity
//!
//! ## Responsibilities
//!
//! - Persist and list monitored locations
//! - Capacity lookups for the alerting engine and dashboard
//!
//! Locations are reference data: readings and alerts point at them, but
//! nothing in the ingestion/aggregation core ever mutates one.

mod repository;
mod types;

pub use repository::LocationRepository;
pub use types::{CreateLocationRequest, Location};
