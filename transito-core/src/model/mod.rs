//! Reference data model for transit routing and simulation
//!
//! Contains the stop/line catalog, precomputed line geometry and the
//! model structure that bundles them.

pub mod geometry;
pub mod transit;
pub mod transit_model;

pub use transit_model::TransitModel;

// Re-export of basic types for convenience
pub use crate::spatial::Coordinate;
pub use geometry::{LineGeometry, LineGeometryStore, NearestStation, Station};
pub use transit::data::{NearbyStop, TransitCatalog};
pub use transit::types::{Line, Stop, TransportType};
