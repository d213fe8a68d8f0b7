//! Stops, lines and the catalog that indexes them

pub mod data;
pub mod types;

pub use data::{NearbyStop, TransitCatalog};
pub use types::{Line, Stop, TransportType};
