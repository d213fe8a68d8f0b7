//! This module is responsible for loading reference data (stops, lines and
//! line geometry) and building the transit model from it.

mod builder;
mod config;
pub mod raw_types;

pub use builder::{create_transit_model, transit_model_from_reference};
pub use config::TransitModelConfig;
pub use raw_types::ReferenceData;
