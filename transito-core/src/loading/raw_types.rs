//! Serialized form of the reference data

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Coordinate, Error, TransportType};

const BUILTIN_NETWORK: &str = include_str!("../../data/monterrey.json");

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopRecord {
    pub id: String,
    pub name: String,
    pub coordinates: Coordinate,
    pub transport_type: TransportType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRecord {
    pub id: String,
    pub name: String,
    pub transport_type: TransportType,
    pub stops: Vec<String>,
    pub fare: f64,
    pub minutes_between_stops: f64,
    pub headway: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationRecord {
    pub name: String,
    pub index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometryRecord {
    pub line_id: String,
    pub points: Vec<Coordinate>,
    pub stations: Vec<StationRecord>,
}

/// Whole reference-data document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceData {
    pub stops: Vec<StopRecord>,
    pub lines: Vec<LineRecord>,
    pub geometries: Vec<GeometryRecord>,
}

impl ReferenceData {
    /// Monterrey metro lines 1 and 2 plus a few bus routes
    pub fn builtin() -> Result<Self, Error> {
        Self::from_json(BUILTIN_NETWORK)
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}
