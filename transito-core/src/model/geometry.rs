//! Precomputed polylines for fixed-geometry lines and their station index

use geo::{Coord, LineString};
use hashbrown::HashMap;
use serde::Serialize;

use crate::{Coordinate, Error, LineId, spatial::haversine_distance};

/// Station placed on a line polyline
#[derive(Debug, Clone, Serialize)]
pub struct Station {
    pub name: String,
    /// Offset of the station in the polyline
    pub index: usize,
    pub coordinates: Coordinate,
}

/// Result of a nearest-station lookup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearestStation {
    pub name: String,
    /// Distance in meters
    pub distance: f64,
}

/// Polyline of a single line with its stations ordered by index
#[derive(Debug, Clone)]
pub struct LineGeometry {
    pub line_id: LineId,
    pub polyline: LineString<f64>,
    stations: Vec<Station>,
}

impl LineGeometry {
    /// # Errors
    ///
    /// `InvalidData` if the polyline has fewer than two points, a station
    /// points outside the polyline, or a station name repeats.
    pub fn new(
        line_id: impl Into<LineId>,
        polyline: LineString<f64>,
        mut stations: Vec<Station>,
    ) -> Result<Self, Error> {
        let line_id = line_id.into();
        let points = polyline.0.len();
        if points < 2 {
            return Err(Error::InvalidData(format!(
                "polyline of line {line_id} has {points} point(s), at least 2 required"
            )));
        }

        stations.sort_by_key(|station| station.index);
        for (pos, station) in stations.iter().enumerate() {
            if station.index >= points {
                return Err(Error::InvalidData(format!(
                    "station {} of line {line_id} has index {} beyond polyline length {points}",
                    station.name, station.index
                )));
            }
            if stations[..pos].iter().any(|s| s.name == station.name) {
                return Err(Error::InvalidData(format!(
                    "duplicate station {} on line {line_id}",
                    station.name
                )));
            }
        }

        Ok(Self {
            line_id,
            polyline,
            stations,
        })
    }

    /// Stations in polyline order
    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn station(&self, name: &str) -> Result<&Station, Error> {
        self.stations
            .iter()
            .find(|station| station.name == name)
            .ok_or_else(|| Error::StationNotFound {
                line: self.line_id.clone(),
                station: name.to_string(),
            })
    }

    /// Polyline points as coordinates
    pub fn points(&self) -> Vec<Coordinate> {
        self.polyline.coords().map(|&c| c.into()).collect()
    }

    /// Polyline slice between two stations, oriented from `from` to `to`
    pub fn segment_between(&self, from: &str, to: &str) -> Result<LineString<f64>, Error> {
        let start = self.station(from)?.index;
        let end = self.station(to)?.index;

        let coords: Vec<Coord<f64>> = if start <= end {
            self.polyline.0[start..=end].to_vec()
        } else {
            self.polyline.0[end..=start].iter().rev().copied().collect()
        };
        Ok(LineString::new(coords))
    }

    /// Closest station by Haversine distance; the first one wins on ties
    pub fn nearest_station(&self, location: Coordinate) -> Option<NearestStation> {
        let mut best: Option<NearestStation> = None;
        for station in &self.stations {
            let distance = haversine_distance(location, station.coordinates);
            if best.as_ref().is_none_or(|b| distance < b.distance) {
                best = Some(NearestStation {
                    name: station.name.clone(),
                    distance,
                });
            }
        }
        best
    }
}

/// Geometry of every fixed-geometry line, keyed by line id
#[derive(Debug, Clone, Default)]
pub struct LineGeometryStore {
    lines: HashMap<LineId, LineGeometry>,
}

impl LineGeometryStore {
    pub fn new(geometries: impl IntoIterator<Item = LineGeometry>) -> Self {
        Self {
            lines: geometries
                .into_iter()
                .map(|geometry| (geometry.line_id.clone(), geometry))
                .collect(),
        }
    }

    pub fn get(&self, line_id: &str) -> Result<&LineGeometry, Error> {
        self.lines
            .get(line_id)
            .ok_or_else(|| Error::LineNotFound(line_id.to_string()))
    }

    pub fn contains(&self, line_id: &str) -> bool {
        self.lines.contains_key(line_id)
    }

    /// Line ids in sorted order
    pub fn line_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.lines.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn segment_between(
        &self,
        line_id: &str,
        from: &str,
        to: &str,
    ) -> Result<LineString<f64>, Error> {
        self.get(line_id)?.segment_between(from, to)
    }

    pub fn nearest_station(
        &self,
        location: Coordinate,
        line_id: &str,
    ) -> Result<NearestStation, Error> {
        let geometry = self.get(line_id)?;
        geometry
            .nearest_station(location)
            .ok_or_else(|| Error::StationNotFound {
                line: line_id.to_string(),
                station: format!("<nearest to {}, {}>", location.latitude, location.longitude),
            })
    }
}
