//! Stop/line catalog and methods to query it

use hashbrown::HashMap;

use super::types::{Line, Stop};
use crate::{Coordinate, Error, spatial::haversine_distance};

/// Stop found by a proximity query, with its distance in meters
#[derive(Debug, Clone, Copy)]
pub struct NearbyStop<'a> {
    pub stop: &'a Stop,
    pub distance: f64,
}

/// Immutable catalog of stops and lines
#[derive(Debug, Clone)]
pub struct TransitCatalog {
    /// All stops, in load order
    pub stops: Vec<Stop>,
    /// All lines, in load order
    pub lines: Vec<Line>,
    stop_index: HashMap<String, usize>,
    line_index: HashMap<String, usize>,
}

impl TransitCatalog {
    /// Builds the catalog and its lookup indices.
    ///
    /// The `lines` field of every stop is rebuilt from the lines' stop lists.
    pub fn new(mut stops: Vec<Stop>, lines: Vec<Line>) -> Result<Self, Error> {
        let mut stop_index = HashMap::with_capacity(stops.len());
        for (idx, stop) in stops.iter().enumerate() {
            if stop_index.insert(stop.id.clone(), idx).is_some() {
                return Err(Error::InvalidData(format!("duplicate stop id {}", stop.id)));
            }
        }

        let mut line_index = HashMap::with_capacity(lines.len());
        for stop in &mut stops {
            stop.lines.clear();
        }
        for (idx, line) in lines.iter().enumerate() {
            if !line.transport_type.is_ride() {
                return Err(Error::InvalidData(format!(
                    "line {} has non-ride type {}",
                    line.id, line.transport_type
                )));
            }
            if line_index.insert(line.id.clone(), idx).is_some() {
                return Err(Error::InvalidData(format!("duplicate line id {}", line.id)));
            }
            for stop_id in &line.stops {
                let stop_idx = *stop_index.get(stop_id).ok_or_else(|| {
                    Error::InvalidData(format!(
                        "line {} references unknown stop {stop_id}",
                        line.id
                    ))
                })?;
                let served = &mut stops[stop_idx].lines;
                if !served.contains(&line.id) {
                    served.push(line.id.clone());
                }
            }
        }

        Ok(Self {
            stops,
            lines,
            stop_index,
            line_index,
        })
    }

    pub fn stop(&self, stop_id: &str) -> Result<&Stop, Error> {
        self.stop_index
            .get(stop_id)
            .map(|&idx| &self.stops[idx])
            .ok_or_else(|| Error::StopNotFound(stop_id.to_string()))
    }

    pub fn line(&self, line_id: &str) -> Result<&Line, Error> {
        self.line_index
            .get(line_id)
            .map(|&idx| &self.lines[idx])
            .ok_or_else(|| Error::LineNotFound(line_id.to_string()))
    }

    /// Lines serving the given stop
    pub fn lines_for_stop<'a>(&'a self, stop: &'a Stop) -> impl Iterator<Item = &'a Line> + 'a {
        stop.lines.iter().filter_map(|id| self.line(id).ok())
    }

    /// All stops within `radius` meters of `location`, nearest first.
    ///
    /// Equal distances keep catalog order.
    pub fn nearby_stops(&self, location: Coordinate, radius: f64) -> Vec<NearbyStop<'_>> {
        let mut nearby: Vec<NearbyStop<'_>> = self
            .stops
            .iter()
            .map(|stop| NearbyStop {
                stop,
                distance: haversine_distance(location, stop.coordinates),
            })
            .filter(|candidate| candidate.distance <= radius)
            .collect();

        nearby.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        nearby
    }

    /// Closest stop regardless of distance
    pub fn nearest_stop(&self, location: Coordinate) -> Option<NearbyStop<'_>> {
        self.stops
            .iter()
            .map(|stop| NearbyStop {
                stop,
                distance: haversine_distance(location, stop.coordinates),
            })
            .reduce(|best, candidate| {
                if candidate.distance < best.distance {
                    candidate
                } else {
                    best
                }
            })
    }
}
