//! Geospatial primitives working on plain latitude/longitude pairs.
//!
//! Distances use the Haversine formula with a fixed Earth radius.
//! Interpolation and projection are linear in degree space, which is
//! accurate enough at urban scale.

use geo::{Coord, LineString, Point};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Geographic coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Rejects non-finite values and values outside the WGS84 ranges
    pub fn validate(&self) -> Result<(), Error> {
        if !self.latitude.is_finite() || !self.longitude.is_finite() {
            return Err(Error::InvalidInput(format!(
                "coordinates must be finite numbers, got ({}, {})",
                self.latitude, self.longitude
            )));
        }
        if !(-90.0..=90.0).contains(&self.latitude) || !(-180.0..=180.0).contains(&self.longitude)
        {
            return Err(Error::InvalidInput(format!(
                "coordinates out of range: ({}, {})",
                self.latitude, self.longitude
            )));
        }
        Ok(())
    }
}

impl From<Coordinate> for Coord<f64> {
    fn from(c: Coordinate) -> Self {
        Coord {
            x: c.longitude,
            y: c.latitude,
        }
    }
}

impl From<Coord<f64>> for Coordinate {
    fn from(c: Coord<f64>) -> Self {
        Coordinate::new(c.y, c.x)
    }
}

impl From<Coordinate> for Point<f64> {
    fn from(c: Coordinate) -> Self {
        Point::new(c.longitude, c.latitude)
    }
}

/// Great-circle distance between two coordinates in meters
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Linear interpolation between `a` and `b`, `t` in `[0, 1]`
pub fn interpolate(a: Coordinate, b: Coordinate, t: f64) -> Coordinate {
    Coordinate::new(
        a.latitude + (b.latitude - a.latitude) * t,
        a.longitude + (b.longitude - a.longitude) * t,
    )
}

/// Projects `point` onto the segment `a`-`b`.
///
/// Returns the clamped parametric position of the closest point and the
/// Haversine distance from `point` to it.
pub fn project_onto_segment(point: Coordinate, a: Coordinate, b: Coordinate) -> (f64, f64) {
    let dx = b.longitude - a.longitude;
    let dy = b.latitude - a.latitude;
    let len_sq = dx * dx + dy * dy;

    let t = if len_sq == 0.0 {
        0.0
    } else {
        let dot = (point.longitude - a.longitude) * dx + (point.latitude - a.latitude) * dy;
        (dot / len_sq).clamp(0.0, 1.0)
    };

    let closest = interpolate(a, b, t);
    (t, haversine_distance(point, closest))
}

/// Length of a lon/lat polyline in meters
pub fn polyline_length(line: &LineString<f64>) -> f64 {
    line.lines()
        .map(|segment| haversine_distance(segment.start.into(), segment.end.into()))
        .sum()
}
