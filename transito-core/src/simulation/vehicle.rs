use chrono::{DateTime, Utc};
use geo::LineString;
use serde::{Deserialize, Serialize};

use crate::{
    Coordinate, Error, LineId, VehicleId,
    model::NearestStation,
    spatial::{haversine_distance, interpolate, polyline_length, project_onto_segment},
};

/// Largest progress value on a segment, keeps progress strictly below 1
pub(crate) const MAX_PROGRESS: f64 = 1.0 - f64::EPSILON;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VehicleStatus {
    Active,
    Stopped,
}

/// Live vehicle moving back and forth along a polyline
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: VehicleId,
    pub line_id: LineId,
    pub position: Coordinate,
    /// Index of the polyline segment the vehicle is on
    pub segment_index: usize,
    /// Fraction of the current segment covered, in `[0, 1)`
    pub progress: f64,
    pub direction_forward: bool,
    /// km/h
    pub speed: f64,
    pub status: VehicleStatus,
    pub nearest_station: Option<NearestStation>,
    /// Percent, 0-100
    pub occupancy: Option<u8>,
    pub fare: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub(crate) route: LineString<f64>,
}

impl Vehicle {
    pub(crate) fn new(
        id: VehicleId,
        line_id: LineId,
        route: LineString<f64>,
        speed: f64,
        direction_forward: bool,
    ) -> Self {
        let now = Utc::now();
        let position = route
            .0
            .first()
            .map_or(Coordinate::new(0.0, 0.0), |&c| c.into());
        Self {
            id,
            line_id,
            position,
            segment_index: 0,
            progress: 0.0,
            direction_forward,
            speed,
            status: VehicleStatus::Active,
            nearest_station: None,
            occupancy: None,
            fare: None,
            created_at: now,
            updated_at: now,
            route,
        }
    }

    /// The polyline this vehicle travels
    pub fn route(&self) -> &LineString<f64> {
        &self.route
    }

    fn last_segment(&self) -> usize {
        self.route.0.len().saturating_sub(2)
    }

    fn segment_ends(&self) -> (Coordinate, Coordinate) {
        let i = self.segment_index;
        (self.route.0[i].into(), self.route.0[i + 1].into())
    }

    /// Recomputes `position` from the segment index and progress
    pub(crate) fn refresh_position(&mut self) {
        let (a, b) = self.segment_ends();
        self.position = interpolate(a, b, self.progress);
    }

    /// Places the vehicle on the point of its route closest to `location`
    pub(crate) fn place_at(&mut self, location: Coordinate) {
        let (segment_index, progress) = project_onto_route(&self.route, location);
        self.segment_index = segment_index;
        self.progress = progress;
        self.refresh_position();
    }

    /// Moves the vehicle `meters` along its route, bouncing at both ends.
    ///
    /// # Errors
    ///
    /// `InvalidData` if the route has zero length, since no distance could
    /// ever be consumed.
    pub(crate) fn advance(&mut self, meters: f64) -> Result<(), Error> {
        let total = polyline_length(&self.route);
        if total <= 0.0 {
            return Err(Error::InvalidData(format!(
                "route of vehicle {} has zero length",
                self.id
            )));
        }

        // A full round trip returns to the same place and heading
        let mut remaining = meters % (2.0 * total);
        let last = self.last_segment();

        while remaining > 0.0 {
            let (a, b) = self.segment_ends();
            let length = haversine_distance(a, b);

            if self.direction_forward {
                let available = (1.0 - self.progress) * length;
                if remaining < available {
                    self.progress += remaining / length;
                    break;
                }
                remaining -= available;
                if self.segment_index < last {
                    self.segment_index += 1;
                    self.progress = 0.0;
                } else {
                    self.direction_forward = false;
                    self.progress = MAX_PROGRESS;
                }
            } else {
                let available = self.progress * length;
                if remaining < available {
                    self.progress -= remaining / length;
                    break;
                }
                remaining -= available;
                if self.segment_index > 0 {
                    self.segment_index -= 1;
                    self.progress = MAX_PROGRESS;
                } else {
                    self.direction_forward = true;
                    self.progress = 0.0;
                }
            }
        }

        self.progress = self.progress.clamp(0.0, MAX_PROGRESS);
        self.refresh_position();
        Ok(())
    }
}

/// Closest point of `route` to `location` as (segment index, progress).
///
/// The first segment wins on ties; a projection onto the very end of a
/// segment moves to the start of the next one.
pub(crate) fn project_onto_route(route: &LineString<f64>, location: Coordinate) -> (usize, f64) {
    let mut best = (0, 0.0, f64::INFINITY);
    for (idx, line) in route.lines().enumerate() {
        let (t, distance) = project_onto_segment(location, line.start.into(), line.end.into());
        if distance < best.2 {
            best = (idx, t, distance);
        }
    }

    let (idx, t, _) = best;
    let last = route.0.len().saturating_sub(2);
    if t < 1.0 {
        (idx, t)
    } else if idx < last {
        (idx + 1, 0.0)
    } else {
        (idx, MAX_PROGRESS)
    }
}

pub(crate) fn validate_speed(speed: f64) -> Result<(), Error> {
    if !speed.is_finite() || speed < 0.0 {
        return Err(Error::InvalidInput(format!(
            "speed must be a non-negative number, got {speed}"
        )));
    }
    Ok(())
}
