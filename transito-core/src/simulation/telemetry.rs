//! Position reports coming from drivers or on-board sensors

use chrono::Utc;
use log::debug;
use serde::{Deserialize, Serialize};

use super::{Simulator, Vehicle};
use crate::{Coordinate, Error, LineId, VehicleId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryUpdate {
    pub vehicle_id: VehicleId,
    pub coordinates: Coordinate,
    #[serde(default)]
    pub occupancy: Option<u8>,
    #[serde(default)]
    pub fare: Option<f64>,
    /// Required when the vehicle is not tracked yet
    #[serde(default)]
    pub line_id: Option<LineId>,
}

impl TelemetryUpdate {
    fn validate(&self) -> Result<(), Error> {
        self.coordinates.validate()?;
        if let Some(occupancy) = self.occupancy
            && occupancy > 100
        {
            return Err(Error::InvalidInput(format!(
                "occupancy must be between 0 and 100, got {occupancy}"
            )));
        }
        if let Some(fare) = self.fare
            && (!fare.is_finite() || fare < 0.0)
        {
            return Err(Error::InvalidInput(format!(
                "fare must be a non-negative number, got {fare}"
            )));
        }
        Ok(())
    }
}

impl Simulator {
    /// Applies a telemetry report.
    ///
    /// A known vehicle is moved to the reported point of its route. An unknown
    /// one is created there, moving forward at `default_speed`.
    pub fn apply_telemetry(
        &mut self,
        update: TelemetryUpdate,
        default_speed: f64,
    ) -> Result<Vehicle, Error> {
        update.validate()?;

        if self.get(&update.vehicle_id).is_err() {
            let Some(line_id) = update.line_id.as_deref() else {
                return Err(Error::InvalidInput(format!(
                    "vehicle {} is not tracked and the report has no line id",
                    update.vehicle_id
                )));
            };
            self.add_at_position(
                update.vehicle_id.clone(),
                line_id,
                update.coordinates,
                default_speed,
                true,
            )?;
        }

        let new_route = match update.line_id.as_deref() {
            Some(line_id) if line_id != self.get(&update.vehicle_id)?.line_id => {
                Some((line_id.to_string(), self.geometry().get(line_id)?.polyline.clone()))
            }
            _ => None,
        };
        let nearest = {
            let line_id = match &new_route {
                Some((line_id, _)) => line_id.clone(),
                None => self.get(&update.vehicle_id)?.line_id.clone(),
            };
            self.geometry().nearest_station(update.coordinates, &line_id).ok()
        };

        let vehicle = self.get_mut(&update.vehicle_id)?;
        if let Some((line_id, route)) = new_route {
            debug!("Vehicle {} switched to line {line_id}", vehicle.id);
            vehicle.line_id = line_id;
            vehicle.route = route;
        }
        vehicle.place_at(update.coordinates);
        vehicle.nearest_station = nearest;
        if update.occupancy.is_some() {
            vehicle.occupancy = update.occupancy;
        }
        if update.fare.is_some() {
            vehicle.fare = update.fare;
        }
        vehicle.updated_at = Utc::now();
        Ok(vehicle.clone())
    }
}
