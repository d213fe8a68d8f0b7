use std::sync::Arc;

use chrono::Utc;
use hashbrown::HashMap;
use log::{debug, error, info, warn};

use super::vehicle::{Vehicle, VehicleStatus, validate_speed};
use crate::{Coordinate, Error, LineGeometryStore, VehicleId};

/// Registry of live vehicles and the clock that moves them.
///
/// Each instance is independent; callers decide how to share it.
#[derive(Debug, Clone)]
pub struct Simulator {
    geometry: Arc<LineGeometryStore>,
    vehicles: HashMap<VehicleId, Vehicle>,
}

impl Simulator {
    pub fn new(geometry: Arc<LineGeometryStore>) -> Self {
        Self {
            geometry,
            vehicles: HashMap::new(),
        }
    }

    pub fn geometry(&self) -> &LineGeometryStore {
        &self.geometry
    }

    /// Adds a vehicle travelling the stretch of `line_id` between two stations
    pub fn add_between_stations(
        &mut self,
        id: impl Into<VehicleId>,
        line_id: &str,
        start_station: &str,
        end_station: &str,
        speed: f64,
        direction_forward: bool,
    ) -> Result<Vehicle, Error> {
        validate_speed(speed)?;
        let route = self
            .geometry
            .segment_between(line_id, start_station, end_station)?;
        if route.0.len() < 2 {
            return Err(Error::InvalidInput(format!(
                "stations {start_station} and {end_station} do not delimit a segment on line {line_id}"
            )));
        }

        let vehicle = Vehicle::new(
            id.into(),
            line_id.to_string(),
            route,
            speed,
            direction_forward,
        );
        Ok(self.insert(vehicle))
    }

    /// Adds a vehicle on the full polyline of `line_id`, at the point closest
    /// to `location`
    pub fn add_at_position(
        &mut self,
        id: impl Into<VehicleId>,
        line_id: &str,
        location: Coordinate,
        speed: f64,
        direction_forward: bool,
    ) -> Result<Vehicle, Error> {
        validate_speed(speed)?;
        location.validate()?;
        let route = self.geometry.get(line_id)?.polyline.clone();

        let mut vehicle =
            Vehicle::new(id.into(), line_id.to_string(), route, speed, direction_forward);
        vehicle.place_at(location);
        Ok(self.insert(vehicle))
    }

    fn insert(&mut self, mut vehicle: Vehicle) -> Vehicle {
        vehicle.nearest_station = self
            .geometry
            .nearest_station(vehicle.position, &vehicle.line_id)
            .ok();
        if self.vehicles.contains_key(&vehicle.id) {
            warn!("Vehicle {} already exists, replacing it", vehicle.id);
        }
        info!("Vehicle {} added on line {}", vehicle.id, vehicle.line_id);
        self.vehicles.insert(vehicle.id.clone(), vehicle.clone());
        vehicle
    }

    pub fn get(&self, id: &str) -> Result<&Vehicle, Error> {
        self.vehicles
            .get(id)
            .ok_or_else(|| Error::VehicleNotFound(id.to_string()))
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Result<&mut Vehicle, Error> {
        self.vehicles
            .get_mut(id)
            .ok_or_else(|| Error::VehicleNotFound(id.to_string()))
    }

    /// All vehicles ordered by id
    pub fn list_all(&self) -> Vec<&Vehicle> {
        let mut vehicles: Vec<&Vehicle> = self.vehicles.values().collect();
        vehicles.sort_unstable_by(|a, b| a.id.cmp(&b.id));
        vehicles
    }

    /// Owned copy of every vehicle, for readers that must not hold the registry
    pub fn fleet_snapshot(&self) -> Vec<Vehicle> {
        self.list_all().into_iter().cloned().collect()
    }

    /// Owned copies of the vehicles running on `line_id`, ordered by id
    pub fn vehicles_on_line(&self, line_id: &str) -> Vec<Vehicle> {
        self.list_all()
            .into_iter()
            .filter(|v| v.line_id == line_id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn set_speed(&mut self, id: &str, speed: f64) -> Result<Vehicle, Error> {
        validate_speed(speed)?;
        let vehicle = self.get_mut(id)?;
        vehicle.speed = speed;
        vehicle.updated_at = Utc::now();
        Ok(vehicle.clone())
    }

    pub fn stop(&mut self, id: &str) -> Result<Vehicle, Error> {
        self.set_status(id, VehicleStatus::Stopped)
    }

    pub fn resume(&mut self, id: &str) -> Result<Vehicle, Error> {
        self.set_status(id, VehicleStatus::Active)
    }

    fn set_status(&mut self, id: &str, status: VehicleStatus) -> Result<Vehicle, Error> {
        let vehicle = self.get_mut(id)?;
        vehicle.status = status;
        vehicle.updated_at = Utc::now();
        debug!("Vehicle {id} is now {status:?}");
        Ok(vehicle.clone())
    }

    pub fn remove(&mut self, id: &str) -> Result<Vehicle, Error> {
        let vehicle = self
            .vehicles
            .remove(id)
            .ok_or_else(|| Error::VehicleNotFound(id.to_string()))?;
        info!("Vehicle {id} removed");
        Ok(vehicle)
    }

    /// Advances every active vehicle by `elapsed_seconds` and returns the
    /// updated records, ordered by id.
    ///
    /// A vehicle that fails to move is logged and left untouched.
    pub fn tick(&mut self, elapsed_seconds: f64) -> Vec<Vehicle> {
        if !elapsed_seconds.is_finite() || elapsed_seconds <= 0.0 {
            warn!("Ignoring tick with elapsed time {elapsed_seconds}");
            return Vec::new();
        }

        let now = Utc::now();
        let mut updated = Vec::new();
        for vehicle in self.vehicles.values_mut() {
            if vehicle.status != VehicleStatus::Active {
                continue;
            }
            let meters = vehicle.speed / 3.6 * elapsed_seconds;
            if let Err(e) = vehicle.advance(meters) {
                error!("Failed to move vehicle {}: {e}", vehicle.id);
                continue;
            }
            vehicle.nearest_station = self
                .geometry
                .nearest_station(vehicle.position, &vehicle.line_id)
                .ok();
            vehicle.updated_at = now;
            updated.push(vehicle.clone());
        }

        updated.sort_unstable_by(|a, b| a.id.cmp(&b.id));
        updated
    }
}

#[cfg(test)]
mod tests {
    use geo::line_string;

    use super::*;
    use crate::model::{LineGeometry, Station};

    fn store() -> Arc<LineGeometryStore> {
        let polyline = line_string![
            (x: -100.0, y: 25.0),
            (x: -100.01, y: 25.0),
            (x: -100.02, y: 25.0),
        ];
        let stations = ["Norte", "Centro", "Sur"]
            .into_iter()
            .enumerate()
            .map(|(index, name)| Station {
                name: name.into(),
                index,
                coordinates: polyline.0[index].into(),
            })
            .collect();
        Arc::new(LineGeometryStore::new([
            LineGeometry::new("L", polyline, stations).unwrap()
        ]))
    }

    #[test]
    fn filters_fleet_by_line() {
        let base = store();
        let line = base.get("L").unwrap();
        let other = LineGeometry::new("M", line.polyline.clone(), line.stations().to_vec()).unwrap();
        let mut sim = Simulator::new(Arc::new(LineGeometryStore::new([line.clone(), other])));

        sim.add_between_stations("b", "L", "Norte", "Sur", 30.0, true).unwrap();
        sim.add_between_stations("a", "L", "Sur", "Norte", 30.0, true).unwrap();
        sim.add_between_stations("c", "M", "Norte", "Sur", 30.0, true).unwrap();

        let ids: Vec<_> = sim.vehicles_on_line("L").into_iter().map(|v| v.id).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(sim.vehicles_on_line("M").len(), 1);
        assert!(sim.vehicles_on_line("nope").is_empty());
    }

    #[test]
    fn lifecycle_operations_report_unknown_ids() {
        let mut sim = Simulator::new(store());
        assert!(sim.stop("ghost").unwrap_err().is_not_found());
        assert!(sim.resume("ghost").unwrap_err().is_not_found());
        assert!(sim.set_speed("ghost", 10.0).unwrap_err().is_not_found());
        assert!(sim.remove("ghost").unwrap_err().is_not_found());
        assert!(sim.get("ghost").unwrap_err().is_not_found());
    }

    #[test]
    fn add_between_stations_starts_at_first_station() {
        let mut sim = Simulator::new(store());
        let v = sim
            .add_between_stations("v1", "L", "Sur", "Norte", 30.0, true)
            .unwrap();
        assert_eq!(v.segment_index, 0);
        assert_eq!(v.progress, 0.0);
        assert_eq!(v.status, VehicleStatus::Active);
        assert_eq!(v.position, Coordinate::new(25.0, -100.02));
        assert_eq!(v.nearest_station.unwrap().name, "Sur");
    }

    #[test]
    fn same_station_twice_is_invalid() {
        let mut sim = Simulator::new(store());
        let err = sim
            .add_between_stations("v1", "L", "Centro", "Centro", 30.0, true)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        let err = sim
            .add_between_stations("v1", "L", "Centro", "Nowhere", 30.0, true)
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn add_at_position_projects_onto_polyline() {
        let mut sim = Simulator::new(store());
        let v = sim
            .add_at_position("v1", "L", Coordinate::new(25.002, -100.005), 30.0, true)
            .unwrap();
        assert_eq!(v.segment_index, 0);
        assert!((v.progress - 0.5).abs() < 1e-9);
        assert!((v.position.latitude - 25.0).abs() < 1e-12);
    }

    #[test]
    fn list_is_sorted_and_remove_drops() {
        let mut sim = Simulator::new(store());
        for id in ["c", "a", "b"] {
            sim.add_between_stations(id, "L", "Norte", "Sur", 30.0, true)
                .unwrap();
        }
        let ids: Vec<_> = sim.list_all().iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);

        sim.remove("b").unwrap();
        assert_eq!(sim.len(), 2);
    }

    #[test]
    fn tick_skips_stopped_vehicles() {
        let mut sim = Simulator::new(store());
        sim.add_between_stations("moving", "L", "Norte", "Sur", 36.0, true)
            .unwrap();
        sim.add_between_stations("held", "L", "Norte", "Sur", 36.0, true)
            .unwrap();
        sim.stop("held").unwrap();

        let updated = sim.tick(1.0);
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].id, "moving");
        assert!(updated[0].progress > 0.0);
        assert_eq!(sim.get("held").unwrap().progress, 0.0);
    }

    #[test]
    fn rejects_negative_speed() {
        let mut sim = Simulator::new(store());
        let err = sim
            .add_between_stations("v", "L", "Norte", "Sur", -5.0, true)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
