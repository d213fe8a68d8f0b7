use geo::{Coord, LineString};
use log::{info, warn};

use super::config::TransitModelConfig;
use super::raw_types::{GeometryRecord, LineRecord, ReferenceData};
use crate::{
    Coordinate, Error, Line, LineGeometry, LineGeometryStore, Stop, TransitCatalog, TransitModel,
    model::Station,
};

/// Creates a transit model based on the provided configuration
///
/// # Errors
///
/// Returns an error if the reference data cannot be read or is inconsistent
pub fn create_transit_model(config: &TransitModelConfig) -> Result<TransitModel, Error> {
    let reference = match &config.data_path {
        Some(path) => {
            info!("Loading reference data from {}", path.display());
            ReferenceData::from_path(path)?
        }
        None => {
            info!("Loading built-in reference data");
            ReferenceData::builtin()?
        }
    };

    transit_model_from_reference(reference)
}

/// Validates reference data and builds the catalog and geometry store
pub fn transit_model_from_reference(reference: ReferenceData) -> Result<TransitModel, Error> {
    let ReferenceData {
        stops,
        lines,
        geometries,
    } = reference;

    for stop in &stops {
        stop.coordinates.validate().map_err(|e| {
            Error::InvalidData(format!("stop {} has invalid coordinates: {e}", stop.id))
        })?;
    }
    for line in &lines {
        validate_line(line)?;
    }

    let stops = stops
        .into_iter()
        .map(|record| Stop {
            id: record.id,
            name: record.name,
            coordinates: record.coordinates,
            lines: Vec::new(), // Filled in by the catalog
            transport_type: record.transport_type,
        })
        .collect();

    let lines = lines
        .into_iter()
        .map(|record| Line {
            id: record.id,
            name: record.name,
            transport_type: record.transport_type,
            stops: record.stops,
            fare: record.fare,
            minutes_between_stops: record.minutes_between_stops,
            headway: record.headway,
        })
        .collect();

    let catalog = TransitCatalog::new(stops, lines)?;

    let geometries = geometries
        .into_iter()
        .map(line_geometry_from_record)
        .collect::<Result<Vec<_>, _>>()?;

    for geometry in &geometries {
        if catalog.line(&geometry.line_id).is_err() {
            warn!(
                "Geometry for line {} has no matching line in the catalog",
                geometry.line_id
            );
        }
    }

    let model = TransitModel::new(catalog, LineGeometryStore::new(geometries));
    info!(
        "Transit model created with {} stops, {} lines and {} line geometries",
        model.stop_count(),
        model.line_count(),
        model.geometry.line_ids().len()
    );
    Ok(model)
}

fn validate_line(line: &LineRecord) -> Result<(), Error> {
    let numbers = [
        ("fare", line.fare),
        ("minutesBetweenStops", line.minutes_between_stops),
        ("headway", line.headway),
    ];
    for (field, value) in numbers {
        if !value.is_finite() || value < 0.0 {
            return Err(Error::InvalidData(format!(
                "line {} has invalid {field}: {value}",
                line.id
            )));
        }
    }
    if line.stops.is_empty() {
        return Err(Error::InvalidData(format!("line {} has no stops", line.id)));
    }
    Ok(())
}

fn line_geometry_from_record(record: GeometryRecord) -> Result<LineGeometry, Error> {
    let coords: Vec<Coord<f64>> = record.points.iter().map(|&p| p.into()).collect();

    let stations = record
        .stations
        .into_iter()
        .map(|station| {
            let coordinates: Coordinate =
                record.points.get(station.index).copied().ok_or_else(|| {
                    Error::InvalidData(format!(
                        "station {} of line {} points outside the polyline",
                        station.name, record.line_id
                    ))
                })?;
            Ok(Station {
                name: station.name,
                index: station.index,
                coordinates,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    LineGeometry::new(record.line_id, LineString::new(coords), stations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_network_loads() {
        let model = create_transit_model(&TransitModelConfig::default()).unwrap();

        assert_eq!(model.line_count(), 5);
        let line1 = model.catalog.line("METRO_L1").unwrap();
        assert_eq!(line1.stops.len(), 19);

        let talleres = model.catalog.stop("stop_talleres").unwrap();
        assert_eq!(talleres.lines, vec!["METRO_L1".to_string()]);

        let macroplaza = model.catalog.stop("stop_macroplaza").unwrap();
        assert_eq!(macroplaza.lines, vec!["ROUTE_1".to_string(), "ROUTE_17".to_string()]);

        let geometry = model.geometry.get("METRO_L1").unwrap();
        assert_eq!(geometry.stations().len(), 19);
        assert_eq!(model.geometry.line_ids(), ["METRO_L1", "METRO_L2"]);
    }

    #[test]
    fn rejects_single_point_polyline() {
        let json = r#"{
            "stops": [{"id": "a", "name": "A", "coordinates": {"latitude": 1.0, "longitude": 1.0}, "transportType": "METRO"}],
            "lines": [{"id": "L", "name": "L", "transportType": "METRO", "stops": ["a"], "fare": 1.0, "minutesBetweenStops": 2.0, "headway": 5.0}],
            "geometries": [{"lineId": "L", "points": [{"latitude": 1.0, "longitude": 1.0}], "stations": []}]
        }"#;
        let reference = ReferenceData::from_json(json).unwrap();
        assert!(matches!(
            transit_model_from_reference(reference),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn rejects_walk_line() {
        let json = r#"{
            "stops": [{"id": "a", "name": "A", "coordinates": {"latitude": 1.0, "longitude": 1.0}, "transportType": "BUS"}],
            "lines": [{"id": "L", "name": "L", "transportType": "WALK", "stops": ["a"], "fare": 0.0, "minutesBetweenStops": 2.0, "headway": 5.0}]
        }"#;
        let reference = ReferenceData::from_json(json).unwrap();
        assert!(transit_model_from_reference(reference).is_err());
    }

    #[test]
    fn rejects_unknown_stop_reference() {
        let json = r#"{
            "stops": [],
            "lines": [{"id": "L", "name": "L", "transportType": "BUS", "stops": ["ghost"], "fare": 0.0, "minutesBetweenStops": 2.0, "headway": 5.0}]
        }"#;
        let reference = ReferenceData::from_json(json).unwrap();
        assert!(matches!(
            transit_model_from_reference(reference),
            Err(Error::InvalidData(_))
        ));
    }
}
