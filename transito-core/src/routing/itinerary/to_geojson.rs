use geo::{Coord, LineString};
use geojson::{Feature, FeatureCollection, Geometry, Value as GeoJsonValue};
use serde_json::json;

use super::{Itinerary, Segment};
use crate::Error;

impl Itinerary {
    /// Converts the itinerary to a `GeoJSON` `FeatureCollection`, one feature per segment
    pub fn to_geojson(&self) -> Result<FeatureCollection, Error> {
        let features = self
            .segments
            .iter()
            .enumerate()
            .map(|(idx, segment)| segment_feature(idx, segment))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FeatureCollection {
            features,
            bbox: None,
            foreign_members: None,
        })
    }

    pub fn to_geojson_string(&self) -> Result<String, Error> {
        serde_json::to_string(&self.to_geojson()?).map_err(|e| Error::GeoJsonError(e.to_string()))
    }
}

fn segment_feature(leg_idx: usize, segment: &Segment) -> Result<Feature, Error> {
    let coords: Vec<Coord<f64>> = segment.path.iter().map(|&c| c.into()).collect();
    let geometry = Geometry::new(GeoJsonValue::from(&LineString::new(coords)));

    let value = json!({
        "type": "Feature",
        "geometry": geometry,
        "properties": {
            "leg_type": segment.kind,
            "leg_index": leg_idx,
            "route_id": segment.route_id,
            "route_name": segment.route_name,
            "from_name": segment.from_name,
            "to_name": segment.to_name,
            "time": segment.time,
            "wait_time": segment.wait_time,
            "distance": segment.distance,
            "fare": segment.fare,
            "description": segment.description,
        }
    });

    Feature::from_json_value(value).map_err(|e| Error::GeoJsonError(e.to_string()))
}
