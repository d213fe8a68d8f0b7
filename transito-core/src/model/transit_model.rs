use std::sync::Arc;

use crate::{Coordinate, Error, LineGeometryStore, TransitCatalog};

/// Reference data used by planning and simulation.
///
/// Immutable once built; the geometry store is shared with the simulator.
#[derive(Debug, Clone)]
pub struct TransitModel {
    pub catalog: TransitCatalog,
    pub geometry: Arc<LineGeometryStore>,
}

impl TransitModel {
    pub fn new(catalog: TransitCatalog, geometry: LineGeometryStore) -> Self {
        Self {
            catalog,
            geometry: Arc::new(geometry),
        }
    }

    pub fn stop_count(&self) -> usize {
        self.catalog.stops.len()
    }

    pub fn line_count(&self) -> usize {
        self.catalog.lines.len()
    }

    /// Path between two stops of a fixed-geometry line, following its polyline.
    ///
    /// The stop names must match station names of the line geometry.
    pub fn ride_path(
        &self,
        line_id: &str,
        from_stop: &str,
        to_stop: &str,
    ) -> Result<Vec<Coordinate>, Error> {
        let from = &self.catalog.stop(from_stop)?.name;
        let to = &self.catalog.stop(to_stop)?.name;
        let slice = self.geometry.segment_between(line_id, from, to)?;
        Ok(slice.coords().map(|&c| c.into()).collect())
    }
}
