use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};
use transito_core::{Simulator, TransitModel};

use crate::config::ServerConfig;

/// Demo fleet: (vehicle id, line, start station, end station, forward)
const DEMO_VEHICLES: &[(&str, &str, &str, &str, bool)] = &[
    ("metro_L1_001", "METRO_L1", "Talleres", "Exposición", true),
    ("metro_L1_002", "METRO_L1", "Talleres", "Exposición", false),
    ("metro_L2_001", "METRO_L2", "General Anaya", "Sendero", true),
];

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<TransitModel>,
    pub simulator: Arc<RwLock<Simulator>>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(model: TransitModel, config: ServerConfig) -> Self {
        let simulator = Simulator::new(Arc::clone(&model.geometry));
        Self {
            model: Arc::new(model),
            simulator: Arc::new(RwLock::new(simulator)),
            config: Arc::new(config),
        }
    }

    /// Accepts both full line ids and the short `L1`/`L2` metro aliases
    pub fn resolve_line_id(&self, line_id: &str) -> String {
        let metro = format!("METRO_{line_id}");
        if !self.model.geometry.contains(line_id) && self.model.geometry.contains(&metro) {
            metro
        } else {
            line_id.to_string()
        }
    }

    /// Puts a few metro cars on the network. Returns how many were added.
    pub async fn seed_demo_vehicles(&self) -> usize {
        let speed = self.config.default_vehicle_speed;
        let mut simulator = self.simulator.write().await;
        let mut added = 0;
        for &(id, line, start, end, forward) in DEMO_VEHICLES {
            match simulator.add_between_stations(id, line, start, end, speed, forward) {
                Ok(_) => added += 1,
                Err(e) => warn!("Skipping demo vehicle {id}: {e}"),
            }
        }
        info!("Seeded {added} demo vehicles");
        added
    }
}

#[cfg(test)]
mod tests {
    use transito_core::loading::{TransitModelConfig, create_transit_model};

    use super::*;

    fn state() -> AppState {
        let model = create_transit_model(&TransitModelConfig::default()).unwrap();
        AppState::new(model, ServerConfig::default())
    }

    #[test]
    fn short_metro_ids_resolve() {
        let state = state();
        assert_eq!(state.resolve_line_id("L1"), "METRO_L1");
        assert_eq!(state.resolve_line_id("METRO_L2"), "METRO_L2");
        assert_eq!(state.resolve_line_id("ROUTE_1"), "ROUTE_1");
    }

    #[tokio::test]
    async fn demo_fleet_is_seeded() {
        let state = state();
        assert_eq!(state.seed_demo_vehicles().await, DEMO_VEHICLES.len());
        assert_eq!(state.simulator.read().await.len(), DEMO_VEHICLES.len());
    }
}
