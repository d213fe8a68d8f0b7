use serde::{Deserialize, Serialize};

use crate::{Error, TransportType};

/// Weight applied to a criterion whose priority flag is set
const PRIORITY_WEIGHT: f64 = 3.0;

/// User preferences for a single planning request.
///
/// Every field has a default, so a request may omit any subset of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TripPreferences {
    /// Longest single walking leg, in meters
    pub max_walking_distance: f64,
    pub transport_types: Vec<TransportType>,
    pub prioritize_fast_route: bool,
    pub prioritize_low_cost: bool,
    pub prioritize_low_occupancy: bool,
    pub max_transfers: usize,
}

impl Default for TripPreferences {
    fn default() -> Self {
        Self {
            max_walking_distance: 800.0,
            transport_types: vec![
                TransportType::Bus,
                TransportType::Metro,
                TransportType::Minibus,
                TransportType::Walk,
            ],
            prioritize_fast_route: true,
            prioritize_low_cost: false,
            prioritize_low_occupancy: false,
            max_transfers: 2,
        }
    }
}

/// Per-criterion multipliers derived from the priority flags
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Weights {
    pub time: f64,
    pub cost: f64,
    pub occupancy: f64,
}

impl TripPreferences {
    pub fn validate(&self) -> Result<(), Error> {
        if !self.max_walking_distance.is_finite() || self.max_walking_distance <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "maxWalkingDistance must be a positive number, got {}",
                self.max_walking_distance
            )));
        }
        if self.transport_types.is_empty() {
            return Err(Error::InvalidInput(
                "transportTypes must contain at least one mode".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether edges of the given kind may be used.
    ///
    /// Transfers are walked, so they follow the WALK setting.
    pub fn allows(&self, kind: TransportType) -> bool {
        match kind {
            TransportType::Transfer => self.transport_types.contains(&TransportType::Walk),
            other => self.transport_types.contains(&other),
        }
    }

    pub(crate) fn weights(&self) -> Weights {
        let weight = |flag: bool| if flag { PRIORITY_WEIGHT } else { 1.0 };
        Weights {
            time: weight(self.prioritize_fast_route),
            cost: weight(self.prioritize_low_cost),
            occupancy: weight(self.prioritize_low_occupancy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let prefs: TripPreferences =
            serde_json::from_str(r#"{"transportTypes": ["WALK", "METRO"], "maxTransfers": 0}"#)
                .unwrap();
        assert_eq!(prefs.max_walking_distance, 800.0);
        assert_eq!(prefs.max_transfers, 0);
        assert!(prefs.prioritize_fast_route);
        assert!(prefs.allows(TransportType::Transfer));
        assert!(!prefs.allows(TransportType::Bus));
    }

    #[test]
    fn rejects_bad_values() {
        let prefs = TripPreferences {
            max_walking_distance: -5.0,
            ..Default::default()
        };
        assert!(matches!(prefs.validate(), Err(Error::InvalidInput(_))));

        let prefs = TripPreferences {
            transport_types: vec![],
            ..Default::default()
        };
        assert!(prefs.validate().is_err());
    }

    #[test]
    fn flags_triple_their_weight() {
        let prefs = TripPreferences {
            prioritize_low_cost: true,
            ..Default::default()
        };
        let weights = prefs.weights();
        assert_eq!(weights.time, 3.0);
        assert_eq!(weights.cost, 3.0);
        assert_eq!(weights.occupancy, 1.0);
    }
}
