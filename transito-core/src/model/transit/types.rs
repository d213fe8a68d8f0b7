use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Coordinate, Error, LineId, Minutes, StopId};

/// Mode of a graph edge or a line.
///
/// `Walk` and `Transfer` only ever describe edges, never lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransportType {
    Walk,
    Bus,
    Minibus,
    Metro,
    Transfer,
}

impl TransportType {
    /// Whether riding this mode means boarding a vehicle
    pub fn is_ride(self) -> bool {
        matches!(
            self,
            TransportType::Bus | TransportType::Minibus | TransportType::Metro
        )
    }

    /// Walking legs, including walks between stops
    pub fn is_on_foot(self) -> bool {
        matches!(self, TransportType::Walk | TransportType::Transfer)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransportType::Walk => "WALK",
            TransportType::Bus => "BUS",
            TransportType::Minibus => "MINIBUS",
            TransportType::Metro => "METRO",
            TransportType::Transfer => "TRANSFER",
        }
    }
}

impl FromStr for TransportType {
    type Err = Error;

    /// Case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "WALK" => Ok(TransportType::Walk),
            "BUS" => Ok(TransportType::Bus),
            "MINIBUS" => Ok(TransportType::Minibus),
            "METRO" => Ok(TransportType::Metro),
            "TRANSFER" => Ok(TransportType::Transfer),
            other => Err(Error::InvalidInput(format!("unknown transport type '{other}'"))),
        }
    }
}

impl fmt::Display for TransportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transit stop or station
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    pub id: StopId,
    pub name: String,
    pub coordinates: Coordinate,
    /// Lines serving this stop, in catalog order
    pub lines: Vec<LineId>,
    pub transport_type: TransportType,
}

/// Line (route) with a fixed stop sequence
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub id: LineId,
    /// Display name, e.g. "Línea 1"
    pub name: String,
    pub transport_type: TransportType,
    /// Stop ids in traversal order
    pub stops: Vec<StopId>,
    /// Flat fare, independent of distance
    pub fare: f64,
    pub minutes_between_stops: Minutes,
    /// Scheduled time between consecutive departures
    pub headway: Minutes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_transport_type_ignoring_case() {
        assert_eq!("metro".parse::<TransportType>().unwrap(), TransportType::Metro);
        assert_eq!("Bus".parse::<TransportType>().unwrap(), TransportType::Bus);
        assert!("tram".parse::<TransportType>().is_err());
    }

    #[test]
    fn walks_and_transfers_are_on_foot() {
        assert!(TransportType::Walk.is_on_foot());
        assert!(TransportType::Transfer.is_on_foot());
        assert!(!TransportType::Metro.is_on_foot());
        assert!(!TransportType::Transfer.is_ride());
    }
}
