//! Catalog lines and the fleet grouped by line or mode

use std::str::FromStr;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Serialize;
use transito_core::{Line, Stop, TransportType, Vehicle};

use super::ok;
use crate::{error::ApiError, state::AppState};

pub async fn list_routes(State(state): State<AppState>) -> impl IntoResponse {
    ok(state.model.catalog.lines.clone())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteView {
    route: Line,
    /// Stops in traversal order
    stops: Vec<Stop>,
    /// Whether the line has a polyline for simulated vehicles
    has_geometry: bool,
}

pub async fn get_route(
    State(state): State<AppState>,
    Path(route_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let route_id = state.resolve_line_id(&route_id);
    let catalog = &state.model.catalog;
    let route = catalog.line(&route_id)?;
    let stops = route
        .stops
        .iter()
        .map(|id| catalog.stop(id).cloned())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ok(RouteView {
        route: route.clone(),
        stops,
        has_geometry: state.model.geometry.contains(&route_id),
    }))
}

/// Vehicles on one catalog line; unknown lines are 404, empty lines are `[]`
pub async fn route_vehicles(
    State(state): State<AppState>,
    Path(route_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let route_id = state.resolve_line_id(&route_id);
    state.model.catalog.line(&route_id)?;
    let vehicles = state.simulator.read().await.vehicles_on_line(&route_id);
    Ok(ok(vehicles))
}

pub async fn vehicles_by_type(
    State(state): State<AppState>,
    Path(vehicle_type): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let transport_type = TransportType::from_str(&vehicle_type)?;
    if !transport_type.is_ride() {
        return Err(ApiError::BadRequest(format!(
            "{transport_type} is not a vehicle type"
        )));
    }

    let catalog = &state.model.catalog;
    let vehicles: Vec<Vehicle> = state
        .simulator
        .read()
        .await
        .fleet_snapshot()
        .into_iter()
        .filter(|v| {
            catalog
                .line(&v.line_id)
                .is_ok_and(|line| line.transport_type == transport_type)
        })
        .collect();
    Ok(ok(vehicles))
}
