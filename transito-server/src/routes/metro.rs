//! Metro reference geometry and the simulated vehicle fleet

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use transito_core::{Coordinate, VehicleId, model::geometry::Station};

use super::ok;
use crate::{
    error::ApiError,
    extract::{ApiJson, ApiQuery},
    state::AppState,
};

/// Line used by the nearest-station lookup when none is given
const DEFAULT_METRO_LINE: &str = "METRO_L1";

pub async fn stations(
    State(state): State<AppState>,
    Path(line_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let line_id = state.resolve_line_id(&line_id);
    let stations = state.model.geometry.get(&line_id)?.stations().to_vec();
    Ok(ok(stations))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineView {
    line_id: String,
    name: Option<String>,
    points: Vec<Coordinate>,
    stations: Vec<Station>,
}

pub async fn line(
    State(state): State<AppState>,
    Path(line_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let line_id = state.resolve_line_id(&line_id);
    let geometry = state.model.geometry.get(&line_id)?;
    let name = state
        .model
        .catalog
        .line(&line_id)
        .ok()
        .map(|line| line.name.clone());
    Ok(ok(LineView {
        line_id,
        name,
        points: geometry.points(),
        stations: geometry.stations().to_vec(),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearestStationQuery {
    latitude: f64,
    longitude: f64,
    line_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NearestStationView {
    name: String,
    coordinates: Coordinate,
    /// meters
    distance: f64,
}

pub async fn nearest_station(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<NearestStationQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let location = Coordinate::new(query.latitude, query.longitude);
    location.validate()?;
    let line_id = state.resolve_line_id(query.line_id.as_deref().unwrap_or(DEFAULT_METRO_LINE));

    let geometry = &state.model.geometry;
    let nearest = geometry.nearest_station(location, &line_id)?;
    let coordinates = geometry.get(&line_id)?.station(&nearest.name)?.coordinates;
    Ok(ok(NearestStationView {
        name: nearest.name,
        coordinates,
        distance: nearest.distance,
    }))
}

pub async fn list_vehicles(State(state): State<AppState>) -> impl IntoResponse {
    ok(state.simulator.read().await.fleet_snapshot())
}

pub async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<VehicleId>,
) -> Result<impl IntoResponse, ApiError> {
    let vehicle = state.simulator.read().await.get(&id)?.clone();
    Ok(ok(vehicle))
}

fn generated_vehicle_id(line_id: &str) -> VehicleId {
    format!("metro_{line_id}_{}", Utc::now().timestamp_millis())
}

fn default_forward() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddBetweenStations {
    vehicle_id: Option<VehicleId>,
    line_id: String,
    start_station: String,
    end_station: String,
    /// km/h, server default when absent
    speed: Option<f64>,
    #[serde(default = "default_forward")]
    direction_forward: bool,
}

pub async fn add_between_stations(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AddBetweenStations>,
) -> Result<impl IntoResponse, ApiError> {
    let line_id = state.resolve_line_id(&request.line_id);
    let id = request
        .vehicle_id
        .unwrap_or_else(|| generated_vehicle_id(&request.line_id));
    let speed = request.speed.unwrap_or(state.config.default_vehicle_speed);

    let vehicle = state.simulator.write().await.add_between_stations(
        id,
        &line_id,
        &request.start_station,
        &request.end_station,
        speed,
        request.direction_forward,
    )?;
    Ok((StatusCode::CREATED, ok(vehicle)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddAtPosition {
    vehicle_id: Option<VehicleId>,
    line_id: String,
    position: Coordinate,
    speed: Option<f64>,
    #[serde(default = "default_forward")]
    direction_forward: bool,
}

pub async fn add_at_position(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AddAtPosition>,
) -> Result<impl IntoResponse, ApiError> {
    let line_id = state.resolve_line_id(&request.line_id);
    let id = request
        .vehicle_id
        .unwrap_or_else(|| generated_vehicle_id(&request.line_id));
    let speed = request.speed.unwrap_or(state.config.default_vehicle_speed);

    let vehicle = state.simulator.write().await.add_at_position(
        id,
        &line_id,
        request.position,
        speed,
        request.direction_forward,
    )?;
    Ok((StatusCode::CREATED, ok(vehicle)))
}

#[derive(Debug, Deserialize)]
pub struct SpeedRequest {
    speed: f64,
}

pub async fn set_speed(
    State(state): State<AppState>,
    Path(id): Path<VehicleId>,
    ApiJson(request): ApiJson<SpeedRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let vehicle = state
        .simulator
        .write()
        .await
        .set_speed(&id, request.speed)?;
    Ok(ok(vehicle))
}

pub async fn stop_vehicle(
    State(state): State<AppState>,
    Path(id): Path<VehicleId>,
) -> Result<impl IntoResponse, ApiError> {
    let vehicle = state.simulator.write().await.stop(&id)?;
    Ok(ok(vehicle))
}

pub async fn resume_vehicle(
    State(state): State<AppState>,
    Path(id): Path<VehicleId>,
) -> Result<impl IntoResponse, ApiError> {
    let vehicle = state.simulator.write().await.resume(&id)?;
    Ok(ok(vehicle))
}

pub async fn remove_vehicle(
    State(state): State<AppState>,
    Path(id): Path<VehicleId>,
) -> Result<impl IntoResponse, ApiError> {
    let vehicle = state.simulator.write().await.remove(&id)?;
    Ok(ok(vehicle))
}
