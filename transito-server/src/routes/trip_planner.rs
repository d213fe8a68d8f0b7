use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use transito_core::{Coordinate, Stop, TripPreferences, plan_trip};

use super::ok;
use crate::{
    error::ApiError,
    extract::{ApiJson, ApiQuery},
    state::AppState,
};

/// Default radius for the nearby-stops endpoint, meters
const DEFAULT_NEARBY_RADIUS_M: f64 = 800.0;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRequest {
    pub origin: Coordinate,
    pub destination: Coordinate,
    #[serde(default)]
    pub preferences: TripPreferences,
}

#[derive(Debug, Deserialize)]
pub struct PlanQuery {
    /// `json` (default) or `geojson`
    format: Option<String>,
}

pub async fn plan(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PlanQuery>,
    ApiJson(request): ApiJson<TripRequest>,
) -> Result<Response, ApiError> {
    let format = query.format.as_deref().unwrap_or("json");
    if !matches!(format, "json" | "geojson") {
        return Err(ApiError::BadRequest(format!(
            "unknown format '{format}', expected json or geojson"
        )));
    }

    // Plan on a copy of the fleet so the tick is never blocked by a search
    let fleet = state.simulator.read().await.fleet_snapshot();
    let model = Arc::clone(&state.model);
    let planned = tokio::task::spawn_blocking(move || {
        plan_trip(
            &model,
            &fleet,
            request.origin,
            request.destination,
            &request.preferences,
        )
    })
    .await
    .map_err(|e| ApiError::Internal(format!("planning task failed: {e}")))??;

    let Some(itinerary) = planned else {
        return Err(ApiError::NotFound(
            "No route found between origin and destination".to_string(),
        ));
    };
    debug!(
        segments = itinerary.segments.len(),
        total_time = itinerary.total_time,
        "Trip planned"
    );

    if format == "geojson" {
        Ok(Json(itinerary.to_geojson()?).into_response())
    } else {
        Ok(ok(itinerary).into_response())
    }
}

#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    latitude: f64,
    longitude: f64,
    radius: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct NearbyStopView {
    #[serde(flatten)]
    stop: Stop,
    /// meters
    distance: f64,
}

pub async fn nearby_stops(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<NearbyQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let location = Coordinate::new(query.latitude, query.longitude);
    location.validate()?;
    let radius = query.radius.unwrap_or(DEFAULT_NEARBY_RADIUS_M);
    if !radius.is_finite() || radius <= 0.0 {
        return Err(ApiError::BadRequest(format!(
            "radius must be a positive number, got {radius}"
        )));
    }

    let stops: Vec<NearbyStopView> = state
        .model
        .catalog
        .nearby_stops(location, radius)
        .into_iter()
        .map(|nearby| NearbyStopView {
            stop: nearby.stop.clone(),
            distance: nearby.distance,
        })
        .collect();
    Ok(ok(stops))
}
