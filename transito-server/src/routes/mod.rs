mod catalog;
mod metro;
mod telemetry;
mod trip_planner;

use axum::{
    BoxError, Json, Router,
    error_handling::HandleErrorLayer,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde::Serialize;
use serde_json::json;
use tower::{ServiceBuilder, limit::GlobalConcurrencyLimitLayer, timeout::TimeoutLayer};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::state::AppState;

pub use trip_planner::TripRequest;

/// Success envelope shared by every endpoint
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

pub(crate) fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data,
    })
}

pub fn create_router(state: AppState) -> Router {
    let timeout = state.config.request_timeout();
    let max_concurrent = state.config.max_concurrent_requests;

    Router::new()
        .route("/health", get(health))
        .route("/api/trip-planner", post(trip_planner::plan))
        .route("/api/trip-planner/nearby-stops", get(trip_planner::nearby_stops))
        .route("/api/routes", get(catalog::list_routes))
        .route("/api/routes/{route_id}", get(catalog::get_route))
        .route("/api/routes/{route_id}/vehicles", get(catalog::route_vehicles))
        .route("/api/metro/stations/{line_id}", get(metro::stations))
        .route("/api/metro/lines/{line_id}", get(metro::line))
        .route("/api/metro/nearest-station", get(metro::nearest_station))
        .route("/api/metro/vehicles", get(metro::list_vehicles))
        .route(
            "/api/metro/vehicles/add-between-stations",
            post(metro::add_between_stations),
        )
        .route("/api/metro/vehicles/add-at-position", post(metro::add_at_position))
        .route(
            "/api/metro/vehicles/{id}",
            get(metro::get_vehicle).delete(metro::remove_vehicle),
        )
        .route("/api/metro/vehicles/{id}/speed", put(metro::set_speed))
        .route("/api/metro/vehicles/{id}/stop", put(metro::stop_vehicle))
        .route("/api/metro/vehicles/{id}/resume", put(metro::resume_vehicle))
        .route("/api/vehicles/telemetry", post(telemetry::ingest))
        .route("/api/vehicles/route/{route_id}", get(catalog::route_vehicles))
        .route("/api/vehicles/type/{vehicle_type}", get(catalog::vehicles_by_type))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(timeout))
                .layer(GlobalConcurrencyLimitLayer::new(max_concurrent)),
        )
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let vehicles = state.simulator.read().await.len();
    Json(json!({
        "status": "ok",
        "stops": state.model.stop_count(),
        "lines": state.model.line_count(),
        "vehicles": vehicles,
    }))
}

async fn handle_middleware_error(err: BoxError) -> impl IntoResponse {
    let (status, message) = if err.is::<tower::timeout::error::Elapsed>() {
        (StatusCode::REQUEST_TIMEOUT, "request timed out".to_string())
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("unhandled internal error: {err}"),
        )
    };
    warn!("{message}");
    (
        status,
        Json(json!({
            "success": false,
            "error": status.canonical_reason().unwrap_or("Error"),
            "message": message,
        })),
    )
}
