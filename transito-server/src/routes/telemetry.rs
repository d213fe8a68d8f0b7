use axum::{extract::State, response::IntoResponse};
use transito_core::TelemetryUpdate;

use super::ok;
use crate::{error::ApiError, extract::ApiJson, state::AppState};

/// Position report from a vehicle; creates the vehicle on first contact
pub async fn ingest(
    State(state): State<AppState>,
    ApiJson(mut update): ApiJson<TelemetryUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    update.line_id = update.line_id.map(|id| state.resolve_line_id(&id));
    let vehicle = state
        .simulator
        .write()
        .await
        .apply_telemetry(update, state.config.default_vehicle_speed)?;
    Ok(ok(vehicle))
}
