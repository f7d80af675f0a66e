//! Sensor read endpoints.
//!
//! A failure in the middle of a read still answers `success: true` with the
//! cached values; only an unopenable channel is reported as a failure.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use tracing::warn;

use crate::api::envelope::{failure, success_data, MSG_CONNECTION_FAILED};
use crate::api::server::AppState;
use crate::error::GatewayError;
use crate::gateway::{CommandOutcome, CommandRequest, Readings, SensorQuery};

use super::mismatched_outcome;

async fn refresh(state: &AppState, query: SensorQuery) -> Result<Readings, Json<Value>> {
    match state.gateway.execute(CommandRequest::Read(query)).await {
        Ok(CommandOutcome::Readings(readings)) => Ok(readings),
        Ok(other) => Err(mismatched_outcome("readings", &other)),
        Err(GatewayError::IoFailure(e)) => {
            warn!(
                query = query.as_str(),
                error = %e,
                "Sensor read failed mid-cycle, serving cached values"
            );
            Ok(state.gateway.readings())
        }
        Err(_) => Err(failure(MSG_CONNECTION_FAILED)),
    }
}

/// GET /api/sensor/temperature
pub async fn get_temperature(State(state): State<Arc<AppState>>) -> Json<Value> {
    match refresh(&state, SensorQuery::Temperature).await {
        Ok(r) => success_data(json!({ "temperature": r.temperature })),
        Err(resp) => resp,
    }
}

/// GET /api/sensor/humidity
pub async fn get_humidity(State(state): State<Arc<AppState>>) -> Json<Value> {
    match refresh(&state, SensorQuery::Humidity).await {
        Ok(r) => success_data(json!({ "humidity": r.humidity })),
        Err(resp) => resp,
    }
}

/// GET /api/sensor/temp-humidity
pub async fn get_temp_humidity(State(state): State<Arc<AppState>>) -> Json<Value> {
    match refresh(&state, SensorQuery::TempHumidity).await {
        Ok(r) => success_data(json!({
            "temperature": r.temperature,
            "humidity": r.humidity,
        })),
        Err(resp) => resp,
    }
}

/// GET /api/sensor/illumination
pub async fn get_illumination(State(state): State<Arc<AppState>>) -> Json<Value> {
    match refresh(&state, SensorQuery::Illumination).await {
        Ok(r) => success_data(json!({ "illumination": r.illumination })),
        Err(resp) => resp,
    }
}

/// GET /api/sensor/infrared
pub async fn get_infrared(State(state): State<Arc<AppState>>) -> Json<Value> {
    match refresh(&state, SensorQuery::Infrared).await {
        Ok(r) => success_data(json!({ "infrared": r.infrared })),
        Err(resp) => resp,
    }
}

/// GET /api/sensor/all
pub async fn get_all(State(state): State<Arc<AppState>>) -> Json<Value> {
    match refresh(&state, SensorQuery::All).await {
        Ok(r) => success_data(r),
        Err(resp) => resp,
    }
}
