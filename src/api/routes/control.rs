//! Actuator endpoints: LED bank and LCD text.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

use crate::api::envelope::{
    failure, lcd_text_set, operation_failed, MSG_CONNECTION_FAILED, MSG_INVALID_LED_STATUS,
    MSG_LED_OFF, MSG_LED_ON,
};
use crate::api::server::AppState;
use crate::error::GatewayError;
use crate::gateway::{CommandOutcome, CommandRequest};
use crate::hardware::LedState;

use super::mismatched_outcome;

fn actuator_failure(err: GatewayError) -> Json<Value> {
    match err {
        GatewayError::Unavailable(_) => failure(MSG_CONNECTION_FAILED),
        GatewayError::Validation(_) => failure(MSG_INVALID_LED_STATUS),
        GatewayError::IoFailure(e) => failure(operation_failed(e)),
    }
}

/// GET /api/control/led/{status}
pub async fn control_led(
    State(state): State<Arc<AppState>>,
    Path(status): Path<String>,
) -> Json<Value> {
    match state.gateway.execute(CommandRequest::SetLed(status)).await {
        Ok(CommandOutcome::Led(ack)) => {
            let message = match ack.requested {
                LedState::On => MSG_LED_ON,
                LedState::Off => MSG_LED_OFF,
            };
            Json(json!({
                "success": true,
                "message": message,
                "status": ack.status,
            }))
        }
        Ok(other) => mismatched_outcome("led", &other),
        Err(e) => actuator_failure(e),
    }
}

/// GET /api/control/lcdtext/{content}
pub async fn control_lcd_text(
    State(state): State<Arc<AppState>>,
    Path(content): Path<String>,
) -> Json<Value> {
    match state.gateway.execute(CommandRequest::SetLcdText(content)).await {
        Ok(CommandOutcome::Lcd(ack)) => Json(json!({
            "success": true,
            "message": lcd_text_set(&ack.text),
            "transliterated": ack.transliterated,
        })),
        Ok(other) => mismatched_outcome("lcd", &other),
        Err(e) => actuator_failure(e),
    }
}
