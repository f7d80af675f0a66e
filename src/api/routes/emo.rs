//! Emoticon endpoint.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

use crate::api::envelope::{emoticon_failed, failure, success_data, MSG_CONNECTION_FAILED};
use crate::api::server::AppState;
use crate::error::GatewayError;
use crate::gateway::{CommandOutcome, CommandRequest};

use super::mismatched_outcome;

/// GET /api/emo/{tag}
pub async fn show_emoticon(
    State(state): State<Arc<AppState>>,
    Path(tag): Path<String>,
) -> Json<Value> {
    match state.gateway.execute(CommandRequest::SetEmoticon(tag)).await {
        Ok(CommandOutcome::Emoticon(ack)) => success_data(json!({
            "emoticon": ack.glyph,
            "type": ack.tag,
        })),
        Ok(other) => mismatched_outcome("emoticon", &other),
        Err(GatewayError::Unavailable(_)) => failure(MSG_CONNECTION_FAILED),
        Err(e) => failure(emoticon_failed(e)),
    }
}
