//! Route handlers.
//!
//! Every handler builds one [`CommandRequest`](crate::gateway::CommandRequest)
//! and runs it through [`CommandGateway::execute`](crate::gateway::CommandGateway::execute).

pub mod control;
pub mod emo;
pub mod health;
pub mod sensor;

use axum::Json;
use serde_json::Value;
use tracing::error;

use crate::api::envelope::{failure, operation_failed};
use crate::gateway::CommandOutcome;

/// The gateway answered with a different outcome than the request implies.
pub(crate) fn mismatched_outcome(expected: &str, outcome: &CommandOutcome) -> Json<Value> {
    error!(expected, outcome = ?outcome, "Gateway outcome does not match the request");
    failure(operation_failed("unexpected gateway outcome"))
}
