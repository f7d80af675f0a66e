//! Tool dispatch against the HTTP surface.
//!
//! A dispatcher never fails: transport errors, non-2xx statuses and unknown
//! tool names all come back as a `{"success": false, "error": ...}` value that
//! is handed to the model as the tool result.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::{Result, SenseError};

use super::catalog;

/// Executes one catalog tool and returns its JSON result.
#[async_trait]
pub trait ToolDispatcher: Send + Sync {
    async fn dispatch(&self, tool_name: &str) -> Value;
}

/// Result returned for a tool name the catalog does not know.
pub fn unknown_tool(name: &str) -> Value {
    json!({"success": false, "error": format!("未知功能: {}", name)})
}

fn dispatch_error(err: impl std::fmt::Display) -> Value {
    json!({"success": false, "error": err.to_string()})
}

/// Dispatcher issuing `GET {base_url}{endpoint}` for each tool.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use zeptosense::agent::{HttpDispatcher, ToolDispatcher};
///
/// # tokio_test::block_on(async {
/// let dispatcher = HttpDispatcher::new("http://localhost:5000", Duration::from_secs(5)).unwrap();
///
/// // Names outside the catalog never reach the network.
/// let result = dispatcher.dispatch("make_coffee").await;
/// assert_eq!(result["success"], false);
/// assert_eq!(result["error"], "未知功能: make_coffee");
/// # });
/// ```
pub struct HttpDispatcher {
    base_url: String,
    client: Client,
}

impl HttpDispatcher {
    /// Create a dispatcher with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SenseError::Dispatch(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: &str, client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, endpoint: &str) -> std::result::Result<Value, reqwest::Error> {
        self.client
            .get(format!("{}{}", self.base_url, endpoint))
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await
    }
}

#[async_trait]
impl ToolDispatcher for HttpDispatcher {
    async fn dispatch(&self, tool_name: &str) -> Value {
        let Some(spec) = catalog::find(tool_name) else {
            warn!(tool = %tool_name, "Model selected a tool outside the catalog");
            return unknown_tool(tool_name);
        };

        let start = Instant::now();
        match self.get(spec.endpoint).await {
            Ok(value) => {
                debug!(
                    tool = %tool_name,
                    endpoint = %spec.endpoint,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Tool dispatched"
                );
                value
            }
            Err(e) => {
                warn!(tool = %tool_name, endpoint = %spec.endpoint, error = %e, "Tool dispatch failed");
                dispatch_error(e)
            }
        }
    }
}
