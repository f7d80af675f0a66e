//! Error types for ZeptoSense
//!
//! This module defines all error types used throughout the crate.
//! Uses `thiserror` for ergonomic error handling with automatic `Display` and
//! `Error` trait implementations.
//!
//! The layering is:
//! - [`LinkError`]: raised by the serial link (open, write, closed port)
//! - [`GatewayError`]: what a command cycle reports to the HTTP surface
//! - [`ProviderError`]: classified LLM provider failures
//! - [`SenseError`]: crate-wide error used by config, providers and the agent

use std::fmt;
use thiserror::Error;

// ============================================================================
// Hardware Link Errors
// ============================================================================

/// Errors raised by a serial link implementation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinkError {
    /// The device could not be claimed (busy, absent, permission denied).
    #[error("Failed to open {port}: {reason}")]
    Open { port: String, reason: String },

    /// The path is not a recognised serial device path.
    #[error("Serial path not allowed: {0}")]
    PathNotAllowed(String),

    /// A read or write on an open port failed.
    #[error("Serial I/O failed: {0}")]
    Io(String),

    /// The port was closed underneath us (reader hit EOF, device unplugged).
    #[error("Serial link closed")]
    Closed,
}

// ============================================================================
// Gateway Errors
// ============================================================================

/// Failure of a single command gateway call.
///
/// Every variant is recoverable: the process keeps serving, and the next call
/// reopens the channel if it was invalidated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// The serial channel could not be opened. No retry is attempted.
    #[error("Serial connection unavailable: {0}")]
    Unavailable(String),

    /// A send/settle/read cycle failed on an open channel. The channel has
    /// been invalidated and will be reopened on the next call.
    #[error("{0}")]
    IoFailure(String),

    /// Malformed actuator input, rejected before the channel was touched.
    #[error("Invalid command: {0}")]
    Validation(String),
}

impl GatewayError {
    /// Returns `true` if the channel was torn down by this failure.
    pub fn invalidated_channel(&self) -> bool {
        matches!(self, GatewayError::IoFailure(_))
    }
}

impl From<LinkError> for GatewayError {
    fn from(err: LinkError) -> Self {
        match err {
            LinkError::Open { .. } | LinkError::PathNotAllowed(_) => {
                GatewayError::Unavailable(err.to_string())
            }
            LinkError::Io(_) | LinkError::Closed => GatewayError::IoFailure(err.to_string()),
        }
    }
}

// ============================================================================
// Provider Error Classification
// ============================================================================

/// Structured provider error classification.
///
/// Provides fine-grained categorization of LLM provider HTTP errors so callers
/// can report a meaningful reason without string matching.
#[derive(Debug)]
pub enum ProviderError {
    /// 401: Invalid API key or authentication failure
    Auth(String),
    /// 429: Rate limit or quota exceeded
    RateLimit(String),
    /// 402: Payment required or billing issue
    Billing(String),
    /// 500/502/503/504: Server-side errors
    ServerError(String),
    /// 400: Bad request, invalid JSON, malformed parameters
    InvalidRequest(String),
    /// 404: Model not found or endpoint not available
    ModelNotFound(String),
    /// Connection or read timeout
    Timeout(String),
    /// Catch-all for unrecognized errors
    Unknown(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Auth(msg) => write!(f, "Authentication error: {}", msg),
            ProviderError::RateLimit(msg) => write!(f, "Rate limit error: {}", msg),
            ProviderError::Billing(msg) => write!(f, "Billing error: {}", msg),
            ProviderError::ServerError(msg) => write!(f, "Server error: {}", msg),
            ProviderError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ProviderError::ModelNotFound(msg) => write!(f, "Model not found: {}", msg),
            ProviderError::Timeout(msg) => write!(f, "Timeout: {}", msg),
            ProviderError::Unknown(msg) => write!(f, "Unknown provider error: {}", msg),
        }
    }
}

impl ProviderError {
    /// Returns the HTTP status code associated with this error, if applicable.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ProviderError::Auth(_) => Some(401),
            ProviderError::RateLimit(_) => Some(429),
            ProviderError::Billing(_) => Some(402),
            ProviderError::ServerError(_) => Some(500),
            ProviderError::InvalidRequest(_) => Some(400),
            ProviderError::ModelNotFound(_) => Some(404),
            ProviderError::Timeout(_) => None,
            ProviderError::Unknown(_) => None,
        }
    }
}

impl From<ProviderError> for SenseError {
    fn from(err: ProviderError) -> Self {
        SenseError::ProviderTyped(err)
    }
}

// ============================================================================
// Primary Error Type
// ============================================================================

/// The primary error type for ZeptoSense operations.
#[derive(Error, Debug)]
pub enum SenseError {
    /// Configuration-related errors (invalid config, missing required fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider errors that have no HTTP status (request build, response parse)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Structured provider error with classification.
    #[error("Provider error: {0}")]
    ProviderTyped(ProviderError),

    /// Command gateway failures
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Serial link failures outside a gateway cycle (startup, shutdown)
    #[error("Link error: {0}")]
    Link(#[from] LinkError),

    /// Tool dispatch failures (unreachable HTTP surface, malformed reply)
    #[error("Dispatch error: {0}")]
    Dispatch(String),

    /// Standard I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// A specialized `Result` type for ZeptoSense operations.
pub type Result<T> = std::result::Result<T, SenseError>;
