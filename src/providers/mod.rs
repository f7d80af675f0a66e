//! Providers module - LLM providers
//!
//! This module defines the `LLMProvider` trait and common types for
//! talking to chat-completion APIs. The orchestrator only depends on the
//! trait; [`OpenAIProvider`] covers any OpenAI-compatible endpoint.
//!
//! # Example
//!
//! ```rust,ignore
//! use zeptosense::providers::{ChatOptions, LLMProvider, OpenAIProvider};
//! use zeptosense::session::Message;
//!
//! async fn example() {
//!     let provider = OpenAIProvider::new("your-api-key");
//!     let messages = vec![Message::user("你好")];
//!
//!     let response = provider
//!         .chat(messages, vec![], None, ChatOptions::new())
//!         .await
//!         .unwrap();
//!     println!("Response: {}", response.content);
//! }
//! ```

pub mod openai;
mod types;

use crate::error::ProviderError;

pub use openai::OpenAIProvider;
pub use types::{ChatOptions, LLMProvider, LLMResponse, LLMToolCall, ToolDefinition, Usage};

/// Parse an HTTP status code and response body into a structured [`ProviderError`].
pub fn parse_provider_error(status: u16, body: &str) -> ProviderError {
    match status {
        401 => ProviderError::Auth(body.to_string()),
        402 => ProviderError::Billing(body.to_string()),
        404 => ProviderError::ModelNotFound(body.to_string()),
        429 => ProviderError::RateLimit(body.to_string()),
        400 => ProviderError::InvalidRequest(body.to_string()),
        500..=599 => ProviderError::ServerError(body.to_string()),
        _ => ProviderError::Unknown(format!("HTTP {}: {}", status, body)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_provider_error_401() {
        let err = parse_provider_error(401, "invalid api key");
        assert!(matches!(err, ProviderError::Auth(_)));
        assert_eq!(err.status_code(), Some(401));
    }

    #[test]
    fn test_parse_provider_error_402() {
        let err = parse_provider_error(402, "payment required");
        assert!(matches!(err, ProviderError::Billing(_)));
    }

    #[test]
    fn test_parse_provider_error_404() {
        let err = parse_provider_error(404, "model not found");
        assert!(matches!(err, ProviderError::ModelNotFound(_)));
    }

    #[test]
    fn test_parse_provider_error_429() {
        let err = parse_provider_error(429, "rate limited");
        assert!(matches!(err, ProviderError::RateLimit(_)));
    }

    #[test]
    fn test_parse_provider_error_400() {
        let err = parse_provider_error(400, "bad json");
        assert!(matches!(err, ProviderError::InvalidRequest(_)));
    }

    #[test]
    fn test_parse_provider_error_5xx() {
        for status in [500, 502, 503, 504] {
            let err = parse_provider_error(status, "upstream");
            assert!(matches!(err, ProviderError::ServerError(_)), "{status}");
        }
    }

    #[test]
    fn test_parse_provider_error_unknown() {
        let err = parse_provider_error(418, "i'm a teapot");
        assert!(matches!(err, ProviderError::Unknown(_)));
        assert!(err.to_string().contains("HTTP 418"));
    }
}
