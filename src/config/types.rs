//! Configuration type definitions for ZeptoSense
//!
//! This module defines all configuration structs used throughout the crate.
//! All types implement serde traits for JSON serialization and have sensible defaults.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration struct for ZeptoSense
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Serial channel and command timing
    pub serial: SerialConfig,
    /// HTTP surface bind address
    pub server: ServerConfig,
    /// Tool-calling orchestrator settings
    pub agent: AgentConfig,
    /// LLM provider credentials
    pub provider: ProviderConfig,
    /// Logging output
    pub logging: LoggingConfig,
}

// ============================================================================
// Serial Configuration
// ============================================================================

/// Serial channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Device path of the sensor board (e.g. `/dev/ttyUSB0`, `COM3`)
    pub port: String,
    /// Line speed
    pub baud_rate: u32,
    /// Fixed waits between sending a command and reading its effect
    pub settle: SettleConfig,
    /// Upper bound on a single frame write, in seconds
    pub command_timeout_secs: u64,
    /// Whether a temp-humidity read also refreshes illumination
    pub refresh_illumination_with_temp_humidity: bool,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 115_200,
            settle: SettleConfig::default(),
            command_timeout_secs: 5,
            refresh_illumination_with_temp_humidity: true,
        }
    }
}

impl SerialConfig {
    /// The send timeout as a [`Duration`].
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

/// Settle delays in milliseconds.
///
/// The board has no acknowledgment signal, so the gateway waits a fixed time
/// after each send before reading the decoded state back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettleConfig {
    /// After a sensor read request
    pub sensor_ms: u64,
    /// After an LED or LCD text write
    pub actuator_ms: u64,
    /// After storing a display string (emoticons)
    pub display_ms: u64,
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            sensor_ms: 2_000,
            actuator_ms: 1_000,
            display_ms: 0,
        }
    }
}

// ============================================================================
// Server Configuration
// ============================================================================

/// HTTP surface configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for `TcpListener::bind`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ============================================================================
// Agent Configuration
// ============================================================================

/// Default model for both orchestrator phases.
pub const DEFAULT_AGENT_MODEL: &str = "Qwen/Qwen2.5-7B-Instruct";

/// Tool-calling orchestrator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Base URL of the HTTP surface the tools are dispatched to
    pub api_base_url: String,
    /// Model for the tool-selection call
    pub primary_model: String,
    /// Model for the response-synthesis call
    pub secondary_model: String,
    /// Timeout for a single dispatch request, in seconds
    pub request_timeout_secs: u64,
    /// Override for the built-in system prompt
    pub system_prompt: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000".to_string(),
            primary_model: DEFAULT_AGENT_MODEL.to_string(),
            secondary_model: DEFAULT_AGENT_MODEL.to_string(),
            request_timeout_secs: 30,
            system_prompt: None,
        }
    }
}

// ============================================================================
// Provider Configuration
// ============================================================================

/// Default OpenAI-compatible endpoint.
pub const DEFAULT_PROVIDER_API_BASE: &str = "https://api.siliconflow.cn/v1";

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// API key for authentication
    pub api_key: Option<String>,
    /// API base URL (OpenAI-compatible chat completions)
    pub api_base: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_PROVIDER_API_BASE.to_string(),
        }
    }
}

// ============================================================================
// Logging Configuration
// ============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, coloured
    Pretty,
    /// Compact single-line text with component tags
    #[default]
    Component,
    /// Structured JSON lines
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Output format
    pub format: LogFormat,
    /// Optional file to append JSON logs to
    pub file: Option<String>,
    /// Default filter level when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Component,
            file: None,
            level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.serial.port, "/dev/ttyUSB0");
        assert_eq!(config.serial.baud_rate, 115_200);
        assert_eq!(config.serial.command_timeout(), Duration::from_secs(5));
        assert!(config.serial.refresh_illumination_with_temp_humidity);
        assert_eq!(config.server.bind_addr(), "127.0.0.1:5000");
        assert_eq!(config.agent.api_base_url, "http://localhost:5000");
        assert_eq!(config.agent.primary_model, DEFAULT_AGENT_MODEL);
        assert!(config.provider.api_key.is_none());
        assert_eq!(config.provider.api_base, DEFAULT_PROVIDER_API_BASE);
    }

    #[test]
    fn test_settle_defaults_match_board_timing() {
        let settle = SettleConfig::default();
        assert_eq!(settle.sensor_ms, 2_000);
        assert_eq!(settle.actuator_ms, 1_000);
        assert_eq!(settle.display_ms, 0);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let json = r#"{"serial": {"port": "COM3", "settle": {"sensor_ms": 500}}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.serial.port, "COM3");
        assert_eq!(config.serial.settle.sensor_ms, 500);
        assert_eq!(config.serial.settle.actuator_ms, 1_000);
        assert_eq!(config.serial.baud_rate, 115_200);
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let mut config = Config::default();
        config.agent.secondary_model = "gpt-4o-mini".to_string();
        config.serial.refresh_illumination_with_temp_humidity = false;
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.agent.secondary_model, "gpt-4o-mini");
        assert!(!parsed.serial.refresh_illumination_with_temp_humidity);
    }
}
