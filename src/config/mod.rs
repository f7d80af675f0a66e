//! Configuration management for ZeptoSense
//!
//! Configuration is loaded from `~/.zeptosense/config.json` with environment
//! variable overrides.

mod types;
pub mod validate;

pub use types::*;

use crate::error::{Result, SenseError};
use std::path::{Path, PathBuf};

impl Config {
    /// Returns the ZeptoSense configuration directory path (~/.zeptosense)
    pub fn dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".zeptosense")
    }

    /// Returns the path to the config file (~/.zeptosense/config.json)
    pub fn path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// Load configuration from the default path with environment overrides.
    ///
    /// If the config file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::path())
    }

    /// Load configuration from a specific path with environment overrides.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content).map_err(|e| {
                SenseError::Config(format!("{}: {}", path.display(), e))
            })?
        } else {
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Environment variables follow the pattern: ZEPTOSENSE_SECTION_KEY.
    /// `OPENAI_API_KEY`, `PRIMARY_MODEL` and `SECONDARY_MODEL` are accepted as
    /// fallbacks when the prefixed variables are absent.
    fn apply_env_overrides(&mut self) {
        // Serial
        if let Ok(val) = std::env::var("ZEPTOSENSE_SERIAL_PORT") {
            self.serial.port = val;
        }
        if let Ok(val) = std::env::var("ZEPTOSENSE_SERIAL_BAUD_RATE") {
            if let Ok(v) = val.parse() {
                self.serial.baud_rate = v;
            }
        }

        // Server
        if let Ok(val) = std::env::var("ZEPTOSENSE_SERVER_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("ZEPTOSENSE_SERVER_PORT") {
            if let Ok(v) = val.parse() {
                self.server.port = v;
            }
        }

        // Agent
        if let Ok(val) = std::env::var("ZEPTOSENSE_AGENT_API_BASE_URL") {
            self.agent.api_base_url = val;
        }
        if let Some(val) = env_with_fallback("ZEPTOSENSE_AGENT_PRIMARY_MODEL", "PRIMARY_MODEL") {
            self.agent.primary_model = val;
        }
        if let Some(val) = env_with_fallback("ZEPTOSENSE_AGENT_SECONDARY_MODEL", "SECONDARY_MODEL")
        {
            self.agent.secondary_model = val;
        }

        // Provider
        if let Some(val) = env_with_fallback("ZEPTOSENSE_PROVIDER_API_KEY", "OPENAI_API_KEY") {
            self.provider.api_key = Some(val);
        }
        if let Ok(val) = std::env::var("ZEPTOSENSE_PROVIDER_API_BASE") {
            self.provider.api_base = val;
        }
    }
}

/// Read `primary`, falling back to `fallback`; empty values count as unset.
fn env_with_fallback(primary: &str, fallback: &str) -> Option<String> {
    std::env::var(primary)
        .ok()
        .or_else(|| std::env::var(fallback).ok())
        .filter(|v| !v.trim().is_empty())
}
