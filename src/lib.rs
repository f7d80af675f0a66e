//! ZeptoSense - Serial sensor/actuator gateway with an LLM tool-calling front end
//!
//! The [`gateway::CommandGateway`] owns the single serial channel to the board
//! and serialises every command through it. The [`api`] module exposes the
//! gateway as a small HTTP surface, and [`agent::Orchestrator`] lets a language
//! model drive that surface one tool call per turn.

pub mod agent;
pub mod api;
pub mod config;
pub mod error;
pub mod gateway;
pub mod hardware;
pub mod providers;
pub mod session;
pub mod utils;

pub use agent::Orchestrator;
pub use config::Config;
pub use error::{GatewayError, LinkError, ProviderError, Result, SenseError};
pub use gateway::{CommandGateway, Readings};
pub use providers::{ChatOptions, LLMProvider, LLMResponse, LLMToolCall, OpenAIProvider};
pub use session::{Conversation, Message, Role, ToolCall};
