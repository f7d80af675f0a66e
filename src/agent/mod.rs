//! Agent module - LLM tool-calling front end for the gateway
//!
//! Turns a natural-language request into at most one gateway operation and a
//! natural-language reply.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐  phase 1   ┌─────────────┐
//! │ Orchestrator│──────────> │ LLMProvider │  (primary model, full catalog)
//! │             │ <───────── │             │
//! │             │            └─────────────┘
//! │             │  dispatch  ┌─────────────┐     ┌──────────────┐
//! │             │──────────> │ToolDispatch │────>│ HTTP surface │
//! │             │            └─────────────┘     └──────────────┘
//! │             │  phase 2   ┌─────────────┐
//! │             │──────────> │ LLMProvider │  (secondary model, no tools)
//! └─────────────┘            └─────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use zeptosense::agent::Orchestrator;
//! use zeptosense::config::Config;
//!
//! async fn ask() -> zeptosense::Result<()> {
//!     let orchestrator = Orchestrator::from_config(&Config::load()?)?;
//!     println!("{}", orchestrator.process("现在温度多少？").await);
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod dispatch;
mod orchestrator;

pub use catalog::{ToolSpec, TOOLS};
pub use dispatch::{HttpDispatcher, ToolDispatcher};
pub use orchestrator::{
    emoticon_steering, error_reply, Orchestrator, Selection, TurnOutcome, DEFAULT_SYSTEM_PROMPT,
};
