//! Two-phase tool-calling orchestrator.
//!
//! One user turn runs as an explicit sequence:
//!
//! ```text
//! Select ──(no tool)──────────────────────────────> Done(text)
//!    │
//!    └──(tool)──> Dispatch ──> Synthesize ────────> Done(text)
//! ```
//!
//! Select calls the primary model with the full catalog. Dispatch invokes the
//! first selected tool against the HTTP surface. Synthesize calls the secondary
//! model with the tool result appended and no tools offered. Any provider
//! error ends the turn with an error reply; there is no retry.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::config::Config;
use crate::error::{Result, SenseError};
use crate::providers::{ChatOptions, LLMProvider, LLMToolCall, OpenAIProvider};
use crate::session::{Conversation, Message, ToolCall};

use super::catalog;
use super::dispatch::{HttpDispatcher, ToolDispatcher};

/// System prompt used when the config does not provide one.
pub const DEFAULT_SYSTEM_PROMPT: &str = "你是一个物联网传感器监控和控制系统的助手。\n\
你可以提供关于温度、湿度、光照和红外传感器的信息，\n\
并且可以控制LED灯（开启或关闭）。\n\
你还可以显示各种表情：快乐、眨眼、惊讶、愤怒、困倦、哭泣、调皮、可爱、思考和爱心。\n\
如果被要求提供传感器数据，请调用适当的函数获取实时数据。\n\
根据用户的情感和交流内容，适时展示合适的表情。\n\
以简洁明了的方式回应用户请求。";

/// Reply text for a turn that failed at either phase.
pub fn error_reply(err: impl std::fmt::Display) -> String {
    format!("处理请求时出错: {}", err)
}

/// System message appended after an emoticon was shown successfully.
pub fn emoticon_steering(tag: &str) -> String {
    format!(
        "表情'{}'已成功显示。请确保在回复中使用自然语言，不要直接返回API响应。",
        tag
    )
}

/// What the primary model chose in the select phase.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// No tool; the text is the final reply.
    Reply(String),
    /// The first requested tool call. Later calls in the same reply are dropped.
    Tool {
        content: String,
        call: LLMToolCall,
        ignored: usize,
    },
}

/// Result of a completed turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    pub reply: String,
    /// Name of the dispatched tool, if any.
    pub tool: Option<String>,
    /// JSON the dispatcher returned for that tool.
    pub tool_result: Option<Value>,
}

impl TurnOutcome {
    fn direct(reply: String) -> Self {
        Self {
            reply,
            tool: None,
            tool_result: None,
        }
    }
}

/// Drives one user turn through select, dispatch and synthesize.
pub struct Orchestrator {
    provider: Arc<dyn LLMProvider>,
    dispatcher: Arc<dyn ToolDispatcher>,
    primary_model: String,
    secondary_model: String,
    system_prompt: String,
}

impl Orchestrator {
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        dispatcher: Arc<dyn ToolDispatcher>,
        primary_model: &str,
        secondary_model: &str,
    ) -> Self {
        Self {
            provider,
            dispatcher,
            primary_model: primary_model.to_string(),
            secondary_model: secondary_model.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: &str) -> Self {
        self.system_prompt = prompt.to_string();
        self
    }

    /// Build an orchestrator from config: OpenAI-compatible provider plus an
    /// HTTP dispatcher against `agent.api_base_url`.
    ///
    /// Fails if no provider API key is configured.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config
            .provider
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                SenseError::Config(
                    "provider.api_key is not set (or export OPENAI_API_KEY)".to_string(),
                )
            })?;

        let timeout = Duration::from_secs(config.agent.request_timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SenseError::Provider(format!("failed to build HTTP client: {}", e)))?;
        let provider = OpenAIProvider::with_client(api_key, &config.provider.api_base, client);
        let dispatcher = HttpDispatcher::new(&config.agent.api_base_url, timeout)?;

        let mut orchestrator = Self::new(
            Arc::new(provider),
            Arc::new(dispatcher),
            &config.agent.primary_model,
            &config.agent.secondary_model,
        );
        if let Some(prompt) = config.agent.system_prompt.as_deref() {
            orchestrator = orchestrator.with_system_prompt(prompt);
        }
        Ok(orchestrator)
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Run one turn and return the user-facing reply.
    ///
    /// Provider failures are folded into the reply text.
    pub async fn process(&self, user_text: &str) -> String {
        match self.run_turn(user_text).await {
            Ok(outcome) => outcome.reply,
            Err(e) => {
                warn!(error = %e, "Turn failed");
                error_reply(e)
            }
        }
    }

    /// Run one turn, keeping the provider error typed.
    pub async fn run_turn(&self, user_text: &str) -> Result<TurnOutcome> {
        let span = info_span!("turn", provider = %self.provider.name());
        async move {
            let mut convo = Conversation::new(&self.system_prompt, user_text);

            let (content, call) = match self.select(&convo).await? {
                Selection::Reply(text) => {
                    info!("Model answered without a tool");
                    return Ok(TurnOutcome::direct(text));
                }
                Selection::Tool {
                    content,
                    call,
                    ignored,
                } => {
                    if ignored > 0 {
                        warn!(
                            tool = %call.name,
                            ignored,
                            "Model requested several tools; only the first is dispatched"
                        );
                    }
                    (content, call)
                }
            };

            let result = self.dispatch(&mut convo, &content, &call).await;
            let reply = self.synthesize(&convo).await?;

            Ok(TurnOutcome {
                reply,
                tool: Some(call.name),
                tool_result: Some(result),
            })
        }
        .instrument(span)
        .await
    }

    /// Phase 1: offer the catalog to the primary model.
    pub async fn select(&self, convo: &Conversation) -> Result<Selection> {
        let response = self
            .provider
            .chat(
                convo.to_vec(),
                catalog::definitions(),
                Some(&self.primary_model),
                ChatOptions::new(),
            )
            .await?;

        let mut calls = response.tool_calls.into_iter();
        Ok(match calls.next() {
            None => Selection::Reply(response.content),
            Some(call) => Selection::Tool {
                content: response.content,
                call,
                ignored: calls.count(),
            },
        })
    }

    /// Dispatch the selected tool and append the exchange to the conversation.
    async fn dispatch(&self, convo: &mut Conversation, content: &str, call: &LLMToolCall) -> Value {
        info!(tool = %call.name, id = %call.id, "Dispatching tool");
        let result = self.dispatcher.dispatch(&call.name).await;

        convo.push(Message::assistant_with_tools(
            content,
            vec![ToolCall::new(&call.id, &call.name, &call.arguments)],
        ));
        convo.push(Message::tool_result(&call.id, &result.to_string()));

        let succeeded = result
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if let Some(tag) = call.name.strip_prefix(catalog::EMOTICON_TOOL_PREFIX) {
            if succeeded {
                convo.push(Message::system(&emoticon_steering(tag)));
            }
        }
        debug!(tool = %call.name, success = succeeded, "Tool result recorded");
        result
    }

    /// Phase 2: the secondary model turns the tool result into the reply.
    pub async fn synthesize(&self, convo: &Conversation) -> Result<String> {
        let response = self
            .provider
            .chat(
                convo.to_vec(),
                vec![],
                Some(&self.secondary_model),
                ChatOptions::new(),
            )
            .await?;
        Ok(response.content)
    }
}
