//! OpenAI-compatible Provider Implementation
//!
//! This module implements the `LLMProvider` trait for the Chat Completions API
//! shape shared by OpenAI and compatible hosts (SiliconFlow, vLLM, Ollama),
//! handling message conversion, tool calls, and response parsing.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{DEFAULT_AGENT_MODEL, DEFAULT_PROVIDER_API_BASE};
use crate::error::{ProviderError, Result, SenseError};
use crate::session::{Message, Role};

use super::{
    parse_provider_error, ChatOptions, LLMProvider, LLMResponse, LLMToolCall, ToolDefinition,
    Usage,
};

// ============================================================================
// API Request Types
// ============================================================================

/// Chat completions request body.
#[derive(Debug, Serialize)]
struct OpenAIRequest {
    /// Model identifier
    model: String,
    /// Conversation messages (including system)
    messages: Vec<OpenAIMessage>,
    /// Available tools
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAITool>>,
    /// Let the model decide whether to call a tool
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<String>,
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    /// Temperature for sampling
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// A message in OpenAI's format.
#[derive(Debug, Serialize)]
struct OpenAIMessage {
    /// Role: "system", "user", "assistant", or "tool"
    role: String,
    /// Message content (can be null for assistant with tool_calls)
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    /// Tool calls made by the assistant
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAIToolCallRequest>>,
    /// ID of the tool call this message is responding to
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

/// A tool call in a request (assistant requesting tool execution).
#[derive(Debug, Serialize)]
struct OpenAIToolCallRequest {
    id: String,
    /// Always "function"
    r#type: String,
    function: OpenAIFunctionCall,
}

/// Function call details.
#[derive(Debug, Serialize, Deserialize)]
struct OpenAIFunctionCall {
    name: String,
    /// JSON-encoded arguments
    arguments: String,
}

/// Tool definition.
#[derive(Debug, Serialize)]
struct OpenAITool {
    /// Always "function"
    r#type: String,
    function: OpenAIFunctionDef,
}

/// Function definition.
#[derive(Debug, Serialize)]
struct OpenAIFunctionDef {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

// ============================================================================
// API Response Types
// ============================================================================

/// Chat completions response body.
#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    /// Text content (may be null if tool_calls present)
    content: Option<String>,
    tool_calls: Option<Vec<OpenAIToolCallResponse>>,
}

#[derive(Debug, Deserialize)]
struct OpenAIToolCallResponse {
    id: String,
    function: OpenAIFunctionCall,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// API error response.
#[derive(Debug, Deserialize)]
struct OpenAIErrorResponse {
    error: OpenAIError,
}

#[derive(Debug, Deserialize)]
struct OpenAIError {
    message: String,
}

// ============================================================================
// Provider
// ============================================================================

/// OpenAI-compatible LLM provider.
pub struct OpenAIProvider {
    /// API key for authentication
    api_key: String,
    /// API base URL
    api_base: String,
    /// HTTP client for making requests
    client: Client,
}

impl OpenAIProvider {
    /// Create a provider against the default endpoint.
    ///
    /// # Example
    /// ```
    /// use zeptosense::providers::{LLMProvider, OpenAIProvider};
    ///
    /// let provider = OpenAIProvider::new("sk-xxx");
    /// assert_eq!(provider.name(), "openai");
    /// ```
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(api_key, DEFAULT_PROVIDER_API_BASE)
    }

    /// Create a provider with a custom base URL (trailing slash removed).
    pub fn with_base_url(api_key: &str, api_base: &str) -> Self {
        Self::with_client(api_key, api_base, Client::new())
    }

    /// Create a provider with a custom HTTP client (timeouts, proxies).
    pub fn with_client(api_key: &str, api_base: &str, client: Client) -> Self {
        Self {
            api_key: api_key.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }
}

// ============================================================================
// Conversion Functions
// ============================================================================

/// Convert messages to the API format.
fn convert_messages(messages: Vec<Message>) -> Vec<OpenAIMessage> {
    messages
        .into_iter()
        .map(|msg| {
            let role = match msg.role {
                Role::System => "system",
                Role::User => "user",
                Role::Assistant => "assistant",
                Role::Tool => "tool",
            }
            .to_string();

            let tool_calls = msg.tool_calls.map(|tcs| {
                tcs.into_iter()
                    .map(|tc| OpenAIToolCallRequest {
                        id: tc.id,
                        r#type: "function".to_string(),
                        function: OpenAIFunctionCall {
                            name: tc.name,
                            arguments: tc.arguments,
                        },
                    })
                    .collect()
            });

            OpenAIMessage {
                role,
                content: if msg.content.is_empty() && tool_calls.is_some() {
                    None
                } else {
                    Some(msg.content)
                },
                tool_calls,
                tool_call_id: msg.tool_call_id,
            }
        })
        .collect()
}

/// Convert tool definitions to the API format.
fn convert_tools(tools: Vec<ToolDefinition>) -> Vec<OpenAITool> {
    tools
        .into_iter()
        .map(|t| OpenAITool {
            r#type: "function".to_string(),
            function: OpenAIFunctionDef {
                name: t.name,
                description: t.description,
                parameters: t.parameters,
            },
        })
        .collect()
}

/// Convert an API response to an [`LLMResponse`].
fn convert_response(response: OpenAIResponse) -> LLMResponse {
    let choice = response.choices.into_iter().next();

    let (content, tool_calls) = match choice {
        Some(c) => {
            let content = c.message.content.unwrap_or_default();
            let tool_calls = c
                .message
                .tool_calls
                .map(|tcs| {
                    tcs.into_iter()
                        .map(|tc| {
                            LLMToolCall::new(&tc.id, &tc.function.name, &tc.function.arguments)
                        })
                        .collect()
                })
                .unwrap_or_default();
            (content, tool_calls)
        }
        None => (String::new(), Vec::new()),
    };

    let mut llm_response = if tool_calls.is_empty() {
        LLMResponse::text(&content)
    } else {
        LLMResponse::with_tools(&content, tool_calls)
    };

    if let Some(usage) = response.usage {
        llm_response =
            llm_response.with_usage(Usage::new(usage.prompt_tokens, usage.completion_tokens));
    }

    llm_response
}

// ============================================================================
// LLMProvider Implementation
// ============================================================================

#[async_trait]
impl LLMProvider for OpenAIProvider {
    async fn chat(
        &self,
        messages: Vec<Message>,
        tools: Vec<ToolDefinition>,
        model: Option<&str>,
        options: ChatOptions,
    ) -> Result<LLMResponse> {
        let model = model.unwrap_or(DEFAULT_AGENT_MODEL);
        let (tools, tool_choice) = if tools.is_empty() {
            (None, None)
        } else {
            (Some(convert_tools(tools)), Some("auto".to_string()))
        };

        let request = OpenAIRequest {
            model: model.to_string(),
            messages: convert_messages(messages),
            tools,
            tool_choice,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
        };

        debug!(model = %model, "Chat completion request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SenseError::ProviderTyped(ProviderError::Timeout(e.to_string()))
                } else {
                    SenseError::Provider(format!("request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<OpenAIErrorResponse>(&error_text)
                .map(|e| e.error.message)
                .unwrap_or(error_text);
            return Err(parse_provider_error(status.as_u16(), &detail).into());
        }

        let body: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| SenseError::Provider(format!("failed to parse response: {}", e)))?;

        info!(model = %model, "Chat completion received");
        Ok(convert_response(body))
    }

    fn default_model(&self) -> &str {
        DEFAULT_AGENT_MODEL
    }

    fn name(&self) -> &str {
        "openai"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ToolCall;
    use serde_json::json;
    use wiremock::matchers::{bearer_token, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_provider_creation() {
        let provider = OpenAIProvider::new("test-key");
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.default_model(), "Qwen/Qwen2.5-7B-Instruct");
        assert_eq!(provider.api_base(), "https://api.siliconflow.cn/v1");
    }

    #[test]
    fn test_provider_with_base_url_trims_slash() {
        let provider = OpenAIProvider::with_base_url("test-key", "https://custom.api/v1/");
        assert_eq!(provider.api_base(), "https://custom.api/v1");
    }

    #[test]
    fn test_convert_messages_simple() {
        let converted = convert_messages(vec![
            Message::system("You are helpful"),
            Message::user("Hello"),
        ]);
        assert_eq!(converted.len(), 2);
        assert_eq!(converted[0].role, "system");
        assert_eq!(converted[1].content, Some("Hello".to_string()));
    }

    #[test]
    fn test_convert_messages_with_tool_calls() {
        let converted = convert_messages(vec![
            Message::assistant_with_tools(
                "",
                vec![ToolCall::new("call_1", "get_temperature", "{}")],
            ),
            Message::tool_result("call_1", r#"{"success":true}"#),
        ]);

        assert_eq!(converted[0].role, "assistant");
        assert!(converted[0].content.is_none());
        let tool_calls = converted[0].tool_calls.as_ref().unwrap();
        assert_eq!(tool_calls[0].r#type, "function");
        assert_eq!(tool_calls[0].function.name, "get_temperature");

        assert_eq!(converted[1].role, "tool");
        assert_eq!(converted[1].tool_call_id, Some("call_1".to_string()));
    }

    #[test]
    fn test_convert_tools() {
        let converted = convert_tools(vec![ToolDefinition::new(
            "turn_led_on",
            "打开LED灯",
            json!({"type": "object", "properties": {}}),
        )]);
        assert_eq!(converted[0].r#type, "function");
        assert_eq!(converted[0].function.name, "turn_led_on");
    }

    #[test]
    fn test_convert_response_with_tool_calls() {
        let response = OpenAIResponse {
            choices: vec![OpenAIChoice {
                message: OpenAIResponseMessage {
                    content: None,
                    tool_calls: Some(vec![OpenAIToolCallResponse {
                        id: "call_123".to_string(),
                        function: OpenAIFunctionCall {
                            name: "emo_happy".to_string(),
                            arguments: "{}".to_string(),
                        },
                    }]),
                },
            }],
            usage: None,
        };
        let converted = convert_response(response);
        assert_eq!(converted.content, "");
        assert_eq!(converted.tool_calls[0].name, "emo_happy");
    }

    #[test]
    fn test_convert_response_empty_choices() {
        let converted = convert_response(OpenAIResponse {
            choices: vec![],
            usage: None,
        });
        assert_eq!(converted.content, "");
        assert!(!converted.has_tool_calls());
    }

    #[test]
    fn test_request_serialization_omits_empty_fields() {
        let request = OpenAIRequest {
            model: "m".to_string(),
            messages: vec![],
            tools: None,
            tool_choice: None,
            max_tokens: None,
            temperature: Some(0.3),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("temperature"));
        assert!(!json.contains("tools"));
        assert!(!json.contains("tool_choice"));
        assert!(!json.contains("max_tokens"));
    }

    #[tokio::test]
    async fn test_chat_against_mock_server() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(bearer_token("sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "你好！"}}],
                "usage": {"prompt_tokens": 12, "completion_tokens": 3}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OpenAIProvider::with_base_url("sk-test", &server.uri());
        let response = provider
            .chat(vec![Message::user("hi")], vec![], Some("m"), ChatOptions::new())
            .await
            .unwrap();
        assert_eq!(response.content, "你好！");
        assert_eq!(response.usage.unwrap().total_tokens, 15);
    }

    #[tokio::test]
    async fn test_chat_maps_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "Invalid token", "type": "auth"}
            })))
            .mount(&server)
            .await;

        let provider = OpenAIProvider::with_base_url("bad", &server.uri());
        let err = provider
            .chat(vec![Message::user("hi")], vec![], None, ChatOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SenseError::ProviderTyped(ProviderError::Auth(ref m)) if m == "Invalid token"
        ));
    }
}
