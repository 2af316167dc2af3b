//! HTTP client for OpenAI-compatible chat-completions APIs
//!
//! Works with Groq (the default), OpenAI, and local servers that speak the
//! same protocol.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::retry::{execute_with_retry, RetryConfig};
use super::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ResponseFormat, Tool};
use super::{ConversationSummary, LanguageModel, OutputSchema};
use crate::config::LlmConfig;
use crate::tools::ToolSet;
use crate::{Error, Result};

/// Chat-completions client
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: Option<f32>,
    max_tool_rounds: usize,
    retry: RetryConfig,
}

impl ChatClient {
    /// Create a client from config with an explicit API key
    pub fn new(config: &LlmConfig, api_key: impl Into<String>) -> Result<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            api_key: api_key.into(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tool_rounds: config.max_tool_rounds,
            retry: config.retry.clone(),
        })
    }

    /// Create a client, looking the API key up from config or environment
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let api_key = config.resolve_api_key()?;
        Self::new(config, api_key)
    }

    /// Model name requests are sent with
    pub fn model(&self) -> &str {
        &self.model
    }

    fn api_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    fn build_request(
        &self,
        messages: Vec<ChatMessage>,
        tools: Option<&ToolSet>,
        response_format: Option<ResponseFormat>,
    ) -> ChatCompletionRequest {
        let tools = tools
            .filter(|t| !t.is_empty())
            .map(|t| t.specs().into_iter().map(Tool::from).collect());

        ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            tools,
            response_format,
        }
    }

    /// Send a request, retrying transient failures
    pub async fn send(&self, request: &ChatCompletionRequest) -> Result<ChatCompletionResponse> {
        execute_with_retry(&self.retry, || self.send_once(request)).await
    }

    async fn send_once(&self, request: &ChatCompletionRequest) -> Result<ChatCompletionResponse> {
        let response = self
            .http
            .post(self.api_url())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status >= 400 {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "(no body)".to_string());
            return Err(Error::Api { status, message });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Llm(format!("failed to parse response: {}", e)))?;

        if let Some(usage) = &parsed.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Model usage"
            );
        }

        Ok(parsed)
    }
}

/// Pull a JSON object out of model text, tolerating a ```json fence
fn parse_json_content(content: &str) -> Option<Value> {
    let trimmed = content.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    if unfenced.is_empty() {
        return None;
    }

    serde_json::from_str::<Value>(unfenced)
        .ok()
        .filter(|v| !v.is_null())
}

#[async_trait]
impl LanguageModel for ChatClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete_structured(
        &self,
        prompt: &str,
        schema: &OutputSchema,
    ) -> Result<Option<Value>> {
        let request = self.build_request(
            vec![ChatMessage::user(prompt)],
            None,
            Some(ResponseFormat::json_schema(&schema.name, schema.schema.clone())),
        );

        let response = self.send(&request).await?;
        let content = response
            .first_message()
            .and_then(|m| m.content.as_deref())
            .unwrap_or_default();

        let value = parse_json_content(content);
        if value.is_none() {
            tracing::warn!(schema = %schema.name, "Model returned no parseable JSON");
        }
        Ok(value)
    }

    async fn converse(
        &self,
        system: &str,
        user: &str,
        tools: &ToolSet,
    ) -> Result<ConversationSummary> {
        let mut messages = vec![ChatMessage::system(system), ChatMessage::user(user)];
        let mut summary = ConversationSummary::default();

        loop {
            if summary.rounds >= self.max_tool_rounds {
                return Err(Error::Llm(format!(
                    "tool conversation exceeded {} rounds",
                    self.max_tool_rounds
                )));
            }

            let request = self.build_request(messages.clone(), Some(tools), None);
            let response = self.send(&request).await?;
            summary.rounds += 1;

            let message = response
                .first_message()
                .cloned()
                .ok_or_else(|| Error::Llm("response had no choices".to_string()))?;

            let calls = message.requested_tool_calls().to_vec();
            if calls.is_empty() {
                summary.final_message = message.content.clone();
                return Ok(summary);
            }

            messages.push(message);
            for call in calls {
                tracing::debug!(
                    tool = %call.function.name,
                    round = summary.rounds,
                    "Model requested tool"
                );
                let output = tools
                    .dispatch(&call.function.name, &call.function.arguments)
                    .await?;
                summary.tool_calls += 1;
                messages.push(ChatMessage::tool(call.id, output));
            }
        }
    }
}
