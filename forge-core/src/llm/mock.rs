//! Scripted model for tests and offline runs

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use super::{ConversationSummary, LanguageModel, OutputSchema};
use crate::tools::ToolSet;
use crate::{Error, Result};

/// A tool call the mock will make during a conversation
#[derive(Debug, Clone)]
pub struct MockToolCall {
    pub name: String,
    pub arguments: String,
}

/// Replays queued structured responses and tool-call scripts in order
///
/// Structured responses are consumed one per `complete_structured` call; an
/// exhausted queue is an error. Each `converse` call consumes one script (an
/// exhausted queue means "make no tool calls").
#[derive(Debug, Default)]
pub struct MockModel {
    structured: Mutex<VecDeque<Option<Value>>>,
    scripts: Mutex<VecDeque<Vec<MockToolCall>>>,
    structured_calls: AtomicUsize,
    conversations: Mutex<Vec<(String, String)>>,
}

impl MockModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a structured response
    pub fn with_structured(self, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).ok();
        self.queue_structured(value);
        self
    }

    /// Queue a structured call that yields nothing parseable
    pub fn with_empty_structured(self) -> Self {
        self.queue_structured(None);
        self
    }

    /// Queue the tool calls for the next conversation
    pub fn with_tool_script<I, S>(self, calls: I) -> Self
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        let script = calls
            .into_iter()
            .map(|(name, args)| MockToolCall {
                name: name.into(),
                arguments: args.to_string(),
            })
            .collect();
        if let Ok(mut scripts) = self.scripts.lock() {
            scripts.push_back(script);
        }
        self
    }

    /// Queue a tool call with raw (possibly malformed) arguments
    pub fn with_raw_tool_call(self, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        if let Ok(mut scripts) = self.scripts.lock() {
            scripts.push_back(vec![MockToolCall {
                name: name.into(),
                arguments: arguments.into(),
            }]);
        }
        self
    }

    /// Number of structured completions requested
    pub fn structured_calls(&self) -> usize {
        self.structured_calls.load(Ordering::SeqCst)
    }

    /// `(system, user)` prompts of every conversation so far
    pub fn conversations(&self) -> Vec<(String, String)> {
        self.conversations
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    fn queue_structured(&self, value: Option<Value>) {
        if let Ok(mut queue) = self.structured.lock() {
            queue.push_back(value);
        }
    }
}

#[async_trait]
impl LanguageModel for MockModel {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete_structured(
        &self,
        _prompt: &str,
        schema: &OutputSchema,
    ) -> Result<Option<Value>> {
        self.structured_calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .structured
            .lock()
            .map_err(|_| Error::Llm("mock state poisoned".to_string()))?
            .pop_front();

        next.ok_or_else(|| {
            Error::Llm(format!("no scripted response for {}", schema.name))
        })
    }

    async fn converse(
        &self,
        system: &str,
        user: &str,
        tools: &ToolSet,
    ) -> Result<ConversationSummary> {
        let script = {
            let mut conversations = self
                .conversations
                .lock()
                .map_err(|_| Error::Llm("mock state poisoned".to_string()))?;
            conversations.push((system.to_string(), user.to_string()));

            self.scripts
                .lock()
                .map_err(|_| Error::Llm("mock state poisoned".to_string()))?
                .pop_front()
                .unwrap_or_default()
        };

        let mut summary = ConversationSummary {
            rounds: 1,
            ..Default::default()
        };
        for call in script {
            tools.dispatch(&call.name, &call.arguments).await?;
            summary.tool_calls += 1;
            summary.rounds += 1;
        }
        summary.final_message = Some("done".to_string());
        Ok(summary)
    }
}
