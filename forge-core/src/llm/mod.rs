//! Language-model boundary
//!
//! Stages talk to the model only through [`LanguageModel`]: one call that
//! returns a JSON value matching a schema, and one that runs a tool-using
//! conversation. [`ChatClient`] implements it over an OpenAI-compatible API;
//! [`MockModel`] replays scripted responses.

mod client;
mod mock;
mod retry;
mod types;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::tools::{schema_value, ToolSet};
use crate::Result;

pub use client::ChatClient;
pub use mock::MockModel;
pub use retry::{execute_with_retry, RetryConfig};
pub use types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ToolCall};

/// A named JSON-schema the model's answer must satisfy
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    pub name: String,
    pub schema: Value,
}

impl OutputSchema {
    /// Schema derived from a Rust type
    pub fn of<T: JsonSchema>() -> Self {
        Self {
            name: T::schema_name(),
            schema: schema_value::<T>(),
        }
    }
}

/// What happened during a tool conversation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversationSummary {
    /// Model round-trips made
    pub rounds: usize,
    /// Tool calls dispatched
    pub tool_calls: usize,
    /// Final assistant text, if any
    pub final_message: Option<String>,
}

/// The two operations the pipeline needs from a model
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Identifier for logs
    fn name(&self) -> &str;

    /// Ask for a JSON value matching `schema`
    ///
    /// `Ok(None)` means the model answered but gave nothing parseable.
    async fn complete_structured(&self, prompt: &str, schema: &OutputSchema)
        -> Result<Option<Value>>;

    /// Run a conversation in which the model may call `tools` until it stops
    async fn converse(&self, system: &str, user: &str, tools: &ToolSet)
        -> Result<ConversationSummary>;
}

/// Typed structured completion
///
/// Returns `Ok(None)` when the model gave no value or one that does not
/// deserialize into `T`.
pub async fn structured<T>(model: &dyn LanguageModel, prompt: &str) -> Result<Option<T>>
where
    T: DeserializeOwned + JsonSchema,
{
    let schema = OutputSchema::of::<T>();
    let Some(value) = model.complete_structured(prompt, &schema).await? else {
        return Ok(None);
    };

    match serde_json::from_value(value) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => {
            tracing::warn!(schema = %schema.name, error = %e, "Structured output did not match schema");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::Plan;
    use serde_json::json;

    #[test]
    fn test_output_schema_of_plan() {
        let schema = OutputSchema::of::<Plan>();
        assert_eq!(schema.name, "Plan");
        assert!(schema.schema["properties"].get("files").is_some());
    }

    #[tokio::test]
    async fn test_structured_parses() {
        let model = MockModel::new().with_structured(json!({"name": "hello"}));
        let plan: Option<Plan> = structured(&model, "prompt").await.unwrap();
        assert_eq!(plan.unwrap().name.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_structured_mismatch_is_none() {
        let model = MockModel::new().with_structured(json!({"features": "not a list"}));
        let plan: Option<Plan> = structured(&model, "prompt").await.unwrap();
        assert!(plan.is_none());
    }

    #[tokio::test]
    async fn test_structured_empty_is_none() {
        let model = MockModel::new().with_empty_structured();
        let plan: Option<Plan> = structured(&model, "prompt").await.unwrap();
        assert!(plan.is_none());
    }
}
