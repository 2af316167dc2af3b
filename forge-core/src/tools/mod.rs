//! Tool layer for the coder conversation
//!
//! Tools are named handlers with a JSON-schema for their arguments. The model
//! picks a tool by name and passes JSON arguments; [`ToolSet::dispatch`] routes
//! the call and returns the tool's text output.

mod file_tools;
mod root;

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::{Error, Result};

pub use file_tools::{GetCurrentDirectory, ListFiles, ReadFile, WriteFile};
pub use root::ProjectRoot;

/// A tool the model may call
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the model uses to call this tool
    fn name(&self) -> &'static str;

    /// What the tool does, shown to the model
    fn description(&self) -> &'static str;

    /// JSON-schema of the arguments object
    fn parameters(&self) -> Value;

    /// Run the tool with already-parsed JSON arguments
    async fn call(&self, args: Value) -> Result<String>;
}

/// Provider-neutral description of a tool
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// JSON-schema for `T`, without the `$schema` meta key providers reject
pub fn schema_value<T: JsonSchema>() -> Value {
    let mut schema = serde_json::to_value(schemars::schema_for!(T)).unwrap_or(Value::Null);
    if let Some(map) = schema.as_object_mut() {
        map.remove("$schema");
    }
    schema
}

/// Deserialize tool arguments, mapping failures to a tool error
pub fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T> {
    serde_json::from_value(args)
        .map_err(|e| Error::Tool(format!("invalid arguments for {}: {}", tool, e)))
}

/// Ordered collection of tools available to one conversation
#[derive(Clone, Default)]
pub struct ToolSet {
    tools: Vec<Arc<dyn Tool>>,
}

impl std::fmt::Debug for ToolSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolSet").field("tools", &self.names()).finish()
    }
}

impl ToolSet {
    /// Create an empty tool set
    pub fn new() -> Self {
        Self::default()
    }

    /// The four file tools bound to a project root
    pub fn file_tools(root: Arc<ProjectRoot>) -> Self {
        let mut set = Self::new();
        set.register(Arc::new(ReadFile::new(Arc::clone(&root))));
        set.register(Arc::new(WriteFile::new(Arc::clone(&root))));
        set.register(Arc::new(ListFiles::new(Arc::clone(&root))));
        set.register(Arc::new(GetCurrentDirectory::new(root)));
        set
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(tool);
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    /// Names of all registered tools, in registration order
    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Specs for every tool, in registration order
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools
            .iter()
            .map(|t| ToolSpec {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters(),
            })
            .collect()
    }

    /// Whether the set has no tools
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Call a tool by name with raw JSON arguments from the model
    ///
    /// Blank arguments are treated as `{}`. Unknown tools and malformed
    /// arguments are errors.
    pub async fn dispatch(&self, name: &str, arguments: &str) -> Result<String> {
        let tool = self
            .get(name)
            .ok_or_else(|| Error::Tool(format!("unknown tool: {}", name)))?;

        let args: Value = if arguments.trim().is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_str(arguments).map_err(|e| {
                Error::Tool(format!("malformed arguments for {}: {}", name, e))
            })?
        };

        tracing::debug!(tool = name, "Dispatching tool call");
        tool.call(args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tool_set() -> (TempDir, ToolSet) {
        let dir = TempDir::new().unwrap();
        let root = Arc::new(ProjectRoot::create(dir.path()).unwrap());
        (dir, ToolSet::file_tools(root))
    }

    #[test]
    fn test_file_tools_registered_in_order() {
        let (_dir, tools) = tool_set();
        assert_eq!(
            tools.names(),
            vec!["read_file", "write_file", "list_files", "get_current_directory"]
        );
    }

    #[test]
    fn test_specs_have_object_schemas() {
        let (_dir, tools) = tool_set();
        for spec in tools.specs() {
            assert_eq!(spec.parameters["type"], "object", "{}", spec.name);
            assert!(spec.parameters.get("$schema").is_none());
            assert!(!spec.description.is_empty());
        }
    }

    #[tokio::test]
    async fn test_dispatch_write_then_read() {
        let (_dir, tools) = tool_set();
        let out = tools
            .dispatch("write_file", r#"{"path": "a.txt", "content": "hi"}"#)
            .await
            .unwrap();
        assert!(out.starts_with("WROTE:"));

        let read = tools
            .dispatch("read_file", r#"{"path": "a.txt"}"#)
            .await
            .unwrap();
        assert_eq!(read, "hi");
    }

    #[tokio::test]
    async fn test_dispatch_blank_arguments() {
        let (dir, tools) = tool_set();
        let cwd = tools.dispatch("get_current_directory", "").await.unwrap();
        let expected = std::fs::canonicalize(dir.path()).unwrap();
        assert_eq!(cwd, expected.display().to_string());
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool() {
        let (_dir, tools) = tool_set();
        let err = tools.dispatch("delete_file", "{}").await.unwrap_err();
        assert!(matches!(err, Error::Tool(_)));
    }

    #[tokio::test]
    async fn test_dispatch_malformed_arguments() {
        let (_dir, tools) = tool_set();
        let err = tools.dispatch("write_file", "{not json").await.unwrap_err();
        assert!(matches!(err, Error::Tool(_)));

        let err = tools
            .dispatch("write_file", r#"{"path": "a.txt"}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Tool(_)));
    }

    #[test]
    fn test_register_replaces_same_name() {
        let (dir, mut tools) = tool_set();
        let root = Arc::new(ProjectRoot::create(dir.path()).unwrap());
        tools.register(Arc::new(ReadFile::new(root)));
        assert_eq!(tools.names().len(), 4);
        assert_eq!(tools.names().last(), Some(&"read_file"));
    }
}
