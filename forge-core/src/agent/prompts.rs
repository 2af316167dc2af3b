//! Stage prompt templates
//!
//! Templates are embedded markdown files using `{{VARIABLE}}` placeholders.
//! Rendering is a single pass, so substituted values (file contents in
//! particular) are never themselves scanned for placeholders.

use std::collections::HashMap;

use crate::plan::{ImplementationStep, Plan};
use crate::Result;

const PLANNER_PROMPT: &str = include_str!("prompts/planner.md");
const ARCHITECT_PROMPT: &str = include_str!("prompts/architect.md");
const CODER_SYSTEM_PROMPT: &str = include_str!("prompts/coder_system.md");
const CODER_TASK_PROMPT: &str = include_str!("prompts/coder_task.md");

/// Which template to render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Planner,
    Architect,
    CoderSystem,
    CoderTask,
}

/// Get the raw template for a prompt kind
pub fn get_template(kind: PromptKind) -> &'static str {
    match kind {
        PromptKind::Planner => PLANNER_PROMPT,
        PromptKind::Architect => ARCHITECT_PROMPT,
        PromptKind::CoderSystem => CODER_SYSTEM_PROMPT,
        PromptKind::CoderTask => CODER_TASK_PROMPT,
    }
}

/// Context for rendering a prompt template
#[derive(Debug, Clone, Default)]
pub struct PromptContext {
    /// Variable substitutions
    variables: HashMap<String, String>,
}

impl PromptContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    /// Set a variable value (builder pattern)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Set the raw user request
    pub fn with_user_prompt(self, prompt: impl Into<String>) -> Self {
        self.with("USER_PROMPT", prompt)
    }

    /// Set the plan, serialized as pretty JSON
    pub fn with_plan(self, plan: &Plan) -> Result<Self> {
        let json = serde_json::to_string_pretty(plan)?;
        Ok(self.with("PLAN", json))
    }

    /// Set the step being implemented
    pub fn with_step(self, step: &ImplementationStep) -> Self {
        self.with("TASK_DESCRIPTION", step.task_description.as_str())
            .with("FILEPATH", step.filepath.as_str())
    }

    /// Set the current content of the target file
    pub fn with_existing_content(self, content: &str) -> Self {
        self.with("EXISTING_CONTENT", content)
    }
}

/// Render a template with the given context
pub fn render(kind: PromptKind, context: &PromptContext) -> String {
    render_template(get_template(kind), context)
}

/// Planner prompt for a user request
pub fn planner_prompt(user_prompt: &str) -> String {
    render(
        PromptKind::Planner,
        &PromptContext::new().with_user_prompt(user_prompt),
    )
}

/// Architect prompt embedding the plan as JSON
pub fn architect_prompt(plan: &Plan) -> Result<String> {
    Ok(render(
        PromptKind::Architect,
        &PromptContext::new().with_plan(plan)?,
    ))
}

/// System prompt for the coder conversation
pub fn coder_system_prompt() -> String {
    render(PromptKind::CoderSystem, &PromptContext::new())
}

/// User prompt for one coder step
pub fn coder_task_prompt(step: &ImplementationStep, existing_content: &str) -> String {
    render(
        PromptKind::CoderTask,
        &PromptContext::new()
            .with_step(step)
            .with_existing_content(existing_content),
    )
}

/// Substitute `{{NAME}}` placeholders in one pass
///
/// Unset uppercase placeholders become "(not specified)". Anything else
/// between braces is copied through untouched.
fn render_template(template: &str, context: &PromptContext) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let Some(end) = after.find("}}") else {
            result.push_str(&rest[start..]);
            return result;
        };

        let name = &after[..end];
        let is_placeholder =
            !name.is_empty() && name.chars().all(|c| c.is_ascii_uppercase() || c == '_');

        if is_placeholder {
            match context.variables.get(name) {
                Some(value) => result.push_str(value),
                None => result.push_str("(not specified)"),
            }
        } else {
            result.push_str(&rest[start..start + 2 + end + 2]);
        }

        rest = &after[end + 2..];
    }

    result.push_str(rest);
    result
}
