//! Plan and task-plan types exchanged between stages
//!
//! These are the structured outputs requested from the model. Their JSON
//! schemas are derived with `schemars` and sent along with the prompt.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A file the planner expects the project to contain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PlannedFile {
    /// Path relative to the project root (e.g. "src/app.js")
    pub path: String,
    /// What the file is for
    #[serde(default)]
    pub purpose: String,
}

/// Structured decomposition of the user's request
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Plan {
    /// Short project name, used to derive the output directory
    #[serde(default)]
    pub name: Option<String>,
    /// One-paragraph description of the app
    #[serde(default)]
    pub description: String,
    /// Languages, frameworks and libraries to use
    #[serde(default)]
    pub techstack: String,
    /// User-facing features to implement
    #[serde(default)]
    pub features: Vec<String>,
    /// Files the project should contain
    #[serde(default)]
    pub files: Vec<PlannedFile>,
}

impl Plan {
    /// The declared name, if it has any non-whitespace content
    pub fn declared_name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }
}

/// One unit of coder work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ImplementationStep {
    /// Target file, relative to the project root
    pub filepath: String,
    /// What to implement in that file
    pub task_description: String,
}

/// Ordered implementation steps derived from a [`Plan`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct TaskPlan {
    /// Steps in execution order
    #[serde(default)]
    pub implementation_steps: Vec<ImplementationStep>,

    /// The plan this was derived from. Never requested from the model;
    /// set by [`TaskPlan::attach_plan`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(skip)]
    pub plan: Option<Plan>,
}

impl TaskPlan {
    /// Create a task plan from steps with no back-reference yet
    pub fn new(implementation_steps: Vec<ImplementationStep>) -> Self {
        Self {
            implementation_steps,
            plan: None,
        }
    }

    /// Overwrite the back-reference with the originating plan
    ///
    /// Whatever the model put in `plan` is discarded.
    pub fn attach_plan(&mut self, plan: &Plan) {
        self.plan = Some(plan.clone());
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.implementation_steps.len()
    }

    /// Whether there is nothing to implement
    pub fn is_empty(&self) -> bool {
        self.implementation_steps.is_empty()
    }
}
