//! The planner, architect and coder stages
//!
//! Each stage takes what it needs from the run, calls the model once (or runs
//! one tool conversation), and returns a typed output for the driver to merge.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::prompts;
use crate::llm::{structured, LanguageModel};
use crate::plan::{CoderState, Plan, TaskPlan};
use crate::project::project_dir;
use crate::tools::{ProjectRoot, ReadFile, ToolSet};
use crate::{Error, Result};

/// What the planner adds to the run
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerOutput {
    pub plan: Plan,
    pub project_root: PathBuf,
}

/// What the architect adds to the run
#[derive(Debug, Clone, PartialEq)]
pub struct ArchitectOutput {
    pub task_plan: Arc<TaskPlan>,
}

/// Result of one coder invocation
#[derive(Debug, Clone, PartialEq)]
pub enum CoderOutput {
    /// One more step was attempted
    Progressed(CoderState),
    /// Nothing left to do; no model call was made
    Done(CoderState),
}

impl CoderOutput {
    pub fn state(&self) -> &CoderState {
        match self {
            CoderOutput::Progressed(state) | CoderOutput::Done(state) => state,
        }
    }

    pub fn into_state(self) -> CoderState {
        match self {
            CoderOutput::Progressed(state) | CoderOutput::Done(state) => state,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, CoderOutput::Done(_))
    }
}

/// Turn the user prompt into a plan and create the project root
///
/// The root is `<output_dir>/<slug>`, the slug coming from the plan's name or,
/// if it has none, from the prompt.
pub async fn run_planner(
    model: &dyn LanguageModel,
    user_prompt: &str,
    output_dir: &Path,
) -> Result<PlannerOutput> {
    let plan: Plan = structured(model, &prompts::planner_prompt(user_prompt))
        .await?
        .ok_or(Error::EmptyResponse { stage: "planner" })?;

    let dir = project_dir(output_dir, plan.declared_name(), user_prompt);
    let root = ProjectRoot::create(&dir)?;

    tracing::info!(
        name = plan.declared_name().unwrap_or("(none)"),
        files = plan.files.len(),
        project_root = %root.path().display(),
        "Plan created"
    );

    Ok(PlannerOutput {
        plan,
        project_root: root.path().to_path_buf(),
    })
}

/// Break a plan into ordered implementation steps
pub async fn run_architect(model: &dyn LanguageModel, plan: &Plan) -> Result<ArchitectOutput> {
    let mut task_plan: TaskPlan = structured(model, &prompts::architect_prompt(plan)?)
        .await?
        .ok_or(Error::EmptyResponse { stage: "architect" })?;

    task_plan.attach_plan(plan);

    tracing::info!(steps = task_plan.len(), "Task plan created");
    for (idx, step) in task_plan.implementation_steps.iter().enumerate() {
        tracing::debug!(step = idx, filepath = %step.filepath, "Planned step");
    }

    Ok(ArchitectOutput {
        task_plan: Arc::new(task_plan),
    })
}

/// Implement the step under the cursor, or report that none remain
///
/// A fresh [`CoderState`] is started when `coder_state` is `None`. The cursor
/// advances by exactly one after the conversation, whatever the model wrote.
pub async fn run_coder(
    model: &dyn LanguageModel,
    project_root: &Path,
    task_plan: &Arc<TaskPlan>,
    coder_state: Option<CoderState>,
) -> Result<CoderOutput> {
    let mut state = coder_state.unwrap_or_else(|| CoderState::new(Arc::clone(task_plan)));

    let Some(step) = state.current_step().cloned() else {
        tracing::info!(steps = state.task_plan.len(), "All steps attempted");
        return Ok(CoderOutput::Done(state));
    };

    let root = Arc::new(ProjectRoot::create(project_root)?);
    let existing = ReadFile::new(Arc::clone(&root)).read(&step.filepath).await?;

    tracing::info!(
        step = state.current_step_idx + 1,
        of = state.task_plan.len(),
        remaining = state.remaining(),
        filepath = %step.filepath,
        "Coding step"
    );

    let tools = ToolSet::file_tools(root);
    let summary = model
        .converse(
            &prompts::coder_system_prompt(),
            &prompts::coder_task_prompt(&step, &existing),
            &tools,
        )
        .await?;

    tracing::debug!(
        rounds = summary.rounds,
        tool_calls = summary.tool_calls,
        "Coder conversation finished"
    );

    state.advance();
    Ok(CoderOutput::Progressed(state))
}
