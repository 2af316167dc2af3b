//! Pipeline driver
//!
//! Runs planner → architect → coder (looping) → done, merging each stage's
//! typed output into a single [`RunState`].

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::{StateMachine, Workflow};
use crate::agent::{
    run_architect, run_coder, run_planner, ArchitectOutput, CoderOutput, PlannerOutput, Stage,
};
use crate::config::PipelineConfig;
use crate::llm::LanguageModel;
use crate::plan::{CoderState, Plan, TaskPlan};
use crate::{Error, Result};

/// Whether the coder loop has more work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoderStatus {
    Running,
    Done,
}

/// State threaded through a run
///
/// Fields are only ever set or updated by the stage that owns them; nothing
/// is cleared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    pub user_prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<Plan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_root: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_plan: Option<Arc<TaskPlan>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coder_state: Option<CoderState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CoderStatus>,
    /// Stage invocations made so far
    #[serde(default)]
    pub stage_invocations: usize,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunState {
    /// Initial state holding only the prompt
    pub fn new(user_prompt: impl Into<String>) -> Self {
        Self {
            user_prompt: user_prompt.into(),
            plan: None,
            project_root: None,
            task_plan: None,
            coder_state: None,
            status: None,
            stage_invocations: 0,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Whether the coder reported every step attempted
    pub fn is_done(&self) -> bool {
        self.status == Some(CoderStatus::Done)
    }

    fn apply_planner(&mut self, output: PlannerOutput) {
        self.plan = Some(output.plan);
        self.project_root = Some(output.project_root);
    }

    fn apply_architect(&mut self, output: ArchitectOutput) {
        self.task_plan = Some(output.task_plan);
    }

    fn apply_coder(&mut self, output: CoderOutput) {
        self.status = Some(if output.is_done() {
            CoderStatus::Done
        } else {
            CoderStatus::Running
        });
        self.coder_state = Some(output.into_state());
    }
}

/// Per-run options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Maximum stage invocations before the run aborts
    pub step_limit: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { step_limit: 100 }
    }
}

impl From<&PipelineConfig> for RunOptions {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            step_limit: config.step_limit,
        }
    }
}

/// The three-stage pipeline bound to a model and an output directory
#[derive(Clone)]
pub struct Pipeline {
    model: Arc<dyn LanguageModel>,
    output_dir: PathBuf,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("model", &self.model.name())
            .field("output_dir", &self.output_dir)
            .finish()
    }
}

impl Pipeline {
    /// Create a pipeline writing projects under `config.output_dir`
    pub fn new(model: Arc<dyn LanguageModel>, config: &PipelineConfig) -> Self {
        Self {
            model,
            output_dir: config.output_dir.clone(),
        }
    }

    /// Run every stage for one prompt
    ///
    /// Any stage error aborts the run and is returned as is. Exceeding
    /// `options.step_limit` stage invocations returns
    /// [`Error::StepLimitExceeded`].
    pub async fn run(&self, user_prompt: &str, options: RunOptions) -> Result<RunState> {
        let mut state = RunState::new(user_prompt);
        let mut machine = StateMachine::new(Stage::Planner).add_transitions(Stage::transitions());

        tracing::info!(
            model = self.model.name(),
            step_limit = options.step_limit,
            "Starting pipeline run"
        );

        while !machine.current_phase().is_terminal() {
            if state.stage_invocations >= options.step_limit {
                tracing::error!(limit = options.step_limit, "Step limit exceeded");
                return Err(Error::StepLimitExceeded {
                    limit: options.step_limit,
                });
            }
            state.stage_invocations += 1;

            let stage = *machine.current_phase();
            let next = self.invoke(stage, &mut state).await?;
            machine.transition_to(next)?;
        }

        state.finished_at = Some(Utc::now());
        tracing::debug!(path = ?machine.history(), "Stage path");
        tracing::info!(
            invocations = state.stage_invocations,
            project_root = ?state.project_root,
            "Pipeline run complete"
        );
        Ok(state)
    }

    /// Run one stage, merge its output and pick the next stage
    async fn invoke(&self, stage: Stage, state: &mut RunState) -> Result<Stage> {
        let model = self.model.as_ref();

        match stage {
            Stage::Planner => {
                let output = run_planner(model, &state.user_prompt, &self.output_dir).await?;
                state.apply_planner(output);
                Ok(Stage::Architect)
            }
            Stage::Architect => {
                let plan = state
                    .plan
                    .as_ref()
                    .ok_or_else(|| missing("plan", stage))?;
                let output = run_architect(model, plan).await?;
                state.apply_architect(output);
                Ok(Stage::Coder)
            }
            Stage::Coder => {
                let project_root = state
                    .project_root
                    .clone()
                    .ok_or_else(|| missing("project_root", stage))?;
                let task_plan = state
                    .task_plan
                    .clone()
                    .ok_or_else(|| missing("task_plan", stage))?;

                let output =
                    run_coder(model, &project_root, &task_plan, state.coder_state.take()).await?;
                let next = if output.is_done() {
                    Stage::Done
                } else {
                    Stage::Coder
                };
                state.apply_coder(output);
                Ok(next)
            }
            Stage::Done => Ok(Stage::Done),
        }
    }
}

fn missing(field: &str, stage: Stage) -> Error {
    Error::Other(format!("{} reached without {}", stage, field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockModel;
    use serde_json::json;
    use tempfile::TempDir;

    fn pipeline(model: Arc<MockModel>, dir: &TempDir) -> Pipeline {
        let config = PipelineConfig {
            output_dir: dir.path().join("generated_project"),
            ..Default::default()
        };
        Pipeline::new(model, &config)
    }

    fn hello_model() -> MockModel {
        MockModel::new()
            .with_structured(json!({"name": "hello", "features": ["create hello.py"]}))
            .with_structured(json!({
                "implementation_steps": [
                    {"filepath": "hello.py", "task_description": "print hello world"}
                ]
            }))
            .with_tool_script([(
                "write_file",
                json!({"path": "hello.py", "content": "print('hello world')\n"}),
            )])
    }

    #[tokio::test]
    async fn test_hello_world_end_to_end() {
        let dir = TempDir::new().unwrap();
        let model = Arc::new(hello_model());
        let pipeline = pipeline(Arc::clone(&model), &dir);

        let state = pipeline
            .run("a single-file hello-world script", RunOptions::default())
            .await
            .unwrap();

        let root = state.project_root.clone().unwrap();
        assert!(root.ends_with("generated_project/hello"));
        assert!(root.is_dir());
        assert_eq!(
            std::fs::read_to_string(root.join("hello.py")).unwrap(),
            "print('hello world')\n"
        );

        assert_eq!(model.conversations().len(), 1);
        assert_eq!(model.structured_calls(), 2);
        assert!(state.is_done());
        assert_eq!(state.stage_invocations, 4);

        let task_plan = state.task_plan.as_ref().unwrap();
        assert_eq!(task_plan.plan.as_ref(), state.plan.as_ref());

        let value = serde_json::to_value(&state).unwrap();
        for key in ["user_prompt", "plan", "project_root", "task_plan", "coder_state"] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(value["status"], "DONE");
        assert_eq!(value["coder_state"]["current_step_idx"], 1);
    }

    #[tokio::test]
    async fn test_empty_task_plan_finishes_without_conversation() {
        let dir = TempDir::new().unwrap();
        let model = Arc::new(
            MockModel::new()
                .with_structured(json!({"name": "empty"}))
                .with_structured(json!({"implementation_steps": []})),
        );

        let state = pipeline(Arc::clone(&model), &dir)
            .run("nothing", RunOptions::default())
            .await
            .unwrap();

        assert!(state.is_done());
        assert!(model.conversations().is_empty());
        assert_eq!(state.stage_invocations, 3);
    }

    #[tokio::test]
    async fn test_step_limit_exceeded() {
        let dir = TempDir::new().unwrap();
        let steps: Vec<_> = (0..5)
            .map(|i| json!({"filepath": format!("f{}.txt", i), "task_description": "x"}))
            .collect();
        let model = Arc::new(
            MockModel::new()
                .with_structured(json!({"name": "big"}))
                .with_structured(json!({"implementation_steps": steps})),
        );

        let err = pipeline(Arc::clone(&model), &dir)
            .run("big project", RunOptions { step_limit: 4 })
            .await
            .unwrap_err();

        assert!(matches!(err, Error::StepLimitExceeded { limit: 4 }));
        // planner + architect + two coder steps ran before the guard tripped
        assert_eq!(model.conversations().len(), 2);
    }

    #[tokio::test]
    async fn test_step_limit_exactly_enough() {
        let dir = TempDir::new().unwrap();
        let model = Arc::new(hello_model());

        // planner + architect + coder step + coder done
        let state = pipeline(model, &dir)
            .run("hello", RunOptions { step_limit: 4 })
            .await
            .unwrap();
        assert!(state.is_done());
    }

    #[tokio::test]
    async fn test_planner_failure_aborts() {
        let dir = TempDir::new().unwrap();
        let model = Arc::new(MockModel::new().with_empty_structured());

        let err = pipeline(Arc::clone(&model), &dir)
            .run("anything", RunOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::EmptyResponse { stage: "planner" }));
        assert_eq!(model.structured_calls(), 1);
    }

    #[tokio::test]
    async fn test_architect_failure_aborts() {
        let dir = TempDir::new().unwrap();
        let model = Arc::new(
            MockModel::new()
                .with_structured(json!({"name": "x"}))
                .with_empty_structured(),
        );

        let err = pipeline(model, &dir)
            .run("anything", RunOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EmptyResponse { stage: "architect" }));
    }

    #[test]
    fn test_run_options_from_config() {
        let config = PipelineConfig {
            step_limit: 9,
            ..Default::default()
        };
        assert_eq!(RunOptions::from(&config).step_limit, 9);
    }

    #[test]
    fn test_coder_status_serialization() {
        assert_eq!(serde_json::to_value(CoderStatus::Done).unwrap(), "DONE");
        assert_eq!(serde_json::to_value(CoderStatus::Running).unwrap(), "RUNNING");
    }
}
