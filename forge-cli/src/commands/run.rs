//! Run command - Generate a project from a prompt

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use forge_core::{render_tree, ChatClient, CliOverrides, Config, Pipeline, RunOptions, RunState};

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// What to build, in plain language
    #[arg(required = true)]
    pub prompt: String,

    /// Maximum stage invocations before giving up
    #[arg(long)]
    pub step_limit: Option<usize>,

    /// Directory generated projects are written under
    #[arg(short = 'o', long)]
    pub output_dir: Option<PathBuf>,

    /// Print the final run state as JSON
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(&self, mut overrides: CliOverrides) -> anyhow::Result<()> {
        let prompt = self.prompt.trim();
        if prompt.is_empty() {
            tracing::warn!("Please enter a project description");
            return Ok(());
        }

        overrides.output_dir = self.output_dir.clone();
        overrides.step_limit = self.step_limit;
        let config = Config::load_with_overrides(overrides)?;

        tracing::debug!(
            model = %config.llm.model,
            base_url = %config.llm.base_url,
            output_dir = %config.pipeline.output_dir.display(),
            step_limit = config.pipeline.step_limit,
            "Configuration loaded"
        );

        let client = ChatClient::from_config(&config.llm)?;
        let pipeline = Pipeline::new(Arc::new(client), &config.pipeline);

        let state = pipeline
            .run(prompt, RunOptions::from(&config.pipeline))
            .await
            .context("Project generation failed")?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&state)?);
            return Ok(());
        }

        print_summary(&state);
        if let Some(root) = &state.project_root {
            let tree = render_tree(root)
                .with_context(|| format!("Failed to read {}", root.display()))?;
            println!();
            println!("Generated files:");
            print!("{}", tree);
        }

        Ok(())
    }
}

fn print_summary(state: &RunState) {
    println!("Forge Run");
    println!("=========");
    println!();
    println!("Prompt: {}", state.user_prompt);

    if let Some(plan) = &state.plan {
        println!("Project: {}", plan.declared_name().unwrap_or("(unnamed)"));
        if !plan.techstack.is_empty() {
            println!("Tech stack: {}", plan.techstack);
        }
    }
    if let Some(root) = &state.project_root {
        println!("Location: {}", root.display());
    }
    if let Some(task_plan) = &state.task_plan {
        println!("Steps: {}", task_plan.len());
        for (idx, step) in task_plan.implementation_steps.iter().enumerate() {
            println!("  {}. {} - {}", idx + 1, step.filepath, step.task_description);
        }
    }
    println!("Stage invocations: {}", state.stage_invocations);
    if let Some(finished) = state.finished_at {
        let elapsed = finished - state.started_at;
        println!("Elapsed: {}s", elapsed.num_seconds());
    }
}
