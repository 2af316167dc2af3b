//! Pipeline stages: planner, architect and coder

mod prompts;
mod stages;
mod types;

pub use prompts::{
    architect_prompt, coder_system_prompt, coder_task_prompt, get_template, planner_prompt,
    render, PromptContext, PromptKind,
};
pub use stages::{
    run_architect, run_coder, run_planner, ArchitectOutput, CoderOutput, PlannerOutput,
};
pub use types::Stage;
