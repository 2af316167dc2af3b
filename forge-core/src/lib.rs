//! Forge Core - Core library for the forge project generator
//!
//! This crate turns a natural-language request into a project on disk by
//! running three model-backed stages in sequence: a planner, an architect
//! and a coder that loops over implementation steps using sandboxed file
//! tools.

pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod plan;
pub mod project;
pub mod tools;
pub mod workflow;

pub use agent::Stage;
pub use config::{CliOverrides, Config, LlmConfig, PipelineConfig};
pub use error::{Error, Result};
pub use llm::{ChatClient, LanguageModel, MockModel};
pub use plan::{CoderState, ImplementationStep, Plan, PlannedFile, TaskPlan};
pub use project::render_tree;
pub use workflow::{CoderStatus, Pipeline, RunOptions, RunState};
