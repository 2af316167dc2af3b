//! Plan types
//!
//! The typed data exchanged between the planner, architect and coder stages.

mod progress;
mod schema;

pub use progress::CoderState;
pub use schema::{ImplementationStep, Plan, PlannedFile, TaskPlan};
