//! Coder progress tracking

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{ImplementationStep, TaskPlan};

/// Cursor over the steps of a [`TaskPlan`]
///
/// Invariant: `current_step_idx <= task_plan.len()`. Equality means every
/// step has been attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoderState {
    /// The plan being worked through (shared with the run state)
    pub task_plan: Arc<TaskPlan>,
    /// Index of the next step to run
    pub current_step_idx: usize,
}

impl CoderState {
    /// Start at the first step
    pub fn new(task_plan: Arc<TaskPlan>) -> Self {
        Self {
            task_plan,
            current_step_idx: 0,
        }
    }

    /// The step under the cursor, or `None` once all steps are done
    pub fn current_step(&self) -> Option<&ImplementationStep> {
        self.task_plan
            .implementation_steps
            .get(self.current_step_idx)
    }

    /// Whether every step has been attempted
    pub fn is_complete(&self) -> bool {
        self.current_step_idx >= self.task_plan.len()
    }

    /// Number of steps not yet attempted
    pub fn remaining(&self) -> usize {
        self.task_plan.len().saturating_sub(self.current_step_idx)
    }

    /// Move past the current step. No-op once complete.
    pub fn advance(&mut self) {
        if !self.is_complete() {
            self.current_step_idx += 1;
        }
    }
}
