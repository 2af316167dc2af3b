//! Stage definitions for the pipeline
//!
//! Each run moves through the stages in order:
//! - Planner: turns the user prompt into a [`Plan`](crate::plan::Plan)
//! - Architect: breaks the plan into ordered implementation steps
//! - Coder: implements one step per invocation, looping until none remain
//! - Done: terminal

use serde::{Deserialize, Serialize};
use std::fmt;

/// A node of the orchestration graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Planner - converts the prompt into a structured plan
    #[default]
    Planner,
    /// Architect - derives file-level implementation steps
    Architect,
    /// Coder - implements the current step with file tools
    Coder,
    /// All steps attempted
    Done,
}

impl Stage {
    /// Get all stages in run order
    pub fn all() -> &'static [Stage] {
        &[Stage::Planner, Stage::Architect, Stage::Coder, Stage::Done]
    }

    /// Get the short name for this stage
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Planner => "planner",
            Stage::Architect => "architect",
            Stage::Coder => "coder",
            Stage::Done => "done",
        }
    }

    /// Whether the run has finished
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Done)
    }

    /// Every legal `(from, to)` edge of the graph
    pub fn transitions() -> Vec<(Stage, Stage)> {
        vec![
            (Stage::Planner, Stage::Architect),
            (Stage::Architect, Stage::Coder),
            (Stage::Coder, Stage::Coder),
            (Stage::Coder, Stage::Done),
        ]
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "planner" | "plan" => Ok(Stage::Planner),
            "architect" | "arch" => Ok(Stage::Architect),
            "coder" | "code" => Ok(Stage::Coder),
            "done" => Ok(Stage::Done),
            _ => {
                let known: Vec<_> = Stage::all().iter().map(Stage::name).collect();
                Err(format!("Unknown stage: {} (expected {})", s, known.join(", ")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names() {
        assert_eq!(Stage::Planner.name(), "planner");
        assert_eq!(Stage::Architect.name(), "architect");
        assert_eq!(Stage::Coder.name(), "coder");
        assert_eq!(Stage::Done.name(), "done");
    }

    #[test]
    fn test_stage_from_str() {
        assert_eq!("planner".parse::<Stage>().unwrap(), Stage::Planner);
        assert_eq!("ARCH".parse::<Stage>().unwrap(), Stage::Architect);
        assert_eq!("Coder".parse::<Stage>().unwrap(), Stage::Coder);
        let err = "reviewer".parse::<Stage>().unwrap_err();
        assert!(err.contains("planner, architect, coder, done"));
    }

    #[test]
    fn test_only_done_is_terminal() {
        for stage in Stage::all() {
            assert_eq!(stage.is_terminal(), *stage == Stage::Done);
        }
    }

    #[test]
    fn test_only_coder_loops() {
        let loops: Vec<_> = Stage::transitions()
            .into_iter()
            .filter(|(from, to)| from == to)
            .collect();
        assert_eq!(loops, vec![(Stage::Coder, Stage::Coder)]);
    }

    #[test]
    fn test_serde_roundtrip() {
        let json = serde_json::to_string(&Stage::Architect).unwrap();
        assert_eq!(json, "\"architect\"");
        let parsed: Stage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Stage::Architect);
    }
}
