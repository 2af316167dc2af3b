//! Core workflow state machine
//!
//! A generic phase machine with an explicit transition table. The pipeline
//! uses it with [`Stage`](crate::agent::Stage) phases so an illegal edge is
//! an error instead of a silent jump.

use crate::error::{Error, Result};
use std::fmt::Debug;

/// Interface for workflow state machines
pub trait Workflow {
    /// The phase type for this workflow
    type Phase: Clone + PartialEq + Debug;

    /// Get the current phase of the workflow
    fn current_phase(&self) -> &Self::Phase;

    /// Check if a transition to the given phase is valid
    fn can_transition_to(&self, phase: &Self::Phase) -> bool;

    /// Attempt to transition to a new phase
    ///
    /// Returns an error if the transition is not valid.
    fn transition_to(&mut self, phase: Self::Phase) -> Result<()>;
}

/// A basic state machine implementation
#[derive(Debug, Clone)]
pub struct StateMachine<P: Clone + PartialEq + Debug> {
    current_phase: P,
    valid_transitions: Vec<(P, P)>,
    history: Vec<P>,
}

impl<P: Clone + PartialEq + Debug> StateMachine<P> {
    /// Create a new state machine with the given initial phase
    pub fn new(initial_phase: P) -> Self {
        Self {
            history: vec![initial_phase.clone()],
            current_phase: initial_phase,
            valid_transitions: Vec::new(),
        }
    }

    /// Add a valid transition from one phase to another
    pub fn add_transition(mut self, from: P, to: P) -> Self {
        self.valid_transitions.push((from, to));
        self
    }

    /// Add multiple valid transitions
    pub fn add_transitions(mut self, transitions: Vec<(P, P)>) -> Self {
        self.valid_transitions.extend(transitions);
        self
    }

    /// Every phase entered so far, starting with the initial one
    pub fn history(&self) -> &[P] {
        &self.history
    }

    /// Check if a transition is in the valid transitions list
    fn is_valid_transition(&self, from: &P, to: &P) -> bool {
        self.valid_transitions
            .iter()
            .any(|(f, t)| f == from && t == to)
    }
}

impl<P: Clone + PartialEq + Debug> Workflow for StateMachine<P> {
    type Phase = P;

    fn current_phase(&self) -> &Self::Phase {
        &self.current_phase
    }

    fn can_transition_to(&self, phase: &Self::Phase) -> bool {
        self.is_valid_transition(&self.current_phase, phase)
    }

    fn transition_to(&mut self, phase: Self::Phase) -> Result<()> {
        if !self.can_transition_to(&phase) {
            return Err(Error::InvalidTransition(format!(
                "{:?} -> {:?}",
                self.current_phase, phase
            )));
        }

        if self.current_phase != phase {
            tracing::info!(
                from = ?self.current_phase,
                to = ?phase,
                "Workflow phase transition"
            );
        }

        self.history.push(phase.clone());
        self.current_phase = phase;
        Ok(())
    }
}
