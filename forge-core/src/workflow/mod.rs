//! Workflow module for driving a prompt through the stages
//!
//! [`StateMachine`] enforces the stage graph; [`Pipeline`] runs the stages
//! and accumulates a [`RunState`].

pub mod pipeline;
pub mod state;

pub use pipeline::{CoderStatus, Pipeline, RunOptions, RunState};
pub use state::{StateMachine, Workflow};
