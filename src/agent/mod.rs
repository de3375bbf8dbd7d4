//! Agent system for tool-calling research runs.
//!
//! Sends the conversation to a hosted model with the registered tools, runs
//! whatever tools it asks for, feeds the results back, and repeats until the
//! model answers without requesting more tools.

mod runner;

pub use runner::{Agent, AgentResponse, ToolCallRecord, DEFAULT_MAX_ITERATIONS};

#[cfg(test)]
pub(crate) use runner::tests as testing;
