//! The serving-path runtime: the agent loop (C6) and its supporting
//! per-request state.

pub mod agent_loop;

pub use agent_loop::{run_agent_loop, CancelToken};
