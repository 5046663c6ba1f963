//! The tool catalogue offered to the agent loop: a registry (C4) plus the
//! RSS (C5) and document-stub (C5) implementations behind it.

pub mod doc_tools;
pub mod registry;
pub mod rss_tools;
pub mod wiring;

pub use registry::{ToolHandler, ToolRegistry};
pub use wiring::build_default_registry;
