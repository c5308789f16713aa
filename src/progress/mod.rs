//! Per-persona training progress, persisted across sessions.

pub mod store;

pub use store::{AgentProgress, ProgressStore};
