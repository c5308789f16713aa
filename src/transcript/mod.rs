//! Conversation transcript: append-only log of messages and breadcrumbs.

pub mod log;
pub mod types;

pub use log::TranscriptLog;
pub use types::{ItemKind, ModerationVerdict, Role, TranscriptItem};
