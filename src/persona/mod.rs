//! Persona system: the catalog of scripted customer personas.
//!
//! Each training session pits the trainee against one customer persona. The
//! registry holds the immutable catalog plus the handoff graph describing
//! which personas a conversation may transfer to mid-session.

pub mod registry;
pub mod types;

pub use registry::Registry;
pub use types::{Persona, PersonaKind};
