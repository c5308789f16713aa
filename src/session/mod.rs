//! Session lifecycle: connection state machine, persona activation and
//! handoff, playback/mute synchronization.

pub mod orchestrator;
pub mod prefs;
pub mod state;

pub use orchestrator::Orchestrator;
pub use prefs::AudioPrefs;
pub use state::{SessionState, SessionStatus};
