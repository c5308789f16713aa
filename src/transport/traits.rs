//! Transport trait definitions.
//!
//! Defines the `RealtimeTransport` trait the session orchestrator drives, and
//! the events a transport delivers back. The trait is object-safe for dynamic
//! dispatch; implementations push `TransportEvent`s into the unbounded channel
//! they were constructed with, in strict append order.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::credential::ClientSecret;
use crate::error::Result;
use crate::guardrail::OutputGuardrail;
use crate::persona::Persona;
use crate::transcript::{ModerationVerdict, TranscriptItem};

use super::events::ClientEvent;

// ─────────────────────────────────────────────────────────────────
// Connect Request
// ─────────────────────────────────────────────────────────────────

/// What the runtime needs to know about one persona.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonaDescriptor {
    /// Persona slug; the runtime echoes it back in handoff events.
    pub name: String,

    /// Voice tag for synthesized audio.
    pub voice: String,

    /// Behavioral prompt, passed through opaquely.
    pub instructions: String,

    /// Shown to other personas deciding whether to hand off here.
    pub handoff_description: String,

    /// Slugs of personas this one may hand off to.
    pub handoff_targets: Vec<String>,
}

impl PersonaDescriptor {
    /// Build a descriptor from a catalog persona.
    pub fn from_persona(persona: &Persona) -> Self {
        Self {
            name: persona.slug().to_string(),
            voice: persona.voice.clone(),
            instructions: persona.instructions.clone(),
            handoff_description: persona.handoff_description.clone(),
            handoff_targets: persona.handoffs.iter().map(|k| k.slug().to_string()).collect(),
        }
    }
}

/// Everything a transport needs to open a session.
///
/// The persona list is ordered: the first entry is the conversation root.
#[derive(Debug, Clone)]
pub struct ConnectRequest {
    pub credential: ClientSecret,
    pub personas: Vec<PersonaDescriptor>,
    pub guardrails: Vec<OutputGuardrail>,
    pub extra_context: Value,
}

// ─────────────────────────────────────────────────────────────────
// Transport Events
// ─────────────────────────────────────────────────────────────────

/// Events a transport delivers to the orchestrator.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// The session is live.
    Connected,

    /// The session ended (runtime- or error-initiated).
    Disconnected { reason: String },

    /// Control passed to a different persona mid-session. Carries the slug
    /// the runtime reported.
    AgentHandoff { persona: String },

    /// A new transcript item was produced.
    ItemAppended(TranscriptItem),

    /// The transcription of an existing item changed.
    ItemUpdated { id: String, text: String },

    /// The output guardrail delivered a verdict for a persona message.
    GuardrailVerdict {
        item_id: String,
        verdict: ModerationVerdict,
    },

    /// Runtime-reported error. Informational; connection state changes arrive
    /// separately.
    Error { message: String },
}

// ─────────────────────────────────────────────────────────────────
// RealtimeTransport Trait
// ─────────────────────────────────────────────────────────────────

/// A connection to the external realtime agent runtime.
#[async_trait]
pub trait RealtimeTransport: Send + Sync {
    /// Transport name (e.g. "websocket", "mock").
    fn name(&self) -> &'static str;

    /// Open a session. Returning `Ok` confirms the session is established.
    async fn connect(&self, request: ConnectRequest) -> Result<()>;

    /// Tear the session down. Best effort; idempotent; never fails.
    async fn disconnect(&self);

    /// Send a structured client event.
    async fn send_event(&self, event: ClientEvent) -> Result<()>;

    /// Send a typed trainee message and ask the persona to respond.
    async fn send_user_text(&self, text: &str) -> Result<()>;

    /// Cancel the in-flight persona response.
    async fn interrupt(&self) -> Result<()>;

    /// Mute or unmute synthesized persona audio.
    async fn mute(&self, muted: bool) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::Registry;

    #[test]
    fn test_descriptor_from_persona() {
        let registry = Registry::new().unwrap();
        let persona = &registry.personas()[0];
        let descriptor = PersonaDescriptor::from_persona(persona);

        assert_eq!(descriptor.name, "auto-claim");
        assert_eq!(descriptor.voice, persona.voice);
        assert_eq!(descriptor.handoff_targets.len(), 5);
        assert!(!descriptor.handoff_targets.contains(&"auto-claim".to_string()));
    }
}
