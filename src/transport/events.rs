//! Typed wire events exchanged with the realtime agent runtime.
//!
//! Client events flow trainer → runtime; server events flow back. Unknown
//! server event types are tolerated and skipped so runtime upgrades don't
//! break the trainer.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SessionSettings;

// ─────────────────────────────────────────────────────────────────
// Client Events
// ─────────────────────────────────────────────────────────────────

/// Events the trainer sends to the runtime.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// Reconfigure the live session (turn detection, output mute).
    #[serde(rename = "session.update")]
    SessionUpdate { session: SessionUpdate },

    /// Insert a conversation item (e.g. a typed trainee message).
    #[serde(rename = "conversation.item.create")]
    ConversationItemCreate { item: ConversationItem },

    /// Ask the active persona to respond now.
    #[serde(rename = "response.create")]
    ResponseCreate,

    /// Cancel the in-flight persona response.
    #[serde(rename = "response.cancel")]
    ResponseCancel,
}

impl ClientEvent {
    /// A session.update carrying only turn-detection configuration.
    pub fn turn_detection(config: TurnDetection) -> Self {
        ClientEvent::SessionUpdate {
            session: SessionUpdate {
                turn_detection: Some(config),
                output_muted: None,
            },
        }
    }

    /// A session.update carrying only the output mute flag.
    pub fn output_muted(muted: bool) -> Self {
        ClientEvent::SessionUpdate {
            session: SessionUpdate {
                turn_detection: None,
                output_muted: Some(muted),
            },
        }
    }
}

/// Mutable session fields for `session.update`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn_detection: Option<TurnDetection>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_muted: Option<bool>,
}

/// Voice-activity based turn detection with auto-response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnDetection {
    #[serde(rename = "type")]
    pub kind: String,
    pub threshold: f64,
    pub prefix_padding_ms: u32,
    pub silence_duration_ms: u32,
    pub create_response: bool,
}

impl TurnDetection {
    /// Server VAD with the configured sensitivity and silence window.
    pub fn from_settings(settings: &SessionSettings) -> Self {
        Self {
            kind: "server_vad".to_string(),
            threshold: settings.vad_threshold,
            prefix_padding_ms: settings.vad_prefix_padding_ms,
            silence_duration_ms: settings.vad_silence_duration_ms,
            create_response: true,
        }
    }
}

/// A conversation item as the runtime expects it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub role: String,
    pub content: Vec<ContentPart>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentPart {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

impl ConversationItem {
    /// A trainee text message with the given item id.
    pub fn user_text(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: "message".to_string(),
            role: "user".to_string(),
            content: vec![ContentPart {
                kind: "input_text".to_string(),
                text: text.into(),
            }],
        }
    }

    /// A trainee text message with a fresh id.
    pub fn user_text_fresh(text: impl Into<String>) -> Self {
        Self::user_text(Uuid::new_v4().to_string(), text)
    }
}

// ─────────────────────────────────────────────────────────────────
// Server Events
// ─────────────────────────────────────────────────────────────────

/// Events the runtime sends to the trainer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// The session is live; the persona list has been accepted.
    #[serde(rename = "session.created")]
    SessionCreated,

    /// The runtime ended the session.
    #[serde(rename = "session.ended")]
    SessionEnded {
        #[serde(default)]
        reason: Option<String>,
    },

    /// A new conversation item appeared.
    #[serde(rename = "conversation.item.created")]
    ItemCreated { item: IncomingItem },

    /// The transcription of an existing item was updated.
    #[serde(rename = "conversation.item.updated")]
    ItemUpdated {
        item_id: String,
        #[serde(default)]
        text: String,
    },

    /// Control passed to another persona mid-session.
    #[serde(rename = "agent.handoff")]
    AgentHandoff { agent: String },

    /// The output guardrail flagged a persona message.
    #[serde(rename = "guardrail.tripped")]
    GuardrailTripped { item_id: String, category: String },

    /// Runtime-reported error.
    #[serde(rename = "error")]
    Error { message: String },

    /// Anything this trainer version doesn't understand.
    #[serde(other)]
    Unknown,
}

/// Conversation item payload on `conversation.item.created`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IncomingItem {
    pub id: String,
    pub role: String,
    #[serde(default)]
    pub text: String,
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
