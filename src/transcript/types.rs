//! Transcript item types.
//!
//! A transcript is an ordered sequence of items: spoken/typed messages from
//! either side of the call, and breadcrumbs (structured debug/system events).
//! Items are append-only and never reordered in storage; display and export
//! sort by timestamp.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─────────────────────────────────────────────────────────────────
// Role
// ─────────────────────────────────────────────────────────────────

/// Which side of the call produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The human claims representative being trained.
    Trainee,
    /// The simulated customer persona.
    Customer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Trainee => write!(f, "Trainee"),
            Role::Customer => write!(f, "Customer"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Moderation Verdict
// ─────────────────────────────────────────────────────────────────

/// Outcome of the output guardrail for one persona message. Attached by the
/// transport; the core stores it opaquely and never branches on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ModerationVerdict {
    /// The message passed moderation.
    Pass,
    /// The message was flagged.
    Flagged {
        /// Moderation category reported by the guardrail.
        category: String,
    },
}

// ─────────────────────────────────────────────────────────────────
// Transcript Item
// ─────────────────────────────────────────────────────────────────

/// What a transcript item records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemKind {
    /// A spoken or typed message.
    Message {
        role: Role,
        text: String,
        /// Hidden items (e.g. the synthetic greeting trigger) are excluded
        /// from display, export, and scoring.
        #[serde(default)]
        hidden: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        moderation: Option<ModerationVerdict>,
    },
    /// A structured system/debug event.
    Breadcrumb {
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<serde_json::Value>,
    },
}

/// One entry in a conversation transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptItem {
    /// Unique item identifier.
    pub id: String,

    /// Creation time.
    pub timestamp: DateTime<Utc>,

    #[serde(flatten)]
    pub kind: ItemKind,
}

impl TranscriptItem {
    /// Create a visible message item.
    pub fn message(role: Role, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            kind: ItemKind::Message {
                role,
                text: text.into(),
                hidden: false,
                moderation: None,
            },
        }
    }

    /// Create a message item with a caller-supplied id (transport items keep
    /// the id the runtime assigned so later updates can find them).
    pub fn message_with_id(id: impl Into<String>, role: Role, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            timestamp: Utc::now(),
            kind: ItemKind::Message {
                role,
                text: text.into(),
                hidden: false,
                moderation: None,
            },
        }
    }

    /// Create a hidden message item.
    pub fn hidden_message(role: Role, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            kind: ItemKind::Message {
                role,
                text: text.into(),
                hidden: true,
                moderation: None,
            },
        }
    }

    /// Create a breadcrumb item.
    pub fn breadcrumb(title: impl Into<String>, data: Option<serde_json::Value>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            kind: ItemKind::Breadcrumb {
                title: title.into(),
                data,
            },
        }
    }

    /// Message text, if this is a message.
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            ItemKind::Message { text, .. } => Some(text),
            ItemKind::Breadcrumb { .. } => None,
        }
    }

    /// Message role, if this is a message.
    pub fn role(&self) -> Option<Role> {
        match &self.kind {
            ItemKind::Message { role, .. } => Some(*role),
            ItemKind::Breadcrumb { .. } => None,
        }
    }

    /// Whether this item is hidden from display, export, and scoring.
    pub fn is_hidden(&self) -> bool {
        matches!(&self.kind, ItemKind::Message { hidden: true, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_accessors() {
        let item = TranscriptItem::message(Role::Trainee, "hello there");
        assert_eq!(item.text(), Some("hello there"));
        assert_eq!(item.role(), Some(Role::Trainee));
        assert!(!item.is_hidden());
        assert!(!item.id.is_empty());
    }

    #[test]
    fn test_hidden_message() {
        let item = TranscriptItem::hidden_message(Role::Trainee, "hi");
        assert!(item.is_hidden());
    }

    #[test]
    fn test_breadcrumb_has_no_text() {
        let item = TranscriptItem::breadcrumb("session started", None);
        assert_eq!(item.text(), None);
        assert_eq!(item.role(), None);
        assert!(!item.is_hidden());
    }

    #[test]
    fn test_serde_roundtrip() {
        let item = TranscriptItem::message(Role::Customer, "what is going on");
        let json = serde_json::to_string(&item).unwrap();
        let parsed: TranscriptItem = serde_json::from_str(&json).unwrap();
        assert_eq!(item, parsed);
        assert!(json.contains("\"customer\""));
    }

    #[test]
    fn test_moderation_verdict_serde() {
        let verdict = ModerationVerdict::Flagged {
            category: "OFFENSIVE".to_string(),
        };
        let json = serde_json::to_string(&verdict).unwrap();
        assert!(json.contains("flagged"));
        let parsed: ModerationVerdict = serde_json::from_str(&json).unwrap();
        assert_eq!(verdict, parsed);
    }
}
