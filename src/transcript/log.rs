//! Append-only transcript log with snapshotting and plain-text export.

use tracing::debug;

use crate::error::{Error, Result};

use super::types::{ItemKind, ModerationVerdict, TranscriptItem};

/// The conversation history of the active session.
///
/// Items are stored in insertion order and never reordered; export sorts a
/// copy chronologically. The log is owned by the session and cleared when the
/// trainee picks a new persona or retries.
#[derive(Debug, Default)]
pub struct TranscriptLog {
    items: Vec<TranscriptItem>,
}

impl TranscriptLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item.
    pub fn push(&mut self, item: TranscriptItem) {
        self.items.push(item);
    }

    /// Replace the text of an existing message (streaming transcription
    /// updates arrive under the same item id). Unknown ids are ignored.
    pub fn update_message_text(&mut self, id: &str, text: impl Into<String>) {
        let text = text.into();
        if let Some(item) = self.items.iter_mut().find(|i| i.id == id) {
            if let ItemKind::Message { text: t, .. } = &mut item.kind {
                *t = text;
                return;
            }
        }
        debug!(id, "Transcript update for unknown item, ignored");
    }

    /// Attach a moderation verdict to an existing message. Unknown ids are
    /// ignored.
    pub fn attach_moderation(&mut self, id: &str, verdict: ModerationVerdict) {
        if let Some(item) = self.items.iter_mut().find(|i| i.id == id) {
            if let ItemKind::Message { moderation, .. } = &mut item.kind {
                *moderation = Some(verdict);
            }
        }
    }

    /// Drop all items.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Items in insertion order.
    pub fn items(&self) -> &[TranscriptItem] {
        &self.items
    }

    /// Owned copy of the current items, for scoring. Items arriving after the
    /// snapshot are not part of that evaluation run.
    pub fn snapshot(&self) -> Vec<TranscriptItem> {
        self.items.clone()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Render the transcript as human-readable plain text, one line per
    /// visible item, in chronological order.
    pub fn export_text(&self) -> String {
        let mut sorted = self.items.clone();
        sorted.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

        let mut out = String::new();
        for item in sorted.iter().filter(|i| !i.is_hidden()) {
            let stamp = item.timestamp.format("%H:%M:%S");
            match &item.kind {
                ItemKind::Message { role, text, .. } => {
                    out.push_str(&format!("[{}] {}: {}\n", stamp, role, text));
                }
                ItemKind::Breadcrumb { title, .. } => {
                    out.push_str(&format!("[{}] -- {}\n", stamp, title));
                }
            }
        }
        out
    }

    /// Serialize the transcript as a JSON array.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.items)?)
    }

    /// Parse a transcript from the JSON array produced by [`to_json_string`].
    ///
    /// [`to_json_string`]: TranscriptLog::to_json_string
    pub fn from_json_str(content: &str) -> Result<Self> {
        let items: Vec<TranscriptItem> = serde_json::from_str(content)
            .map_err(|e| Error::transcript_malformed(e.to_string()))?;
        Ok(Self { items })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::types::Role;
    use chrono::Duration;

    #[test]
    fn test_push_preserves_insertion_order() {
        let mut log = TranscriptLog::new();
        log.push(TranscriptItem::message(Role::Trainee, "first"));
        log.push(TranscriptItem::message(Role::Customer, "second"));
        log.push(TranscriptItem::breadcrumb("handoff", None));

        assert_eq!(log.len(), 3);
        assert_eq!(log.items()[0].text(), Some("first"));
        assert_eq!(log.items()[1].text(), Some("second"));
    }

    #[test]
    fn test_update_message_text() {
        let mut log = TranscriptLog::new();
        let item = TranscriptItem::message_with_id("item-1", Role::Customer, "[partial]");
        log.push(item);

        log.update_message_text("item-1", "full transcription");
        assert_eq!(log.items()[0].text(), Some("full transcription"));

        // Unknown id is a no-op
        log.update_message_text("item-9", "nothing");
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_attach_moderation() {
        let mut log = TranscriptLog::new();
        log.push(TranscriptItem::message_with_id("m1", Role::Customer, "reply"));
        log.attach_moderation(
            "m1",
            ModerationVerdict::Flagged {
                category: "OFFENSIVE".into(),
            },
        );

        match &log.items()[0].kind {
            ItemKind::Message { moderation, .. } => assert!(moderation.is_some()),
            _ => panic!("expected message"),
        }
    }

    #[test]
    fn test_clear() {
        let mut log = TranscriptLog::new();
        log.push(TranscriptItem::message(Role::Trainee, "hello"));
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut log = TranscriptLog::new();
        log.push(TranscriptItem::message(Role::Trainee, "one"));
        let snap = log.snapshot();
        log.push(TranscriptItem::message(Role::Trainee, "two"));

        assert_eq!(snap.len(), 1);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_export_sorts_chronologically() {
        let mut log = TranscriptLog::new();
        let mut early = TranscriptItem::message(Role::Trainee, "early");
        let mut late = TranscriptItem::message(Role::Customer, "late");
        late.timestamp = early.timestamp + Duration::seconds(5);
        // Insert out of order; export must still be chronological
        early.timestamp = late.timestamp - Duration::seconds(10);
        log.push(late);
        log.push(early);

        let text = log.export_text();
        let early_pos = text.find("early").unwrap();
        let late_pos = text.find("late").unwrap();
        assert!(early_pos < late_pos);
    }

    #[test]
    fn test_export_skips_hidden_and_formats_breadcrumbs() {
        let mut log = TranscriptLog::new();
        log.push(TranscriptItem::hidden_message(Role::Trainee, "hi"));
        log.push(TranscriptItem::message(Role::Customer, "hello, who is this"));
        log.push(TranscriptItem::breadcrumb("agent handoff", None));

        let text = log.export_text();
        assert!(!text.contains("hi\n"));
        assert!(text.contains("Customer: hello, who is this"));
        assert!(text.contains("-- agent handoff"));
    }

    #[test]
    fn test_json_roundtrip() {
        let mut log = TranscriptLog::new();
        log.push(TranscriptItem::message(Role::Trainee, "I understand"));
        log.push(TranscriptItem::breadcrumb("guardrail tripped", None));

        let json = log.to_json_string().unwrap();
        let parsed = TranscriptLog::from_json_str(&json).unwrap();
        assert_eq!(parsed.items(), log.items());
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(TranscriptLog::from_json_str("not json").is_err());
        assert!(TranscriptLog::from_json_str("{\"not\": \"an array\"}").is_err());
    }
}
