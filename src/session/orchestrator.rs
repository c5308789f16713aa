//! Session orchestrator.
//!
//! Owns the connection state machine and the transcript, and drives the
//! realtime transport: connect with the active persona as conversation root,
//! push turn-detection configuration, trigger the scripted greeting, apply
//! automatic handoffs, and keep the transport mute flag in sync with the
//! playback preference.
//!
//! Asynchronous steps (credential fetch, transport connect) are guarded by a
//! generation counter: every connect and disconnect bumps it, and a resumed
//! step whose generation no longer matches discards its result instead of
//! advancing the state machine.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::config::SessionSettings;
use crate::credential::{ClientSecret, CredentialProvider};
use crate::guardrail::moderation_guardrail;
use crate::persona::{PersonaKind, Registry};
use crate::scoring::{self, EvaluationResult};
use crate::transcript::{Role, TranscriptItem, TranscriptLog};
use crate::transport::events::{ClientEvent, ConversationItem, TurnDetection};
use crate::transport::traits::{
    ConnectRequest, PersonaDescriptor, RealtimeTransport, TransportEvent,
};

use super::prefs::AudioPrefs;
use super::state::{SessionState, SessionStatus};

/// Drives one training session at a time.
///
/// Methods take `&self`; all mutable session state sits behind locks that are
/// held only for synchronous sections, never across an await.
pub struct Orchestrator {
    registry: Arc<Registry>,
    transport: Arc<dyn RealtimeTransport>,
    credentials: Arc<dyn CredentialProvider>,
    settings: SessionSettings,
    prefs_path: PathBuf,
    state: RwLock<SessionState>,
    transcript: RwLock<TranscriptLog>,
}

impl Orchestrator {
    pub fn new(
        registry: Arc<Registry>,
        transport: Arc<dyn RealtimeTransport>,
        credentials: Arc<dyn CredentialProvider>,
        settings: SessionSettings,
        prefs_path: PathBuf,
    ) -> Self {
        let prefs = AudioPrefs::load(
            &prefs_path,
            AudioPrefs {
                playback_enabled: settings.playback_enabled,
            },
        );
        Self {
            registry,
            transport,
            credentials,
            settings,
            prefs_path,
            state: RwLock::new(SessionState::new(prefs.playback_enabled)),
            transcript: RwLock::new(TranscriptLog::new()),
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────

    pub fn status(&self) -> SessionStatus {
        self.state.read().status
    }

    pub fn active_persona(&self) -> Option<PersonaKind> {
        self.state.read().active_persona
    }

    /// Whether the latest persona change came from an automatic handoff.
    pub fn handoff_triggered(&self) -> bool {
        self.state.read().handoff_triggered
    }

    pub fn playback_enabled(&self) -> bool {
        self.state.read().playback_enabled
    }

    /// Owned snapshot of the transcript for scoring or export.
    pub fn transcript_snapshot(&self) -> Vec<TranscriptItem> {
        self.transcript.read().snapshot()
    }

    pub fn transcript_is_empty(&self) -> bool {
        self.transcript.read().is_empty()
    }

    /// Plain-text transcript rendering (chronological).
    pub fn export_transcript_text(&self) -> String {
        self.transcript.read().export_text()
    }

    /// Transcript as a JSON array.
    pub fn transcript_json(&self) -> crate::error::Result<String> {
        self.transcript.read().to_json_string()
    }

    // ─────────────────────────────────────────────────────────────
    // Persona Selection
    // ─────────────────────────────────────────────────────────────

    /// Switch to a new persona: clear the transcript, force a disconnect
    /// (idempotent), and activate the selection.
    pub async fn select_persona(&self, kind: PersonaKind) {
        self.transcript.write().clear();
        self.disconnect().await;

        let mut state = self.state.write();
        state.active_persona = Some(kind);
        state.handoff_triggered = false;
        info!(persona = kind.slug(), "Persona selected");
    }

    /// Clear the transcript for a fresh attempt with the same persona.
    pub fn retry(&self) {
        self.transcript.write().clear();
    }

    /// Advance to the next catalog persona (wrapping), clearing the
    /// transcript.
    pub async fn next_persona(&self) -> PersonaKind {
        let current = self
            .state
            .read()
            .active_persona
            .unwrap_or_else(|| self.registry.default_persona());
        let next = current.next();
        self.select_persona(next).await;
        next
    }

    // ─────────────────────────────────────────────────────────────
    // Connect / Disconnect
    // ─────────────────────────────────────────────────────────────

    /// Open a session for the active persona.
    ///
    /// A no-op unless currently disconnected. Credential or transport
    /// failures land back in `Disconnected` with a log line; the trainee
    /// retries manually.
    pub async fn connect(&self) {
        let (generation, active) = {
            let mut state = self.state.write();
            match state.status {
                SessionStatus::Connecting | SessionStatus::Connected => {
                    debug!(status = %state.status, "Connect ignored; session already active");
                    return;
                }
                SessionStatus::Disconnected => {}
            }

            let active = match state.active_persona {
                Some(kind) => kind,
                None => {
                    // Configuration-error recovery: redirect to the default
                    // persona rather than surfacing a failure.
                    let fallback = self.registry.default_persona();
                    warn!(persona = fallback.slug(), "No persona selected; using default");
                    state.active_persona = Some(fallback);
                    fallback
                }
            };

            state.status = SessionStatus::Connecting;
            state.generation += 1;
            (state.generation, active)
        };

        let secret = match self.credentials.fetch().await {
            Ok(Some(secret)) => secret,
            Ok(None) => {
                warn!("Credential provider returned no secret; aborting connect");
                self.abort_connect(generation);
                return;
            }
            Err(e) => {
                warn!(error = %e, "Credential fetch failed; aborting connect");
                self.abort_connect(generation);
                return;
            }
        };

        if self.superseded(generation) {
            debug!("Connect superseded during credential fetch; discarding");
            return;
        }

        let request = self.build_connect_request(active, secret);
        match self.transport.connect(request).await {
            Ok(()) => {
                let superseded = {
                    let mut state = self.state.write();
                    if state.generation != generation {
                        true
                    } else {
                        state.status = SessionStatus::Connected;
                        state.handoff_triggered = false;
                        false
                    }
                };
                if superseded {
                    debug!("Connect confirmed after supersession; tearing down");
                    self.transport.disconnect().await;
                    return;
                }
                info!(persona = active.slug(), "Session connected");
                self.configure_session().await;
            }
            Err(e) => {
                warn!(error = %e, "Transport connect failed");
                self.abort_connect(generation);
            }
        }
    }

    /// Tear the session down. Unconditionally lands in `Disconnected`, never
    /// fails, and keeps the transcript for review and evaluation.
    pub async fn disconnect(&self) {
        {
            let mut state = self.state.write();
            state.generation += 1;
            state.status = SessionStatus::Disconnected;
        }
        self.transport.disconnect().await;
    }

    /// Reset to `Disconnected` unless a newer attempt has taken over.
    fn abort_connect(&self, generation: u64) {
        let mut state = self.state.write();
        if state.generation == generation {
            state.status = SessionStatus::Disconnected;
        }
    }

    fn superseded(&self, generation: u64) -> bool {
        self.state.read().generation != generation
    }

    /// Ordered persona list with the active persona first (it becomes the
    /// conversation root), plus the moderation guardrail for the configured
    /// company.
    fn build_connect_request(&self, active: PersonaKind, credential: ClientSecret) -> ConnectRequest {
        let mut personas: Vec<PersonaDescriptor> = self
            .registry
            .personas()
            .iter()
            .map(PersonaDescriptor::from_persona)
            .collect();
        if let Some(idx) = personas.iter().position(|p| p.name == active.slug()) {
            if idx > 0 {
                let root = personas.remove(idx);
                personas.insert(0, root);
            }
        }

        ConnectRequest {
            credential,
            personas,
            guardrails: vec![moderation_guardrail(&self.settings.company_name)],
            extra_context: serde_json::json!({ "scenario": "claims-training" }),
        }
    }

    /// Post-connect configuration: turn detection, scripted greeting, mute
    /// sync. All best effort; failures are logged and never unwind the
    /// connection.
    async fn configure_session(&self) {
        let config = TurnDetection::from_settings(&self.settings);
        if let Err(e) = self
            .transport
            .send_event(ClientEvent::turn_detection(config))
            .await
        {
            warn!(error = %e, "Failed to push turn-detection configuration");
        }

        let trigger = self.settings.greeting_trigger.clone();
        self.send_simulated_user_message(&trigger).await;

        self.sync_mute().await;
    }

    /// Inject a synthetic trainee utterance so the persona delivers its
    /// scripted greeting without the human speaking first. The transcript
    /// item is hidden so it never reaches display, export, or scoring.
    async fn send_simulated_user_message(&self, text: &str) {
        let item = TranscriptItem::hidden_message(Role::Trainee, text);
        let wire = ConversationItem::user_text(item.id.clone(), text);
        self.transcript.write().push(item);

        if let Err(e) = self
            .transport
            .send_event(ClientEvent::ConversationItemCreate { item: wire })
            .await
        {
            warn!(error = %e, "Failed to send greeting trigger");
            return;
        }
        if let Err(e) = self.transport.send_event(ClientEvent::ResponseCreate).await {
            warn!(error = %e, "Failed to request greeting response");
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Transport Events
    // ─────────────────────────────────────────────────────────────

    /// Apply one transport event to the session.
    pub fn handle_event(&self, event: TransportEvent) {
        match event {
            TransportEvent::Connected => {
                let mut state = self.state.write();
                if state.status == SessionStatus::Connecting {
                    state.status = SessionStatus::Connected;
                }
            }
            TransportEvent::Disconnected { reason } => {
                info!(reason = %reason, "Transport reported disconnect");
                self.state.write().status = SessionStatus::Disconnected;
            }
            TransportEvent::AgentHandoff { persona } => match persona.parse::<PersonaKind>() {
                Ok(kind) => {
                    {
                        let mut state = self.state.write();
                        state.active_persona = Some(kind);
                        state.handoff_triggered = true;
                    }
                    self.transcript.write().push(TranscriptItem::breadcrumb(
                        format!("Handoff to {}", kind.display_name()),
                        None,
                    ));
                    info!(persona = kind.slug(), "Automatic handoff");
                }
                Err(_) => {
                    warn!(persona = %persona, "Handoff to unknown persona ignored");
                }
            },
            TransportEvent::ItemAppended(item) => {
                self.transcript.write().push(item);
            }
            TransportEvent::ItemUpdated { id, text } => {
                self.transcript.write().update_message_text(&id, text);
            }
            TransportEvent::GuardrailVerdict { item_id, verdict } => {
                self.transcript.write().attach_moderation(&item_id, verdict);
            }
            TransportEvent::Error { message } => {
                warn!(message = %message, "Transport error event");
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Playback / Mute
    // ─────────────────────────────────────────────────────────────

    /// Toggle persona audio playback. The preference is persisted and the
    /// transport mute flag resynchronized; a mute failure is non-fatal.
    pub async fn set_playback(&self, enabled: bool) {
        self.state.write().playback_enabled = enabled;
        AudioPrefs {
            playback_enabled: enabled,
        }
        .save(&self.prefs_path);
        self.sync_mute().await;
    }

    async fn sync_mute(&self) {
        let muted = !self.playback_enabled();
        if let Err(e) = self.transport.mute(muted).await {
            warn!(error = %e, "Mute sync failed");
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Evaluation
    // ─────────────────────────────────────────────────────────────

    /// Score a consistent snapshot of the current transcript against the
    /// active persona. Items arriving after the snapshot go into the next
    /// run, not this one.
    pub fn evaluate(&self) -> EvaluationResult {
        let label = self
            .active_persona()
            .map(|k| k.display_name())
            .unwrap_or("Customer");
        let snapshot = self.transcript_snapshot();
        scoring::evaluate(&snapshot, label)
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::StaticCredentialProvider;
    use crate::transport::mock::{MockTransport, MockTransportConfig};
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::sync::mpsc;

    struct Fixture {
        orchestrator: Arc<Orchestrator>,
        transport: Arc<MockTransport>,
        _events: mpsc::UnboundedReceiver<TransportEvent>,
        tmp: TempDir,
    }

    fn fixture() -> Fixture {
        fixture_with(
            MockTransportConfig::default(),
            StaticCredentialProvider::fixed("ek_test"),
        )
    }

    fn fixture_with(config: MockTransportConfig, credentials: StaticCredentialProvider) -> Fixture {
        let tmp = TempDir::new().unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        let transport = Arc::new(MockTransport::with_config(config, tx));
        let orchestrator = Arc::new(Orchestrator::new(
            Arc::new(Registry::new().unwrap()),
            transport.clone(),
            Arc::new(credentials),
            SessionSettings::default(),
            tmp.path().join("preferences.json"),
        ));
        Fixture {
            orchestrator,
            transport,
            _events: rx,
            tmp,
        }
    }

    #[tokio::test]
    async fn test_connect_happy_path() {
        let f = fixture();
        f.orchestrator.select_persona(PersonaKind::HouseFire).await;
        f.orchestrator.connect().await;

        assert_eq!(f.orchestrator.status(), SessionStatus::Connected);
        assert_eq!(f.transport.call_count("connect"), 1);

        // The active persona leads the list; the rest of the catalog follows.
        let request = f.transport.last_connect_request().unwrap();
        assert_eq!(request.personas.len(), 6);
        assert_eq!(request.personas[0].name, "house-fire");
        assert_eq!(request.guardrails.len(), 1);
        assert_eq!(request.guardrails[0].company_name, "Meridian Mutual");

        // Turn detection pushed, then the greeting trigger pair.
        let events = f.transport.sent_events();
        assert!(matches!(&events[0], ClientEvent::SessionUpdate { session }
            if session.turn_detection.is_some()));
        assert!(matches!(&events[1], ClientEvent::ConversationItemCreate { .. }));
        assert!(matches!(&events[2], ClientEvent::ResponseCreate));

        // Greeting trigger is in the transcript but hidden.
        let snapshot = f.orchestrator.transcript_snapshot();
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot[0].is_hidden());

        // Mute resynced after connect (playback on -> unmuted).
        assert_eq!(f.transport.mute_calls(), vec![false]);
    }

    #[tokio::test]
    async fn test_connect_is_noop_when_already_connected() {
        let f = fixture();
        f.orchestrator.select_persona(PersonaKind::AutoClaim).await;
        f.orchestrator.connect().await;
        f.orchestrator.connect().await;

        assert_eq!(f.transport.call_count("connect"), 1);
    }

    #[tokio::test]
    async fn test_connect_without_selection_uses_default_persona() {
        let f = fixture();
        f.orchestrator.connect().await;

        assert_eq!(f.orchestrator.status(), SessionStatus::Connected);
        assert_eq!(f.orchestrator.active_persona(), Some(PersonaKind::AutoClaim));
    }

    #[tokio::test]
    async fn test_absent_credential_aborts_without_transport_call() {
        let f = fixture_with(
            MockTransportConfig::default(),
            StaticCredentialProvider::absent(),
        );
        f.orchestrator.select_persona(PersonaKind::AutoClaim).await;
        f.orchestrator.connect().await;

        assert_eq!(f.orchestrator.status(), SessionStatus::Disconnected);
        assert_eq!(f.transport.call_count("connect"), 0);
    }

    #[tokio::test]
    async fn test_credential_failure_aborts() {
        let f = fixture_with(
            MockTransportConfig::default(),
            StaticCredentialProvider::failing(),
        );
        f.orchestrator.connect().await;
        assert_eq!(f.orchestrator.status(), SessionStatus::Disconnected);
    }

    #[tokio::test]
    async fn test_transport_failure_lands_disconnected() {
        let f = fixture_with(
            MockTransportConfig {
                fail_connect: true,
                ..Default::default()
            },
            StaticCredentialProvider::fixed("ek_test"),
        );
        f.orchestrator.connect().await;
        assert_eq!(f.orchestrator.status(), SessionStatus::Disconnected);
    }

    #[tokio::test]
    async fn test_disconnect_from_any_state() {
        let f = fixture();

        // Disconnected -> still fine
        f.orchestrator.disconnect().await;
        assert_eq!(f.orchestrator.status(), SessionStatus::Disconnected);

        // Connected -> back to disconnected, transcript kept
        f.orchestrator.connect().await;
        assert!(!f.orchestrator.transcript_is_empty());
        f.orchestrator.disconnect().await;
        assert_eq!(f.orchestrator.status(), SessionStatus::Disconnected);
        assert!(!f.orchestrator.transcript_is_empty());
    }

    #[tokio::test]
    async fn test_late_connect_result_is_discarded() {
        let f = fixture_with(
            MockTransportConfig {
                hold_connect: true,
                ..Default::default()
            },
            StaticCredentialProvider::fixed("ek_test"),
        );

        let orchestrator = f.orchestrator.clone();
        let task = tokio::spawn(async move { orchestrator.connect().await });

        // Wait until the attempt is parked inside the transport.
        for _ in 0..200 {
            if f.transport.call_count("connect") == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        assert_eq!(f.orchestrator.status(), SessionStatus::Connecting);

        // A second connect while CONNECTING is a no-op.
        f.orchestrator.connect().await;
        assert_eq!(f.transport.call_count("connect"), 1);

        // Supersede the attempt, then let it resolve.
        f.orchestrator.disconnect().await;
        f.transport.release_connect();
        task.await.unwrap();

        // The late confirmation must not advance the state machine, and the
        // orphaned transport session is torn down.
        assert_eq!(f.orchestrator.status(), SessionStatus::Disconnected);
        assert_eq!(f.transport.call_count("disconnect"), 2);
    }

    #[tokio::test]
    async fn test_handoff_switches_persona_without_clearing() {
        let f = fixture();
        f.orchestrator.select_persona(PersonaKind::AutoClaim).await;
        f.orchestrator.connect().await;

        f.orchestrator.handle_event(TransportEvent::ItemAppended(
            TranscriptItem::message(Role::Customer, "let me put you through"),
        ));
        let before = f.orchestrator.transcript_snapshot().len();

        f.orchestrator.handle_event(TransportEvent::AgentHandoff {
            persona: "windshield".to_string(),
        });

        assert_eq!(f.orchestrator.active_persona(), Some(PersonaKind::Windshield));
        assert!(f.orchestrator.handoff_triggered());
        assert_eq!(f.orchestrator.status(), SessionStatus::Connected);
        // Breadcrumb appended; nothing cleared
        assert_eq!(f.orchestrator.transcript_snapshot().len(), before + 1);
    }

    #[tokio::test]
    async fn test_handoff_to_unknown_persona_ignored() {
        let f = fixture();
        f.orchestrator.select_persona(PersonaKind::AutoClaim).await;
        f.orchestrator.handle_event(TransportEvent::AgentHandoff {
            persona: "lizard-wizard".to_string(),
        });
        assert_eq!(f.orchestrator.active_persona(), Some(PersonaKind::AutoClaim));
        assert!(!f.orchestrator.handoff_triggered());
    }

    #[tokio::test]
    async fn test_select_persona_clears_transcript_and_disconnects() {
        let f = fixture();
        f.orchestrator.connect().await;
        f.orchestrator.handle_event(TransportEvent::ItemAppended(
            TranscriptItem::message(Role::Trainee, "hello"),
        ));

        f.orchestrator.select_persona(PersonaKind::ConfusedElderly).await;

        assert_eq!(f.orchestrator.status(), SessionStatus::Disconnected);
        assert_eq!(
            f.orchestrator.active_persona(),
            Some(PersonaKind::ConfusedElderly)
        );
        assert!(f.orchestrator.transcript_is_empty());
        assert!(!f.orchestrator.handoff_triggered());
    }

    #[tokio::test]
    async fn test_retry_and_next_persona() {
        let f = fixture();
        f.orchestrator.select_persona(PersonaKind::AutoClaim).await;
        f.orchestrator.handle_event(TransportEvent::ItemAppended(
            TranscriptItem::message(Role::Trainee, "hello"),
        ));

        f.orchestrator.retry();
        assert!(f.orchestrator.transcript_is_empty());
        assert_eq!(f.orchestrator.active_persona(), Some(PersonaKind::AutoClaim));

        let next = f.orchestrator.next_persona().await;
        assert_eq!(next, PersonaKind::ConfusedElderly);
        assert_eq!(f.orchestrator.active_persona(), Some(next));
    }

    #[tokio::test]
    async fn test_set_playback_persists_and_syncs_mute() {
        let f = fixture();
        f.orchestrator.set_playback(false).await;

        assert!(!f.orchestrator.playback_enabled());
        assert_eq!(f.transport.mute_calls().last(), Some(&true));

        // A fresh orchestrator over the same prefs file sees the toggle.
        let (tx, _rx) = mpsc::unbounded_channel();
        let transport = Arc::new(MockTransport::new(tx));
        let reloaded = Orchestrator::new(
            Arc::new(Registry::new().unwrap()),
            transport,
            Arc::new(StaticCredentialProvider::fixed("ek_test")),
            SessionSettings::default(),
            f.tmp.path().join("preferences.json"),
        );
        assert!(!reloaded.playback_enabled());
    }

    #[tokio::test]
    async fn test_mute_failure_is_nonfatal() {
        let f = fixture_with(
            MockTransportConfig {
                fail_mute: true,
                ..Default::default()
            },
            StaticCredentialProvider::fixed("ek_test"),
        );
        f.orchestrator.connect().await;
        assert_eq!(f.orchestrator.status(), SessionStatus::Connected);

        f.orchestrator.set_playback(false).await;
        assert!(!f.orchestrator.playback_enabled());
    }

    #[tokio::test]
    async fn test_evaluate_scores_current_snapshot() {
        let f = fixture();
        f.orchestrator.select_persona(PersonaKind::AutoClaim).await;
        f.orchestrator.handle_event(TransportEvent::ItemAppended(
            TranscriptItem::message(
                Role::Trainee,
                "I understand this is frustrating, let me check what I can do",
            ),
        ));

        let result = f.orchestrator.evaluate();
        assert_eq!(result.overall, 90);
        assert!(result.passed);
        assert!(result.summary.contains("auto claim"));
    }

    #[tokio::test]
    async fn test_transcript_updates_and_guardrails_flow_through() {
        let f = fixture();
        f.orchestrator.handle_event(TransportEvent::ItemAppended(
            TranscriptItem::message_with_id("i1", Role::Customer, "[transcribing]"),
        ));
        f.orchestrator.handle_event(TransportEvent::ItemUpdated {
            id: "i1".to_string(),
            text: "What is going on with my claim?".to_string(),
        });
        f.orchestrator.handle_event(TransportEvent::GuardrailVerdict {
            item_id: "i1".to_string(),
            verdict: crate::transcript::ModerationVerdict::Pass,
        });

        let snapshot = f.orchestrator.transcript_snapshot();
        assert_eq!(snapshot[0].text(), Some("What is going on with my claim?"));
    }
}
