//! Mock transport for testing.
//!
//! Provides a mock implementation of RealtimeTransport with failure
//! injection, call counting, and event injection, so orchestrator behavior
//! can be tested without a network.

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Notify;

use crate::error::{Error, Result};

use super::events::ClientEvent;
use super::traits::{ConnectRequest, RealtimeTransport, TransportEvent};

// ─────────────────────────────────────────────────────────────────
// Mock Transport Configuration
// ─────────────────────────────────────────────────────────────────

/// Configuration for mock transport behavior
#[derive(Debug, Clone, Default)]
pub struct MockTransportConfig {
    /// Fail the connect call
    pub fail_connect: bool,

    /// Fail mute calls
    pub fail_mute: bool,

    /// Fail send_event / send_user_text calls
    pub fail_send: bool,

    /// Park the connect call until `release_connect` is invoked, to exercise
    /// disconnect-while-connecting races
    pub hold_connect: bool,
}

// ─────────────────────────────────────────────────────────────────
// Mock Transport
// ─────────────────────────────────────────────────────────────────

/// Track method call counts for verification
#[derive(Debug, Default, Clone)]
struct CallCounts {
    connect: u32,
    disconnect: u32,
    send_event: u32,
    send_user_text: u32,
    interrupt: u32,
    mute: u32,
}

/// Mock implementation of RealtimeTransport for testing
pub struct MockTransport {
    config: MockTransportConfig,
    events: UnboundedSender<TransportEvent>,
    connected: RwLock<bool>,
    counts: RwLock<CallCounts>,
    last_connect: RwLock<Option<ConnectRequest>>,
    sent_events: RwLock<Vec<ClientEvent>>,
    sent_texts: RwLock<Vec<String>>,
    mute_calls: RwLock<Vec<bool>>,
    connect_gate: Notify,
}

impl MockTransport {
    /// Create a new mock transport with default configuration
    pub fn new(events: UnboundedSender<TransportEvent>) -> Self {
        Self::with_config(MockTransportConfig::default(), events)
    }

    /// Create a new mock transport with custom configuration
    pub fn with_config(config: MockTransportConfig, events: UnboundedSender<TransportEvent>) -> Self {
        Self {
            config,
            events,
            connected: RwLock::new(false),
            counts: RwLock::new(CallCounts::default()),
            last_connect: RwLock::new(None),
            sent_events: RwLock::new(Vec::new()),
            sent_texts: RwLock::new(Vec::new()),
            mute_calls: RwLock::new(Vec::new()),
            connect_gate: Notify::new(),
        }
    }

    /// Let a held connect call proceed (see `hold_connect`)
    pub fn release_connect(&self) {
        self.connect_gate.notify_one();
    }

    /// Inject a transport event, as if the runtime had sent it
    pub fn emit(&self, event: TransportEvent) {
        let _ = self.events.send(event);
    }

    /// Get the number of times a method was called
    pub fn call_count(&self, method: &str) -> u32 {
        let counts = self.counts.read();
        match method {
            "connect" => counts.connect,
            "disconnect" => counts.disconnect,
            "send_event" => counts.send_event,
            "send_user_text" => counts.send_user_text,
            "interrupt" => counts.interrupt,
            "mute" => counts.mute,
            _ => 0,
        }
    }

    /// The request passed to the most recent connect call
    pub fn last_connect_request(&self) -> Option<ConnectRequest> {
        self.last_connect.read().clone()
    }

    /// Every client event sent so far
    pub fn sent_events(&self) -> Vec<ClientEvent> {
        self.sent_events.read().clone()
    }

    /// Every typed trainee message sent so far
    pub fn sent_texts(&self) -> Vec<String> {
        self.sent_texts.read().clone()
    }

    /// Every mute flag applied so far
    pub fn mute_calls(&self) -> Vec<bool> {
        self.mute_calls.read().clone()
    }

    /// Whether the mock currently considers itself connected
    pub fn is_connected(&self) -> bool {
        *self.connected.read()
    }
}

#[async_trait]
impl RealtimeTransport for MockTransport {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn connect(&self, request: ConnectRequest) -> Result<()> {
        self.counts.write().connect += 1;
        *self.last_connect.write() = Some(request);

        if self.config.hold_connect {
            self.connect_gate.notified().await;
        }

        if self.config.fail_connect {
            return Err(Error::transport_connect("mock", "injected failure"));
        }

        *self.connected.write() = true;
        let _ = self.events.send(TransportEvent::Connected);
        Ok(())
    }

    async fn disconnect(&self) {
        self.counts.write().disconnect += 1;
        let was_connected = {
            let mut connected = self.connected.write();
            std::mem::replace(&mut *connected, false)
        };
        if was_connected {
            let _ = self.events.send(TransportEvent::Disconnected {
                reason: "client disconnect".to_string(),
            });
        }
    }

    async fn send_event(&self, event: ClientEvent) -> Result<()> {
        self.counts.write().send_event += 1;
        if self.config.fail_send {
            return Err(Error::Transport("injected send failure".to_string()));
        }
        if !*self.connected.read() {
            return Err(Error::TransportClosed);
        }
        self.sent_events.write().push(event);
        Ok(())
    }

    async fn send_user_text(&self, text: &str) -> Result<()> {
        self.counts.write().send_user_text += 1;
        if self.config.fail_send {
            return Err(Error::Transport("injected send failure".to_string()));
        }
        if !*self.connected.read() {
            return Err(Error::TransportClosed);
        }
        self.sent_texts.write().push(text.to_string());
        Ok(())
    }

    async fn interrupt(&self) -> Result<()> {
        self.counts.write().interrupt += 1;
        Ok(())
    }

    async fn mute(&self, muted: bool) -> Result<()> {
        self.counts.write().mute += 1;
        if self.config.fail_mute {
            return Err(Error::Transport("injected mute failure".to_string()));
        }
        self.mute_calls.write().push(muted);
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
