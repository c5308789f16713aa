//! WebSocket implementation of the realtime transport.
//!
//! One session per connect call, no automatic reconnection: a failed or
//! dropped connection resolves to a Disconnected event and the trainee
//! retries manually.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};
use url::Url;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::transcript::{ModerationVerdict, Role, TranscriptItem};

use super::events::{ClientEvent, ConversationItem, ServerEvent};
use super::traits::{ConnectRequest, RealtimeTransport, TransportEvent};

type WsSink = futures_util::stream::SplitSink<
    WebSocketStream<MaybeTlsStream<TcpStream>>,
    WsMessage,
>;

/// Live connection state: outbound sink plus the inbound reader task.
struct WsHandle {
    sink: WsSink,
    reader: JoinHandle<()>,
}

/// Realtime transport over tokio-tungstenite.
pub struct WsTransport {
    url: String,
    connect_timeout: Duration,
    events: UnboundedSender<TransportEvent>,
    inner: Mutex<Option<WsHandle>>,
}

impl WsTransport {
    pub fn new(
        url: impl Into<String>,
        connect_timeout: Duration,
        events: UnboundedSender<TransportEvent>,
    ) -> Self {
        Self {
            url: url.into(),
            connect_timeout,
            events,
            inner: Mutex::new(None),
        }
    }

    async fn send_text(&self, payload: String) -> Result<()> {
        let mut inner = self.inner.lock().await;
        let handle = inner.as_mut().ok_or(Error::TransportClosed)?;
        handle
            .sink
            .send(WsMessage::Text(payload))
            .await
            .map_err(Error::WebSocket)
    }

    async fn send_client_event(&self, event: &ClientEvent) -> Result<()> {
        let payload = serde_json::to_string(event)?;
        self.send_text(payload).await
    }
}

#[async_trait]
impl RealtimeTransport for WsTransport {
    fn name(&self) -> &'static str {
        "websocket"
    }

    async fn connect(&self, request: ConnectRequest) -> Result<()> {
        let url = Url::parse(&self.url)
            .map_err(|e| Error::transport_connect(&self.url, e.to_string()))?;

        let mut ws_request = url
            .as_str()
            .into_client_request()
            .map_err(|e| Error::transport_connect(&self.url, e.to_string()))?;
        let bearer = format!("Bearer {}", request.credential.expose());
        ws_request.headers_mut().insert(
            AUTHORIZATION,
            HeaderValue::from_str(&bearer)
                .map_err(|e| Error::transport_connect(&self.url, e.to_string()))?,
        );

        debug!(url = %self.url, "Opening realtime transport");
        let (stream, _response) =
            tokio::time::timeout(self.connect_timeout, connect_async(ws_request))
                .await
                .map_err(|_| Error::transport_connect(&self.url, "connect timed out"))?
                .map_err(|e| Error::transport_connect(&self.url, e.to_string()))?;

        let (mut sink, mut source) = stream.split();

        // Seed the session: ordered persona list (root first), guardrails,
        // and opaque extra context.
        let persona_count = request.personas.len();
        let hello = serde_json::json!({
            "type": "session.create",
            "session": {
                "agents": request.personas,
                "output_guardrails": request.guardrails,
                "context": request.extra_context,
            },
        });
        sink.send(WsMessage::Text(hello.to_string()))
            .await
            .map_err(Error::WebSocket)?;

        // Reader task: translate server events until the stream ends.
        let events = self.events.clone();
        let reader = tokio::spawn(async move {
            while let Some(message) = source.next().await {
                match message {
                    Ok(WsMessage::Text(text)) => match serde_json::from_str::<ServerEvent>(&text) {
                        Ok(server_event) => {
                            if let Some(event) = map_server_event(server_event) {
                                if events.send(event).is_err() {
                                    break;
                                }
                            }
                        }
                        Err(e) => {
                            debug!(error = %e, "Skipping unparseable realtime event");
                        }
                    },
                    Ok(WsMessage::Close(frame)) => {
                        let reason = frame
                            .map(|f| f.reason.to_string())
                            .unwrap_or_else(|| "closed by runtime".to_string());
                        let _ = events.send(TransportEvent::Disconnected { reason });
                        break;
                    }
                    Ok(_) => {} // ping/pong/binary
                    Err(e) => {
                        let _ = events.send(TransportEvent::Disconnected {
                            reason: e.to_string(),
                        });
                        break;
                    }
                }
            }
        });

        *self.inner.lock().await = Some(WsHandle { sink, reader });
        info!(url = %self.url, personas = persona_count, "Realtime transport connected");
        Ok(())
    }

    async fn disconnect(&self) {
        let handle = self.inner.lock().await.take();
        if let Some(mut handle) = handle {
            if let Err(e) = handle.sink.send(WsMessage::Close(None)).await {
                debug!(error = %e, "Close frame not delivered");
            }
            handle.reader.abort();
            info!("Realtime transport disconnected");
        }
    }

    async fn send_event(&self, event: ClientEvent) -> Result<()> {
        self.send_client_event(&event).await
    }

    async fn send_user_text(&self, text: &str) -> Result<()> {
        self.send_client_event(&ClientEvent::ConversationItemCreate {
            item: ConversationItem::user_text_fresh(text),
        })
        .await?;
        self.send_client_event(&ClientEvent::ResponseCreate).await
    }

    async fn interrupt(&self) -> Result<()> {
        self.send_client_event(&ClientEvent::ResponseCancel).await
    }

    async fn mute(&self, muted: bool) -> Result<()> {
        self.send_client_event(&ClientEvent::output_muted(muted)).await
    }
}

/// Translate a wire event into a transport event. Returns `None` for events
/// the orchestrator doesn't consume.
fn map_server_event(event: ServerEvent) -> Option<TransportEvent> {
    match event {
        ServerEvent::SessionCreated => Some(TransportEvent::Connected),
        ServerEvent::SessionEnded { reason } => Some(TransportEvent::Disconnected {
            reason: reason.unwrap_or_else(|| "session ended".to_string()),
        }),
        ServerEvent::ItemCreated { item } => {
            let role = wire_role(&item.role)?;
            Some(TransportEvent::ItemAppended(TranscriptItem::message_with_id(
                item.id, role, item.text,
            )))
        }
        ServerEvent::ItemUpdated { item_id, text } => Some(TransportEvent::ItemUpdated {
            id: item_id,
            text,
        }),
        ServerEvent::AgentHandoff { agent } => {
            Some(TransportEvent::AgentHandoff { persona: agent })
        }
        ServerEvent::GuardrailTripped { item_id, category } => {
            Some(TransportEvent::GuardrailVerdict {
                item_id,
                verdict: ModerationVerdict::Flagged { category },
            })
        }
        ServerEvent::Error { message } => {
            warn!(message = %message, "Runtime error event");
            Some(TransportEvent::Error { message })
        }
        ServerEvent::Unknown => None,
    }
}

/// Map a wire role string onto a transcript role.
fn wire_role(role: &str) -> Option<Role> {
    match role {
        "user" => Some(Role::Trainee),
        "assistant" => Some(Role::Customer),
        other => {
            debug!(role = other, "Skipping item with unknown role");
            None
        }
    }
}
