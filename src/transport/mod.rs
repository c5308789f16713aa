//! Realtime transport boundary.
//!
//! The session orchestrator talks to the external agent runtime exclusively
//! through the [`RealtimeTransport`] trait. `realtime` is the WebSocket
//! implementation; `mock` is the failure-injectable test implementation.

pub mod events;
pub mod mock;
pub mod realtime;
pub mod traits;

pub use events::{ClientEvent, ConversationItem, ServerEvent, TurnDetection};
pub use mock::{MockTransport, MockTransportConfig};
pub use realtime::WsTransport;
pub use traits::{ConnectRequest, PersonaDescriptor, RealtimeTransport, TransportEvent};
