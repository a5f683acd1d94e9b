//! Transport abstraction layer for botlink.
//!
//! Provides the [`Transport`] and [`Session`] traits the connection state
//! machine drives, plus a WebSocket client implementation.
//!
//! A transport reports remote activity through a [`SessionEvents`] sink
//! rather than return values: inbound messages and remote disconnects
//! arrive whenever the server sends them, independent of any call the
//! client is making.
//!
//! # Feature Flags
//!
//! - `websocket` (default) — WebSocket client via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
mod events;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
pub use events::{SessionEvent, SessionEvents};
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketSession, WebSocketTransport};

use std::fmt;

use botlink_protocol::{Credentials, Outbound};

/// Remote server address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Opens sessions to a remote server.
pub trait Transport: Send + Sync + 'static {
    /// The session type produced by this transport.
    type Session: Session;

    /// Dials `endpoint` and logs in with `credentials`.
    ///
    /// From the moment this returns `Ok`, remote messages and a remote
    /// disconnect are reported through `events`. A disconnect initiated
    /// locally via [`Session::disconnect`] is not reported.
    fn connect(
        &self,
        endpoint: &Endpoint,
        credentials: &Credentials,
        events: SessionEvents,
    ) -> impl std::future::Future<Output = Result<Self::Session, TransportError>> + Send;
}

/// One established session.
pub trait Session: Send + Sync + 'static {
    /// Sends a message to the server.
    fn send(
        &self,
        message: &Outbound,
    ) -> impl std::future::Future<Output = Result<(), TransportError>> + Send;

    /// Closes the session with `reason`. Calling it on a closed session
    /// does nothing.
    fn disconnect(&self, reason: &str) -> impl std::future::Future<Output = ()> + Send;

    /// Whether the underlying connection is still open.
    fn is_connected(&self) -> bool;
}
