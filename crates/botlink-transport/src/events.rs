//! The callback sink a transport uses to report what happens on a session.

use botlink_protocol::Inbound;
use tokio::sync::mpsc;

/// Something the remote side did.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    MessageReceived(Inbound),
    /// The session ended without the client asking for it.
    Disconnected(String),
}

/// Cloneable sender handed to [`Transport::connect`](crate::Transport::connect).
///
/// Sending never blocks. Once the receiving side is gone, events are
/// silently dropped; the return values tell the caller whether anyone
/// was listening.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl SessionEvents {
    /// Creates a sink and the receiver that drains it.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn message_received(&self, message: Inbound) -> bool {
        self.tx.send(SessionEvent::MessageReceived(message)).is_ok()
    }

    pub fn disconnected(&self, reason: impl Into<String>) -> bool {
        self.tx.send(SessionEvent::Disconnected(reason.into())).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
