use botlink_protocol::ProtocolError;

/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Dialing the server failed.
    #[error("connect failed: {0}")]
    ConnectFailed(#[source] std::io::Error),

    /// The socket opened but the login exchange could not start.
    #[error("handshake failed: {0}")]
    Handshake(String),

    /// The session is closed.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Writing to the socket failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// A message could not be encoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
