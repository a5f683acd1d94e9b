//! WebSocket client transport using `tokio-tungstenite`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use botlink_protocol::{Codec, Credentials, JsonCodec, Outbound};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::{Endpoint, Session, SessionEvents, Transport, TransportError};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A [`Transport`] that dials `ws://host:port`.
///
/// After the socket opens, the first frame sent is
/// [`Outbound::Login`] carrying the profile name and access token.
#[derive(Debug, Clone, Default)]
pub struct WebSocketTransport<C = JsonCodec> {
    codec: Arc<C>,
}

impl WebSocketTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Codec> WebSocketTransport<C> {
    pub fn with_codec(codec: C) -> Self {
        Self {
            codec: Arc::new(codec),
        }
    }
}

impl<C: Codec> Transport for WebSocketTransport<C> {
    type Session = WebSocketSession<C>;

    async fn connect(
        &self,
        endpoint: &Endpoint,
        credentials: &Credentials,
        events: SessionEvents,
    ) -> Result<Self::Session, TransportError> {
        let name = credentials
            .display_name()
            .ok_or_else(|| TransportError::Handshake("credentials carry no profile".into()))?
            .to_owned();

        let url = format!("ws://{endpoint}");
        let (ws, _) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| {
                TransportError::ConnectFailed(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    e,
                ))
            })?;
        tracing::debug!(%endpoint, "WebSocket connected");

        let (sink, stream) = ws.split();
        let shared = Arc::new(Shared {
            sink: Mutex::new(sink),
            connected: AtomicBool::new(true),
        });

        let login = Outbound::Login {
            name,
            access_token: credentials.access_token.clone(),
        };
        shared.write(self.codec.as_ref(), &login).await?;

        let reader = tokio::spawn(read_loop(
            stream,
            Arc::clone(&shared),
            Arc::clone(&self.codec),
            events,
        ));

        Ok(WebSocketSession {
            shared,
            codec: Arc::clone(&self.codec),
            reader: reader.abort_handle(),
        })
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

struct Shared {
    sink: Mutex<SplitSink<WsStream, Message>>,
    /// Cleared by whichever side closes first. Only the side that clears
    /// it gets to act on the close.
    connected: AtomicBool,
}

impl Shared {
    async fn write<C: Codec>(&self, codec: &C, message: &Outbound) -> Result<(), TransportError> {
        let bytes = codec.encode_outbound(message)?;
        self.sink
            .lock()
            .await
            .send(Message::Binary(bytes.into()))
            .await
            .map_err(|e| {
                TransportError::SendFailed(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    e,
                ))
            })
    }
}

/// A live WebSocket session.
///
/// Dropping it stops the reader task without closing the socket politely;
/// call [`Session::disconnect`] first for a clean close.
pub struct WebSocketSession<C = JsonCodec> {
    shared: Arc<Shared>,
    codec: Arc<C>,
    reader: AbortHandle,
}

impl<C: Codec> Session for WebSocketSession<C> {
    async fn send(&self, message: &Outbound) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::ConnectionClosed("session is closed".into()));
        }
        self.shared.write(self.codec.as_ref(), message).await
    }

    async fn disconnect(&self, reason: &str) {
        if !self.shared.connected.swap(false, Ordering::SeqCst) {
            return;
        }
        let goodbye = Outbound::Disconnect {
            reason: reason.to_owned(),
        };
        if let Err(e) = self.shared.write(self.codec.as_ref(), &goodbye).await {
            tracing::debug!(error = %e, "could not send disconnect notice");
        }
        if let Err(e) = self.shared.sink.lock().await.close().await {
            tracing::debug!(error = %e, "close handshake failed");
        }
        self.reader.abort();
        tracing::debug!(reason, "WebSocket session closed locally");
    }

    fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::SeqCst)
    }
}

impl<C> Drop for WebSocketSession<C> {
    fn drop(&mut self) {
        self.shared.connected.store(false, Ordering::SeqCst);
        self.reader.abort();
    }
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

async fn read_loop<C: Codec>(
    mut stream: SplitStream<WsStream>,
    shared: Arc<Shared>,
    codec: Arc<C>,
    events: SessionEvents,
) {
    let reason = loop {
        let bytes = match stream.next().await {
            Some(Ok(Message::Binary(data))) => data.to_vec(),
            Some(Ok(Message::Text(text))) => text.as_bytes().to_vec(),
            Some(Ok(Message::Close(frame))) => {
                break frame
                    .map(|f| f.reason.as_str().to_owned())
                    .filter(|r| !r.is_empty())
                    .unwrap_or_else(|| "connection closed by server".to_owned());
            }
            Some(Ok(_)) => continue, // ping/pong/raw frame
            Some(Err(e)) => break format!("read failed: {e}"),
            None => break "connection closed by server".to_owned(),
        };

        match codec.decode_inbound(&bytes) {
            Ok(message) => {
                events.message_received(message);
            }
            Err(e) => tracing::warn!(error = %e, "dropping undecodable frame"),
        }
    };

    if shared.connected.swap(false, Ordering::SeqCst) {
        tracing::debug!(%reason, "WebSocket session closed remotely");
        events.disconnected(reason);
    }
}
