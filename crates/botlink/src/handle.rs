//! Public handle to the connection actor.

use std::fmt;

use botlink_auth::Authenticator;
use botlink_transport::Transport;
use tokio::sync::{mpsc, oneshot};

use crate::machine::{Command, ConnectionMachine, Trigger};
use crate::{ClientError, Settings, StatusReport};

const COMMAND_CHANNEL_SIZE: usize = 64;

/// How a connect request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    Connected,
    /// A connection was already up or being established.
    AlreadyActive,
    AuthFailed(String),
    ConnectFailed(String),
    /// A disconnect or shutdown cancelled the attempt.
    Aborted(String),
}

impl ConnectOutcome {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for ConnectOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => f.write_str("connected"),
            Self::AlreadyActive => f.write_str("already connected or connecting"),
            Self::AuthFailed(reason) => write!(f, "authentication failed: {reason}"),
            Self::ConnectFailed(reason) => write!(f, "connection failed: {reason}"),
            Self::Aborted(reason) => write!(f, "aborted: {reason}"),
        }
    }
}

/// Pending result of a [`ConnectionHandle::connect`] call.
///
/// The connect runs whether or not the ticket is awaited.
#[derive(Debug)]
pub struct ConnectTicket {
    reply: oneshot::Receiver<ConnectOutcome>,
}

impl ConnectTicket {
    /// Waits for the attempt to finish.
    pub async fn outcome(self) -> ConnectOutcome {
        self.reply
            .await
            .unwrap_or_else(|_| ConnectOutcome::Aborted("client stopped".into()))
    }
}

/// Handle to a running connection actor.
///
/// Cheap to clone. The actor stops once every handle is dropped or
/// [`shutdown`](Self::shutdown) is called.
pub struct ConnectionHandle<T: Transport> {
    sender: mpsc::Sender<Command<T>>,
}

impl<T: Transport> Clone for ConnectionHandle<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T: Transport> ConnectionHandle<T> {
    /// Spawns the actor on the current runtime. It starts `Offline`.
    pub fn spawn<A: Authenticator>(authenticator: A, transport: T, settings: Settings) -> Self {
        let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let machine = ConnectionMachine::new(authenticator, transport, settings, tx.downgrade(), rx);
        tokio::spawn(machine.run());
        Self { sender: tx }
    }

    /// Starts a manual connect. Returns once the actor accepted the request;
    /// await the ticket for the result.
    pub async fn connect(&self) -> Result<ConnectTicket, ClientError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Connect {
            trigger: Trigger::Manual,
            reply: Some(reply_tx),
        })
        .await?;
        Ok(ConnectTicket { reply: reply_rx })
    }

    /// Tears the connection down and stops automatic reconnects until the
    /// next manual connect. Safe to call in any state.
    pub async fn disconnect(&self, reason: &str) -> Result<(), ClientError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Disconnect {
            reason: reason.to_owned(),
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| ClientError::Unavailable)
    }

    pub async fn status(&self) -> Result<StatusReport, ClientError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Status { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| ClientError::Unavailable)
    }

    /// `Online` and the session reports itself alive.
    pub async fn is_connected(&self) -> Result<bool, ClientError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::IsConnected { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| ClientError::Unavailable)
    }

    /// Applies new settings. The current session is left alone; a new
    /// endpoint or account is used from the next connect.
    pub async fn reconfigure(&self, settings: Settings) -> Result<(), ClientError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Reconfigure {
            settings: Box::new(settings),
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| ClientError::Unavailable)
    }

    /// Disconnects and stops the actor.
    pub async fn shutdown(&self) -> Result<(), ClientError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Shutdown { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| ClientError::Unavailable)
    }

    /// One liveness pass: credential refresh, keep-alive and idle checks.
    pub async fn run_liveness_check(&self) -> Result<(), ClientError> {
        self.send(Command::LivenessCheck).await
    }

    /// One reconnect-check pass.
    pub async fn run_reconnect_check(&self) -> Result<(), ClientError> {
        self.send(Command::ReconnectCheck).await
    }

    /// The actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    async fn send(&self, command: Command<T>) -> Result<(), ClientError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| ClientError::Unavailable)
    }
}
