//! Mock collaborators shared by the integration suites.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use botlink::{AccountSettings, ReconnectPolicy, Settings};
use botlink_auth::{AccountType, AuthError, Authenticator};
use botlink_protocol::{Credentials, Inbound, Outbound, Profile};
use botlink_transport::{Endpoint, Session, SessionEvents, Transport, TransportError};

// ---------------------------------------------------------------------------
// Authenticator
// ---------------------------------------------------------------------------

/// Issues a token for any account. Clones share counters and switches.
#[derive(Clone, Default)]
pub struct MockAuthenticator {
    logins: Arc<AtomicUsize>,
    refreshes: Arc<AtomicUsize>,
    fail_login: Arc<AtomicBool>,
    fail_refresh: Arc<AtomicBool>,
}

impl MockAuthenticator {
    pub fn logins(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    pub fn fail_login(&self, fail: bool) {
        self.fail_login.store(fail, Ordering::SeqCst);
    }

    pub fn fail_refresh(&self, fail: bool) {
        self.fail_refresh.store(fail, Ordering::SeqCst);
    }
}

impl Authenticator for MockAuthenticator {
    async fn login(
        &self,
        _account_type: AccountType,
        identifier: &str,
        _secret: &str,
    ) -> Result<Credentials, AuthError> {
        self.logins.fetch_add(1, Ordering::SeqCst);
        if self.fail_login.load(Ordering::SeqCst) {
            return Err(AuthError::InvalidCredentials("bad password".into()));
        }
        Ok(Credentials::issue(
            Profile::new(format!("id-{identifier}"), identifier),
            "token",
        ))
    }

    async fn refresh(&self, credentials: &Credentials) -> Result<Credentials, AuthError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        if self.fail_refresh.load(Ordering::SeqCst) {
            return Err(AuthError::Transient("issuer unavailable".into()));
        }
        Ok(Credentials {
            access_token: "refreshed".into(),
            ..credentials.clone()
        })
    }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// The server side of one mock session.
#[derive(Clone)]
pub struct Remote {
    events: SessionEvents,
    sent: Arc<Mutex<Vec<Outbound>>>,
    closed_with: Arc<Mutex<Option<String>>>,
    connected: Arc<AtomicBool>,
}

impl Remote {
    /// Delivers `message` to the client.
    pub fn send(&self, message: Inbound) {
        self.events.message_received(message);
    }

    /// Closes the session from the server side.
    pub fn close(&self, reason: &str) {
        if self.connected.swap(false, Ordering::SeqCst) {
            self.events.disconnected(reason);
        }
    }

    /// Everything the client sent on this session.
    pub fn received(&self) -> Vec<Outbound> {
        self.sent.lock().unwrap().clone()
    }

    /// The reason the client gave when it closed the session.
    pub fn closed_with(&self) -> Option<String> {
        self.closed_with.lock().unwrap().clone()
    }
}

pub struct MockSession {
    remote: Remote,
}

impl Session for MockSession {
    async fn send(&self, message: &Outbound) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::ConnectionClosed("mock session closed".into()));
        }
        self.remote.sent.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn disconnect(&self, reason: &str) {
        if self.remote.connected.swap(false, Ordering::SeqCst) {
            *self.remote.closed_with.lock().unwrap() = Some(reason.to_owned());
        }
    }

    fn is_connected(&self) -> bool {
        self.remote.connected.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
struct TransportState {
    connects: AtomicUsize,
    fail: AtomicBool,
    delay: Mutex<Duration>,
    remotes: Mutex<Vec<Remote>>,
}

/// In-memory transport. Clones share state, so a test keeps one clone to
/// drive the server side.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<TransportState>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every connect is refused until switched back.
    pub fn fail_connect(&self, fail: bool) {
        self.state.fail.store(fail, Ordering::SeqCst);
    }

    /// How long each connect takes before it resolves.
    pub fn set_connect_delay(&self, delay: Duration) {
        *self.state.delay.lock().unwrap() = delay;
    }

    pub fn connects(&self) -> usize {
        self.state.connects.load(Ordering::SeqCst)
    }

    /// Server side of the `index`th established session.
    pub fn remote(&self, index: usize) -> Remote {
        self.state.remotes.lock().unwrap()[index].clone()
    }

    pub fn sessions(&self) -> usize {
        self.state.remotes.lock().unwrap().len()
    }
}

impl Transport for MockTransport {
    type Session = MockSession;

    async fn connect(
        &self,
        endpoint: &Endpoint,
        _credentials: &Credentials,
        events: SessionEvents,
    ) -> Result<MockSession, TransportError> {
        self.state.connects.fetch_add(1, Ordering::SeqCst);
        let delay = *self.state.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.state.fail.load(Ordering::SeqCst) {
            return Err(TransportError::ConnectFailed(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                format!("{endpoint} refused the connection"),
            )));
        }

        let remote = Remote {
            events,
            sent: Arc::default(),
            closed_with: Arc::default(),
            connected: Arc::new(AtomicBool::new(true)),
        };
        self.state.remotes.lock().unwrap().push(remote.clone());
        Ok(MockSession { remote })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn settings(max_attempts: u32, delay_secs: u64, auto_reconnect: bool) -> Settings {
    Settings {
        endpoint: Endpoint::new("mock.local", 25565),
        account: AccountSettings {
            account_type: "legacy".into(),
            identifier: "Steve".into(),
            secret: "pw".into(),
        },
        policy: ReconnectPolicy {
            delay: Duration::from_secs(delay_secs),
            max_attempts,
            auto_reconnect,
        },
        keep_alive_interval: Duration::from_secs(20),
        idle_timeout: None,
        log_packets: true,
    }
}

/// Lets spawned tasks run until they block. Time is paused in these
/// tests, so this advances the clock by one millisecond at most.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
