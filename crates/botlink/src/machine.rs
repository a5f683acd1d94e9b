//! The connection actor: a single Tokio task that owns the lifecycle.
//!
//! Every mutation of the connection state, the session record, and the
//! attempt counter happens inside [`ConnectionMachine::run`]. The outside
//! world (handles, supervisors, reconnect timers, the transport event pump,
//! auth and connect workers) only sends [`Command`]s.
//!
//! # Generations
//!
//! Each connect attempt gets a new generation number. Worker results and
//! transport events are tagged with it, and anything tagged with an older
//! generation is discarded. A manual disconnect bumps the generation too, so
//! an attempt that was already in flight cannot bring the session back.

use std::sync::Arc;

use botlink_auth::{AuthError, Authenticator, CredentialStore};
use botlink_protocol::{Inbound, Outbound, Profile};
use botlink_transport::{Session, SessionEvent, SessionEvents, Transport, TransportError};
use tokio::sync::{Mutex, mpsc, oneshot};

use crate::handle::ConnectOutcome;
use crate::router::{self, RouteAction};
use crate::scheduler::{ReconnectScheduler, ScheduleDecision};
use crate::{
    AccountSettings, ConnectionState, SESSION_EXPIRED_REASON, SHUTDOWN_REASON, SessionRecord,
    Settings, StatusReport,
};

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Who asked for a connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Trigger {
    /// A user command. Clears the parked flag and the attempt count.
    Manual,
    /// A reconnect timer.
    Timer,
    /// The reconnect-check supervisor.
    Supervisor,
}

/// Why a connect attempt failed, as seen at the worker boundary.
#[derive(Debug, thiserror::Error)]
pub(crate) enum AttemptError {
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// A session plus the profile the issuer authenticated.
pub(crate) struct Established<S> {
    session: S,
    profile: Option<Profile>,
}

pub(crate) enum Command<T: Transport> {
    Connect {
        trigger: Trigger,
        reply: Option<oneshot::Sender<ConnectOutcome>>,
    },
    /// Posted by the connect worker.
    ConnectFinished {
        generation: u64,
        result: Result<Established<T::Session>, AttemptError>,
    },
    Disconnect {
        reason: String,
        reply: oneshot::Sender<()>,
    },
    /// Forwarded by the per-generation event pump.
    Session {
        generation: u64,
        event: SessionEvent,
    },
    ReconnectTimerFired {
        timer_id: u64,
    },
    LivenessCheck,
    ReconnectCheck,
    /// Posted by the refresh worker.
    RefreshFinished {
        generation: u64,
        result: Result<bool, AuthError>,
    },
    Status {
        reply: oneshot::Sender<StatusReport>,
    },
    IsConnected {
        reply: oneshot::Sender<bool>,
    },
    Reconfigure {
        settings: Box<Settings>,
        reply: oneshot::Sender<()>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

pub(crate) struct ConnectionMachine<A: Authenticator, T: Transport> {
    state: ConnectionState,
    settings: Settings,
    record: SessionRecord,
    /// Consecutive failed attempts and remote disconnects. Reset on `Online`.
    attempts: u32,
    generation: u64,
    session: Option<T::Session>,
    credentials: Arc<Mutex<CredentialStore<A>>>,
    transport: Arc<T>,
    scheduler: ReconnectScheduler<Command<T>>,
    /// Callers awaiting the outcome of the attempt in flight.
    waiters: Vec<oneshot::Sender<ConnectOutcome>>,
    refresh_in_flight: bool,
    /// Set by a manual disconnect (and before the first connect) so the
    /// reconnect-check supervisor leaves the client alone.
    parked: bool,
    commands: mpsc::WeakSender<Command<T>>,
    receiver: mpsc::Receiver<Command<T>>,
}

impl<A: Authenticator, T: Transport> ConnectionMachine<A, T> {
    pub(crate) fn new(
        authenticator: A,
        transport: T,
        settings: Settings,
        commands: mpsc::WeakSender<Command<T>>,
        receiver: mpsc::Receiver<Command<T>>,
    ) -> Self {
        Self {
            state: ConnectionState::Offline,
            settings,
            record: SessionRecord::default(),
            attempts: 0,
            generation: 0,
            session: None,
            credentials: Arc::new(Mutex::new(CredentialStore::new(authenticator))),
            transport: Arc::new(transport),
            scheduler: ReconnectScheduler::new(commands.clone(), |timer_id| {
                Command::ReconnectTimerFired { timer_id }
            }),
            waiters: Vec::new(),
            refresh_in_flight: false,
            parked: true,
            commands,
            receiver,
        }
    }

    /// Runs the actor loop until shutdown or until every handle is gone.
    pub(crate) async fn run(mut self) {
        tracing::info!(endpoint = %self.settings.endpoint, "connection actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                Command::Connect { trigger, reply } => self.handle_connect(trigger, reply),
                Command::ConnectFinished { generation, result } => {
                    self.handle_connect_finished(generation, result).await;
                }
                Command::Disconnect { reason, reply } => {
                    self.handle_disconnect(&reason).await;
                    let _ = reply.send(());
                }
                Command::Session { generation, event } => {
                    self.handle_session_event(generation, event).await;
                }
                Command::ReconnectTimerFired { timer_id } => self.handle_timer_fired(timer_id),
                Command::LivenessCheck => self.handle_liveness_check(),
                Command::ReconnectCheck => self.handle_reconnect_check(),
                Command::RefreshFinished { generation, result } => {
                    self.handle_refresh_finished(generation, result).await;
                }
                Command::Status { reply } => {
                    let _ = reply.send(self.status());
                }
                Command::IsConnected { reply } => {
                    let _ = reply.send(self.is_connected());
                }
                Command::Reconfigure { settings, reply } => {
                    self.handle_reconfigure(*settings);
                    let _ = reply.send(());
                }
                Command::Shutdown { reply } => {
                    tracing::info!("connection actor shutting down");
                    self.teardown(SHUTDOWN_REASON).await;
                    let _ = reply.send(());
                    break;
                }
            }
        }

        if self.session.is_some() {
            self.teardown(SHUTDOWN_REASON).await;
        }
        tracing::info!("connection actor stopped");
    }

    // -- Connect ----------------------------------------------------------

    fn handle_connect(&mut self, trigger: Trigger, reply: Option<oneshot::Sender<ConnectOutcome>>) {
        if matches!(
            self.state,
            ConnectionState::Connecting | ConnectionState::Online
        ) {
            tracing::debug!(state = %self.state, ?trigger, "connect ignored, already active");
            if let Some(reply) = reply {
                let _ = reply.send(ConnectOutcome::AlreadyActive);
            }
            return;
        }

        if trigger == Trigger::Manual {
            self.parked = false;
            self.attempts = 0;
        }
        self.scheduler.cancel_all();
        self.generation += 1;
        let generation = self.generation;
        self.record = SessionRecord::fresh(
            self.settings.endpoint.clone(),
            self.record.last_disconnect_reason.take(),
        );
        self.set_state(ConnectionState::Connecting);
        self.waiters.extend(reply);

        tracing::info!(
            endpoint = %self.settings.endpoint,
            generation,
            ?trigger,
            attempt = self.attempts + 1,
            "connecting"
        );

        let worker = ConnectWorker {
            credentials: Arc::clone(&self.credentials),
            transport: Arc::clone(&self.transport),
            account: self.settings.account.clone(),
            endpoint: self.settings.endpoint.clone(),
            commands: self.commands.clone(),
            generation,
        };
        tokio::spawn(worker.run());
    }

    async fn handle_connect_finished(
        &mut self,
        generation: u64,
        result: Result<Established<T::Session>, AttemptError>,
    ) {
        if generation != self.generation || self.state != ConnectionState::Connecting {
            tracing::debug!(generation, current = self.generation, "discarding stale connect result");
            if let Ok(established) = result {
                established.session.disconnect("superseded").await;
            }
            return;
        }

        match result {
            Ok(Established { session, profile }) => {
                self.session = Some(session);
                // A later login-success message overrides this.
                self.record.profile = profile;
                self.attempts = 0;
                self.record.connected_at = Some(tokio::time::Instant::now());
                self.record.touch();
                self.set_state(ConnectionState::Online);
                tracing::info!(endpoint = %self.settings.endpoint, "connected");
                self.resolve_waiters(ConnectOutcome::Connected);
            }
            Err(err) => {
                let reason = err.to_string();
                tracing::warn!(%reason, "connect attempt failed");
                self.set_state(ConnectionState::Error);
                self.record.last_disconnect_reason = Some(reason.clone());
                let outcome = match err {
                    AttemptError::Auth(_) => ConnectOutcome::AuthFailed(reason),
                    AttemptError::Transport(_) => ConnectOutcome::ConnectFailed(reason),
                };
                self.resolve_waiters(outcome);
                self.on_failure();
            }
        }
    }

    // -- Disconnect -------------------------------------------------------

    async fn handle_disconnect(&mut self, reason: &str) {
        if !self.state.is_active() {
            tracing::debug!(state = %self.state, "disconnect while not active");
        }
        self.parked = true;
        self.teardown(reason).await;
    }

    /// Cancels timers, invalidates in-flight work, closes the session, and
    /// lands in `Offline` with `reason` recorded. Never schedules a retry.
    async fn teardown(&mut self, reason: &str) {
        self.scheduler.cancel_all();
        self.generation += 1;
        if let Some(session) = self.session.take() {
            session.disconnect(reason).await;
        }
        let previous = self.state;
        self.set_state(ConnectionState::Offline);
        self.record.last_disconnect_reason = Some(reason.to_owned());
        self.resolve_waiters(ConnectOutcome::Aborted(reason.to_owned()));
        tracing::info!(%reason, from = %previous, "disconnected");
    }

    // -- Session events ---------------------------------------------------

    async fn handle_session_event(&mut self, generation: u64, event: SessionEvent) {
        if generation != self.generation || self.state != ConnectionState::Online {
            tracing::trace!(generation, "dropping event from a stale session");
            return;
        }
        match event {
            SessionEvent::MessageReceived(message) => self.handle_inbound(message).await,
            SessionEvent::Disconnected(reason) => {
                self.session = None;
                tracing::warn!(%reason, "disconnected by server");
                self.record.last_disconnect_reason = Some(reason);
                self.set_state(ConnectionState::Offline);
                self.on_failure();
            }
        }
    }

    async fn handle_inbound(&mut self, message: Inbound) {
        self.record.messages_received += 1;
        if self.settings.log_packets {
            tracing::debug!(kind = message.kind(), "inbound message");
        }
        match router::route(&mut self.record, message) {
            Ok(RouteAction::None) => {}
            Ok(RouteAction::Reply(reply)) => self.send(reply).await,
            Err(e) => tracing::warn!(error = %e, "failed to handle inbound message"),
        }
    }

    async fn send(&mut self, message: Outbound) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        match session.send(&message).await {
            Ok(()) => {
                self.record.messages_sent += 1;
                if self.settings.log_packets {
                    tracing::debug!(kind = message.kind(), "outbound message");
                }
            }
            Err(e) => tracing::warn!(error = %e, kind = message.kind(), "send failed"),
        }
    }

    // -- Reconnect --------------------------------------------------------

    /// Counts a failure and, if allowed, arms the next retry.
    fn on_failure(&mut self) {
        let prior = self.attempts;
        self.attempts += 1;

        if !self.settings.policy.auto_reconnect {
            tracing::debug!(attempts = self.attempts, "auto-reconnect disabled");
            return;
        }
        match self.scheduler.schedule(&self.settings.policy, prior) {
            ScheduleDecision::Scheduled { delay, .. } => {
                self.set_state(ConnectionState::Reconnecting);
                tracing::info!(
                    attempt = self.attempts,
                    max = self.settings.policy.max_attempts,
                    delay_secs = delay.as_secs(),
                    "reconnect scheduled"
                );
            }
            ScheduleDecision::Exhausted => {
                tracing::error!(
                    attempts = self.attempts,
                    max = self.settings.policy.max_attempts,
                    "reconnect attempts exhausted; waiting for a manual connect"
                );
            }
        }
    }

    fn handle_timer_fired(&mut self, timer_id: u64) {
        if !self.scheduler.take_if_current(timer_id) {
            tracing::trace!(timer_id, "ignoring stale reconnect timer");
            return;
        }
        if self.state != ConnectionState::Reconnecting {
            return;
        }
        self.handle_connect(Trigger::Timer, None);
    }

    fn handle_reconnect_check(&mut self) {
        if !self.settings.policy.auto_reconnect || self.parked {
            return;
        }
        if !self.state.can_connect() || self.attempts >= self.settings.policy.max_attempts {
            return;
        }
        tracing::info!(state = %self.state, "reconnect check found client down");
        self.handle_connect(Trigger::Supervisor, None);
    }

    // -- Liveness ---------------------------------------------------------

    fn handle_liveness_check(&mut self) {
        if !self.is_connected() {
            return;
        }
        self.refresh_if_needed();

        let interval = self.settings.keep_alive_interval;
        if let Some(silent) = self.record.keep_alive_overdue(interval) {
            tracing::warn!(
                silent_secs = silent.as_secs(),
                interval_secs = interval.as_secs(),
                "no keep-alive from server"
            );
        }

        if let Some(limit) = self.settings.idle_timeout {
            if let Some(idle) = self.record.take_idle_warning(limit) {
                tracing::warn!(idle_mins = idle.as_secs() / 60, "session is idle");
            }
        }
    }

    fn refresh_if_needed(&mut self) {
        if self.refresh_in_flight {
            return;
        }
        self.refresh_in_flight = true;
        let credentials = Arc::clone(&self.credentials);
        let commands = self.commands.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            let result = credentials.lock().await.refresh_session().await;
            if let Some(tx) = commands.upgrade() {
                let _ = tx.send(Command::RefreshFinished { generation, result }).await;
            }
        });
    }

    async fn handle_refresh_finished(&mut self, generation: u64, result: Result<bool, AuthError>) {
        self.refresh_in_flight = false;
        match result {
            Ok(true) => {}
            Ok(false) => tracing::debug!("session refresh still pending"),
            Err(e) => {
                tracing::error!(error = %e, "session can no longer be refreshed");
                self.credentials.lock().await.clear();
                if generation == self.generation && self.state == ConnectionState::Online {
                    // Not parked: the next attempt logs in from scratch.
                    self.teardown(SESSION_EXPIRED_REASON).await;
                    self.on_failure();
                }
            }
        }
    }

    // -- Queries and settings ---------------------------------------------

    fn is_connected(&self) -> bool {
        self.state == ConnectionState::Online
            && self.session.as_ref().is_some_and(|s| s.is_connected())
    }

    fn status(&self) -> StatusReport {
        StatusReport {
            state: self.state,
            endpoint: self.settings.endpoint.clone(),
            account: self.record.profile.as_ref().map(|p| p.name.clone()),
            uptime: match self.state {
                ConnectionState::Online => self.record.uptime(),
                _ => None,
            },
            last_disconnect_reason: self.record.last_disconnect_reason.clone(),
            attempts: self.attempts,
            max_attempts: self.settings.policy.max_attempts,
            reconnect_in: self.scheduler.remaining(),
            messages_sent: self.record.messages_sent,
            messages_received: self.record.messages_received,
            position: self.record.position,
            vitals: self.record.vitals,
        }
    }

    fn handle_reconfigure(&mut self, settings: Settings) {
        let endpoint_changed = settings.endpoint != self.settings.endpoint;
        self.settings = settings;
        if !self.settings.policy.auto_reconnect && self.scheduler.is_pending() {
            self.scheduler.cancel_all();
            self.set_state(ConnectionState::Offline);
        }
        tracing::info!(
            endpoint = %self.settings.endpoint,
            endpoint_changed,
            "settings applied"
        );
    }

    // -- Helpers ----------------------------------------------------------

    fn set_state(&mut self, next: ConnectionState) {
        if self.state != next {
            tracing::debug!(from = %self.state, to = %next, "state change");
            self.state = next;
        }
    }

    fn resolve_waiters(&mut self, outcome: ConnectOutcome) {
        for waiter in self.waiters.drain(..) {
            let _ = waiter.send(outcome.clone());
        }
    }
}

// ---------------------------------------------------------------------------
// Connect worker
// ---------------------------------------------------------------------------

/// Authenticates and dials off the actor task, then posts the result.
struct ConnectWorker<A: Authenticator, T: Transport> {
    credentials: Arc<Mutex<CredentialStore<A>>>,
    transport: Arc<T>,
    account: AccountSettings,
    endpoint: botlink_transport::Endpoint,
    commands: mpsc::WeakSender<Command<T>>,
    generation: u64,
}

impl<A: Authenticator, T: Transport> ConnectWorker<A, T> {
    async fn run(self) {
        let (events, mut event_rx) = SessionEvents::channel();
        let result = self.attempt(events).await;

        let generation = self.generation;
        if !self.post(Command::ConnectFinished { generation, result }).await {
            return;
        }

        // Forward session events only after the result is queued, so the
        // actor always sees `ConnectFinished` before the first event.
        while let Some(event) = event_rx.recv().await {
            if !self.post(Command::Session { generation, event }).await {
                break;
            }
        }
    }

    /// Upgrades per message so an idle pump never keeps the actor alive.
    async fn post(&self, command: Command<T>) -> bool {
        match self.commands.upgrade() {
            Some(tx) => tx.send(command).await.is_ok(),
            None => false,
        }
    }

    async fn attempt(
        &self,
        events: SessionEvents,
    ) -> Result<Established<T::Session>, AttemptError> {
        let credentials = {
            let mut store = self.credentials.lock().await;
            store
                .authenticate(
                    &self.account.account_type,
                    &self.account.identifier,
                    &self.account.secret,
                )
                .await?
        };
        let session = self
            .transport
            .connect(&self.endpoint, &credentials, events)
            .await?;
        Ok(Established {
            session,
            profile: credentials.profile,
        })
    }
}
