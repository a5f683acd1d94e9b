//! botlink: a supervised, auto-reconnecting session client.
//!
//! The heart of the crate is the connection state machine, a single Tokio
//! task that owns the answer to "am I connected, connecting, or
//! recovering". Everything else talks to it through a
//! [`ConnectionHandle`]:
//!
//! ```text
//!  supervisors ──┐                      ┌── auth worker ──→ Authenticator
//!  commands ─────┼──→ ConnectionMachine ┤
//!  timers ───────┤      (one task)      └── connect worker ──→ Transport
//!  event pump ───┘          │
//!                           └──→ router ──→ SessionRecord
//! ```
//!
//! [`Client`] wires the machine to a configuration file, the periodic
//! supervisors, and the text command surface.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use botlink::{Client, ClientCommand, ClientConfig};
//! use botlink_auth::OfflineAuthenticator;
//! use botlink_transport::WebSocketTransport;
//!
//! let config = ClientConfig::load("botlink.json")?;
//! let mut client = Client::start(
//!     config,
//!     Some("botlink.json".into()),
//!     OfflineAuthenticator,
//!     WebSocketTransport::new(),
//! );
//! println!("{}", client.execute(ClientCommand::Status).await?);
//! ```

mod client;
mod command;
mod config;
mod error;
mod handle;
mod machine;
mod record;
mod router;
mod scheduler;
mod state;
mod status;
mod supervisor;

pub use client::{AUTO_CONNECT_DELAY, Client};
pub use command::{ClientCommand, UnknownCommand};
pub use config::{
    AccountSection, AccountSettings, AdvancedSection, BehaviorSection, ClientConfig,
    LoggingSection, ServerSection, Settings,
};
pub use error::{ClientError, ConfigError, DispatchError};
pub use handle::{ConnectOutcome, ConnectTicket, ConnectionHandle};
pub use record::SessionRecord;
pub use router::{RouteAction, route};
pub use scheduler::ReconnectPolicy;
pub use state::ConnectionState;
pub use status::{StatusReport, format_uptime};
pub use supervisor::{RECONNECT_CHECK_JITTER, RECONNECT_CHECK_PERIOD};

/// Reason recorded when the client stops.
pub const SHUTDOWN_REASON: &str = "client shutting down";

/// Reason recorded by the `disconnect` command.
pub const MANUAL_REASON: &str = "manual";

/// Reason recorded when credentials can no longer be refreshed.
pub const SESSION_EXPIRED_REASON: &str = "session expired";
