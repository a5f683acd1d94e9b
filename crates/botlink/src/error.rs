//! Error types for the client.

use std::path::PathBuf;

use botlink_auth::AuthError;
use botlink_protocol::ProtocolError;
use botlink_transport::TransportError;

/// Problems with the configuration file. Fatal at startup; a failed reload
/// keeps the previous configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{field} must be between {min} and {max}, but is {value}")]
    OutOfRange {
        field: &'static str,
        min: u64,
        max: u64,
        value: u64,
    },

    /// A credential field still holds the value from the generated file.
    #[error("{field} still holds the placeholder value; set real account details")]
    Placeholder { field: &'static str },

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// `reload` was requested on a client started without a config file.
    #[error("no configuration file to reload from")]
    NoSource,
}

/// Failure while handling one inbound message. Logged, never fatal.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DispatchError {
    #[error("rejected {kind} message: {reason}")]
    Rejected { kind: String, reason: String },
}

/// Top-level error that wraps every layer's error type.
///
/// The `#[from]` attributes let `?` lift layer errors into this one.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The connection actor has stopped.
    #[error("connection actor is not running")]
    Unavailable,
}
