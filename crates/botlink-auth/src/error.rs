//! Error types for the auth layer.

/// Errors raised while issuing, validating, or refreshing credentials.
///
/// The split between [`InvalidCredentials`](Self::InvalidCredentials) and
/// [`Transient`](Self::Transient) lets callers tell "this account will
/// never work" apart from "try again later".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The issuer rejected the account or secret.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The issuer could not be reached or failed temporarily.
    #[error("issuer unavailable: {0}")]
    Transient(String),

    /// The configured account type is neither `microsoft` nor `legacy`.
    #[error("unknown account type: {0}")]
    UnknownAccountType(String),

    /// The identifier does not have the shape its flow requires.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// The issuer returned credentials without a profile or token.
    #[error("issued session is invalid")]
    InvalidSession,

    /// Refresh failed too many times in a row.
    #[error("session refresh failed {attempts} times")]
    RefreshExhausted { attempts: u32 },
}
