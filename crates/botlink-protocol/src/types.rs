//! Identity types shared by the auth, transport, and client layers.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// The account identity selected by the issuer.
///
/// `id` is whatever the issuer uses as a stable key (a UUID string for
/// online accounts, a derived id for offline ones). `name` is the display
/// name shown in status output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
}

impl Profile {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// An issued token bundle: everything the transport needs to log in.
///
/// Credentials are produced by an `Authenticator` and owned by the
/// credential store for the lifetime of one session attempt. They are
/// never serialized; the transport picks out the fields it sends.
///
/// `issued_at` uses Tokio's clock so staleness checks follow
/// `tokio::time::pause()` in tests.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Selected profile. `None` means the issuer returned a token without
    /// an identity, which the store treats as an invalid session.
    pub profile: Option<Profile>,
    /// Bearer token presented to the server.
    pub access_token: String,
    /// Optional material an issuer can use to re-issue without the secret.
    pub refresh_token: Option<String>,
    /// When this bundle was issued.
    pub issued_at: Instant,
}

impl Credentials {
    /// Creates credentials issued now.
    pub fn issue(profile: Profile, access_token: impl Into<String>) -> Self {
        Self {
            profile: Some(profile),
            access_token: access_token.into(),
            refresh_token: None,
            issued_at: Instant::now(),
        }
    }

    /// Attaches refresh material.
    pub fn with_refresh_token(mut self, token: impl Into<String>) -> Self {
        self.refresh_token = Some(token.into());
        self
    }

    /// The profile's display name, if any.
    pub fn display_name(&self) -> Option<&str> {
        self.profile.as_ref().map(|p| p.name.as_str())
    }
}

// Tokens must not end up in logs through `{:?}`.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("profile", &self.profile)
            .field("access_token", &"<redacted>")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .field("issued_at", &self.issued_at)
            .finish()
    }
}
