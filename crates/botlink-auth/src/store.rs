//! The credential store: current credentials plus refresh bookkeeping.
//!
//! # Concurrency note
//!
//! `CredentialStore` is not thread-safe by itself. The client keeps it
//! behind a `tokio::sync::Mutex` so connect and refresh workers never
//! touch it at the same time.

use std::time::Duration;

use botlink_protocol::Credentials;
use tokio::time::Instant;

use crate::{AccountType, AuthError, Authenticator};

/// Consecutive refresh failures tolerated before the session is given up.
pub const MAX_REFRESH_ATTEMPTS: u32 = 3;

/// Age after which credentials are considered stale.
pub const REFRESH_THRESHOLD: Duration = Duration::from_secs(22 * 60 * 60);

/// Holds the issued credentials and decides when to re-issue them.
///
/// ## Lifecycle
///
/// ```text
/// authenticate() ──→ [fresh] ──(22h)──→ [stale] ──refresh_session()──→ [fresh]
///                                          │
///                                          └─(3 failures)──→ RefreshExhausted
/// ```
pub struct CredentialStore<A> {
    authenticator: A,
    credentials: Option<Credentials>,
    /// When credentials were last issued or re-issued. `None` forces a
    /// refresh on the next check.
    last_refresh: Option<Instant>,
    refresh_attempts: u32,
}

impl<A: Authenticator> CredentialStore<A> {
    pub fn new(authenticator: A) -> Self {
        Self {
            authenticator,
            credentials: None,
            last_refresh: None,
            refresh_attempts: 0,
        }
    }

    /// Logs in with the given account and stores the result.
    ///
    /// # Errors
    /// - [`AuthError::UnknownAccountType`] for anything but `microsoft` /
    ///   `legacy`, before the issuer is contacted
    /// - [`AuthError::InvalidIdentifier`] if the identifier fails the
    ///   flow's shape check
    /// - whatever the issuer returns
    /// - [`AuthError::InvalidSession`] if the issued credentials lack a
    ///   profile or token
    pub async fn authenticate(
        &mut self,
        account_type: &str,
        identifier: &str,
        secret: &str,
    ) -> Result<Credentials, AuthError> {
        let account_type: AccountType = account_type.parse()?;
        account_type.validate_identifier(identifier)?;

        tracing::debug!(%account_type, "starting login flow");
        let credentials = self
            .authenticator
            .login(account_type, identifier, secret)
            .await?;

        if !is_valid(&credentials) {
            tracing::warn!(%account_type, "issuer returned an invalid session");
            return Err(AuthError::InvalidSession);
        }

        tracing::info!(
            %account_type,
            name = credentials.display_name().unwrap_or_default(),
            "authenticated"
        );
        self.credentials = Some(credentials.clone());
        self.last_refresh = Some(Instant::now());
        self.refresh_attempts = 0;
        Ok(credentials)
    }

    /// True when no refresh has been recorded or the last one is at least
    /// [`REFRESH_THRESHOLD`] old.
    pub fn needs_refresh(&self) -> bool {
        match self.last_refresh {
            Some(at) => at.elapsed() >= REFRESH_THRESHOLD,
            None => true,
        }
    }

    /// Re-issues stale credentials.
    ///
    /// Returns `Ok(true)` when the credentials are fresh (either untouched
    /// or just re-issued) and `Ok(false)` when they are still stale: the
    /// issuer failed, the retry cap was already reached, or nothing is
    /// stored. Once a failure brings the count to
    /// [`MAX_REFRESH_ATTEMPTS`] the call returns
    /// [`AuthError::RefreshExhausted`] instead.
    pub async fn refresh_session(&mut self) -> Result<bool, AuthError> {
        if !self.needs_refresh() {
            return Ok(true);
        }
        if self.refresh_attempts >= MAX_REFRESH_ATTEMPTS {
            tracing::warn!(
                attempts = self.refresh_attempts,
                "refresh attempts exhausted, not contacting issuer"
            );
            return Ok(false);
        }
        let Some(current) = self.credentials.as_ref() else {
            tracing::debug!("no credentials to refresh");
            return Ok(false);
        };

        let result = self.authenticator.refresh(current).await;
        match result {
            Ok(fresh) if is_valid(&fresh) => {
                tracing::info!("session refreshed");
                self.credentials = Some(fresh);
                self.last_refresh = Some(Instant::now());
                self.refresh_attempts = 0;
                Ok(true)
            }
            result => {
                self.refresh_attempts += 1;
                let reason = match result {
                    Err(e) => e.to_string(),
                    Ok(_) => AuthError::InvalidSession.to_string(),
                };
                if self.refresh_attempts >= MAX_REFRESH_ATTEMPTS {
                    tracing::error!(
                        attempts = self.refresh_attempts,
                        %reason,
                        "session refresh failed, giving up"
                    );
                    return Err(AuthError::RefreshExhausted {
                        attempts: self.refresh_attempts,
                    });
                }
                tracing::warn!(
                    attempts = self.refresh_attempts,
                    max = MAX_REFRESH_ATTEMPTS,
                    %reason,
                    "session refresh failed"
                );
                Ok(false)
            }
        }
    }

    /// Profile present and access token non-empty.
    pub fn is_session_valid(&self) -> bool {
        self.credentials.as_ref().is_some_and(is_valid)
    }

    /// Forgets the refresh stamp and the failure count.
    pub fn invalidate_session(&mut self) {
        self.last_refresh = None;
        self.refresh_attempts = 0;
    }

    /// Drops the stored credentials entirely (logout).
    pub fn clear(&mut self) {
        self.credentials = None;
        self.invalidate_session();
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn refresh_attempts(&self) -> u32 {
        self.refresh_attempts
    }
}

fn is_valid(credentials: &Credentials) -> bool {
    credentials.profile.is_some() && !credentials.access_token.is_empty()
}

// =========================================================================
// Tests
// =========================================================================
