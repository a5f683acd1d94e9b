//! The issuer hook.
//!
//! botlink does not talk to any account service itself. It defines the
//! [`Authenticator`] trait and lets the embedding application plug in
//! whatever issues tokens for its servers. Tests use mocks; the binary uses
//! [`OfflineAuthenticator`](crate::OfflineAuthenticator).

use botlink_protocol::Credentials;

use crate::{AccountType, AuthError};

/// Issues and re-issues credentials for an account.
///
/// # Example
///
/// ```rust
/// use botlink_auth::{AccountType, AuthError, Authenticator};
/// use botlink_protocol::{Credentials, Profile};
///
/// /// Accepts one hard-coded account.
/// struct FixedAuthenticator;
///
/// impl Authenticator for FixedAuthenticator {
///     async fn login(
///         &self,
///         _account_type: AccountType,
///         identifier: &str,
///         secret: &str,
///     ) -> Result<Credentials, AuthError> {
///         if secret != "hunter2" {
///             return Err(AuthError::InvalidCredentials("wrong password".into()));
///         }
///         Ok(Credentials::issue(Profile::new("1", identifier), "token"))
///     }
///
///     async fn refresh(
///         &self,
///         credentials: &Credentials,
///     ) -> Result<Credentials, AuthError> {
///         Ok(credentials.clone())
///     }
/// }
/// ```
pub trait Authenticator: Send + Sync + 'static {
    /// Runs the login flow for `account_type`.
    ///
    /// # Returns
    /// - `Ok(Credentials)` — the issuer accepted the account
    /// - `Err(AuthError::InvalidCredentials)` — rejected; retrying will not help
    /// - `Err(AuthError::Transient)` — the issuer failed; retry later
    fn login(
        &self,
        account_type: AccountType,
        identifier: &str,
        secret: &str,
    ) -> impl std::future::Future<Output = Result<Credentials, AuthError>> + Send;

    /// Re-issues `credentials` without the original secret.
    fn refresh(
        &self,
        credentials: &Credentials,
    ) -> impl std::future::Future<Output = Result<Credentials, AuthError>> + Send;
}
