//! Local issuer for servers running in offline mode.

use botlink_protocol::{Credentials, Profile};
use rand::Rng;

use crate::{AccountType, AuthError, Authenticator};

/// Issues credentials locally without contacting any account service.
///
/// Any non-empty secret is accepted. The profile name is the legacy
/// username, or the sanitized local part of a Microsoft e-mail address.
/// Tokens are random and only meaningful to servers that ignore them.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineAuthenticator;

impl Authenticator for OfflineAuthenticator {
    async fn login(
        &self,
        account_type: AccountType,
        identifier: &str,
        secret: &str,
    ) -> Result<Credentials, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::InvalidCredentials("empty secret".into()));
        }
        let name = match account_type {
            AccountType::Legacy => identifier.to_owned(),
            AccountType::Microsoft => name_from_email(identifier),
        };
        if name.is_empty() {
            return Err(AuthError::InvalidIdentifier(identifier.to_owned()));
        }
        tracing::debug!(%account_type, %name, "issuing offline credentials");
        let profile = Profile::new(format!("offline:{name}"), name);
        Ok(Credentials::issue(profile, generate_token()).with_refresh_token(generate_token()))
    }

    async fn refresh(&self, credentials: &Credentials) -> Result<Credentials, AuthError> {
        let profile = credentials
            .profile
            .clone()
            .ok_or(AuthError::InvalidSession)?;
        Ok(Credentials::issue(profile, generate_token()).with_refresh_token(generate_token()))
    }
}

/// Turns `first.last+tag@example.com` into `firstlasttag`, capped at 16.
fn name_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    local
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .take(16)
        .collect()
}

/// Random 32-character hex string (128 bits).
fn generate_token() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
