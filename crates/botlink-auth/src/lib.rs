//! Authentication and credential lifecycle for botlink.
//!
//! This crate answers "who is the client, and is that still true?":
//!
//! 1. **Issuance** ([`Authenticator`] trait) — turning an account into
//!    [`Credentials`](botlink_protocol::Credentials), and re-issuing them.
//! 2. **Storage** ([`CredentialStore`]) — holding the current credentials,
//!    deciding when they are stale, and capping refresh retries.
//! 3. **Offline issuer** ([`OfflineAuthenticator`]) — a local issuer for
//!    servers that do not verify accounts.
//!
//! # How it fits in the stack
//!
//! ```text
//! Client (above)  ← asks the store for credentials before each connect
//!     ↕
//! Auth Layer (this crate)
//!     ↕
//! Protocol Layer (below)  ← provides Credentials, Profile
//! ```

#![allow(async_fn_in_trait)]

mod account;
mod auth;
mod error;
mod offline;
mod store;

pub use account::AccountType;
pub use auth::Authenticator;
pub use error::AuthError;
pub use offline::OfflineAuthenticator;
pub use store::{CredentialStore, MAX_REFRESH_ATTEMPTS, REFRESH_THRESHOLD};
