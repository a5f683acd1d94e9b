//! Wire protocol types for botlink.
//!
//! This crate defines what the client and the remote server exchange:
//!
//! - **Identity** ([`Profile`], [`Credentials`]) — who the client is once
//!   an issuer has accepted its account.
//! - **Messages** ([`Frame`], [`Inbound`], [`Outbound`]) — the structures
//!   that travel on the wire, and the closed set of inbound kinds the
//!   client understands.
//! - **Text** ([`plain_text`], [`sanitize`]) — flattening chat components
//!   into something printable.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — frames to/from bytes.
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes) → Protocol (Frame → Inbound) → Client (session state)
//! ```
//!
//! The protocol layer knows nothing about connections or reconnection.

mod codec;
mod error;
mod message;
mod text;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use message::{Frame, Inbound, Outbound, Position, Vitals};
pub use text::{plain_text, sanitize};
pub use types::{Credentials, Profile};
