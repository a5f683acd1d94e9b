//! Frames and the message kinds carried inside them.
//!
//! Every unit on the wire is a [`Frame`]: an adjacently tagged JSON object
//!
//! ```text
//! { "type": "KeepAlive", "data": { "id": 42 } }
//! ```
//!
//! Inbound frames are turned into the closed [`Inbound`] enum. A frame whose
//! `type` the client does not know is *not* an error: it becomes
//! [`Inbound::Unknown`] so the router can log and drop it while the session
//! keeps running. Only a known kind with a malformed body fails to decode.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::text::{plain_text, sanitize};
use crate::{Profile, ProtocolError};

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// The raw wire unit: a kind tag plus an opaque body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl Frame {
    pub fn new(kind: impl Into<String>, data: Value) -> Self {
        Self {
            kind: kind.into(),
            data,
        }
    }
}

// ---------------------------------------------------------------------------
// Payload structs
// ---------------------------------------------------------------------------

/// Player position as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(default)]
    pub yaw: f32,
    #[serde(default)]
    pub pitch: f32,
    #[serde(default)]
    pub on_ground: bool,
}

impl Position {
    fn is_finite(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.z.is_finite()
            && self.yaw.is_finite()
            && self.pitch.is_finite()
    }
}

/// Health, food, and experience. A fresh player starts at 20/20/0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    pub health: i32,
    pub food: i32,
    #[serde(default)]
    pub experience: f32,
}

impl Default for Vitals {
    fn default() -> Self {
        Self {
            health: 20,
            food: 20,
            experience: 0.0,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct LoginSuccessBody {
    profile: Profile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    session_id: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct KeepAliveBody {
    id: i64,
}

#[derive(Deserialize)]
struct SystemChatBody {
    content: Value,
}

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// Every message kind the client reacts to, plus a catch-all.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Login accepted; carries the identity the server settled on.
    LoginSuccess {
        profile: Profile,
        session_id: Option<String>,
    },
    /// Liveness ping. Must be answered with [`Outbound::KeepAlive`]
    /// carrying the same `id`.
    KeepAlive { id: i64 },
    /// System chat, already flattened to plain text.
    SystemChat { text: String },
    /// Server-side correction of the player's position.
    PlayerPosition(Position),
    /// Health / food / experience update.
    HealthUpdate(Vitals),
    /// A kind this client does not handle.
    Unknown { kind: String },
}

impl Inbound {
    pub const LOGIN_SUCCESS: &'static str = "LoginSuccess";
    pub const KEEP_ALIVE: &'static str = "KeepAlive";
    pub const SYSTEM_CHAT: &'static str = "SystemChat";
    pub const PLAYER_POSITION: &'static str = "PlayerPosition";
    pub const HEALTH_UPDATE: &'static str = "HealthUpdate";

    /// The wire tag of this message.
    pub fn kind(&self) -> &str {
        match self {
            Self::LoginSuccess { .. } => Self::LOGIN_SUCCESS,
            Self::KeepAlive { .. } => Self::KEEP_ALIVE,
            Self::SystemChat { .. } => Self::SYSTEM_CHAT,
            Self::PlayerPosition(_) => Self::PLAYER_POSITION,
            Self::HealthUpdate(_) => Self::HEALTH_UPDATE,
            Self::Unknown { kind } => kind,
        }
    }

    /// Interprets a decoded frame.
    ///
    /// # Errors
    /// [`ProtocolError::Decode`] when a known kind has a malformed body,
    /// [`ProtocolError::InvalidMessage`] when a position is not finite.
    pub fn from_frame(frame: Frame) -> Result<Self, ProtocolError> {
        let Frame { kind, data } = frame;
        match kind.as_str() {
            Self::LOGIN_SUCCESS => {
                let body: LoginSuccessBody = from_data(data)?;
                Ok(Self::LoginSuccess {
                    profile: body.profile,
                    session_id: body.session_id,
                })
            }
            Self::KEEP_ALIVE => {
                let body: KeepAliveBody = from_data(data)?;
                Ok(Self::KeepAlive { id: body.id })
            }
            Self::SYSTEM_CHAT => {
                let body: SystemChatBody = from_data(data)?;
                Ok(Self::SystemChat {
                    text: sanitize(&plain_text(&body.content)),
                })
            }
            Self::PLAYER_POSITION => {
                let position: Position = from_data(data)?;
                if !position.is_finite() {
                    return Err(ProtocolError::InvalidMessage(
                        "position contains a non-finite coordinate".into(),
                    ));
                }
                Ok(Self::PlayerPosition(position))
            }
            Self::HEALTH_UPDATE => Ok(Self::HealthUpdate(from_data(data)?)),
            _ => Ok(Self::Unknown { kind }),
        }
    }

    /// Builds the frame a server would send for this message.
    ///
    /// Used by test servers and mock transports; the client itself only
    /// decodes inbound frames.
    pub fn to_frame(&self) -> Result<Frame, ProtocolError> {
        let data = match self {
            Self::LoginSuccess {
                profile,
                session_id,
            } => to_data(&LoginSuccessBody {
                profile: profile.clone(),
                session_id: session_id.clone(),
            })?,
            Self::KeepAlive { id } => to_data(&KeepAliveBody { id: *id })?,
            Self::SystemChat { text } => {
                serde_json::json!({ "content": text })
            }
            Self::PlayerPosition(position) => to_data(position)?,
            Self::HealthUpdate(vitals) => to_data(vitals)?,
            Self::Unknown { .. } => Value::Null,
        };
        Ok(Frame::new(self.kind(), data))
    }
}

fn from_data<T: serde::de::DeserializeOwned>(
    data: Value,
) -> Result<T, ProtocolError> {
    serde_json::from_value(data).map_err(ProtocolError::Decode)
}

fn to_data<T: Serialize>(value: &T) -> Result<Value, ProtocolError> {
    serde_json::to_value(value).map_err(ProtocolError::Encode)
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// Messages the client sends.
///
/// Serialized with the same `{ "type", "data" }` shape as [`Frame`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Outbound {
    /// First message after the socket opens.
    Login { name: String, access_token: String },
    /// Reply to a liveness ping.
    KeepAlive { id: i64 },
    /// Polite goodbye before closing.
    Disconnect { reason: String },
}

impl Outbound {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Login { .. } => "Login",
            Self::KeepAlive { .. } => "KeepAlive",
            Self::Disconnect { .. } => "Disconnect",
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
