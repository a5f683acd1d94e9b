//! Connection lifecycle states.

use std::fmt;

/// Where the client is in its connection lifecycle.
///
/// Only the connection actor changes it. Allowed transitions:
///
/// ```text
/// Offline ──connect──→ Connecting ──success──→ Online
///    ↑                     │                     │
///    │                  failure          disconnect / remote close
///    │                     ↓                     ↓
///    │                   Error               Offline
///    │                     │                     │
///    │                     └──(timer armed)──→ Reconnecting ──fires──→ Connecting
///    └──────────── manual disconnect from any state ────────────────┘
/// ```
///
/// No path reaches `Online` without passing through `Connecting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    #[default]
    Offline,
    Connecting,
    Online,
    Error,
    /// A reconnect timer is pending.
    Reconnecting,
}

impl ConnectionState {
    /// A new connect may start from here.
    pub fn can_connect(self) -> bool {
        matches!(self, Self::Offline | Self::Error)
    }

    /// Connected, or working on getting there.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Online | Self::Connecting | Self::Reconnecting)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Offline => "Offline",
            Self::Connecting => "Connecting",
            Self::Online => "Online",
            Self::Error => "Error",
            Self::Reconnecting => "Reconnecting",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
