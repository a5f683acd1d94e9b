//! Text command surface.

use std::fmt;
use std::str::FromStr;

/// A user command, parsed from one line of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCommand {
    Connect,
    Disconnect,
    Status,
    /// Disconnect if connected, then connect.
    Reconnect,
    /// Re-read the configuration file.
    Reload,
}

impl ClientCommand {
    pub const ALL: [ClientCommand; 5] = [
        Self::Connect,
        Self::Disconnect,
        Self::Status,
        Self::Reconnect,
        Self::Reload,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Disconnect => "disconnect",
            Self::Status => "status",
            Self::Reconnect => "reconnect",
            Self::Reload => "reload",
        }
    }

    /// One usage line per command.
    pub fn usage() -> String {
        let names: Vec<_> = Self::ALL.iter().map(|c| c.name()).collect();
        format!("usage: <{}>", names.join("|"))
    }
}

impl fmt::Display for ClientCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown command {0:?}")]
pub struct UnknownCommand(pub String);

impl FromStr for ClientCommand {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let word = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(word))
            .ok_or_else(|| UnknownCommand(word.to_owned()))
    }
}
