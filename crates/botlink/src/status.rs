//! Human-readable status snapshot.

use std::fmt;
use std::time::Duration;

use botlink_protocol::{Position, Vitals};
use botlink_transport::Endpoint;

use crate::ConnectionState;

/// Snapshot produced by the actor for the `status` command.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub state: ConnectionState,
    pub endpoint: Endpoint,
    /// Profile name captured at login, if any.
    pub account: Option<String>,
    /// Set only while online.
    pub uptime: Option<Duration>,
    pub last_disconnect_reason: Option<String>,
    pub attempts: u32,
    pub max_attempts: u32,
    /// Time until the pending reconnect fires.
    pub reconnect_in: Option<Duration>,
    pub messages_sent: u64,
    pub messages_received: u64,
    pub position: Position,
    pub vitals: Vitals,
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "State:       {}", self.state)?;
        writeln!(f, "Server:      {}", self.endpoint)?;
        writeln!(f, "Account:     {}", self.account.as_deref().unwrap_or("Unknown"))?;
        if let Some(uptime) = self.uptime {
            writeln!(f, "Uptime:      {}", format_uptime(uptime))?;
        }
        writeln!(f, "Attempts:    {}/{}", self.attempts, self.max_attempts)?;
        if let Some(left) = self.reconnect_in {
            writeln!(f, "Reconnect:   in {}", format_uptime(left))?;
        }
        writeln!(
            f,
            "Messages:    {} sent, {} received",
            self.messages_sent, self.messages_received
        )?;
        if self.state == ConnectionState::Online {
            let p = &self.position;
            writeln!(f, "Position:    {:.1} / {:.1} / {:.1}", p.x, p.y, p.z)?;
            writeln!(
                f,
                "Vitals:      health {}, food {}, xp {:.2}",
                self.vitals.health, self.vitals.food, self.vitals.experience
            )?;
        }
        write!(
            f,
            "Last reason: {}",
            self.last_disconnect_reason.as_deref().unwrap_or("-")
        )
    }
}

/// `45s`, `3m 12s`, `2h 5m`.
pub fn format_uptime(duration: Duration) -> String {
    let secs = duration.as_secs();
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(state: ConnectionState) -> StatusReport {
        StatusReport {
            state,
            endpoint: Endpoint::new("mc.example.net", 25565),
            account: None,
            uptime: None,
            last_disconnect_reason: None,
            attempts: 0,
            max_attempts: 10,
            reconnect_in: None,
            messages_sent: 0,
            messages_received: 0,
            position: Position::default(),
            vitals: Vitals::default(),
        }
    }

    #[test]
    fn test_format_uptime_seconds_only() {
        assert_eq!(format_uptime(Duration::from_secs(45)), "45s");
    }

    #[test]
    fn test_format_uptime_minutes_and_seconds() {
        assert_eq!(format_uptime(Duration::from_secs(192)), "3m 12s");
    }

    #[test]
    fn test_format_uptime_hours_drop_seconds() {
        assert_eq!(format_uptime(Duration::from_secs(2 * 3600 + 5 * 60 + 59)), "2h 5m");
    }

    #[test]
    fn test_display_unknown_account_and_no_reason() {
        let text = report(ConnectionState::Offline).to_string();
        assert!(text.contains("State:       Offline"));
        assert!(text.contains("Account:     Unknown"));
        assert!(text.contains("Last reason: -"));
        assert!(!text.contains("Uptime"));
    }

    #[test]
    fn test_display_online_shows_uptime_and_account() {
        let mut r = report(ConnectionState::Online);
        r.account = Some("Steve".into());
        r.uptime = Some(Duration::from_secs(75));
        r.last_disconnect_reason = Some("kicked".into());

        let text = r.to_string();

        assert!(text.contains("Account:     Steve"));
        assert!(text.contains("Uptime:      1m 15s"));
        assert!(text.contains("Last reason: kicked"));
        assert!(text.contains("Position:"));
    }

    #[test]
    fn test_display_pending_reconnect() {
        let mut r = report(ConnectionState::Reconnecting);
        r.attempts = 2;
        r.reconnect_in = Some(Duration::from_secs(5));

        let text = r.to_string();

        assert!(text.contains("Attempts:    2/10"));
        assert!(text.contains("Reconnect:   in 5s"));
    }
}
