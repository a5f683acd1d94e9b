//! Inbound message dispatch.

use botlink_protocol::{Inbound, Outbound};
use tokio::time::Instant;

use crate::{DispatchError, SessionRecord};

/// What the caller must do after a message was routed.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteAction {
    None,
    /// Send this back to the server.
    Reply(Outbound),
}

/// Applies one inbound message to the session record.
///
/// The caller counts the message as received before routing and sends
/// any reply itself. An `Err` means this one message was ignored; the
/// session carries on.
pub fn route(record: &mut SessionRecord, message: Inbound) -> Result<RouteAction, DispatchError> {
    match message {
        Inbound::LoginSuccess {
            profile,
            session_id,
        } => {
            if profile.name.is_empty() {
                return Err(rejected(Inbound::LOGIN_SUCCESS, "profile has no name"));
            }
            tracing::info!(name = %profile, "login accepted");
            record.profile = Some(profile);
            record.session_id = session_id;
            record.touch();
            Ok(RouteAction::None)
        }
        Inbound::KeepAlive { id } => {
            record.last_keep_alive = Some(Instant::now());
            tracing::trace!(id, "keep-alive");
            Ok(RouteAction::Reply(Outbound::KeepAlive { id }))
        }
        Inbound::SystemChat { text } => {
            tracing::info!(target: "botlink::chat", "{text}");
            record.touch();
            Ok(RouteAction::None)
        }
        Inbound::PlayerPosition(position) => {
            record.position = position;
            record.touch();
            Ok(RouteAction::None)
        }
        Inbound::HealthUpdate(vitals) => {
            if vitals.food < 0 || vitals.experience < 0.0 {
                return Err(rejected(Inbound::HEALTH_UPDATE, "negative food or experience"));
            }
            if vitals.health <= 0 && record.vitals.health > 0 {
                tracing::warn!("player died");
            }
            record.vitals = vitals;
            record.touch();
            Ok(RouteAction::None)
        }
        Inbound::Unknown { kind } => {
            tracing::debug!(%kind, "ignoring unhandled message");
            Ok(RouteAction::None)
        }
    }
}

fn rejected(kind: &str, reason: &str) -> DispatchError {
    DispatchError::Rejected {
        kind: kind.to_owned(),
        reason: reason.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use botlink_protocol::{Position, Profile, Vitals};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_route_keep_alive_replies_with_same_id_and_stamps() {
        let mut record = SessionRecord::default();
        tokio::time::advance(Duration::from_secs(3)).await;

        let action = route(&mut record, Inbound::KeepAlive { id: 4242 }).unwrap();

        assert_eq!(action, RouteAction::Reply(Outbound::KeepAlive { id: 4242 }));
        assert_eq!(record.last_keep_alive, Some(Instant::now()));
    }

    #[test]
    fn test_route_login_success_captures_profile_and_session() {
        let mut record = SessionRecord::default();

        route(
            &mut record,
            Inbound::LoginSuccess {
                profile: Profile::new("u-1", "Steve"),
                session_id: Some("abc".into()),
            },
        )
        .unwrap();

        assert_eq!(record.profile, Some(Profile::new("u-1", "Steve")));
        assert_eq!(record.session_id.as_deref(), Some("abc"));
        assert!(record.last_activity.is_some());
    }

    #[test]
    fn test_route_login_success_without_name_is_rejected() {
        let mut record = SessionRecord::default();

        let result = route(
            &mut record,
            Inbound::LoginSuccess {
                profile: Profile::new("u-1", ""),
                session_id: None,
            },
        );

        assert!(matches!(result, Err(DispatchError::Rejected { .. })));
        assert_eq!(record.profile, None);
    }

    #[test]
    fn test_route_position_overwrites_and_touches() {
        let mut record = SessionRecord::default();
        let position = Position {
            x: 10.0,
            y: 70.0,
            z: -4.0,
            yaw: 90.0,
            pitch: 0.0,
            on_ground: true,
        };

        route(&mut record, Inbound::PlayerPosition(position)).unwrap();

        assert_eq!(record.position, position);
        assert!(record.last_activity.is_some());
    }

    #[test]
    fn test_route_health_update_overwrites_vitals() {
        let mut record = SessionRecord::default();
        let vitals = Vitals {
            health: 12,
            food: 18,
            experience: 0.25,
        };

        route(&mut record, Inbound::HealthUpdate(vitals)).unwrap();

        assert_eq!(record.vitals, vitals);
    }

    #[test]
    fn test_route_health_update_negative_food_is_rejected() {
        let mut record = SessionRecord::default();
        let result = route(
            &mut record,
            Inbound::HealthUpdate(Vitals {
                health: 20,
                food: -1,
                experience: 0.0,
            }),
        );
        assert!(result.is_err());
        assert_eq!(record.vitals, Vitals::default());
    }

    #[test]
    fn test_route_chat_stamps_activity() {
        let mut record = SessionRecord::default();
        route(&mut record, Inbound::SystemChat { text: "hi".into() }).unwrap();
        assert!(record.last_activity.is_some());
    }

    #[test]
    fn test_route_unknown_is_ignored_without_touching() {
        let mut record = SessionRecord::default();

        let action = route(
            &mut record,
            Inbound::Unknown {
                kind: "SpawnEntity".into(),
            },
        )
        .unwrap();

        assert_eq!(action, RouteAction::None);
        assert!(record.last_activity.is_none());
    }
}
