//! Client lifecycle and the text command surface.

mod common;

use std::path::PathBuf;
use std::time::Duration;

use botlink::{
    AUTO_CONNECT_DELAY, Client, ClientCommand, ClientConfig, ClientError, ConfigError,
    ConnectionState,
};
use common::{MockAuthenticator, MockTransport, settle};

fn config(auto_connect: bool) -> ClientConfig {
    let mut config = ClientConfig::default();
    config.server.host = "mock.local".into();
    config.account.account_type = "legacy".into();
    config.account.username = "Steve".into();
    config.account.password = "pw".into();
    config.behavior.auto_connect_on_startup = auto_connect;
    config.behavior.reconnect_delay_seconds = 5;
    config
}

fn start(config: ClientConfig, path: Option<PathBuf>) -> (Client<MockTransport>, MockTransport) {
    let (client, _auth, transport) = start_with_auth(config, path);
    (client, transport)
}

fn start_with_auth(
    config: ClientConfig,
    path: Option<PathBuf>,
) -> (Client<MockTransport>, MockAuthenticator, MockTransport) {
    let auth = MockAuthenticator::default();
    let transport = MockTransport::new();
    let client = Client::start(config, path, auth.clone(), transport.clone());
    (client, auth, transport)
}

fn temp_config(name: &str, config: &ClientConfig) -> PathBuf {
    let path = std::env::temp_dir().join(format!("botlink-{}-{name}.json", std::process::id()));
    config.save(&path).unwrap();
    path
}

// =========================================================================
// Startup
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_start_auto_connects_after_delay() {
    let (client, transport) = start(config(true), None);

    tokio::time::sleep(AUTO_CONNECT_DELAY - Duration::from_millis(100)).await;
    assert_eq!(transport.connects(), 0);

    tokio::time::sleep(Duration::from_millis(200)).await;
    settle().await;
    assert_eq!(transport.connects(), 1);
    assert!(client.handle().is_connected().await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_start_without_auto_connect_stays_offline() {
    let (client, transport) = start(config(false), None);

    tokio::time::sleep(Duration::from_secs(10)).await;

    assert_eq!(transport.connects(), 0);
    let status = client.handle().status().await.unwrap();
    assert_eq!(status.state, ConnectionState::Offline);
}

#[tokio::test(start_paused = true)]
async fn test_reconnect_supervisor_leaves_parked_client_alone() {
    let (_client, transport) = start(config(false), None);

    tokio::time::sleep(Duration::from_secs(180)).await;

    assert_eq!(transport.connects(), 0);
}

// =========================================================================
// Commands
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_execute_connect_then_status() {
    let (mut client, _transport) = start(config(false), None);

    let reply = client.execute(ClientCommand::Connect).await.unwrap();
    assert_eq!(reply, "Connected to mock.local:25565.");

    let status = client.execute(ClientCommand::Status).await.unwrap();
    assert!(status.contains("State:       Online"), "{status}");
    assert!(status.contains("Server:      mock.local:25565"), "{status}");
}

#[tokio::test(start_paused = true)]
async fn test_execute_connect_failure_is_reported_not_raised() {
    let (mut client, transport) = start(config(false), None);
    transport.fail_connect(true);

    let reply = client.execute(ClientCommand::Connect).await.unwrap();

    assert!(reply.starts_with("Connect did not succeed: connection failed"), "{reply}");
}

#[tokio::test(start_paused = true)]
async fn test_execute_disconnect_records_manual_reason() {
    let (mut client, transport) = start(config(false), None);
    client.execute(ClientCommand::Connect).await.unwrap();

    client.execute(ClientCommand::Disconnect).await.unwrap();

    assert_eq!(transport.remote(0).closed_with().as_deref(), Some("manual"));
    let status = client.execute(ClientCommand::Status).await.unwrap();
    assert!(status.contains("Last reason: manual"), "{status}");
}

#[tokio::test(start_paused = true)]
async fn test_execute_reconnect_replaces_session() {
    let (mut client, transport) = start(config(false), None);
    client.execute(ClientCommand::Connect).await.unwrap();

    let reply = client.execute(ClientCommand::Reconnect).await.unwrap();

    assert!(reply.starts_with("Connected"), "{reply}");
    assert_eq!(transport.connects(), 2);
    assert_eq!(transport.remote(0).closed_with().as_deref(), Some("manual"));
    assert!(client.handle().is_connected().await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_execute_reconnect_when_offline_just_connects() {
    let (mut client, transport) = start(config(false), None);

    client.execute(ClientCommand::Reconnect).await.unwrap();

    assert_eq!(transport.connects(), 1);
}

// =========================================================================
// Reload
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_reload_without_file_is_rejected() {
    let (mut client, _transport) = start(config(false), None);

    let err = client.execute(ClientCommand::Reload).await.unwrap_err();

    assert!(matches!(err, ClientError::Config(ConfigError::NoSource)));
}

#[tokio::test(start_paused = true)]
async fn test_reload_applies_new_policy() {
    let initial = config(false);
    let path = temp_config("reload-apply", &initial);
    let (mut client, transport) = start(initial, Some(path.clone()));

    let mut updated = config(false);
    updated.behavior.max_reconnect_attempts = 3;
    updated.save(&path).unwrap();
    let reply = client.execute(ClientCommand::Reload).await.unwrap();

    assert_eq!(reply, "Configuration reloaded.");
    assert_eq!(client.config().behavior.max_reconnect_attempts, 3);
    let status = client.handle().status().await.unwrap();
    assert_eq!(status.max_attempts, 3);
    assert_eq!(transport.connects(), 0);
    let _ = std::fs::remove_file(path);
}

#[tokio::test(start_paused = true)]
async fn test_reload_retunes_liveness_interval() {
    let initial = config(false);
    let path = temp_config("reload-liveness", &initial);
    let (mut client, auth, _transport) = start_with_auth(initial, Some(path.clone()));
    client.execute(ClientCommand::Connect).await.unwrap();
    auth.fail_refresh(true);

    let mut updated = config(false);
    updated.advanced.keep_alive_interval = 300;
    updated.save(&path).unwrap();
    client.reload().await.unwrap();
    settle().await;

    tokio::time::advance(Duration::from_secs(22 * 3600)).await;
    settle().await;
    assert_eq!(auth.refreshes(), 1);

    tokio::time::sleep(Duration::from_secs(60)).await;
    settle().await;
    assert_eq!(auth.refreshes(), 1);

    tokio::time::sleep(Duration::from_secs(300)).await;
    settle().await;
    assert_eq!(auth.refreshes(), 2);
    let _ = std::fs::remove_file(path);
}

#[tokio::test(start_paused = true)]
async fn test_reload_invalid_file_keeps_previous_config() {
    let initial = config(false);
    let path = temp_config("reload-invalid", &initial);
    let (mut client, _transport) = start(initial, Some(path.clone()));

    std::fs::write(&path, r#"{"behavior": {"reconnect_delay_seconds": 0}}"#).unwrap();
    let err = client.reload().await.unwrap_err();

    assert!(matches!(err, ClientError::Config(_)), "{err:?}");
    assert_eq!(client.config().behavior.reconnect_delay_seconds, 5);
    assert_eq!(client.handle().status().await.unwrap().max_attempts, 10);
    let _ = std::fs::remove_file(path);
}

// =========================================================================
// Shutdown
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_shutdown_closes_session() {
    let (mut client, transport) = start(config(false), None);
    client.execute(ClientCommand::Connect).await.unwrap();
    let handle = client.handle().clone();

    client.shutdown().await.unwrap();
    settle().await;

    assert_eq!(
        transport.remote(0).closed_with().as_deref(),
        Some("client shutting down")
    );
    assert!(handle.is_closed());
}
