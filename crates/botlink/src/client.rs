//! Client lifecycle: configuration, supervisors, and the command surface.

use std::path::PathBuf;
use std::time::Duration;

use botlink_auth::Authenticator;
use botlink_transport::Transport;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::supervisor::{spawn_liveness, spawn_reconnect_check};
use crate::{
    ClientCommand, ClientConfig, ClientError, ConfigError, ConnectOutcome, ConnectionHandle,
    MANUAL_REASON,
};

/// Delay before the startup auto-connect.
pub const AUTO_CONNECT_DELAY: Duration = Duration::from_secs(3);

/// A running client.
///
/// Startup order: settings from the configuration, then the connection
/// actor with its credential store, then both supervisors, then the
/// delayed auto-connect if enabled.
pub struct Client<T: Transport> {
    handle: ConnectionHandle<T>,
    config_path: Option<PathBuf>,
    config: ClientConfig,
    keep_alive: watch::Sender<Duration>,
    liveness: JoinHandle<()>,
    reconnect_check: JoinHandle<()>,
    auto_connect: Option<JoinHandle<()>>,
}

impl<T: Transport> Client<T> {
    /// Starts the client on the current runtime. `config_path` is where
    /// `reload` reads from.
    pub fn start<A: Authenticator>(
        config: ClientConfig,
        config_path: Option<PathBuf>,
        authenticator: A,
        transport: T,
    ) -> Self {
        let settings = config.settings();
        let keep_alive = settings.keep_alive_interval;
        tracing::info!(
            endpoint = %settings.endpoint,
            account_type = %settings.account.account_type,
            auto_reconnect = settings.policy.auto_reconnect,
            "starting client"
        );

        let handle = ConnectionHandle::spawn(authenticator, transport, settings);
        let (keep_alive, interval) = watch::channel(keep_alive);
        let liveness = spawn_liveness(handle.clone(), interval);
        let reconnect_check = spawn_reconnect_check(handle.clone());

        let auto_connect = config.behavior.auto_connect_on_startup.then(|| {
            let handle = handle.clone();
            tokio::spawn(async move {
                tokio::time::sleep(AUTO_CONNECT_DELAY).await;
                match handle.connect().await {
                    Ok(ticket) => {
                        let outcome = ticket.outcome().await;
                        tracing::info!(%outcome, "auto-connect finished");
                    }
                    Err(e) => tracing::warn!(error = %e, "auto-connect skipped"),
                }
            })
        });

        Self {
            handle,
            config_path,
            config,
            keep_alive,
            liveness,
            reconnect_check,
            auto_connect,
        }
    }

    pub fn handle(&self) -> &ConnectionHandle<T> {
        &self.handle
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Runs one command and returns the text to show the user.
    pub async fn execute(&mut self, command: ClientCommand) -> Result<String, ClientError> {
        tracing::debug!(%command, "executing command");
        match command {
            ClientCommand::Connect => self.connect().await,
            ClientCommand::Disconnect => {
                self.handle.disconnect(MANUAL_REASON).await?;
                Ok("Disconnected.".to_owned())
            }
            ClientCommand::Status => Ok(self.handle.status().await?.to_string()),
            ClientCommand::Reconnect => {
                if self.handle.is_connected().await? {
                    self.handle.disconnect(MANUAL_REASON).await?;
                }
                self.connect().await
            }
            ClientCommand::Reload => {
                self.reload().await?;
                Ok("Configuration reloaded.".to_owned())
            }
        }
    }

    async fn connect(&self) -> Result<String, ClientError> {
        let outcome = self.handle.connect().await?.outcome().await;
        Ok(match outcome {
            ConnectOutcome::Connected => {
                format!("Connected to {}.", self.config.settings().endpoint)
            }
            other => format!("Connect did not succeed: {other}."),
        })
    }

    /// Re-reads the configuration file and applies it to the running
    /// client. On error the previous configuration stays in effect.
    pub async fn reload(&mut self) -> Result<(), ClientError> {
        let path = self.config_path.as_ref().ok_or(ConfigError::NoSource)?;
        let config = match ClientConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "reload failed, keeping previous configuration");
                return Err(e.into());
            }
        };

        let settings = config.settings();
        let keep_alive = settings.keep_alive_interval;
        self.handle.reconfigure(settings).await?;

        self.keep_alive.send_if_modified(|current| {
            let changed = *current != keep_alive;
            *current = keep_alive;
            changed
        });
        self.config = config;
        tracing::info!(path = %path.display(), "configuration reloaded");
        Ok(())
    }

    /// Cancels all timers, tears down the session, and stops the actor.
    pub async fn shutdown(self) -> Result<(), ClientError> {
        self.stop_tasks();
        self.handle.shutdown().await
    }

    fn stop_tasks(&self) {
        if let Some(task) = &self.auto_connect {
            task.abort();
        }
        self.liveness.abort();
        self.reconnect_check.abort();
    }
}

impl<T: Transport> Drop for Client<T> {
    fn drop(&mut self) {
        self.stop_tasks();
    }
}
